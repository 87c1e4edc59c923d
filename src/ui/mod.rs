pub mod theme;

use std::collections::HashMap;

use iced::{
    widget::{button, column, container, image, row, scrollable, stack, text, Column, Space},
    Alignment, ContentFit, Element, Length,
};

use crate::domain::{Catalog, CatalogEntry, EntryStatus};

const LOG_HEIGHT: f32 = 140.0;
const TAB_WIDTH: f32 = 150.0;

/// Main view state
pub struct InstallerView {
    pub selected_tab: usize,
    pub log: Vec<String>,
    /// Keyed by destination filename, which is unique in a catalog.
    pub statuses: HashMap<String, EntryStatus>,
    pub is_installing: bool,
    pub background: Option<image::Handle>,
}

impl Default for InstallerView {
    fn default() -> Self {
        Self {
            selected_tab: 0,
            log: Vec::new(),
            statuses: HashMap::new(),
            is_installing: false,
            background: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum InstallerMessage {
    TabSelected(usize),
    InstallEntry { category: usize, entry: usize },
    InstallCategory(usize),
    InstallEverything,
}

impl InstallerView {
    pub fn update(&mut self, message: InstallerMessage, tab_count: usize) {
        match message {
            InstallerMessage::TabSelected(index) => {
                if index < tab_count {
                    self.selected_tab = index;
                }
            }
            InstallerMessage::InstallEntry { .. }
            | InstallerMessage::InstallCategory(_)
            | InstallerMessage::InstallEverything => {
                // Will be handled by the app
            }
        }
    }

    pub fn status(&self, entry: &CatalogEntry) -> EntryStatus {
        self.statuses
            .get(entry.destination_filename())
            .copied()
            .unwrap_or_default()
    }

    pub fn set_status(&mut self, entry: &CatalogEntry, status: EntryStatus) {
        self.statuses
            .insert(entry.destination_filename().to_string(), status);
    }

    /// `Some(message)` while idle, `None` (disabled button) during an install.
    fn action(&self, message: InstallerMessage) -> Option<InstallerMessage> {
        (!self.is_installing).then_some(message)
    }

    pub fn view<'a>(&'a self, catalog: &'a Catalog) -> Element<'a, InstallerMessage> {
        let content = column![
            row![self.tab_bar(catalog), self.tab_page(catalog)]
                .spacing(12)
                .height(Length::Fill),
            button(text("Install EVERYTHING").size(16))
                .on_press_maybe(self.action(InstallerMessage::InstallEverything))
                .style(theme::glossy_button)
                .padding([8, 20])
                .width(Length::Fill),
            self.log_panel(),
        ]
        .padding(16)
        .spacing(12);

        let backdrop: Element<'a, InstallerMessage> = match &self.background {
            Some(handle) => image(handle.clone())
                .content_fit(ContentFit::Cover)
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => container(Space::new())
                .width(Length::Fill)
                .height(Length::Fill)
                .style(theme::sky_backdrop)
                .into(),
        };

        stack![backdrop, content]
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn tab_bar<'a>(&'a self, catalog: &'a Catalog) -> Element<'a, InstallerMessage> {
        let tabs = catalog
            .categories()
            .iter()
            .enumerate()
            .map(|(index, category)| {
                button(text(category.name()).size(15))
                    .on_press(InstallerMessage::TabSelected(index))
                    .style(theme::tab_button(index == self.selected_tab))
                    .padding([10, 18])
                    .width(Length::Fill)
                    .into()
            });

        Column::with_children(tabs)
            .spacing(8)
            .width(Length::Fixed(TAB_WIDTH))
            .into()
    }

    fn tab_page<'a>(&'a self, catalog: &'a Catalog) -> Element<'a, InstallerMessage> {
        let Some(category) = catalog.category(self.selected_tab) else {
            return Space::new().into();
        };

        let mut items = Column::new().spacing(10).padding(8);
        for (index, entry) in category.entries().iter().enumerate() {
            let install = button(text(format!("Install {}", entry.label())))
                .on_press_maybe(self.action(InstallerMessage::InstallEntry {
                    category: self.selected_tab,
                    entry: index,
                }))
                .style(theme::glossy_button)
                .padding([8, 20])
                .width(Length::Fill);

            items = items.push(
                row![
                    install,
                    text(self.status(entry).caption())
                        .size(13)
                        .color(theme::TEXT)
                        .width(Length::Fixed(110.0)),
                ]
                .spacing(12)
                .align_y(Alignment::Center),
            );
        }

        items = items.push(
            button(text(format!("Install All {}", category.name())))
                .on_press_maybe(self.action(InstallerMessage::InstallCategory(self.selected_tab)))
                .style(theme::glossy_button)
                .padding([8, 20])
                .width(Length::Fill),
        );

        container(scrollable(items).height(Length::Fill))
            .style(theme::pane)
            .padding(8)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn log_panel(&self) -> Element<'_, InstallerMessage> {
        let lines = self
            .log
            .iter()
            .map(|line| text(line.as_str()).size(13).color(theme::TEXT).into());

        container(
            scrollable(Column::with_children(lines).spacing(2).width(Length::Fill))
                .anchor_bottom()
                .height(Length::Fill),
        )
        .style(theme::log_panel)
        .padding(8)
        .width(Length::Fill)
        .height(Length::Fixed(LOG_HEIGHT))
        .into()
    }
}
