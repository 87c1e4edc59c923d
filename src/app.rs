use std::path::PathBuf;

use futures::StreamExt;
use iced::widget::image::Handle;
use iced::{Task, Theme};
use tracing::{debug, info, warn};

use crate::application::{InstallCoordinator, InstallEvent};
use crate::domain::{Catalog, CatalogEntry, EntryStatus, BACKGROUND_FILENAME};
use crate::fetch::FetchClient;
use crate::ui::{InstallerMessage, InstallerView};

pub struct InstallerApp {
    view: InstallerView,
    catalog: Catalog,
    coordinator: InstallCoordinator,
}

impl InstallerApp {
    pub fn new(catalog: Catalog, coordinator: InstallCoordinator) -> Self {
        let mut app = Self {
            view: InstallerView::default(),
            catalog,
            coordinator,
        };
        let line = format!("Installing into: {}", app.coordinator.target().dir().display());
        app.log(line);
        app
    }

    /// Builds the app and starts fetching the window background.
    pub fn boot(catalog: Catalog, coordinator: InstallCoordinator) -> (Self, Task<Message>) {
        let client = coordinator.fetch_client().clone();
        let url = catalog.background_url().to_string();
        let path = coordinator.target().file(BACKGROUND_FILENAME);
        let app = Self::new(catalog, coordinator);

        (
            app,
            Task::perform(load_background(client, url, path), Message::BackgroundLoaded),
        )
    }

    fn log(&mut self, line: impl Into<String>) {
        let line = line.into();
        info!(target: "installer_log", "{}", line);
        self.view.log.push(line);
    }

    /// Starts a sequential install batch unless one is already running.
    fn start_batch(&mut self, entries: Vec<CatalogEntry>, everything: bool) -> Task<Message> {
        if self.view.is_installing {
            debug!("Install request ignored; a batch is already running");
            return Task::none();
        }
        self.view.is_installing = true;
        if everything {
            self.log("Installing EVERYTHING...");
        }

        let events = self.coordinator.install_stream(entries).map(Message::Install);
        Task::stream(events).chain(Task::done(Message::BatchFinished { everything }))
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(InstallerMessage),
    /// Decoded background image, or why there is none
    BackgroundLoaded(Result<Handle, String>),
    Install(InstallEvent),
    BatchFinished { everything: bool },
}

pub fn update(app: &mut InstallerApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view
                .update(ui_msg.clone(), app.catalog.categories().len());

            match ui_msg {
                InstallerMessage::InstallEntry { category, entry } => {
                    let selected = app
                        .catalog
                        .category(category)
                        .and_then(|c| c.entries().get(entry))
                        .cloned();
                    if let Some(selected) = selected {
                        return app.start_batch(vec![selected], false);
                    }
                }
                InstallerMessage::InstallCategory(category) => {
                    if let Some(category) = app.catalog.category(category) {
                        let entries = category.entries().to_vec();
                        return app.start_batch(entries, false);
                    }
                }
                InstallerMessage::InstallEverything => {
                    let entries = app.catalog.entries().cloned().collect();
                    return app.start_batch(entries, true);
                }
                InstallerMessage::TabSelected(_) => {}
            }
        }
        Message::BackgroundLoaded(result) => match result {
            Ok(handle) => {
                app.view.background = Some(handle);
            }
            Err(e) => {
                warn!(error = %e, "Background unavailable; using gradient");
            }
        },
        Message::Install(InstallEvent::Downloading(entry)) => {
            app.view.set_status(&entry, EntryStatus::Downloading);
        }
        Message::Install(InstallEvent::Finished(report)) => {
            app.view.set_status(&report.entry, report.status());
            app.log(report.log_line());
        }
        Message::BatchFinished { everything } => {
            app.view.is_installing = false;
            if everything {
                app.log("All categories installed.");
            }
        }
    }
    Task::none()
}

pub fn view(app: &InstallerApp) -> iced::Element<'_, Message> {
    app.view.view(&app.catalog).map(Message::UiMessage)
}

pub fn theme(_app: &InstallerApp) -> Theme {
    Theme::Light
}

/// Refreshes the background file, then decodes whatever copy is on disk.
async fn load_background(client: FetchClient, url: String, path: PathBuf) -> Result<Handle, String> {
    match client.fetch_to_path(&url, &path).await {
        Ok(bytes) => info!(path = %path.display(), bytes, "Background downloaded"),
        Err(e) => warn!(error = %e, "Failed to download background"),
    }

    let data = tokio::fs::read(&path)
        .await
        .map_err(|e| format!("could not read {}: {}", path.display(), e))?;

    let rgba = tokio::task::spawn_blocking(move || image::load_from_memory(&data).map(|img| img.to_rgba8()))
        .await
        .map_err(|e| format!("decoder task failed: {}", e))?
        .map_err(|e| format!("could not decode background: {}", e))?;

    let (width, height) = rgba.dimensions();
    Ok(Handle::from_rgba(width, height, rgba.into_raw()))
}
