//! Frutiger Aero look: sky gradients, frosted panes, glossy buttons.

use iced::gradient::Linear;
use iced::widget::{button, container};
use iced::{Background, Border, Color, Degrees, Gradient, Shadow, Theme, Vector};

pub const SKY_TOP: Color = Color::from_rgb8(0x66, 0xb3, 0xff);
pub const SKY_BOTTOM: Color = Color::from_rgb8(0x33, 0x99, 0xff);
const ICE: Color = Color::from_rgb8(0xcc, 0xef, 0xff);
const HOVER_BOTTOM: Color = Color::from_rgb8(0x99, 0xcc, 0xff);

pub const TEXT: Color = Color::BLACK;

/// White with the given alpha out of 255.
fn frost(alpha: u8) -> Color {
    Color::from_rgba8(255, 255, 255, alpha as f32 / 255.0)
}

fn vertical(stops: &[(f32, Color)]) -> Background {
    let linear = stops
        .iter()
        .fold(Linear::new(Degrees(180.0)), |linear, &(offset, color)| {
            linear.add_stop(offset, color)
        });
    Background::Gradient(Gradient::Linear(linear))
}

fn border(alpha: u8, width: f32, radius: f32) -> Border {
    Border {
        color: frost(alpha),
        width,
        radius: radius.into(),
    }
}

/// Fallback window backdrop when no background image is available.
pub fn sky_backdrop(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(vertical(&[(0.0, SKY_TOP), (1.0, SKY_BOTTOM)])),
        ..container::Style::default()
    }
}

/// Translucent page behind the selected tab's content.
pub fn pane(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(frost(120))),
        border: border(200, 2.0, 16.0),
        text_color: Some(TEXT),
        ..container::Style::default()
    }
}

pub fn log_panel(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(frost(180))),
        border: border(200, 1.0, 12.0),
        text_color: Some(TEXT),
        ..container::Style::default()
    }
}

pub fn glossy_button(_theme: &Theme, status: button::Status) -> button::Style {
    let background = match status {
        button::Status::Hovered => vertical(&[(0.0, Color::WHITE), (1.0, HOVER_BOTTOM)]),
        button::Status::Pressed => vertical(&[(0.0, HOVER_BOTTOM), (1.0, SKY_BOTTOM)]),
        button::Status::Active | button::Status::Disabled => vertical(&[
            (0.0, Color::WHITE),
            (0.3, ICE),
            (0.7, SKY_TOP),
            (1.0, SKY_BOTTOM),
        ]),
    };

    let style = button::Style {
        background: Some(background),
        text_color: TEXT,
        border: border(180, 1.0, 14.0),
        shadow: Shadow {
            color: Color::from_rgba8(0, 40, 90, 0.25),
            offset: Vector::new(0.0, 2.0),
            blur_radius: 6.0,
        },
        ..button::Style::default()
    };

    if status == button::Status::Disabled {
        button::Style {
            text_color: TEXT.scale_alpha(0.4),
            shadow: Shadow::default(),
            ..style
        }
    } else {
        style
    }
}

/// Tab handle on the west edge; the selected tab is brighter with a white rim.
pub fn tab_button(selected: bool) -> impl Fn(&Theme, button::Status) -> button::Style {
    move |_theme: &Theme, status: button::Status| {
        let (fill, rim) = match (selected, status) {
            (true, _) => (frost(200), border(255, 2.0, 12.0)),
            (false, button::Status::Hovered) => (frost(170), border(180, 1.0, 12.0)),
            (false, _) => (frost(140), border(180, 1.0, 12.0)),
        };
        button::Style {
            background: Some(Background::Color(fill)),
            text_color: TEXT,
            border: rim,
            ..button::Style::default()
        }
    }
}
