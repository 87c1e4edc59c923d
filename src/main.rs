#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod application;
mod domain;
mod fetch;
mod platform;
mod ui;

use std::sync::Arc;

use iced::{window, Size};
use tracing::info;

use application::{DialogPrompt, InstallCoordinator};
use domain::{AppError, Catalog};
use fetch::{FetchClient, FETCH_TIMEOUT};
use platform::{HostOs, UserDirs};

const WINDOW_TITLE: &str = "Frutiger Aero Installer";
const WINDOW_SIZE: (f32, f32) = (800.0, 600.0);

// Renderer crates are chatty at info.
const DEFAULT_LOG_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn,iced_wgpu=warn";

fn main() -> Result<(), AppError> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let catalog = Catalog::builtin()?;

    let elevation = platform::detect_elevation();
    let target =
        platform::resolve_install_target(HostOs::current(), elevation, &UserDirs::detect()?)?;
    info!(
        path = %target.dir().display(),
        ?elevation,
        categories = catalog.categories().len(),
        entries = catalog.entry_count(),
        timeout_secs = FETCH_TIMEOUT.as_secs(),
        "Installer starting"
    );

    let coordinator = InstallCoordinator::new(FetchClient::new()?, target, Arc::new(DialogPrompt));

    iced::application(
        move || app::InstallerApp::boot(catalog.clone(), coordinator.clone()),
        app::update,
        app::view,
    )
    .title(WINDOW_TITLE)
    .theme(app::theme)
    .window(window::Settings {
        size: Size::new(WINDOW_SIZE.0, WINDOW_SIZE.1),
        ..Default::default()
    })
    .run()?;

    Ok(())
}
