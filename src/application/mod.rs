pub mod install_coordinator;

pub use install_coordinator::{DialogPrompt, InstallCoordinator, InstallEvent};
