pub mod catalog;
pub mod error;
pub mod model;

pub use catalog::{Catalog, BACKGROUND_FILENAME};
pub use error::AppError;
pub use model::{CatalogEntry, Category, EntryStatus, InstallOutcome, InstallReport};
