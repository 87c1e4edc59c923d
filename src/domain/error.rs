use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::FetchError;

/// Reasons a catalog is refused at load time.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog has no categories")]
    Empty,

    #[error("category name must not be empty")]
    EmptyCategoryName,

    #[error("category \"{0}\" appears more than once")]
    DuplicateCategory(String),

    #[error("category \"{0}\" has no entries")]
    EmptyCategory(String),

    #[error("entry in category \"{category}\" has an empty label")]
    EmptyLabel { category: String },

    #[error("invalid URL for \"{label}\": {url}")]
    InvalidUrl { label: String, url: String },

    #[error("invalid destination filename for \"{label}\": {filename:?}")]
    InvalidFilename { label: String, filename: String },

    #[error("destination filename {filename:?} is used by both \"{first}\" and \"{second}\"")]
    DuplicateFilename {
        filename: String,
        first: String,
        second: String,
    },

    #[error("destination filename {0:?} is reserved by the installer")]
    ReservedFilename(String),
}

/// Fatal errors raised before or while running the event loop.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Could not determine the user's home directory")]
    NoHomeDir,

    #[error("Could not create install directory {path}: {source}")]
    InstallDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP client setup failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("UI error: {0}")]
    Ui(#[from] iced::Error),
}
