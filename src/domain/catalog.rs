use std::collections::{HashMap, HashSet};
use std::path::{Component, Path};

use serde::Deserialize;
use url::Url;

use super::error::CatalogError;
use super::model::{CatalogEntry, Category};
use crate::fetch::PARTIAL_SUFFIX;

/// Filename the background image is saved under in the install directory.
pub const BACKGROUND_FILENAME: &str = "background.jpg";

const BUILTIN_CATALOG: &str = include_str!("../../assets/catalog.json");

#[derive(Deserialize)]
struct RawCatalog {
    background_url: String,
    categories: Vec<Category>,
}

/// The validated, immutable set of categories and entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    background_url: String,
    categories: Vec<Category>,
}

impl Catalog {
    pub fn new(
        background_url: impl Into<String>,
        categories: Vec<Category>,
    ) -> Result<Self, CatalogError> {
        let background_url = background_url.into();
        if !is_web_url(&background_url) {
            return Err(CatalogError::InvalidUrl {
                label: "background".to_string(),
                url: background_url,
            });
        }

        validate_categories(&categories)?;

        Ok(Self {
            background_url,
            categories,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(json)?;
        Self::new(raw.background_url, raw.categories)
    }

    /// The catalog compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn background_url(&self) -> &str {
        &self.background_url
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, index: usize) -> Option<&Category> {
        self.categories.get(index)
    }

    /// Every entry, in tab order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.categories.iter().flat_map(|c| c.entries().iter())
    }

    pub fn entry_count(&self) -> usize {
        self.categories.iter().map(|c| c.entries().len()).sum()
    }
}

fn validate_categories(categories: &[Category]) -> Result<(), CatalogError> {
    if categories.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut names = HashSet::new();
    // All categories share one install directory, so filenames must be unique catalog-wide.
    // Keys are lowercased: Windows and macOS treat names differing only in case as one file.
    let mut owners: HashMap<String, &str> = HashMap::new();

    for category in categories {
        let name = category.name().trim();
        if name.is_empty() {
            return Err(CatalogError::EmptyCategoryName);
        }
        if !names.insert(name) {
            return Err(CatalogError::DuplicateCategory(name.to_string()));
        }
        if category.entries().is_empty() {
            return Err(CatalogError::EmptyCategory(name.to_string()));
        }

        for entry in category.entries() {
            validate_entry(name, entry)?;

            let filename = entry.destination_filename();
            let key = filename.to_lowercase();
            // `.part` names would collide with another entry's in-flight download.
            if key == BACKGROUND_FILENAME || key.ends_with(PARTIAL_SUFFIX) {
                return Err(CatalogError::ReservedFilename(filename.to_string()));
            }
            if let Some(first) = owners.insert(key, entry.label()) {
                return Err(CatalogError::DuplicateFilename {
                    filename: filename.to_string(),
                    first: first.to_string(),
                    second: entry.label().to_string(),
                });
            }
        }
    }

    Ok(())
}

fn validate_entry(category: &str, entry: &CatalogEntry) -> Result<(), CatalogError> {
    if entry.label().trim().is_empty() {
        return Err(CatalogError::EmptyLabel {
            category: category.to_string(),
        });
    }

    if !is_web_url(entry.source_url()) {
        return Err(CatalogError::InvalidUrl {
            label: entry.label().to_string(),
            url: entry.source_url().to_string(),
        });
    }

    if !is_plain_filename(entry.destination_filename()) {
        return Err(CatalogError::InvalidFilename {
            label: entry.label().to_string(),
            filename: entry.destination_filename().to_string(),
        });
    }

    Ok(())
}

fn is_web_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .unwrap_or(false)
}

/// A single normal path component with no separators of either platform.
fn is_plain_filename(name: &str) -> bool {
    if name.trim().is_empty() || name.contains(&['/', '\\', ':'][..]) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
