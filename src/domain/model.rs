use std::path::PathBuf;

use serde::Deserialize;

/// One downloadable item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogEntry {
    label: String,
    source_url: String,
    destination_filename: String,
}

impl CatalogEntry {
    pub fn new(
        label: impl Into<String>,
        source_url: impl Into<String>,
        destination_filename: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            source_url: source_url.into(),
            destination_filename: destination_filename.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn destination_filename(&self) -> &str {
        &self.destination_filename
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    name: String,
    entries: Vec<CatalogEntry>,
}

impl Category {
    pub fn new(name: impl Into<String>, entries: Vec<CatalogEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

/// Per-entry state shown next to each install button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryStatus {
    #[default]
    NotInstalled,
    Downloading,
    Installed,
    Skipped,
    Failed,
}

impl EntryStatus {
    pub fn caption(self) -> &'static str {
        match self {
            EntryStatus::NotInstalled => "Not installed",
            EntryStatus::Downloading => "Downloading...",
            EntryStatus::Installed => "Installed",
            EntryStatus::Skipped => "Skipped",
            EntryStatus::Failed => "Failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed(PathBuf),
    /// The destination existed and the user declined to overwrite it.
    Skipped,
    Failed(String),
}

/// Result of one install attempt for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub entry: CatalogEntry,
    pub outcome: InstallOutcome,
}

impl InstallReport {
    pub fn status(&self) -> EntryStatus {
        match self.outcome {
            InstallOutcome::Installed(_) => EntryStatus::Installed,
            InstallOutcome::Skipped => EntryStatus::Skipped,
            InstallOutcome::Failed(_) => EntryStatus::Failed,
        }
    }

    /// The single on-screen log line for this attempt.
    pub fn log_line(&self) -> String {
        let label = self.entry.label();
        match &self.outcome {
            InstallOutcome::Installed(path) => {
                format!("Installed {} → {}", label, path.display())
            }
            InstallOutcome::Skipped => format!("Skipped {}", label),
            InstallOutcome::Failed(reason) => format!("Failed {}: {}", label, reason),
        }
    }
}
