//! File locations derived from the application root.

use std::path::{Path, PathBuf};

/// Layout of an application checkout.
///
/// ```text
/// <root>/
///   config.yaml               canonical config
///   scripts/config.yaml       legacy config (migrated on load)
///   scripts/config.json       JSON config fallback
///   scripts/install_status.txt
///   src/<package>/            editable checkouts
///   ui/                       server application code
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppLayout {
    root: PathBuf,
}

impl AppLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join("scripts")
    }

    /// Directory holding editable/developer checkouts of packages.
    pub fn checkouts_dir(&self) -> PathBuf {
        self.root.join("src")
    }

    pub fn ui_dir(&self) -> PathBuf {
        self.root.join("ui")
    }

    pub fn canonical_config(&self) -> PathBuf {
        self.root.join("config.yaml")
    }

    pub fn legacy_config(&self) -> PathBuf {
        self.scripts_dir().join("config.yaml")
    }

    pub fn json_config(&self) -> PathBuf {
        self.scripts_dir().join("config.json")
    }

    pub fn status_file(&self) -> PathBuf {
        self.scripts_dir().join("install_status.txt")
    }
}
