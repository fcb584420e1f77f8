use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;

use crate::runtime::Runtime;

/// Lines appended once installation is complete and the server is about to
/// start. An external orchestrator watches for them.
pub const INSTALL_CHECKPOINTS: &[&str] = &["sd_weights_downloaded", "sd_install_complete"];

/// Append-only status marker file.
pub struct StatusMarker<'a, R: Runtime> {
    runtime: &'a R,
    path: PathBuf,
}

impl<'a, R: Runtime> StatusMarker<'a, R> {
    pub fn new(runtime: &'a R, path: PathBuf) -> Self {
        Self { runtime, path }
    }

    /// Append one line per checkpoint. Earlier content is never truncated.
    #[tracing::instrument(skip(self))]
    pub fn append(&self, checkpoints: &[&str]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !self.runtime.is_dir(parent) {
                self.runtime.create_dir_all(parent)?;
            }
        }

        let mut contents = String::new();
        for checkpoint in checkpoints {
            contents.push_str(checkpoint);
            contents.push('\n');
        }
        self.runtime
            .append(&self.path, contents.as_bytes())
            .with_context(|| format!("Failed to update status file {}", self.path.display()))?;
        debug!("Appended {:?} to {:?}", checkpoints, self.path);
        Ok(())
    }
}
