//! Environment variables handed to the server process.

use anyhow::Result;
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::layout::AppLayout;
use crate::runtime::Runtime;

/// Consumed: root of the Python installation environment.
pub const INSTALL_ENV_DIR: &str = "INSTALL_ENV_DIR";
/// Produced: where the server imports the application UI code from.
pub const SD_UI_PATH: &str = "SD_UI_PATH";
/// Produced: module search path override.
pub const PYTHONPATH: &str = "PYTHONPATH";

const FALLBACK_PYTHON_DIR: &str = "python3.12";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchEnvironment {
    pub ui_path: PathBuf,
    /// `None` when `INSTALL_ENV_DIR` is not set.
    pub python_path: Option<PathBuf>,
}

impl LaunchEnvironment {
    #[tracing::instrument(skip(runtime, layout))]
    pub fn resolve<R: Runtime>(runtime: &R, layout: &AppLayout) -> Result<Self> {
        let python_path = match runtime.env_var(INSTALL_ENV_DIR) {
            Ok(dir) if !dir.is_empty() => Some(site_packages(runtime, Path::new(&dir))?),
            _ => {
                warn!("{} is not set, leaving {} unchanged", INSTALL_ENV_DIR, PYTHONPATH);
                None
            }
        };

        Ok(Self {
            ui_path: layout.ui_dir(),
            python_path,
        })
    }

    pub fn vars(&self) -> Vec<(String, String)> {
        let mut vars = vec![(
            SD_UI_PATH.to_string(),
            self.ui_path.to_string_lossy().into_owned(),
        )];
        if let Some(path) = &self.python_path {
            vars.push((PYTHONPATH.to_string(), path.to_string_lossy().into_owned()));
        }
        vars
    }
}

#[cfg(windows)]
fn site_packages<R: Runtime>(_runtime: &R, env_dir: &Path) -> Result<PathBuf> {
    Ok(env_dir.join("lib").join("site-packages"))
}

#[cfg(not(windows))]
fn site_packages<R: Runtime>(runtime: &R, env_dir: &Path) -> Result<PathBuf> {
    let lib_dir = glob::Pattern::escape(&env_dir.join("lib").to_string_lossy());
    let pattern = format!("{}/python3*/site-packages", lib_dir);
    let found = runtime
        .glob(&pattern)?
        .into_iter()
        .find(|p| runtime.is_dir(p));

    match found {
        Some(path) => {
            debug!("Found site-packages at {:?}", path);
            Ok(path)
        }
        None => Ok(env_dir
            .join("lib")
            .join(FALLBACK_PYTHON_DIR)
            .join("site-packages")),
    }
}
