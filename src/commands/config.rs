use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::launch::INSTALL_ENV_DIR;
use crate::layout::AppLayout;
use crate::runtime::Runtime;

/// Settings for one invocation, resolved from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub layout: AppLayout,
    pub python: PathBuf,
    pub skip_accelerator: bool,
}

impl Config {
    pub fn new<R: Runtime>(
        runtime: &R,
        root: Option<PathBuf>,
        python: Option<PathBuf>,
        skip_accelerator: bool,
    ) -> Result<Self> {
        let root = match root {
            Some(path) => path,
            None => runtime.current_dir()?,
        };
        let python = match python {
            Some(path) => path,
            None => default_python(runtime),
        };
        debug!("Using application root {:?} and interpreter {:?}", root, python);

        Ok(Self {
            layout: AppLayout::new(root),
            python,
            skip_accelerator,
        })
    }
}

/// The interpreter inside `INSTALL_ENV_DIR` when present, else `python`
/// from `PATH`.
fn default_python<R: Runtime>(runtime: &R) -> PathBuf {
    if let Ok(dir) = runtime.env_var(INSTALL_ENV_DIR) {
        let dir = PathBuf::from(dir);
        #[cfg(windows)]
        let candidate = dir.join("python.exe");
        #[cfg(not(windows))]
        let candidate = dir.join("bin").join("python");

        if runtime.is_file(&candidate) {
            return candidate;
        }
        debug!("No interpreter at {:?}", candidate);
    }
    PathBuf::from("python")
}
