//! Config-driven server launch.
//!
//! The launch walks through `UNSTARTED → CONFIG_LOADED → ENV_PREPARED →
//! SERVING`. Each state is its own type so a step cannot be skipped:
//! [`Launcher`] loads the config into a [`ConfiguredLauncher`], which
//! prepares a [`PreparedLaunch`], whose [`PreparedLaunch::serve`] replaces
//! the process with the server.

mod bind;
mod env;
mod status;

use anyhow::Result;
use log::info;
use std::convert::Infallible;
use std::path::{Path, PathBuf};

use crate::config::{AppConfig, ConfigSource, load_config};
use crate::layout::AppLayout;
use crate::runtime::{CommandSpec, Runtime};

pub use bind::{BindTarget, DEFAULT_BIND_IP, DEFAULT_LISTEN_PORT, WILDCARD_BIND_IP};
pub use env::{INSTALL_ENV_DIR, LaunchEnvironment, PYTHONPATH, SD_UI_PATH};
pub use status::{INSTALL_CHECKPOINTS, StatusMarker};

/// ASGI application the server loads from the UI directory.
pub const SERVER_APP: &str = "main:server_api";

/// Run by the interpreter in place of `-m uvicorn`: lets `torchruntime` set
/// up the GPU environment in the server process, then hands the remaining
/// arguments to the uvicorn CLI.
pub const SERVER_BOOTSTRAP: &str = r#"try:
    import torchruntime
    torchruntime.configure()
    if hasattr(torchruntime, "info"):
        torchruntime.info()
except ImportError:
    print("Warning: torchruntime module not found. The server may not function correctly without it.")

from uvicorn.main import main
main(prog_name="uvicorn")
"#;

/// Server command line for a prepared launch.
pub fn server_command(python: &Path, bind: &BindTarget, env: &LaunchEnvironment) -> CommandSpec {
    let mut command = CommandSpec::new(python)
        .args(["-c", SERVER_BOOTSTRAP, SERVER_APP])
        .args(["--host", bind.host.as_str()])
        .arg("--port")
        .arg(bind.port.to_string())
        .args(["--log-level", "error"])
        .arg("--app-dir")
        .arg(env.ui_path.to_string_lossy())
        .arg("--no-access-log");
    for (key, value) in env.vars() {
        command = command.env(key, value);
    }
    command
}

pub struct Launcher<'a, R: Runtime> {
    runtime: &'a R,
    layout: &'a AppLayout,
    python: PathBuf,
}

impl<'a, R: Runtime> Launcher<'a, R> {
    pub fn new(runtime: &'a R, layout: &'a AppLayout, python: PathBuf) -> Self {
        Self {
            runtime,
            layout,
            python,
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn load_config(self) -> ConfiguredLauncher<'a, R> {
        let (config, source) = load_config(self.runtime, self.layout);
        ConfiguredLauncher {
            launcher: self,
            config,
            source,
        }
    }
}

pub struct ConfiguredLauncher<'a, R: Runtime> {
    launcher: Launcher<'a, R>,
    config: AppConfig,
    source: ConfigSource,
}

impl<'a, R: Runtime> ConfiguredLauncher<'a, R> {
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// Derive bind parameters and environment, and record the install
    /// checkpoints in the status file.
    #[tracing::instrument(skip(self))]
    pub fn prepare(self) -> Result<PreparedLaunch<'a, R>> {
        let Launcher {
            runtime,
            layout,
            python,
        } = self.launcher;

        println!("{}", self.config.to_pretty_string());

        StatusMarker::new(runtime, layout.status_file()).append(INSTALL_CHECKPOINTS)?;
        println!("\n\nEasy Diffusion installation complete, starting the server!\n\n");

        let environment = LaunchEnvironment::resolve(runtime, layout)?;
        if let Some(path) = &environment.python_path {
            println!("{}={}", PYTHONPATH, path.display());
        }
        let interpreter = runtime
            .which(&python.to_string_lossy())
            .unwrap_or_else(|| python.clone());
        println!("Python:  {}", interpreter.display());

        let net = self.config.net();
        let bind = BindTarget::from_net(&net);
        if net.listen_port.is_some() {
            println!("Set listen port to {}", bind.port);
        }
        if bind.host != DEFAULT_BIND_IP {
            println!("Set bind_ip to {}", bind.host);
        }
        info!("Server will listen on {}", bind);

        Ok(PreparedLaunch {
            runtime,
            command: server_command(&python, &bind, &environment),
            bind,
        })
    }
}

pub struct PreparedLaunch<'a, R: Runtime> {
    runtime: &'a R,
    bind: BindTarget,
    command: CommandSpec,
}

impl<R: Runtime> PreparedLaunch<'_, R> {
    pub fn bind(&self) -> &BindTarget {
        &self.bind
    }

    pub fn command(&self) -> &CommandSpec {
        &self.command
    }

    /// Hand the process over to the server. Returns only if it cannot start.
    #[tracing::instrument(skip(self))]
    pub fn serve(self) -> Result<Infallible> {
        println!("\nLaunching uvicorn\n");
        info!("Starting server: {}", self.command);
        self.runtime.exec(&self.command)
    }
}
