use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::package::InstallRequest;
use crate::runtime::{CommandSpec, CommandStatus, Runtime};

use super::PackageEnvironment;

/// Package environment backed by `python -m pip`.
pub struct PipEnvironment<'a, R: Runtime> {
    runtime: &'a R,
    python: PathBuf,
}

impl<'a, R: Runtime> PipEnvironment<'a, R> {
    pub fn new(runtime: &'a R, python: PathBuf) -> Self {
        Self { runtime, python }
    }

    pub fn python(&self) -> &Path {
        &self.python
    }

    fn pip(&self) -> CommandSpec {
        CommandSpec::new(&self.python).args(["-m", "pip"])
    }

    /// Build the `pip install` command line for a request.
    pub fn install_command(&self, request: &InstallRequest) -> CommandSpec {
        let mut command = self
            .pip()
            .args(["install", "--upgrade"])
            .arg(request.specifier());

        if let Some(url) = &request.index_url {
            command = command.args(["--index-url", url.as_str()]);
        }
        for flag in &request.flags {
            command = command.arg(flag.as_pip_arg());
        }
        command
    }
}

/// Extract the `Version:` field from `pip show` output.
fn parse_show_version(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if key.trim().eq_ignore_ascii_case("version") {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        } else {
            None
        }
    })
}

impl<R: Runtime> PackageEnvironment for PipEnvironment<'_, R> {
    #[tracing::instrument(skip(self))]
    fn query(&self, name: &str) -> Result<Option<String>> {
        let command = self.pip().args(["show", name]);
        let output = self
            .runtime
            .output(&command)
            .with_context(|| format!("Failed to query installed version of {}", name))?;

        // pip exits non-zero when the package is not installed
        if !output.success() {
            debug!("{} is not installed ({})", name, output.status);
            return Ok(None);
        }

        let version = parse_show_version(&output.stdout);
        debug!("{} installed version: {:?}", name, version);
        Ok(version)
    }

    #[tracing::instrument(skip(self))]
    fn install(&self, request: &InstallRequest) -> Result<CommandStatus> {
        let command = self.install_command(request);
        println!("> {}", command);
        info!("Installing {}", request);

        let status = self.runtime.run(&command)?;
        debug!("pip install {} finished with {}", request, status);
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{InstallFlag, PackageRequirement};
    use crate::runtime::{CommandOutput, MockRuntime};
    use mockall::predicate::function;

    fn show_output(code: i32, stdout: &str) -> CommandOutput {
        CommandOutput {
            status: CommandStatus::from_code(code),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    #[test]
    fn test_parse_show_version() {
        let stdout = "Name: sqlalchemy\nVersion: 2.0.19\nSummary: Database Abstraction Library\n";
        assert_eq!(parse_show_version(stdout), Some("2.0.19".to_string()));
        assert_eq!(parse_show_version("Name: x\n"), None);
        assert_eq!(parse_show_version("Version:   \n"), None);
    }

    #[test]
    fn test_query_returns_installed_version() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_output()
            .with(function(|c: &CommandSpec| {
                c.program == PathBuf::from("/env/bin/python")
                    && c.args == ["-m", "pip", "show", "wandb"]
            }))
            .times(1)
            .returning(|_| Ok(show_output(0, "Name: wandb\nVersion: 0.17.2\n")));

        let env = PipEnvironment::new(&runtime, PathBuf::from("/env/bin/python"));
        assert_eq!(env.query("wandb").unwrap(), Some("0.17.2".to_string()));
    }

    #[test]
    fn test_query_absent_when_pip_show_fails() {
        let mut runtime = MockRuntime::new();
        runtime.expect_output().returning(|_| {
            Ok(CommandOutput {
                status: CommandStatus::from_code(1),
                stdout: String::new(),
                stderr: "WARNING: Package(s) not found: torchsde".to_string(),
            })
        });

        let env = PipEnvironment::new(&runtime, PathBuf::from("python"));
        assert_eq!(env.query("torchsde").unwrap(), None);
    }

    #[test]
    fn test_query_error_when_python_missing() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_output()
            .returning(|_| Err(anyhow::anyhow!("No such file or directory")));

        let env = PipEnvironment::new(&runtime, PathBuf::from("python"));
        let err = env.query("torchsde").unwrap_err();
        assert!(err.to_string().contains("torchsde"));
    }

    #[test]
    fn test_install_command_exact_with_flags() {
        let runtime = MockRuntime::new();
        let env = PipEnvironment::new(&runtime, PathBuf::from("python"));
        let request = PackageRequirement::exact("gfpgan", "1.3.8")
            .with_flag(InstallFlag::LegacyBuildBackend)
            .with_flag(InstallFlag::QuietUpgrade)
            .install_request(Some("1.3.7"));

        let command = env.install_command(&request);
        assert_eq!(
            command.args,
            vec![
                "-m",
                "pip",
                "install",
                "--upgrade",
                "gfpgan==1.3.8",
                "--use-pep517",
                "-q"
            ]
        );
    }

    #[test]
    fn test_install_command_latest_with_index_url() {
        let runtime = MockRuntime::new();
        let env = PipEnvironment::new(&runtime, PathBuf::from("python"));
        let request = PackageRequirement::latest("xformers")
            .with_flag(InstallFlag::SkipDependencies)
            .with_index_url("https://download.example.org/whl/cu121")
            .install_request(None);

        let command = env.install_command(&request);
        assert_eq!(
            command.args,
            vec![
                "-m",
                "pip",
                "install",
                "--upgrade",
                "xformers",
                "--index-url",
                "https://download.example.org/whl/cu121",
                "--no-deps"
            ]
        );
    }

    #[test]
    fn test_install_reports_exit_status() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_run()
            .with(function(|c: &CommandSpec| c.args.contains(&"sqlalchemy==2.0.19".to_string())))
            .times(1)
            .returning(|_| Ok(CommandStatus::from_code(1)));

        let env = PipEnvironment::new(&runtime, PathBuf::from("python"));
        let request = PackageRequirement::exact("sqlalchemy", "2.0.19").install_request(None);
        let status = env.install(&request).unwrap();
        assert!(!status.success());
    }
}
