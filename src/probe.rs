//! Hardware capability probing.
//!
//! The probe gates the accelerator manifest. It is an external check: this
//! crate only runs it and interprets the answer.

use anyhow::{Result, anyhow};
use log::debug;

use crate::runtime::{CommandSpec, Runtime};

/// Outcome of a successful probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Present,
    Absent,
}

#[cfg_attr(test, mockall::automock)]
pub trait CapabilityProbe {
    /// `Err` means the probe itself is unavailable, not that the hardware is.
    fn detect(&self) -> Result<Capability>;
}

/// Probe that runs a detection command: exit 0 means present.
pub struct CommandProbe<'a, R: Runtime> {
    runtime: &'a R,
    command: CommandSpec,
}

impl<'a, R: Runtime> CommandProbe<'a, R> {
    pub fn new(runtime: &'a R, command: CommandSpec) -> Self {
        Self { runtime, command }
    }

    /// Detect NVIDIA GPUs with `nvidia-smi -L`.
    pub fn nvidia(runtime: &'a R) -> Self {
        Self::new(runtime, CommandSpec::new("nvidia-smi").arg("-L"))
    }
}

impl<R: Runtime> CapabilityProbe for CommandProbe<'_, R> {
    #[tracing::instrument(skip(self))]
    fn detect(&self) -> Result<Capability> {
        let program = self.command.program.to_string_lossy();
        let resolved = self
            .runtime
            .which(&program)
            .ok_or_else(|| anyhow!("{} not found", program))?;
        debug!("Running capability probe {}", resolved.display());

        let output = self.runtime.output(&self.command)?;
        if output.success() {
            debug!("Probe output: {}", output.stdout.trim());
            Ok(Capability::Present)
        } else {
            Ok(Capability::Absent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{CommandOutput, CommandStatus, MockRuntime};
    use mockall::predicate::eq;
    use std::path::PathBuf;

    fn output(code: i32) -> CommandOutput {
        CommandOutput {
            status: CommandStatus::from_code(code),
            stdout: "GPU 0: NVIDIA GeForce RTX 3060".to_string(),
            stderr: String::new(),
        }
    }

    #[test]
    fn test_probe_present() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_which()
            .with(eq("nvidia-smi"))
            .returning(|_| Some(PathBuf::from("/usr/bin/nvidia-smi")));
        runtime
            .expect_output()
            .withf(|c| c.args == ["-L"])
            .returning(|_| Ok(output(0)));

        let probe = CommandProbe::nvidia(&runtime);
        assert_eq!(probe.detect().unwrap(), Capability::Present);
    }

    #[test]
    fn test_probe_absent_on_failure_exit() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_which()
            .returning(|_| Some(PathBuf::from("/usr/bin/nvidia-smi")));
        runtime.expect_output().returning(|_| Ok(output(9)));

        let probe = CommandProbe::nvidia(&runtime);
        assert_eq!(probe.detect().unwrap(), Capability::Absent);
    }

    #[test]
    fn test_probe_unavailable_when_not_on_path() {
        let mut runtime = MockRuntime::new();
        runtime.expect_which().returning(|_| None);
        runtime.expect_output().never();

        let probe = CommandProbe::nvidia(&runtime);
        let err = probe.detect().unwrap_err();
        assert!(err.to_string().contains("nvidia-smi not found"));
    }
}
