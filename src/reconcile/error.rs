use crate::runtime::CommandStatus;

const TROUBLESHOOTING_URL: &str =
    "https://github.com/easydiffusion/easydiffusion/wiki/Troubleshooting";
const COMMUNITY_URL: &str = "https://discord.com/invite/u9yhsFmEkB";
const ISSUES_URL: &str = "https://github.com/easydiffusion/easydiffusion/issues";

/// Fatal reconciliation failure. Nothing after the failing entry was touched.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("failed to start the installer for {package}: {reason}")]
    Spawn { package: String, reason: String },

    #[error("installing {package} failed with {status}")]
    InstallFailed {
        package: String,
        status: CommandStatus,
    },
}

impl ReconcileError {
    pub fn package(&self) -> &str {
        match self {
            ReconcileError::Spawn { package, .. } => package,
            ReconcileError::InstallFailed { package, .. } => package,
        }
    }

    /// Operator-facing troubleshooting text.
    pub fn remediation(&self) -> String {
        format!(
            "Error installing {}. Sorry about that, please try to:\n\
             1. Run this installer again.\n\
             2. If that doesn't fix it, please try the common troubleshooting steps at {}\n\
             3. If those steps don't help, please copy *all* the error messages in this window, and ask the community at {}\n\
             4. If that doesn't solve the problem, please file an issue at {}\n\
             Thanks!",
            self.package(),
            TROUBLESHOOTING_URL,
            COMMUNITY_URL,
            ISSUES_URL
        )
    }
}
