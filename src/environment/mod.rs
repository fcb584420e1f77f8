//! The installed package environment.
//!
//! The reconciler only sees the environment through [`PackageEnvironment`]:
//! a fresh `query` before every decision and an `install` that reports the
//! package manager's exit status. Nothing is cached between calls because
//! every install may change what is installed.

mod pip;

#[cfg(test)]
pub(crate) mod memory;

use anyhow::Result;

use crate::package::InstallRequest;
use crate::runtime::CommandStatus;

pub use pip::PipEnvironment;

#[cfg_attr(test, mockall::automock)]
pub trait PackageEnvironment {
    /// Installed version of `name`, or `None` when it is not installed.
    fn query(&self, name: &str) -> Result<Option<String>>;

    /// Run the package manager for `request`.
    ///
    /// `Err` means the package manager could not be started at all; a
    /// started-but-failed install is reported through the status.
    fn install(&self, request: &InstallRequest) -> Result<CommandStatus>;
}
