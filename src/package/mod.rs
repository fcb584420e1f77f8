mod manifest;
mod requirement;
mod version;

pub use manifest::{Manifest, REPORTED_PACKAGES};
pub use requirement::{InstallFlag, InstallRequest, PackageRequirement};
pub use version::DesiredVersion;
