//! Ordered package manifests.
//!
//! Order is significant: some packages must be in place before others so
//! that a later installer does not pull an incompatible transitive version.
//! Entries are always processed strictly in listed order.

use super::{InstallFlag, PackageRequirement};

/// Packages whose installed versions are printed after reconciliation.
pub const REPORTED_PACKAGES: &[&str] = &[
    "torchruntime",
    "torch",
    "torchvision",
    "sdkit",
    "stable-diffusion-sdkit",
    "diffusers",
    "huggingface-hub",
    "uvicorn",
    "python-multipart",
    "ruamel.yaml",
];

/// An ordered, immutable list of package requirements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest {
    requirements: Vec<PackageRequirement>,
}

impl Manifest {
    pub fn new(requirements: Vec<PackageRequirement>) -> Self {
        Self { requirements }
    }

    /// Packages the application needs on every machine.
    pub fn core() -> Self {
        Self::new(vec![
            PackageRequirement::exact("ruamel.yaml", "0.17.21"),
            PackageRequirement::exact("sqlalchemy", "2.0.19"),
            PackageRequirement::exact("wandb", "0.17.2"),
            PackageRequirement::exact("torchsde", "0.2.6"),
            // No prebuilt wheels for current Python releases
            PackageRequirement::exact("basicsr", "1.4.2")
                .with_flag(InstallFlag::LegacyBuildBackend),
            PackageRequirement::exact("gfpgan", "1.3.8")
                .with_flag(InstallFlag::LegacyBuildBackend),
        ])
    }

    /// Packages only installed when a compatible accelerator is present.
    pub fn accelerator() -> Self {
        // xformers would otherwise replace the installed torch build
        Self::new(vec![
            PackageRequirement::latest("xformers").with_flag(InstallFlag::SkipDependencies),
        ])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PackageRequirement> {
        self.requirements.iter()
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }
}

impl FromIterator<PackageRequirement> for Manifest {
    fn from_iter<T: IntoIterator<Item = PackageRequirement>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a PackageRequirement;
    type IntoIter = std::slice::Iter<'a, PackageRequirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
