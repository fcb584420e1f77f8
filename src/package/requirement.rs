use std::collections::BTreeSet;
use std::fmt;

use super::DesiredVersion;

/// Package-manager options a requirement can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InstallFlag {
    /// Do not resolve or install transitive dependencies (`--no-deps`).
    SkipDependencies,
    /// Build through the PEP 517 backend for packages without a prebuilt
    /// wheel on this platform (`--use-pep517`).
    LegacyBuildBackend,
    /// Reduce installer output (`-q`), only when upgrading a copy that is
    /// already installed.
    QuietUpgrade,
}

impl InstallFlag {
    pub fn as_pip_arg(&self) -> &'static str {
        match self {
            InstallFlag::SkipDependencies => "--no-deps",
            InstallFlag::LegacyBuildBackend => "--use-pep517",
            InstallFlag::QuietUpgrade => "-q",
        }
    }
}

/// A single manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequirement {
    pub name: String,
    pub desired: DesiredVersion,
    pub flags: BTreeSet<InstallFlag>,
    pub index_url: Option<String>,
}

impl PackageRequirement {
    pub fn exact(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(name, DesiredVersion::exact(version))
    }

    pub fn latest(name: impl Into<String>) -> Self {
        Self::new(name, DesiredVersion::Latest)
    }

    pub fn new(name: impl Into<String>, desired: DesiredVersion) -> Self {
        Self {
            name: name.into(),
            desired,
            flags: BTreeSet::new(),
            index_url: None,
        }
    }

    pub fn with_flag(mut self, flag: InstallFlag) -> Self {
        self.flags.insert(flag);
        self
    }

    pub fn with_index_url(mut self, url: impl Into<String>) -> Self {
        self.index_url = Some(url.into());
        self
    }

    /// Build the install action for this requirement given the currently
    /// installed version.
    pub fn install_request(&self, installed: Option<&str>) -> InstallRequest {
        let mut flags = self.flags.clone();
        if installed.is_none() {
            flags.remove(&InstallFlag::QuietUpgrade);
        }
        InstallRequest {
            name: self.name.clone(),
            version: self.desired.target().map(String::from),
            flags,
            index_url: self.index_url.clone(),
        }
    }
}

impl fmt::Display for PackageRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.desired)
    }
}

/// A concrete install action handed to the package environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    pub name: String,
    /// Version pin; `None` installs the newest available.
    pub version: Option<String>,
    pub flags: BTreeSet<InstallFlag>,
    pub index_url: Option<String>,
}

impl InstallRequest {
    /// Requirement specifier in pip syntax (`name==version` or `name`).
    pub fn specifier(&self) -> String {
        match &self.version {
            Some(version) => format!("{}=={}", self.name, version),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for InstallRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.specifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_request_pins_exact_version() {
        let req = PackageRequirement::exact("basicsr", "1.4.2")
            .with_flag(InstallFlag::LegacyBuildBackend);
        let request = req.install_request(None);

        assert_eq!(request.specifier(), "basicsr==1.4.2");
        assert!(request.flags.contains(&InstallFlag::LegacyBuildBackend));
        assert_eq!(request.index_url, None);
    }

    #[test]
    fn test_install_request_latest_has_no_pin() {
        let req = PackageRequirement::latest("xformers")
            .with_flag(InstallFlag::SkipDependencies)
            .with_index_url("https://download.example.org/whl");
        let request = req.install_request(Some("0.0.27"));

        assert_eq!(request.version, None);
        assert_eq!(request.specifier(), "xformers");
        assert_eq!(
            request.index_url.as_deref(),
            Some("https://download.example.org/whl")
        );
    }

    #[test]
    fn test_install_request_any_of_pins_last() {
        let req = PackageRequirement::new("gfpgan", DesiredVersion::any_of(["1.3.7", "1.3.8"]));
        assert_eq!(req.install_request(None).specifier(), "gfpgan==1.3.8");
    }

    #[test]
    fn test_flags_map_to_pip_args() {
        assert_eq!(InstallFlag::SkipDependencies.as_pip_arg(), "--no-deps");
        assert_eq!(InstallFlag::LegacyBuildBackend.as_pip_arg(), "--use-pep517");
        assert_eq!(InstallFlag::QuietUpgrade.as_pip_arg(), "-q");
    }

    #[test]
    fn test_duplicate_flags_collapse() {
        let req = PackageRequirement::latest("x")
            .with_flag(InstallFlag::QuietUpgrade)
            .with_flag(InstallFlag::QuietUpgrade);
        assert_eq!(req.flags.len(), 1);
    }

    #[test]
    fn test_quiet_upgrade_only_applies_over_installed_copy() {
        let req = PackageRequirement::exact("sdkit", "2.0.15")
            .with_flag(InstallFlag::QuietUpgrade)
            .with_flag(InstallFlag::SkipDependencies);

        let fresh = req.install_request(None);
        assert!(!fresh.flags.contains(&InstallFlag::QuietUpgrade));
        assert!(fresh.flags.contains(&InstallFlag::SkipDependencies));

        let upgrade = req.install_request(Some("2.0.14"));
        assert!(upgrade.flags.contains(&InstallFlag::QuietUpgrade));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            PackageRequirement::exact("wandb", "0.17.2").to_string(),
            "wandb (==0.17.2)"
        );
    }
}
