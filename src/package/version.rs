//! Desired-version constraints for manifest entries.
//!
//! Versions are compared as plain strings. pip normalizes what it reports,
//! so manifest entries must be written the way `pip show` prints them.

/// Version constraint for a manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DesiredVersion {
    /// Always install the newest available version.
    #[default]
    Latest,
    /// Match exact version (e.g., "2.0.19")
    Exact(String),
    /// Any listed version is acceptable; the last one is installed when
    /// none of them is present.
    AnyOf(Vec<String>),
}

impl DesiredVersion {
    pub fn exact(version: impl Into<String>) -> Self {
        DesiredVersion::Exact(version.into())
    }

    pub fn any_of<I, S>(versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DesiredVersion::AnyOf(versions.into_iter().map(Into::into).collect())
    }

    /// Whether `installed` (None = absent) requires an install action.
    ///
    /// `Latest` always does: there is nothing meaningful to compare against.
    pub fn needs_install(&self, installed: Option<&str>) -> bool {
        match self {
            DesiredVersion::Latest => true,
            DesiredVersion::Exact(version) => installed != Some(version.as_str()),
            DesiredVersion::AnyOf(versions) => match installed {
                Some(installed) => !versions.iter().any(|v| v == installed),
                None => true,
            },
        }
    }

    /// The version pin passed to the package manager, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            DesiredVersion::Latest => None,
            DesiredVersion::Exact(version) => Some(version),
            DesiredVersion::AnyOf(versions) => versions.last().map(String::as_str),
        }
    }
}

impl std::fmt::Display for DesiredVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DesiredVersion::Latest => write!(f, "latest"),
            DesiredVersion::Exact(version) => write!(f, "=={}", version),
            DesiredVersion::AnyOf(versions) => write!(f, "one of [{}]", versions.join(", ")),
        }
    }
}
