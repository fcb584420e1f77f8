use crate::package::InstallRequest;

/// What happened to a single manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Already at an acceptable version; nothing was run.
    UpToDate { version: String },
    /// A local editable checkout exists; never installed.
    Editable,
    /// Installed successfully.
    Installed {
        previous: Option<String>,
        version: Option<String>,
    },
    /// Install succeeded but a different version is still reported.
    VersionMismatch {
        requested: String,
        observed: Option<String>,
    },
}

impl Outcome {
    pub fn ran_install(&self) -> bool {
        matches!(
            self,
            Outcome::Installed { .. } | Outcome::VersionMismatch { .. }
        )
    }
}

/// Per-entry outcomes, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    entries: Vec<(String, Outcome)>,
}

impl ReconcileReport {
    pub(crate) fn push(&mut self, name: String, outcome: Outcome) {
        self.entries.push((name, outcome));
    }

    pub fn entries(&self) -> &[(String, Outcome)] {
        &self.entries
    }

    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, o)| o)
    }

    pub fn install_count(&self) -> usize {
        self.entries.iter().filter(|(_, o)| o.ran_install()).count()
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, o)| matches!(o, Outcome::VersionMismatch { .. }))
            .map(|(n, _)| n.as_str())
    }
}

/// An install action `plan` would issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAction {
    pub request: InstallRequest,
    pub installed: Option<String>,
}

impl std::fmt::Display for PlannedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.installed {
            Some(version) => write!(f, "{} (installed: {})", self.request, version),
            None => write!(f, "{} (not installed)", self.request),
        }
    }
}
