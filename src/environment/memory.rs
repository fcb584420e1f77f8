//! In-memory package environment for tests.

use anyhow::{Result, bail};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::package::InstallRequest;
use crate::runtime::CommandStatus;

use super::PackageEnvironment;

#[derive(Default)]
pub(crate) struct InMemoryEnvironment {
    installed: RefCell<HashMap<String, String>>,
    installs: RefCell<Vec<InstallRequest>>,
    failing: HashSet<String>,
    unstartable: HashSet<String>,
    /// Packages whose install "succeeds" without changing the version.
    sticky: HashSet<String>,
    /// Version installed when a request carries no pin.
    latest: HashMap<String, String>,
    broken_query: bool,
}

impl InMemoryEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_installed(self, name: &str, version: &str) -> Self {
        self.installed
            .borrow_mut()
            .insert(name.to_string(), version.to_string());
        self
    }

    pub fn with_latest(mut self, name: &str, version: &str) -> Self {
        self.latest.insert(name.to_string(), version.to_string());
        self
    }

    pub fn failing(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn unstartable(mut self, name: &str) -> Self {
        self.unstartable.insert(name.to_string());
        self
    }

    pub fn sticky(mut self, name: &str) -> Self {
        self.sticky.insert(name.to_string());
        self
    }

    pub fn broken_query(mut self) -> Self {
        self.broken_query = true;
        self
    }

    pub fn installs(&self) -> Vec<InstallRequest> {
        self.installs.borrow().clone()
    }

    pub fn installed_names(&self) -> Vec<String> {
        self.installs.borrow().iter().map(|r| r.name.clone()).collect()
    }

    pub fn version_of(&self, name: &str) -> Option<String> {
        self.installed.borrow().get(name).cloned()
    }
}

impl PackageEnvironment for InMemoryEnvironment {
    fn query(&self, name: &str) -> Result<Option<String>> {
        if self.broken_query {
            bail!("pip is not available");
        }
        Ok(self.version_of(name))
    }

    fn install(&self, request: &InstallRequest) -> Result<CommandStatus> {
        self.installs.borrow_mut().push(request.clone());

        if self.unstartable.contains(&request.name) {
            bail!("No such file or directory");
        }
        if self.failing.contains(&request.name) {
            return Ok(CommandStatus::from_code(1));
        }
        if !self.sticky.contains(&request.name) {
            let version = request
                .version
                .clone()
                .or_else(|| self.latest.get(&request.name).cloned())
                .unwrap_or_else(|| "0.0.0".to_string());
            self.installed
                .borrow_mut()
                .insert(request.name.clone(), version);
        }
        Ok(CommandStatus::from_code(0))
    }
}
