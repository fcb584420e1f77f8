//! Dependency reconciliation.
//!
//! Brings the package environment into agreement with a [`Manifest`]:
//! entries are visited strictly in manifest order, each decision is made on
//! a fresh query, and the first failed install stops the run. There is no
//! retry and no rollback.

mod error;
mod report;

use log::{debug, info, warn};
use std::path::PathBuf;

use crate::environment::PackageEnvironment;
use crate::package::{Manifest, PackageRequirement};
use crate::probe::{Capability, CapabilityProbe};
use crate::runtime::Runtime;

pub use error::ReconcileError;
pub use report::{Outcome, PlannedAction, ReconcileReport};

enum Decision {
    Editable,
    Satisfied(String),
    Install { installed: Option<String> },
}

pub struct Reconciler<'a, R: Runtime, E: PackageEnvironment + ?Sized> {
    runtime: &'a R,
    environment: &'a E,
    checkouts_dir: PathBuf,
}

impl<'a, R: Runtime, E: PackageEnvironment + ?Sized> Reconciler<'a, R, E> {
    pub fn new(runtime: &'a R, environment: &'a E, checkouts_dir: PathBuf) -> Self {
        Self {
            runtime,
            environment,
            checkouts_dir,
        }
    }

    fn is_editable_checkout(&self, name: &str) -> bool {
        self.runtime.is_dir(&self.checkouts_dir.join(name))
    }

    /// Installed version, with query failures treated as "not installed".
    fn installed_version(&self, name: &str) -> Option<String> {
        match self.environment.query(name) {
            Ok(version) => version,
            Err(e) => {
                warn!("Could not query {}: {:#}; treating it as not installed", name, e);
                None
            }
        }
    }

    fn decide(&self, requirement: &PackageRequirement) -> Decision {
        if self.is_editable_checkout(&requirement.name) {
            return Decision::Editable;
        }

        let installed = self.installed_version(&requirement.name);
        if requirement.desired.needs_install(installed.as_deref()) {
            Decision::Install { installed }
        } else {
            // needs_install is false only for a present version
            Decision::Satisfied(installed.unwrap_or_default())
        }
    }

    /// Install actions `reconcile` would issue right now, without running any.
    #[tracing::instrument(skip(self, manifest))]
    pub fn plan(&self, manifest: &Manifest) -> Vec<PlannedAction> {
        manifest
            .iter()
            .filter_map(|requirement| match self.decide(requirement) {
                Decision::Install { installed } => Some(PlannedAction {
                    request: requirement.install_request(installed.as_deref()),
                    installed,
                }),
                Decision::Editable | Decision::Satisfied(_) => None,
            })
            .collect()
    }

    #[tracing::instrument(skip(self, manifest))]
    pub fn reconcile(&self, manifest: &Manifest) -> Result<ReconcileReport, ReconcileError> {
        let mut report = ReconcileReport::default();

        for requirement in manifest {
            let outcome = match self.decide(requirement) {
                Decision::Editable => {
                    println!(
                        "Skipping {} update, since it's in developer/editable mode",
                        requirement.name
                    );
                    Outcome::Editable
                }
                Decision::Satisfied(version) => {
                    debug!("{} {} is up to date", requirement.name, version);
                    Outcome::UpToDate { version }
                }
                Decision::Install { installed } => self.install(requirement, installed)?,
            };
            report.push(requirement.name.clone(), outcome);
        }

        info!(
            "Reconciled {} package(s), {} install(s)",
            report.entries().len(),
            report.install_count()
        );
        Ok(report)
    }

    fn install(
        &self,
        requirement: &PackageRequirement,
        previous: Option<String>,
    ) -> Result<Outcome, ReconcileError> {
        let request = requirement.install_request(previous.as_deref());
        debug!(
            "Installing {} (currently {:?})",
            request.specifier(),
            previous
        );

        let status = self
            .environment
            .install(&request)
            .map_err(|e| ReconcileError::Spawn {
                package: requirement.name.clone(),
                reason: format!("{:#}", e),
            })?;
        if !status.success() {
            return Err(ReconcileError::InstallFailed {
                package: requirement.name.clone(),
                status,
            });
        }

        let observed = self.installed_version(&requirement.name);
        let Some(target) = request.version else {
            return Ok(Outcome::Installed {
                previous,
                version: observed,
            });
        };

        if observed.as_deref() == Some(target.as_str()) {
            Ok(Outcome::Installed {
                previous,
                version: observed,
            })
        } else {
            // Some package managers silently refuse downgrades
            let shown = observed.as_deref().unwrap_or("None");
            warn!("{} is at {} after installing {}", requirement.name, shown, target);
            eprintln!(
                "WARNING! Tried to install {}=={}, but the version is still {}!",
                requirement.name, target, shown
            );
            Ok(Outcome::VersionMismatch {
                requested: target,
                observed,
            })
        }
    }

    /// Reconcile `manifest` only when `probe` reports the capability present.
    ///
    /// An unavailable probe is a warning, never a failure.
    #[tracing::instrument(skip(self, manifest, probe))]
    pub fn reconcile_if_capable<P: CapabilityProbe + ?Sized>(
        &self,
        manifest: &Manifest,
        probe: &P,
    ) -> Result<Option<ReconcileReport>, ReconcileError> {
        match probe.detect() {
            Ok(Capability::Present) => {
                info!("Accelerator detected, reconciling {} package(s)", manifest.len());
                self.reconcile(manifest).map(Some)
            }
            Ok(Capability::Absent) => {
                info!("No compatible accelerator, skipping accelerator packages");
                Ok(None)
            }
            Err(e) => {
                warn!("Accelerator probe unavailable: {:#}", e);
                eprintln!(
                    "Warning: could not detect accelerator hardware ({:#}), skipping accelerator packages",
                    e
                );
                Ok(None)
            }
        }
    }

    /// Installed versions of `names`, for diagnostics.
    pub fn installed_versions(&self, names: &[&str]) -> Vec<(String, Option<String>)> {
        names
            .iter()
            .map(|name| (name.to_string(), self.installed_version(name)))
            .collect()
    }
}
