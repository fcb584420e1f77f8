use anyhow::Result;
use log::info;
use std::convert::Infallible;

use crate::{
    environment::PackageEnvironment,
    launch::Launcher,
    package::{Manifest, REPORTED_PACKAGES},
    probe::CapabilityProbe,
    reconcile::Reconciler,
    runtime::Runtime,
};

pub mod config;
mod services;

use config::Config;
use services::Services;

/// Reconcile the core manifest, then the accelerator manifest when the
/// hardware supports it. A failed install surfaces as a `ReconcileError`.
#[tracing::instrument(skip(runtime, config))]
pub fn setup<R: Runtime>(runtime: &R, config: &Config) -> Result<()> {
    let services = Services::from_config(runtime, config);
    setup_with(runtime, config, &services.environment, &services.probe)
}

pub(crate) fn setup_with<R, E, P>(
    runtime: &R,
    config: &Config,
    environment: &E,
    probe: &P,
) -> Result<()>
where
    R: Runtime,
    E: PackageEnvironment + ?Sized,
    P: CapabilityProbe + ?Sized,
{
    let reconciler = Reconciler::new(runtime, environment, config.layout.checkouts_dir());

    println!("Checking modules...");
    let report = reconciler.reconcile(&Manifest::core())?;
    info!("Core packages: {} install(s)", report.install_count());

    if config.skip_accelerator {
        info!("Accelerator packages skipped by request");
    } else if let Some(report) =
        reconciler.reconcile_if_capable(&Manifest::accelerator(), probe)?
    {
        info!("Accelerator packages: {} install(s)", report.install_count());
    }

    for (name, version) in reconciler.installed_versions(REPORTED_PACKAGES) {
        println!("{}: {}", name, version.as_deref().unwrap_or("None"));
    }
    Ok(())
}

/// Print the install actions a setup run would issue, without running them.
#[tracing::instrument(skip(runtime, config))]
pub fn plan<R: Runtime>(runtime: &R, config: &Config) -> Result<()> {
    let services = Services::from_config(runtime, config);
    plan_with(runtime, config, &services.environment)
}

pub(crate) fn plan_with<R, E>(runtime: &R, config: &Config, environment: &E) -> Result<()>
where
    R: Runtime,
    E: PackageEnvironment + ?Sized,
{
    let reconciler = Reconciler::new(runtime, environment, config.layout.checkouts_dir());
    let actions = reconciler.plan(&Manifest::core());

    if actions.is_empty() {
        println!("All packages are up to date.");
    } else {
        println!("Would install:");
        for action in &actions {
            println!("  {}", action);
        }
    }
    if !config.skip_accelerator {
        println!(
            "Accelerator packages are checked at install time: {}",
            Manifest::accelerator()
                .iter()
                .map(|r| r.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}

/// Load config, prepare the environment, and become the server.
#[tracing::instrument(skip(runtime, config))]
pub fn launch<R: Runtime>(runtime: &R, config: &Config) -> Result<Infallible> {
    Launcher::new(runtime, &config.layout, config.python.clone())
        .load_config()
        .prepare()?
        .serve()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::memory::InMemoryEnvironment;
    use crate::layout::AppLayout;
    use crate::probe::{Capability, MockCapabilityProbe};
    use crate::reconcile::ReconcileError;
    use crate::runtime::MockRuntime;
    use crate::test_utils::{configure_checkouts, test_root};
    use std::path::PathBuf;

    fn test_config(skip_accelerator: bool) -> Config {
        Config {
            layout: AppLayout::new(test_root()),
            python: PathBuf::from("python"),
            skip_accelerator,
        }
    }

    fn fully_installed() -> InMemoryEnvironment {
        Manifest::core()
            .iter()
            .fold(InMemoryEnvironment::new(), |env, r| {
                env.with_installed(&r.name, r.desired.target().unwrap())
            })
    }

    #[test]
    fn test_setup_up_to_date_environment_installs_nothing() {
        let mut runtime = MockRuntime::new();
        configure_checkouts(&mut runtime, &[]);
        let env = fully_installed();
        let mut probe = MockCapabilityProbe::new();
        probe.expect_detect().returning(|| Ok(Capability::Absent));

        setup_with(&runtime, &test_config(false), &env, &probe).unwrap();

        assert!(env.installs().is_empty());
    }

    #[test]
    fn test_setup_runs_accelerator_pass_when_present() {
        let mut runtime = MockRuntime::new();
        configure_checkouts(&mut runtime, &[]);
        let env = fully_installed();
        let mut probe = MockCapabilityProbe::new();
        probe.expect_detect().times(1).returning(|| Ok(Capability::Present));

        setup_with(&runtime, &test_config(false), &env, &probe).unwrap();

        assert_eq!(env.installed_names(), vec!["xformers"]);
    }

    #[test]
    fn test_setup_skip_accelerator_never_probes() {
        let mut runtime = MockRuntime::new();
        configure_checkouts(&mut runtime, &[]);
        let env = fully_installed();
        let mut probe = MockCapabilityProbe::new();
        probe.expect_detect().never();

        setup_with(&runtime, &test_config(true), &env, &probe).unwrap();

        assert!(env.installs().is_empty());
    }

    #[test]
    fn test_setup_failure_is_reconcile_error_and_skips_accelerator() {
        let mut runtime = MockRuntime::new();
        configure_checkouts(&mut runtime, &[]);
        let env = InMemoryEnvironment::new().failing("sqlalchemy");
        let mut probe = MockCapabilityProbe::new();
        probe.expect_detect().never();

        let err = setup_with(&runtime, &test_config(false), &env, &probe).unwrap_err();

        let reconcile_err = err
            .downcast_ref::<ReconcileError>()
            .expect("expected a ReconcileError");
        assert_eq!(reconcile_err.package(), "sqlalchemy");
        assert_eq!(env.installed_names(), vec!["ruamel.yaml", "sqlalchemy"]);
    }

    #[test]
    fn test_plan_installs_nothing() {
        let mut runtime = MockRuntime::new();
        configure_checkouts(&mut runtime, &[]);
        let env = InMemoryEnvironment::new();

        plan_with(&runtime, &test_config(false), &env).unwrap();

        assert!(env.installs().is_empty());
    }
}
