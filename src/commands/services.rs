//! Service factory for building command dependencies.
//!
//! Separates the construction of collaborators (package environment,
//! capability probe) from the configuration they are built from.

use crate::environment::PipEnvironment;
use crate::probe::CommandProbe;
use crate::runtime::Runtime;

use super::config::Config;

/// Container for the services a setup run needs.
pub struct Services<'a, R: Runtime> {
    pub environment: PipEnvironment<'a, R>,
    pub probe: CommandProbe<'a, R>,
}

impl<'a, R: Runtime> Services<'a, R> {
    pub fn from_config(runtime: &'a R, config: &Config) -> Self {
        Self {
            environment: PipEnvironment::new(runtime, config.python.clone()),
            probe: CommandProbe::nvidia(runtime),
        }
    }
}
