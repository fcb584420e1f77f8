pub mod commands;
pub mod config;
pub mod environment;
pub mod launch;
pub mod layout;
pub mod package;
pub mod probe;
pub mod reconcile;
pub mod runtime;
