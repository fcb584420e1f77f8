//! Runtime abstraction for system operations.
//!
//! This module provides a trait-based abstraction over system operations,
//! enabling dependency injection and testability.
//!
//! # Structure
//!
//! - `env` - Environment variables, working directory and executable lookup
//! - `fs` - File system operations (read, append, rename, directory checks)
//! - `process` - Subprocess execution (blocking run, captured output, exec)

mod env;
mod fs;
mod process;

use anyhow::Result;
use std::convert::Infallible;
use std::env as std_env;
use std::path::{Path, PathBuf};

pub use process::{CommandOutput, CommandSpec, CommandStatus};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;
    fn current_dir(&self) -> Result<PathBuf>;

    /// Locate an executable on `PATH`. A program given with a directory
    /// component is returned as-is when it names an existing file.
    fn which(&self, program: &str) -> Option<PathBuf>;

    // File System
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Append to a file, creating it if needed. Existing content is kept.
    fn append(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// Expand a glob pattern. Matches are returned sorted.
    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>>;

    // Processes
    /// Run a command with inherited stdio and wait for it to exit.
    fn run(&self, command: &CommandSpec) -> Result<CommandStatus>;

    /// Run a command and capture its stdout/stderr.
    fn output(&self, command: &CommandSpec) -> Result<CommandOutput>;

    /// Replace the current process with `command`.
    /// Only returns if the command could not be started.
    fn exec(&self, command: &CommandSpec) -> Result<Infallible>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }

    fn which(&self, program: &str) -> Option<PathBuf> {
        self.which_impl(program)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn append(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.append_impl(path, contents)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.rename_impl(from, to)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.is_file_impl(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_impl(path)
    }

    fn glob(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        self.glob_impl(pattern)
    }

    fn run(&self, command: &CommandSpec) -> Result<CommandStatus> {
        self.run_impl(command)
    }

    fn output(&self, command: &CommandSpec) -> Result<CommandOutput> {
        self.output_impl(command)
    }

    fn exec(&self, command: &CommandSpec) -> Result<Infallible> {
        self.exec_impl(command)
    }
}
