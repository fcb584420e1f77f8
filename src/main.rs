use anyhow::Result;
use clap::Parser;
use log::error;
use sdboot::commands::{self, config::Config};
use sdboot::reconcile::ReconcileError;
use sdboot::runtime::RealRuntime;
use std::path::PathBuf;
use std::process::ExitCode;

/// sdboot - installer and launcher for the Easy Diffusion web UI
///
/// Brings the Python package environment in line with the required package
/// versions, then optionally starts the web server.
///
/// Examples:
///   sdboot                    # Check and install required packages
///   sdboot --launch-uvicorn   # ...then start the server
#[derive(Parser, Debug)]
#[command(author, version = env!("SDBOOT_VERSION"), about)]
struct Cli {
    /// Start the web server once packages are in place
    #[arg(long = "launch-uvicorn")]
    pub launch: bool,

    /// Application root directory (defaults to the current directory; also via SDBOOT_ROOT)
    #[arg(long = "root", short = 'r', env = "SDBOOT_ROOT", value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Python interpreter to run pip and the server with (also via SDBOOT_PYTHON)
    #[arg(long = "python", env = "SDBOOT_PYTHON", value_name = "PATH")]
    pub python: Option<PathBuf>,

    /// Do not probe for accelerator hardware or install accelerator packages
    #[arg(long = "skip-accelerator")]
    pub skip_accelerator: bool,

    /// Show what would be installed without installing anything
    #[arg(long = "dry-run", conflicts_with = "launch")]
    pub dry_run: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version are not failures
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            match e.downcast_ref::<ReconcileError>() {
                Some(failure) => eprintln!("{}", failure.remediation()),
                None => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let runtime = RealRuntime;
    let config = Config::new(&runtime, cli.root, cli.python, cli.skip_accelerator)?;

    if cli.dry_run {
        return commands::plan(&runtime, &config);
    }

    commands::setup(&runtime, &config)?;

    if cli.launch {
        let never = commands::launch(&runtime, &config)?;
        match never {}
    }
    Ok(())
}
