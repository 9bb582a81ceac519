//! Command-line entry point.
//!
//! Loads (or creates) the configuration, connects to the host, and runs
//! the standard pipeline once. Exit status reflects the run outcome.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context as _};
use chrono::Local;
use directories::ProjectDirs;
use tracing::{error, info};

use autosplice_core::config::ConfigManager;
use autosplice_core::logging::init_tracing;
use autosplice_core::orchestrator::{standard_pipeline, Context, RunState};

const USAGE: &str = "\
autosplice - splice the latest edit into the main timeline

Usage: autosplice [OPTIONS]

Options:
  --config <PATH>   Configuration file (default: per-user config dir)
  -h, --help        Print this help
";

struct Args {
    config_path: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Option<Args>> {
    let mut config_path = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args
                    .next()
                    .context("--config requires a path argument")?;
                config_path = Some(PathBuf::from(value));
            }
            "-h" | "--help" => return Ok(None),
            other => bail!("unknown argument '{other}'\n\n{USAGE}"),
        }
    }
    Ok(Some(Args { config_path }))
}

fn default_config_path() -> anyhow::Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "autosplice")
        .context("could not determine a per-user config directory")?;
    Ok(dirs.config_dir().join("autosplice.toml"))
}

fn run(args: Args) -> anyhow::Result<()> {
    let config_path = match args.config_path {
        Some(path) => path,
        None => default_config_path()?,
    };

    let mut config = ConfigManager::new(&config_path);
    config
        .load_or_create()
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;
    let settings = config.settings().clone();

    let logs_dir = settings
        .logging
        .file_logging
        .then(|| config.logs_folder());
    let _log_guard = init_tracing(settings.logging.level, logs_dir.as_deref());

    let run_name = Local::now().format("autosplice_%Y%m%d_%H%M%S").to_string();
    info!(run = %run_name, config = %config_path.display(), "starting run");

    let host = autosplice_resolve::connect(&settings.host)
        .context("connecting to the host application")?;

    let ctx = Context::new(&host, &settings, run_name);
    let mut state = RunState::new();
    let report = standard_pipeline().run(&ctx, &mut state)?;

    if let Some(splice) = &state.splice {
        info!(
            appended = splice.appended,
            skipped = splice.skipped,
            offset = splice.insertion_offset,
            anchor_found = splice.anchor_found,
            "splice summary"
        );
    }
    info!(
        completed = report.steps_completed.len(),
        skipped = report.steps_skipped.len(),
        "run finished"
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            print!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("run failed: {:#}", e);
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
