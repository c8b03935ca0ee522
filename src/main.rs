mod cli;
mod commands;
mod output;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use gocachectl::{CacheResult, Config, GoToolchain};

use cli::{Cli, Command};
use commands::{ClearArgs, Options};

fn init_tracing(verbose: bool) {
    let default = if verbose { "gocachectl=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn toolchain(config_path: Option<&Path>) -> CacheResult<GoToolchain> {
    let config = Config::load(config_path)?;
    Ok(GoToolchain::from_config(&config))
}

fn run(cli: Cli) -> CacheResult<()> {
    let opts = Options {
        verbose: cli.verbose,
        json: cli.json,
        quiet: cli.quiet,
    };
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Stats(flags) => commands::run_stats(&flags, &toolchain(config_path)?, &opts),
        Command::Clear {
            caches,
            all,
            force,
            dry_run,
        } => {
            let args = ClearArgs {
                selection: caches.selection(all),
                force,
                dry_run,
            };
            commands::run_clear(&args, &toolchain(config_path)?, &opts)
        }
        Command::Info => commands::run_info(&toolchain(config_path)?, &opts),
        Command::Version => {
            println!("gocachectl {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "Error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
