//! Expansion Header Tool - terminal workspace for Jetson pin configuration.
//!
//! Launched without a subcommand this runs the interactive menu tool for
//! selecting expansion-header pin functions and exporting device-tree
//! overlays. Subcommands provide the same operations headlessly.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use headerio::board::{addons, Board};
use headerio::cli::{CliError, DoctorArgs, ExportArgs, FunctionsArgs, HeadersArgs};
use headerio::config::Config;
use headerio::constants::{APP_BINARY_NAME, APP_NAME};
use headerio::tui;

/// Expansion Header Tool - configure expansion-header pin functions
#[derive(Parser, Debug)]
#[command(name = APP_BINARY_NAME, author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override board detection with a catalog model, e.g. jetson-nano
    #[arg(long, global = true, value_name = "MODEL")]
    board: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List expansion headers and their state
    Headers(HeadersArgs),
    /// List the pin-function groups of a header
    Functions(FunctionsArgs),
    /// Export a header configuration as a device-tree overlay
    Export(ExportArgs),
    /// Check the environment this tool depends on
    Doctor(DoctorArgs),
}

fn main() {
    // Quiet by default; RUST_LOG opts into more
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let board_override = cli.board.as_deref();

    if let Some(command) = cli.command {
        let result = match command {
            Commands::Headers(args) => args.execute(board_override),
            Commands::Functions(args) => args.execute(board_override),
            Commands::Export(args) => args.execute(board_override),
            Commands::Doctor(args) => args.execute(board_override),
        };

        if let Err(error) = result {
            eprintln!("Error: {error}");
            std::process::exit(error.exit_code() as i32);
        }
        return;
    }

    if let Err(error) = run_interactive(board_override) {
        eprintln!("FATAL ERROR!");
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

/// Runs the interactive menu tool.
fn run_interactive(board_override: Option<&str>) -> Result<()> {
    println!("{} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    tui::check_terminal_size()?;

    let mut board = match board_override {
        Some(model) => Board::from_model(model)?,
        None => Board::detect()?,
    };

    let config = match Config::load() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Warning: Failed to load config: {error:#}");
            eprintln!("Continuing with defaults.");
            Config::new()
        }
    };

    if let Some(dir) = &config.paths.addons_dir {
        match addons::scan_addons(dir) {
            Ok(found) => board.set_addons(found),
            Err(error) => {
                eprintln!("Warning: Failed to scan addons: {error:#}");
            }
        }
    }

    let mut state = tui::AppState::new(board, config);

    let mut terminal = tui::setup_terminal()?;
    let result = tui::run_tui(&mut state, &mut terminal);
    tui::restore_terminal(terminal)?;
    result?;

    if state.exit_error {
        std::process::exit(1);
    }

    if state.reboot_requested {
        let status = std::process::Command::new("reboot")
            .status()
            .context("Failed to spawn reboot")?;
        if !status.success() {
            anyhow::bail!("reboot exited with {status}");
        }
    }

    Ok(())
}
