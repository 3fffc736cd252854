//! `headers` command: list the expansion headers of the target board.

use crate::cli::common::{resolve_board, CliResult};
use crate::config::Config;
use crate::dt;
use clap::Args;

/// List expansion headers and their state
#[derive(Debug, Clone, Args)]
pub struct HeadersArgs {}

impl HeadersArgs {
    /// Execute the headers command.
    pub fn execute(&self, board_override: Option<&str>) -> CliResult<()> {
        let board = resolve_board(board_override)?;
        let config = Config::load().unwrap_or_default();

        println!(
            "Headers on {} ({}):",
            board.def().display_name,
            board.model()
        );

        for header in board.headers() {
            let state = if dt::existing_overlay(
                board.def(),
                header.id(),
                &config.paths.output_dir,
            )
            .is_some()
            {
                "preconfigured"
            } else {
                "default"
            };
            println!("  {:<8} {:<28} [{state}]", header.id(), header.name());
        }

        Ok(())
    }
}
