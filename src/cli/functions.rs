//! `functions` command: list the function groups of one header.

use crate::cli::common::{resolve_board, CliError, CliResult};
use clap::Args;

/// List the pin-function groups of a header
#[derive(Debug, Clone, Args)]
pub struct FunctionsArgs {
    /// Header id, e.g. hdr40
    #[arg(long, value_name = "ID", default_value = "hdr40")]
    pub header: String,
}

impl FunctionsArgs {
    /// Execute the functions command.
    pub fn execute(&self, board_override: Option<&str>) -> CliResult<()> {
        let board = resolve_board(board_override)?;
        let header = board
            .header_by_id(&self.header)
            .map_err(|e| CliError::validation(format!("{e:#}")))?;

        println!("Functions on {}:", header.name());

        let name_width = header
            .functions()
            .iter()
            .map(|f| f.name.len())
            .max()
            .unwrap_or(0);

        for function in header.functions() {
            let pins: Vec<String> = function.pins.iter().map(|p| p.pin.to_string()).collect();
            println!(
                "  {:<name_width$}  pins {}",
                function.name,
                pins.join(",")
            );
        }

        Ok(())
    }
}
