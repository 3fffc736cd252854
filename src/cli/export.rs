//! `export` command: headless device-tree overlay export.

use crate::board::addons;
use crate::cli::common::{resolve_board, CliError, CliResult};
use crate::config::Config;
use crate::dt;
use clap::Args;
use std::path::PathBuf;

/// Export a header configuration as a device-tree overlay
#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Header id, e.g. hdr40
    #[arg(long, value_name = "ID", default_value = "hdr40")]
    pub header: String,

    /// Function group to enable (repeatable)
    #[arg(long = "enable", value_name = "FUNCTION")]
    pub enable: Vec<String>,

    /// Hardware addon to apply instead of manual functions
    #[arg(long, value_name = "NAME", conflicts_with = "enable")]
    pub addon: Option<String>,

    /// Directory scanned for addon manifests (defaults to the configured one)
    #[arg(long, value_name = "DIR")]
    pub addons_dir: Option<PathBuf>,

    /// Output directory (defaults to the configured one)
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Overlay name property (defaults to a timestamped name)
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Write only the DTS source, skipping dtc
    #[arg(long)]
    pub dts_only: bool,
}

impl ExportArgs {
    /// Execute the export command.
    pub fn execute(&self, board_override: Option<&str>) -> CliResult<()> {
        if self.enable.is_empty() && self.addon.is_none() {
            return Err(CliError::validation(
                "Nothing to export: pass at least one --enable FUNCTION or --addon NAME",
            ));
        }

        let mut board = resolve_board(board_override)?;

        let mut config = Config::load().unwrap_or_default();
        if let Some(out) = &self.out {
            config.paths.output_dir.clone_from(out);
        }
        if let Some(dir) = &self.addons_dir {
            config.paths.addons_dir = Some(dir.clone());
        }

        // Apply the requested configuration to the header
        let header_id = {
            let header = board
                .header_by_id_mut(&self.header)
                .map_err(|e| CliError::validation(format!("{e:#}")))?;

            for function in &self.enable {
                header
                    .enable(function)
                    .map_err(|e| CliError::validation(format!("{e:#}")))?;
            }
            header.id()
        };

        if let Some(addon_name) = &self.addon {
            let dir = config.paths.addons_dir.as_ref().ok_or_else(|| {
                CliError::validation(
                    "No addons directory configured; pass --addons-dir or set paths.addons_dir",
                )
            })?;
            let loaded = addons::scan_addons(dir)
                .map_err(|e| CliError::io(format!("{e:#}")))?;
            board.set_addons(loaded);

            let addon = board
                .addon(addon_name)
                .ok_or_else(|| {
                    CliError::validation(format!("Unknown hardware addon {addon_name}!"))
                })?
                .clone();
            board
                .header_by_id_mut(header_id)
                .and_then(|h| h.apply_addon(&addon))
                .map_err(|e| CliError::validation(format!("{e:#}")))?;
        }

        let header = board
            .header_by_id(header_id)
            .map_err(|e| CliError::validation(format!("{e:#}")))?;

        let outcome = dt::export_header_overlay(
            &config,
            board.def(),
            header,
            self.dts_only,
            self.name.clone(),
        )
        .map_err(|e| CliError::io(format!("{e:#}")))?;

        println!("Wrote {}", outcome.dts.display());
        if let Some(dtbo) = outcome.dtbo {
            println!("Wrote {}", dtbo.display());
            println!("Configuration saved to file {}.", dtbo.display());
        }

        Ok(())
    }
}
