//! `doctor` command: environment checks for the header tool.

use crate::board::{addons, Board};
use crate::cli::common::{CliError, CliResult};
use crate::config::Config;
use crate::dt::compile;
use clap::Args;

/// Check the environment this tool depends on
#[derive(Debug, Clone, Args)]
pub struct DoctorArgs {}

struct Check {
    label: String,
    ok: bool,
    detail: String,
}

impl DoctorArgs {
    /// Execute the doctor command.
    pub fn execute(&self, board_override: Option<&str>) -> CliResult<()> {
        let config = Config::load().unwrap_or_default();
        let mut checks = Vec::new();

        // Board detection
        let board = match board_override {
            Some(model) => Board::from_model(model),
            None => Board::detect(),
        };
        checks.push(match &board {
            Ok(board) => Check {
                label: "board".to_string(),
                ok: true,
                detail: format!("{} ({})", board.def().display_name, board.model()),
            },
            Err(e) => Check {
                label: "board".to_string(),
                ok: false,
                detail: format!("{e:#}"),
            },
        });

        // External device-tree programs
        for program in [&config.programs.dtc, &config.programs.fdtoverlay] {
            let ok = compile::program_available(program);
            checks.push(Check {
                label: program.clone(),
                ok,
                detail: if ok {
                    "found on PATH".to_string()
                } else {
                    "not found on PATH".to_string()
                },
            });
        }

        // Output directory writability, probed with a throwaway file
        let output_dir = &config.paths.output_dir;
        let probe = output_dir.join(".headerio-write-probe");
        let writable = std::fs::write(&probe, b"").is_ok();
        let _ = std::fs::remove_file(&probe);
        checks.push(Check {
            label: "output dir".to_string(),
            ok: writable,
            detail: format!("{}", output_dir.display()),
        });

        // Base DTB, needed only for merged-blob saves
        checks.push(match &config.paths.base_dtb {
            Some(path) if path.exists() => Check {
                label: "base dtb".to_string(),
                ok: true,
                detail: format!("{}", path.display()),
            },
            Some(path) => Check {
                label: "base dtb".to_string(),
                ok: false,
                detail: format!("{} (missing)", path.display()),
            },
            None => Check {
                label: "base dtb".to_string(),
                ok: true,
                detail: "not configured (overlay export only)".to_string(),
            },
        });

        // Addon manifests
        if let Some(dir) = &config.paths.addons_dir {
            let detail = match addons::scan_addons(dir) {
                Ok(found) => format!("{} addon(s) in {}", found.len(), dir.display()),
                Err(e) => format!("{e:#}"),
            };
            checks.push(Check {
                label: "addons".to_string(),
                ok: true,
                detail,
            });
        }

        let mut failed = 0;
        for check in &checks {
            let marker = if check.ok { "[ OK ]" } else { "[FAIL]" };
            if !check.ok {
                failed += 1;
            }
            println!("{marker} {:<12} {}", check.label, check.detail);
        }

        if failed > 0 {
            return Err(CliError::io(format!("{failed} check(s) failed")));
        }

        Ok(())
    }
}
