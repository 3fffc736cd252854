//! Device-tree overlay generation.
//!
//! Header pin configurations are rendered into DTS overlay source, compiled
//! into DTBO blobs with `dtc`, and optionally merged with a base blob into a
//! full DTB with `fdtoverlay`. Rendering is pure string building so it stays
//! deterministic and unit-testable; everything that touches external tools
//! lives in [`compile`].

pub mod compile;

use crate::board::{Board, BoardDef, HeaderState};
use crate::config::Config;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Renders DTS overlay source for one header's pin configuration.
#[derive(Debug)]
pub struct OverlaySource<'a> {
    board: &'static BoardDef,
    header: &'a HeaderState,
    name: String,
}

impl<'a> OverlaySource<'a> {
    /// Creates a renderer with a timestamped overlay name.
    #[must_use]
    pub fn new(board: &'static BoardDef, header: &'a HeaderState) -> Self {
        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        Self::with_name(board, header, format!("User Custom [{stamp}]"))
    }

    /// Creates a renderer with an explicit overlay name.
    #[must_use]
    pub fn with_name(board: &'static BoardDef, header: &'a HeaderState, name: String) -> Self {
        Self {
            board,
            header,
            name,
        }
    }

    /// Renders the overlay source.
    ///
    /// One pinmux node is emitted per pin of every enabled function group,
    /// ordered by pin number. A header with nothing enabled renders an empty
    /// pinmux group, which `dtc` accepts and the kernel treats as a no-op.
    #[must_use]
    pub fn render(&self) -> String {
        let header_id = self.header.id();
        let label = format!("{}_pinmux", header_id.replace('-', "_"));

        // (pin, pad, function, input) sorted by pin number
        let mut nodes = Vec::new();
        for function in self.header.enabled_functions() {
            for fp in function.pins {
                if let Some(crate::board::PinRole::Mux(mux)) =
                    self.header.def().pin(fp.pin).map(|p| &p.role)
                {
                    nodes.push((fp.pin, mux.pad, function.function, fp.input));
                }
            }
        }
        nodes.sort_by_key(|n| n.0);

        let mut out = String::new();
        out.push_str("/dts-v1/;\n/plugin/;\n\n/ {\n");
        let _ = writeln!(out, "\toverlay-name = \"{}\";", self.name);
        let _ = writeln!(out, "\tcompatible = \"{}\";", self.board.overlay_compatible);
        out.push_str("\n\tfragment@0 {\n");
        out.push_str("\t\ttarget = <&pinmux>;\n");
        out.push_str("\t\t__overlay__ {\n");
        out.push_str("\t\t\tpinctrl-names = \"default\";\n");
        let _ = writeln!(out, "\t\t\tpinctrl-0 = <&{label}>;");
        let _ = writeln!(out, "\n\t\t\t{label}: {} {{", self.header.def().pinmux_node);

        for (pin, pad, function, input) in nodes {
            let _ = writeln!(out, "\t\t\t\t{header_id}-pin{pin} {{");
            let _ = writeln!(out, "\t\t\t\t\tnvidia,pins = \"{pad}\";");
            let _ = writeln!(out, "\t\t\t\t\tnvidia,function = \"{function}\";");
            out.push_str("\t\t\t\t\tnvidia,pull = <0>;\n");
            out.push_str("\t\t\t\t\tnvidia,tristate = <0>;\n");
            let _ = writeln!(
                out,
                "\t\t\t\t\tnvidia,enable-input = <{}>;",
                u8::from(input)
            );
            out.push_str("\t\t\t\t};\n");
        }

        out.push_str("\t\t\t};\n");
        out.push_str("\t\t};\n");
        out.push_str("\t};\n");
        out.push_str("};\n");
        out
    }
}

/// File stem for a header's exported overlay, e.g. `jetson-nano-hdr40-user-custom`.
#[must_use]
pub fn overlay_stem(board: &BoardDef, header_id: &str) -> String {
    format!("{}-{}-user-custom", board.model, header_id)
}

/// File name of the merged blob, e.g. `jetson-nano-user-custom.dtb`.
#[must_use]
pub fn dtb_file_name(board: &BoardDef) -> String {
    format!("{}-user-custom.dtb", board.model)
}

/// Path of a previously exported overlay for a header, if one exists.
///
/// A header is considered preconfigured by an earlier session when its
/// exported overlay is still present in the output directory.
#[must_use]
pub fn existing_overlay(board: &BoardDef, header_id: &str, output_dir: &Path) -> Option<PathBuf> {
    let path = output_dir.join(format!("{}.dtbo", overlay_stem(board, header_id)));
    path.exists().then_some(path)
}

/// Result of exporting one header's overlay.
#[derive(Debug)]
pub struct ExportOutcome {
    /// Rendered DTS source file
    pub dts: PathBuf,
    /// Compiled overlay blob, absent in source-only exports
    pub dtbo: Option<PathBuf>,
}

/// Renders and (unless `dts_only`) compiles the overlay for one header.
///
/// The DTS source is kept next to the blob so the exported configuration
/// stays inspectable. `name` overrides the timestamped overlay-name.
pub fn export_header_overlay(
    config: &Config,
    board: &'static BoardDef,
    header: &HeaderState,
    dts_only: bool,
    name: Option<String>,
) -> Result<ExportOutcome> {
    let output_dir = &config.paths.output_dir;
    std::fs::create_dir_all(output_dir).context(format!(
        "Failed to create output directory: {}",
        output_dir.display()
    ))?;

    let stem = overlay_stem(board, header.id());
    let dts_path = output_dir.join(format!("{stem}.dts"));
    let source = match name {
        Some(name) => OverlaySource::with_name(board, header, name),
        None => OverlaySource::new(board, header),
    }
    .render();
    std::fs::write(&dts_path, source).context(format!(
        "Failed to write overlay source: {}",
        dts_path.display()
    ))?;

    if dts_only {
        return Ok(ExportOutcome {
            dts: dts_path,
            dtbo: None,
        });
    }

    let dtbo_path = output_dir.join(format!("{stem}.dtbo"));
    compile::compile_overlay(&config.programs.dtc, &dts_path, &dtbo_path)?;

    Ok(ExportOutcome {
        dts: dts_path,
        dtbo: Some(dtbo_path),
    })
}

/// Assembles the merged DTB for every saved or preconfigured header.
///
/// Per header: a loaded addon contributes its vendor blob, a saved manual
/// configuration contributes a freshly compiled overlay (deleted again after
/// the merge), and an untouched but preconfigured header contributes its
/// previously exported overlay. Headers contributing nothing are skipped.
pub fn build_dtb(config: &Config, board: &Board, saved: &[bool]) -> Result<PathBuf> {
    let base_dtb = config
        .paths
        .base_dtb
        .as_ref()
        .context("No base DTB configured; set paths.base_dtb to merge overlays")?;

    let mut inputs = Vec::new();
    for (index, header) in board.headers().iter().enumerate() {
        let saved = saved.get(index).copied().unwrap_or(false);

        if saved {
            if let Some(addon_name) = header.addon() {
                let addon = board
                    .addon(addon_name)
                    .with_context(|| format!("Unknown hardware addon {addon_name}!"))?;
                inputs.push(compile::OverlayInput {
                    path: addon.dtbo.clone(),
                    temporary: false,
                });
            } else {
                let outcome = export_header_overlay(config, board.def(), header, false, None)?;
                let dtbo = outcome.dtbo.context("Overlay export produced no blob")?;
                inputs.push(compile::OverlayInput {
                    path: dtbo,
                    temporary: true,
                });
            }
        } else if let Some(path) =
            existing_overlay(board.def(), header.id(), &config.paths.output_dir)
        {
            inputs.push(compile::OverlayInput {
                path,
                temporary: false,
            });
        }
    }

    if inputs.is_empty() {
        anyhow::bail!("No header has pin changes to save");
    }

    let out = config.paths.output_dir.join(dtb_file_name(board.def()));
    compile::merge_dtb(&config.programs.fdtoverlay, base_dtb, &inputs, &out)?;
    Ok(out)
}
