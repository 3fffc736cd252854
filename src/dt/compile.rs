//! External device-tree tool invocation.
//!
//! Overlay compilation and blob merging are delegated to the standard `dtc`
//! and `fdtoverlay` programs; this module wraps the subprocess plumbing and
//! failure reporting.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// One overlay participating in a DTB merge.
#[derive(Debug, Clone)]
pub struct OverlayInput {
    /// Path to the overlay blob
    pub path: PathBuf,
    /// Whether the blob was generated for this merge and should be deleted
    /// again afterwards
    pub temporary: bool,
}

/// Compiles DTS overlay source into a DTBO blob with `dtc`.
pub fn compile_overlay(dtc: &str, dts: &Path, dtbo: &Path) -> Result<()> {
    let output = Command::new(dtc)
        .arg("-@")
        .args(["-I", "dts", "-O", "dtb"])
        .arg("-o")
        .arg(dtbo)
        .arg(dts)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .context(format!("Failed to run device-tree compiler '{dtc}'"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(
            "{dtc} failed on {} ({}):\n{}",
            dts.display(),
            output.status,
            stderr.trim()
        );
    }

    Ok(())
}

/// Merges a base blob with a list of overlays into a full DTB.
///
/// Temporary overlay inputs are deleted whether or not the merge succeeds.
pub fn merge_dtb(
    fdtoverlay: &str,
    base: &Path,
    inputs: &[OverlayInput],
    out: &Path,
) -> Result<()> {
    let result = run_fdtoverlay(fdtoverlay, base, inputs, out);

    for input in inputs.iter().filter(|i| i.temporary) {
        if input.path.exists() {
            if let Err(e) = std::fs::remove_file(&input.path) {
                tracing::warn!(
                    "Failed to remove temporary overlay {}: {e}",
                    input.path.display()
                );
            }
        }
    }

    result
}

fn run_fdtoverlay(
    fdtoverlay: &str,
    base: &Path,
    inputs: &[OverlayInput],
    out: &Path,
) -> Result<()> {
    let output = Command::new(fdtoverlay)
        .arg("-i")
        .arg(base)
        .arg("-o")
        .arg(out)
        .args(inputs.iter().map(|i| i.path.as_path()))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .context(format!("Failed to run overlay merge tool '{fdtoverlay}'"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(
            "{fdtoverlay} failed writing {} ({}):\n{}",
            out.display(),
            output.status,
            stderr.trim()
        );
    }

    Ok(())
}

/// Checks whether an external program can be spawned at all.
#[must_use]
pub fn program_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_compiler_is_reported() {
        let temp = TempDir::new().unwrap();
        let dts = temp.path().join("test.dts");
        std::fs::write(&dts, "/dts-v1/;\n").unwrap();

        let err = compile_overlay(
            "headerio-no-such-dtc",
            &dts,
            &temp.path().join("test.dtbo"),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("headerio-no-such-dtc"));
    }

    #[test]
    fn merge_removes_temporary_inputs_even_on_failure() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("base.dtb");
        std::fs::write(&base, b"base").unwrap();

        let temp_overlay = temp.path().join("gen.dtbo");
        std::fs::write(&temp_overlay, b"overlay").unwrap();
        let kept_overlay = temp.path().join("vendor.dtbo");
        std::fs::write(&kept_overlay, b"overlay").unwrap();

        let inputs = vec![
            OverlayInput {
                path: temp_overlay.clone(),
                temporary: true,
            },
            OverlayInput {
                path: kept_overlay.clone(),
                temporary: false,
            },
        ];

        let result = merge_dtb(
            "headerio-no-such-fdtoverlay",
            &base,
            &inputs,
            &temp.path().join("out.dtb"),
        );

        assert!(result.is_err());
        assert!(!temp_overlay.exists(), "temporary overlay must be deleted");
        assert!(kept_overlay.exists(), "vendor overlay must be kept");
    }

    #[test]
    fn program_available_for_missing_binary() {
        assert!(!program_available("headerio-no-such-program"));
    }
}
