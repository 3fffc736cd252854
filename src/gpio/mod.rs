//! Sysfs GPIO access.
//!
//! Pins are driven through `/sys/class/gpio`: a line is exported, its
//! direction set, and its value file written. The sysfs root is injectable
//! so the plumbing can be exercised against a plain directory in tests.

pub mod softpwm;

pub use softpwm::{DutyStage, SoftPwm};

use crate::board::BoardDef;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

/// How long to keep retrying sysfs attribute writes after an export.
///
/// The kernel creates the per-line directory asynchronously; udev may also
/// still be adjusting permissions when we first touch it.
const EXPORT_SETTLE_ATTEMPTS: u32 = 20;
const EXPORT_SETTLE_DELAY: Duration = Duration::from_millis(10);

/// Translates a BOARD pin number to the kernel GPIO line driving it.
pub fn line_for_board_pin(board: &BoardDef, header_id: &str, pin: u8) -> Result<u32> {
    let header = board
        .headers
        .iter()
        .find(|h| h.id == header_id)
        .with_context(|| format!("Board {} has no header '{header_id}'", board.model))?;

    header
        .line(pin)
        .with_context(|| format!("Pin {pin} on {header_id} is not GPIO-capable"))
}

/// A sysfs GPIO controller root.
#[derive(Debug, Clone)]
pub struct GpioChip {
    root: PathBuf,
}

impl GpioChip {
    /// The system controller at `/sys/class/gpio`.
    #[must_use]
    pub fn system() -> Self {
        Self {
            root: PathBuf::from("/sys/class/gpio"),
        }
    }

    /// A controller rooted at an arbitrary directory (for tests).
    #[must_use]
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Claims a line as an output, exporting it if necessary.
    pub fn output(&self, line: u32) -> Result<Gpio> {
        let dir = self.root.join(format!("gpio{line}"));

        let exported_here = if dir.exists() {
            false
        } else {
            let export = self.root.join("export");
            std::fs::write(&export, line.to_string())
                .context(format!("Failed to export GPIO {line} via {}", export.display()))?;
            true
        };

        let gpio = Gpio {
            line,
            dir,
            unexport: exported_here.then(|| self.root.join("unexport")),
        };

        gpio.write_settled("direction", "out")
            .context(format!("Failed to set GPIO {line} direction"))?;

        Ok(gpio)
    }
}

/// One claimed GPIO output line.
#[derive(Debug)]
pub struct Gpio {
    line: u32,
    dir: PathBuf,
    unexport: Option<PathBuf>,
}

impl Gpio {
    /// Kernel line number.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Drives the line high or low.
    pub fn write(&self, high: bool) -> Result<()> {
        let value = self.dir.join("value");
        std::fs::write(&value, if high { "1" } else { "0" })
            .context(format!("Failed to write GPIO {} value", self.line))
    }

    /// Drives the line high.
    pub fn set_high(&self) -> Result<()> {
        self.write(true)
    }

    /// Drives the line low.
    pub fn set_low(&self) -> Result<()> {
        self.write(false)
    }

    fn write_settled(&self, attribute: &str, value: &str) -> Result<()> {
        let path = self.dir.join(attribute);
        let mut attempt = 0;
        loop {
            match std::fs::write(&path, value) {
                Ok(()) => return Ok(()),
                Err(e) if attempt < EXPORT_SETTLE_ATTEMPTS => {
                    tracing::trace!(
                        "Retrying write to {} after {e} (attempt {attempt})",
                        path.display()
                    );
                    attempt += 1;
                    std::thread::sleep(EXPORT_SETTLE_DELAY);
                }
                Err(e) => {
                    return Err(e).context(format!("Failed to write {}", path.display()));
                }
            }
        }
    }
}

impl Drop for Gpio {
    fn drop(&mut self) {
        // Only release lines this handle exported itself
        if let Some(unexport) = &self.unexport {
            if let Err(e) = std::fs::write(unexport, self.line.to_string()) {
                tracing::warn!("Failed to unexport GPIO {}: {e}", self.line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::catalog;
    use tempfile::TempDir;

    fn fake_exported_line(root: &std::path::Path, line: u32) {
        let dir = root.join(format!("gpio{line}"));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("direction"), "in").unwrap();
        std::fs::write(dir.join("value"), "0").unwrap();
    }

    #[test]
    fn drives_a_pre_exported_line() {
        let temp = TempDir::new().unwrap();
        fake_exported_line(temp.path(), 38);

        let chip = GpioChip::at(temp.path());
        let gpio = chip.output(38).unwrap();

        assert_eq!(
            std::fs::read_to_string(temp.path().join("gpio38/direction")).unwrap(),
            "out"
        );

        gpio.set_high().unwrap();
        assert_eq!(
            std::fs::read_to_string(temp.path().join("gpio38/value")).unwrap(),
            "1"
        );
        gpio.set_low().unwrap();
        assert_eq!(
            std::fs::read_to_string(temp.path().join("gpio38/value")).unwrap(),
            "0"
        );
    }

    #[test]
    fn does_not_unexport_lines_it_did_not_export() {
        let temp = TempDir::new().unwrap();
        fake_exported_line(temp.path(), 38);

        {
            let chip = GpioChip::at(temp.path());
            let _gpio = chip.output(38).unwrap();
        }

        // No unexport file written for a pre-existing line
        assert!(!temp.path().join("unexport").exists());
    }

    #[test]
    fn board_pin_translation() {
        let nano = catalog::board_by_model("jetson-nano").unwrap();
        assert_eq!(line_for_board_pin(nano, "hdr40", 33).unwrap(), 38);
        assert_eq!(line_for_board_pin(nano, "hdr40", 32).unwrap(), 168);
        assert!(line_for_board_pin(nano, "hdr40", 6).is_err());
        assert!(line_for_board_pin(nano, "hdr99", 33).is_err());
    }
}
