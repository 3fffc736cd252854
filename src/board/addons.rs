//! Hardware-addon manifests.
//!
//! A hardware addon is a vendor-predefined device-tree overlay for a known
//! accessory board. Addons are described by small JSON manifests, one file
//! per addon, collected from a manifest directory at startup.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk manifest format.
#[derive(Debug, Clone, Deserialize)]
pub struct AddonManifest {
    /// Display name, e.g. `Adafruit SPH0645LM4H`
    pub name: String,
    /// Header id the addon attaches to, e.g. `hdr40`
    pub header: String,
    /// Path to the vendor-built overlay blob
    pub dtbo: PathBuf,
    /// Function groups the addon claims on its header
    #[serde(default)]
    pub functions: Vec<String>,
    /// Optional free-form description
    #[serde(default)]
    pub description: String,
}

/// A loaded hardware addon.
#[derive(Debug, Clone)]
pub struct Addon {
    /// Display name
    pub name: String,
    /// Header id the addon attaches to
    pub header: String,
    /// Vendor overlay blob applied when the addon is saved
    pub dtbo: PathBuf,
    /// Function groups the addon claims, used to update the pin display
    pub functions: Vec<String>,
    /// Optional description
    pub description: String,
}

impl Addon {
    fn from_manifest(manifest: AddonManifest, manifest_dir: &Path) -> Self {
        // Relative blob paths are resolved against the manifest's directory
        let dtbo = if manifest.dtbo.is_absolute() {
            manifest.dtbo
        } else {
            manifest_dir.join(manifest.dtbo)
        };

        Self {
            name: manifest.name,
            header: manifest.header,
            dtbo,
            functions: manifest.functions,
            description: manifest.description,
        }
    }
}

/// Parses a single addon manifest file.
pub fn load_manifest(path: &Path) -> Result<Addon> {
    let content = fs::read_to_string(path)
        .context(format!("Failed to read addon manifest: {}", path.display()))?;

    let manifest: AddonManifest = serde_json::from_str(&content)
        .context(format!("Failed to parse addon manifest: {}", path.display()))?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(Addon::from_manifest(manifest, dir))
}

/// Scans a directory for `*.json` addon manifests.
///
/// Unparsable manifests are skipped with a warning so one bad file does not
/// hide the rest. A missing directory yields an empty list.
pub fn scan_addons(dir: &Path) -> Result<Vec<Addon>> {
    let mut addons = Vec::new();

    if !dir.exists() {
        return Ok(addons);
    }

    let entries = fs::read_dir(dir)
        .context(format!("Failed to read addons directory: {}", dir.display()))?;

    for entry in entries {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();

        if path.extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }

        match load_manifest(&path) {
            Ok(addon) => addons.push(addon),
            Err(e) => {
                tracing::warn!("Skipping addon manifest {}: {e:#}", path.display());
            }
        }
    }

    // Stable menu order regardless of directory iteration order
    addons.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(addons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_manifest(dir: &Path, file: &str, json: &str) {
        fs::write(dir.join(file), json).unwrap();
    }

    #[test]
    fn scans_and_sorts_manifests() {
        let temp = TempDir::new().unwrap();
        write_manifest(
            temp.path(),
            "mic.json",
            r#"{"name": "Adafruit SPH0645LM4H", "header": "hdr40", "dtbo": "mic.dtbo", "functions": ["i2s4"]}"#,
        );
        write_manifest(
            temp.path(),
            "audio.json",
            r#"{"name": "FE-PI Audio V1", "header": "hdr40", "dtbo": "/opt/overlays/fe-pi.dtbo"}"#,
        );
        // Not a manifest, must be ignored
        write_manifest(temp.path(), "notes.txt", "not json");

        let addons = scan_addons(temp.path()).unwrap();
        assert_eq!(addons.len(), 2);
        assert_eq!(addons[0].name, "Adafruit SPH0645LM4H");
        assert_eq!(addons[1].name, "FE-PI Audio V1");

        // Relative dtbo resolved against the manifest directory, absolute kept
        assert_eq!(addons[0].dtbo, temp.path().join("mic.dtbo"));
        assert_eq!(addons[1].dtbo, PathBuf::from("/opt/overlays/fe-pi.dtbo"));
    }

    #[test]
    fn skips_unparsable_manifests() {
        let temp = TempDir::new().unwrap();
        write_manifest(temp.path(), "bad.json", "{ this is not json");
        write_manifest(
            temp.path(),
            "good.json",
            r#"{"name": "Good", "header": "hdr40", "dtbo": "good.dtbo"}"#,
        );

        let addons = scan_addons(temp.path()).unwrap();
        assert_eq!(addons.len(), 1);
        assert_eq!(addons[0].name, "Good");
    }

    #[test]
    fn missing_directory_is_empty() {
        let temp = TempDir::new().unwrap();
        let addons = scan_addons(&temp.path().join("nope")).unwrap();
        assert!(addons.is_empty());
    }
}
