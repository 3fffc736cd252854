//! Board and header model.
//!
//! This module owns the notion of "current pin configuration per header":
//! which function groups are enabled, which hardware addon (if any) has been
//! loaded, and what label each physical pin carries as a result. The menus
//! and the headless CLI both read and toggle this state; generated overlays
//! are rendered from it.

pub mod addons;
pub mod catalog;

pub use addons::Addon;
pub use catalog::{BoardDef, FunctionDef, HeaderDef, MuxPin, PinDef, PinRole};

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::Path;

/// Kernel-exported list of device-tree compatible strings.
const COMPATIBLE_PATH: &str = "/proc/device-tree/compatible";

/// A detected board with per-header pin configuration state.
#[derive(Debug)]
pub struct Board {
    def: &'static BoardDef,
    headers: Vec<HeaderState>,
    addons: Vec<Addon>,
}

impl Board {
    /// Creates a board from a catalog definition with all headers in their
    /// default state and no addons registered.
    #[must_use]
    pub fn new(def: &'static BoardDef) -> Self {
        let headers = def.headers.iter().map(HeaderState::new).collect();
        Self {
            def,
            headers,
            addons: Vec::new(),
        }
    }

    /// Detects the running board from `/proc/device-tree/compatible`.
    pub fn detect() -> Result<Self> {
        Self::detect_from(Path::new(COMPATIBLE_PATH))
    }

    /// Detects the board from an explicit compatible file (for tests).
    pub fn detect_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read(path).context(format!(
            "Failed to read device-tree compatible data: {}",
            path.display()
        ))?;

        // The kernel exports NUL-separated compatible entries
        let entries: Vec<String> = raw
            .split(|b| *b == 0)
            .filter(|s| !s.is_empty())
            .map(|s| String::from_utf8_lossy(s).into_owned())
            .collect();

        let def = catalog::board_by_compatible(&entries).with_context(|| {
            format!(
                "Platform not supported, no headers found (compatible: {})",
                entries.join(", ")
            )
        })?;

        Ok(Self::new(def))
    }

    /// Creates a board by catalog model id (development override).
    pub fn from_model(model: &str) -> Result<Self> {
        let def = catalog::board_by_model(model).with_context(|| {
            let known: Vec<&str> = catalog::BOARDS.iter().map(|b| b.model).collect();
            format!("Unknown board '{model}' (known: {})", known.join(", "))
        })?;
        Ok(Self::new(def))
    }

    /// Catalog definition of this board.
    #[must_use]
    pub const fn def(&self) -> &'static BoardDef {
        self.def
    }

    /// Short model id, e.g. `jetson-nano`.
    #[must_use]
    pub const fn model(&self) -> &'static str {
        self.def.model
    }

    /// Registers the hardware addons available to this board.
    pub fn set_addons(&mut self, addons: Vec<Addon>) {
        self.addons = addons;
    }

    /// All headers in display order.
    #[must_use]
    pub fn headers(&self) -> &[HeaderState] {
        &self.headers
    }

    /// A header by position.
    #[must_use]
    pub fn header(&self, index: usize) -> Option<&HeaderState> {
        self.headers.get(index)
    }

    /// A header by position, mutable.
    pub fn header_mut(&mut self, index: usize) -> Option<&mut HeaderState> {
        self.headers.get_mut(index)
    }

    /// A header by id, e.g. `hdr40`.
    pub fn header_by_id(&self, id: &str) -> Result<&HeaderState> {
        self.headers
            .iter()
            .find(|h| h.id() == id)
            .with_context(|| self.unknown_header_message(id))
    }

    /// A header by id, mutable.
    pub fn header_by_id_mut(&mut self, id: &str) -> Result<&mut HeaderState> {
        let message = self.unknown_header_message(id);
        self.headers
            .iter_mut()
            .find(|h| h.id() == id)
            .context(message)
    }

    fn unknown_header_message(&self, id: &str) -> String {
        let known: Vec<&str> = self.headers.iter().map(HeaderState::id).collect();
        format!("Unknown header '{id}' (known: {})", known.join(", "))
    }

    /// Addons that attach to the given header.
    #[must_use]
    pub fn addons_for(&self, header_id: &str) -> Vec<&Addon> {
        self.addons
            .iter()
            .filter(|a| a.header == header_id)
            .collect()
    }

    /// Loads a hardware addon onto its header by display name.
    pub fn load_addon(&mut self, header_index: usize, name: &str) -> Result<()> {
        let addon = self
            .addons
            .iter()
            .find(|a| a.name == name)
            .with_context(|| format!("Unknown hardware addon {name}!"))?
            .clone();

        let header = self
            .headers
            .get_mut(header_index)
            .context("Header index out of range")?;

        header.apply_addon(&addon)
    }

    /// The registered addon with the given name, if any.
    #[must_use]
    pub fn addon(&self, name: &str) -> Option<&Addon> {
        self.addons.iter().find(|a| a.name == name)
    }
}

/// One row of the two-column pin diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    /// Odd pin number (left column)
    pub odd_pin: u8,
    /// Label of the odd pin
    pub odd_label: &'static str,
    /// Even pin number (right column)
    pub even_pin: u8,
    /// Label of the even pin
    pub even_label: &'static str,
}

/// Current pin configuration of one header.
#[derive(Debug)]
pub struct HeaderState {
    def: &'static HeaderDef,
    enabled: BTreeSet<&'static str>,
    addon: Option<String>,
}

impl HeaderState {
    fn new(def: &'static HeaderDef) -> Self {
        Self {
            def,
            enabled: BTreeSet::new(),
            addon: None,
        }
    }

    /// Catalog definition of this header.
    #[must_use]
    pub const fn def(&self) -> &'static HeaderDef {
        self.def
    }

    /// Short header id, e.g. `hdr40`.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        self.def.id
    }

    /// Human-readable header name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.def.name
    }

    /// Function groups available on this header, in catalog order.
    #[must_use]
    pub const fn functions(&self) -> &'static [FunctionDef] {
        self.def.functions
    }

    fn function(&self, name: &str) -> Result<&'static FunctionDef> {
        self.def.function(name).with_context(|| {
            let known: Vec<&str> = self.def.functions.iter().map(|f| f.name).collect();
            format!(
                "Unknown function '{name}' for header {} (known: {})",
                self.def.id,
                known.join(", ")
            )
        })
    }

    /// Whether a function group is currently enabled.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.enabled.contains(name)
    }

    /// Enables a function group.
    pub fn enable(&mut self, name: &str) -> Result<()> {
        let function = self.function(name)?;
        self.enabled.insert(function.name);
        Ok(())
    }

    /// Disables a function group.
    pub fn disable(&mut self, name: &str) -> Result<()> {
        let function = self.function(name)?;
        self.enabled.remove(function.name);
        Ok(())
    }

    /// Toggles a function group, returning the new enabled state.
    pub fn toggle(&mut self, name: &str) -> Result<bool> {
        if self.is_enabled(name) {
            self.disable(name)?;
            Ok(false)
        } else {
            self.enable(name)?;
            Ok(true)
        }
    }

    /// Enabled function groups in catalog order.
    pub fn enabled_functions(&self) -> impl Iterator<Item = &'static FunctionDef> + '_ {
        self.def
            .functions
            .iter()
            .filter(|f| self.enabled.contains(f.name))
    }

    /// Physical pins of a function group.
    pub fn function_pins(&self, name: &str) -> Result<Vec<u8>> {
        Ok(self.function(name)?.pins.iter().map(|p| p.pin).collect())
    }

    /// The loaded hardware addon, if any.
    #[must_use]
    pub fn addon(&self) -> Option<&str> {
        self.addon.as_deref()
    }

    /// Applies a hardware addon: its function set replaces the current manual
    /// selection and the addon is remembered for saving.
    pub fn apply_addon(&mut self, addon: &Addon) -> Result<()> {
        if addon.header != self.def.id {
            anyhow::bail!(
                "Hardware addon {} attaches to header {}, not {}",
                addon.name,
                addon.header,
                self.def.id
            );
        }

        // Validate before mutating so a bad manifest cannot half-apply
        let mut functions = Vec::with_capacity(addon.functions.len());
        for name in &addon.functions {
            functions.push(self.function(name)?.name);
        }

        self.enabled = functions.into_iter().collect();
        self.addon = Some(addon.name.clone());
        Ok(())
    }

    /// Whether the header is in its default state.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.enabled.is_empty() && self.addon.is_none()
    }

    /// Returns all pins to their default function and clears any addon.
    pub fn set_default(&mut self) {
        self.enabled.clear();
        self.addon = None;
    }

    /// Label for a physical pin, or `None` for unlisted pins.
    ///
    /// A muxable pin carries the signal name of the enabled function group
    /// that claims it, falling back to its default label.
    #[must_use]
    pub fn pin_label(&self, number: u8) -> Option<&'static str> {
        let pin = self.def.pin(number)?;
        match &pin.role {
            PinRole::Power(label) | PinRole::Fixed(label) => Some(label),
            PinRole::Mux(mux) => {
                for function in self.enabled_functions() {
                    if let Some(fp) = function.pins.iter().find(|fp| fp.pin == number) {
                        return Some(fp.signal);
                    }
                }
                Some(mux.default_label)
            }
        }
    }

    /// Rows of the two-column pin diagram.
    ///
    /// Rows where both pins are unlisted are dropped so the display does not
    /// grow too long.
    #[must_use]
    pub fn display_rows(&self) -> Vec<DisplayRow> {
        let rows = self.def.pin_count / 2;
        let mut out = Vec::with_capacity(rows as usize);

        for row in 0..rows {
            let odd = row * 2 + 1;
            let even = odd + 1;
            let odd_label = self.pin_label(odd);
            let even_label = self.pin_label(even);

            if odd_label.is_none() && even_label.is_none() {
                continue;
            }

            out.push(DisplayRow {
                odd_pin: odd,
                odd_label: odd_label.unwrap_or(""),
                even_pin: even,
                even_label: even_label.unwrap_or(""),
            });
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nano() -> Board {
        Board::from_model("jetson-nano").unwrap()
    }

    fn mic_addon() -> Addon {
        Addon {
            name: "Mic Hat".to_string(),
            header: "hdr40".to_string(),
            dtbo: "/opt/overlays/mic.dtbo".into(),
            functions: vec!["i2s4".to_string(), "aud_mclk".to_string()],
            description: String::new(),
        }
    }

    #[test]
    fn toggling_a_function_is_reflected_in_labels() {
        let mut board = nano();
        let header = board.header_mut(0).unwrap();

        assert!(header.is_default());
        assert_eq!(header.pin_label(19), Some("unused"));

        assert!(header.toggle("spi1").unwrap());
        assert!(header.is_enabled("spi1"));
        assert!(!header.is_default());
        assert_eq!(header.pin_label(19), Some("spi1_mosi"));
        assert_eq!(header.pin_label(21), Some("spi1_miso"));

        // Pins outside the group are untouched
        assert_eq!(header.pin_label(13), Some("unused"));

        assert!(!header.toggle("spi1").unwrap());
        assert!(header.is_default());
        assert_eq!(header.pin_label(19), Some("unused"));
    }

    #[test]
    fn disabling_everything_restores_default() {
        let mut board = nano();
        let header = board.header_mut(0).unwrap();

        header.enable("spi1").unwrap();
        header.enable("pwm2").unwrap();
        assert!(!header.is_default());

        header.disable("spi1").unwrap();
        header.disable("pwm2").unwrap();
        assert!(header.is_default());
    }

    #[test]
    fn unknown_function_is_an_error() {
        let mut board = nano();
        let header = board.header_mut(0).unwrap();
        assert!(header.enable("spi9").is_err());
        assert!(header.function_pins("spi9").is_err());
    }

    #[test]
    fn fixed_and_power_pins_keep_their_labels() {
        let board = nano();
        let header = board.header(0).unwrap();
        assert_eq!(header.pin_label(1), Some("3.3V"));
        assert_eq!(header.pin_label(3), Some("i2c1_sda"));
        assert_eq!(header.pin_label(6), Some("GND"));
    }

    #[test]
    fn addon_replaces_manual_selection_and_discard_clears_it() {
        let mut board = nano();
        board.set_addons(vec![mic_addon()]);

        board.header_mut(0).unwrap().enable("spi1").unwrap();
        board.load_addon(0, "Mic Hat").unwrap();

        let header = board.header(0).unwrap();
        assert_eq!(header.addon(), Some("Mic Hat"));
        assert!(header.is_enabled("i2s4"));
        assert!(header.is_enabled("aud_mclk"));
        assert!(!header.is_enabled("spi1"));

        let header = board.header_mut(0).unwrap();
        header.set_default();
        assert!(header.is_default());
        assert_eq!(header.addon(), None);
    }

    #[test]
    fn unknown_addon_is_an_error() {
        let mut board = nano();
        board.set_addons(vec![mic_addon()]);
        let err = board.load_addon(0, "Ghost Hat").unwrap_err();
        assert!(err.to_string().contains("Unknown hardware addon"));
    }

    #[test]
    fn addon_for_wrong_header_is_rejected() {
        let mut board = nano();
        let mut addon = mic_addon();
        addon.header = "hdr12".to_string();
        let err = board.header_mut(0).unwrap().apply_addon(&addon).unwrap_err();
        assert!(err.to_string().contains("attaches to header"));
    }

    #[test]
    fn addon_with_bad_function_does_not_half_apply() {
        let mut board = nano();
        let mut addon = mic_addon();
        addon.functions = vec!["i2s4".to_string(), "nope".to_string()];

        let header = board.header_mut(0).unwrap();
        assert!(header.apply_addon(&addon).is_err());
        assert!(header.is_default());
    }

    #[test]
    fn display_rows_cover_all_nano_pins() {
        let board = nano();
        let rows = board.header(0).unwrap().display_rows();
        // Every Nano pin is listed, so no row collapses
        assert_eq!(rows.len(), 20);
        assert_eq!(rows[0].odd_pin, 1);
        assert_eq!(rows[0].odd_label, "3.3V");
        assert_eq!(rows[19].even_pin, 40);
    }

    #[test]
    fn detect_from_compatible_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("compatible");
        std::fs::write(&path, b"nvidia,p3450-0000\0nvidia,tegra210\0").unwrap();

        let board = Board::detect_from(&path).unwrap();
        assert_eq!(board.model(), "jetson-nano");
    }

    #[test]
    fn detect_rejects_unknown_platform() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("compatible");
        std::fs::write(&path, b"acme,widget\0").unwrap();

        let err = Board::detect_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Platform not supported"));
    }
}
