//! Static catalog of supported boards and their expansion headers.
//!
//! Each entry describes one developer-kit board: the device-tree compatible
//! strings it is detected by, its physical headers, the per-pin pad names and
//! kernel GPIO line numbers, and the named function groups that can be muxed
//! onto groups of pins.

/// One supported board.
#[derive(Debug)]
pub struct BoardDef {
    /// Short machine-friendly model id, e.g. `jetson-nano`
    pub model: &'static str,
    /// Human-readable board name
    pub display_name: &'static str,
    /// Device-tree compatible entries that identify this board
    pub compatible: &'static [&'static str],
    /// `compatible` property emitted into generated overlays
    pub overlay_compatible: &'static str,
    /// Physical expansion headers, in display order
    pub headers: &'static [HeaderDef],
}

/// One physical expansion header.
#[derive(Debug)]
pub struct HeaderDef {
    /// Short id used on the command line, e.g. `hdr40`
    pub id: &'static str,
    /// Human-readable name, e.g. `40-pin Header (J41)`
    pub name: &'static str,
    /// Total number of physical pins
    pub pin_count: u8,
    /// Node label used for the pinmux node in generated overlays
    pub pinmux_node: &'static str,
    /// Pins present in the pinmux tables; pins absent here are unlisted
    pub pins: &'static [PinDef],
    /// Function groups that can be enabled on this header
    pub functions: &'static [FunctionDef],
}

/// One numbered pin of a header.
#[derive(Debug)]
pub struct PinDef {
    /// Physical pin number (1-based)
    pub number: u8,
    /// What the pin is
    pub role: PinRole,
}

/// Classification of a header pin.
#[derive(Debug)]
pub enum PinRole {
    /// Power or ground, fixed label
    Power(&'static str),
    /// Dedicated function that cannot be remuxed from this tool
    Fixed(&'static str),
    /// Muxable pad
    Mux(MuxPin),
}

/// Pad-level data for a muxable pin.
#[derive(Debug)]
pub struct MuxPin {
    /// SoC pad name used in pinmux device-tree nodes
    pub pad: &'static str,
    /// Label shown while no function group claims the pin
    pub default_label: &'static str,
    /// Kernel (sysfs) GPIO line number, where the pad is GPIO-capable
    pub line: Option<u32>,
}

/// A named set of pins sharing a single alternate function.
#[derive(Debug)]
pub struct FunctionDef {
    /// Group name shown in menus and accepted on the command line
    pub name: &'static str,
    /// `nvidia,function` value emitted for the group's pins
    pub function: &'static str,
    /// Member pins
    pub pins: &'static [FunctionPin],
}

/// One pin of a function group.
#[derive(Debug)]
pub struct FunctionPin {
    /// Physical pin number
    pub pin: u8,
    /// Signal label shown on the pin diagram while the group is enabled
    pub signal: &'static str,
    /// Whether the pad is an input in this function (sets `nvidia,enable-input`)
    pub input: bool,
}

impl HeaderDef {
    /// Looks up the pin table entry for a physical pin number.
    #[must_use]
    pub fn pin(&self, number: u8) -> Option<&'static PinDef> {
        self.pins.iter().find(|p| p.number == number)
    }

    /// Looks up a function group by name.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&'static FunctionDef> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Kernel GPIO line for a pin, if the pad is GPIO-capable.
    #[must_use]
    pub fn line(&self, number: u8) -> Option<u32> {
        match self.pin(number)?.role {
            PinRole::Mux(MuxPin { line, .. }) => line,
            _ => None,
        }
    }
}

/// All boards this build knows about.
pub static BOARDS: &[&BoardDef] = &[&JETSON_NANO, &JETSON_XAVIER_NX];

/// Finds a board definition by model id.
#[must_use]
pub fn board_by_model(model: &str) -> Option<&'static BoardDef> {
    BOARDS.iter().copied().find(|b| b.model == model)
}

/// Finds a board definition matching a set of device-tree compatible entries.
#[must_use]
pub fn board_by_compatible(entries: &[String]) -> Option<&'static BoardDef> {
    BOARDS
        .iter()
        .copied()
        .find(|b| b.compatible.iter().any(|c| entries.iter().any(|e| e == c)))
}

/// Jetson Nano Developer Kit.
pub static JETSON_NANO: BoardDef = BoardDef {
    model: "jetson-nano",
    display_name: "Jetson Nano Developer Kit",
    compatible: &["nvidia,p3450-0000", "nvidia,p3450-0002"],
    overlay_compatible: "nvidia,p3449-0000+p3448-0000",
    headers: &[HeaderDef {
        id: "hdr40",
        name: "40-pin Header (J41)",
        pin_count: 40,
        pinmux_node: "exp-header-pinmux",
        pins: NANO_HDR40_PINS,
        functions: NANO_HDR40_FUNCTIONS,
    }],
};

static NANO_HDR40_PINS: &[PinDef] = &[
    PinDef { number: 1, role: PinRole::Power("3.3V") },
    PinDef { number: 2, role: PinRole::Power("5V") },
    PinDef { number: 3, role: PinRole::Fixed("i2c1_sda") },
    PinDef { number: 4, role: PinRole::Power("5V") },
    PinDef { number: 5, role: PinRole::Fixed("i2c1_scl") },
    PinDef { number: 6, role: PinRole::Power("GND") },
    PinDef {
        number: 7,
        role: PinRole::Mux(MuxPin { pad: "aud_mclk_pbb0", default_label: "unused", line: Some(216) }),
    },
    PinDef { number: 8, role: PinRole::Fixed("uart1_txd") },
    PinDef { number: 9, role: PinRole::Power("GND") },
    PinDef { number: 10, role: PinRole::Fixed("uart1_rxd") },
    PinDef {
        number: 11,
        role: PinRole::Mux(MuxPin { pad: "uart2_rts_pg2", default_label: "unused", line: Some(50) }),
    },
    PinDef {
        number: 12,
        role: PinRole::Mux(MuxPin { pad: "dap4_sclk_pj7", default_label: "unused", line: Some(79) }),
    },
    PinDef {
        number: 13,
        role: PinRole::Mux(MuxPin { pad: "spi2_sck_pb6", default_label: "unused", line: Some(14) }),
    },
    PinDef { number: 14, role: PinRole::Power("GND") },
    PinDef {
        number: 15,
        role: PinRole::Mux(MuxPin { pad: "lcd_te_py2", default_label: "unused", line: Some(194) }),
    },
    PinDef {
        number: 16,
        role: PinRole::Mux(MuxPin { pad: "spi2_cs1_pdd0", default_label: "unused", line: Some(232) }),
    },
    PinDef { number: 17, role: PinRole::Power("3.3V") },
    PinDef {
        number: 18,
        role: PinRole::Mux(MuxPin { pad: "spi2_cs0_pb7", default_label: "unused", line: Some(15) }),
    },
    PinDef {
        number: 19,
        role: PinRole::Mux(MuxPin { pad: "spi1_mosi_pc0", default_label: "unused", line: Some(16) }),
    },
    PinDef { number: 20, role: PinRole::Power("GND") },
    PinDef {
        number: 21,
        role: PinRole::Mux(MuxPin { pad: "spi1_miso_pc1", default_label: "unused", line: Some(17) }),
    },
    PinDef {
        number: 22,
        role: PinRole::Mux(MuxPin { pad: "spi2_miso_pb5", default_label: "unused", line: Some(13) }),
    },
    PinDef {
        number: 23,
        role: PinRole::Mux(MuxPin { pad: "spi1_sck_pc2", default_label: "unused", line: Some(18) }),
    },
    PinDef {
        number: 24,
        role: PinRole::Mux(MuxPin { pad: "spi1_cs0_pc3", default_label: "unused", line: Some(19) }),
    },
    PinDef { number: 25, role: PinRole::Power("GND") },
    PinDef {
        number: 26,
        role: PinRole::Mux(MuxPin { pad: "spi1_cs1_pc4", default_label: "unused", line: Some(20) }),
    },
    PinDef { number: 27, role: PinRole::Fixed("i2c0_sda") },
    PinDef { number: 28, role: PinRole::Fixed("i2c0_scl") },
    PinDef {
        number: 29,
        role: PinRole::Mux(MuxPin { pad: "cam_af_en_ps5", default_label: "unused", line: Some(149) }),
    },
    PinDef { number: 30, role: PinRole::Power("GND") },
    PinDef {
        number: 31,
        role: PinRole::Mux(MuxPin { pad: "gpio_pz0", default_label: "unused", line: Some(200) }),
    },
    PinDef {
        number: 32,
        role: PinRole::Mux(MuxPin { pad: "lcd_bl_pw_pv0", default_label: "unused", line: Some(168) }),
    },
    PinDef {
        number: 33,
        role: PinRole::Mux(MuxPin { pad: "gpio_pe6_pe6", default_label: "unused", line: Some(38) }),
    },
    PinDef { number: 34, role: PinRole::Power("GND") },
    PinDef {
        number: 35,
        role: PinRole::Mux(MuxPin { pad: "dap4_fs_pj4", default_label: "unused", line: Some(76) }),
    },
    PinDef {
        number: 36,
        role: PinRole::Mux(MuxPin { pad: "uart2_cts_pg3", default_label: "unused", line: Some(51) }),
    },
    PinDef {
        number: 37,
        role: PinRole::Mux(MuxPin { pad: "spi2_mosi_pb4", default_label: "unused", line: Some(12) }),
    },
    PinDef {
        number: 38,
        role: PinRole::Mux(MuxPin { pad: "dap4_din_pj5", default_label: "unused", line: Some(77) }),
    },
    PinDef { number: 39, role: PinRole::Power("GND") },
    PinDef {
        number: 40,
        role: PinRole::Mux(MuxPin { pad: "dap4_dout_pj6", default_label: "unused", line: Some(78) }),
    },
];

static NANO_HDR40_FUNCTIONS: &[FunctionDef] = &[
    FunctionDef {
        name: "aud_mclk",
        function: "aud",
        pins: &[FunctionPin { pin: 7, signal: "aud_mclk", input: false }],
    },
    FunctionDef {
        name: "uartb-cts/rts",
        function: "uartb",
        pins: &[
            FunctionPin { pin: 11, signal: "uartb_rts", input: false },
            FunctionPin { pin: 36, signal: "uartb_cts", input: true },
        ],
    },
    FunctionDef {
        name: "i2s4",
        function: "i2s4",
        pins: &[
            FunctionPin { pin: 12, signal: "i2s4_sclk", input: false },
            FunctionPin { pin: 35, signal: "i2s4_fs", input: false },
            FunctionPin { pin: 38, signal: "i2s4_din", input: true },
            FunctionPin { pin: 40, signal: "i2s4_dout", input: false },
        ],
    },
    FunctionDef {
        name: "spi1",
        function: "spi1",
        pins: &[
            FunctionPin { pin: 19, signal: "spi1_mosi", input: false },
            FunctionPin { pin: 21, signal: "spi1_miso", input: true },
            FunctionPin { pin: 23, signal: "spi1_sck", input: false },
            FunctionPin { pin: 24, signal: "spi1_cs0", input: false },
            FunctionPin { pin: 26, signal: "spi1_cs1", input: false },
        ],
    },
    FunctionDef {
        name: "spi2",
        function: "spi2",
        pins: &[
            FunctionPin { pin: 13, signal: "spi2_sck", input: false },
            FunctionPin { pin: 16, signal: "spi2_cs1", input: false },
            FunctionPin { pin: 18, signal: "spi2_cs0", input: false },
            FunctionPin { pin: 22, signal: "spi2_miso", input: true },
            FunctionPin { pin: 37, signal: "spi2_mosi", input: false },
        ],
    },
    FunctionDef {
        name: "pwm0",
        function: "pwm0",
        pins: &[FunctionPin { pin: 32, signal: "pwm0", input: false }],
    },
    FunctionDef {
        name: "pwm2",
        function: "pwm2",
        pins: &[FunctionPin { pin: 33, signal: "pwm2", input: false }],
    },
];

/// Jetson Xavier NX Developer Kit.
pub static JETSON_XAVIER_NX: BoardDef = BoardDef {
    model: "jetson-xavier-nx",
    display_name: "Jetson Xavier NX Developer Kit",
    compatible: &["nvidia,p3668-0000", "nvidia,p3668-0001"],
    overlay_compatible: "nvidia,p3509-0000+p3668-0000",
    headers: &[HeaderDef {
        id: "hdr40",
        name: "40-pin Header (J12)",
        pin_count: 40,
        pinmux_node: "exp-header-pinmux",
        pins: NX_HDR40_PINS,
        functions: NX_HDR40_FUNCTIONS,
    }],
};

static NX_HDR40_PINS: &[PinDef] = &[
    PinDef { number: 1, role: PinRole::Power("3.3V") },
    PinDef { number: 2, role: PinRole::Power("5V") },
    PinDef { number: 3, role: PinRole::Fixed("i2c8_sda") },
    PinDef { number: 4, role: PinRole::Power("5V") },
    PinDef { number: 5, role: PinRole::Fixed("i2c8_scl") },
    PinDef { number: 6, role: PinRole::Power("GND") },
    PinDef {
        number: 7,
        role: PinRole::Mux(MuxPin { pad: "aud_mclk_ps4", default_label: "unused", line: Some(422) }),
    },
    PinDef { number: 8, role: PinRole::Fixed("uart1_txd") },
    PinDef { number: 9, role: PinRole::Power("GND") },
    PinDef { number: 10, role: PinRole::Fixed("uart1_rxd") },
    PinDef {
        number: 11,
        role: PinRole::Mux(MuxPin { pad: "uart1_rts_pr4", default_label: "unused", line: Some(428) }),
    },
    PinDef {
        number: 12,
        role: PinRole::Mux(MuxPin { pad: "dap5_sclk_pt5", default_label: "unused", line: Some(351) }),
    },
    PinDef {
        number: 13,
        role: PinRole::Mux(MuxPin { pad: "spi3_sck_py0", default_label: "unused", line: Some(424) }),
    },
    PinDef { number: 14, role: PinRole::Power("GND") },
    PinDef {
        number: 15,
        role: PinRole::Mux(MuxPin { pad: "touch_clk_pcc4", default_label: "unused", line: Some(393) }),
    },
    PinDef {
        number: 16,
        role: PinRole::Mux(MuxPin { pad: "spi3_cs1_py4", default_label: "unused", line: Some(472) }),
    },
    PinDef { number: 17, role: PinRole::Power("3.3V") },
    PinDef {
        number: 18,
        role: PinRole::Mux(MuxPin { pad: "spi3_cs0_py3", default_label: "unused", line: Some(433) }),
    },
    PinDef {
        number: 19,
        role: PinRole::Mux(MuxPin { pad: "spi1_mosi_pz5", default_label: "unused", line: Some(493) }),
    },
    PinDef { number: 20, role: PinRole::Power("GND") },
    PinDef {
        number: 21,
        role: PinRole::Mux(MuxPin { pad: "spi1_miso_pz4", default_label: "unused", line: Some(492) }),
    },
    PinDef {
        number: 22,
        role: PinRole::Mux(MuxPin { pad: "spi3_miso_py1", default_label: "unused", line: Some(425) }),
    },
    PinDef {
        number: 23,
        role: PinRole::Mux(MuxPin { pad: "spi1_sck_pz3", default_label: "unused", line: Some(491) }),
    },
    PinDef {
        number: 24,
        role: PinRole::Mux(MuxPin { pad: "spi1_cs0_pz6", default_label: "unused", line: Some(494) }),
    },
    PinDef { number: 25, role: PinRole::Power("GND") },
    PinDef {
        number: 26,
        role: PinRole::Mux(MuxPin { pad: "spi1_cs1_pz7", default_label: "unused", line: Some(495) }),
    },
    PinDef { number: 27, role: PinRole::Fixed("i2c2_sda") },
    PinDef { number: 28, role: PinRole::Fixed("i2c2_scl") },
    PinDef {
        number: 29,
        role: PinRole::Mux(MuxPin { pad: "soc_gpio41_pq5", default_label: "unused", line: Some(453) }),
    },
    PinDef { number: 30, role: PinRole::Power("GND") },
    PinDef {
        number: 31,
        role: PinRole::Mux(MuxPin { pad: "soc_gpio42_pq6", default_label: "unused", line: Some(454) }),
    },
    PinDef {
        number: 32,
        role: PinRole::Mux(MuxPin { pad: "soc_gpio44_pr0", default_label: "unused", line: Some(389) }),
    },
    PinDef {
        number: 33,
        role: PinRole::Mux(MuxPin { pad: "soc_gpio54_pn1", default_label: "unused", line: Some(398) }),
    },
    PinDef { number: 34, role: PinRole::Power("GND") },
    PinDef {
        number: 35,
        role: PinRole::Mux(MuxPin { pad: "dap5_fs_pu0", default_label: "unused", line: Some(354) }),
    },
    PinDef {
        number: 36,
        role: PinRole::Mux(MuxPin { pad: "uart1_cts_pr5", default_label: "unused", line: Some(429) }),
    },
    PinDef {
        number: 37,
        role: PinRole::Mux(MuxPin { pad: "spi3_mosi_py2", default_label: "unused", line: Some(426) }),
    },
    PinDef {
        number: 38,
        role: PinRole::Mux(MuxPin { pad: "dap5_din_pt7", default_label: "unused", line: Some(353) }),
    },
    PinDef { number: 39, role: PinRole::Power("GND") },
    PinDef {
        number: 40,
        role: PinRole::Mux(MuxPin { pad: "dap5_dout_pt6", default_label: "unused", line: Some(352) }),
    },
];

static NX_HDR40_FUNCTIONS: &[FunctionDef] = &[
    FunctionDef {
        name: "aud_mclk",
        function: "aud",
        pins: &[FunctionPin { pin: 7, signal: "aud_mclk", input: false }],
    },
    FunctionDef {
        name: "uarta-cts/rts",
        function: "uarta",
        pins: &[
            FunctionPin { pin: 11, signal: "uarta_rts", input: false },
            FunctionPin { pin: 36, signal: "uarta_cts", input: true },
        ],
    },
    FunctionDef {
        name: "i2s5",
        function: "i2s5",
        pins: &[
            FunctionPin { pin: 12, signal: "i2s5_sclk", input: false },
            FunctionPin { pin: 35, signal: "i2s5_fs", input: false },
            FunctionPin { pin: 38, signal: "i2s5_din", input: true },
            FunctionPin { pin: 40, signal: "i2s5_dout", input: false },
        ],
    },
    FunctionDef {
        name: "spi1",
        function: "spi1",
        pins: &[
            FunctionPin { pin: 19, signal: "spi1_mosi", input: false },
            FunctionPin { pin: 21, signal: "spi1_miso", input: true },
            FunctionPin { pin: 23, signal: "spi1_sck", input: false },
            FunctionPin { pin: 24, signal: "spi1_cs0", input: false },
            FunctionPin { pin: 26, signal: "spi1_cs1", input: false },
        ],
    },
    FunctionDef {
        name: "spi3",
        function: "spi3",
        pins: &[
            FunctionPin { pin: 13, signal: "spi3_sck", input: false },
            FunctionPin { pin: 16, signal: "spi3_cs1", input: false },
            FunctionPin { pin: 18, signal: "spi3_cs0", input: false },
            FunctionPin { pin: 22, signal: "spi3_miso", input: true },
            FunctionPin { pin: 37, signal: "spi3_mosi", input: false },
        ],
    },
    FunctionDef {
        name: "pwm1",
        function: "pwm1",
        pins: &[FunctionPin { pin: 15, signal: "pwm1", input: false }],
    },
    FunctionDef {
        name: "pwm8",
        function: "pwm8",
        pins: &[FunctionPin { pin: 32, signal: "pwm8", input: false }],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_model() {
        assert!(board_by_model("jetson-nano").is_some());
        assert!(board_by_model("jetson-agx-orin").is_none());
    }

    #[test]
    fn lookup_by_compatible() {
        let entries = vec![
            "nvidia,p3450-0000".to_string(),
            "nvidia,tegra210".to_string(),
        ];
        let board = board_by_compatible(&entries).unwrap();
        assert_eq!(board.model, "jetson-nano");

        let unknown = vec!["raspberrypi,4-model-b".to_string()];
        assert!(board_by_compatible(&unknown).is_none());
    }

    #[test]
    fn function_pins_are_listed_in_pin_table() {
        for board in BOARDS {
            for header in board.headers {
                for function in header.functions {
                    for fp in function.pins {
                        let pin = header.pin(fp.pin).unwrap_or_else(|| {
                            panic!("{}: function {} references unlisted pin {}",
                                board.model, function.name, fp.pin)
                        });
                        assert!(
                            matches!(pin.role, PinRole::Mux(_)),
                            "{}: function {} claims non-muxable pin {}",
                            board.model,
                            function.name,
                            fp.pin
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn no_pin_belongs_to_two_functions() {
        for board in BOARDS {
            for header in board.headers {
                let mut seen = std::collections::HashSet::new();
                for function in header.functions {
                    for fp in function.pins {
                        assert!(
                            seen.insert(fp.pin),
                            "{}: pin {} claimed by two functions",
                            board.model,
                            fp.pin
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn pwm_pin_has_gpio_line() {
        let nano = board_by_model("jetson-nano").unwrap();
        assert_eq!(nano.headers[0].line(33), Some(38));
        assert_eq!(nano.headers[0].line(6), None);
    }
}
