//! Expansion header workbench library.
//!
//! Core functionality behind the `headerio` terminal tool and its bench
//! utilities: the board/header pin model, device-tree overlay generation,
//! sysfs GPIO with software PWM, and Modbus RTU register access.

pub mod board;
pub mod cli;
pub mod config;
pub mod constants;
pub mod dt;
pub mod gpio;
pub mod modbus;
pub mod tui;
