//! Modbus RTU register access over a serial link.
//!
//! Thin wrapper around the tokio-modbus client: open a serial port, address a
//! station, issue holding-register reads and writes, and split failures into
//! the cases callers report differently (serial open, transport, protocol
//! exception from the device).

use thiserror::Error;
use tokio_modbus::client::{rtu, Client, Context, Reader, Writer};
use tokio_modbus::Slave;
use tokio_serial::SerialStream;

/// Register map of the dual-channel motor controller driven by the bench
/// utility.
pub mod registers {
    /// Control-mode selector
    pub const CONTROL_MODE: u16 = 0x200D;
    /// Drive enable/disable
    pub const DRIVE_ENABLE: u16 = 0x200E;
    /// Left/right target speed pair (RPM, two's complement)
    pub const TARGET_SPEED: u16 = 0x2088;

    /// `CONTROL_MODE` value selecting velocity mode
    pub const MODE_VELOCITY: u16 = 0x0003;
    /// `DRIVE_ENABLE` value enabling the drive
    pub const ENABLE: u16 = 0x0008;
}

/// Serial link parameters (8N1 framing, per the controller default).
#[derive(Debug, Clone)]
pub struct SerialSettings {
    /// Serial device path
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: "/dev/ttyTHS1".to_string(),
            baud_rate: 115_200,
        }
    }
}

/// Failures surfaced by the Modbus wrapper.
#[derive(Debug, Error)]
pub enum ModbusError {
    /// The serial port could not be opened
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),
    /// The request could not be delivered or answered
    #[error("transport error: {0}")]
    Transport(#[from] tokio_modbus::Error),
    /// I/O failure while closing the link
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// The device answered with a Modbus exception
    #[error("Modbus exception response: {0}")]
    Protocol(tokio_modbus::ExceptionCode),
}

type ClientResponse<T> = Result<Result<T, tokio_modbus::ExceptionCode>, tokio_modbus::Error>;

fn flatten<T>(response: ClientResponse<T>) -> Result<T, ModbusError> {
    match response {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(exception)) => Err(ModbusError::Protocol(exception)),
        Err(error) => Err(ModbusError::Transport(error)),
    }
}

/// An open Modbus RTU connection to one station.
pub struct Connection {
    ctx: Context,
}

impl Connection {
    /// Opens the serial port and attaches to a station address.
    pub async fn open(settings: &SerialSettings, station: u8) -> Result<Self, ModbusError> {
        let builder = tokio_serial::new(&settings.port, settings.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One);

        let stream = SerialStream::open(&builder)?;
        let ctx = rtu::attach_slave(stream, Slave(station));

        Ok(Self { ctx })
    }

    /// Writes one holding register.
    pub async fn write_register(&mut self, address: u16, value: u16) -> Result<(), ModbusError> {
        flatten(self.ctx.write_single_register(address, value).await)
    }

    /// Writes a block of holding registers starting at `address`.
    pub async fn write_registers(
        &mut self,
        address: u16,
        values: &[u16],
    ) -> Result<(), ModbusError> {
        flatten(self.ctx.write_multiple_registers(address, values).await)
    }

    /// Reads a block of holding registers starting at `address`.
    pub async fn read_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, ModbusError> {
        flatten(self.ctx.read_holding_registers(address, count).await)
    }

    /// Closes the link.
    pub async fn close(mut self) -> Result<(), ModbusError> {
        self.ctx.disconnect().await?;
        Ok(())
    }
}

/// One planned register write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Single-register write
    Single {
        /// Register address
        address: u16,
        /// Register value
        value: u16,
    },
    /// Multi-register write
    Multiple {
        /// First register address
        address: u16,
        /// Register values
        values: Vec<u16>,
    },
}

/// The controller bring-up sequence: velocity mode, drive enable, then both
/// target speeds.
#[must_use]
pub fn bringup_writes(speed_rpm: i16) -> Vec<WriteOp> {
    let speed = speed_rpm as u16;
    vec![
        WriteOp::Single {
            address: registers::CONTROL_MODE,
            value: registers::MODE_VELOCITY,
        },
        WriteOp::Single {
            address: registers::DRIVE_ENABLE,
            value: registers::ENABLE,
        },
        WriteOp::Multiple {
            address: registers::TARGET_SPEED,
            values: vec![speed, speed],
        },
    ]
}

/// Executes planned writes in order, stopping at the first failure.
pub async fn execute_writes(
    connection: &mut Connection,
    writes: &[WriteOp],
) -> Result<(), ModbusError> {
    for write in writes {
        match write {
            WriteOp::Single { address, value } => {
                tracing::debug!("write_register {address:#06x} = {value:#06x}");
                connection.write_register(*address, *value).await?;
            }
            WriteOp::Multiple { address, values } => {
                tracing::debug!("write_registers {address:#06x} = {values:04x?}");
                connection.write_registers(*address, values).await?;
            }
        }
    }
    Ok(())
}
