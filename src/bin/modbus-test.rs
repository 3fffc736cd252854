//! Modbus bench utility.
//!
//! Brings up a dual-channel motor controller over Modbus RTU: selects
//! velocity mode, enables the drive, and sets both target speeds, then
//! closes the link. Matches the controller's serial defaults (115200 8N1,
//! station 1) on the Jetson's `/dev/ttyTHS1` UART.

use clap::Parser;
use headerio::modbus::{
    bringup_writes, execute_writes, registers, Connection, ModbusError, SerialSettings,
};

/// Issue the motor-controller bring-up register writes
#[derive(Parser, Debug)]
#[command(name = "modbus-test", author, version, about, long_about = None)]
struct Cli {
    /// Serial device
    #[arg(long, default_value = "/dev/ttyTHS1")]
    port: String,

    /// Baud rate
    #[arg(long, default_value_t = 115_200)]
    baud: u32,

    /// Modbus station (slave) address
    #[arg(long, default_value_t = 1)]
    station: u8,

    /// Target speed for both channels in RPM (negative reverses)
    #[arg(long, default_value_t = 10)]
    speed: i16,

    /// Read the speed registers back after writing
    #[arg(long)]
    verify: bool,
}

async fn run(cli: &Cli) -> Result<(), ModbusError> {
    let settings = SerialSettings {
        port: cli.port.clone(),
        baud_rate: cli.baud,
    };

    let mut connection = Connection::open(&settings, cli.station).await?;
    println!("Connected to {} at {} baud", settings.port, settings.baud_rate);

    let result = drive(&mut connection, cli).await;

    // Close the link on every path
    let closed = connection.close().await;
    result?;
    closed
}

async fn drive(connection: &mut Connection, cli: &Cli) -> Result<(), ModbusError> {
    let writes = bringup_writes(cli.speed);
    execute_writes(connection, &writes).await?;
    println!("Velocity mode set, drive enabled, target speed {} RPM", cli.speed);

    if cli.verify {
        let speeds = connection.read_registers(registers::TARGET_SPEED, 2).await?;
        println!(
            "Read back target speeds: left {} RPM, right {} RPM",
            speeds.first().copied().unwrap_or(0) as i16,
            speeds.get(1).copied().unwrap_or(0) as i16
        );
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    tokio::select! {
        result = run(&cli) => match result {
            Ok(()) => {}
            Err(ModbusError::Protocol(exception)) => {
                eprintln!("Received Modbus exception ({exception}) from device");
                std::process::exit(1);
            }
            Err(error) => {
                eprintln!("Error: {error}");
                std::process::exit(1);
            }
        },
        _ = tokio::signal::ctrl_c() => {
            println!("Exiting program");
        }
    }
}
