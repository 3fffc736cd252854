//! PWM bench utility.
//!
//! Opens one GPIO output, starts a fixed-frequency software PWM signal, and
//! steps the duty cycle through a configurable ramp with fixed holds. The
//! default ramp mirrors the bench bring-up profile: 500 Hz on pin 33, 1%
//! for a second, 2% for thirty, then 4% briefly before stopping.

use anyhow::{Context, Result};
use clap::Parser;
use headerio::board::Board;
use headerio::gpio::{line_for_board_pin, DutyStage, GpioChip, SoftPwm};

/// Ramp a software-PWM output through duty-cycle stages
#[derive(Parser, Debug)]
#[command(name = "pwm-test", author, version, about, long_about = None)]
struct Cli {
    /// BOARD pin number to drive
    #[arg(long, default_value_t = 33)]
    pin: u8,

    /// Header carrying the pin
    #[arg(long, value_name = "ID", default_value = "hdr40")]
    header: String,

    /// PWM frequency in Hz
    #[arg(long, default_value_t = 500.0)]
    freq: f64,

    /// Ramp stages as DUTY:SECONDS (repeatable, in order)
    #[arg(long = "stage", value_name = "DUTY:SECONDS")]
    stages: Vec<DutyStage>,

    /// Override board detection with a catalog model, e.g. jetson-nano
    #[arg(long, value_name = "MODEL")]
    board: Option<String>,
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    let board = match cli.board.as_deref() {
        Some(model) => Board::from_model(model)?,
        None => Board::detect()?,
    };

    // Default ramp: 1% for 1s, 2% for 30s, 4% for 2s
    let stages = if cli.stages.is_empty() {
        vec![
            "1:1".parse::<DutyStage>().context("default stage")?,
            "2:30".parse::<DutyStage>().context("default stage")?,
            "4:2".parse::<DutyStage>().context("default stage")?,
        ]
    } else {
        cli.stages
    };

    let line = line_for_board_pin(board.def(), &cli.header, cli.pin)?;
    tracing::info!(
        "Driving pin {} ({} line {line}) at {} Hz",
        cli.pin,
        board.model(),
        cli.freq
    );

    let pin = GpioChip::system().output(line)?;

    let first = stages
        .first()
        .context("At least one ramp stage is required")?;
    let pwm = SoftPwm::start(pin, cli.freq, first.duty)?;

    for (index, stage) in stages.iter().enumerate() {
        if index > 0 {
            pwm.set_duty_cycle(stage.duty)?;
        }
        tracing::info!("Duty {}% for {:?}", stage.duty, stage.hold);
        std::thread::sleep(stage.hold);
    }

    pwm.stop()?;
    tracing::info!("PWM stopped, pin left low");

    Ok(())
}
