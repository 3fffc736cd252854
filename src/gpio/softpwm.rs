//! Software PWM on a sysfs GPIO output.
//!
//! A background thread toggles the pin with sleeps derived from the target
//! frequency and duty cycle; duty changes and shutdown are delivered over a
//! command channel.

use crate::gpio::Gpio;
use anyhow::{Context, Result};
use std::str::FromStr;
use std::sync::mpsc::{channel, Sender, TryRecvError};
use std::thread::JoinHandle;
use std::time::Duration;

/// Computes the high/low phase durations for one PWM period.
///
/// `duty_pct` is a percentage in `0..=100`; callers validate the range.
#[must_use]
pub fn pulse_widths(frequency_hz: f64, duty_pct: f64) -> (Duration, Duration) {
    let period = 1.0 / frequency_hz;
    let on = period * (duty_pct / 100.0);
    let off = period - on;
    (Duration::from_secs_f64(on), Duration::from_secs_f64(off))
}

/// One stage of a duty-cycle ramp: a duty percentage held for a duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DutyStage {
    /// Duty cycle percentage
    pub duty: f64,
    /// How long to hold the duty before the next stage
    pub hold: Duration,
}

impl FromStr for DutyStage {
    type Err = anyhow::Error;

    /// Parses `duty:hold_seconds`, e.g. `2:30`.
    fn from_str(s: &str) -> Result<Self> {
        let (duty, hold) = s
            .split_once(':')
            .context("Expected DUTY:SECONDS, e.g. 2:30")?;

        let duty: f64 = duty
            .trim()
            .parse()
            .context(format!("Invalid duty cycle '{duty}'"))?;
        if !(0.0..=100.0).contains(&duty) {
            anyhow::bail!("Duty cycle {duty} out of range 0..=100");
        }

        let seconds: f64 = hold
            .trim()
            .parse()
            .context(format!("Invalid hold time '{hold}'"))?;
        if seconds < 0.0 {
            anyhow::bail!("Hold time must not be negative");
        }

        Ok(Self {
            duty,
            hold: Duration::from_secs_f64(seconds),
        })
    }
}

enum PwmCommand {
    Duty(f64),
    Stop,
}

/// A running software PWM signal.
pub struct SoftPwm {
    tx: Sender<PwmCommand>,
    handle: Option<JoinHandle<()>>,
    frequency_hz: f64,
}

impl SoftPwm {
    /// Starts toggling `pin` at `frequency_hz` with the given duty cycle.
    pub fn start(pin: Gpio, frequency_hz: f64, duty_pct: f64) -> Result<Self> {
        if frequency_hz <= 0.0 {
            anyhow::bail!("PWM frequency must be positive, got {frequency_hz}");
        }
        Self::check_duty(duty_pct)?;

        let (tx, rx) = channel();
        let handle = std::thread::spawn(move || {
            let mut duty = duty_pct;
            loop {
                // Drain pending commands between periods
                loop {
                    match rx.try_recv() {
                        Ok(PwmCommand::Duty(d)) => duty = d,
                        Ok(PwmCommand::Stop) | Err(TryRecvError::Disconnected) => {
                            let _ = pin.set_low();
                            return;
                        }
                        Err(TryRecvError::Empty) => break,
                    }
                }

                let (on, off) = pulse_widths(frequency_hz, duty);
                if !on.is_zero() {
                    if pin.set_high().is_err() {
                        return;
                    }
                    std::thread::sleep(on);
                }
                if !off.is_zero() {
                    if pin.set_low().is_err() {
                        return;
                    }
                    std::thread::sleep(off);
                }
            }
        });

        Ok(Self {
            tx,
            handle: Some(handle),
            frequency_hz,
        })
    }

    /// Configured frequency.
    #[must_use]
    pub const fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    /// Changes the duty cycle of the running signal.
    pub fn set_duty_cycle(&self, duty_pct: f64) -> Result<()> {
        Self::check_duty(duty_pct)?;
        self.tx
            .send(PwmCommand::Duty(duty_pct))
            .context("PWM thread is no longer running")
    }

    /// Stops the signal and leaves the pin low.
    pub fn stop(mut self) -> Result<()> {
        self.tx
            .send(PwmCommand::Stop)
            .context("PWM thread is no longer running")?;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                anyhow::bail!("PWM thread panicked");
            }
        }
        Ok(())
    }

    fn check_duty(duty_pct: f64) -> Result<()> {
        if !(0.0..=100.0).contains(&duty_pct) {
            anyhow::bail!("Duty cycle {duty_pct} out of range 0..=100");
        }
        Ok(())
    }
}

impl Drop for SoftPwm {
    fn drop(&mut self) {
        let _ = self.tx.send(PwmCommand::Stop);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::GpioChip;
    use tempfile::TempDir;

    #[test]
    fn pulse_width_math() {
        let (on, off) = pulse_widths(500.0, 50.0);
        assert_eq!(on, Duration::from_millis(1));
        assert_eq!(off, Duration::from_millis(1));

        let (on, off) = pulse_widths(500.0, 0.0);
        assert!(on.is_zero());
        assert_eq!(off, Duration::from_millis(2));

        let (on, off) = pulse_widths(500.0, 100.0);
        assert_eq!(on, Duration::from_millis(2));
        assert!(off.is_zero());
    }

    #[test]
    fn duty_stage_parsing() {
        let stage: DutyStage = "2:30".parse().unwrap();
        assert_eq!(stage.duty, 2.0);
        assert_eq!(stage.hold, Duration::from_secs(30));

        let stage: DutyStage = "0.5:1.5".parse().unwrap();
        assert_eq!(stage.duty, 0.5);
        assert_eq!(stage.hold, Duration::from_secs_f64(1.5));

        assert!("2".parse::<DutyStage>().is_err());
        assert!("abc:1".parse::<DutyStage>().is_err());
        assert!("150:1".parse::<DutyStage>().is_err());
        assert!("5:-1".parse::<DutyStage>().is_err());
    }

    #[test]
    fn rejects_invalid_start_parameters() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("gpio38");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("direction"), "in").unwrap();
        std::fs::write(dir.join("value"), "0").unwrap();

        let chip = GpioChip::at(temp.path());
        let pin = chip.output(38).unwrap();
        assert!(SoftPwm::start(pin, 0.0, 50.0).is_err());

        let pin = chip.output(38).unwrap();
        assert!(SoftPwm::start(pin, 500.0, 150.0).is_err());
    }

    #[test]
    fn start_change_stop_leaves_pin_low() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("gpio38");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("direction"), "in").unwrap();
        std::fs::write(dir.join("value"), "1").unwrap();

        let chip = GpioChip::at(temp.path());
        let pin = chip.output(38).unwrap();

        let pwm = SoftPwm::start(pin, 200.0, 25.0).unwrap();
        pwm.set_duty_cycle(75.0).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        pwm.stop().unwrap();

        assert_eq!(
            std::fs::read_to_string(temp.path().join("gpio38/value")).unwrap(),
            "0"
        );
    }
}
