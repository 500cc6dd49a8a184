//! Temperature control
//!
//! Step adjustment and numpad entry of heater targets. Targets are written
//! to the model right away; the returned [`HeaterCommand`] is what the
//! caller sends to the firmware.

use serde::{Deserialize, Serialize};

use crate::data::config::is_bed_heater_section;
use crate::data::HeaterField;
use crate::error::ControlError;
use crate::model::PrinterModel;

/// Step sizes offered for target adjustment, in °C
pub const DEFAULT_DELTAS: [u32; 4] = [1, 5, 10, 25];

/// Step size selected initially, in °C
pub const DEFAULT_DELTA: u32 = 10;

/// Maximum digits accepted by the numpad entry
pub const MAX_ENTRY_DIGITS: usize = 3;

/// Upper bounds for heater targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureLimits {
    /// Maximum extruder target in °C
    pub max_extruder: f64,
    /// Maximum bed target in °C
    pub max_bed: f64,
}

impl Default for TemperatureLimits {
    fn default() -> Self {
        Self {
            max_extruder: 250.0,
            max_bed: 120.0,
        }
    }
}

impl TemperatureLimits {
    /// Limit for the named heater
    pub fn max_for(&self, heater: &str) -> f64 {
        if is_bed_heater_section(heater) {
            self.max_bed
        } else {
            self.max_extruder
        }
    }
}

/// Direction of a step adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}

/// A key of the target-entry numpad
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumpadKey {
    /// A digit 0-9
    Digit(u8),
    /// Remove the last digit
    Backspace,
    /// Apply the entered target
    Enter,
}

impl NumpadKey {
    /// Map a numpad label (`0`-`9`, `B`, `E`) to a key
    pub fn from_label(label: char) -> Option<Self> {
        match label {
            'B' => Some(NumpadKey::Backspace),
            'E' => Some(NumpadKey::Enter),
            c => c.to_digit(10).map(|d| NumpadKey::Digit(d as u8)),
        }
    }
}

/// Firmware command produced by a target change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HeaterCommand {
    /// Set the bed target
    SetBedTemp {
        /// Target in °C
        target: f64,
    },
    /// Set a tool's target
    SetExtruderTemp {
        /// Firmware tool index
        tool: usize,
        /// Target in °C
        target: f64,
    },
}

/// Temperature control state for one screen
#[derive(Debug, Clone)]
pub struct TemperatureControl {
    active_heater: Option<String>,
    deltas: Vec<u32>,
    delta: u32,
    entry: String,
    limits: TemperatureLimits,
}

impl TemperatureControl {
    /// Create a control with default steps and limits
    pub fn new() -> Self {
        Self {
            active_heater: None,
            deltas: DEFAULT_DELTAS.to_vec(),
            delta: DEFAULT_DELTA,
            entry: String::new(),
            limits: TemperatureLimits::default(),
        }
    }

    /// Create a control with custom steps and limits
    ///
    /// `delta` must be one of `deltas`.
    pub fn with_settings(
        deltas: Vec<u32>,
        delta: u32,
        limits: TemperatureLimits,
    ) -> Result<Self, ControlError> {
        if !deltas.contains(&delta) {
            return Err(ControlError::UnsupportedDelta { delta });
        }
        Ok(Self {
            active_heater: None,
            deltas,
            delta,
            entry: String::new(),
            limits,
        })
    }

    /// The selected heater, falling back to the first tool
    pub fn active_heater<'a>(&'a self, model: &'a PrinterModel) -> Option<&'a str> {
        self.active_heater
            .as_deref()
            .or_else(|| model.get_tools().first().map(String::as_str))
    }

    /// Select the heater that step and numpad input apply to
    ///
    /// Clears the numpad entry.
    pub fn select_heater(&mut self, model: &PrinterModel, heater: &str) -> Result<(), ControlError> {
        if model.get_dev_stats(heater).is_none() {
            return Err(ControlError::UnknownHeater {
                heater: heater.to_string(),
            });
        }
        if self.active_heater.as_deref() == Some(heater) {
            return Ok(());
        }

        self.active_heater = Some(heater.to_string());
        self.entry.clear();
        tracing::info!("Active heater {}", heater);
        Ok(())
    }

    /// Select the step size
    pub fn set_delta(&mut self, delta: u32) -> Result<(), ControlError> {
        if !self.deltas.contains(&delta) {
            return Err(ControlError::UnsupportedDelta { delta });
        }
        if self.delta != delta {
            tracing::info!("Temperature step {}", delta);
            self.delta = delta;
        }
        Ok(())
    }

    pub fn delta(&self) -> u32 {
        self.delta
    }

    pub fn deltas(&self) -> &[u32] {
        &self.deltas
    }

    pub fn limits(&self) -> TemperatureLimits {
        self.limits
    }

    /// Digits typed so far
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Step the active heater's target by the current delta
    ///
    /// The new target is clamped to `[0, max]` for the heater kind.
    pub fn adjust_target(
        &mut self,
        model: &mut PrinterModel,
        direction: Direction,
    ) -> Result<HeaterCommand, ControlError> {
        let heater = self.require_heater(model)?;
        let current = model
            .get_dev_stat(&heater, HeaterField::Target)
            .ok_or_else(|| ControlError::UnknownHeater {
                heater: heater.clone(),
            })?;

        let step = f64::from(self.delta);
        let target = match direction {
            Direction::Increase => current + step,
            Direction::Decrease => current - step,
        }
        .clamp(0.0, self.limits.max_for(&heater));

        self.apply_target(model, &heater, target)
    }

    /// Feed one numpad key
    ///
    /// Returns a command only when `Enter` applies a target. Out-of-range
    /// entries apply a target of 0.
    pub fn press_key(
        &mut self,
        model: &mut PrinterModel,
        key: NumpadKey,
    ) -> Result<Option<HeaterCommand>, ControlError> {
        match key {
            NumpadKey::Digit(d) if d <= 9 => {
                if self.entry.len() < MAX_ENTRY_DIGITS {
                    self.entry.push(char::from(b'0' + d));
                }
                Ok(None)
            }
            NumpadKey::Digit(d) => {
                tracing::trace!("Ignoring numpad digit {}", d);
                Ok(None)
            }
            NumpadKey::Backspace => {
                self.entry.pop();
                Ok(None)
            }
            NumpadKey::Enter => {
                if self.entry.is_empty() {
                    return Err(ControlError::EmptyEntry);
                }
                let heater = self.require_heater(model)?;
                let typed = self.entry.parse::<u32>().map_or(0.0, f64::from);
                let target = if typed > self.limits.max_for(&heater) {
                    0.0
                } else {
                    typed
                };

                let command = self.apply_target(model, &heater, target)?;
                self.entry.clear();
                Ok(Some(command))
            }
        }
    }

    fn require_heater(&self, model: &PrinterModel) -> Result<String, ControlError> {
        self.active_heater(model)
            .map(str::to_string)
            .ok_or(ControlError::NoHeater)
    }

    fn apply_target(
        &self,
        model: &mut PrinterModel,
        heater: &str,
        target: f64,
    ) -> Result<HeaterCommand, ControlError> {
        let unknown = || ControlError::UnknownHeater {
            heater: heater.to_string(),
        };

        let command = if is_bed_heater_section(heater) {
            HeaterCommand::SetBedTemp { target }
        } else {
            let tool = model.get_tool_number(heater).ok_or_else(unknown)?;
            HeaterCommand::SetExtruderTemp { tool, target }
        };

        if !model.set_target(heater, target) {
            return Err(unknown());
        }
        tracing::debug!("{} target set to {}", heater, target);
        Ok(command)
    }
}

impl Default for TemperatureControl {
    fn default() -> Self {
        Self::new()
    }
}
