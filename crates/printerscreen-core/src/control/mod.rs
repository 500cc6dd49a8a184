//! Direct user control of the printer
//!
//! Holds the non-visual logic behind interactive controls. Controls
//! update the model optimistically and hand back a typed command for the
//! caller to forward to the host.

pub mod temperature;

pub use temperature::{
    Direction, HeaterCommand, NumpadKey, TemperatureControl, TemperatureLimits, DEFAULT_DELTA,
    DEFAULT_DELTAS, MAX_ENTRY_DIGITS,
};
