//! Type aliases shared across the printer model.
//!
//! ## Modules
//!
//! - [`aliases`]: Callback aliases for state slots and event handlers.

pub mod aliases;

pub use aliases::*;
