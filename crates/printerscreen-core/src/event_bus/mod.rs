//! # Event Bus Module
//!
//! Publish/subscribe distribution of printer model events.
//!
//! ## Overview
//!
//! The bus is owned by a [`crate::PrinterModel`] and emits every state
//! transition, applied power-status change, and reinitialization:
//! - Any number of observers subscribe with an [`EventFilter`]
//! - Synchronous handlers run inline, inside the mutating call
//! - Async consumers can poll a broadcast receiver instead
//!
//! ## Usage
//!
//! ```rust,ignore
//! use printerscreen_core::event_bus::{EventFilter, PrinterEvent};
//! use printerscreen_core::PrinterState;
//!
//! let subscription = model.events().subscribe(
//!     EventFilter::States(vec![PrinterState::Printing]),
//!     |event| {
//!         if let PrinterEvent::StateChanged { previous, .. } = event {
//!             println!("print started (was {})", previous);
//!         }
//!     },
//! );
//!
//! model.events().unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
