//! Type aliases for callback types.
//!
//! Boxed closures appear in the model's state slots and in the event bus
//! handler table; the aliases keep those signatures readable.
//!
//! ## Usage
//!
//! ```rust
//! use printerscreen_core::types::Callback;
//!
//! let on_ready: Callback = Box::new(|| println!("printer ready"));
//! on_ready();
//! ```

/// A boxed callback function with no arguments.
///
/// Used for the per-state callback slots of the printer model.
pub type Callback = Box<dyn Fn() + Send + Sync>;

/// A boxed callback function with one argument.
///
/// Used for event bus handlers.
pub type DataCallback<T> = Box<dyn Fn(T) + Send + Sync>;
