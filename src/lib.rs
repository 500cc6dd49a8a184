//! # PrinterScreen
//!
//! A touchscreen front-end for a 3D-printer control host. This crate ties
//! together:
//!
//! 1. **printerscreen-core** - Printer state model, payload decoding, state events, temperature control
//! 2. **printerscreen-communication** - Host notification decoding and routing, subscription requests
//! 3. **printerscreen-settings** - Screen configuration loading and validation
//! 4. **printerscreen** - Main binary: CLI, logging, and offline replay of recorded host traffic

pub mod replay;

pub use printerscreen_communication::{
    initial_query_path, splash_message, subscription_request, HostNotification,
    NotificationError, NotificationRouter, RouteOutcome,
};

pub use printerscreen_core::{
    Direction, Error, EventBus, EventFilter, HeaterCommand, NumpadKey, PrinterEvent,
    PrinterModel, PrinterState, PrinterStatusSummary, Result, TemperatureControl,
    TemperatureLimits,
};

pub use printerscreen_settings::{MainSettings, ScreenConfig, SettingsError, TemperatureSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output on stderr, keeping stdout for command output
/// - RUST_LOG environment variable support
/// - Thread ids and line numbers
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
