//! # PrinterScreen Communication
//!
//! Host-side message handling for PrinterScreen.
//! Decodes JSON-RPC notifications pushed by the firmware host, routes them
//! into an explicitly owned [`printerscreen_core::PrinterModel`], and builds
//! the object query and subscription requests the transport sends.

pub mod error;
pub mod notification;
pub mod router;
pub mod splash;
pub mod subscription;

pub use error::{NotificationError, Result};
pub use notification::HostNotification;
pub use router::{NotificationRouter, RouteOutcome};
pub use splash::splash_message;
pub use subscription::{initial_query_path, subscription_request, INITIAL_QUERY_OBJECTS};
