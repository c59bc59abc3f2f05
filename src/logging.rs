//! Logging utilities for timetable-client
//!
//! The crate logs through `tracing` and never installs a subscriber; the
//! embedding application decides where events go.

pub use tracing::{debug as log_debug, error as log_error, info as log_info, warn as log_warn};
