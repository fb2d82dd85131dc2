//! Terminal output helpers.

pub mod format;
pub mod messages;

pub use format::{format_duration, format_size};
pub use messages::{error, info, success, warn};
