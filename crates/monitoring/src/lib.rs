//! Logging bootstrap and structured audit events.

pub mod logging;

pub use logging::{build_filter, setup_logging, AuditLogger};
pub use venuebridge_core::config::LoggingConfig;

pub mod prelude {
    pub use super::{setup_logging, AuditLogger, LoggingConfig};
}
