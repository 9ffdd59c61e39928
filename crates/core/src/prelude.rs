//! Prelude module - re-exports commonly used types for convenience

pub use crate::collaborators::{Converter, FixedRateConverter, InMemoryStorage, Storage};
pub use crate::config::{BridgeConfig, LoggingConfig, SpotConfig, VenueConfig, WithdrawalConfig};
pub use crate::error::{BridgeError, ErrorKind, Result};
pub use crate::types::{
    order::*,
    venue::*,
    withdrawal::*,
};
pub use crate::utils::{round_down, round_up, round_usd, ClientIdPurpose, IdGenerator};

// Re-export commonly used external types
pub use rust_decimal::Decimal;
