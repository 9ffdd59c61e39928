//! Signed, rate-limited access to custodial exchange accounts.
//!
//! Each venue adapter exposes the same [`VenueAdapter`] operations: balances,
//! deposit addresses, withdrawals with a bounded balance-lock retry, market
//! orders, trading and withdrawal rules. [`VenueFactory`] builds adapters that
//! share one rate limiter registry.

pub mod factory;

pub use venuebridge_core::prelude::*;
pub use venuebridge_exchange::prelude::*;
pub use venuebridge_monitoring::prelude::*;

pub use factory::VenueFactory;

// Re-export venue adapters
pub use venuebridge_bitget::BitgetAdapter;
pub use venuebridge_kucoin::KucoinAdapter;
