//! Prelude module for venuebridge-exchange
//!
//! Re-exports commonly used types and traits

pub use crate::order_rules::{OrderRuleResolver, PriceSnapshot, RawInstrument, ReferencePrices};
pub use crate::rate_limiter::{LimiterKey, RateLimiterRegistry};
pub use crate::rest::{Request, RestClient};
pub use crate::signing::SignedRequest;
pub use crate::spot::{SpotOrderPlanner, SpotSubmission, SpotVenue};
pub use crate::traits::{VenueAdapter, VenueProfile};
pub use crate::translate::ErrorTable;
pub use crate::withdrawal::{WithdrawalOrchestrator, WithdrawalSubmission, WithdrawalVenue};

// Re-export common types from core
pub use venuebridge_core::prelude::*;
