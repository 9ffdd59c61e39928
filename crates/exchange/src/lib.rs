pub mod balances;
pub mod order_rules;
pub mod prelude;
pub mod rate_limiter;
pub mod rest;
pub mod signing;
pub mod spot;
pub mod traits;
pub mod translate;
pub mod withdrawal;

pub use balances::value_balances;
pub use order_rules::{OrderRuleResolver, PriceSnapshot, RawInstrument, ReferencePrices};
pub use rate_limiter::{LimitStatus, LimiterKey, RateLimiterRegistry};
pub use rest::{Request, RestClient};
pub use signing::{canonical_body, canonical_query, hmac_sha256_base64, SignedRequest};
pub use spot::{ensure_tradable, funding_currency, size_order, SpotOrderPlanner, SpotSubmission, SpotVenue};
pub use traits::{VenueAdapter, VenueProfile};
pub use translate::ErrorTable;
pub use withdrawal::{WithdrawalOrchestrator, WithdrawalSubmission, WithdrawalVenue, BALANCE_LOCKED_REASON};
