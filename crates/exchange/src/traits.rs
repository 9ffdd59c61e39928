use async_trait::async_trait;
use rust_decimal::Decimal;
use std::time::Duration;

use venuebridge_core::{
    AccountBalance, ConnectionHash, Credential, DepositAddress, EndpointLimit, ExchangeSymbol,
    NormalizedOrderStatus, OrderDetailsRequest, OrderRules, Result, SpotOrderRequest, SpotOrderResult,
    VenueId, WithdrawalOrderRequest, WithdrawalOrderResult, WithdrawalRecord, WithdrawalRule,
};

use crate::signing::SignedRequest;
use crate::translate::ErrorTable;

/// Uniform operation set every venue variant implements.
///
/// Implementations are safe for concurrent use. Every operation observes the
/// adapter's cancellation token; `shutdown` cancels it.
#[async_trait]
pub trait VenueAdapter: Send + Sync {
    fn venue_id(&self) -> VenueId;

    /// Stable identifier of the credential this adapter was built with.
    fn connection_hash(&self) -> ConnectionHash;

    /// One lightweight authenticated call. Success means the credential works.
    async fn test_connection(&self) -> Result<()>;

    /// Non-zero balances of enabled currencies, valued in USD.
    async fn get_account_balance(&self) -> Result<Vec<AccountBalance>>;

    /// Zero when the venue reports nothing for `currency`.
    async fn get_currency_balance(&self, currency: &str) -> Result<Decimal>;

    async fn get_exchange_symbols(&self) -> Result<Vec<ExchangeSymbol>>;

    async fn get_deposit_addresses(&self, currency: &str) -> Result<Vec<DepositAddress>>;

    async fn create_withdrawal_order(&self, request: &WithdrawalOrderRequest) -> Result<WithdrawalOrderResult>;

    async fn create_spot_order(&self, request: &SpotOrderRequest) -> Result<SpotOrderResult>;

    async fn get_order_rule(&self, base: &str, quote: &str) -> Result<OrderRules>;

    async fn get_order_rules(&self) -> Result<Vec<OrderRules>>;

    async fn get_order_details(&self, request: &OrderDetailsRequest) -> Result<NormalizedOrderStatus>;

    /// Rules for the given tickers, or for every enabled currency when empty.
    async fn get_withdrawal_rules(&self, currencies: &[String]) -> Result<Vec<WithdrawalRule>>;

    async fn get_withdrawal_by_id(&self, id: &str) -> Result<WithdrawalRecord>;

    fn shutdown(&self);
}

/// Wire conventions of one venue, consumed by the shared transport.
pub trait VenueProfile: Send + Sync {
    fn venue(&self) -> VenueId;

    /// Envelope `code` that marks success.
    fn success_code(&self) -> &'static str;

    fn error_table(&self) -> &'static ErrorTable;

    /// Built-in quota table.
    fn endpoint_limits(&self) -> Vec<EndpointLimit>;

    /// Quota for endpoints missing from the table, as `(max_calls, window)`.
    fn default_quota(&self) -> (u32, Duration) {
        (10, Duration::from_secs(1))
    }

    fn timestamp(&self) -> String {
        chrono::Utc::now().timestamp_millis().to_string()
    }

    fn auth_headers(
        &self,
        credential: &Credential,
        signed: &SignedRequest,
        locale: &str,
    ) -> Result<Vec<(&'static str, String)>>;
}
