use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use venuebridge_core::config::VenueConfig;
use venuebridge_core::{BridgeError, Credential, EndpointLimit, Result, VenueId};
use venuebridge_exchange::{
    hmac_sha256_base64, ErrorTable, RateLimiterRegistry, Request, RestClient, SignedRequest, VenueProfile,
};

use crate::error::KUCOIN_ERRORS;
use crate::model::*;

pub const API_URL: &str = "https://api.kucoin.com";

pub const ACCOUNTS: &str = "/api/v1/accounts";
pub const SYMBOLS: &str = "/api/v2/symbols";
pub const SYMBOL: &str = "/api/v2/symbols/{symbol}";
pub const CURRENCY: &str = "/api/v3/currencies/{currency}";
pub const DEPOSIT_ADDRESSES: &str = "/api/v3/deposit-addresses";
pub const WITHDRAWALS: &str = "/api/v3/withdrawals";
pub const WITHDRAWAL: &str = "/api/v1/withdrawals/{withdrawalId}";
pub const INNER_TRANSFER: &str = "/api/v2/accounts/inner-transfer";
pub const HF_ORDERS: &str = "/api/v1/hf/orders";
pub const HF_ORDER: &str = "/api/v1/hf/orders/{orderId}";
pub const LEVEL1: &str = "/api/v1/market/orderbook/level1";

/// KuCoin key version 2: the passphrase travels signed with the secret.
pub struct KucoinProfile;

impl VenueProfile for KucoinProfile {
    fn venue(&self) -> VenueId {
        VenueId::Kucoin
    }

    fn success_code(&self) -> &'static str {
        "200000"
    }

    fn error_table(&self) -> &'static ErrorTable {
        &KUCOIN_ERRORS
    }

    fn endpoint_limits(&self) -> Vec<EndpointLimit> {
        // per-endpoint shares of the 30s resource pools
        let pool = Duration::from_secs(30);
        vec![
            EndpointLimit::new("GET", ACCOUNTS, 100, pool),
            EndpointLimit::new("GET", SYMBOLS, 50, pool),
            EndpointLimit::new("GET", SYMBOL, 100, pool),
            EndpointLimit::new("GET", CURRENCY, 100, pool),
            EndpointLimit::new("GET", DEPOSIT_ADDRESSES, 50, pool),
            EndpointLimit::new("POST", WITHDRAWALS, 50, pool),
            EndpointLimit::new("GET", WITHDRAWAL, 100, pool),
            EndpointLimit::new("POST", INNER_TRANSFER, 100, pool),
            EndpointLimit::new("POST", HF_ORDERS, 200, pool),
            EndpointLimit::new("GET", HF_ORDER, 200, pool),
            EndpointLimit::new("GET", LEVEL1, 200, pool),
        ]
    }

    fn default_quota(&self) -> (u32, Duration) {
        (50, Duration::from_secs(30))
    }

    fn auth_headers(
        &self,
        credential: &Credential,
        signed: &SignedRequest,
        _locale: &str,
    ) -> Result<Vec<(&'static str, String)>> {
        let passphrase = credential
            .passphrase()
            .ok_or_else(|| BridgeError::Credential("KuCoin requires a passphrase".to_string()))?;

        Ok(vec![
            ("KC-API-KEY", credential.access_key().to_string()),
            ("KC-API-SIGN", signed.sign(credential.secret_key())?),
            ("KC-API-TIMESTAMP", signed.timestamp.clone()),
            ("KC-API-PASSPHRASE", hmac_sha256_base64(credential.secret_key(), passphrase)?),
            ("KC-API-KEY-VERSION", "2".to_string()),
        ])
    }
}

/// Typed KuCoin endpoints over the shared transport.
pub struct KucoinClient {
    rest: RestClient,
}

impl KucoinClient {
    pub fn new(
        credential: Credential,
        config: &VenueConfig,
        limiter: Arc<RateLimiterRegistry>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let rest = RestClient::new(Arc::new(KucoinProfile), credential, config, limiter, cancel)?;
        Ok(Self { rest })
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    pub async fn accounts(&self, currency: Option<&str>) -> Result<Vec<Account>> {
        let request = Request::get(ACCOUNTS).query_opt("currency", currency);
        self.rest.execute(request).await
    }

    pub async fn symbols(&self) -> Result<Vec<SymbolInfo>> {
        self.rest.execute(Request::get(SYMBOLS).public()).await
    }

    pub async fn symbol(&self, symbol: &str) -> Result<SymbolInfo> {
        let request = Request::get(SYMBOL).at(format!("/api/v2/symbols/{}", symbol)).public();
        let info: Option<SymbolInfo> = self.rest.execute(request).await?;
        info.ok_or_else(|| BridgeError::SymbolUnavailable(format!("{} is not listed on KuCoin", symbol)))
    }

    pub async fn currency(&self, currency: &str) -> Result<Option<CurrencyInfo>> {
        let request = Request::get(CURRENCY)
            .at(format!("/api/v3/currencies/{}", currency))
            .public();
        self.rest.execute(request).await
    }

    pub async fn deposit_addresses(&self, currency: &str, chain: Option<&str>) -> Result<Vec<DepositAddressInfo>> {
        let request = Request::get(DEPOSIT_ADDRESSES)
            .query("currency", currency)
            .query_opt("chain", chain);
        let addresses: Option<Vec<DepositAddressInfo>> = self.rest.execute(request).await?;
        Ok(addresses.unwrap_or_default())
    }

    pub async fn withdraw(&self, params: &WithdrawalParams) -> Result<WithdrawalAck> {
        let body = serde_json::to_value(params)?;
        self.rest.execute(Request::post(WITHDRAWALS, body)).await
    }

    pub async fn withdrawal(&self, withdrawal_id: &str) -> Result<Option<WithdrawalInfo>> {
        let request = Request::get(WITHDRAWAL).at(format!("/api/v1/withdrawals/{}", withdrawal_id));
        self.rest.execute(request).await
    }

    pub async fn inner_transfer(&self, params: &InnerTransferParams) -> Result<TransferAck> {
        let body = serde_json::to_value(params)?;
        self.rest.execute(Request::post(INNER_TRANSFER, body)).await
    }

    pub async fn place_order(&self, params: &PlaceOrderParams) -> Result<OrderAck> {
        let body = serde_json::to_value(params)?;
        self.rest.execute(Request::post(HF_ORDERS, body)).await
    }

    pub async fn order(&self, order_id: &str, symbol: &str) -> Result<Option<OrderInfo>> {
        let request = Request::get(HF_ORDER)
            .at(format!("/api/v1/hf/orders/{}", order_id))
            .query("symbol", symbol);
        self.rest.execute(request).await
    }

    pub async fn level1(&self, symbol: &str) -> Result<Level1> {
        let request = Request::get(LEVEL1).query("symbol", symbol).public();
        let level1: Option<Level1> = self.rest.execute(request).await?;
        level1.ok_or_else(|| BridgeError::SymbolUnavailable(format!("no ticker for {}", symbol)))
    }

    pub async fn ping(&self) -> Result<Value> {
        self.rest.execute(Request::get(ACCOUNTS).query("type", "main")).await
    }
}
