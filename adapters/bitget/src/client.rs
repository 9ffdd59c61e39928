use chrono::{Duration as ChronoDuration, Utc};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use venuebridge_core::config::VenueConfig;
use venuebridge_core::{BridgeError, Credential, EndpointLimit, Result, VenueId};
use venuebridge_exchange::{ErrorTable, RateLimiterRegistry, Request, RestClient, SignedRequest, VenueProfile};

use crate::error::BITGET_ERRORS;
use crate::model::*;

pub const API_URL: &str = "https://api.bitget.com";

pub const ACCOUNT_INFO: &str = "/api/v2/spot/account/info";
pub const ACCOUNT_ASSETS: &str = "/api/v2/spot/account/assets";
pub const PUBLIC_SYMBOLS: &str = "/api/v2/spot/public/symbols";
pub const PUBLIC_COINS: &str = "/api/v2/spot/public/coins";
pub const MARKET_TICKERS: &str = "/api/v2/spot/market/tickers";
pub const DEPOSIT_ADDRESS: &str = "/api/v2/spot/wallet/deposit-address";
pub const WITHDRAWAL: &str = "/api/v2/spot/wallet/withdrawal";
pub const WITHDRAWAL_RECORDS: &str = "/api/v2/spot/wallet/withdrawal-records";
pub const PLACE_ORDER: &str = "/api/v2/spot/trade/place-order";
pub const ORDER_INFO: &str = "/api/v2/spot/trade/orderInfo";

/// Bitget signs with the raw passphrase in `ACCESS-PASSPHRASE`.
pub struct BitgetProfile;

impl VenueProfile for BitgetProfile {
    fn venue(&self) -> VenueId {
        VenueId::Bitget
    }

    fn success_code(&self) -> &'static str {
        "00000"
    }

    fn error_table(&self) -> &'static ErrorTable {
        &BITGET_ERRORS
    }

    fn endpoint_limits(&self) -> Vec<EndpointLimit> {
        let second = Duration::from_secs(1);
        vec![
            EndpointLimit::new("GET", ACCOUNT_INFO, 1, second),
            EndpointLimit::new("GET", ACCOUNT_ASSETS, 10, second),
            EndpointLimit::new("GET", PUBLIC_SYMBOLS, 20, second),
            EndpointLimit::new("GET", PUBLIC_COINS, 3, second),
            EndpointLimit::new("GET", MARKET_TICKERS, 20, second),
            EndpointLimit::new("GET", DEPOSIT_ADDRESS, 10, second),
            EndpointLimit::new("POST", WITHDRAWAL, 5, second),
            EndpointLimit::new("GET", WITHDRAWAL_RECORDS, 10, second),
            EndpointLimit::new("POST", PLACE_ORDER, 10, second),
            EndpointLimit::new("GET", ORDER_INFO, 20, second),
        ]
    }

    fn auth_headers(
        &self,
        credential: &Credential,
        signed: &SignedRequest,
        locale: &str,
    ) -> Result<Vec<(&'static str, String)>> {
        let passphrase = credential
            .passphrase()
            .ok_or_else(|| BridgeError::Credential("Bitget requires a passphrase".to_string()))?;

        Ok(vec![
            ("ACCESS-KEY", credential.access_key().to_string()),
            ("ACCESS-SIGN", signed.sign(credential.secret_key())?),
            ("ACCESS-TIMESTAMP", signed.timestamp.clone()),
            ("ACCESS-PASSPHRASE", passphrase.to_string()),
            ("locale", locale.to_string()),
        ])
    }
}

/// Typed Bitget v2 endpoints over the shared transport.
pub struct BitgetClient {
    rest: RestClient,
}

impl BitgetClient {
    pub fn new(
        credential: Credential,
        config: &VenueConfig,
        limiter: Arc<RateLimiterRegistry>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let rest = RestClient::new(Arc::new(BitgetProfile), credential, config, limiter, cancel)?;
        Ok(Self { rest })
    }

    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    pub async fn account_info(&self) -> Result<Value> {
        self.rest.execute(Request::get(ACCOUNT_INFO)).await
    }

    pub async fn assets(&self, coin: Option<&str>) -> Result<Vec<Asset>> {
        let request = Request::get(ACCOUNT_ASSETS).query_opt("coin", coin);
        self.rest.execute(request).await
    }

    pub async fn symbols(&self, symbol: Option<&str>) -> Result<Vec<SymbolInfo>> {
        let request = Request::get(PUBLIC_SYMBOLS).query_opt("symbol", symbol).public();
        self.rest.execute(request).await
    }

    pub async fn coins(&self, coin: Option<&str>) -> Result<Vec<CoinInfo>> {
        let request = Request::get(PUBLIC_COINS).query_opt("coin", coin).public();
        self.rest.execute(request).await
    }

    pub async fn ticker(&self, symbol: &str) -> Result<Ticker> {
        let request = Request::get(MARKET_TICKERS).query("symbol", symbol).public();
        let tickers: Vec<Ticker> = self.rest.execute(request).await?;
        tickers
            .into_iter()
            .next()
            .ok_or_else(|| BridgeError::SymbolUnavailable(format!("no ticker for {}", symbol)))
    }

    pub async fn tickers(&self) -> Result<Vec<Ticker>> {
        self.rest.execute(Request::get(MARKET_TICKERS).public()).await
    }

    pub async fn deposit_address(&self, coin: &str, chain: &str) -> Result<DepositAddressInfo> {
        let request = Request::get(DEPOSIT_ADDRESS).query("coin", coin).query("chain", chain);
        self.rest.execute(request).await
    }

    pub async fn withdraw(&self, params: &WithdrawalParams) -> Result<OrderAck> {
        let body = serde_json::to_value(params)?;
        self.rest.execute(Request::post(WITHDRAWAL, body)).await
    }

    pub async fn withdrawal_record(&self, order_id: &str) -> Result<Option<WithdrawalRecordInfo>> {
        // records are only searchable inside a time range, 90 days is the maximum
        let end = Utc::now();
        let start = end - ChronoDuration::days(90);
        let request = Request::get(WITHDRAWAL_RECORDS)
            .query("orderId", order_id)
            .query("startTime", start.timestamp_millis())
            .query("endTime", end.timestamp_millis());
        let records: Vec<WithdrawalRecordInfo> = self.rest.execute(request).await?;
        Ok(records.into_iter().find(|r| r.order_id == order_id))
    }

    pub async fn place_order(&self, params: &PlaceOrderParams) -> Result<OrderAck> {
        let body = serde_json::to_value(params)?;
        self.rest.execute(Request::post(PLACE_ORDER, body)).await
    }

    pub async fn order_info(&self, order_id: &str) -> Result<Option<OrderInfo>> {
        let request = Request::get(ORDER_INFO).query("orderId", order_id);
        let orders: Vec<OrderInfo> = self.rest.execute(request).await?;
        Ok(orders.into_iter().next())
    }
}
