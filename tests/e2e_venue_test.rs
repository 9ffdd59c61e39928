use mockito::{Matcher, Server, ServerGuard};
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;

use venuebridge::{
    BridgeConfig, BridgeError, Credential, FixedRateConverter, InMemoryStorage, OrderSide, SpotOrderRequest,
    VenueAdapter, VenueConfig, VenueFactory, VenueId, WithdrawalOrderRequest,
};

fn factory(bitget: &ServerGuard, kucoin: &ServerGuard) -> VenueFactory {
    let mut config = BridgeConfig::development();
    config.venues.insert("bitget".to_string(), VenueConfig::new(&bitget.url()));
    config.venues.insert("kucoin".to_string(), VenueConfig::new(&kucoin.url()));

    let storage = InMemoryStorage::new()
        .with_currency(VenueId::Bitget, "usdt-trc20", "USDT", "TRC20")
        .with_currency(VenueId::Kucoin, "usdt-trc20", "USDT", "trx")
        .with_currency(VenueId::Kucoin, "xrp-xrp", "XRP", "xrp");
    let converter = FixedRateConverter::new()
        .with_price("USDT", dec!(1))
        .with_price("XRP", dec!(0.5));

    VenueFactory::new(config, Arc::new(storage), Arc::new(converter))
}

fn bitget_credential() -> Credential {
    Credential::new(VenueId::Bitget, "bg-key", "bg-secret", Some("bg-pass".to_string()))
}

fn kucoin_credential() -> Credential {
    Credential::new(VenueId::Kucoin, "kc-key", "kc-secret", Some("kc-pass".to_string()))
}

/// A balance lock twice in a row shrinks the withdrawal by one step each time.
#[tokio::test]
async fn test_withdrawal_retries_through_balance_locks() {
    let mut bitget = Server::new_async().await;
    let kucoin = Server::new_async().await;
    let locked = r#"{"code":"43117","msg":"funds are locked","requestTime":1,"data":null}"#;

    let mut mocks = Vec::new();
    for amount in ["99", "89"] {
        mocks.push(
            bitget
                .mock("POST", "/api/v2/spot/wallet/withdrawal")
                .match_body(Matcher::PartialJson(json!({"size": amount})))
                .with_status(400)
                .with_body(locked)
                .expect(1)
                .create_async()
                .await,
        );
    }
    mocks.push(
        bitget
            .mock("POST", "/api/v2/spot/wallet/withdrawal")
            .match_body(Matcher::PartialJson(json!({"size": "79"})))
            .with_body(r#"{"code":"00000","msg":"success","requestTime":1,"data":{"orderId":"wd-77"}}"#)
            .expect(1)
            .create_async()
            .await,
    );

    let adapter = factory(&bitget, &kucoin).build(bitget_credential()).unwrap();
    let request = WithdrawalOrderRequest {
        internal_currency_id: "usdt-trc20".to_string(),
        native_amount: dec!(100),
        fee: dec!(1),
        address: "TDest".to_string(),
        tag: None,
        chain: "TRC20".to_string(),
        min_withdrawal: dec!(5),
        withdrawal_precision: 6,
        correlation_id: Some("payout-77".to_string()),
    };

    let result = adapter.create_withdrawal_order(&request).await.unwrap();
    assert_eq!(result.external_order_id, "wd-77");
    assert_eq!(result.retry_reason.as_deref(), Some("balance locked"));

    for mock in mocks {
        mock.assert_async().await;
    }
}

/// A withdrawal that would shrink below the venue minimum stops without another call.
#[tokio::test]
async fn test_withdrawal_stops_at_minimum() {
    let mut bitget = Server::new_async().await;
    let kucoin = Server::new_async().await;

    let rejected = bitget
        .mock("POST", "/api/v2/spot/wallet/withdrawal")
        .with_status(400)
        .with_body(r#"{"code":"43117","msg":"funds are locked","requestTime":1,"data":null}"#)
        .expect(2)
        .create_async()
        .await;

    let adapter = factory(&bitget, &kucoin).build(bitget_credential()).unwrap();
    let request = WithdrawalOrderRequest {
        internal_currency_id: "usdt-trc20".to_string(),
        native_amount: dec!(26),
        fee: dec!(1),
        address: "TDest".to_string(),
        tag: None,
        chain: "TRC20".to_string(),
        min_withdrawal: dec!(10),
        withdrawal_precision: 2,
        correlation_id: None,
    };

    // 25 and 15 are attempted, 5 is below the minimum
    let err = adapter.create_withdrawal_order(&request).await.unwrap_err();
    assert!(matches!(err, BridgeError::MinimumNotMet(_)));
    rejected.assert_async().await;
}

/// Selling less than the venue minimum fails before any order is placed.
#[tokio::test]
async fn test_spot_sell_below_minimum() {
    let bitget = Server::new_async().await;
    let mut kucoin = Server::new_async().await;

    kucoin
        .mock("GET", "/api/v2/symbols/XRP-USDT")
        .with_body(
            json!({"code": "200000", "data": {
                "symbol": "XRP-USDT",
                "baseCurrency": "XRP",
                "quoteCurrency": "USDT",
                "baseMinSize": "60",
                "baseMaxSize": "10000000",
                "quoteMinSize": "1",
                "baseIncrement": "0.0001",
                "quoteIncrement": "0.000001",
                "priceIncrement": "0.00001",
                "enableTrading": true
            }})
            .to_string(),
        )
        .create_async()
        .await;
    kucoin
        .mock("GET", "/api/v1/accounts")
        .match_query(Matcher::Any)
        .with_body(
            json!({"code": "200000", "data": [
                {"currency": "XRP", "type": "main", "available": "30"},
                {"currency": "XRP", "type": "trade", "available": "20"}
            ]})
            .to_string(),
        )
        .create_async()
        .await;
    let transfer = kucoin
        .mock("POST", "/api/v2/accounts/inner-transfer")
        .expect(0)
        .create_async()
        .await;
    let order = kucoin
        .mock("POST", "/api/v1/hf/orders")
        .expect(0)
        .create_async()
        .await;

    let adapter = factory(&bitget, &kucoin).build(kucoin_credential()).unwrap();
    let request = SpotOrderRequest {
        base_symbol: "XRP".to_string(),
        quote_symbol: "USDT".to_string(),
        side: OrderSide::Sell,
        ticker: "XRP-USDT".to_string(),
        rules: None,
        correlation_id: None,
    };

    let err = adapter.create_spot_order(&request).await.unwrap_err();
    assert!(matches!(err, BridgeError::InsufficientBalance(_)));
    transfer.assert_async().await;
    order.assert_async().await;
}

/// Repeated calls with one credential share one quota bucket.
#[tokio::test]
async fn test_same_credential_shares_rate_limit_bucket() {
    let mut bitget = Server::new_async().await;
    let kucoin = Server::new_async().await;

    let info = bitget
        .mock("GET", "/api/v2/spot/account/info")
        .with_body(r#"{"code":"00000","msg":"success","requestTime":1,"data":{"userId":"1"}}"#)
        .expect(2)
        .create_async()
        .await;

    let factory = factory(&bitget, &kucoin);
    let first = factory.build(bitget_credential()).unwrap();
    first.test_connection().await.unwrap();
    let hash = first.connection_hash();

    // a second adapter for the same credential lands in the same bucket
    let second = factory.build(bitget_credential()).unwrap();
    second.test_connection().await.unwrap();

    assert_eq!(second.connection_hash(), hash);
    assert_eq!(factory.limiter().bucket_count(), 1);
    info.assert_async().await;
}

#[tokio::test]
async fn test_different_credentials_get_separate_buckets() {
    let mut bitget = Server::new_async().await;
    let kucoin = Server::new_async().await;

    bitget
        .mock("GET", "/api/v2/spot/account/info")
        .with_body(r#"{"code":"00000","msg":"success","requestTime":1,"data":{}}"#)
        .expect(2)
        .create_async()
        .await;

    let factory = factory(&bitget, &kucoin);
    let a = factory.build(bitget_credential()).unwrap();
    let b = factory
        .build(Credential::new(VenueId::Bitget, "other-key", "other-secret", Some("p".to_string())))
        .unwrap();

    a.test_connection().await.unwrap();
    b.test_connection().await.unwrap();

    assert_ne!(a.connection_hash(), b.connection_hash());
    assert_eq!(factory.limiter().bucket_count(), 2);
}
