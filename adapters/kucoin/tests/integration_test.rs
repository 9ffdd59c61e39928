use mockito::{Matcher, Server, ServerGuard};
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;

use venuebridge_core::config::{BridgeConfig, VenueConfig};
use venuebridge_core::{
    BridgeError, Credential, FixedRateConverter, InMemoryStorage, OrderDetailsRequest, OrderSide, OrderState,
    SpotOrderRequest, VenueId, WithdrawalOrderRequest, WithdrawalStatus,
};
use venuebridge_exchange::{hmac_sha256_base64, VenueAdapter};
use venuebridge_kucoin::KucoinAdapter;

fn ok(data: serde_json::Value) -> String {
    json!({"code": "200000", "data": data}).to_string()
}

fn adapter(server: &ServerGuard) -> KucoinAdapter {
    let mut config = BridgeConfig::development();
    config.venues.insert("kucoin".to_string(), VenueConfig::new(&server.url()));

    let storage = InMemoryStorage::new()
        .with_currency(VenueId::Kucoin, "usdt-trc20", "USDT", "trx")
        .with_currency(VenueId::Kucoin, "btc-btc", "BTC", "btc");
    let converter = FixedRateConverter::new()
        .with_price("USDT", dec!(1))
        .with_price("BTC", dec!(40000));
    let credential = Credential::new(VenueId::Kucoin, "kc-key", "kc-secret", Some("kc-pass".to_string()));

    KucoinAdapter::new(credential, Arc::new(storage), Arc::new(converter), &config).unwrap()
}

fn accounts(main: &str, trade: &str) -> String {
    ok(json!([
        {"id": "a1", "currency": "USDT", "type": "main", "balance": main, "available": main, "holds": "0"},
        {"id": "a2", "currency": "USDT", "type": "trade", "balance": trade, "available": trade, "holds": "0"}
    ]))
}

fn withdrawal_request() -> WithdrawalOrderRequest {
    WithdrawalOrderRequest {
        internal_currency_id: "usdt-trc20".to_string(),
        native_amount: dec!(100),
        fee: dec!(1),
        address: "TDest".to_string(),
        tag: None,
        chain: "trx".to_string(),
        min_withdrawal: dec!(5),
        withdrawal_precision: 6,
        correlation_id: Some("payout-11".to_string()),
    }
}

#[tokio::test]
async fn test_connection_signs_passphrase() {
    let mut server = Server::new_async().await;
    let expected = hmac_sha256_base64("kc-secret", "kc-pass").unwrap();
    let mock = server
        .mock("GET", "/api/v1/accounts")
        .match_query(Matcher::UrlEncoded("type".into(), "main".into()))
        .match_header("KC-API-KEY", "kc-key")
        .match_header("KC-API-PASSPHRASE", expected.as_str())
        .match_header("KC-API-KEY-VERSION", "2")
        .with_body(ok(json!([])))
        .create_async()
        .await;

    adapter(&server).test_connection().await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_ip_not_whitelisted() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/accounts")
        .match_query(Matcher::Any)
        .with_status(400)
        .with_body(r#"{"code":"400006","msg":"Invalid request ip"}"#)
        .create_async()
        .await;

    let err = adapter(&server).test_connection().await.unwrap_err();
    assert!(matches!(err, BridgeError::IpWhitelist(_)));
}

#[tokio::test]
async fn test_balance_sums_main_and_trade() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/accounts")
        .match_query(Matcher::Any)
        .with_body(ok(json!([
            {"currency": "USDT", "type": "main", "available": "10"},
            {"currency": "USDT", "type": "trade", "available": "5.5"},
            {"currency": "USDT", "type": "margin", "available": "1000"},
            {"currency": "KCS", "type": "main", "available": "3"}
        ])))
        .create_async()
        .await;

    let balances = adapter(&server).get_account_balance().await.unwrap();
    assert_eq!(balances.len(), 1);
    assert_eq!(balances[0].currency, "USDT");
    assert_eq!(balances[0].amount, dec!(15.5));
}

#[tokio::test]
async fn test_withdrawal_moves_shortfall_to_main() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/accounts")
        .match_query(Matcher::UrlEncoded("currency".into(), "USDT".into()))
        .with_body(accounts("30", "80"))
        .create_async()
        .await;
    let transfer = server
        .mock("POST", "/api/v2/accounts/inner-transfer")
        .match_body(Matcher::PartialJson(json!({
            "currency": "USDT",
            "from": "trade",
            "to": "main",
            "amount": "70"
        })))
        .with_body(ok(json!({"orderId": "tr-1"})))
        .expect(1)
        .create_async()
        .await;
    let withdraw = server
        .mock("POST", "/api/v3/withdrawals")
        .match_body(Matcher::PartialJson(json!({
            "currency": "USDT",
            "toAddress": "TDest",
            "amount": "99",
            "chain": "trx",
            "isInner": false,
            "feeDeductType": "EXTERNAL"
        })))
        .with_body(ok(json!({"withdrawalId": "wd-1"})))
        .create_async()
        .await;

    let result = adapter(&server).create_withdrawal_order(&withdrawal_request()).await.unwrap();
    assert_eq!(result.external_order_id, "wd-1");
    assert!(result.retry_reason.is_none());

    transfer.assert_async().await;
    withdraw.assert_async().await;
}

#[tokio::test]
async fn test_withdrawal_transfer_covers_fee() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/accounts")
        .match_query(Matcher::Any)
        .with_body(accounts("0", "100"))
        .create_async()
        .await;
    // 99 withdrawn plus the 1 USDT fee charged from main
    let transfer = server
        .mock("POST", "/api/v2/accounts/inner-transfer")
        .match_body(Matcher::PartialJson(json!({"from": "trade", "to": "main", "amount": "100"})))
        .with_body(ok(json!({"orderId": "tr-3"})))
        .expect(1)
        .create_async()
        .await;
    let withdraw = server
        .mock("POST", "/api/v3/withdrawals")
        .match_body(Matcher::PartialJson(json!({"amount": "99", "feeDeductType": "EXTERNAL"})))
        .with_body(ok(json!({"withdrawalId": "wd-3"})))
        .expect(1)
        .create_async()
        .await;

    let result = adapter(&server).create_withdrawal_order(&withdrawal_request()).await.unwrap();
    assert_eq!(result.external_order_id, "wd-3");

    transfer.assert_async().await;
    withdraw.assert_async().await;
}

#[tokio::test]
async fn test_withdrawal_shrinks_on_frozen_balance() {
    let mut server = Server::new_async().await;
    let frozen = r#"{"code":"400100","msg":"Your balance is temporarily frozen"}"#;

    server
        .mock("GET", "/api/v1/accounts")
        .match_query(Matcher::Any)
        .with_body(accounts("200", "0"))
        .create_async()
        .await;
    let transfer = server
        .mock("POST", "/api/v2/accounts/inner-transfer")
        .expect(0)
        .create_async()
        .await;
    let attempts = [("99", frozen.to_string()), ("89", frozen.to_string())];
    let mut rejected = Vec::new();
    for (amount, body) in attempts {
        rejected.push(
            server
                .mock("POST", "/api/v3/withdrawals")
                .match_body(Matcher::PartialJson(json!({"amount": amount})))
                .with_status(400)
                .with_body(body)
                .expect(1)
                .create_async()
                .await,
        );
    }
    let accepted = server
        .mock("POST", "/api/v3/withdrawals")
        .match_body(Matcher::PartialJson(json!({"amount": "79"})))
        .with_body(ok(json!({"withdrawalId": "wd-2"})))
        .create_async()
        .await;

    let result = adapter(&server).create_withdrawal_order(&withdrawal_request()).await.unwrap();
    assert_eq!(result.external_order_id, "wd-2");
    assert_eq!(result.retry_reason.as_deref(), Some("balance locked"));

    for mock in rejected {
        mock.assert_async().await;
    }
    accepted.assert_async().await;
    transfer.assert_async().await;
}

#[tokio::test]
async fn test_withdrawal_without_enough_funds_anywhere() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/accounts")
        .match_query(Matcher::Any)
        .with_body(accounts("20", "10"))
        .create_async()
        .await;
    let withdraw = server
        .mock("POST", "/api/v3/withdrawals")
        .expect(0)
        .create_async()
        .await;

    let err = adapter(&server)
        .create_withdrawal_order(&withdrawal_request())
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::InsufficientBalance(_)));
    withdraw.assert_async().await;
}

#[tokio::test]
async fn test_market_buy_funds_trade_account() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v2/symbols/BTC-USDT")
        .with_body(ok(json!({
            "symbol": "BTC-USDT",
            "baseCurrency": "BTC",
            "quoteCurrency": "USDT",
            "baseMinSize": "0.00001",
            "baseMaxSize": "10000000000",
            "quoteMinSize": "0.1",
            "baseIncrement": "0.00000001",
            "quoteIncrement": "0.000001",
            "priceIncrement": "0.1",
            "enableTrading": true
        })))
        .create_async()
        .await;
    server
        .mock("GET", "/api/v1/accounts")
        .match_query(Matcher::UrlEncoded("currency".into(), "USDT".into()))
        .with_body(accounts("100", "20"))
        .create_async()
        .await;
    let transfer = server
        .mock("POST", "/api/v2/accounts/inner-transfer")
        .match_body(Matcher::PartialJson(json!({"from": "main", "to": "trade", "amount": "100"})))
        .with_body(ok(json!({"orderId": "tr-2"})))
        .create_async()
        .await;
    let order = server
        .mock("POST", "/api/v1/hf/orders")
        .match_body(Matcher::PartialJson(json!({
            "symbol": "BTC-USDT",
            "side": "buy",
            "type": "market",
            "funds": "120"
        })))
        .with_body(ok(json!({"orderId": "ord-1", "clientOid": "x"})))
        .create_async()
        .await;

    let request = SpotOrderRequest {
        base_symbol: "BTC".to_string(),
        quote_symbol: "USDT".to_string(),
        side: OrderSide::Buy,
        ticker: "BTC-USDT".to_string(),
        rules: None,
        correlation_id: Some("swap-2".to_string()),
    };

    let result = adapter(&server).create_spot_order(&request).await.unwrap();
    assert_eq!(result.exchange_order_id, "ord-1");
    assert_eq!(result.amount_submitted, dec!(120));
    transfer.assert_async().await;
    order.assert_async().await;
}

#[tokio::test]
async fn test_order_details_sell() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/hf/orders/ord-5")
        .match_query(Matcher::UrlEncoded("symbol".into(), "BTC-USDT".into()))
        .with_body(ok(json!({
            "id": "ord-5",
            "symbol": "BTC-USDT",
            "side": "sell",
            "dealSize": "0.01",
            "dealFunds": "400.5",
            "active": false,
            "cancelExist": false
        })))
        .create_async()
        .await;

    let status = adapter(&server)
        .get_order_details(&OrderDetailsRequest {
            exchange_order_id: "ord-5".to_string(),
            ticker: "BTC-USDT".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(status.state, OrderState::Completed);
    assert_eq!(status.amount, dec!(400.5));
    assert_eq!(status.amount_usd, dec!(400.5));
}

#[tokio::test]
async fn test_deposit_addresses() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v3/deposit-addresses")
        .match_query(Matcher::UrlEncoded("currency".into(), "USDT".into()))
        .with_body(ok(json!([
            {"address": "TAddr", "memo": "", "chainId": "trx", "chainName": "TRC20", "currency": "USDT"},
            {"address": "SoAddr", "memo": "", "chainId": "sol", "chainName": "SOL", "currency": "USDT"}
        ])))
        .create_async()
        .await;

    let addresses = adapter(&server).get_deposit_addresses("USDT").await.unwrap();
    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0].currency_id, "usdt-trc20");
    assert!(addresses[0].tag.is_none());
}

#[tokio::test]
async fn test_withdrawal_rules_for_enabled_currencies() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v3/currencies/USDT")
        .with_body(ok(json!({
            "currency": "USDT",
            "chains": [
                {"chainName": "TRC20", "chainId": "trx", "withdrawalMinSize": "10", "withdrawalMinFee": "1",
                 "withdrawPrecision": 6, "isWithdrawEnabled": true, "isDepositEnabled": true},
                {"chainName": "ERC20", "chainId": "eth", "withdrawalMinSize": "20", "withdrawalMinFee": "5",
                 "withdrawPrecision": 6, "isWithdrawEnabled": true, "isDepositEnabled": true}
            ]
        })))
        .create_async()
        .await;
    server
        .mock("GET", "/api/v3/currencies/BTC")
        .with_body(ok(serde_json::Value::Null))
        .create_async()
        .await;

    let rules = adapter(&server).get_withdrawal_rules(&[]).await.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].currency, "USDT");
    assert_eq!(rules[0].chain, "trx");
    assert_eq!(rules[0].min_withdrawal, dec!(10));
    assert_eq!(rules[0].fee, dec!(1));
}

#[tokio::test]
async fn test_withdrawal_by_id() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v1/withdrawals/wd-9")
        .with_body(ok(json!({
            "id": "wd-9",
            "currency": "USDT",
            "status": "SUCCESS",
            "amount": "79",
            "walletTxId": "0xdef"
        })))
        .create_async()
        .await;

    let record = adapter(&server).get_withdrawal_by_id("wd-9").await.unwrap();
    assert_eq!(record.status, WithdrawalStatus::Completed);
    assert_eq!(record.tx_hash.as_deref(), Some("0xdef"));
}

#[tokio::test]
async fn test_exchange_symbols_skip_disabled() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/v2/symbols")
        .with_body(ok(json!([
            {"symbol": "BTC-USDT", "baseCurrency": "BTC", "quoteCurrency": "USDT", "enableTrading": true},
            {"symbol": "OLD-USDT", "baseCurrency": "OLD", "quoteCurrency": "USDT", "enableTrading": false}
        ])))
        .create_async()
        .await;

    let symbols = adapter(&server).get_exchange_symbols().await.unwrap();
    assert_eq!(symbols.len(), 2);
    assert!(symbols.iter().all(|s| s.ticker == "BTC-USDT"));
}
