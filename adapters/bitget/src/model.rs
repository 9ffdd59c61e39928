use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub coin: String,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub available: Decimal,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub frozen: Decimal,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub locked: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub base_coin: String,
    pub quote_coin: String,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub min_trade_amount: Decimal,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub max_trade_amount: Decimal,
    #[serde(default, rename = "minTradeUSDT", deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub min_trade_usdt: Decimal,
    #[serde(default, deserialize_with = "venuebridge_core::utils::precision_from_str::deserialize")]
    pub price_precision: u32,
    #[serde(default, deserialize_with = "venuebridge_core::utils::precision_from_str::deserialize")]
    pub quantity_precision: u32,
    #[serde(default, deserialize_with = "venuebridge_core::utils::precision_from_str::deserialize")]
    pub quote_precision: u32,
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinInfo {
    pub coin: String,
    #[serde(default)]
    pub chains: Vec<ChainInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub chain: String,
    #[serde(default)]
    pub withdrawable: String,
    #[serde(default)]
    pub rechargeable: String,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub withdraw_fee: Decimal,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub extra_withdraw_fee: Decimal,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub min_withdraw_amount: Decimal,
    #[serde(default, deserialize_with = "venuebridge_core::utils::precision_from_str::deserialize")]
    pub withdraw_min_scale: u32,
}

impl ChainInfo {
    pub fn can_withdraw(&self) -> bool {
        self.withdrawable.eq_ignore_ascii_case("true")
    }

    pub fn can_deposit(&self) -> bool {
        self.rechargeable.eq_ignore_ascii_case("true")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    pub symbol: String,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub last_pr: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositAddressInfo {
    pub address: String,
    pub chain: String,
    pub coin: String,
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalParams {
    pub coin: String,
    pub transfer_type: String,
    pub address: String,
    pub chain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub size: String,
    pub client_oid: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAck {
    pub order_id: String,
    #[serde(default)]
    pub client_oid: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRecordInfo {
    pub order_id: String,
    #[serde(default)]
    pub trade_id: Option<String>,
    pub coin: String,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub size: Decimal,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderParams {
    pub symbol: String,
    pub side: String,
    pub order_type: String,
    pub force: String,
    pub size: String,
    pub client_oid: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfo {
    pub order_id: String,
    pub symbol: String,
    pub side: String,
    pub status: String,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub base_volume: Decimal,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub quote_volume: Decimal,
}
