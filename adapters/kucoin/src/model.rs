use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sub-account holding funds. Withdrawals draw from `main`, spot orders from `trade`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    Main,
    Trade,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Main => "main",
            AccountType::Trade => "trade",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub currency: String,
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub balance: Decimal,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub available: Decimal,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub holds: Decimal,
}

impl Account {
    pub fn is(&self, account_type: AccountType) -> bool {
        self.account_type.eq_ignore_ascii_case(account_type.as_str())
    }

    pub fn is_spendable(&self) -> bool {
        self.is(AccountType::Main) || self.is(AccountType::Trade)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub base_currency: String,
    pub quote_currency: String,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub base_min_size: Decimal,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub base_max_size: Decimal,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub quote_min_size: Decimal,
    #[serde(default, deserialize_with = "venuebridge_core::utils::increment_precision::deserialize")]
    pub base_increment: u32,
    #[serde(default, deserialize_with = "venuebridge_core::utils::increment_precision::deserialize")]
    pub quote_increment: u32,
    #[serde(default, deserialize_with = "venuebridge_core::utils::increment_precision::deserialize")]
    pub price_increment: u32,
    #[serde(default)]
    pub enable_trading: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyInfo {
    pub currency: String,
    #[serde(default)]
    pub chains: Vec<ChainInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainInfo {
    pub chain_name: String,
    pub chain_id: String,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub withdrawal_min_size: Decimal,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub withdrawal_min_fee: Decimal,
    #[serde(default, deserialize_with = "venuebridge_core::utils::precision_from_str::deserialize")]
    pub withdraw_precision: u32,
    #[serde(default)]
    pub is_withdraw_enabled: bool,
    #[serde(default)]
    pub is_deposit_enabled: bool,
}

impl ChainInfo {
    /// Storage may name a chain by its id (`trx`) or its display name (`TRC20`).
    pub fn matches(&self, chain: &str) -> bool {
        self.chain_id.eq_ignore_ascii_case(chain) || self.chain_name.eq_ignore_ascii_case(chain)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositAddressInfo {
    pub address: String,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub chain_id: String,
    #[serde(default)]
    pub chain_name: String,
    #[serde(default)]
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalParams {
    pub currency: String,
    pub to_address: String,
    pub amount: String,
    pub chain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub withdraw_type: String,
    pub is_inner: bool,
    pub remark: String,
    pub fee_deduct_type: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalAck {
    pub withdrawal_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalInfo {
    pub id: String,
    pub currency: String,
    pub status: String,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub amount: Decimal,
    #[serde(default)]
    pub wallet_tx_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InnerTransferParams {
    pub client_oid: String,
    pub currency: String,
    pub from: String,
    pub to: String,
    pub amount: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferAck {
    pub order_id: String,
}

/// Market order. `size` is base quantity for sells, `funds` is quote to spend for buys.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderParams {
    pub client_oid: String,
    pub side: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub order_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funds: Option<String>,
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
pub struct OrderInfo {
    pub id: String,
    pub symbol: String,
    pub side: String,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub deal_size: Decimal,
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub deal_funds: Decimal,
    #[serde(default, alias = "isActive")]
    pub active: bool,
    #[serde(default)]
    pub cancel_exist: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level1 {
    #[serde(default, deserialize_with = "venuebridge_core::utils::decimal_or_zero::deserialize")]
    pub price: Decimal,
}
