use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalOrderRequest {
    pub internal_currency_id: String,
    pub native_amount: Decimal,
    pub fee: Decimal,
    pub address: String,
    pub tag: Option<String>,
    pub chain: String,
    pub min_withdrawal: Decimal,
    /// Decimal places the venue accepts for the withdrawal amount.
    pub withdrawal_precision: u32,
    pub correlation_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalOrderResult {
    /// Client-generated idempotency key of the accepted submission.
    pub internal_order_id: String,
    pub external_order_id: String,
    pub retry_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalRule {
    pub currency: String,
    pub chain: String,
    pub min_withdrawal: Decimal,
    pub withdrawal_precision: u32,
    pub fee: Decimal,
    pub withdraw_enabled: bool,
    pub deposit_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithdrawalStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalRecord {
    pub id: String,
    pub status: WithdrawalStatus,
    pub tx_hash: Option<String>,
    pub native_amount: Option<Decimal>,
}
