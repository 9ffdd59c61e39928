use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

/// Trading state of an instrument, normalized across venues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolState {
    Online,
    Offline,
    Other(String),
}

impl SymbolState {
    pub fn is_tradable(&self) -> bool {
        matches!(self, SymbolState::Online)
    }
}

/// Trading constraints of one instrument. Precisions are decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRules {
    pub symbol: String,
    pub state: SymbolState,
    pub base_currency: String,
    pub quote_currency: String,
    pub price_precision: u32,
    pub amount_precision: u32,
    pub value_precision: u32,
    pub min_order_amount: Decimal,
    pub max_order_amount: Decimal,
    pub min_order_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotOrderRequest {
    pub base_symbol: String,
    pub quote_symbol: String,
    pub side: OrderSide,
    /// Venue instrument symbol, e.g. `BTCUSDT` or `BTC-USDT`.
    pub ticker: String,
    /// Pre-resolved rules. When absent the adapter resolves them itself.
    pub rules: Option<OrderRules>,
    pub correlation_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotOrderResult {
    pub exchange_order_id: String,
    pub client_order_id: String,
    pub amount_submitted: Decimal,
}

/// One trade direction of a venue pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeSymbol {
    pub ticker: String,
    pub display: String,
    pub base_currency: String,
    pub quote_currency: String,
    pub side: OrderSide,
}

impl ExchangeSymbol {
    /// Both directions of `base/quote`: selling base, and buying base with quote.
    pub fn pair(ticker: &str, base: &str, quote: &str) -> [ExchangeSymbol; 2] {
        [
            ExchangeSymbol {
                ticker: ticker.to_string(),
                display: format!("{}/{}", base, quote),
                base_currency: base.to_string(),
                quote_currency: quote.to_string(),
                side: OrderSide::Sell,
            },
            ExchangeSymbol {
                ticker: ticker.to_string(),
                display: format!("{}/{}", quote, base),
                base_currency: base.to_string(),
                quote_currency: quote.to_string(),
                side: OrderSide::Buy,
            },
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderState {
    Completed,
    InProgress,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedOrderStatus {
    pub state: OrderState,
    /// Quantity received: quote volume for sells, base volume for buys.
    pub amount: Decimal,
    pub amount_usd: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetailsRequest {
    pub exchange_order_id: String,
    pub ticker: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_emits_both_directions() {
        let [sell, buy] = ExchangeSymbol::pair("BTCUSDT", "BTC", "USDT");
        assert_eq!(sell.display, "BTC/USDT");
        assert_eq!(sell.side, OrderSide::Sell);
        assert_eq!(buy.display, "USDT/BTC");
        assert_eq!(buy.side, OrderSide::Buy);
        assert_eq!(buy.ticker, "BTCUSDT");
    }

    #[test]
    fn test_side_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&OrderSide::Sell).unwrap(), "\"sell\"");
    }
}
