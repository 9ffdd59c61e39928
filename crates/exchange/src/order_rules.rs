//! Trustworthy trading minimums.
//!
//! Some venues report a minimum order size with so few decimals that it
//! truncates to zero for low-priced pairs, while also publishing a minimum
//! trade value in a stable reference (`USDT`). When the raw field is useless
//! the minimum is derived from the stable value instead, priced through
//! `base/STABLE` and `quote/STABLE` with a safety margin for cross-rate drift.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, warn};

use venuebridge_core::config::SpotConfig;
use venuebridge_core::utils::{round_down, round_up};
use venuebridge_core::{BridgeError, OrderRules, Result, SymbolState};

/// Last traded price of `base` in `quote` on the venue.
#[async_trait]
pub trait ReferencePrices: Send + Sync {
    async fn reference_price(&self, base: &str, quote: &str) -> Result<Decimal>;
}

/// Instrument metadata as the venue reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawInstrument {
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
    /// Minimum trade value in the stable reference, when the venue publishes one.
    pub min_trade_stable: Option<Decimal>,
}

/// Prices captured from one bulk ticker fetch, keyed by venue symbol.
#[derive(Debug, Clone, Default)]
pub struct PriceSnapshot {
    separator: &'static str,
    prices: HashMap<String, Decimal>,
}

impl PriceSnapshot {
    /// `separator` joins base and quote into the venue's symbol (`""` for `SHIBUSDT`).
    pub fn new(separator: &'static str) -> Self {
        Self { separator, prices: HashMap::new() }
    }

    pub fn insert(&mut self, symbol: &str, price: Decimal) {
        self.prices.insert(symbol.to_uppercase(), price);
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[async_trait]
impl ReferencePrices for PriceSnapshot {
    async fn reference_price(&self, base: &str, quote: &str) -> Result<Decimal> {
        let symbol = format!("{}{}{}", base, self.separator, quote).to_uppercase();
        self.prices
            .get(&symbol)
            .copied()
            .ok_or_else(|| BridgeError::SymbolUnavailable(format!("no ticker for {}", symbol)))
    }
}

pub struct OrderRuleResolver<'a> {
    pub config: &'a SpotConfig,
    pub prices: &'a dyn ReferencePrices,
}

impl<'a> OrderRuleResolver<'a> {
    pub async fn resolve(&self, raw: RawInstrument) -> Result<OrderRules> {
        let mut min_order_amount = raw.min_order_amount;
        let mut min_order_value = raw.min_order_value;

        if let Some(stable_minimum) = raw.min_trade_stable.filter(|m| *m > Decimal::ZERO) {
            if round_down(raw.min_order_amount, raw.amount_precision).is_zero() {
                min_order_amount = self
                    .effective_minimum(
                        raw.min_order_amount,
                        raw.amount_precision,
                        &raw.base_currency,
                        stable_minimum,
                    )
                    .await?;

                let value = self
                    .stable_minimum_in(&raw.quote_currency, stable_minimum)
                    .await?;
                min_order_value = min_order_value.max(round_up(value, raw.value_precision));

                debug!(
                    symbol = %raw.symbol,
                    raw_minimum = %raw.min_order_amount,
                    derived_minimum = %min_order_amount,
                    "Derived minimum order amount from stable reference"
                );
            }
        }

        Ok(OrderRules {
            symbol: raw.symbol,
            state: raw.state,
            base_currency: raw.base_currency,
            quote_currency: raw.quote_currency,
            price_precision: raw.price_precision,
            amount_precision: raw.amount_precision,
            value_precision: raw.value_precision,
            min_order_amount,
            max_order_amount: raw.max_order_amount,
            min_order_value,
        })
    }

    /// Like `resolve`, but an instrument whose minimum cannot be priced keeps
    /// its raw rule. Used for bulk listings where one pair must not fail the rest.
    pub async fn resolve_or_raw(&self, raw: RawInstrument) -> OrderRules {
        match self.resolve(raw.clone()).await {
            Ok(rules) => rules,
            Err(err) => {
                warn!(symbol = %raw.symbol, error = %err, "Keeping raw order rule");
                OrderRules {
                    symbol: raw.symbol,
                    state: raw.state,
                    base_currency: raw.base_currency,
                    quote_currency: raw.quote_currency,
                    price_precision: raw.price_precision,
                    amount_precision: raw.amount_precision,
                    value_precision: raw.value_precision,
                    min_order_amount: raw.min_order_amount,
                    max_order_amount: raw.max_order_amount,
                    min_order_value: raw.min_order_value,
                }
            }
        }
    }

    /// `raw_minimum` when it survives truncation to `precision`, otherwise the
    /// stable minimum priced into `currency` and rounded up to `precision`.
    pub async fn effective_minimum(
        &self,
        raw_minimum: Decimal,
        precision: u32,
        currency: &str,
        stable_minimum: Decimal,
    ) -> Result<Decimal> {
        if !round_down(raw_minimum, precision).is_zero() || stable_minimum <= Decimal::ZERO {
            return Ok(raw_minimum);
        }
        let derived = self.stable_minimum_in(currency, stable_minimum).await?;
        Ok(round_up(derived, precision))
    }

    /// Stable-reference minimum with the safety margin, expressed in `currency`.
    pub async fn stable_minimum_in(&self, currency: &str, stable_minimum: Decimal) -> Result<Decimal> {
        let with_margin = stable_minimum * (Decimal::ONE + self.config.cross_rate_margin);
        if currency.eq_ignore_ascii_case(&self.config.stable_reference) {
            return Ok(with_margin);
        }

        let price = self
            .prices
            .reference_price(currency, &self.config.stable_reference)
            .await?;
        if price <= Decimal::ZERO {
            return Err(BridgeError::InvalidData(format!(
                "no usable {}/{} price",
                currency, self.config.stable_reference
            )));
        }

        Ok(with_margin / price)
    }
}
