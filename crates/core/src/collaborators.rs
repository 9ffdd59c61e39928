//! Capabilities the adapters consume but do not own: currency identity
//! lookups and currency conversion.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::error::{BridgeError, Result};
use crate::types::{CurrencyMapping, VenueId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Storage: Send + Sync {
    /// Internal currency id for a venue ticker on a chain.
    async fn currency_id(&self, venue: &VenueId, ticker: &str, chain: &str) -> Result<Option<String>>;

    async fn currency_by_id(&self, venue: &VenueId, currency_id: &str) -> Result<Option<CurrencyMapping>>;

    /// Currencies and chains enabled for the venue. Doubles as the balance allow-list.
    async fn enabled_currencies(&self, venue: &VenueId) -> Result<Vec<CurrencyMapping>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Converter: Send + Sync {
    /// Converts `amount` of `from` into `to`, priced by `source`.
    async fn convert(&self, source: &str, from: &str, to: &str, amount: Decimal) -> Result<Decimal>;
}

/// Storage backed by a fixed list of mappings per venue.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    mappings: HashMap<VenueId, Vec<CurrencyMapping>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_currency(mut self, venue: VenueId, currency_id: &str, ticker: &str, chain: &str) -> Self {
        self.mappings.entry(venue).or_default().push(CurrencyMapping {
            currency_id: currency_id.to_string(),
            ticker: ticker.to_string(),
            chain: chain.to_string(),
        });
        self
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn currency_id(&self, venue: &VenueId, ticker: &str, chain: &str) -> Result<Option<String>> {
        Ok(self.mappings.get(venue).and_then(|rows| {
            rows.iter()
                .find(|m| m.ticker.eq_ignore_ascii_case(ticker) && m.chain.eq_ignore_ascii_case(chain))
                .map(|m| m.currency_id.clone())
        }))
    }

    async fn currency_by_id(&self, venue: &VenueId, currency_id: &str) -> Result<Option<CurrencyMapping>> {
        Ok(self
            .mappings
            .get(venue)
            .and_then(|rows| rows.iter().find(|m| m.currency_id == currency_id).cloned()))
    }

    async fn enabled_currencies(&self, venue: &VenueId) -> Result<Vec<CurrencyMapping>> {
        Ok(self.mappings.get(venue).cloned().unwrap_or_default())
    }
}

/// Converter with a static USD price per ticker.
#[derive(Debug, Clone, Default)]
pub struct FixedRateConverter {
    usd_prices: HashMap<String, Decimal>,
}

impl FixedRateConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(mut self, ticker: &str, usd_price: Decimal) -> Self {
        self.usd_prices.insert(ticker.to_uppercase(), usd_price);
        self
    }

    fn price(&self, ticker: &str) -> Result<Decimal> {
        let ticker = ticker.to_uppercase();
        if ticker == "USD" {
            return Ok(Decimal::ONE);
        }
        self.usd_prices
            .get(&ticker)
            .copied()
            .filter(|p| !p.is_zero())
            .ok_or_else(|| BridgeError::Conversion(format!("No USD price for {}", ticker)))
    }
}

#[async_trait]
impl Converter for FixedRateConverter {
    async fn convert(&self, _source: &str, from: &str, to: &str, amount: Decimal) -> Result<Decimal> {
        Ok(amount * self.price(from)? / self.price(to)?)
    }
}
