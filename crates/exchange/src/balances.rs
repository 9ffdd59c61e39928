use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashSet};

use venuebridge_core::utils::round_usd;
use venuebridge_core::{AccountBalance, Converter, CurrencyMapping, Result};
use venuebridge_monitoring::AuditLogger;

/// Filters raw `(ticker, amount)` rows to the allow-list, sums rows of the same
/// ticker, drops zeros and values the rest in USD.
pub async fn value_balances(
    raw: Vec<(String, Decimal)>,
    allowed: &[CurrencyMapping],
    converter: &dyn Converter,
    source: &str,
    usd_ticker: &str,
    audit: &AuditLogger,
) -> Result<Vec<AccountBalance>> {
    let allowed: HashSet<String> = allowed.iter().map(|m| m.ticker.to_uppercase()).collect();

    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for (ticker, amount) in raw {
        let ticker = ticker.to_uppercase();
        if !allowed.contains(&ticker) {
            continue;
        }
        *totals.entry(ticker).or_default() += amount;
    }

    let mut balances = Vec::with_capacity(totals.len());
    for (currency, amount) in totals {
        if amount.is_zero() {
            continue;
        }
        let usd = converter.convert(source, &currency, usd_ticker, amount).await?;
        balances.push(AccountBalance {
            currency,
            amount,
            amount_usd: round_usd(usd),
        });
    }

    let total_usd = balances.iter().map(|b| b.amount_usd).sum();
    audit.balances_observed(balances.len(), total_usd);

    Ok(balances)
}
