use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use venuebridge_core::utils::{round_down, ClientIdPurpose, IdGenerator};
use venuebridge_core::{BridgeError, OrderRules, OrderSide, Result, SpotOrderRequest, SpotOrderResult};
use venuebridge_monitoring::AuditLogger;

/// One market order ready for the venue. `amount` is base quantity when
/// selling and quote funds when buying.
#[derive(Debug, Clone, PartialEq)]
pub struct SpotSubmission {
    pub ticker: String,
    pub side: OrderSide,
    pub funding_currency: String,
    pub amount: Decimal,
    pub client_order_id: String,
}

#[async_trait]
pub trait SpotVenue: Send + Sync {
    /// Spendable balance of `currency`, summed over every sub-account that can fund a trade.
    async fn available_balance(&self, currency: &str) -> Result<Decimal>;

    /// Split-custody venues move funds into the trading sub-account here.
    async fn prepare(&self, _order: &SpotSubmission) -> Result<()> {
        Ok(())
    }

    /// Returns the venue order id.
    async fn submit(&self, order: &SpotSubmission) -> Result<String>;
}

/// Selling spends base, buying spends quote.
pub fn funding_currency(request: &SpotOrderRequest) -> &str {
    match request.side {
        OrderSide::Sell => &request.base_symbol,
        OrderSide::Buy => &request.quote_symbol,
    }
}

pub fn ensure_tradable(rules: &OrderRules) -> Result<()> {
    if !rules.state.is_tradable() {
        return Err(BridgeError::SymbolUnavailable(format!(
            "{} is not trading ({:?})",
            rules.symbol, rules.state
        )));
    }
    Ok(())
}

/// Sizes an order from the available balance, always rounding down.
pub fn size_order(rules: &OrderRules, side: OrderSide, available: Decimal) -> Result<Decimal> {
    ensure_tradable(rules)?;

    let (minimum, precision) = match side {
        OrderSide::Sell => (rules.min_order_amount, rules.amount_precision),
        OrderSide::Buy => (rules.min_order_value, rules.value_precision),
    };

    if available <= Decimal::ZERO || available < minimum {
        return Err(BridgeError::InsufficientBalance(format!(
            "{} {} available, venue minimum is {}",
            available, rules.symbol, minimum
        )));
    }

    let mut amount = available;
    if side == OrderSide::Sell && rules.max_order_amount > Decimal::ZERO && amount > rules.max_order_amount {
        amount = rules.max_order_amount;
    }

    let amount = round_down(amount, precision);
    if amount <= Decimal::ZERO || amount < minimum {
        return Err(BridgeError::InsufficientBalance(format!(
            "{} rounds to {} at precision {}",
            available, amount, precision
        )));
    }

    Ok(amount)
}

pub struct SpotOrderPlanner<'a> {
    pub audit: &'a AuditLogger,
    pub cancel: &'a CancellationToken,
}

impl<'a> SpotOrderPlanner<'a> {
    pub async fn run(
        &self,
        request: &SpotOrderRequest,
        rules: &OrderRules,
        target: &dyn SpotVenue,
    ) -> Result<SpotOrderResult> {
        if self.cancel.is_cancelled() {
            return Err(BridgeError::Cancelled);
        }

        ensure_tradable(rules)?;

        let currency = funding_currency(request);
        let available = target.available_balance(currency).await?;
        let amount = size_order(rules, request.side, available)?;

        let ids = IdGenerator::new(request.correlation_id.as_deref());
        let order = SpotSubmission {
            ticker: request.ticker.clone(),
            side: request.side,
            funding_currency: currency.to_string(),
            amount,
            client_order_id: ids.client_order_id(ClientIdPurpose::SpotOrder, 0),
        };

        debug!(ticker = %order.ticker, side = %order.side, amount = %amount, "Submitting market order");

        let exchange_order_id = tokio::select! {
            biased;
            result = async {
                target.prepare(&order).await?;
                target.submit(&order).await
            } => result?,
            _ = self.cancel.cancelled() => return Err(BridgeError::Cancelled),
        };

        self.audit.spot_order_submitted(
            &order.ticker,
            &order.side.to_string(),
            amount,
            &order.client_order_id,
            &exchange_order_id,
        );

        Ok(SpotOrderResult {
            exchange_order_id,
            client_order_id: order.client_order_id,
            amount_submitted: amount,
        })
    }
}
