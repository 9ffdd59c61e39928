//! KuCoin venue adapter
//!
//! Funds live in two sub-accounts: `main` backs withdrawals and `trade` backs
//! spot orders. Before either operation the adapter moves the shortfall across
//! with an inner transfer. Chains are stored by KuCoin chain id (`trx`, `eth`),
//! the display name is accepted wherever a chain is matched.

pub mod client;
pub mod error;
pub mod model;

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use venuebridge_core::config::{BridgeConfig, SpotConfig, VenueConfig, WithdrawalConfig};
use venuebridge_core::utils::{round_usd, ClientIdPurpose, IdGenerator};
use venuebridge_core::{
    AccountBalance, BridgeError, ConnectionHash, Converter, Credential, DepositAddress, ExchangeSymbol,
    NormalizedOrderStatus, OrderDetailsRequest, OrderRules, OrderSide, OrderState, Result,
    SpotOrderRequest, SpotOrderResult, Storage, SymbolState, VenueId, WithdrawalOrderRequest,
    WithdrawalOrderResult, WithdrawalRecord, WithdrawalRule, WithdrawalStatus,
};
use venuebridge_exchange::{
    value_balances, OrderRuleResolver, RateLimiterRegistry, RawInstrument, ReferencePrices, SpotOrderPlanner,
    SpotSubmission, SpotVenue, VenueAdapter, WithdrawalOrchestrator, WithdrawalSubmission, WithdrawalVenue,
};
use venuebridge_monitoring::AuditLogger;

use crate::client::{KucoinClient, API_URL};
use crate::model::{AccountType, InnerTransferParams, OrderInfo, PlaceOrderParams, SymbolInfo, WithdrawalParams};

pub use crate::client::KucoinProfile;

pub struct KucoinAdapter {
    client: KucoinClient,
    storage: Arc<dyn Storage>,
    converter: Arc<dyn Converter>,
    withdrawal_config: WithdrawalConfig,
    spot_config: SpotConfig,
    extra_withdrawal_buffer: Decimal,
    audit: AuditLogger,
    cancel: CancellationToken,
}

impl KucoinAdapter {
    pub fn new(
        credential: Credential,
        storage: Arc<dyn Storage>,
        converter: Arc<dyn Converter>,
        config: &BridgeConfig,
    ) -> Result<Self> {
        Self::with_registry(credential, storage, converter, config, Arc::new(RateLimiterRegistry::new()))
    }

    pub fn with_registry(
        credential: Credential,
        storage: Arc<dyn Storage>,
        converter: Arc<dyn Converter>,
        config: &BridgeConfig,
        limiter: Arc<RateLimiterRegistry>,
    ) -> Result<Self> {
        if credential.venue() != &VenueId::Kucoin {
            return Err(BridgeError::InvalidData(format!(
                "credential for {} passed to the KuCoin adapter",
                credential.venue()
            )));
        }

        let venue_config = config
            .venue(VenueId::Kucoin.slug())
            .cloned()
            .unwrap_or_else(|| VenueConfig::new(API_URL));

        let cancel = CancellationToken::new();
        let client = KucoinClient::new(credential, &venue_config, limiter, cancel.clone())?;

        Ok(Self {
            client,
            storage,
            converter,
            withdrawal_config: config.withdrawal.clone(),
            spot_config: config.spot.clone(),
            extra_withdrawal_buffer: venue_config.extra_withdrawal_buffer,
            audit: AuditLogger::new(VenueId::Kucoin.slug()),
            cancel,
        })
    }

    pub fn limiter(&self) -> &Arc<RateLimiterRegistry> {
        self.client.rest().limiter()
    }

    fn resolver(&self) -> OrderRuleResolver<'_> {
        OrderRuleResolver {
            config: &self.spot_config,
            prices: self,
        }
    }

    /// Available `currency` per sub-account as `(main, trade)`.
    async fn split_balance(&self, currency: &str) -> Result<(Decimal, Decimal)> {
        let accounts = self.client.accounts(Some(currency)).await?;
        let sum = |account_type: AccountType| -> Decimal {
            accounts
                .iter()
                .filter(|a| a.currency.eq_ignore_ascii_case(currency) && a.is(account_type))
                .map(|a| a.available)
                .sum()
        };
        Ok((sum(AccountType::Main), sum(AccountType::Trade)))
    }

    /// Tops `target` up to `amount` from the other sub-account.
    async fn ensure_funds_in(
        &self,
        target: AccountType,
        currency: &str,
        amount: Decimal,
        client_order_id: &str,
    ) -> Result<()> {
        let (main, trade) = self.split_balance(currency).await?;
        let (held, other, source) = match target {
            AccountType::Main => (main, trade, AccountType::Trade),
            AccountType::Trade => (trade, main, AccountType::Main),
        };

        if held >= amount {
            return Ok(());
        }

        let shortfall = amount - held;
        if other < shortfall {
            return Err(BridgeError::InsufficientBalance(format!(
                "{} {} across main and trade, {} needed",
                main + trade,
                currency,
                amount
            )));
        }

        // keyed on the submission id so a replayed attempt reuses the transfer id
        let client_oid = IdGenerator::new(Some(client_order_id)).client_order_id(ClientIdPurpose::InternalTransfer, 0);
        let params = InnerTransferParams {
            client_oid,
            currency: currency.to_string(),
            from: source.as_str().to_string(),
            to: target.as_str().to_string(),
            amount: shortfall.to_string(),
        };
        let ack = self.client.inner_transfer(&params).await?;

        debug!(transfer_id = %ack.order_id, "Inner transfer accepted");
        self.audit
            .internal_transfer(currency, source.as_str(), target.as_str(), shortfall);

        Ok(())
    }
}

fn raw_instrument(info: SymbolInfo) -> RawInstrument {
    RawInstrument {
        state: if info.enable_trading { SymbolState::Online } else { SymbolState::Offline },
        symbol: info.symbol,
        base_currency: info.base_currency,
        quote_currency: info.quote_currency,
        price_precision: info.price_increment,
        amount_precision: info.base_increment,
        value_precision: info.quote_increment,
        min_order_amount: info.base_min_size,
        max_order_amount: info.base_max_size,
        min_order_value: info.quote_min_size,
        min_trade_stable: None,
    }
}

fn order_state(order: &OrderInfo) -> OrderState {
    if order.active {
        OrderState::InProgress
    } else if order.cancel_exist && order.deal_size.is_zero() {
        OrderState::Failed
    } else {
        OrderState::Completed
    }
}

fn withdrawal_status(status: &str) -> WithdrawalStatus {
    match status.to_uppercase().as_str() {
        "SUCCESS" => WithdrawalStatus::Completed,
        "FAILURE" => WithdrawalStatus::Failed,
        _ => WithdrawalStatus::Pending,
    }
}

#[async_trait]
impl ReferencePrices for KucoinAdapter {
    async fn reference_price(&self, base: &str, quote: &str) -> Result<Decimal> {
        let level1 = self.client.level1(&format!("{}-{}", base, quote)).await?;
        Ok(level1.price)
    }
}

#[async_trait]
impl WithdrawalVenue for KucoinAdapter {
    async fn prepare(&self, submission: &WithdrawalSubmission) -> Result<()> {
        // EXTERNAL fee deduction takes the fee from `main` on top of the amount
        self.ensure_funds_in(
            AccountType::Main,
            &submission.ticker,
            submission.amount + submission.fee,
            &submission.client_order_id,
        )
        .await
    }

    async fn submit(&self, submission: &WithdrawalSubmission) -> Result<String> {
        let params = WithdrawalParams {
            currency: submission.ticker.clone(),
            to_address: submission.address.clone(),
            amount: submission.amount.to_string(),
            chain: submission.chain.to_lowercase(),
            memo: submission.tag.clone(),
            withdraw_type: "ADDRESS".to_string(),
            is_inner: false,
            remark: submission.client_order_id.clone(),
            fee_deduct_type: "EXTERNAL".to_string(),
        };
        Ok(self.client.withdraw(&params).await?.withdrawal_id)
    }
}

#[async_trait]
impl SpotVenue for KucoinAdapter {
    async fn available_balance(&self, currency: &str) -> Result<Decimal> {
        self.get_currency_balance(currency).await
    }

    async fn prepare(&self, order: &SpotSubmission) -> Result<()> {
        self.ensure_funds_in(
            AccountType::Trade,
            &order.funding_currency,
            order.amount,
            &order.client_order_id,
        )
        .await
    }

    async fn submit(&self, order: &SpotSubmission) -> Result<String> {
        let amount = order.amount.to_string();
        let (size, funds) = match order.side {
            OrderSide::Sell => (Some(amount), None),
            OrderSide::Buy => (None, Some(amount)),
        };

        let params = PlaceOrderParams {
            client_oid: order.client_order_id.clone(),
            side: order.side.to_string(),
            symbol: order.ticker.clone(),
            order_type: "market".to_string(),
            size,
            funds,
        };
        Ok(self.client.place_order(&params).await?.order_id)
    }
}

#[async_trait]
impl VenueAdapter for KucoinAdapter {
    fn venue_id(&self) -> VenueId {
        VenueId::Kucoin
    }

    fn connection_hash(&self) -> ConnectionHash {
        self.client.rest().connection_hash().clone()
    }

    async fn test_connection(&self) -> Result<()> {
        self.client.ping().await?;
        Ok(())
    }

    async fn get_account_balance(&self) -> Result<Vec<AccountBalance>> {
        let accounts = self.client.accounts(None).await?;
        let allowed = self.storage.enabled_currencies(&VenueId::Kucoin).await?;
        let raw = accounts
            .into_iter()
            .filter(|a| a.is_spendable())
            .map(|a| (a.currency, a.available))
            .collect();

        value_balances(
            raw,
            &allowed,
            self.converter.as_ref(),
            VenueId::Kucoin.slug(),
            &self.withdrawal_config.usd_ticker,
            &self.audit,
        )
        .await
    }

    async fn get_currency_balance(&self, currency: &str) -> Result<Decimal> {
        let (main, trade) = self.split_balance(currency).await?;
        Ok(main + trade)
    }

    async fn get_exchange_symbols(&self) -> Result<Vec<ExchangeSymbol>> {
        let symbols = self.client.symbols().await?;
        Ok(symbols
            .into_iter()
            .filter(|s| s.enable_trading)
            .flat_map(|s| ExchangeSymbol::pair(&s.symbol, &s.base_currency, &s.quote_currency))
            .collect())
    }

    async fn get_deposit_addresses(&self, currency: &str) -> Result<Vec<DepositAddress>> {
        let mut addresses = Vec::new();
        for info in self.client.deposit_addresses(currency, None).await? {
            let mut currency_id = self
                .storage
                .currency_id(&VenueId::Kucoin, currency, &info.chain_id)
                .await?;
            if currency_id.is_none() && !info.chain_name.is_empty() {
                currency_id = self
                    .storage
                    .currency_id(&VenueId::Kucoin, currency, &info.chain_name)
                    .await?;
            }

            let Some(currency_id) = currency_id else {
                warn!(currency, chain = %info.chain_id, "No internal currency for chain, skipping");
                continue;
            };

            addresses.push(DepositAddress {
                currency_id,
                ticker: currency.to_uppercase(),
                chain: info.chain_id,
                address: info.address,
                tag: info.memo.filter(|m| !m.is_empty()),
            });
        }

        Ok(addresses)
    }

    async fn create_withdrawal_order(&self, request: &WithdrawalOrderRequest) -> Result<WithdrawalOrderResult> {
        let orchestrator = WithdrawalOrchestrator {
            venue: &VenueId::Kucoin,
            storage: self.storage.as_ref(),
            converter: self.converter.as_ref(),
            config: &self.withdrawal_config,
            audit: &self.audit,
            cancel: &self.cancel,
            extra_buffer: self.extra_withdrawal_buffer,
        };
        orchestrator.run(request, self).await
    }

    async fn create_spot_order(&self, request: &SpotOrderRequest) -> Result<SpotOrderResult> {
        let rules = match &request.rules {
            Some(rules) => rules.clone(),
            None => self.get_order_rule(&request.base_symbol, &request.quote_symbol).await?,
        };

        let planner = SpotOrderPlanner {
            audit: &self.audit,
            cancel: &self.cancel,
        };
        planner.run(request, &rules, self).await
    }

    async fn get_order_rule(&self, base: &str, quote: &str) -> Result<OrderRules> {
        let symbol = format!("{}-{}", base, quote).to_uppercase();
        let info = self.client.symbol(&symbol).await?;
        self.resolver().resolve(raw_instrument(info)).await
    }

    async fn get_order_rules(&self) -> Result<Vec<OrderRules>> {
        let resolver = self.resolver();
        let mut rules = Vec::new();
        for info in self.client.symbols().await? {
            rules.push(resolver.resolve(raw_instrument(info)).await?);
        }
        Ok(rules)
    }

    async fn get_order_details(&self, request: &OrderDetailsRequest) -> Result<NormalizedOrderStatus> {
        let order = self
            .client
            .order(&request.exchange_order_id, &request.ticker)
            .await?
            .ok_or_else(|| BridgeError::InvalidData(format!("order {} not found", request.exchange_order_id)))?;

        let (base, quote) = order
            .symbol
            .split_once('-')
            .ok_or_else(|| BridgeError::InvalidData(format!("unexpected symbol {}", order.symbol)))?;

        let (amount, received) = if order.side.eq_ignore_ascii_case("sell") {
            (order.deal_funds, quote)
        } else {
            (order.deal_size, base)
        };

        let amount_usd = if amount.is_zero() {
            Decimal::ZERO
        } else {
            self.converter
                .convert(VenueId::Kucoin.slug(), received, &self.withdrawal_config.usd_ticker, amount)
                .await?
        };

        debug!(order_id = %order.id, active = order.active, "Order details fetched");

        Ok(NormalizedOrderStatus {
            state: order_state(&order),
            amount,
            amount_usd: round_usd(amount_usd),
        })
    }

    async fn get_withdrawal_rules(&self, currencies: &[String]) -> Result<Vec<WithdrawalRule>> {
        let enabled = self.storage.enabled_currencies(&VenueId::Kucoin).await?;
        let tickers: BTreeSet<String> = if currencies.is_empty() {
            enabled.iter().map(|m| m.ticker.to_uppercase()).collect()
        } else {
            currencies.iter().map(|c| c.to_uppercase()).collect()
        };

        let mut rules = Vec::new();
        for ticker in tickers {
            let Some(info) = self.client.currency(&ticker).await? else {
                warn!(currency = %ticker, "Currency not listed on KuCoin");
                continue;
            };

            for chain in info.chains {
                let mapping = enabled
                    .iter()
                    .find(|m| m.ticker.eq_ignore_ascii_case(&ticker) && chain.matches(&m.chain));
                let Some(mapping) = mapping else {
                    continue;
                };

                rules.push(WithdrawalRule {
                    currency: ticker.clone(),
                    chain: mapping.chain.clone(),
                    min_withdrawal: chain.withdrawal_min_size,
                    withdrawal_precision: chain.withdraw_precision,
                    fee: chain.withdrawal_min_fee,
                    withdraw_enabled: chain.is_withdraw_enabled,
                    deposit_enabled: chain.is_deposit_enabled,
                });
            }
        }

        Ok(rules)
    }

    async fn get_withdrawal_by_id(&self, id: &str) -> Result<WithdrawalRecord> {
        let info = self
            .client
            .withdrawal(id)
            .await?
            .ok_or_else(|| BridgeError::InvalidData(format!("withdrawal {} not found", id)))?;

        Ok(WithdrawalRecord {
            id: info.id,
            status: withdrawal_status(&info.status),
            tx_hash: info.wallet_tx_id.filter(|t| !t.is_empty()),
            native_amount: (!info.amount.is_zero()).then_some(info.amount),
        })
    }

    fn shutdown(&self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn order(active: bool, cancel_exist: bool, deal_size: Decimal) -> OrderInfo {
        OrderInfo {
            id: "o1".to_string(),
            symbol: "BTC-USDT".to_string(),
            side: "buy".to_string(),
            deal_size,
            deal_funds: Decimal::ZERO,
            active,
            cancel_exist,
        }
    }

    #[test]
    fn test_order_state() {
        assert_eq!(order_state(&order(true, false, dec!(0))), OrderState::InProgress);
        assert_eq!(order_state(&order(false, false, dec!(0.5))), OrderState::Completed);
        assert_eq!(order_state(&order(false, true, dec!(0))), OrderState::Failed);
        assert_eq!(order_state(&order(false, true, dec!(0.2))), OrderState::Completed);
    }

    #[test]
    fn test_withdrawal_status() {
        assert_eq!(withdrawal_status("SUCCESS"), WithdrawalStatus::Completed);
        assert_eq!(withdrawal_status("WALLET_PROCESSING"), WithdrawalStatus::Pending);
        assert_eq!(withdrawal_status("REVIEW"), WithdrawalStatus::Pending);
        assert_eq!(withdrawal_status("FAILURE"), WithdrawalStatus::Failed);
    }

    #[test]
    fn test_disabled_symbol_is_offline() {
        let info: SymbolInfo = serde_json::from_str(
            r#"{"symbol":"OLD-USDT","baseCurrency":"OLD","quoteCurrency":"USDT","enableTrading":false}"#,
        )
        .unwrap();
        let raw = raw_instrument(info);
        assert_eq!(raw.state, SymbolState::Offline);
        assert!(raw.min_trade_stable.is_none());
    }
}
