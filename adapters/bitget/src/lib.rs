//! Bitget venue adapter
//!
//! Single custody account. Spot and withdrawal funds share one balance, so no
//! internal transfer is ever needed. Bitget's `minTradeAmount` is truncated to
//! the pair's quantity precision and is zero for many low-priced coins; the
//! order rule resolver rebuilds it from `minTradeUSDT`.

pub mod client;
pub mod error;
pub mod model;

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use venuebridge_core::config::{BridgeConfig, SpotConfig, VenueConfig, WithdrawalConfig};
use venuebridge_core::utils::round_usd;
use venuebridge_core::{
    AccountBalance, BridgeError, ConnectionHash, Converter, Credential, DepositAddress, ExchangeSymbol,
    NormalizedOrderStatus, OrderDetailsRequest, OrderRules, OrderSide, OrderState, Result,
    SpotOrderRequest, SpotOrderResult, Storage, SymbolState, VenueId, WithdrawalOrderRequest,
    WithdrawalOrderResult, WithdrawalRecord, WithdrawalRule, WithdrawalStatus,
};
use venuebridge_exchange::{
    value_balances, OrderRuleResolver, PriceSnapshot, RateLimiterRegistry, RawInstrument, ReferencePrices, SpotOrderPlanner,
    SpotSubmission, SpotVenue, VenueAdapter, WithdrawalOrchestrator, WithdrawalSubmission, WithdrawalVenue,
};
use venuebridge_monitoring::AuditLogger;

use crate::client::{BitgetClient, API_URL};
use crate::model::{PlaceOrderParams, SymbolInfo, WithdrawalParams};

pub use crate::client::BitgetProfile;

pub struct BitgetAdapter {
    client: BitgetClient,
    storage: Arc<dyn Storage>,
    converter: Arc<dyn Converter>,
    withdrawal_config: WithdrawalConfig,
    spot_config: SpotConfig,
    extra_withdrawal_buffer: Decimal,
    audit: AuditLogger,
    cancel: CancellationToken,
}

impl BitgetAdapter {
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
        if credential.venue() != &VenueId::Bitget {
            return Err(BridgeError::InvalidData(format!(
                "credential for {} passed to the Bitget adapter",
                credential.venue()
            )));
        }

        let venue_config = config
            .venue(VenueId::Bitget.slug())
            .cloned()
            .unwrap_or_else(|| VenueConfig::new(API_URL));

        let cancel = CancellationToken::new();
        let client = BitgetClient::new(credential, &venue_config, limiter, cancel.clone())?;

        Ok(Self {
            client,
            storage,
            converter,
            withdrawal_config: config.withdrawal.clone(),
            spot_config: config.spot.clone(),
            extra_withdrawal_buffer: venue_config.extra_withdrawal_buffer,
            audit: AuditLogger::new(VenueId::Bitget.slug()),
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

    async fn symbol_info(&self, symbol: &str) -> Result<SymbolInfo> {
        self.client
            .symbols(Some(symbol))
            .await?
            .into_iter()
            .find(|s| s.symbol.eq_ignore_ascii_case(symbol))
            .ok_or_else(|| BridgeError::SymbolUnavailable(format!("{} is not listed on Bitget", symbol)))
    }

    async fn enabled_pairs(&self) -> Result<HashSet<(String, String)>> {
        Ok(self
            .storage
            .enabled_currencies(&VenueId::Bitget)
            .await?
            .into_iter()
            .map(|m| (m.ticker.to_uppercase(), m.chain.to_uppercase()))
            .collect())
    }
}

fn symbol_state(status: &str) -> SymbolState {
    match status.to_lowercase().as_str() {
        "online" => SymbolState::Online,
        "offline" | "halt" => SymbolState::Offline,
        other => SymbolState::Other(other.to_string()),
    }
}

fn raw_instrument(info: SymbolInfo, stable_reference: &str) -> RawInstrument {
    // minTradeUSDT is only a value minimum when USDT is the quote
    let min_order_value = if info.quote_coin.eq_ignore_ascii_case(stable_reference) {
        info.min_trade_usdt
    } else {
        Decimal::ZERO
    };

    RawInstrument {
        state: symbol_state(&info.status),
        symbol: info.symbol,
        base_currency: info.base_coin,
        quote_currency: info.quote_coin,
        price_precision: info.price_precision,
        amount_precision: info.quantity_precision,
        value_precision: info.quote_precision,
        min_order_amount: info.min_trade_amount,
        max_order_amount: info.max_trade_amount,
        min_order_value,
        min_trade_stable: Some(info.min_trade_usdt),
    }
}

fn order_state(status: &str) -> OrderState {
    match status {
        "filled" | "full_fill" => OrderState::Completed,
        "cancelled" | "canceled" => OrderState::Failed,
        _ => OrderState::InProgress,
    }
}

fn withdrawal_status(status: &str) -> WithdrawalStatus {
    match status {
        "success" => WithdrawalStatus::Completed,
        "fail" | "failed" | "reject" | "rejected" | "cancel" => WithdrawalStatus::Failed,
        _ => WithdrawalStatus::Pending,
    }
}

#[async_trait]
impl ReferencePrices for BitgetAdapter {
    async fn reference_price(&self, base: &str, quote: &str) -> Result<Decimal> {
        let ticker = self.client.ticker(&format!("{}{}", base, quote)).await?;
        Ok(ticker.last_pr)
    }
}

#[async_trait]
impl WithdrawalVenue for BitgetAdapter {
    async fn submit(&self, submission: &WithdrawalSubmission) -> Result<String> {
        let params = WithdrawalParams {
            coin: submission.ticker.clone(),
            transfer_type: "on_chain".to_string(),
            address: submission.address.clone(),
            chain: submission.chain.clone(),
            tag: submission.tag.clone(),
            size: submission.amount.to_string(),
            client_oid: submission.client_order_id.clone(),
        };
        Ok(self.client.withdraw(&params).await?.order_id)
    }
}

#[async_trait]
impl SpotVenue for BitgetAdapter {
    async fn available_balance(&self, currency: &str) -> Result<Decimal> {
        self.get_currency_balance(currency).await
    }

    async fn submit(&self, order: &SpotSubmission) -> Result<String> {
        let params = PlaceOrderParams {
            symbol: order.ticker.clone(),
            side: order.side.to_string(),
            order_type: "market".to_string(),
            force: "gtc".to_string(),
            size: order.amount.to_string(),
            client_oid: order.client_order_id.clone(),
        };
        Ok(self.client.place_order(&params).await?.order_id)
    }
}

#[async_trait]
impl VenueAdapter for BitgetAdapter {
    fn venue_id(&self) -> VenueId {
        VenueId::Bitget
    }

    fn connection_hash(&self) -> ConnectionHash {
        self.client.rest().connection_hash().clone()
    }

    async fn test_connection(&self) -> Result<()> {
        self.client.account_info().await?;
        Ok(())
    }

    async fn get_account_balance(&self) -> Result<Vec<AccountBalance>> {
        let assets = self.client.assets(None).await?;
        let allowed = self.storage.enabled_currencies(&VenueId::Bitget).await?;
        let raw = assets.into_iter().map(|a| (a.coin, a.available)).collect();

        value_balances(
            raw,
            &allowed,
            self.converter.as_ref(),
            VenueId::Bitget.slug(),
            &self.withdrawal_config.usd_ticker,
            &self.audit,
        )
        .await
    }

    async fn get_currency_balance(&self, currency: &str) -> Result<Decimal> {
        let assets = self.client.assets(Some(currency)).await?;
        Ok(assets
            .into_iter()
            .find(|a| a.coin.eq_ignore_ascii_case(currency))
            .map(|a| a.available)
            .unwrap_or(Decimal::ZERO))
    }

    async fn get_exchange_symbols(&self) -> Result<Vec<ExchangeSymbol>> {
        let symbols = self.client.symbols(None).await?;
        Ok(symbols
            .into_iter()
            .filter(|s| symbol_state(&s.status).is_tradable())
            .flat_map(|s| ExchangeSymbol::pair(&s.symbol, &s.base_coin, &s.quote_coin))
            .collect())
    }

    async fn get_deposit_addresses(&self, currency: &str) -> Result<Vec<DepositAddress>> {
        let coins = self.client.coins(Some(currency)).await?;
        let chains = coins
            .into_iter()
            .filter(|c| c.coin.eq_ignore_ascii_case(currency))
            .flat_map(|c| c.chains)
            .filter(|chain| chain.can_deposit());

        let mut addresses = Vec::new();
        for chain in chains {
            let currency_id = match self.storage.currency_id(&VenueId::Bitget, currency, &chain.chain).await? {
                Some(id) => id,
                None => {
                    warn!(currency, chain = %chain.chain, "No internal currency for chain, skipping");
                    continue;
                }
            };

            let info = self.client.deposit_address(currency, &chain.chain).await?;
            addresses.push(DepositAddress {
                currency_id,
                ticker: info.coin,
                chain: info.chain,
                address: info.address,
                tag: info.tag.filter(|t| !t.is_empty()),
            });
        }

        Ok(addresses)
    }

    async fn create_withdrawal_order(&self, request: &WithdrawalOrderRequest) -> Result<WithdrawalOrderResult> {
        let orchestrator = WithdrawalOrchestrator {
            venue: &VenueId::Bitget,
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
        let symbol = format!("{}{}", base, quote).to_uppercase();
        let info = self.symbol_info(&symbol).await?;
        self.resolver()
            .resolve(raw_instrument(info, &self.spot_config.stable_reference))
            .await
    }

    async fn get_order_rules(&self) -> Result<Vec<OrderRules>> {
        let symbols = self.client.symbols(None).await?;

        // one ticker call prices every correction in the listing
        let mut prices = PriceSnapshot::new("");
        for ticker in self.client.tickers().await? {
            prices.insert(&ticker.symbol, ticker.last_pr);
        }
        debug!(symbols = symbols.len(), tickers = prices.len(), "Resolving order rules");

        let resolver = OrderRuleResolver {
            config: &self.spot_config,
            prices: &prices,
        };
        let mut rules = Vec::with_capacity(symbols.len());
        for info in symbols {
            rules.push(
                resolver
                    .resolve_or_raw(raw_instrument(info, &self.spot_config.stable_reference))
                    .await,
            );
        }
        Ok(rules)
    }

    async fn get_order_details(&self, request: &OrderDetailsRequest) -> Result<NormalizedOrderStatus> {
        let order = self
            .client
            .order_info(&request.exchange_order_id)
            .await?
            .ok_or_else(|| BridgeError::InvalidData(format!("order {} not found", request.exchange_order_id)))?;
        let info = self.symbol_info(&request.ticker).await?;

        let side = if order.side.eq_ignore_ascii_case("sell") { OrderSide::Sell } else { OrderSide::Buy };
        let (amount, received) = match side {
            OrderSide::Sell => (order.quote_volume, info.quote_coin),
            OrderSide::Buy => (order.base_volume, info.base_coin),
        };

        let amount_usd = if amount.is_zero() {
            Decimal::ZERO
        } else {
            self.converter
                .convert(VenueId::Bitget.slug(), &received, &self.withdrawal_config.usd_ticker, amount)
                .await?
        };

        debug!(order_id = %order.order_id, status = %order.status, "Order details fetched");

        Ok(NormalizedOrderStatus {
            state: order_state(&order.status),
            amount,
            amount_usd: round_usd(amount_usd),
        })
    }

    async fn get_withdrawal_rules(&self, currencies: &[String]) -> Result<Vec<WithdrawalRule>> {
        let enabled = self.enabled_pairs().await?;
        let wanted: HashSet<String> = currencies.iter().map(|c| c.to_uppercase()).collect();
        let resolver = self.resolver();

        let mut rules = Vec::new();
        for coin in self.client.coins(None).await? {
            let ticker = coin.coin.to_uppercase();
            if !wanted.is_empty() && !wanted.contains(&ticker) {
                continue;
            }

            for chain in coin.chains {
                if !enabled.contains(&(ticker.clone(), chain.chain.to_uppercase())) {
                    continue;
                }

                let min_withdrawal = resolver
                    .effective_minimum(
                        chain.min_withdraw_amount,
                        chain.withdraw_min_scale,
                        &ticker,
                        self.withdrawal_config.min_withdrawal_stable,
                    )
                    .await?;

                rules.push(WithdrawalRule {
                    currency: ticker.clone(),
                    chain: chain.chain.clone(),
                    min_withdrawal,
                    withdrawal_precision: chain.withdraw_min_scale,
                    fee: chain.withdraw_fee + chain.extra_withdraw_fee,
                    withdraw_enabled: chain.can_withdraw(),
                    deposit_enabled: chain.can_deposit(),
                });
            }
        }

        Ok(rules)
    }

    async fn get_withdrawal_by_id(&self, id: &str) -> Result<WithdrawalRecord> {
        let record = self
            .client
            .withdrawal_record(id)
            .await?
            .ok_or_else(|| BridgeError::InvalidData(format!("withdrawal {} not found", id)))?;

        Ok(WithdrawalRecord {
            id: record.order_id,
            status: withdrawal_status(&record.status),
            tx_hash: record.trade_id.filter(|t| !t.is_empty()),
            native_amount: (!record.size.is_zero()).then_some(record.size),
        })
    }

    fn shutdown(&self) {
        self.cancel.cancel();
    }
}
