//! Withdrawal sizing and the bounded retry on transient balance locks.
//!
//! The orchestrator runs `Sizing → Submitting → Retrying → Terminal`. The
//! amount only ever shrinks: it starts at `native_amount - fee` rounded down,
//! and each balance-locked rejection removes one USD-denominated step from it
//! until the venue accepts or the amount falls below `min_withdrawal`.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use venuebridge_core::config::WithdrawalConfig;
use venuebridge_core::utils::{round_down, ClientIdPurpose, IdGenerator};
use venuebridge_core::{
    BridgeError, Converter, Result, Storage, VenueId, WithdrawalOrderRequest, WithdrawalOrderResult,
};
use venuebridge_monitoring::AuditLogger;

pub const BALANCE_LOCKED_REASON: &str = "balance locked";

/// Everything a venue needs to submit one withdrawal attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalSubmission {
    pub ticker: String,
    pub chain: String,
    pub address: String,
    pub tag: Option<String>,
    pub amount: Decimal,
    /// Network fee charged by the venue on top of `amount`.
    pub fee: Decimal,
    pub client_order_id: String,
}

/// Venue side of the orchestrator. Injected so the loop runs without a network.
#[async_trait]
pub trait WithdrawalVenue: Send + Sync {
    /// Split-custody venues move funds into the withdrawable sub-account here.
    async fn prepare(&self, _submission: &WithdrawalSubmission) -> Result<()> {
        Ok(())
    }

    /// Returns the venue-assigned withdrawal id.
    async fn submit(&self, submission: &WithdrawalSubmission) -> Result<String>;
}

#[derive(Debug)]
enum WithdrawalState {
    Sizing,
    Submitting { amount: Decimal, attempt: u32, retry_reason: Option<String> },
    Retrying { amount: Decimal, attempt: u32 },
    Terminal(Result<WithdrawalOrderResult>),
}

pub struct WithdrawalOrchestrator<'a> {
    pub venue: &'a VenueId,
    pub storage: &'a dyn Storage,
    pub converter: &'a dyn Converter,
    pub config: &'a WithdrawalConfig,
    pub audit: &'a AuditLogger,
    pub cancel: &'a CancellationToken,
    /// Fraction removed from the sized amount before rounding. Normally zero.
    pub extra_buffer: Decimal,
}

impl<'a> WithdrawalOrchestrator<'a> {
    pub async fn run(
        &self,
        request: &WithdrawalOrderRequest,
        target: &dyn WithdrawalVenue,
    ) -> Result<WithdrawalOrderResult> {
        let mapping = self
            .storage
            .currency_by_id(self.venue, &request.internal_currency_id)
            .await?
            .ok_or_else(|| {
                BridgeError::CurrencyNotMapped(format!(
                    "{} has no {} ticker",
                    request.internal_currency_id, self.venue
                ))
            })?;

        let ids = IdGenerator::new(request.correlation_id.as_deref());
        let precision = request.withdrawal_precision;
        let mut state = WithdrawalState::Sizing;

        loop {
            // an accepted withdrawal is reported even if cancellation raced it
            if self.cancel.is_cancelled() && !matches!(state, WithdrawalState::Terminal(_)) {
                return Err(BridgeError::Cancelled);
            }

            state = match state {
                WithdrawalState::Sizing => {
                    let mut amount = request.native_amount - request.fee;
                    if !self.extra_buffer.is_zero() {
                        amount *= Decimal::ONE - self.extra_buffer;
                    }
                    let amount = round_down(amount, precision);

                    self.audit.withdrawal_assembled(
                        &mapping.ticker,
                        &mapping.chain,
                        amount,
                        request.fee,
                        request.correlation_id.as_deref(),
                    );

                    WithdrawalState::Submitting { amount, attempt: 0, retry_reason: None }
                }

                WithdrawalState::Submitting { amount, attempt, retry_reason } => {
                    if amount <= Decimal::ZERO || amount < request.min_withdrawal {
                        let err = BridgeError::MinimumNotMet(format!(
                            "withdrawal amount {} is below minimum {} {}",
                            amount, request.min_withdrawal, mapping.ticker
                        ));
                        WithdrawalState::Terminal(Err(err))
                    } else {
                        let submission = WithdrawalSubmission {
                            ticker: mapping.ticker.clone(),
                            chain: mapping.chain.clone(),
                            address: request.address.clone(),
                            tag: request.tag.clone(),
                            amount,
                            fee: request.fee,
                            client_order_id: ids.client_order_id(ClientIdPurpose::Withdrawal, attempt),
                        };

                        debug!(attempt, amount = %amount, "Submitting withdrawal");

                        match self.submit(target, &submission).await {
                            Ok(external_order_id) => {
                                self.audit.withdrawal_submitted(
                                    &submission.client_order_id,
                                    &external_order_id,
                                    amount,
                                );
                                WithdrawalState::Terminal(Ok(WithdrawalOrderResult {
                                    internal_order_id: submission.client_order_id,
                                    external_order_id,
                                    retry_reason,
                                }))
                            }
                            Err(err) if err.is_balance_locked() => {
                                WithdrawalState::Retrying { amount, attempt }
                            }
                            Err(err) => WithdrawalState::Terminal(Err(err)),
                        }
                    }
                }

                WithdrawalState::Retrying { amount, attempt } => {
                    let step = self
                        .converter
                        .convert(
                            self.venue.slug(),
                            &self.config.usd_ticker,
                            &mapping.ticker,
                            self.config.retry_step_usd,
                        )
                        .await?;

                    if step <= Decimal::ZERO {
                        return Err(BridgeError::Conversion(format!(
                            "retry step for {} converted to {}",
                            mapping.ticker, step
                        )));
                    }

                    let next_amount = round_down(amount - step, precision);
                    self.audit
                        .withdrawal_retry(attempt + 1, amount, next_amount, BALANCE_LOCKED_REASON);

                    WithdrawalState::Submitting {
                        amount: next_amount,
                        attempt: attempt + 1,
                        retry_reason: Some(BALANCE_LOCKED_REASON.to_string()),
                    }
                }

                WithdrawalState::Terminal(outcome) => {
                    if let Err(err) = &outcome {
                        info!(error = %err, "Withdrawal ended without submission");
                    }
                    return outcome;
                }
            };
        }
    }

    async fn submit(&self, target: &dyn WithdrawalVenue, submission: &WithdrawalSubmission) -> Result<String> {
        tokio::select! {
            biased;
            result = async {
                target.prepare(submission).await?;
                target.submit(submission).await
            } => result,
            _ = self.cancel.cancelled() => Err(BridgeError::Cancelled),
        }
    }
}
