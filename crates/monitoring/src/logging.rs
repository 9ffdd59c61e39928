use std::path::Path;
use rust_decimal::Decimal;
use tracing::{info, warn};
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
};

use venuebridge_core::config::LoggingConfig;
use venuebridge_core::{BridgeError, Result};

pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Installs the global subscriber. Keep the returned guard alive for the
/// lifetime of the process, or buffered file output is lost.
pub fn setup_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let mut layers = Vec::new();
    let mut guard = None;

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    if config.enable_json {
        layers.push(console_layer.json().boxed());
    } else {
        layers.push(console_layer.boxed());
    }

    if let Some(log_file) = &config.file {
        let log_path = Path::new(log_file);
        let directory = log_path.parent().unwrap_or_else(|| Path::new("."));

        std::fs::create_dir_all(directory)
            .map_err(|e| BridgeError::Internal(format!("Failed to create log directory: {}", e)))?;

        let file_name = log_path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("venuebridge.log"));
        let (writer, file_guard) = non_blocking(rolling::daily(directory, file_name));
        guard = Some(file_guard);

        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true);

        if config.enable_json {
            layers.push(file_layer.json().boxed());
        } else {
            layers.push(file_layer.boxed());
        }
    }

    tracing_subscriber::registry()
        .with(build_filter(config))
        .with(layers)
        .try_init()
        .map_err(|e| BridgeError::Internal(format!("Failed to install subscriber: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);

    Ok(guard)
}

/// Write-only audit trail of fund movements and balance observations.
#[derive(Debug, Clone)]
pub struct AuditLogger {
    venue: String,
}

impl AuditLogger {
    pub fn new(venue: &str) -> Self {
        Self {
            venue: venue.to_string(),
        }
    }

    pub fn withdrawal_assembled(&self, currency: &str, chain: &str, amount: Decimal, fee: Decimal, correlation_id: Option<&str>) {
        info!(
            venue = %self.venue,
            event = "withdrawal_assembled",
            currency = %currency,
            chain = %chain,
            amount = %amount,
            fee = %fee,
            correlation_id = ?correlation_id,
            "Withdrawal request assembled"
        );
    }

    pub fn withdrawal_retry(&self, attempt: u32, amount: Decimal, next_amount: Decimal, reason: &str) {
        warn!(
            venue = %self.venue,
            event = "withdrawal_retry",
            attempt = attempt,
            amount = %amount,
            next_amount = %next_amount,
            reason = %reason,
            "Withdrawal retry triggered"
        );
    }

    pub fn withdrawal_submitted(&self, internal_order_id: &str, external_order_id: &str, amount: Decimal) {
        info!(
            venue = %self.venue,
            event = "withdrawal_submitted",
            internal_order_id = %internal_order_id,
            external_order_id = %external_order_id,
            amount = %amount,
            "Withdrawal accepted by venue"
        );
    }

    pub fn balances_observed(&self, currencies: usize, total_usd: Decimal) {
        info!(
            venue = %self.venue,
            event = "balances_observed",
            currencies = currencies,
            total_usd = %total_usd,
            "Account balances observed"
        );
    }

    pub fn spot_order_submitted(&self, ticker: &str, side: &str, amount: Decimal, client_order_id: &str, exchange_order_id: &str) {
        info!(
            venue = %self.venue,
            event = "spot_order_submitted",
            ticker = %ticker,
            side = %side,
            amount = %amount,
            client_order_id = %client_order_id,
            exchange_order_id = %exchange_order_id,
            "Spot order submitted"
        );
    }

    pub fn internal_transfer(&self, currency: &str, from: &str, to: &str, amount: Decimal) {
        info!(
            venue = %self.venue,
            event = "internal_transfer",
            currency = %currency,
            from = %from,
            to = %to,
            amount = %amount,
            "Internal transfer between sub-accounts"
        );
    }

    pub fn venue_request(&self, endpoint: &str, method: &str, status_code: Option<u16>) {
        tracing::debug!(
            venue = %self.venue,
            event = "venue_request",
            endpoint = %endpoint,
            method = %method,
            status_code = ?status_code,
            "Venue API request"
        );
    }
}
