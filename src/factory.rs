use std::sync::Arc;
use tracing::info;

use venuebridge_bitget::BitgetAdapter;
use venuebridge_core::config::BridgeConfig;
use venuebridge_core::{BridgeError, Converter, Credential, Result, Storage, VenueId};
use venuebridge_exchange::{RateLimiterRegistry, VenueAdapter};
use venuebridge_kucoin::KucoinAdapter;

/// Builds venue adapters that share collaborators and one rate limiter registry.
///
/// Adapters built from the same credential therefore draw from the same quota
/// buckets, however many of them are alive.
pub struct VenueFactory {
    config: BridgeConfig,
    storage: Arc<dyn Storage>,
    converter: Arc<dyn Converter>,
    limiter: Arc<RateLimiterRegistry>,
}

impl VenueFactory {
    pub fn new(config: BridgeConfig, storage: Arc<dyn Storage>, converter: Arc<dyn Converter>) -> Self {
        Self {
            config,
            storage,
            converter,
            limiter: Arc::new(RateLimiterRegistry::new()),
        }
    }

    pub fn with_registry(mut self, limiter: Arc<RateLimiterRegistry>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn limiter(&self) -> &Arc<RateLimiterRegistry> {
        &self.limiter
    }

    /// Adapter for the credential's venue.
    pub fn build(&self, credential: Credential) -> Result<Arc<dyn VenueAdapter>> {
        let venue = credential.venue().clone();
        let adapter: Arc<dyn VenueAdapter> = match venue {
            VenueId::Bitget => Arc::new(BitgetAdapter::with_registry(
                credential,
                self.storage.clone(),
                self.converter.clone(),
                &self.config,
                self.limiter.clone(),
            )?),
            VenueId::Kucoin => Arc::new(KucoinAdapter::with_registry(
                credential,
                self.storage.clone(),
                self.converter.clone(),
                &self.config,
                self.limiter.clone(),
            )?),
            VenueId::Custom(name) => {
                return Err(BridgeError::InvalidData(format!("unsupported venue {}", name)));
            }
        };

        info!(venue = %adapter.venue_id(), connection = %adapter.connection_hash(), "Venue adapter configured");
        Ok(adapter)
    }

    /// Adapter for a venue named by slug, e.g. from a stored connection row.
    pub fn build_for(
        &self,
        slug: &str,
        access_key: &str,
        secret_key: &str,
        passphrase: Option<String>,
    ) -> Result<Arc<dyn VenueAdapter>> {
        let venue = VenueId::from(slug.to_lowercase().as_str());
        self.build(Credential::new(venue, access_key, secret_key, passphrase))
    }
}
