use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VenueId {
    Bitget,
    Kucoin,
    Custom(String),
}

impl VenueId {
    pub fn slug(&self) -> &str {
        match self {
            VenueId::Bitget => "bitget",
            VenueId::Kucoin => "kucoin",
            VenueId::Custom(name) => name,
        }
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl From<&str> for VenueId {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "bitget" => VenueId::Bitget,
            "kucoin" => VenueId::Kucoin,
            name => VenueId::Custom(name.to_string()),
        }
    }
}

/// Stable one-way identifier of a [`Credential`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionHash(String);

impl ConnectionHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// API credentials for one connected venue account. Immutable once built.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    venue: VenueId,
    access_key: String,
    secret_key: String,
    passphrase: Option<String>,
    public_only: bool,
}

impl Credential {
    pub fn new(
        venue: VenueId,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        passphrase: Option<String>,
    ) -> Self {
        Self {
            venue,
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            passphrase,
            public_only: false,
        }
    }

    /// Credential that may only reach public endpoints.
    pub fn public(venue: VenueId) -> Self {
        Self {
            venue,
            access_key: String::new(),
            secret_key: String::new(),
            passphrase: None,
            public_only: true,
        }
    }

    pub fn venue(&self) -> &VenueId {
        &self.venue
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }

    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_deref()
    }

    pub fn is_public_only(&self) -> bool {
        self.public_only
    }

    pub fn connection_hash(&self) -> ConnectionHash {
        let mut hasher = Sha256::new();
        for field in [
            self.venue.slug(),
            self.access_key.as_str(),
            self.secret_key.as_str(),
            self.passphrase.as_deref().unwrap_or_default(),
            if self.public_only { "public" } else { "private" },
        ] {
            hasher.update(field.as_bytes());
            // unit separator keeps ("ab","c") and ("a","bc") apart
            hasher.update([0x1f]);
        }
        ConnectionHash(hex::encode(hasher.finalize()))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("venue", &self.venue)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("public_only", &self.public_only)
            .finish()
    }
}

/// Quota for one venue endpoint, enforced per credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointLimit {
    pub path: String,
    pub method: String,
    pub max_calls: u32,
    #[serde(with = "window_ms")]
    pub window: Duration,
}

impl EndpointLimit {
    pub fn new(method: &str, path: &str, max_calls: u32, window: Duration) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_uppercase(),
            max_calls,
            window,
        }
    }
}

mod window_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(window: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(window.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub currency: String,
    pub amount: Decimal,
    pub amount_usd: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositAddress {
    pub currency_id: String,
    pub ticker: String,
    pub chain: String,
    pub address: String,
    pub tag: Option<String>,
}

/// Internal currency identity as known to Storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyMapping {
    pub currency_id: String,
    pub ticker: String,
    pub chain: String,
}
