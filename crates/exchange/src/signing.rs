//! Canonical request construction and HMAC signing.
//!
//! The signed payload is `timestamp ∥ METHOD ∥ path [∥ "?" ∥ query] ∥ body`
//! and the signature is `base64(HMAC-SHA256(payload, secret))`.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use url::form_urlencoded;

use venuebridge_core::{BridgeError, Result};

/// Query string with keys sorted ascending. The sort is stable, so repeated
/// keys keep the order their values were given in.
pub fn canonical_query(params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in sorted {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// JSON body, or the empty string when there is nothing to send.
pub fn canonical_body(body: Option<&Value>) -> Result<String> {
    match body {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::Object(map)) if map.is_empty() => Ok(String::new()),
        Some(value) => serde_json::to_string(value).map_err(BridgeError::Json),
    }
}

/// Ephemeral signing input for one call. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub timestamp: String,
    pub method: String,
    pub canonical_path: String,
    pub canonical_query: String,
    pub body: String,
}

impl SignedRequest {
    pub fn new(
        timestamp: impl Into<String>,
        method: &str,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Self> {
        Ok(Self {
            timestamp: timestamp.into(),
            method: method.to_uppercase(),
            canonical_path: path.to_string(),
            canonical_query: canonical_query(query),
            body: canonical_body(body)?,
        })
    }

    /// Path plus query, as it appears on the wire.
    pub fn request_path(&self) -> String {
        if self.canonical_query.is_empty() {
            self.canonical_path.clone()
        } else {
            format!("{}?{}", self.canonical_path, self.canonical_query)
        }
    }

    pub fn payload(&self) -> String {
        format!("{}{}{}{}", self.timestamp, self.method, self.request_path(), self.body)
    }

    pub fn sign(&self, secret: &str) -> Result<String> {
        hmac_sha256_base64(secret, &self.payload())
    }
}

pub fn hmac_sha256_base64(secret: &str, message: &str) -> Result<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|e| BridgeError::Credential(format!("Invalid secret key: {}", e)))?;
    mac.update(message.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}
