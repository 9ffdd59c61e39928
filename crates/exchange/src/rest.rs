use reqwest::{header, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use venuebridge_core::config::VenueConfig;
use venuebridge_core::{BridgeError, ConnectionHash, Credential, EndpointLimit, Result};
use venuebridge_monitoring::AuditLogger;

use crate::rate_limiter::{LimiterKey, RateLimiterRegistry};
use crate::signing::SignedRequest;
use crate::traits::VenueProfile;

/// One outbound call. `endpoint` names the quota bucket; `path` is what goes
/// on the wire and differs only for endpoints with ids in the path.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub endpoint: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub private: bool,
}

impl Request {
    pub fn new(method: Method, endpoint: &str) -> Self {
        Self {
            method,
            endpoint: endpoint.to_string(),
            path: endpoint.to_string(),
            query: Vec::new(),
            body: None,
            private: true,
        }
    }

    pub fn get(endpoint: &str) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: &str, body: Value) -> Self {
        Self::new(Method::POST, endpoint).body(body)
    }

    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn public(mut self) -> Self {
        self.private = false;
        self
    }
}

/// Signed, rate-limited transport shared by every venue variant.
///
/// No call is retried here. Retrying is a decision for the caller.
pub struct RestClient {
    client: Client,
    base_url: String,
    locale: String,
    credential: Credential,
    connection_hash: ConnectionHash,
    profile: Arc<dyn VenueProfile>,
    limits: Vec<EndpointLimit>,
    limiter: Arc<RateLimiterRegistry>,
    cancel: CancellationToken,
    audit: AuditLogger,
}

impl RestClient {
    pub fn new(
        profile: Arc<dyn VenueProfile>,
        credential: Credential,
        config: &VenueConfig,
        limiter: Arc<RateLimiterRegistry>,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(BridgeError::Http)?;

        let mut limits = profile.endpoint_limits();
        for custom in &config.endpoint_limits {
            limits.retain(|l| !(l.method == custom.method && l.path == custom.path));
            limits.push(custom.clone());
        }

        let audit = AuditLogger::new(profile.venue().slug());

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            locale: config.locale.clone(),
            connection_hash: credential.connection_hash(),
            credential,
            profile,
            limits,
            limiter,
            cancel,
            audit,
        })
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn connection_hash(&self) -> &ConnectionHash {
        &self.connection_hash
    }

    pub fn limiter(&self) -> &Arc<RateLimiterRegistry> {
        &self.limiter
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub async fn execute<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        if request.private && self.credential.is_public_only() {
            return Err(BridgeError::Credential(format!(
                "public-only credential cannot call {} {}",
                request.method, request.endpoint
            )));
        }

        let limit = self.limit_for(&request);
        let key = LimiterKey::new(self.profile.venue(), &limit, self.connection_hash.clone());
        self.limiter.wait(&key, &limit, &self.cancel).await?;

        let signed = SignedRequest::new(
            self.profile.timestamp(),
            request.method.as_str(),
            &request.path,
            &request.query,
            request.body.as_ref(),
        )?;

        let url = format!("{}{}", self.base_url, signed.request_path());
        debug!("{} {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .header(header::CONTENT_TYPE, "application/json");

        if request.private {
            for (name, value) in self.profile.auth_headers(&self.credential, &signed, &self.locale)? {
                builder = builder.header(name, value);
            }
        }

        if !signed.body.is_empty() {
            builder = builder.body(signed.body.clone());
        }

        let response = tokio::select! {
            _ = self.cancel.cancelled() => return Err(BridgeError::Cancelled),
            response = builder.send() => response.map_err(BridgeError::Http)?,
        };

        let status = response.status();
        self.audit
            .venue_request(&request.endpoint, request.method.as_str(), Some(status.as_u16()));

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(endpoint = %request.endpoint, "Venue rejected request with 429");
            return Err(BridgeError::RateLimit(format!(
                "{} {} rejected by venue",
                request.method, request.endpoint
            )));
        }

        let text = response.text().await.map_err(BridgeError::Http)?;
        self.decode(status, &text)
    }

    fn limit_for(&self, request: &Request) -> EndpointLimit {
        let method = request.method.as_str();
        self.limits
            .iter()
            .find(|l| l.method == method && l.path == request.endpoint)
            .cloned()
            .unwrap_or_else(|| {
                let (max_calls, window) = self.profile.default_quota();
                EndpointLimit::new(method, &request.endpoint, max_calls, window)
            })
    }

    /// Unwraps the `{code, msg, data}` envelope both venues use.
    fn decode<T: DeserializeOwned>(&self, status: StatusCode, text: &str) -> Result<T> {
        let envelope: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) if status.is_success() => return Err(BridgeError::Json(e)),
            Err(_) => {
                return Err(BridgeError::UnknownVenue {
                    code: status.as_u16().to_string(),
                    message: text.to_string(),
                })
            }
        };

        let code = match envelope.get("code") {
            Some(Value::String(code)) => code.clone(),
            Some(Value::Number(code)) => code.to_string(),
            _ => String::new(),
        };

        if code == self.profile.success_code() || (code.is_empty() && status.is_success()) {
            let data = envelope.get("data").cloned().unwrap_or(Value::Null);
            return serde_json::from_value(data).map_err(BridgeError::Json);
        }

        let message = envelope
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or(text)
            .to_string();
        let code = if code.is_empty() { status.as_u16().to_string() } else { code };

        Err(self.profile.error_table().translate(&code, &message))
    }
}
