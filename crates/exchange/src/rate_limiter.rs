use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use venuebridge_core::{BridgeError, ConnectionHash, EndpointLimit, Result, VenueId};

/// Slack added after a window resets before the caller tries again.
pub const RESET_EPSILON: Duration = Duration::from_millis(25);

/// Quota isolation key. Two credentials on the same endpoint never share a window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LimiterKey {
    pub venue: VenueId,
    pub method: String,
    pub path: String,
    pub credential: ConnectionHash,
}

impl LimiterKey {
    pub fn new(venue: VenueId, limit: &EndpointLimit, credential: ConnectionHash) -> Self {
        Self {
            venue,
            method: limit.method.clone(),
            path: limit.path.clone(),
            credential,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitStatus {
    pub reached: bool,
    pub reset_at: Instant,
}

#[derive(Debug)]
struct FixedWindow {
    max_calls: u32,
    window: Duration,
    started_at: Instant,
    calls: u32,
}

impl FixedWindow {
    fn new(limit: &EndpointLimit, now: Instant) -> Self {
        Self {
            max_calls: limit.max_calls,
            window: limit.window,
            started_at: now,
            calls: 0,
        }
    }

    fn admit(&mut self, now: Instant) -> LimitStatus {
        if now.duration_since(self.started_at) >= self.window {
            self.started_at = now;
            self.calls = 0;
        }

        let reset_at = self.started_at + self.window;

        // A zero quota means the endpoint is not limited.
        if self.max_calls == 0 || self.calls < self.max_calls {
            self.calls += 1;
            return LimitStatus { reached: false, reset_at };
        }

        LimitStatus { reached: true, reset_at }
    }
}

/// Fixed-window admission control, one window per [`LimiterKey`].
///
/// A registry is owned by an adapter, or by a factory that shares it across
/// adapters, and passed explicitly to each transport.
/// `get` both checks and consumes a slot, so a `reached == false` answer is an
/// admission.
#[derive(Debug, Default)]
pub struct RateLimiterRegistry {
    windows: Mutex<HashMap<LimiterKey, FixedWindow>>,
}

impl RateLimiterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &LimiterKey, limit: &EndpointLimit) -> LimitStatus {
        let now = Instant::now();
        let mut windows = self.windows.lock();
        windows
            .entry(key.clone())
            .or_insert_with(|| FixedWindow::new(limit, now))
            .admit(now)
    }

    /// Blocks until the key admits one call, or the token is cancelled.
    pub async fn wait(&self, key: &LimiterKey, limit: &EndpointLimit, cancel: &CancellationToken) -> Result<()> {
        loop {
            if cancel.is_cancelled() {
                return Err(BridgeError::Cancelled);
            }

            let status = self.get(key, limit);
            if !status.reached {
                return Ok(());
            }

            debug!(
                venue = %key.venue,
                method = %key.method,
                path = %key.path,
                "Rate limit reached, waiting for window reset"
            );

            tokio::select! {
                _ = cancel.cancelled() => return Err(BridgeError::Cancelled),
                _ = sleep_until(status.reset_at + RESET_EPSILON) => {}
            }
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.windows.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use venuebridge_core::Credential;

    fn key(access_key: &str) -> LimiterKey {
        let credential = Credential::new(VenueId::Bitget, access_key, "secret", Some("pass".to_string()));
        LimiterKey::new(VenueId::Bitget, &limit(), credential.connection_hash())
    }

    fn limit() -> EndpointLimit {
        EndpointLimit::new("GET", "/api/v2/spot/account/assets", 2, Duration::from_millis(100))
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_admits_up_to_max_calls() {
        let registry = RateLimiterRegistry::new();
        let key = key("alice");

        assert!(!registry.get(&key, &limit()).reached);
        assert!(!registry.get(&key, &limit()).reached);

        let status = registry.get(&key, &limit());
        assert!(status.reached);
        assert!(status.reset_at > Instant::now());

        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(!registry.get(&key, &limit()).reached);
    }

    #[tokio::test(start_paused = true)]
    async fn test_credentials_are_isolated() {
        let registry = RateLimiterRegistry::new();
        let alice = key("alice");
        let bob = key("bob");

        registry.get(&alice, &limit());
        registry.get(&alice, &limit());
        assert!(registry.get(&alice, &limit()).reached);
        assert!(!registry.get(&bob, &limit()).reached);
        assert_eq!(registry.bucket_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_blocks_until_reset() {
        let registry = RateLimiterRegistry::new();
        let key = key("alice");
        let cancel = CancellationToken::new();
        let started = Instant::now();

        for _ in 0..3 {
            registry.wait(&key, &limit(), &cancel).await.unwrap();
        }

        assert!(started.elapsed() >= Duration::from_millis(100));
        assert_eq!(registry.bucket_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_on_cancellation() {
        let registry = RateLimiterRegistry::new();
        let key = key("alice");
        let cancel = CancellationToken::new();
        let slow = EndpointLimit::new("GET", "/slow", 1, Duration::from_secs(3600));

        registry.wait(&key, &slow, &cancel).await.unwrap();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result = registry.wait(&key, &slow, &cancel).await;
        assert!(matches!(result, Err(BridgeError::Cancelled)));
    }

    #[tokio::test]
    async fn test_zero_quota_is_unlimited() {
        let registry = RateLimiterRegistry::new();
        let open = EndpointLimit::new("GET", "/open", 0, Duration::from_secs(1));
        let key = key("alice");
        for _ in 0..50 {
            assert!(!registry.get(&key, &open).reached);
        }
    }
}
