use uuid::Uuid;

/// Namespace for every client id this crate sends to a venue.
const CLIENT_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a9e_83d4_4b7a_9c55_0e2d_71b3_c8f4);

/// Purpose of an outbound client id. Part of the derivation so that a
/// withdrawal and a transfer sharing a correlation id never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientIdPurpose {
    Withdrawal,
    SpotOrder,
    InternalTransfer,
}

impl ClientIdPurpose {
    fn tag(self) -> &'static str {
        match self {
            ClientIdPurpose::Withdrawal => "withdrawal",
            ClientIdPurpose::SpotOrder => "spot",
            ClientIdPurpose::InternalTransfer => "transfer",
        }
    }
}

/// Derives idempotent client ids from a caller correlation id.
///
/// The same `(correlation_id, purpose, attempt)` always yields the same id, so a
/// resubmitted call is deduplicated venue-side. Without a correlation id a
/// random id is generated once and reused for every attempt of that call.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
}

impl IdGenerator {
    pub fn new(correlation_id: Option<&str>) -> Self {
        let seed = match correlation_id {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => Uuid::new_v4().to_string(),
        };
        Self { seed }
    }

    pub fn client_order_id(&self, purpose: ClientIdPurpose, attempt: u32) -> String {
        let name = format!("{}:{}:{}", purpose.tag(), self.seed, attempt);
        Uuid::new_v5(&CLIENT_ID_NAMESPACE, name.as_bytes())
            .simple()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_correlation_same_id() {
        let a = IdGenerator::new(Some("payout-42"));
        let b = IdGenerator::new(Some("payout-42"));
        assert_eq!(
            a.client_order_id(ClientIdPurpose::Withdrawal, 0),
            b.client_order_id(ClientIdPurpose::Withdrawal, 0)
        );
        assert_eq!(a.client_order_id(ClientIdPurpose::SpotOrder, 0).len(), 32);
    }

    #[test]
    fn test_attempts_and_purposes_differ() {
        let generator = IdGenerator::new(Some("payout-42"));
        let first = generator.client_order_id(ClientIdPurpose::Withdrawal, 0);
        let second = generator.client_order_id(ClientIdPurpose::Withdrawal, 1);
        let transfer = generator.client_order_id(ClientIdPurpose::InternalTransfer, 0);
        assert_ne!(first, second);
        assert_ne!(first, transfer);
    }

    #[test]
    fn test_missing_correlation_is_random_but_stable_per_generator() {
        let generator = IdGenerator::new(None);
        assert_eq!(
            generator.client_order_id(ClientIdPurpose::SpotOrder, 0),
            generator.client_order_id(ClientIdPurpose::SpotOrder, 0)
        );
        let other = IdGenerator::new(Some("  "));
        assert_ne!(
            generator.client_order_id(ClientIdPurpose::SpotOrder, 0),
            other.client_order_id(ClientIdPurpose::SpotOrder, 0)
        );
    }
}
