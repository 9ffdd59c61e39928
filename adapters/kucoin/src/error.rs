use venuebridge_core::ErrorKind;
use venuebridge_exchange::ErrorTable;

/// KuCoin error codes. Frozen balances and withdrawal minimums come back as
/// generic `400100` parameter errors, so those are matched on the message.
pub static KUCOIN_ERRORS: ErrorTable = ErrorTable::new(
    &[
        ("400001", ErrorKind::CredentialError),
        ("400002", ErrorKind::CredentialError),
        ("400003", ErrorKind::CredentialError),
        ("400004", ErrorKind::CredentialError),
        ("400005", ErrorKind::CredentialError),
        ("400006", ErrorKind::IpWhitelistError),
        ("400007", ErrorKind::PermissionError),
        ("411100", ErrorKind::TemporaryLock),
        ("200004", ErrorKind::InsufficientBalance),
        ("900001", ErrorKind::SymbolUnavailable),
    ],
    &[
        ("temporarily frozen", ErrorKind::BalanceLocked),
        ("balance is locked", ErrorKind::BalanceLocked),
        ("less than the minimum", ErrorKind::MinimumNotMet),
        ("below the minimum", ErrorKind::MinimumNotMet),
        ("withdrawal is suspended", ErrorKind::TemporaryLock),
    ],
);

#[cfg(test)]
mod tests {
    use super::*;
    use venuebridge_core::BridgeError;

    #[test]
    fn test_known_codes() {
        assert_eq!(KUCOIN_ERRORS.lookup("400003", ""), Some(ErrorKind::CredentialError));
        assert_eq!(KUCOIN_ERRORS.lookup("400006", ""), Some(ErrorKind::IpWhitelistError));
        assert_eq!(KUCOIN_ERRORS.lookup("411100", ""), Some(ErrorKind::TemporaryLock));
    }

    #[test]
    fn test_parameter_error_classified_by_message() {
        let err = KUCOIN_ERRORS.translate("400100", "Withdrawal amount is less than the minimum");
        assert!(matches!(err, BridgeError::MinimumNotMet(_)));

        let err = KUCOIN_ERRORS.translate("400100", "Your balance is temporarily frozen");
        assert!(err.is_balance_locked());
    }

    #[test]
    fn test_unmapped_code() {
        let err = KUCOIN_ERRORS.translate("123456", "something new");
        assert!(matches!(err, BridgeError::UnknownVenue { .. }));
    }
}
