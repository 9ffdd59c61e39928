use venuebridge_core::ErrorKind;
use venuebridge_exchange::ErrorTable;

/// Bitget v2 error codes. Withdrawal holds share generic codes, so they are
/// matched on the message.
pub static BITGET_ERRORS: ErrorTable = ErrorTable::new(
    &[
        ("40002", ErrorKind::CredentialError),
        ("40006", ErrorKind::CredentialError),
        ("40009", ErrorKind::CredentialError),
        ("40011", ErrorKind::CredentialError),
        ("40012", ErrorKind::CredentialError),
        ("40037", ErrorKind::CredentialError),
        ("40014", ErrorKind::PermissionError),
        ("40068", ErrorKind::PermissionError),
        ("40018", ErrorKind::IpWhitelistError),
        ("40762", ErrorKind::InsufficientBalance),
        ("43012", ErrorKind::InsufficientBalance),
        ("43009", ErrorKind::MinimumNotMet),
        ("45110", ErrorKind::MinimumNotMet),
        ("40034", ErrorKind::SymbolUnavailable),
        ("40309", ErrorKind::SymbolUnavailable),
        ("43117", ErrorKind::BalanceLocked),
        ("47003", ErrorKind::TemporaryLock),
    ],
    &[
        ("temporarily frozen", ErrorKind::BalanceLocked),
        ("funds are locked", ErrorKind::BalanceLocked),
        ("risk control", ErrorKind::TemporaryLock),
        ("withdrawal is suspended", ErrorKind::TemporaryLock),
    ],
);
