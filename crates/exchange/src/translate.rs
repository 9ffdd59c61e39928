use venuebridge_core::{BridgeError, ErrorKind};

/// Static mapping from vendor error codes into the shared taxonomy.
///
/// Codes are matched first. Message fragments are a fallback for venues that
/// reuse one generic code for several conditions.
#[derive(Debug, Clone, Copy)]
pub struct ErrorTable {
    pub codes: &'static [(&'static str, ErrorKind)],
    pub message_fragments: &'static [(&'static str, ErrorKind)],
}

impl ErrorTable {
    pub const fn new(
        codes: &'static [(&'static str, ErrorKind)],
        message_fragments: &'static [(&'static str, ErrorKind)],
    ) -> Self {
        Self { codes, message_fragments }
    }

    pub fn lookup(&self, code: &str, message: &str) -> Option<ErrorKind> {
        if let Some((_, kind)) = self.codes.iter().find(|(c, _)| *c == code) {
            return Some(*kind);
        }

        let message = message.to_lowercase();
        self.message_fragments
            .iter()
            .find(|(fragment, _)| message.contains(&fragment.to_lowercase()))
            .map(|(_, kind)| *kind)
    }

    /// Unmapped codes keep the raw vendor code and message.
    pub fn translate(&self, code: &str, message: &str) -> BridgeError {
        match self.lookup(code, message) {
            Some(kind) => BridgeError::from_kind(kind, code, message),
            None => BridgeError::UnknownVenue {
                code: code.to_string(),
                message: message.to_string(),
            },
        }
    }
}
