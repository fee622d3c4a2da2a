use thiserror::Error;

use crate::domain::product::ProductId;
use crate::snapshot::StoreError;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("no product with id `{0}`")]
    NotFound(ProductId),
    #[error("snapshot persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

impl LedgerError {
    /// Presentation-safe text. Hosts show this to the user; the full error
    /// stays in logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "That barcode is not valid. Enter a non-empty barcode.",
            Self::NotFound(_) => "That product no longer exists in the ledger.",
            Self::Persistence(_) => {
                "The change could not be saved and was not applied. Check storage and retry."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::LedgerError;
    use crate::domain::product::ProductId;

    #[test]
    fn not_found_message_names_the_id() {
        let error = LedgerError::NotFound(ProductId("abc-123".to_string()));
        assert_eq!(error.to_string(), "no product with id `abc-123`");
    }

    #[test]
    fn user_messages_do_not_expose_internals() {
        let error = LedgerError::InvalidInput("barcode must not be empty".to_string());
        assert!(!error.user_message().contains("must not be empty"));
    }
}
