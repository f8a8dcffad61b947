use crate::domain::money::Money;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CommerceError>;

/// Coarse classification of [`CommerceError`], stable enough for callers to map
/// onto transport-level responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    Inactive,
    InsufficientStock,
    CurrencyMismatch,
    AmountMismatch,
    InvalidTransition,
    InvalidState,
    Conflict,
    Internal,
}

#[derive(Error, Debug)]
pub enum CommerceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Inactive(String),
    #[error("Insufficient stock for SKU {sku} (requested {requested}, available {available})")]
    InsufficientStock {
        sku: String,
        requested: u32,
        available: u32,
    },
    #[error("{0}")]
    CurrencyMismatch(String),
    #[error("Amount mismatch (expected {expected}, provided {provided})")]
    AmountMismatch { expected: Money, provided: Money },
    #[error("{0}")]
    InvalidTransition(String),
    #[error("{0}")]
    InvalidState(String),
    #[error("Concurrent update conflict: {0}")]
    Conflict(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    Storage(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CommerceError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::Inactive(_) => ErrorKind::Inactive,
            Self::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            Self::CurrencyMismatch(_) => ErrorKind::CurrencyMismatch,
            Self::AmountMismatch { .. } => ErrorKind::AmountMismatch,
            Self::InvalidTransition(_) => ErrorKind::InvalidTransition,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::Conflict(_) => ErrorKind::Conflict,
            // Malformed input files surface as bad arguments to the caller.
            Self::CsvError(_) | Self::Serialization(_) => ErrorKind::InvalidArgument,
            Self::IoError(_) | Self::Internal(_) => ErrorKind::Internal,
            #[cfg(feature = "storage-rocksdb")]
            Self::Storage(_) => ErrorKind::Internal,
        }
    }
}

/// Rejects empty or whitespace-only identifiers.
pub(crate) fn require_non_blank(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(CommerceError::InvalidArgument(format!("{field} is required")))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_stock_message_names_sku_and_quantities() {
        let err = CommerceError::InsufficientStock {
            sku: "SKU-1".to_string(),
            requested: 5,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for SKU SKU-1 (requested 5, available 2)"
        );
        assert_eq!(err.kind(), ErrorKind::InsufficientStock);
    }

    #[test]
    fn test_amount_mismatch_kind() {
        let err = CommerceError::AmountMismatch {
            expected: Money::new(dec!(39.98)),
            provided: Money::new(dec!(40)),
        };
        assert_eq!(err.kind(), ErrorKind::AmountMismatch);
        assert!(err.to_string().contains("39.98"));
        assert!(err.to_string().contains("40.00"));
    }

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("abc", "sku").is_ok());
        assert!(matches!(
            require_non_blank("   ", "sku"),
            Err(CommerceError::InvalidArgument(msg)) if msg == "sku is required"
        ));
    }
}
