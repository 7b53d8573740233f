// ⚠️ Error kinds surfaced to callers of the donation ledger

use thiserror::Error;

/// Every failure a caller can observe. None of these are retried internally;
/// an error always means the operation did not take effect.
#[derive(Debug, Error)]
pub enum FoodError {
    #[error("provider {0} does not exist")]
    UnknownProvider(i64),

    #[error("receiver {0} does not exist")]
    UnknownReceiver(i64),

    #[error("food listing {0} is not claimable (already claimed or expired)")]
    NotClaimable(i64),

    #[error("invalid {field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] rusqlite::Error),

    #[error("failed to encode report: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl FoodError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        FoodError::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Stable kind name, suitable for API payloads and exit messages
    pub fn kind(&self) -> &'static str {
        match self {
            FoodError::UnknownProvider(_) => "UnknownProvider",
            FoodError::UnknownReceiver(_) => "UnknownReceiver",
            FoodError::NotClaimable(_) => "NotClaimable",
            FoodError::InvalidInput { .. } => "InvalidInput",
            FoodError::StoreUnavailable(_) => "StoreUnavailable",
            FoodError::Encoding(_) => "Encoding",
        }
    }
}

pub type FoodResult<T> = Result<T, FoodError>;

/// Error returned when a stored or user-supplied string names no enum variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(FoodError::NotClaimable(3).kind(), "NotClaimable");
        assert_eq!(FoodError::invalid("quantity", "must be positive").kind(), "InvalidInput");
        assert_eq!(
            FoodError::invalid("quantity", "must be positive").to_string(),
            "invalid quantity: must be positive"
        );
    }
}
