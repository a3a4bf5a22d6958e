//! Cache error type

use thiserror::Error;

use crate::error::{CommonError, ErrorSeverity};

/// Result alias for cache and storage operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors raised by cache storage adapters and media
///
/// The cache absorbs these (logging them) so that reads and writes never fail
/// because of persistence; they surface only from adapter and medium APIs.
#[derive(Debug, Error)]
pub enum CacheError {
    /// An entry could not be encoded or decoded
    #[error("cache entry '{key}' could not be serialized: {message}")]
    Serialization { key: String, message: String },

    /// The backing medium rejected an operation (quota, I/O, SQL)
    #[error("storage {operation} failed: {message}")]
    Storage { operation: String, message: String },

    /// The backing medium cannot be used at all
    #[error("storage medium unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Common(#[from] CommonError),
}

impl CacheError {
    /// Create a storage error for `operation`
    pub fn storage(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage { operation: operation.into(), message: message.into() }
    }

    /// Create a serialization error for the entry under `key`
    pub fn serialization(key: impl Into<String>, err: &serde_json::Error) -> Self {
        Self::Serialization { key: key.into(), message: err.to_string() }
    }
}

crate::impl_error_classification!(CacheError, Common,
    Self::Serialization { .. } => {
        retryable: false,
        severity: ErrorSeverity::Error,
    },
    Self::Storage { .. } => {
        retryable: true,
        severity: ErrorSeverity::Warning,
    },
    Self::Unavailable(_) => {
        retryable: false,
        severity: ErrorSeverity::Error,
    }
);

#[cfg(test)]
mod tests {
    //! Unit tests for cache::error.
    use super::*;
    use crate::error::ErrorClassification;

    /// Validates `CacheError::storage` display and classification.
    ///
    /// Assertions:
    /// - Confirms the message names the operation.
    /// - Ensures storage failures are retryable warnings.
    #[test]
    fn test_storage_error() {
        let err = CacheError::storage("save", "quota exceeded");
        assert_eq!(err.to_string(), "storage save failed: quota exceeded");
        assert!(err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Warning);
    }

    /// Validates `CacheError::serialization` wraps the serde message.
    #[test]
    fn test_serialization_error() {
        let json_err = serde_json::from_str::<u32>("\"nope\"").unwrap_err();
        let err = CacheError::serialization("anime:1", &json_err);

        assert!(err.to_string().starts_with("cache entry 'anime:1' could not be serialized"));
        assert!(!err.is_retryable());
    }

    /// Validates that an embedded `CommonError` keeps its classification.
    #[test]
    fn test_common_delegation() {
        let err = CacheError::from(CommonError::validation("max_size", "zero"));
        assert!(!err.is_retryable());
        assert_eq!(err.severity(), ErrorSeverity::Error);
        assert_eq!(CacheError::Unavailable("offline".into()).severity(), ErrorSeverity::Error);
    }
}
