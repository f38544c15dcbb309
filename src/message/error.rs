//! Error types for payload decoding.

use thiserror::Error;

/// Errors raised while turning a daemon payload into model records.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body is not valid JSON or does not match the expected shape.
    #[error("malformed {payload} payload: {source}")]
    Json {
        /// Which payload was being decoded.
        payload: &'static str,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// A required member or row field is absent.
    #[error("{payload} payload is missing {field}")]
    MissingField {
        /// Which payload was being decoded.
        payload: &'static str,
        /// Name or position of the missing field.
        field: String,
    },

    /// A field is present but has the wrong JSON type.
    #[error("{payload} payload field {field} is not {expected}")]
    InvalidField {
        /// Which payload was being decoded.
        payload: &'static str,
        /// Name or position of the field.
        field: String,
        /// Expected JSON type.
        expected: &'static str,
    },
}

impl DecodeError {
    /// Creates a `Json` error for `payload`.
    #[must_use]
    pub fn json(payload: &'static str, source: serde_json::Error) -> Self {
        Self::Json { payload, source }
    }

    /// Creates a `MissingField` error.
    #[must_use]
    pub fn missing(payload: &'static str, field: impl Into<String>) -> Self {
        Self::MissingField {
            payload,
            field: field.into(),
        }
    }

    /// Creates an `InvalidField` error.
    #[must_use]
    pub fn invalid(
        payload: &'static str,
        field: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::InvalidField {
            payload,
            field: field.into(),
            expected,
        }
    }
}
