//! Error types for the `rpcsensor-models` crate.
//!
//! Absent wire fields are never an error: they decode to the documented
//! default. Every variant of [`ModelError`] therefore describes something
//! that *is* on the wire but cannot be understood.

/// Errors produced when encoding or decoding protocol messages.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A field was present but had the wrong shape (e.g. text where a
    /// number was expected, a 4-element attitude matrix, an unknown enum
    /// ordinal).
    #[error("malformed {what}: {source}")]
    Malformed {
        /// The wire type or procedure being decoded.
        what: &'static str,
        /// The underlying serde error, which names the offending field.
        #[source]
        source: serde_json::Error,
    },

    /// A native value could not be turned into its wire form.
    #[error("failed to encode {what}: {source}")]
    Encode {
        /// The wire type being encoded.
        what: &'static str,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// A range specification carried a type tag this peer does not know.
    #[error("unknown range specification type {0}")]
    UnknownRangeType(u8),

    /// A fixed-circle range carried a radius that is not a number.
    #[error("range radius must be a number, got {0}")]
    InvalidRadius(serde_json::Value),

    /// A call named a procedure that is not in the catalog.
    #[error("unknown procedure \"{0}\"")]
    UnknownProcedure(String),

    /// A call carried the wrong number of arguments.
    #[error("{procedure} expects {expected} argument(s), got {found}")]
    ArgumentCount {
        /// The procedure name.
        procedure: &'static str,
        /// Number of arguments the catalog declares.
        expected: usize,
        /// Number of arguments received.
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unknown_procedure() {
        let err = ModelError::UnknownProcedure("updateWeather".into());
        assert_eq!(err.to_string(), "unknown procedure \"updateWeather\"");
    }

    #[test]
    fn error_display_argument_count() {
        let err = ModelError::ArgumentCount {
            procedure: "updateSensorData",
            expected: 1,
            found: 0,
        };
        assert_eq!(
            err.to_string(),
            "updateSensorData expects 1 argument(s), got 0"
        );
    }

    #[test]
    fn error_display_range() {
        assert_eq!(
            ModelError::UnknownRangeType(7).to_string(),
            "unknown range specification type 7"
        );
        assert_eq!(
            ModelError::InvalidRadius(serde_json::json!("far")).to_string(),
            "range radius must be a number, got \"far\""
        );
    }

    #[test]
    fn error_display_malformed_names_field() {
        let source = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err = ModelError::Malformed {
            what: "RemoteSensorData",
            source,
        };
        assert!(err.to_string().starts_with("malformed RemoteSensorData: "));
    }
}
