//! The reserved "not available" value.
//!
//! On the wire, every field documented as "or invalid" carries
//! [`INVALID_VALUE`] when no reading exists. Natively those fields are
//! `Option`s; the adapters in [`real`] and [`integer`] convert at the serde
//! boundary so the sentinel never leaks into application code.
//!
//! The sentinel may have passed through a floating point representation, so
//! it is recognised with a tolerance rather than by exact equality.
//!
//! ```
//! use rpcsensor_models::sentinel;
//!
//! assert!(sentinel::is_invalid(-100000.0));
//! assert!(sentinel::is_invalid(-100000.004));
//! assert_eq!(sentinel::from_wire(-100000.0), None);
//! assert_eq!(sentinel::from_wire(12.5), Some(12.5));
//! assert_eq!(sentinel::to_wire(None), -100000.0);
//! ```

/// Reserved value meaning "field not available".
pub const INVALID_VALUE: i32 = -100_000;

const TOLERANCE: f64 = 0.01;

/// Returns `true` if `value` is the sentinel, within a small tolerance.
pub fn is_invalid(value: f64) -> bool {
    (value - f64::from(INVALID_VALUE)).abs() < TOLERANCE
}

/// Convert a wire real into an optional native value.
pub fn from_wire(value: f64) -> Option<f64> {
    if is_invalid(value) { None } else { Some(value) }
}

/// Convert an optional native real into its wire value.
pub fn to_wire(value: Option<f64>) -> f64 {
    value.unwrap_or(f64::from(INVALID_VALUE))
}

/// Serde adapter for `Option<f64>` fields encoded with the sentinel.
///
/// Use as `#[serde(with = "crate::sentinel::real")]`.
pub mod real {
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize `None` as the sentinel.
    #[allow(clippy::ref_option, clippy::trivially_copy_pass_by_ref)] // signature fixed by serde
    pub fn serialize<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(super::to_wire(*value))
    }

    /// Deserialize a number, mapping the sentinel to `None`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let v = f64::deserialize(deserializer)?;
        Ok(super::from_wire(v))
    }
}

/// Serde adapter for `Option<i32>` fields encoded with the sentinel.
///
/// Whole-number doubles (`3000.0`) are accepted on input, like every other
/// integer field (see [`crate::whole`]).
pub mod integer {
    use serde::de::{Error, Unexpected};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize `None` as the sentinel.
    #[allow(clippy::ref_option, clippy::trivially_copy_pass_by_ref)] // signature fixed by serde
    pub fn serialize<S: Serializer>(value: &Option<i32>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i32(value.unwrap_or(super::INVALID_VALUE))
    }

    /// Deserialize an integral number, mapping the sentinel to `None`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i32>, D::Error> {
        let v = f64::deserialize(deserializer)?;
        if super::is_invalid(v) {
            return Ok(None);
        }
        crate::whole::from_f64(v)
            .map(Some)
            .ok_or_else(|| D::Error::invalid_value(Unexpected::Float(v), &"a 32-bit integer"))
    }
}
