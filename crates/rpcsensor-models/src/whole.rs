//! Integer fields on the wire.
//!
//! Peers may carry every number as a double, so an integer field accepts
//! both `3` and `3.0`. Fractions, out-of-range values and non-numbers
//! remain shape errors.
//!
//! ```
//! use rpcsensor_models::whole;
//!
//! assert_eq!(whole::from_f64::<u32>(1234.0), Some(1234));
//! assert_eq!(whole::from_f64::<u32>(-1.0), None);
//! assert_eq!(whole::from_f64::<u8>(1.5), None);
//! ```

use serde::de::{Error, Unexpected};
use serde::{Deserialize, Deserializer};

/// Largest magnitude up to which every integer is exactly representable as
/// a double (2^53).
const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

/// `value` as an integer of type `T`, if it is whole and in range.
#[allow(clippy::cast_possible_truncation)] // fraction and magnitude checked first
pub fn from_f64<T: TryFrom<i64>>(value: f64) -> Option<T> {
    if !value.is_finite() || value.fract() != 0.0 || value.abs() > MAX_EXACT {
        return None;
    }
    T::try_from(value as i64).ok()
}

/// Deserialize an integer that may be encoded as a whole-number double.
///
/// Use as `#[serde(deserialize_with = "crate::whole::deserialize")]`.
pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let value = f64::deserialize(deserializer)?;
    from_f64(value).ok_or_else(|| D::Error::invalid_value(Unexpected::Float(value), &"a whole number in range"))
}

/// Deserialize an enum ordinal, accepting whole-number doubles.
pub(crate) fn ordinal<'de, D, E>(deserializer: D, from_repr: fn(i32) -> Option<E>, expected: &'static str) -> Result<E, D::Error>
where
    D: Deserializer<'de>,
{
    let ordinal: i32 = deserialize(deserializer)?;
    from_repr(ordinal).ok_or_else(|| D::Error::invalid_value(Unexpected::Signed(i64::from(ordinal)), &expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Counts {
        #[serde(deserialize_with = "deserialize")]
        small: u8,
        #[serde(deserialize_with = "deserialize")]
        large: u32,
    }

    #[test]
    fn integers_and_whole_doubles() {
        let c: Counts = serde_json::from_value(json!({ "small": 1, "large": 16_777_215.0 })).unwrap();
        assert_eq!(c, Counts { small: 1, large: 0x00FF_FFFF });
    }

    #[test]
    fn fractions_range_and_text_are_rejected() {
        assert!(serde_json::from_value::<Counts>(json!({ "small": 1.5, "large": 0 })).is_err());
        assert!(serde_json::from_value::<Counts>(json!({ "small": 256, "large": 0 })).is_err());
        assert!(serde_json::from_value::<Counts>(json!({ "small": 0, "large": -1.0 })).is_err());
        assert!(serde_json::from_value::<Counts>(json!({ "small": "1", "large": 0 })).is_err());
    }

    #[test]
    fn non_finite_is_not_whole() {
        assert_eq!(from_f64::<i32>(f64::NAN), None);
        assert_eq!(from_f64::<i32>(f64::INFINITY), None);
        assert_eq!(from_f64::<i32>(-100_000.0), Some(-100_000));
    }
}
