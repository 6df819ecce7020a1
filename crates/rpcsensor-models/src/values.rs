//! Primitive wire records shared by the aggregate messages.
//!
//! Every type here has a [`Default`] that matches the value a decoder
//! substitutes when the field is absent from the wire.

use serde::{Deserialize, Deserializer, Serialize};
use serde_repr::Serialize_repr;

use crate::error::ModelError;

// ---------------------------------------------------------------------------
// WarningLevel
// ---------------------------------------------------------------------------

/// Health tint attached to an indicator value.
///
/// Encoded on the wire as its ordinal. Absent levels decode to
/// [`WarningLevel::Bad`], so missing state is never shown as healthy.
#[derive(
    Serialize_repr,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumIter,
    strum::FromRepr,
)]
#[repr(i32)]
#[strum(serialize_all = "UPPERCASE")]
pub enum WarningLevel {
    /// Nominal.
    Good = 0,
    /// Degraded, needs attention.
    Warning = 1,
    /// Failed or unknown.
    #[default]
    Bad = 2,
}

impl<'de> Deserialize<'de> for WarningLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        crate::whole::ordinal(deserializer, Self::from_repr, "a warning level ordinal 0..=2")
    }
}

impl WarningLevel {
    /// Cycle through the levels by an integer counter (`0 → Good`, `1 →
    /// Warning`, `2 → Bad`, `3 → Good`, ...).
    pub fn cycle(n: i64) -> Self {
        match n.rem_euclid(3) {
            0 => Self::Good,
            1 => Self::Warning,
            _ => Self::Bad,
        }
    }
}

// ---------------------------------------------------------------------------
// ValueWithLevel
// ---------------------------------------------------------------------------

/// One labelled indicator reading.
///
/// # Examples
///
/// ```
/// use rpcsensor_models::{ValueWithLevel, WarningLevel};
///
/// let v = ValueWithLevel::new("12.6 V", WarningLevel::Good);
/// assert_eq!(v.value, "12.6 V");
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ValueWithLevel {
    /// Value as indicated.
    pub value: String,
    /// Tint for the value.
    pub warning_level: WarningLevel,
}

impl ValueWithLevel {
    /// Create a reading.
    pub fn new(value: impl Into<String>, warning_level: WarningLevel) -> Self {
        Self {
            value: value.into(),
            warning_level,
        }
    }
}

// ---------------------------------------------------------------------------
// ValueWithFill
// ---------------------------------------------------------------------------

/// A bar or gauge reading with a normalised fill fraction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ValueWithFill {
    /// Fill fraction, nominally `0..=1`.
    pub fill: f32,
    /// Value as indicated.
    pub value: String,
    /// Tint for the value.
    pub warning_level: WarningLevel,
}

impl ValueWithFill {
    /// Create a reading.
    pub fn new(fill: f32, value: impl Into<String>, warning_level: WarningLevel) -> Self {
        Self {
            fill,
            value: value.into(),
            warning_level,
        }
    }

    /// Fill fraction clamped to `0..=1` for display. Out-of-range fills are
    /// legal on the wire.
    pub fn display_fill(&self) -> f32 {
        if self.fill.is_nan() {
            0.0
        } else {
            self.fill.clamp(0.0, 1.0)
        }
    }
}

// ---------------------------------------------------------------------------
// RangeSpecification
// ---------------------------------------------------------------------------

/// Range indication drawn around the aircraft on the moving map.
///
/// On the wire this is `{"type": <tag>, "radius": <meters>}` where `radius`
/// only exists for [`RangeSpecification::FixedCircle`]. For any other tag
/// the radius is neither written nor read, even if a peer sends one.
///
/// ```
/// use rpcsensor_models::RangeSpecification;
/// use serde_json::json;
///
/// let wire = serde_json::to_value(RangeSpecification::Disabled).unwrap();
/// assert_eq!(wire, json!({ "type": 0 }));
///
/// let back: RangeSpecification =
///     serde_json::from_value(json!({ "type": 1, "radius": 9260.0 })).unwrap();
/// assert_eq!(back, RangeSpecification::FixedCircle { radius: 9260.0 });
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(into = "RangeWire", try_from = "RangeWire")]
pub enum RangeSpecification {
    /// No range indication override.
    #[default]
    Disabled,
    /// Circle around the current position.
    FixedCircle {
        /// Radius in meters.
        radius: f64,
    },
}

impl RangeSpecification {
    const DISABLED: u8 = 0;
    const FIXED_CIRCLE: u8 = 1;

    /// Wire tag of the active variant.
    pub fn type_tag(&self) -> u8 {
        match self {
            Self::Disabled => Self::DISABLED,
            Self::FixedCircle { .. } => Self::FIXED_CIRCLE,
        }
    }
}

/// Flat wire shape. The radius is kept as a raw JSON value so that an
/// inactive payload is skipped without being interpreted.
#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct RangeWire {
    #[serde(rename = "type", deserialize_with = "crate::whole::deserialize")]
    kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    radius: Option<serde_json::Value>,
}

impl From<RangeSpecification> for RangeWire {
    fn from(range: RangeSpecification) -> Self {
        let radius = match range {
            RangeSpecification::Disabled => None,
            RangeSpecification::FixedCircle { radius } => Some(serde_json::Value::from(radius)),
        };
        Self {
            kind: range.type_tag(),
            radius,
        }
    }
}

impl TryFrom<RangeWire> for RangeSpecification {
    type Error = ModelError;

    fn try_from(wire: RangeWire) -> Result<Self, Self::Error> {
        match wire.kind {
            Self::DISABLED => Ok(Self::Disabled),
            Self::FIXED_CIRCLE => {
                let radius = match wire.radius {
                    None => 0.0,
                    Some(value) => value.as_f64().ok_or(ModelError::InvalidRadius(value))?,
                };
                Ok(Self::FixedCircle { radius })
            }
            other => Err(ModelError::UnknownRangeType(other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn warning_level_ordinals() {
        assert_eq!(serde_json::to_value(WarningLevel::Good).unwrap(), json!(0));
        assert_eq!(serde_json::to_value(WarningLevel::Warning).unwrap(), json!(1));
        assert_eq!(serde_json::to_value(WarningLevel::Bad).unwrap(), json!(2));
        assert_eq!(WarningLevel::from_repr(1), Some(WarningLevel::Warning));
    }

    #[test]
    fn warning_level_unknown_ordinal_is_error() {
        assert!(serde_json::from_value::<WarningLevel>(json!(3)).is_err());
        assert!(serde_json::from_value::<WarningLevel>(json!("BAD")).is_err());
    }

    #[test]
    fn warning_level_display_and_cycle() {
        assert_eq!(WarningLevel::Warning.to_string(), "WARNING");
        assert_eq!(WarningLevel::cycle(4), WarningLevel::Warning);
        assert_eq!(WarningLevel::cycle(-1), WarningLevel::Bad);
    }

    #[test]
    fn value_with_level_defaults_when_absent() {
        let v: ValueWithLevel = serde_json::from_value(json!({})).unwrap();
        assert_eq!(v, ValueWithLevel::new("", WarningLevel::Bad));

        let v: ValueWithLevel = serde_json::from_value(json!({ "value": "OK" })).unwrap();
        assert_eq!(v.warning_level, WarningLevel::Bad);
    }

    #[test]
    fn value_with_fill_wire_names() {
        let v = ValueWithFill::new(0.25, "25 %", WarningLevel::Warning);
        assert_eq!(
            serde_json::to_value(&v).unwrap(),
            json!({ "fill": 0.25, "value": "25 %", "warningLevel": 1 })
        );
    }

    #[test]
    fn value_with_fill_display_clamps() {
        assert_eq!(ValueWithFill::new(1.7, "", WarningLevel::Good).display_fill(), 1.0);
        assert_eq!(ValueWithFill::new(-0.2, "", WarningLevel::Good).display_fill(), 0.0);
        assert_eq!(ValueWithFill::new(0.4, "", WarningLevel::Good).display_fill(), 0.4);
    }

    #[test]
    fn value_with_fill_wrong_shape_is_error() {
        assert!(serde_json::from_value::<ValueWithFill>(json!({ "fill": "half" })).is_err());
    }

    #[test]
    fn range_disabled_never_writes_radius() {
        let json = serde_json::to_value(RangeSpecification::Disabled).unwrap();
        assert!(json.get("radius").is_none());
    }

    #[test]
    fn range_fixed_circle_roundtrip() {
        let range = RangeSpecification::FixedCircle { radius: 5000.0 };
        let json = serde_json::to_value(range).unwrap();
        assert_eq!(json, json!({ "type": 1, "radius": 5000.0 }));
        let back: RangeSpecification = serde_json::from_value(json).unwrap();
        assert_eq!(back, range);
    }

    #[test]
    fn range_disabled_ignores_inactive_radius() {
        // Even a malformed radius is not interpreted when the tag is DISABLED.
        let back: RangeSpecification =
            serde_json::from_value(json!({ "type": 0, "radius": "garbage" })).unwrap();
        assert_eq!(back, RangeSpecification::Disabled);
    }

    #[test]
    fn range_missing_fields_default() {
        let back: RangeSpecification = serde_json::from_value(json!({})).unwrap();
        assert_eq!(back, RangeSpecification::Disabled);
        let back: RangeSpecification = serde_json::from_value(json!({ "type": 1 })).unwrap();
        assert_eq!(back, RangeSpecification::FixedCircle { radius: 0.0 });
    }

    #[test]
    fn range_malformed_active_payload_is_error() {
        assert!(serde_json::from_value::<RangeSpecification>(json!({ "type": 1, "radius": "far" })).is_err());
        assert!(serde_json::from_value::<RangeSpecification>(json!({ "type": 9 })).is_err());
    }
}
