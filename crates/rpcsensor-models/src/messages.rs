//! Aggregate messages sent as procedure payloads.
//!
//! Every struct is `#[serde(default)]`: decoding starts from the type's
//! [`Default`] instance and overrides whatever fields are present on the
//! wire. Older or newer peers that add or drop fields still decode, while a
//! present field of the wrong shape remains an error.
//!
//! Units and frames are part of the wire contract:
//!
//! | Quantity | Unit |
//! |----------|------|
//! | latitude / longitude / headings / angles | degrees |
//! | altitude, speeds, vertical speed (sensor data) | m, m/s |
//! | pressure | mbar |
//! | temperature | °C |
//! | traffic altitude / velocity / climb rate | ft, kt, ft/min |

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::values::{RangeSpecification, ValueWithFill, ValueWithLevel, WarningLevel};

// ---------------------------------------------------------------------------
// GenericValues
// ---------------------------------------------------------------------------

/// Free-form indicator values keyed by caller-defined names.
///
/// Sequence order inside `multi_values` is display order (e.g. stacked
/// bars); map key order carries no meaning.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct GenericValues {
    /// Single labelled readings.
    pub single_values: HashMap<String, ValueWithLevel>,
    /// Ordered bar/gauge readings.
    pub multi_values: HashMap<String, Vec<ValueWithFill>>,
}

// ---------------------------------------------------------------------------
// OverrideValues
// ---------------------------------------------------------------------------

/// Values that override the consumer's own battery and warning indication.
///
/// `battery_warning_levels` runs parallel to `battery_levels` and may be
/// shorter; batteries without an entry use the consumer's standard coloring.
///
/// ```
/// use rpcsensor_models::{OverrideValues, RangeSpecification, WarningLevel};
///
/// let v: OverrideValues =
///     serde_json::from_value(serde_json::json!({ "batteryLevels": [0.7] })).unwrap();
/// assert_eq!(v.battery_levels, vec![0.7]);
/// assert!(v.battery_warning_levels.is_empty());
/// assert_eq!(v.warning_levels, vec![WarningLevel::Bad]);
/// assert_eq!(v.range, RangeSpecification::Disabled);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct OverrideValues {
    /// Fill level per battery (`0..=1`); one indicator per entry.
    pub battery_levels: Vec<f32>,
    /// Warning level per battery.
    pub battery_warning_levels: Vec<WarningLevel>,
    /// Warning lamp colors; several entries are shown simultaneously.
    pub warning_levels: Vec<WarningLevel>,
    /// Range indication on the moving map.
    pub range: RangeSpecification,
}

impl Default for OverrideValues {
    fn default() -> Self {
        Self {
            battery_levels: vec![0.0],
            battery_warning_levels: Vec::new(),
            warning_levels: vec![WarningLevel::Bad],
            range: RangeSpecification::Disabled,
        }
    }
}

impl OverrideValues {
    /// Warning level for battery `index`, or `None` when the consumer should
    /// use its standard coloring.
    pub fn battery_warning_level(&self, index: usize) -> Option<WarningLevel> {
        self.battery_warning_levels.get(index).copied()
    }
}

// ---------------------------------------------------------------------------
// RemoteSensorData
// ---------------------------------------------------------------------------

/// One complete aircraft-state snapshot.
///
/// Fields of type `Option` are "or invalid": `None` travels as the
/// [sentinel](crate::sentinel).
///
/// The attitude is a row-major 3×3 rotation matrix between two left-handed
/// frames:
///
/// ```text
/// | attitude[0] attitude[1] attitude[2] |   aircraft: X right, Y up, Z front
/// | attitude[3] attitude[4] attitude[5] |   world:    X east,  Y up, Z north
/// | attitude[6] attitude[7] attitude[8] |
/// ```
///
/// The yaw encoded in the matrix must follow the groundtrack, not the
/// magnetic or true heading.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoteSensorData {
    /// Degrees, positive east.
    pub longitude: f64,
    /// Degrees, positive north.
    pub latitude: f64,
    /// True altitude in meters MSL, e.g. from GNSS. Never pressure altitude.
    pub altitude: f64,
    /// Groundspeed in m/s.
    pub groundspeed: f64,
    /// Groundtrack in degrees from true north, clockwise.
    pub groundtrack: f64,
    /// Number of GNSS satellites in use.
    #[serde(deserialize_with = "crate::whole::deserialize")]
    pub sat_count: u32,
    /// Row-major attitude rotation matrix.
    pub attitude: [f64; 9],
    /// Heading shown by the consumer (true north). Should track the
    /// groundtrack, e.g. a gyro-smoothed groundtrack.
    pub indicated_heading: f64,
    /// Degrees from true north.
    #[serde(with = "crate::sentinel::real")]
    pub true_heading: Option<f64>,
    /// Degrees from magnetic north.
    #[serde(with = "crate::sentinel::real")]
    pub magnetic_heading: Option<f64>,
    /// Acceleration in aircraft axes, m/s².
    pub acceleration: [f64; 3],
    /// Vertical speed in m/s.
    pub vertical_speed: f64,
    /// Yaw rate in degrees per second.
    #[serde(rename = "turnrate")]
    pub turn_rate: f64,
    /// Indicated / calibrated airspeed in m/s.
    #[serde(with = "crate::sentinel::real")]
    pub airspeed: Option<f64>,
    /// Cabin pressure, mbar.
    #[serde(with = "crate::sentinel::real")]
    pub press_inside: Option<f64>,
    /// Static pressure, mbar.
    #[serde(with = "crate::sentinel::real")]
    pub press_outside: Option<f64>,
    /// Cabin temperature, °C.
    #[serde(with = "crate::sentinel::real")]
    pub temp_inside: Option<f64>,
    /// Outside air temperature, °C.
    #[serde(with = "crate::sentinel::real")]
    pub temp_outside: Option<f64>,
    /// Localizer 90 Hz amplitude.
    #[serde(with = "crate::sentinel::real")]
    pub loc90: Option<f64>,
    /// Localizer 150 Hz amplitude.
    #[serde(with = "crate::sentinel::real")]
    pub loc150: Option<f64>,
    /// Glideslope 90 Hz amplitude.
    #[serde(with = "crate::sentinel::real")]
    pub gs90: Option<f64>,
    /// Glideslope 150 Hz amplitude.
    #[serde(with = "crate::sentinel::real")]
    pub gs150: Option<f64>,
    /// Angle of attack, degrees.
    #[serde(with = "crate::sentinel::real")]
    pub aoa: Option<f64>,
    /// Maximum angle of attack, degrees.
    #[serde(rename = "maxAoA", with = "crate::sentinel::real")]
    pub max_aoa: Option<f64>,
    /// Overall level, shown only while no override is active.
    pub warning_level: WarningLevel,
}

/// Identity attitude: level, pointing north.
pub const IDENTITY_ATTITUDE: [f64; 9] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

/// One g straight down in aircraft axes.
pub const LEVEL_ACCELERATION: [f64; 3] = [0.0, -9.81, 0.0];

impl Default for RemoteSensorData {
    fn default() -> Self {
        Self {
            longitude: 0.0,
            latitude: 0.0,
            altitude: 0.0,
            groundspeed: 0.0,
            groundtrack: 0.0,
            sat_count: 0,
            attitude: IDENTITY_ATTITUDE,
            indicated_heading: 0.0,
            true_heading: None,
            magnetic_heading: None,
            acceleration: LEVEL_ACCELERATION,
            vertical_speed: 0.0,
            turn_rate: 0.0,
            airspeed: None,
            press_inside: None,
            press_outside: None,
            temp_inside: None,
            temp_outside: None,
            loc90: None,
            loc150: None,
            gs90: None,
            gs150: None,
            aoa: None,
            max_aoa: None,
            warning_level: WarningLevel::Bad,
        }
    }
}

// ---------------------------------------------------------------------------
// RemoteTrafficElement
// ---------------------------------------------------------------------------

/// Longest display name, by convention. Not enforced on the wire.
pub const TRAFFIC_NAME_MAX_LEN: usize = 9;

/// One nearby traffic contact, e.g. from ADS-B or FLARM.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoteTrafficElement {
    /// 24-bit ICAO address in the low three bytes; `0` when unknown.
    #[serde(deserialize_with = "crate::whole::deserialize")]
    pub icao_address: u32,
    /// Degrees, positive east.
    #[serde(with = "crate::sentinel::real")]
    pub longitude: Option<f64>,
    /// Degrees, positive north.
    #[serde(with = "crate::sentinel::real")]
    pub latitude: Option<f64>,
    /// Pressure altitude in feet.
    #[serde(with = "crate::sentinel::integer")]
    pub pressure_altitude: Option<i32>,
    /// Velocity in knots.
    #[serde(with = "crate::sentinel::integer")]
    pub velocity: Option<i32>,
    /// Climb rate in feet per minute.
    #[serde(with = "crate::sentinel::integer")]
    pub climb_rate: Option<i32>,
    /// 13-bit transponder code.
    #[serde(with = "crate::sentinel::integer")]
    pub squawk: Option<i32>,
    /// Degrees from true north.
    #[serde(with = "crate::sentinel::real")]
    pub groundtrack: Option<f64>,
    /// Name or identifier.
    pub name: String,
}

impl RemoteTrafficElement {
    /// Name cut to [`TRAFFIC_NAME_MAX_LEN`] characters.
    pub fn display_name(&self) -> &str {
        match self.name.char_indices().nth(TRAFFIC_NAME_MAX_LEN) {
            Some((end, _)) => &self.name[..end],
            None => &self.name,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
