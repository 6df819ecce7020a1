//! The procedure catalog.
//!
//! Both peers must agree on this table; a mismatch is a deployment error,
//! not something the protocol can detect.
//!
//! | Procedure | Payload | Sent by | Default id |
//! |-----------|---------|---------|------------|
//! | `updateAltitudeAGL` | meters above ground, sentinel if unknown | consumer | 0 |
//! | `updateEvent` | [`RemoteEvent`] | consumer | 1 |
//! | `updateSensorData` | [`RemoteSensorData`] | source | 2 |
//! | `setOverrideValues` | [`OverrideValues`] | source | 3 |
//! | `updateTrafficData` | list of [`RemoteTrafficElement`] | source | 4 |
//! | `setGenericValues` | [`GenericValues`] | source | 5 |

use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_repr::Serialize_repr;

use crate::codec::WireCodec;
use crate::error::ModelError;
use crate::messages::{GenericValues, OverrideValues, RemoteSensorData, RemoteTrafficElement};
use crate::sentinel;

/// Numeric identifier correlating a call with its result or error.
pub type CallId = u32;

/// TCP port a source listens on unless configured otherwise.
pub const DEFAULT_PORT: u16 = 48753;

// ---------------------------------------------------------------------------
// Procedure
// ---------------------------------------------------------------------------

/// A named remote operation.
///
/// ```
/// use rpcsensor_models::Procedure;
///
/// let p: Procedure = "updateSensorData".parse().unwrap();
/// assert_eq!(p, Procedure::UpdateSensorData);
/// assert_eq!(p.default_id(), 2);
/// assert_eq!(p.to_string(), "updateSensorData");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
pub enum Procedure {
    /// Consumer reports the height above ground.
    #[strum(serialize = "updateAltitudeAGL")]
    UpdateAltitudeAgl,
    /// Consumer reports a user interaction.
    #[strum(serialize = "updateEvent")]
    UpdateEvent,
    /// Source pushes the aircraft state.
    #[strum(serialize = "updateSensorData")]
    UpdateSensorData,
    /// Source pushes indication overrides.
    #[strum(serialize = "setOverrideValues")]
    SetOverrideValues,
    /// Source pushes nearby traffic.
    #[strum(serialize = "updateTrafficData")]
    UpdateTrafficData,
    /// Source pushes free-form indicator values.
    #[strum(serialize = "setGenericValues")]
    SetGenericValues,
}

/// Which peer issues a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Sent by the visualisation consumer, handled by the source.
    ConsumerToSource,
    /// Sent by the flight-data source, handled by the consumer.
    SourceToConsumer,
}

impl Procedure {
    /// Wire name of the procedure.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Id used when the caller does not need to tell individual calls apart.
    pub const fn default_id(self) -> CallId {
        match self {
            Self::UpdateAltitudeAgl => 0,
            Self::UpdateEvent => 1,
            Self::UpdateSensorData => 2,
            Self::SetOverrideValues => 3,
            Self::UpdateTrafficData => 4,
            Self::SetGenericValues => 5,
        }
    }

    /// The procedure whose default id is `id`.
    pub fn from_default_id(id: CallId) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().find(|p| p.default_id() == id)
    }

    /// Which peer issues this procedure.
    pub const fn direction(self) -> Direction {
        match self {
            Self::UpdateAltitudeAgl | Self::UpdateEvent => Direction::ConsumerToSource,
            Self::UpdateSensorData
            | Self::SetOverrideValues
            | Self::UpdateTrafficData
            | Self::SetGenericValues => Direction::SourceToConsumer,
        }
    }

    /// Procedures a peer playing `role` should accept from the other side.
    pub fn received_by(role: Direction) -> impl Iterator<Item = Procedure> {
        use strum::IntoEnumIterator;
        Self::iter().filter(move |p| p.direction() == role)
    }
}

// ---------------------------------------------------------------------------
// RemoteEvent
// ---------------------------------------------------------------------------

/// User interaction reported by the consumer. Encoded as its ordinal.
#[derive(Serialize_repr, Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::FromRepr)]
#[repr(i32)]
pub enum RemoteEvent {
    /// The pilot tapped the warning lamp.
    WarningLampClicked = 0,
}

impl<'de> Deserialize<'de> for RemoteEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        crate::whole::ordinal(deserializer, Self::from_repr, "a remote event ordinal")
    }
}

// ---------------------------------------------------------------------------
// RemoteCall
// ---------------------------------------------------------------------------

/// A decoded inbound call with its typed payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    /// Meters above ground, `None` if unknown.
    UpdateAltitudeAgl(Option<f64>),
    /// A user interaction.
    UpdateEvent(RemoteEvent),
    /// Aircraft state snapshot.
    UpdateSensorData(Box<RemoteSensorData>),
    /// Indication overrides.
    SetOverrideValues(OverrideValues),
    /// Nearby traffic.
    UpdateTrafficData(Vec<RemoteTrafficElement>),
    /// Free-form indicator values.
    SetGenericValues(GenericValues),
}

impl RemoteCall {
    /// The catalog entry this call belongs to.
    pub fn procedure(&self) -> Procedure {
        match self {
            Self::UpdateAltitudeAgl(_) => Procedure::UpdateAltitudeAgl,
            Self::UpdateEvent(_) => Procedure::UpdateEvent,
            Self::UpdateSensorData(_) => Procedure::UpdateSensorData,
            Self::SetOverrideValues(_) => Procedure::SetOverrideValues,
            Self::UpdateTrafficData(_) => Procedure::UpdateTrafficData,
            Self::SetGenericValues(_) => Procedure::SetGenericValues,
        }
    }

    /// Decode a call from its wire name and argument list.
    ///
    /// Every procedure takes exactly one argument.
    pub fn decode(name: &str, arguments: &[Value]) -> Result<Self, ModelError> {
        let procedure =
            Procedure::from_str(name).map_err(|_| ModelError::UnknownProcedure(name.to_string()))?;
        let [argument] = arguments else {
            return Err(ModelError::ArgumentCount {
                procedure: procedure.name(),
                expected: 1,
                found: arguments.len(),
            });
        };

        let malformed = |source| ModelError::Malformed {
            what: procedure.name(),
            source,
        };

        Ok(match procedure {
            Procedure::UpdateAltitudeAgl => {
                let altitude = f64::deserialize(argument).map_err(malformed)?;
                Self::UpdateAltitudeAgl(sentinel::from_wire(altitude))
            }
            Procedure::UpdateEvent => {
                Self::UpdateEvent(RemoteEvent::deserialize(argument).map_err(malformed)?)
            }
            Procedure::UpdateSensorData => {
                Self::UpdateSensorData(Box::new(RemoteSensorData::decode(argument)?))
            }
            Procedure::SetOverrideValues => Self::SetOverrideValues(OverrideValues::decode(argument)?),
            Procedure::UpdateTrafficData => {
                Self::UpdateTrafficData(Vec::<RemoteTrafficElement>::decode(argument)?)
            }
            Procedure::SetGenericValues => Self::SetGenericValues(GenericValues::decode(argument)?),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
