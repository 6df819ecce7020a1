//! Native ↔ wire conversion for every procedure payload.
//!
//! The wire form is a JSON value. Decoding fills absent fields from the
//! type's default instance (see the `#[serde(default)]` containers in
//! [`crate::messages`] and [`crate::values`]) and reports any present field
//! of the wrong shape as [`ModelError::Malformed`].
//!
//! ```
//! use rpcsensor_models::{RemoteSensorData, WireCodec};
//!
//! let wire = RemoteSensorData::default().encode().unwrap();
//! let back = RemoteSensorData::decode(&wire).unwrap();
//! assert_eq!(back, RemoteSensorData::default());
//! assert_eq!(back.true_heading, None);
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ModelError;
use crate::messages::{GenericValues, OverrideValues, RemoteSensorData, RemoteTrafficElement};
use crate::values::{RangeSpecification, ValueWithFill, ValueWithLevel};

/// Encode/decode contract implemented by every wire type.
pub trait WireCodec: Serialize + DeserializeOwned {
    /// Name used in error reports.
    const WIRE_NAME: &'static str;

    /// Produce the wire form. Every declared field is emitted.
    fn encode(&self) -> Result<Value, ModelError> {
        serde_json::to_value(self).map_err(|source| ModelError::Encode {
            what: Self::WIRE_NAME,
            source,
        })
    }

    /// Reconstruct the native value, substituting defaults for absent
    /// fields.
    fn decode(wire: &Value) -> Result<Self, ModelError> {
        Self::deserialize(wire).map_err(|source| ModelError::Malformed {
            what: Self::WIRE_NAME,
            source,
        })
    }
}

impl WireCodec for ValueWithLevel {
    const WIRE_NAME: &'static str = "ValueWithLevel";
}

impl WireCodec for ValueWithFill {
    const WIRE_NAME: &'static str = "ValueWithFill";
}

impl WireCodec for RangeSpecification {
    const WIRE_NAME: &'static str = "RangeSpecification";
}

impl WireCodec for GenericValues {
    const WIRE_NAME: &'static str = "GenericValues";
}

impl WireCodec for OverrideValues {
    const WIRE_NAME: &'static str = "OverrideValues";
}

impl WireCodec for RemoteSensorData {
    const WIRE_NAME: &'static str = "RemoteSensorData";
}

impl WireCodec for RemoteTrafficElement {
    const WIRE_NAME: &'static str = "RemoteTrafficElement";
}

impl WireCodec for Vec<RemoteTrafficElement> {
    const WIRE_NAME: &'static str = "RemoteTrafficElement list";
}
