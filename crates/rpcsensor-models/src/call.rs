//! Outbound calls and their asynchronous outcomes.
//!
//! A call is fire-and-forget: the sender hands an [`OutboundCall`] to the
//! transport and carries on. If the peer answers, the answer arrives later
//! as a [`CallOutcome`] carrying the same id.
//!
//! ```
//! use rpcsensor_models::{OutboundCall, Procedure, RemoteSensorData};
//!
//! let call = OutboundCall::update_sensor_data(&RemoteSensorData::default()).unwrap();
//! assert_eq!(call.procedure, Procedure::UpdateSensorData);
//! assert_eq!(call.id, 2);
//! assert_eq!(call.arguments.len(), 1);
//!
//! let tagged = call.with_id(42);
//! assert_eq!(tagged.id, 42);
//! ```

use serde_json::Value;

use crate::codec::WireCodec;
use crate::error::ModelError;
use crate::messages::{GenericValues, OverrideValues, RemoteSensorData, RemoteTrafficElement};
use crate::procedure::{CallId, Procedure, RemoteEvent};
use crate::sentinel;

// ---------------------------------------------------------------------------
// OutboundCall
// ---------------------------------------------------------------------------

/// An encoded procedure invocation ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundCall {
    /// Catalog entry being invoked.
    pub procedure: Procedure,
    /// Encoded arguments, one per declared parameter.
    pub arguments: Vec<Value>,
    /// Correlation id for the eventual result or error.
    pub id: CallId,
}

impl OutboundCall {
    fn encode(procedure: Procedure, payload: &impl WireCodec) -> Result<Self, ModelError> {
        Ok(Self {
            procedure,
            arguments: vec![payload.encode()?],
            id: procedure.default_id(),
        })
    }

    /// `updateSensorData` with the default id.
    pub fn update_sensor_data(data: &RemoteSensorData) -> Result<Self, ModelError> {
        Self::encode(Procedure::UpdateSensorData, data)
    }

    /// `setOverrideValues` with the default id.
    pub fn set_override_values(values: &OverrideValues) -> Result<Self, ModelError> {
        Self::encode(Procedure::SetOverrideValues, values)
    }

    /// `setGenericValues` with the default id.
    pub fn set_generic_values(values: &GenericValues) -> Result<Self, ModelError> {
        Self::encode(Procedure::SetGenericValues, values)
    }

    /// `updateTrafficData` with the default id.
    pub fn update_traffic_data(traffic: &[RemoteTrafficElement]) -> Result<Self, ModelError> {
        Self::encode(Procedure::UpdateTrafficData, &traffic.to_vec())
    }

    /// `updateAltitudeAGL` with the default id. `None` is sent as the
    /// sentinel.
    pub fn update_altitude_agl(altitude: Option<f64>) -> Self {
        Self {
            procedure: Procedure::UpdateAltitudeAgl,
            arguments: vec![Value::from(sentinel::to_wire(altitude))],
            id: Procedure::UpdateAltitudeAgl.default_id(),
        }
    }

    /// `updateEvent` with the default id.
    pub fn update_event(event: RemoteEvent) -> Self {
        Self {
            procedure: Procedure::UpdateEvent,
            arguments: vec![Value::from(event as i32)],
            id: Procedure::UpdateEvent.default_id(),
        }
    }

    /// Replace the default id with a caller-chosen one.
    #[must_use]
    pub fn with_id(mut self, id: CallId) -> Self {
        self.id = id;
        self
    }
}

// ---------------------------------------------------------------------------
// CallOutcome
// ---------------------------------------------------------------------------

/// The peer's answer to an earlier call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// The call succeeded.
    Result {
        /// Id of the originating call.
        id: CallId,
        /// Returned value (`null` when the procedure returns nothing).
        payload: Value,
    },
    /// The peer reported a failure.
    Error {
        /// Id of the originating call.
        id: CallId,
        /// Error code chosen by the peer.
        code: i32,
        /// Human-readable message.
        message: String,
        /// Optional structured detail.
        data: Option<Value>,
    },
}

impl CallOutcome {
    /// Id of the call this outcome answers.
    pub fn id(&self) -> CallId {
        match self {
            Self::Result { id, .. } | Self::Error { id, .. } => *id,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
