#![deny(missing_docs)]

//! # RPC Sensor Models
//!
//! Message schema for the telemetry exchange between a flight-data source
//! and a visualisation consumer ("Horizon").
//!
//! ## Message hierarchy
//!
//! ```text
//! OutboundCall (procedure, arguments, id)
//! ├── updateSensorData  ← RemoteSensorData
//! ├── setOverrideValues ← OverrideValues
//! │   └── RangeSpecification
//! ├── setGenericValues  ← GenericValues
//! │   ├── ValueWithLevel
//! │   └── ValueWithFill
//! ├── updateTrafficData ← [RemoteTrafficElement]
//! ├── updateAltitudeAGL ← meters above ground (sentinel if unknown)
//! └── updateEvent       ← RemoteEvent
//! ```
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`values`] | `WarningLevel`, `ValueWithLevel`, `ValueWithFill`, `RangeSpecification` |
//! | [`messages`] | Aggregate messages sent as procedure payloads |
//! | [`sentinel`] | The reserved "not available" value and its serde adapters |
//! | [`codec`] | [`WireCodec`]: native ↔ wire conversion with default filling |
//! | [`procedure`] | Procedure catalog, `RemoteEvent`, typed inbound calls |
//! | [`call`] | Outbound call records and asynchronous call outcomes |
//! | [`attitude`] | Rotation matrices in the protocol's left-handed frames |
//! | [`whole`] | Integer fields that may arrive as whole-number doubles |

pub mod attitude;
pub mod call;
pub mod codec;
pub mod error;
pub mod messages;
pub mod procedure;
pub mod sentinel;
pub mod values;
pub mod whole;

// Re-export all public types at crate root for convenience.
pub use call::*;
pub use codec::*;
pub use error::*;
pub use messages::*;
pub use procedure::*;
pub use sentinel::{INVALID_VALUE, is_invalid};
pub use values::*;
