//! # RPC Sensor SDK
//!
//! Transport layer for the RPC sensor protocol.
//!
//! The SDK provides:
//!
//! * [`RpcTransport`]: the connection seam a session drives. It issues a
//!   named call with an id, registers inbound procedures, pumps pending
//!   traffic without blocking and reports connectedness.
//! * [`JsonRpcListener`] / [`JsonRpcConnection`]: a JSON-RPC 2.0
//!   implementation over TCP, one JSON object per line, driven by tokio.
//! * [`SdkError`]: unified error type for all SDK operations.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use rpcsensor_models::{OutboundCall, RemoteEvent};
//! use rpcsensor_sdk::{JsonRpcConnection, RpcTransport};
//!
//! # async fn run() -> Result<(), rpcsensor_sdk::SdkError> {
//! let mut conn = JsonRpcConnection::connect("127.0.0.1:48753".parse().unwrap()).await?;
//! conn.call(&OutboundCall::update_event(RemoteEvent::WarningLampClicked))?;
//! for inbound in conn.pump() {
//!     println!("{inbound:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod jsonrpc;
pub mod tcp;
pub mod transport;

pub use error::SdkError;
pub use tcp::{JsonRpcConnection, JsonRpcListener};
pub use transport::{Inbound, RequestId, RpcFailure, RpcTransport};
