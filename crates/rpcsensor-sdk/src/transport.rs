//! The transport seam.
//!
//! A session owns one [`RpcTransport`] and drives it from a single control
//! loop: every method here must return without blocking. How bytes move,
//! how they are framed or compressed, is the implementation's business.

use rpcsensor_models::{CallOutcome, OutboundCall, Procedure};
use serde_json::Value;

use crate::error::SdkError;
use crate::jsonrpc::Id;

/// Identifies an inbound request so that it can be answered.
pub type RequestId = Id;

/// Something the peer sent since the last pump.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// The peer invoked one of our registered procedures.
    Call {
        /// Wire name of the procedure.
        procedure: String,
        /// Raw, still encoded arguments.
        arguments: Vec<Value>,
        /// Set when the peer expects an answer.
        request: Option<RequestId>,
    },
    /// The peer answered one of our earlier calls.
    Outcome(CallOutcome),
}

/// Error answer to an inbound call.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcFailure {
    /// Error code.
    pub code: i32,
    /// Human-readable message.
    pub message: String,
    /// Optional structured detail.
    pub data: Option<Value>,
}

impl RpcFailure {
    /// The arguments of a call could not be decoded.
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: crate::jsonrpc::INVALID_PARAMS,
            message: message.into(),
            data: None,
        }
    }

    /// A line was not valid JSON.
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self {
            code: crate::jsonrpc::PARSE_ERROR,
            message: message.into(),
            data: None,
        }
    }

    /// A message was JSON but not a usable request.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: crate::jsonrpc::INVALID_REQUEST,
            message: message.into(),
            data: None,
        }
    }

    /// The procedure is not handled by this peer.
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: crate::jsonrpc::METHOD_NOT_FOUND,
            message: format!("method not found: {method}"),
            data: None,
        }
    }
}

/// What a session needs from one connection.
pub trait RpcTransport {
    /// Accept inbound calls to `procedure`. Calls to anything else are
    /// rejected by the transport and never surface from [`pump`](Self::pump).
    fn register_receiver(&mut self, procedure: Procedure);

    /// Issue a call. Fire-and-forget: any answer shows up later as an
    /// [`Inbound::Outcome`] with the call's id. Fails with
    /// [`SdkError::QueueFull`] when the peer is not keeping up.
    fn call(&mut self, call: &OutboundCall) -> Result<(), SdkError>;

    /// Answer an inbound call.
    fn respond(&mut self, request: RequestId, response: Result<Value, RpcFailure>) -> Result<(), SdkError>;

    /// Drain everything received since the last pump, without blocking.
    fn pump(&mut self) -> Vec<Inbound>;

    /// `false` once the connection is gone for good.
    fn is_connected(&self) -> bool;
}
