//! JSON-RPC 2.0 message shapes and line framing.
//!
//! ```text
//! → {"jsonrpc":"2.0","method":"updateSensorData","params":[{...}],"id":2}
//! ← {"jsonrpc":"2.0","result":null,"id":2}
//! ← {"jsonrpc":"2.0","error":{"code":-32601,"message":"..."},"id":2}
//! ```
//!
//! Each message is one JSON object followed by `\n`.

use rpcsensor_models::{CallId, CallOutcome, OutboundCall};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SdkError;
use crate::transport::RpcFailure;

/// Protocol version string carried by every message.
pub const VERSION: &str = "2.0";

/// Invalid JSON was received.
pub const PARSE_ERROR: i32 = -32700;
/// The JSON sent is not a valid request object.
pub const INVALID_REQUEST: i32 = -32600;
/// The method does not exist or is not available.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Invalid method parameters.
pub const INVALID_PARAMS: i32 = -32602;

// ---------------------------------------------------------------------------
// Id
// ---------------------------------------------------------------------------

/// Request identifier. The protocol only issues numeric ids, but peers may
/// use strings for their own requests.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum Id {
    /// Numeric id.
    Number(u64),
    /// String id.
    Text(String),
}

impl Id {
    /// The id as a protocol correlation id, if it is numeric and fits.
    pub fn as_call_id(&self) -> Option<CallId> {
        match self {
            Id::Number(n) => CallId::try_from(*n).ok(),
            Id::Text(_) => None,
        }
    }
}

impl From<CallId> for Id {
    fn from(id: CallId) -> Self {
        Id::Number(u64::from(id))
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// A call or notification.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Request {
    /// Always [`VERSION`].
    pub jsonrpc: String,
    /// Procedure name.
    pub method: String,
    /// Positional arguments.
    #[serde(default)]
    pub params: Vec<Value>,
    /// Absent for notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
}

/// Error member of a response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorObject {
    /// Error code.
    pub code: i32,
    /// Short description.
    pub message: String,
    /// Optional detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Answer to a request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Response {
    /// Always [`VERSION`].
    pub jsonrpc: String,
    /// Success value. A `null` result reads back as `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Set on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
    /// Id of the request; `null` when the request could not be read.
    pub id: Option<Id>,
}

/// Any message on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A call or notification.
    Request(Request),
    /// An answer.
    Response(Response),
}

impl From<&OutboundCall> for Request {
    fn from(call: &OutboundCall) -> Self {
        Self {
            jsonrpc: VERSION.to_string(),
            method: call.procedure.name().to_string(),
            params: call.arguments.clone(),
            id: Some(Id::from(call.id)),
        }
    }
}

impl Response {
    /// Build the answer to request `id`.
    pub fn new(id: Id, response: Result<Value, RpcFailure>) -> Self {
        match response {
            Ok(value) => Self {
                jsonrpc: VERSION.to_string(),
                result: Some(value),
                error: None,
                id: Some(id),
            },
            Err(failure) => Self::failure(Some(id), failure),
        }
    }

    /// Build an error answer. `id` is `None` when the request's id could
    /// not be read.
    pub fn failure(id: Option<Id>, failure: RpcFailure) -> Self {
        Self {
            jsonrpc: VERSION.to_string(),
            result: None,
            error: Some(ErrorObject {
                code: failure.code,
                message: failure.message,
                data: failure.data,
            }),
            id,
        }
    }

    /// Convert into a call outcome. Responses whose id is not a protocol
    /// correlation id are returned unchanged as `Err`.
    pub fn into_outcome(self) -> Result<CallOutcome, Self> {
        let Some(id) = self.id.as_ref().and_then(Id::as_call_id) else {
            return Err(self);
        };
        Ok(match self.error {
            Some(ErrorObject { code, message, data }) => CallOutcome::Error {
                id,
                code,
                message,
                data,
            },
            None => CallOutcome::Result {
                id,
                payload: self.result.unwrap_or(Value::Null),
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Framing
// ---------------------------------------------------------------------------

/// Parse one line into a message.
///
/// Objects carrying a `method` member are requests, everything else must
/// be a response.
pub fn parse(line: &str) -> Result<Message, SdkError> {
    let value: Value = serde_json::from_str(line)?;
    let Some(object) = value.as_object() else {
        return Err(SdkError::Protocol(format!("expected an object, got {value}")));
    };
    if object.get("jsonrpc").and_then(Value::as_str) != Some(VERSION) {
        return Err(SdkError::Protocol("missing or wrong \"jsonrpc\" version".into()));
    }
    if object.contains_key("method") {
        Ok(Message::Request(Request::deserialize(&value)?))
    } else {
        Ok(Message::Response(Response::deserialize(&value)?))
    }
}

/// The error answer owed for a line that [`parse`] refused, if any.
///
/// Invalid JSON gets a parse error with a `null` id. Anything else gets an
/// invalid-request error carrying whatever id could be read. Notifications
/// and response-shaped objects are never answered.
pub fn rejection(line: &str, reason: &SdkError) -> Option<Response> {
    let Ok(value) = serde_json::from_str::<Value>(line) else {
        return Some(Response::failure(None, RpcFailure::parse_error(reason.to_string())));
    };
    let id = match value.as_object() {
        Some(object) if object.contains_key("method") => Id::deserialize(object.get("id")?).ok(),
        Some(object) if object.contains_key("result") || object.contains_key("error") => return None,
        Some(object) => object.get("id").and_then(|id| Id::deserialize(id).ok()),
        None => None,
    };
    Some(Response::failure(id, RpcFailure::invalid_request(reason.to_string())))
}

/// Serialize a message as one newline-terminated line.
pub fn to_line<T: Serialize>(message: &T) -> Result<String, SdkError> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rpcsensor_models::{RemoteEvent, RemoteSensorData};
    use serde_json::json;

    #[test]
    fn request_from_outbound_call() {
        let call = OutboundCall::update_event(RemoteEvent::WarningLampClicked);
        let line = to_line(&Request::from(&call)).unwrap();
        assert!(line.ends_with('\n'));
        let value: Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(
            value,
            json!({ "jsonrpc": "2.0", "method": "updateEvent", "params": [0], "id": 1 })
        );
    }

    #[test]
    fn parse_request_and_notification() {
        let Message::Request(req) =
            parse(r#"{"jsonrpc":"2.0","method":"updateAltitudeAGL","params":[120.5],"id":0}"#).unwrap()
        else {
            panic!("expected request");
        };
        assert_eq!(req.method, "updateAltitudeAGL");
        assert_eq!(req.params, vec![json!(120.5)]);
        assert_eq!(req.id, Some(Id::Number(0)));

        let Message::Request(note) =
            parse(r#"{"jsonrpc":"2.0","method":"updateEvent","params":[0]}"#).unwrap()
        else {
            panic!("expected request");
        };
        assert_eq!(note.id, None);
    }

    #[test]
    fn parse_response_outcomes() {
        let Message::Response(ok) = parse(r#"{"jsonrpc":"2.0","result":null,"id":2}"#).unwrap() else {
            panic!("expected response");
        };
        assert_eq!(
            ok.into_outcome().unwrap(),
            CallOutcome::Result { id: 2, payload: Value::Null }
        );

        let Message::Response(err) = parse(
            r#"{"jsonrpc":"2.0","error":{"code":-32602,"message":"bad","data":{"field":"x"}},"id":3}"#,
        )
        .unwrap() else {
            panic!("expected response");
        };
        assert_eq!(
            err.into_outcome().unwrap(),
            CallOutcome::Error {
                id: 3,
                code: -32602,
                message: "bad".into(),
                data: Some(json!({ "field": "x" })),
            }
        );
    }

    #[test]
    fn text_id_is_not_a_call_id() {
        let Message::Response(resp) = parse(r#"{"jsonrpc":"2.0","result":1,"id":"abc"}"#).unwrap() else {
            panic!("expected response");
        };
        assert!(resp.into_outcome().is_err());
        assert_eq!(Id::Number(u64::MAX).as_call_id(), None);
    }

    #[test]
    fn parse_rejects_non_jsonrpc() {
        assert!(matches!(parse("[1,2]"), Err(SdkError::Protocol(_))));
        assert!(matches!(parse(r#"{"method":"x"}"#), Err(SdkError::Protocol(_))));
        assert!(matches!(parse("{not json"), Err(SdkError::Serialization(_))));
        assert!(parse(r#"{"jsonrpc":"2.0","method":"x","params":{"a":1}}"#).is_err());
    }

    #[test]
    fn error_response_shape() {
        let resp = Response::new(Id::Number(9), Err(RpcFailure::method_not_found("updateWeather")));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["error"]["code"], json!(METHOD_NOT_FOUND));
        assert_eq!(value["id"], json!(9));
    }

    fn rejection_of(line: &str) -> Option<Value> {
        let reason = parse(line).expect_err("line should be refused");
        rejection(line, &reason).map(|resp| serde_json::to_value(resp).unwrap())
    }

    #[test]
    fn unreadable_json_gets_parse_error() {
        let answer = rejection_of("{not json").unwrap();
        assert_eq!(answer["error"]["code"], json!(PARSE_ERROR));
        assert_eq!(answer["id"], Value::Null);
    }

    #[test]
    fn bad_request_with_id_gets_invalid_request() {
        let answer = rejection_of(r#"{"jsonrpc":"2.0","method":"updateEvent","params":{"a":1},"id":4}"#).unwrap();
        assert_eq!(answer["error"]["code"], json!(INVALID_REQUEST));
        assert_eq!(answer["id"], json!(4));

        let answer = rejection_of(r#"{"method":"updateEvent","params":[0],"id":"x"}"#).unwrap();
        assert_eq!(answer["id"], json!("x"));

        let answer = rejection_of("[1,2]").unwrap();
        assert_eq!(answer["error"]["code"], json!(INVALID_REQUEST));
        assert_eq!(answer["id"], Value::Null);
    }

    #[test]
    fn bad_notifications_and_responses_are_not_answered() {
        assert_eq!(rejection_of(r#"{"jsonrpc":"2.0","method":"updateEvent","params":{"a":1}}"#), None);
        assert_eq!(rejection_of(r#"{"jsonrpc":"1.0","result":null,"id":2}"#), None);
    }

    #[test]
    fn sensor_payload_survives_framing() {
        let call = OutboundCall::update_sensor_data(&RemoteSensorData::default()).unwrap();
        let line = to_line(&Request::from(&call)).unwrap();
        let Message::Request(req) = parse(line.trim_end()).unwrap() else {
            panic!("expected request");
        };
        assert_eq!(req.params, call.arguments);
    }
}
