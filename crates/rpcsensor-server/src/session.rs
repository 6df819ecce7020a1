//! Per-connection session loop.
//!
//! A [`Session`] owns one transport, one data source and the native state
//! pushed to the consumer. The control loop calls [`Session::tick`] with the
//! current time; each tick does, in order:
//!
//! 1. dispatch everything the transport pumped (inbound calls, outcomes),
//! 2. push sensor / override / generic data if the high-rate interval elapsed,
//! 3. push traffic if the low-rate interval elapsed,
//! 4. close if the transport reports the connection gone.
//!
//! Nothing in a tick blocks.

use std::collections::HashMap;
use std::time::Instant;

use rpcsensor_models::{
    CallId, CallOutcome, Direction, GenericValues, ModelError, OutboundCall, OverrideValues,
    Procedure, RemoteCall, RemoteSensorData, RemoteTrafficElement,
};
use rpcsensor_sdk::{Inbound, RequestId, RpcFailure, RpcTransport, SdkError};
use serde_json::Value;
use tracing::{debug, error, info, trace, warn};

use crate::config::SessionConfig;
use crate::source::DataSource;

/// Lifecycle of a session. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Pushing data and answering the consumer.
    Active,
    /// The connection is gone; the registry drops the session.
    Closed,
}

/// Calls issued under one id that have not been answered yet.
#[derive(Debug, Clone, Copy)]
struct Outstanding {
    procedure: Procedure,
    pending: u32,
}

/// One consumer connection and the state pushed to it.
pub struct Session<T, S> {
    id: u64,
    transport: T,
    source: S,
    config: SessionConfig,
    state: SessionState,
    sensor_data: RemoteSensorData,
    override_values: OverrideValues,
    generic_values: GenericValues,
    traffic: Vec<RemoteTrafficElement>,
    altitude_agl: Option<f64>,
    outstanding: HashMap<CallId, Outstanding>,
    /// The consumer stopped reading and pushes are being dropped.
    stalled: bool,
    last_high_rate: Instant,
    last_low_rate: Instant,
}

impl<T: RpcTransport, S: DataSource> Session<T, S> {
    /// Start a session on a freshly accepted connection. Both push timers
    /// start at `now`, so the first pushes happen one interval later.
    pub fn new(id: u64, mut transport: T, source: S, config: SessionConfig, now: Instant) -> Self {
        for procedure in Procedure::received_by(Direction::ConsumerToSource) {
            transport.register_receiver(procedure);
        }
        Self {
            id,
            transport,
            source,
            config,
            state: SessionState::Active,
            sensor_data: RemoteSensorData::default(),
            override_values: OverrideValues::default(),
            generic_values: GenericValues::default(),
            traffic: Vec::new(),
            altitude_agl: None,
            outstanding: HashMap::new(),
            stalled: false,
            last_high_rate: now,
            last_low_rate: now,
        }
    }

    /// Registry-assigned id, used in log events.
    pub fn id(&self) -> u64 {
        self.id
    }

    #[cfg(test)]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Latest height above ground reported by the consumer.
    pub fn altitude_agl(&self) -> Option<f64> {
        self.altitude_agl
    }

    /// Issued calls still waiting for a result or error.
    pub fn unanswered_calls(&self) -> u64 {
        self.outstanding.values().map(|o| u64::from(o.pending)).sum()
    }

    /// Advance the session by one step. A closed session does nothing.
    pub fn tick(&mut self, now: Instant) -> SessionState {
        if self.state == SessionState::Closed {
            return self.state;
        }

        for inbound in self.transport.pump() {
            match inbound {
                Inbound::Call {
                    procedure,
                    arguments,
                    request,
                } => self.handle_call(&procedure, &arguments, request),
                Inbound::Outcome(outcome) => self.handle_outcome(outcome),
            }
        }

        if now.saturating_duration_since(self.last_high_rate) >= self.config.high_rate_interval {
            self.push_high_rate();
            self.last_high_rate = now;
        }

        if now.saturating_duration_since(self.last_low_rate) >= self.config.low_rate_interval {
            self.push_traffic();
            self.last_low_rate = now;
        }

        if !self.transport.is_connected() {
            info!(session = self.id, "connection lost, closing session");
            self.state = SessionState::Closed;
        }
        self.state
    }

    fn push_high_rate(&mut self) {
        self.source.fill_sensor_data(&mut self.sensor_data);
        let sensor = OutboundCall::update_sensor_data(&self.sensor_data);
        self.send(sensor);

        self.source.fill_override_values(&mut self.override_values);
        let overrides = OutboundCall::set_override_values(&self.override_values);
        self.send(overrides);

        self.source.fill_generic_values(&mut self.generic_values);
        let generic = OutboundCall::set_generic_values(&self.generic_values);
        self.send(generic);
    }

    fn push_traffic(&mut self) {
        self.source.fill_traffic(&mut self.traffic);
        trace!(session = self.id, targets = self.traffic.len(), "pushing traffic");
        let traffic = OutboundCall::update_traffic_data(&self.traffic);
        self.send(traffic);
    }

    fn send(&mut self, call: Result<OutboundCall, ModelError>) {
        let call = match call {
            Ok(call) => call,
            Err(e) => {
                error!(session = self.id, error = %e, "failed to encode outbound call");
                return;
            }
        };
        match self.transport.call(&call) {
            Ok(()) if self.stalled => {
                self.stalled = false;
                info!(session = self.id, "consumer is reading again");
            }
            Ok(()) => {}
            Err(SdkError::QueueFull(queued)) => {
                if !self.stalled {
                    self.stalled = true;
                    warn!(session = self.id, queued, "consumer is not reading, dropping pushes");
                }
                trace!(session = self.id, procedure = %call.procedure, "push dropped");
                return;
            }
            Err(e) => {
                debug!(session = self.id, procedure = %call.procedure, error = %e, "call not sent");
                return;
            }
        }
        let entry = self.outstanding.entry(call.id).or_insert(Outstanding {
            procedure: call.procedure,
            pending: 0,
        });
        entry.procedure = call.procedure;
        entry.pending = entry.pending.saturating_add(1);
    }

    fn handle_call(&mut self, name: &str, arguments: &[Value], request: Option<RequestId>) {
        let answer = match RemoteCall::decode(name, arguments) {
            Ok(RemoteCall::UpdateAltitudeAgl(altitude)) => {
                self.altitude_agl = altitude;
                self.source.on_altitude_agl(altitude);
                Ok(Value::Null)
            }
            Ok(RemoteCall::UpdateEvent(event)) => {
                self.source.on_event(event);
                Ok(Value::Null)
            }
            Ok(other) => {
                warn!(session = self.id, procedure = %other.procedure(), "procedure is not handled by a source");
                Err(RpcFailure::method_not_found(name))
            }
            Err(e) => {
                warn!(session = self.id, procedure = %name, error = %e, "malformed inbound call");
                Err(RpcFailure::invalid_params(e.to_string()))
            }
        };

        if let Some(request) = request {
            if let Err(e) = self.transport.respond(request, answer) {
                debug!(session = self.id, procedure = %name, error = %e, "could not answer call");
            }
        }
    }

    fn handle_outcome(&mut self, outcome: CallOutcome) {
        let id = outcome.id();
        let Some(outstanding) = self.outstanding.get_mut(&id).filter(|o| o.pending > 0) else {
            warn!(session = self.id, id, "outcome for unknown call id discarded");
            return;
        };
        outstanding.pending -= 1;
        let procedure = outstanding.procedure;

        match outcome {
            CallOutcome::Result { payload, .. } => {
                trace!(session = self.id, id, %procedure, ?payload, "call succeeded");
            }
            CallOutcome::Error {
                code,
                message,
                data,
                ..
            } => {
                warn!(session = self.id, id, %procedure, code, %message, ?data, "call failed");
            }
        }
    }

    #[cfg(test)]
    fn pending(&self, id: CallId) -> u32 {
        self.outstanding.get(&id).map_or(0, |o| o.pending)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
