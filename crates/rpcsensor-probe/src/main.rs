//! RPC sensor probe: a bare-bones consumer for checking a sensor server.
//!
//! Connects, decodes every push, logs a once-per-second summary and
//! reports a height above ground computed from the received altitude.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rpcsensor_models::{
    CallOutcome, DEFAULT_PORT, Direction, OutboundCall, Procedure, RemoteCall, RemoteEvent,
};
use rpcsensor_sdk::{Inbound, JsonRpcConnection, RpcFailure, RpcTransport};
use serde_json::Value;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "rpcsensor-probe", about = "Connect to a sensor server and decode its pushes")]
struct Args {
    /// Sensor server address.
    #[arg(long, default_value_t = SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)))]
    connect: SocketAddr,

    /// Interval between `updateAltitudeAGL` reports.
    #[arg(long, default_value_t = 1000)]
    agl_interval_ms: u64,

    /// Terrain elevation (m MSL) subtracted from the received altitude.
    #[arg(long, default_value_t = 0.0)]
    terrain_elevation: f64,

    /// Report a warning lamp click right after connecting.
    #[arg(long, default_value_t = false)]
    send_event: bool,
}

/// What the probe has seen so far.
#[derive(Debug, Default)]
struct Observed {
    calls: BTreeMap<Procedure, u64>,
    rejected: u64,
    altitude: Option<f64>,
    traffic: usize,
}

impl Observed {
    fn record(&mut self, call: &RemoteCall) {
        *self.calls.entry(call.procedure()).or_default() += 1;
        match call {
            RemoteCall::UpdateSensorData(data) => self.altitude = Some(data.altitude),
            RemoteCall::UpdateTrafficData(traffic) => {
                self.traffic = traffic.len();
                for target in traffic {
                    debug!(
                        icao = target.icao_address,
                        name = %target.display_name(),
                        altitude_ft = ?target.pressure_altitude,
                        "traffic"
                    );
                }
            }
            RemoteCall::SetOverrideValues(values) => {
                debug!(batteries = ?values.battery_levels, lamps = ?values.warning_levels, "overrides");
            }
            RemoteCall::SetGenericValues(values) => {
                debug!(single = values.single_values.len(), multi = values.multi_values.len(), "generic values");
            }
            RemoteCall::UpdateAltitudeAgl(_) | RemoteCall::UpdateEvent(_) => {}
        }
    }

    fn altitude_agl(&self, terrain_elevation: f64) -> Option<f64> {
        self.altitude.map(|altitude| altitude - terrain_elevation)
    }
}

/// Decode one inbound call and produce the answer to send back.
fn handle_call(observed: &mut Observed, procedure: &str, arguments: &[Value]) -> Result<Value, RpcFailure> {
    match RemoteCall::decode(procedure, arguments) {
        Ok(call) => {
            observed.record(&call);
            Ok(Value::Null)
        }
        Err(e) => {
            observed.rejected += 1;
            warn!(%procedure, error = %e, "undecodable push");
            Err(RpcFailure::invalid_params(e.to_string()))
        }
    }
}

fn handle_outcome(outcome: &CallOutcome) {
    match outcome {
        CallOutcome::Result { id, .. } => debug!(id, "report acknowledged"),
        CallOutcome::Error { id, code, message, data } => {
            warn!(id, code, %message, ?data, "report refused");
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut connection = JsonRpcConnection::connect(args.connect)
        .await
        .with_context(|| format!("failed to connect to {}", args.connect))?;
    for procedure in Procedure::received_by(Direction::SourceToConsumer) {
        connection.register_receiver(procedure);
    }

    if args.send_event {
        connection.call(&OutboundCall::update_event(RemoteEvent::WarningLampClicked))?;
        info!(event = %RemoteEvent::WarningLampClicked, "event sent");
    }

    let mut observed = Observed::default();
    let mut poll = tokio::time::interval(Duration::from_millis(10));
    let mut agl = tokio::time::interval(Duration::from_millis(args.agl_interval_ms.max(1)));
    let mut summary = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = poll.tick() => {
                for inbound in connection.pump() {
                    match inbound {
                        Inbound::Call { procedure, arguments, request } => {
                            let answer = handle_call(&mut observed, &procedure, &arguments);
                            let Some(request) = request else { continue };
                            if let Err(e) = connection.respond(request, answer) {
                                debug!(%procedure, error = %e, "could not answer push");
                            }
                        }
                        Inbound::Outcome(outcome) => handle_outcome(&outcome),
                    }
                }
                if !connection.is_connected() {
                    info!(peer = %connection.peer(), "server closed the connection");
                    return Ok(());
                }
            }
            _ = agl.tick() => {
                let altitude = observed.altitude_agl(args.terrain_elevation);
                if let Err(e) = connection.call(&OutboundCall::update_altitude_agl(altitude)) {
                    debug!(error = %e, "altitude report not sent");
                }
            }
            _ = summary.tick() => {
                info!(
                    calls = ?observed.calls,
                    rejected = observed.rejected,
                    traffic = observed.traffic,
                    altitude = ?observed.altitude,
                    "received so far"
                );
            }
            result = tokio::signal::ctrl_c() => {
                result.context("failed to wait for Ctrl-C")?;
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpcsensor_models::{RemoteSensorData, RemoteTrafficElement, WireCodec};
    use serde_json::json;

    #[test]
    fn sensor_push_updates_altitude() {
        let mut observed = Observed::default();
        let data = RemoteSensorData {
            altitude: 1333.0,
            ..RemoteSensorData::default()
        };
        let answer = handle_call(&mut observed, "updateSensorData", &[data.encode().unwrap()]);
        assert_eq!(answer, Ok(Value::Null));
        assert_eq!(observed.calls[&Procedure::UpdateSensorData], 1);
        assert_eq!(observed.altitude_agl(333.0), Some(1000.0));
    }

    #[test]
    fn no_altitude_before_first_push() {
        assert_eq!(Observed::default().altitude_agl(0.0), None);
    }

    #[test]
    fn traffic_push_counts_targets() {
        let mut observed = Observed::default();
        let traffic = vec![RemoteTrafficElement::default(); 2];
        let wire = traffic.encode().unwrap();
        handle_call(&mut observed, "updateTrafficData", &[wire]).unwrap();
        assert_eq!(observed.traffic, 2);
    }

    #[test]
    fn malformed_push_is_refused() {
        let mut observed = Observed::default();
        let answer = handle_call(&mut observed, "setOverrideValues", &[json!({ "batteryLevels": "full" })]);
        assert_eq!(answer.unwrap_err().code, rpcsensor_sdk::jsonrpc::INVALID_PARAMS);
        assert_eq!(observed.rejected, 1);
        assert!(observed.calls.is_empty());
    }

    #[test]
    fn cli_defaults() {
        let args = Args::parse_from(["rpcsensor-probe"]);
        assert_eq!(args.connect.port(), 48753);
        assert_eq!(args.agl_interval_ms, 1000);
        assert!(!args.send_event);
    }
}
