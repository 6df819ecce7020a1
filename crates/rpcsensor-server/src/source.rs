//! The data-producing collaborator of a session.

use rpcsensor_models::{
    GenericValues, OverrideValues, RemoteEvent, RemoteSensorData, RemoteTrafficElement,
};
use tracing::info;

/// Supplies the native state a session pushes, and receives what the
/// consumer reports back.
///
/// The session owns the state and lends it out for in-place refresh right
/// before each push.
pub trait DataSource {
    /// Refresh the aircraft state.
    fn fill_sensor_data(&mut self, data: &mut RemoteSensorData);

    /// Refresh the indication overrides.
    fn fill_override_values(&mut self, values: &mut OverrideValues);

    /// Refresh the free-form indicator values.
    fn fill_generic_values(&mut self, values: &mut GenericValues);

    /// Refresh the nearby traffic list.
    fn fill_traffic(&mut self, traffic: &mut Vec<RemoteTrafficElement>);

    /// The consumer reported the height above ground (`None` if unknown).
    fn on_altitude_agl(&mut self, altitude: Option<f64>) {
        info!(?altitude, "altitude AGL");
    }

    /// The consumer reported a user interaction.
    fn on_event(&mut self, event: RemoteEvent) {
        info!(%event, "event received");
    }
}
