//! Synthetic telemetry for exercising a consumer without an aircraft.
//!
//! Everything oscillates on slow sine waves around a point near Zell am
//! See (LOWZ), so a connected display visibly moves, banks and cycles its
//! warning colors.

use std::f64::consts::PI;
use std::time::Instant;

use rpcsensor_models::{
    GenericValues, OverrideValues, RemoteSensorData, RemoteTrafficElement, ValueWithFill,
    ValueWithLevel, WarningLevel, attitude,
};

use crate::source::DataSource;

const HOME_LONGITUDE: f64 = 12.791;
const HOME_LATITUDE: f64 = 47.2916;

/// 13-bit transponder code, wire encoded.
const DEMO_SQUAWK: i32 = 896;

/// Sine-wave data source, one per session.
pub struct DemoDataSource {
    start: Instant,
}

impl DemoDataSource {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    fn seconds(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for DemoDataSource {
    fn default() -> Self {
        Self::new()
    }
}

/// `sin(2π f t)`.
fn wave(frequency: f64, t: f64) -> f64 {
    (2.0 * PI * frequency * t).sin()
}

#[allow(clippy::cast_possible_truncation)]
fn whole_seconds(t: f64) -> i64 {
    t.floor() as i64
}

/// Groundtrack sweeping a full circle every 36 seconds.
fn demo_track(t: f64) -> f64 {
    (t % 36.0) * 10.0
}

fn sensor_data_at(t: f64, data: &mut RemoteSensorData) {
    let p = wave(0.25, t);
    data.longitude = HOME_LONGITUDE + p * 0.01;
    data.latitude = HOME_LATITUDE + p * 0.01;
    data.altitude = 1333.0 + p * 33.0;
    data.groundspeed = 50.0 + p * 10.0;
    data.groundtrack = demo_track(t);
    data.sat_count = 66;
    data.attitude = attitude::from_euler_degrees(data.groundtrack, p * 30.0, p * 30.0);
    data.indicated_heading = data.groundtrack;
    data.true_heading = Some(data.groundtrack + 3.0);
    data.magnetic_heading = data.true_heading.map(|h| h + 5.0);
    data.acceleration = attitude::transform(&attitude::roll((-p * 30.0).to_radians()), [0.0, -9.81, 0.0]);
    data.vertical_speed = p * 5.0;
    data.turn_rate = p * 10.0;
    data.airspeed = Some(data.groundspeed);
    data.press_inside = Some(900.0 + p * 3.0);
    data.press_outside = data.press_inside;
    data.temp_inside = None;
    data.temp_outside = Some(25.0 + p * 5.0);
    data.loc90 = Some(1.0 + 0.5 * p);
    data.loc150 = Some(1.0 - 0.5 * p);
    data.gs90 = data.loc90;
    data.gs150 = data.loc150;
    data.aoa = Some(5.0 + 5.0 * p);
    data.max_aoa = Some(10.0);
    data.warning_level = WarningLevel::cycle(whole_seconds(t));
}

#[allow(clippy::cast_possible_truncation)]
fn override_values_at(t: f64, values: &mut OverrideValues) {
    let phase = 2.0 * PI * 0.25 * t;
    let n = whole_seconds(t);
    values.battery_levels = vec![(0.5 + 0.5 * phase.sin()) as f32, (0.5 + 0.5 * phase.cos()) as f32];
    values.battery_warning_levels = vec![WarningLevel::cycle(n), WarningLevel::cycle(n + 1)];
    values.warning_levels = vec![WarningLevel::cycle(n), WarningLevel::cycle(n + 1)];
}

#[allow(clippy::cast_possible_truncation)]
fn generic_values_at(t: f64, values: &mut GenericValues) {
    let phase = 2.0 * PI * 0.25 * t;
    let n = whole_seconds(t);
    values
        .single_values
        .insert("key".into(), ValueWithLevel::new(n.to_string(), WarningLevel::cycle(n)));
    values.multi_values.insert(
        "multikey".into(),
        vec![
            ValueWithFill::new((0.5 + 0.5 * phase.sin()) as f32, n.to_string(), WarningLevel::cycle(n)),
            ValueWithFill::new(
                (0.5 + 0.5 * phase.cos()) as f32,
                whole_seconds(10.0 * t).to_string(),
                WarningLevel::cycle(n + 1),
            ),
        ],
    );
}

#[allow(clippy::cast_possible_truncation)]
fn traffic_at(t: f64, traffic: &mut Vec<RemoteTrafficElement>) {
    let p = wave(0.5, t);
    traffic.resize_with(1, RemoteTrafficElement::default);
    let target = &mut traffic[0];
    target.icao_address = 1234;
    target.longitude = Some(HOME_LONGITUDE + p * 0.01);
    target.latitude = Some(HOME_LATITUDE + p * 0.01);
    target.pressure_altitude = Some((3000.0 + p * 100.0) as i32);
    target.velocity = Some((100.0 + p * 20.0) as i32);
    target.climb_rate = Some((p * 500.0) as i32);
    target.squawk = Some(DEMO_SQUAWK);
    target.groundtrack = Some(demo_track(t));
    target.name = "D-TEST".into();
}

impl DataSource for DemoDataSource {
    fn fill_sensor_data(&mut self, data: &mut RemoteSensorData) {
        sensor_data_at(self.seconds(), data);
    }

    fn fill_override_values(&mut self, values: &mut OverrideValues) {
        override_values_at(self.seconds(), values);
    }

    fn fill_generic_values(&mut self, values: &mut GenericValues) {
        generic_values_at(self.seconds(), values);
    }

    fn fill_traffic(&mut self, traffic: &mut Vec<RemoteTrafficElement>) {
        traffic_at(self.seconds(), traffic);
    }
}
