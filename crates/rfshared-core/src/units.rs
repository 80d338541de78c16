//! Unit conversions for decoded values.
//!
//! The producer reports SI-ish units: meters/sec, kPa, Celsius and liters.
//! The functions here are pure and total; `UnitSystem` picks which of them a
//! report applies.

use serde::Serialize;

use crate::Snapshot;
use crate::protocols::rf1::layout::WHEEL_COUNT;

pub fn mps_to_mph(mps: f32) -> f32 {
    mps * 2.23694
}

pub fn mps_to_kph(mps: f32) -> f32 {
    mps * 3.6
}

pub fn kpa_to_psi(kpa: f32) -> f32 {
    kpa * 0.145038
}

pub fn c_to_f(celsius: f32) -> f32 {
    celsius * 1.8 + 32.0
}

/// Liters to US gallons.
pub fn l_to_g(liters: f32) -> f32 {
    liters * 0.264172
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    /// kph, kPa, Celsius, liters.
    #[default]
    Metric,
    /// mph, psi, Fahrenheit, US gallons.
    Imperial,
}

impl UnitSystem {
    pub fn speed(self, mps: f32) -> f32 {
        match self {
            UnitSystem::Metric => mps_to_kph(mps),
            UnitSystem::Imperial => mps_to_mph(mps),
        }
    }

    pub fn pressure(self, kpa: f32) -> f32 {
        match self {
            UnitSystem::Metric => kpa,
            UnitSystem::Imperial => kpa_to_psi(kpa),
        }
    }

    pub fn temperature(self, celsius: f32) -> f32 {
        match self {
            UnitSystem::Metric => celsius,
            UnitSystem::Imperial => c_to_f(celsius),
        }
    }

    pub fn volume(self, liters: f32) -> f32 {
        match self {
            UnitSystem::Metric => liters,
            UnitSystem::Imperial => l_to_g(liters),
        }
    }

    pub fn labels(self) -> UnitLabels {
        match self {
            UnitSystem::Metric => UnitLabels {
                speed: "kph",
                pressure: "kPa",
                temperature: "C",
                volume: "L",
            },
            UnitSystem::Imperial => UnitLabels {
                speed: "mph",
                pressure: "psi",
                temperature: "F",
                volume: "gal",
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnitLabels {
    pub speed: &'static str,
    pub pressure: &'static str,
    pub temperature: &'static str,
    pub volume: &'static str,
}

/// Headline values of a snapshot converted into one unit system.
///
/// # Examples
/// ```
/// use rfshared_core::{DerivedValues, SNAPSHOT_SIZE, UnitSystem, decode};
///
/// let snapshot = decode(&vec![0u8; SNAPSHOT_SIZE]).unwrap();
/// let derived = DerivedValues::from_snapshot(&snapshot, UnitSystem::Imperial);
/// assert_eq!(derived.ambient_temp, 32.0);
/// assert_eq!(derived.units.temperature, "F");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedValues {
    pub units: UnitLabels,
    pub speed: f32,
    pub fuel: f32,
    pub engine_water_temp: f32,
    pub engine_oil_temp: f32,
    pub ambient_temp: f32,
    pub track_temp: f32,
    /// Front-left, front-right, rear-left, rear-right.
    pub tire_pressure: [f32; WHEEL_COUNT],
    pub brake_temp: [f32; WHEEL_COUNT],
}

impl DerivedValues {
    pub fn from_snapshot(snapshot: &Snapshot, units: UnitSystem) -> Self {
        Self {
            units: units.labels(),
            speed: units.speed(snapshot.speed),
            fuel: units.volume(snapshot.fuel),
            engine_water_temp: units.temperature(snapshot.engine_water_temp),
            engine_oil_temp: units.temperature(snapshot.engine_oil_temp),
            ambient_temp: units.temperature(snapshot.ambient_temp),
            track_temp: units.temperature(snapshot.track_temp),
            tire_pressure: snapshot.wheels.map(|wheel| units.pressure(wheel.pressure)),
            brake_temp: snapshot.wheels.map(|wheel| units.temperature(wheel.brake_temp)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-4;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < TOLERANCE,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn speed_conversions() {
        assert_close(mps_to_kph(10.0), 36.0);
        assert_close(mps_to_mph(10.0), 22.3694);
        assert_close(mps_to_kph(0.0), 0.0);
    }

    #[test]
    fn pressure_conversion() {
        assert_close(kpa_to_psi(100.0), 14.5038);
    }

    #[test]
    fn temperature_conversion() {
        assert_close(c_to_f(0.0), 32.0);
        assert_close(c_to_f(100.0), 212.0);
        assert_close(c_to_f(-40.0), -40.0);
    }

    #[test]
    fn volume_conversion() {
        assert_close(l_to_g(1.0), 0.264172);
    }

    #[test]
    fn metric_is_identity_except_speed() {
        let units = UnitSystem::Metric;
        assert_close(units.speed(10.0), 36.0);
        assert_eq!(units.pressure(180.0), 180.0);
        assert_eq!(units.temperature(90.0), 90.0);
        assert_eq!(units.volume(50.0), 50.0);
        assert_eq!(units.labels().speed, "kph");
    }

    #[test]
    fn imperial_applies_every_conversion() {
        let units = UnitSystem::Imperial;
        assert_close(units.speed(10.0), 22.3694);
        assert_close(units.pressure(100.0), 14.5038);
        assert_close(units.temperature(0.0), 32.0);
        assert_close(units.volume(1.0), 0.264172);
        assert_eq!(units.labels().volume, "gal");
    }
}
