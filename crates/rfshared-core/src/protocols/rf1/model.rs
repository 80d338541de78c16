//! Owned snapshot types.
//!
//! Field names match the Layout Catalog entries and are used verbatim as the
//! JSON keys. Enum-coded fields hold the raw code as read from the wire; the
//! typed accessors return `None` for codes outside the defined set.

use std::borrow::Cow;
use std::fmt;

use serde::{Serialize, Serializer};

use super::enums::{
    ControlSource, FinishStatus, GamePhase, Sector, SurfaceType, WheelIndex, YellowFlagState,
};
use super::layout::{
    DENT_LOCATIONS, LONG_NAME_LEN, MAX_VEHICLES, SECTOR_COUNT, SHORT_NAME_LEN, TERRAIN_NAME_LEN,
    TIRE_TEMPERATURE_POINTS, WHEEL_COUNT,
};
use crate::protocols::common::reader::trim_at_nul;

/// Fixed-width text field copied byte for byte from the wire.
///
/// The producer NUL-pads these fields but a name that fills the whole width
/// carries no terminator, so the text ends at the first NUL or at `N`.
///
/// # Examples
/// ```
/// use rfshared_core::FixedText;
///
/// let mut raw = [0u8; 16];
/// raw[..5].copy_from_slice(b"Mario");
/// let text = FixedText::new(raw);
/// assert_eq!(text.as_bytes(), b"Mario");
/// assert_eq!(text.to_string_lossy(), "Mario");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedText<const N: usize>([u8; N]);

impl<const N: usize> FixedText<N> {
    pub const fn new(raw: [u8; N]) -> Self {
        Self(raw)
    }

    /// Text bytes up to, not including, the first NUL.
    pub fn as_bytes(&self) -> &[u8] {
        trim_at_nul(&self.0)
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }

    /// The full field, padding included.
    pub fn raw(&self) -> &[u8; N] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

impl<const N: usize> Default for FixedText<N> {
    fn default() -> Self {
        Self([0; N])
    }
}

impl<const N: usize> fmt::Display for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl<const N: usize> fmt::Debug for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}

impl<const N: usize> Serialize for FixedText<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

/// Three packed floats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Per-wheel dynamics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Wheel {
    /// radians/sec
    pub rotation: f32,
    /// meters
    pub suspension_deflection: f32,
    /// meters
    pub ride_height: f32,
    /// Newtons
    pub tire_load: f32,
    /// Newtons
    pub lateral_force: f32,
    /// Approximate fraction of the contact patch that is sliding.
    pub grip_fract: f32,
    /// Celsius
    pub brake_temp: f32,
    /// kPa
    pub pressure: f32,
    /// Celsius, left/center/right.
    pub temperature: [f32; TIRE_TEMPERATURE_POINTS],
    /// 0.0-1.0, fraction of maximum.
    pub wear: f32,
    pub terrain_name: FixedText<TERRAIN_NAME_LEN>,
    pub surface_type: i8,
    pub flat: bool,
    pub detached: bool,
}

impl Wheel {
    pub fn surface_type(&self) -> Option<SurfaceType> {
        SurfaceType::from_code(self.surface_type)
    }
}

/// Scoring record for one car.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct VehicleInfo {
    pub driver_name: FixedText<SHORT_NAME_LEN>,
    pub vehicle_name: FixedText<LONG_NAME_LEN>,
    pub total_laps: i16,
    pub sector: i8,
    pub finish_status: i8,
    pub lap_dist: f32,
    pub path_lateral: f32,
    pub track_edge: f32,
    pub best_sector1: f32,
    pub best_sector2: f32,
    pub best_lap_time: f32,
    pub last_sector1: f32,
    pub last_sector2: f32,
    pub last_lap_time: f32,
    pub cur_sector1: f32,
    pub cur_sector2: f32,
    pub num_pitstops: i16,
    pub num_penalties: i16,
    pub is_player: bool,
    pub control: i8,
    pub in_pits: bool,
    /// 1-based position.
    pub place: u8,
    pub vehicle_class: FixedText<SHORT_NAME_LEN>,
    pub time_behind_next: f32,
    pub laps_behind_next: i32,
    pub time_behind_leader: f32,
    pub laps_behind_leader: i32,
    pub lap_start_et: f32,
    pub pos: Vec3,
    /// meters/sec
    pub speed: f32,
}

impl VehicleInfo {
    pub fn sector(&self) -> Option<Sector> {
        Sector::from_code(self.sector)
    }

    pub fn finish_status(&self) -> Option<FinishStatus> {
        FinishStatus::from_code(self.finish_status)
    }

    pub fn control(&self) -> Option<ControlSource> {
        ControlSource::from_code(self.control)
    }
}

/// One decoded telemetry sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub delta_time: f32,
    pub lap_number: i32,
    pub lap_start_et: f32,
    pub vehicle_name: FixedText<LONG_NAME_LEN>,
    pub track_name: FixedText<LONG_NAME_LEN>,

    /// World position in meters.
    pub pos: Vec3,
    pub local_vel: Vec3,
    pub local_accel: Vec3,
    pub ori_x: Vec3,
    pub ori_y: Vec3,
    pub ori_z: Vec3,
    pub local_rot: Vec3,
    pub local_rot_accel: Vec3,
    /// meters/sec
    pub speed: f32,

    /// -1 reverse, 0 neutral, 1+ forward gears.
    pub gear: i32,
    pub engine_rpm: f32,
    pub engine_water_temp: f32,
    pub engine_oil_temp: f32,
    pub clutch_rpm: f32,

    pub unfiltered_throttle: f32,
    pub unfiltered_brake: f32,
    pub unfiltered_steering: f32,
    pub unfiltered_clutch: f32,
    pub steering_arm_force: f32,

    /// liters
    pub fuel: f32,
    pub engine_max_rpm: f32,
    pub scheduled_stops: u8,
    pub overheating: bool,
    pub detached: bool,
    pub dent_severity: [i8; DENT_LOCATIONS],
    pub last_impact_et: f32,
    pub last_impact_magnitude: f32,
    pub last_impact_pos: Vec3,

    pub wheels: [Wheel; WHEEL_COUNT],

    pub session: i32,
    pub current_et: f32,
    pub end_et: f32,
    pub max_laps: i32,
    pub lap_dist: f32,
    pub num_vehicles: i32,
    pub game_phase: i8,
    pub yellow_flag_state: i8,
    pub sector_flag: [i8; SECTOR_COUNT],
    pub start_light: u8,
    pub num_red_lights: u8,
    pub in_realtime: bool,
    pub player_name: FixedText<SHORT_NAME_LEN>,
    pub plr_file_name: FixedText<LONG_NAME_LEN>,

    /// Celsius
    pub ambient_temp: f32,
    /// Celsius
    pub track_temp: f32,
    pub wind: Vec3,

    #[serde(serialize_with = "serialize_vehicles")]
    pub vehicles: [VehicleInfo; MAX_VEHICLES],
}

impl Snapshot {
    pub fn game_phase(&self) -> Option<GamePhase> {
        GamePhase::from_code(self.game_phase)
    }

    pub fn yellow_flag_state(&self) -> Option<YellowFlagState> {
        YellowFlagState::from_code(self.yellow_flag_state)
    }

    pub fn wheel(&self, index: WheelIndex) -> &Wheel {
        &self.wheels[index.index()]
    }

    /// The first `num_vehicles` scoring entries, clamped to the array length.
    pub fn active_vehicles(&self) -> &[VehicleInfo] {
        let count = usize::try_from(self.num_vehicles)
            .unwrap_or(0)
            .min(MAX_VEHICLES);
        &self.vehicles[..count]
    }

    pub fn player(&self) -> Option<&VehicleInfo> {
        self.active_vehicles().iter().find(|vehicle| vehicle.is_player)
    }
}

fn serialize_vehicles<S: Serializer>(
    vehicles: &[VehicleInfo; MAX_VEHICLES],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(vehicles.iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text<const N: usize>(value: &[u8]) -> FixedText<N> {
        let mut raw = [0u8; N];
        raw[..value.len()].copy_from_slice(value);
        FixedText::new(raw)
    }

    #[test]
    fn fixed_text_stops_at_first_nul() {
        let name: FixedText<8> = text(b"ab\0cd");
        assert_eq!(name.as_bytes(), b"ab");
        assert_eq!(name.raw(), b"ab\0cd\0\0\0");
    }

    #[test]
    fn fixed_text_without_terminator_uses_full_width() {
        let name: FixedText<4> = FixedText::new(*b"LONG");
        assert_eq!(name.to_string(), "LONG");
        assert!(!name.is_empty());
    }

    #[test]
    fn fixed_text_serializes_as_string() {
        let name: FixedText<16> = text(b"Monaco");
        assert_eq!(serde_json::to_value(name).unwrap(), "Monaco");
        assert_eq!(format!("{name:?}"), "\"Monaco\"");
    }

    #[test]
    fn enum_accessors_reject_unknown_codes() {
        let wheel = Wheel {
            surface_type: 2,
            ..Wheel::default()
        };
        assert_eq!(wheel.surface_type(), Some(SurfaceType::Grass));

        let vehicle = VehicleInfo {
            sector: 0,
            finish_status: 9,
            control: -1,
            ..VehicleInfo::default()
        };
        assert_eq!(vehicle.sector(), Some(Sector::Sector3));
        assert_eq!(vehicle.finish_status(), None);
        assert_eq!(vehicle.control(), Some(ControlSource::Nobody));
    }

    #[test]
    fn player_is_searched_among_active_vehicles_only() {
        let raw = vec![0u8; crate::protocols::rf1::layout::SNAPSHOT_SIZE];
        let mut snapshot = crate::protocols::rf1::decode(&raw).unwrap();
        assert!(snapshot.player().is_none());

        snapshot.num_vehicles = 2;
        snapshot.vehicles[1].is_player = true;
        snapshot.vehicles[1].place = 4;
        snapshot.vehicles[2].is_player = true;
        snapshot.vehicles[2].place = 9;
        assert_eq!(snapshot.player().map(|v| v.place), Some(4));

        snapshot.vehicles[1].is_player = false;
        assert!(snapshot.player().is_none());
    }

    #[test]
    fn active_vehicles_clamps_count() {
        let raw = vec![0u8; crate::protocols::rf1::layout::SNAPSHOT_SIZE];
        let mut snapshot = crate::protocols::rf1::decode(&raw).unwrap();
        snapshot.num_vehicles = -3;
        assert!(snapshot.active_vehicles().is_empty());
        snapshot.num_vehicles = 500;
        assert_eq!(snapshot.active_vehicles().len(), MAX_VEHICLES);
    }
}
