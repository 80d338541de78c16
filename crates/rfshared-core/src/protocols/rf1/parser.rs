use tracing::{debug, trace};

use super::error::DecodeError;
use super::layout::{self, SNAPSHOT_SIZE, StructKind};
use super::model::{Snapshot, Vec3, VehicleInfo, Wheel};
use super::reader::{ByteReader, FieldCursor};

/// Decode one raw `$rFactorShared$` snapshot.
///
/// The buffer must be exactly [`SNAPSHOT_SIZE`] bytes long; its length is
/// checked before any field is read. Values are copied out as-is: enum codes
/// outside their defined set and non-ASCII text are preserved, not rejected.
///
/// # Examples
/// ```
/// use rfshared_core::{DecodeError, SNAPSHOT_SIZE, decode};
///
/// let snapshot = decode(&vec![0u8; SNAPSHOT_SIZE])?;
/// assert_eq!(snapshot.num_vehicles, 0);
///
/// let err = decode(&[0u8; 16]).unwrap_err();
/// assert_eq!(err, DecodeError::SizeMismatch { expected: SNAPSHOT_SIZE, actual: 16 });
/// # Ok::<(), DecodeError>(())
/// ```
pub fn decode(buffer: &[u8]) -> Result<Snapshot, DecodeError> {
    let mut bytes = ByteReader::new(buffer);
    if let Err(err) = bytes.require_len(SNAPSHOT_SIZE) {
        debug!(actual = buffer.len(), expected = SNAPSHOT_SIZE, "rejecting snapshot buffer");
        return Err(err);
    }

    let mut fields = FieldCursor::new(&mut bytes, StructKind::Shared);
    let snapshot = decode_shared(&mut fields)?;
    fields.finish();
    debug_assert_eq!(bytes.position(), layout::total_size(StructKind::Shared));

    trace!(
        num_vehicles = snapshot.num_vehicles,
        game_phase = snapshot.game_phase,
        "decoded snapshot"
    );
    Ok(snapshot)
}

fn decode_vec3(fields: &mut FieldCursor<'_, '_>) -> Result<Vec3, DecodeError> {
    Ok(Vec3 {
        x: fields.f32("x")?,
        y: fields.f32("y")?,
        z: fields.f32("z")?,
    })
}

fn vec3(fields: &mut FieldCursor<'_, '_>, name: &str) -> Result<Vec3, DecodeError> {
    fields.nested(name, StructKind::Vec3, decode_vec3)
}

fn decode_wheel(fields: &mut FieldCursor<'_, '_>) -> Result<Wheel, DecodeError> {
    Ok(Wheel {
        rotation: fields.f32("rotation")?,
        suspension_deflection: fields.f32("suspension_deflection")?,
        ride_height: fields.f32("ride_height")?,
        tire_load: fields.f32("tire_load")?,
        lateral_force: fields.f32("lateral_force")?,
        grip_fract: fields.f32("grip_fract")?,
        brake_temp: fields.f32("brake_temp")?,
        pressure: fields.f32("pressure")?,
        temperature: fields.f32_array("temperature")?,
        wear: fields.f32("wear")?,
        terrain_name: fields.text("terrain_name")?,
        surface_type: fields.i8("surface_type")?,
        flat: fields.bool("flat")?,
        detached: fields.bool("detached")?,
    })
}

fn decode_vehicle(fields: &mut FieldCursor<'_, '_>) -> Result<VehicleInfo, DecodeError> {
    Ok(VehicleInfo {
        driver_name: fields.text("driver_name")?,
        vehicle_name: fields.text("vehicle_name")?,
        total_laps: fields.i16("total_laps")?,
        sector: fields.i8("sector")?,
        finish_status: fields.i8("finish_status")?,
        lap_dist: fields.f32("lap_dist")?,
        path_lateral: fields.f32("path_lateral")?,
        track_edge: fields.f32("track_edge")?,
        best_sector1: fields.f32("best_sector1")?,
        best_sector2: fields.f32("best_sector2")?,
        best_lap_time: fields.f32("best_lap_time")?,
        last_sector1: fields.f32("last_sector1")?,
        last_sector2: fields.f32("last_sector2")?,
        last_lap_time: fields.f32("last_lap_time")?,
        cur_sector1: fields.f32("cur_sector1")?,
        cur_sector2: fields.f32("cur_sector2")?,
        num_pitstops: fields.i16("num_pitstops")?,
        num_penalties: fields.i16("num_penalties")?,
        is_player: fields.bool("is_player")?,
        control: fields.i8("control")?,
        in_pits: fields.bool("in_pits")?,
        place: fields.u8("place")?,
        vehicle_class: fields.text("vehicle_class")?,
        time_behind_next: fields.f32("time_behind_next")?,
        laps_behind_next: fields.i32("laps_behind_next")?,
        time_behind_leader: fields.f32("time_behind_leader")?,
        laps_behind_leader: fields.i32("laps_behind_leader")?,
        lap_start_et: fields.f32("lap_start_et")?,
        pos: vec3(fields, "pos")?,
        speed: fields.f32("speed")?,
    })
}

// Struct literal fields are evaluated in source order, which is catalog order.
fn decode_shared(fields: &mut FieldCursor<'_, '_>) -> Result<Snapshot, DecodeError> {
    Ok(Snapshot {
        delta_time: fields.f32("delta_time")?,
        lap_number: fields.i32("lap_number")?,
        lap_start_et: fields.f32("lap_start_et")?,
        vehicle_name: fields.text("vehicle_name")?,
        track_name: fields.text("track_name")?,

        pos: vec3(fields, "pos")?,
        local_vel: vec3(fields, "local_vel")?,
        local_accel: vec3(fields, "local_accel")?,
        ori_x: vec3(fields, "ori_x")?,
        ori_y: vec3(fields, "ori_y")?,
        ori_z: vec3(fields, "ori_z")?,
        local_rot: vec3(fields, "local_rot")?,
        local_rot_accel: vec3(fields, "local_rot_accel")?,
        speed: fields.f32("speed")?,

        gear: fields.i32("gear")?,
        engine_rpm: fields.f32("engine_rpm")?,
        engine_water_temp: fields.f32("engine_water_temp")?,
        engine_oil_temp: fields.f32("engine_oil_temp")?,
        clutch_rpm: fields.f32("clutch_rpm")?,

        unfiltered_throttle: fields.f32("unfiltered_throttle")?,
        unfiltered_brake: fields.f32("unfiltered_brake")?,
        unfiltered_steering: fields.f32("unfiltered_steering")?,
        unfiltered_clutch: fields.f32("unfiltered_clutch")?,
        steering_arm_force: fields.f32("steering_arm_force")?,

        fuel: fields.f32("fuel")?,
        engine_max_rpm: fields.f32("engine_max_rpm")?,
        scheduled_stops: fields.u8("scheduled_stops")?,
        overheating: fields.bool("overheating")?,
        detached: fields.bool("detached")?,
        dent_severity: fields.i8_array("dent_severity")?,
        last_impact_et: fields.f32("last_impact_et")?,
        last_impact_magnitude: fields.f32("last_impact_magnitude")?,
        last_impact_pos: vec3(fields, "last_impact_pos")?,

        wheels: fields.nested_array("wheels", StructKind::Wheel, decode_wheel)?,

        session: fields.i32("session")?,
        current_et: fields.f32("current_et")?,
        end_et: fields.f32("end_et")?,
        max_laps: fields.i32("max_laps")?,
        lap_dist: fields.f32("lap_dist")?,
        num_vehicles: fields.i32("num_vehicles")?,
        game_phase: fields.i8("game_phase")?,
        yellow_flag_state: fields.i8("yellow_flag_state")?,
        sector_flag: fields.i8_array("sector_flag")?,
        start_light: fields.u8("start_light")?,
        num_red_lights: fields.u8("num_red_lights")?,
        in_realtime: fields.bool("in_realtime")?,
        player_name: fields.text("player_name")?,
        plr_file_name: fields.text("plr_file_name")?,

        ambient_temp: fields.f32("ambient_temp")?,
        track_temp: fields.f32("track_temp")?,
        wind: vec3(fields, "wind")?,

        vehicles: fields.nested_array("vehicles", StructKind::VehicleInfo, decode_vehicle)?,
    })
}

#[cfg(test)]
mod tests {
    use super::decode;
    use crate::protocols::rf1::enums::{GamePhase, WheelIndex, YellowFlagState};
    use crate::protocols::rf1::error::DecodeError;
    use crate::protocols::rf1::layout::{self, SNAPSHOT_SIZE, StructKind};

    fn put(buffer: &mut [u8], path: &str, bytes: &[u8]) {
        let range = layout::path_range(path).unwrap();
        buffer[range.start..range.start + bytes.len()].copy_from_slice(bytes);
    }

    #[test]
    fn decode_zeroed_snapshot() {
        let snapshot = decode(&vec![0u8; SNAPSHOT_SIZE]).unwrap();
        assert_eq!(snapshot.delta_time, 0.0);
        assert!(snapshot.vehicle_name.is_empty());
        assert_eq!(snapshot.game_phase(), Some(GamePhase::Garage));
        assert!(snapshot.active_vehicles().is_empty());
    }

    #[test]
    fn decode_scalars_at_producer_offsets() {
        let mut buffer = vec![0u8; SNAPSHOT_SIZE];
        buffer[0..4].copy_from_slice(&0.016f32.to_le_bytes());
        buffer[4..8].copy_from_slice(&7i32.to_le_bytes());
        buffer[240..244].copy_from_slice(&(-1i32).to_le_bytes());
        buffer[280..284].copy_from_slice(&42.5f32.to_le_bytes());
        buffer[607..611].copy_from_slice(&3i32.to_le_bytes());
        buffer[611] = 5;
        buffer[612] = 0xff;
        buffer[618] = 1;

        let snapshot = decode(&buffer).unwrap();
        assert_eq!(snapshot.delta_time, 0.016);
        assert_eq!(snapshot.lap_number, 7);
        assert_eq!(snapshot.gear, -1);
        assert_eq!(snapshot.fuel, 42.5);
        assert_eq!(snapshot.num_vehicles, 3);
        assert_eq!(snapshot.game_phase(), Some(GamePhase::GreenFlag));
        assert_eq!(snapshot.yellow_flag_state(), Some(YellowFlagState::Invalid));
        assert!(snapshot.in_realtime);
        assert_eq!(snapshot.active_vehicles().len(), 3);
    }

    #[test]
    fn decode_nested_wheel_and_vehicle() {
        let mut buffer = vec![0u8; SNAPSHOT_SIZE];
        put(&mut buffer, "wheels[1].temperature", &[
            0, 0, 0xa0, 0x42, // 80.0
            0, 0, 0xa8, 0x42, // 84.0
            0, 0, 0xb0, 0x42, // 88.0
        ]);
        put(&mut buffer, "wheels[1].terrain_name", b"ROAD");
        put(&mut buffer, "wheels[1].flat", &[2]);
        put(&mut buffer, "vehicles[5].place", &[6]);
        put(&mut buffer, "vehicles[5].pos.z", &(-12.0f32).to_le_bytes());
        put(&mut buffer, "vehicles[5].laps_behind_leader", &1i32.to_le_bytes());

        let snapshot = decode(&buffer).unwrap();
        let wheel = snapshot.wheel(WheelIndex::FrontRight);
        assert_eq!(wheel.temperature, [80.0, 84.0, 88.0]);
        assert_eq!(wheel.terrain_name.to_string(), "ROAD");
        assert!(wheel.flat);
        assert!(!snapshot.wheels[0].flat);

        let vehicle = &snapshot.vehicles[5];
        assert_eq!(vehicle.place, 6);
        assert_eq!(vehicle.pos.z, -12.0);
        assert_eq!(vehicle.laps_behind_leader, 1);
        assert_eq!(snapshot.vehicles[4].place, 0);
    }

    #[test]
    fn decode_preserves_unknown_enum_codes() {
        let mut buffer = vec![0u8; SNAPSHOT_SIZE];
        put(&mut buffer, "game_phase", &[42]);
        put(&mut buffer, "vehicles[0].control", &[0x80]);

        let snapshot = decode(&buffer).unwrap();
        assert_eq!(snapshot.game_phase, 42);
        assert_eq!(snapshot.game_phase(), None);
        assert_eq!(snapshot.vehicles[0].control, i8::MIN);
        assert_eq!(snapshot.vehicles[0].control(), None);
    }

    #[test]
    fn decode_rejects_wrong_lengths() {
        for len in [0, 1, SNAPSHOT_SIZE - 1, SNAPSHOT_SIZE + 1] {
            let err = decode(&vec![0u8; len]).unwrap_err();
            assert_eq!(
                err,
                DecodeError::SizeMismatch {
                    expected: SNAPSHOT_SIZE,
                    actual: len
                }
            );
        }
    }

    #[test]
    fn decode_consumes_exactly_the_cataloged_size() {
        use crate::protocols::rf1::reader::{ByteReader, FieldCursor};

        let buffer = vec![0u8; SNAPSHOT_SIZE];
        let mut bytes = ByteReader::new(&buffer);
        let mut fields = FieldCursor::new(&mut bytes, StructKind::Shared);
        super::decode_shared(&mut fields).unwrap();
        fields.finish();
        assert_eq!(bytes.position(), layout::total_size(StructKind::Shared));
    }
}
