use std::thread;

use rfshared_core::layout::{self, SNAPSHOT_SIZE, StructKind};
use rfshared_core::{
    DecodeError, GamePhase, Snapshot, WheelIndex, YellowFlagState, decode, units,
};
use serde_json::Value;

fn zeroed() -> Vec<u8> {
    vec![0u8; SNAPSHOT_SIZE]
}

fn put(buffer: &mut [u8], path: &str, bytes: &[u8]) {
    let range = layout::path_range(path).unwrap_or_else(|| panic!("unknown path {path}"));
    assert!(bytes.len() <= range.len(), "{path} is {} bytes", range.len());
    buffer[range.start..range.start + bytes.len()].copy_from_slice(bytes);
}

fn to_json(snapshot: &Snapshot) -> Value {
    serde_json::to_value(snapshot).expect("snapshot json")
}

/// Collect the paths whose leaf values differ between two JSON trees.
fn diff(a: &Value, b: &Value, prefix: &str, out: &mut Vec<String>) {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => {
            for (key, left) in a {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                diff(left, &b[key], &path, out);
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            for (i, (left, right)) in a.iter().zip(b).enumerate() {
                diff(left, right, &format!("{prefix}[{i}]"), out);
            }
        }
        _ if a != b => out.push(prefix.to_string()),
        _ => {}
    }
}

fn changed_paths(buffer: &[u8]) -> Vec<String> {
    let baseline = to_json(&decode(&zeroed()).unwrap());
    let changed = to_json(&decode(buffer).unwrap());
    let mut out = Vec::new();
    diff(&baseline, &changed, "", &mut out);
    out
}

fn belongs_to(path: &str, field: &str) -> bool {
    path == field
        || path.starts_with(&format!("{field}."))
        || path.starts_with(&format!("{field}["))
}

#[test]
fn every_valid_length_buffer_decodes() {
    let patterned: Vec<u8> = (0..SNAPSHOT_SIZE).map(|i| (i % 251) as u8).collect();
    assert!(decode(&zeroed()).is_ok());
    assert!(decode(&patterned).is_ok());
    assert_eq!(layout::total_size(StructKind::Shared), SNAPSHOT_SIZE);
}

#[test]
fn wrong_lengths_fail_with_size_mismatch() {
    for len in [0, SNAPSHOT_SIZE / 2, SNAPSHOT_SIZE - 1, SNAPSHOT_SIZE + 1, SNAPSHOT_SIZE * 2] {
        let buffer = vec![0xffu8; len];
        assert_eq!(
            decode(&buffer),
            Err(DecodeError::SizeMismatch {
                expected: SNAPSHOT_SIZE,
                actual: len,
            })
        );
    }
}

#[test]
fn each_top_level_field_owns_its_byte_range() {
    for (range, field) in layout::offsets(StructKind::Shared) {
        let mut buffer = zeroed();
        buffer[range].fill(0x41);

        let changed = changed_paths(&buffer);
        assert!(!changed.is_empty(), "{} had no visible effect", field.name);
        for path in &changed {
            assert!(
                belongs_to(path, field.name),
                "writing {} changed {path}",
                field.name
            );
        }
    }
}

#[test]
fn each_wheel_field_owns_its_byte_range() {
    for (_, field) in layout::offsets(StructKind::Wheel) {
        let mut buffer = zeroed();
        let path = format!("wheels[2].{}", field.name);
        let range = layout::path_range(&path).unwrap();
        buffer[range].fill(0x41);

        for changed in changed_paths(&buffer) {
            assert!(belongs_to(&changed, &path), "writing {path} changed {changed}");
        }
    }
}

#[test]
fn each_vehicle_field_owns_its_byte_range() {
    for (_, field) in layout::offsets(StructKind::VehicleInfo) {
        let mut buffer = zeroed();
        let path = format!("vehicles[127].{}", field.name);
        let range = layout::path_range(&path).unwrap();
        buffer[range].fill(0x41);

        for changed in changed_paths(&buffer) {
            assert!(belongs_to(&changed, &path), "writing {path} changed {changed}");
        }
    }
}

#[test]
fn game_phase_and_yellow_flag_map_to_enums() {
    let mut buffer = zeroed();
    put(&mut buffer, "game_phase", &[5]);
    put(&mut buffer, "yellow_flag_state", &(-1i8).to_le_bytes());

    let snapshot = decode(&buffer).unwrap();
    assert_eq!(snapshot.game_phase, GamePhase::GreenFlag.code());
    assert_eq!(snapshot.game_phase(), Some(GamePhase::GreenFlag));
    assert_eq!(snapshot.yellow_flag_state(), Some(YellowFlagState::Invalid));
}

#[test]
fn driver_name_stops_at_nul() {
    let mut buffer = zeroed();
    put(&mut buffer, "vehicles[0].driver_name", b"Jim Driver");

    let snapshot = decode(&buffer).unwrap();
    let name = &snapshot.vehicles[0].driver_name;
    assert_eq!(name.to_string_lossy(), "Jim Driver");
    assert_eq!(name.as_bytes().len(), 10);
}

#[test]
fn full_width_driver_name_is_not_truncated() {
    let mut buffer = zeroed();
    let full = [b'Z'; 32];
    put(&mut buffer, "vehicles[0].driver_name", &full);
    put(&mut buffer, "vehicles[0].vehicle_name", b"next field");

    let snapshot = decode(&buffer).unwrap();
    let name = &snapshot.vehicles[0].driver_name;
    assert_eq!(name.as_bytes(), &full[..]);
    assert_eq!(name.to_string_lossy().len(), 32);
    assert_eq!(snapshot.vehicles[0].vehicle_name.to_string(), "next field");
}

#[test]
fn wheel_sentinel_lands_on_rear_left_only() {
    let mut buffer = zeroed();
    put(&mut buffer, "wheels[2].pressure", &123.25f32.to_le_bytes());

    let snapshot = decode(&buffer).unwrap();
    assert_eq!(snapshot.wheel(WheelIndex::RearLeft).pressure, 123.25);
    for index in [WheelIndex::FrontLeft, WheelIndex::FrontRight, WheelIndex::RearRight] {
        assert_eq!(snapshot.wheel(index).pressure, 0.0);
    }
    assert_eq!(changed_paths(&buffer), vec!["wheels[2].pressure".to_string()]);
}

#[test]
fn snapshot_outlives_source_buffer() {
    let snapshot = {
        let mut buffer = zeroed();
        put(&mut buffer, "track_name", b"Sebring");
        decode(&buffer).unwrap()
    };
    assert_eq!(snapshot.track_name.to_string(), "Sebring");
}

#[test]
fn concurrent_decodes_are_independent() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            thread::spawn(move || {
                let mut buffer = zeroed();
                put(&mut buffer, "lap_number", &(i as i32).to_le_bytes());
                decode(&buffer).unwrap().lap_number
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), i as i32);
    }
}

#[test]
fn conversions_apply_to_decoded_fields() {
    let mut buffer = zeroed();
    put(&mut buffer, "speed", &10.0f32.to_le_bytes());
    put(&mut buffer, "wheels[0].pressure", &100.0f32.to_le_bytes());
    put(&mut buffer, "fuel", &1.0f32.to_le_bytes());

    let snapshot = decode(&buffer).unwrap();
    assert!((units::mps_to_kph(snapshot.speed) - 36.0).abs() < 1e-4);
    assert!((units::kpa_to_psi(snapshot.wheels[0].pressure) - 14.5038).abs() < 1e-4);
    assert!((units::l_to_g(snapshot.fuel) - 0.264172).abs() < 1e-4);
    assert!((units::c_to_f(snapshot.track_temp) - 32.0).abs() < 1e-4);
}
