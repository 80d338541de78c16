//! Layout Catalog for the `$rFactorShared$` export.
//!
//! Every structure is packed (`#pragma pack(1)` on the producer side): fields
//! follow each other with no padding at any nesting level and all multi-byte
//! values are little-endian. The catalog is the single source of truth for
//! widths and offsets; the decoder walks it field by field and the sizes below
//! are evaluated at compile time.

use std::ops::Range;

/// Name of the Win32 file mapping written by the producer plug-in.
pub const SHARED_MEMORY_NAME: &str = "$rFactorShared$";

pub const WHEEL_COUNT: usize = 4;
pub const MAX_VEHICLES: usize = 128;
pub const DENT_LOCATIONS: usize = 8;
pub const SECTOR_COUNT: usize = 3;
pub const TIRE_TEMPERATURE_POINTS: usize = 3;

pub const TERRAIN_NAME_LEN: usize = 16;
pub const SHORT_NAME_LEN: usize = 32;
pub const LONG_NAME_LEN: usize = 64;

/// Semantic type of a catalog field; each has a fixed wire width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    I8,
    U8,
    /// One byte, nonzero means true.
    Bool,
    I16,
    I32,
    F32,
    /// Fixed-width byte text, NUL-padded but not necessarily NUL-terminated.
    Text(usize),
    Struct(StructKind),
}

impl FieldType {
    pub const fn width(self) -> usize {
        match self {
            FieldType::I8 | FieldType::U8 | FieldType::Bool => 1,
            FieldType::I16 => 2,
            FieldType::I32 | FieldType::F32 => 4,
            FieldType::Text(len) => len,
            FieldType::Struct(kind) => kind.size(),
        }
    }

    pub fn label(self) -> String {
        match self {
            FieldType::I8 => "i8".to_string(),
            FieldType::U8 => "u8".to_string(),
            FieldType::Bool => "bool".to_string(),
            FieldType::I16 => "i16".to_string(),
            FieldType::I32 => "i32".to_string(),
            FieldType::F32 => "f32".to_string(),
            FieldType::Text(len) => format!("text[{len}]"),
            FieldType::Struct(kind) => kind.name().to_string(),
        }
    }
}

/// One entry of a structure's ordered field list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
    /// Array arity; 1 for scalars.
    pub count: usize,
}

impl Field {
    /// Total bytes occupied by the field, all elements included.
    pub const fn width(&self) -> usize {
        self.ty.width() * self.count
    }

    pub const fn is_array(&self) -> bool {
        self.count > 1
    }
}

const fn one(name: &'static str, ty: FieldType) -> Field {
    Field { name, ty, count: 1 }
}

const fn many(name: &'static str, ty: FieldType, count: usize) -> Field {
    Field { name, ty, count }
}

const VEC3: FieldType = FieldType::Struct(StructKind::Vec3);

/// Structures described by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructKind {
    Vec3,
    Wheel,
    VehicleInfo,
    /// Top-level snapshot.
    Shared,
}

impl StructKind {
    pub const ALL: [StructKind; 4] = [
        StructKind::Vec3,
        StructKind::Wheel,
        StructKind::VehicleInfo,
        StructKind::Shared,
    ];

    pub const fn fields(self) -> &'static [Field] {
        match self {
            StructKind::Vec3 => VEC3_FIELDS,
            StructKind::Wheel => WHEEL_FIELDS,
            StructKind::VehicleInfo => VEHICLE_INFO_FIELDS,
            StructKind::Shared => SHARED_FIELDS,
        }
    }

    /// Packed size: the plain sum of member widths.
    pub const fn size(self) -> usize {
        let fields = self.fields();
        let mut total = 0;
        let mut i = 0;
        while i < fields.len() {
            total += fields[i].width();
            i += 1;
        }
        total
    }

    pub const fn name(self) -> &'static str {
        match self {
            StructKind::Vec3 => "vec3",
            StructKind::Wheel => "wheel",
            StructKind::VehicleInfo => "vehicle_info",
            StructKind::Shared => "shared",
        }
    }
}

pub const VEC3_FIELDS: &[Field] = &[
    one("x", FieldType::F32),
    one("y", FieldType::F32),
    one("z", FieldType::F32),
];

pub const WHEEL_FIELDS: &[Field] = &[
    one("rotation", FieldType::F32),
    one("suspension_deflection", FieldType::F32),
    one("ride_height", FieldType::F32),
    one("tire_load", FieldType::F32),
    one("lateral_force", FieldType::F32),
    one("grip_fract", FieldType::F32),
    one("brake_temp", FieldType::F32),
    one("pressure", FieldType::F32),
    many("temperature", FieldType::F32, TIRE_TEMPERATURE_POINTS),
    one("wear", FieldType::F32),
    one("terrain_name", FieldType::Text(TERRAIN_NAME_LEN)),
    one("surface_type", FieldType::I8),
    one("flat", FieldType::Bool),
    one("detached", FieldType::Bool),
];

pub const VEHICLE_INFO_FIELDS: &[Field] = &[
    one("driver_name", FieldType::Text(SHORT_NAME_LEN)),
    one("vehicle_name", FieldType::Text(LONG_NAME_LEN)),
    one("total_laps", FieldType::I16),
    one("sector", FieldType::I8),
    one("finish_status", FieldType::I8),
    one("lap_dist", FieldType::F32),
    one("path_lateral", FieldType::F32),
    one("track_edge", FieldType::F32),
    one("best_sector1", FieldType::F32),
    one("best_sector2", FieldType::F32),
    one("best_lap_time", FieldType::F32),
    one("last_sector1", FieldType::F32),
    one("last_sector2", FieldType::F32),
    one("last_lap_time", FieldType::F32),
    one("cur_sector1", FieldType::F32),
    one("cur_sector2", FieldType::F32),
    one("num_pitstops", FieldType::I16),
    one("num_penalties", FieldType::I16),
    one("is_player", FieldType::Bool),
    one("control", FieldType::I8),
    one("in_pits", FieldType::Bool),
    one("place", FieldType::U8),
    one("vehicle_class", FieldType::Text(SHORT_NAME_LEN)),
    one("time_behind_next", FieldType::F32),
    one("laps_behind_next", FieldType::I32),
    one("time_behind_leader", FieldType::F32),
    one("laps_behind_leader", FieldType::I32),
    one("lap_start_et", FieldType::F32),
    one("pos", VEC3),
    one("speed", FieldType::F32),
];

pub const SHARED_FIELDS: &[Field] = &[
    // time
    one("delta_time", FieldType::F32),
    one("lap_number", FieldType::I32),
    one("lap_start_et", FieldType::F32),
    one("vehicle_name", FieldType::Text(LONG_NAME_LEN)),
    one("track_name", FieldType::Text(LONG_NAME_LEN)),
    // position and orientation
    one("pos", VEC3),
    one("local_vel", VEC3),
    one("local_accel", VEC3),
    one("ori_x", VEC3),
    one("ori_y", VEC3),
    one("ori_z", VEC3),
    one("local_rot", VEC3),
    one("local_rot_accel", VEC3),
    one("speed", FieldType::F32),
    // vehicle status
    one("gear", FieldType::I32),
    one("engine_rpm", FieldType::F32),
    one("engine_water_temp", FieldType::F32),
    one("engine_oil_temp", FieldType::F32),
    one("clutch_rpm", FieldType::F32),
    // driver input
    one("unfiltered_throttle", FieldType::F32),
    one("unfiltered_brake", FieldType::F32),
    one("unfiltered_steering", FieldType::F32),
    one("unfiltered_clutch", FieldType::F32),
    one("steering_arm_force", FieldType::F32),
    // state and damage
    one("fuel", FieldType::F32),
    one("engine_max_rpm", FieldType::F32),
    one("scheduled_stops", FieldType::U8),
    one("overheating", FieldType::Bool),
    one("detached", FieldType::Bool),
    many("dent_severity", FieldType::I8, DENT_LOCATIONS),
    one("last_impact_et", FieldType::F32),
    one("last_impact_magnitude", FieldType::F32),
    one("last_impact_pos", VEC3),
    many("wheels", FieldType::Struct(StructKind::Wheel), WHEEL_COUNT),
    // scoring
    one("session", FieldType::I32),
    one("current_et", FieldType::F32),
    one("end_et", FieldType::F32),
    one("max_laps", FieldType::I32),
    one("lap_dist", FieldType::F32),
    one("num_vehicles", FieldType::I32),
    one("game_phase", FieldType::I8),
    one("yellow_flag_state", FieldType::I8),
    many("sector_flag", FieldType::I8, SECTOR_COUNT),
    one("start_light", FieldType::U8),
    one("num_red_lights", FieldType::U8),
    one("in_realtime", FieldType::Bool),
    one("player_name", FieldType::Text(SHORT_NAME_LEN)),
    one("plr_file_name", FieldType::Text(LONG_NAME_LEN)),
    // weather
    one("ambient_temp", FieldType::F32),
    one("track_temp", FieldType::F32),
    one("wind", VEC3),
    many(
        "vehicles",
        FieldType::Struct(StructKind::VehicleInfo),
        MAX_VEHICLES,
    ),
];

pub const VEC3_SIZE: usize = StructKind::Vec3.size();
pub const WHEEL_SIZE: usize = StructKind::Wheel.size();
pub const VEHICLE_INFO_SIZE: usize = StructKind::VehicleInfo.size();
/// Exact byte length of one raw snapshot.
pub const SNAPSHOT_SIZE: usize = StructKind::Shared.size();

// Producer ABI.
const _: () = assert!(VEC3_SIZE == 12);
const _: () = assert!(WHEEL_SIZE == 67);
const _: () = assert!(VEHICLE_INFO_SIZE == 220);
const _: () = assert!(SNAPSHOT_SIZE == 28_895);

/// Packed size of a structure.
pub const fn total_size(kind: StructKind) -> usize {
    kind.size()
}

/// Ordered field list of a structure.
pub const fn fields(kind: StructKind) -> &'static [Field] {
    kind.fields()
}

/// Fields of `kind` paired with their byte ranges relative to the structure start.
pub fn offsets(kind: StructKind) -> impl Iterator<Item = (Range<usize>, &'static Field)> {
    kind.fields().iter().scan(0usize, |offset, field| {
        let start = *offset;
        *offset += field.width();
        Some((start..*offset, field))
    })
}

/// Byte range of a top-level field of `kind`, all elements included.
pub fn field_range(kind: StructKind, name: &str) -> Option<Range<usize>> {
    offsets(kind)
        .find(|(_, field)| field.name == name)
        .map(|(range, _)| range)
}

/// Resolve a dotted path such as `wheels[2].pressure` or `vehicles[0].pos.x`
/// to its byte range inside a raw snapshot.
///
/// An index is required to descend into an array of structures; indices are
/// checked against the field arity. A path ending on an array without an
/// index covers the whole array.
///
/// # Examples
/// ```
/// use rfshared_core::layout::path_range;
///
/// assert_eq!(path_range("delta_time"), Some(0..4));
/// assert_eq!(path_range("wheels[2].pressure"), Some(481..485));
/// assert_eq!(path_range("wheels[4].pressure"), None);
/// ```
pub fn path_range(path: &str) -> Option<Range<usize>> {
    let mut kind = StructKind::Shared;
    let mut base = 0usize;
    let mut segments = path.split('.').peekable();

    while let Some(segment) = segments.next() {
        let (name, index) = split_index(segment)?;
        let (range, field) = offsets(kind).find(|(_, field)| field.name == name)?;
        let is_last = segments.peek().is_none();

        let range = match index {
            Some(index) if index < field.count => {
                let start = base + range.start + index * field.ty.width();
                start..start + field.ty.width()
            }
            Some(_) => return None,
            None if is_last => base + range.start..base + range.end,
            None if field.is_array() => return None,
            None => base + range.start..base + range.end,
        };

        if is_last {
            return Some(range);
        }
        match field.ty {
            FieldType::Struct(inner) => {
                kind = inner;
                base = range.start;
            }
            _ => return None,
        }
    }
    None
}

fn split_index(segment: &str) -> Option<(&str, Option<usize>)> {
    match segment.split_once('[') {
        None => Some((segment, None)),
        Some((name, rest)) => {
            let index = rest.strip_suffix(']')?.parse().ok()?;
            Some((name, Some(index)))
        }
    }
}
