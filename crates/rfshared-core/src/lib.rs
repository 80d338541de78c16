//! rfshared core library: decoding of the rFactor 1 `$rFactorShared$` export.
//!
//! The simulator-side plug-in publishes one packed, fixed-size structure
//! holding telemetry for the player's car plus scoring for up to 128 vehicles.
//! This crate turns a raw copy of that region into an owned, typed
//! [`Snapshot`]: sources hand out raw frames, the decoder (layout/reader/parser)
//! validates the length and walks the Layout Catalog, and the analysis layer
//! wraps the result in a versioned report with unit-converted headline values.
//!
//! Invariants:
//! - A raw snapshot is exactly [`SNAPSHOT_SIZE`] bytes; any other length is a
//!   [`DecodeError::SizeMismatch`] and no field is read.
//! - Layout sizes are compile-time constants; there is no padding anywhere.
//! - Decoded values are copied out; a `Snapshot` never borrows the input.
//! - Enum codes are preserved as read, never rejected.
//!
//! # Examples
//! ```
//! use rfshared_core::{SNAPSHOT_SIZE, decode, layout, units};
//!
//! let mut raw = vec![0u8; SNAPSHOT_SIZE];
//! let speed = layout::path_range("speed").unwrap();
//! raw[speed].copy_from_slice(&10.0f32.to_le_bytes());
//!
//! let snapshot = decode(&raw)?;
//! assert!((units::mps_to_kph(snapshot.speed) - 36.0).abs() < 1e-4);
//! # Ok::<(), rfshared_core::DecodeError>(())
//! ```

use serde::Serialize;

mod analysis;
mod protocols;
mod source;
pub mod units;

pub use analysis::{
    AnalysisError, AnalyzeOptions, analyze_dump_file, analyze_frame, analyze_source,
    format_timestamp,
};
pub use protocols::rf1::enums::{
    ControlSource, FinishStatus, GamePhase, Sector, SurfaceType, WheelIndex, YellowFlagState,
};
pub use protocols::rf1::error::{DecodeError, UnknownCode};
pub use protocols::rf1::layout;
pub use protocols::rf1::layout::SNAPSHOT_SIZE;
pub use protocols::rf1::model::{FixedText, Snapshot, Vec3, VehicleInfo, Wheel};
pub use protocols::rf1::decode;
pub use source::{DumpSource, Frame, SnapshotSource, SourceError};
pub use units::{DerivedValues, UnitSystem};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when the input carries no usable time.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// One decoded snapshot with its provenance and derived values.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp describing when the input was captured.
    pub generated_at: String,

    /// Input metadata.
    pub input: InputInfo,
    /// Number of frames found in the input, a trailing partial frame included.
    pub frames_total: u64,
    /// Index of the decoded frame.
    pub frame_index: u64,

    /// Unit system applied to `derived`.
    pub units: UnitSystem,
    /// Headline values converted into `units`.
    pub derived: DerivedValues,
    /// Full decoded snapshot in producer units.
    pub snapshot: Snapshot,
}

/// Tool metadata embedded in reports.
///
/// # Examples
/// ```
/// use rfshared_core::ToolInfo;
///
/// let tool = ToolInfo {
///     name: "rfshared".to_string(),
///     version: "0.1.0".to_string(),
/// };
/// assert_eq!(tool.name, "rfshared");
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ToolInfo {
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input metadata embedded in reports.
#[derive(Debug, Clone, Serialize)]
pub struct InputInfo {
    /// Input path or mapping name as provided to the analyzer.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Build a report around a decoded snapshot with the default timestamp.
pub fn make_report(
    input: InputInfo,
    frame_index: u64,
    frames_total: u64,
    units: UnitSystem,
    snapshot: Snapshot,
) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "rfshared".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input,
        frames_total,
        frame_index,
        units,
        derived: DerivedValues::from_snapshot(&snapshot, units),
        snapshot,
    }
}
