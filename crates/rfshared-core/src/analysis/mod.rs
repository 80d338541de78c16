use std::path::Path;
use std::time::SystemTime;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::debug;

use crate::protocols::rf1::decode;
use crate::protocols::rf1::error::DecodeError;
use crate::protocols::rf1::layout::SNAPSHOT_SIZE;
use crate::source::{DumpSource, Frame, SnapshotSource, SourceError};
use crate::units::UnitSystem;
use crate::{DEFAULT_GENERATED_AT, InputInfo, Report, make_report};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("failed to decode frame {index}: {source}")]
    Decode {
        index: u64,
        #[source]
        source: DecodeError,
    },
    #[error("frame {index} out of range: input holds {total} frame(s)")]
    FrameOutOfRange { index: u64, total: u64 },
    #[error("input holds no snapshot frames")]
    Empty,
}

/// Frame selection and presentation for a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Frame to decode; `None` picks the last complete frame.
    pub frame: Option<u64>,
    pub units: UnitSystem,
}

/// Decode one frame of a dump file; `generated_at` is the file's modification time.
pub fn analyze_dump_file(path: &Path, options: &AnalyzeOptions) -> Result<Report, AnalysisError> {
    let source = DumpSource::open(path)?;
    let meta = path.metadata()?;
    let input = InputInfo {
        path: path.display().to_string(),
        bytes: meta.len(),
    };
    let mut report = analyze_source(input, source, options)?;
    report.generated_at = meta
        .modified()
        .ok()
        .and_then(format_timestamp)
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());
    Ok(report)
}

/// Select and decode one frame from any source.
///
/// The source need not be backed by a file; `generated_at` keeps its default.
pub fn analyze_source<S: SnapshotSource>(
    input: InputInfo,
    mut source: S,
    options: &AnalyzeOptions,
) -> Result<Report, AnalysisError> {
    let mut frames_total = 0u64;
    let mut selected: Option<Frame> = None;

    while let Some(frame) = source.next_frame()? {
        frames_total += 1;
        match options.frame {
            Some(index) if frame.index == index => selected = Some(frame),
            Some(_) => {}
            None => {
                // A partial tail only wins when nothing complete came before it.
                if frame.data.len() == SNAPSHOT_SIZE || selected.is_none() {
                    selected = Some(frame);
                }
            }
        }
    }

    let Some(frame) = selected else {
        return Err(match options.frame {
            Some(index) if frames_total > 0 => AnalysisError::FrameOutOfRange {
                index,
                total: frames_total,
            },
            _ => AnalysisError::Empty,
        });
    };
    debug!(
        index = frame.index,
        frames_total, "selected snapshot frame"
    );

    analyze_frame(input, &frame, frames_total, options.units)
}

/// Decode a single in-memory frame into a report.
///
/// `generated_at` keeps its default; callers stamp it from whatever clock
/// describes the input.
pub fn analyze_frame(
    input: InputInfo,
    frame: &Frame,
    frames_total: u64,
    units: UnitSystem,
) -> Result<Report, AnalysisError> {
    let snapshot = decode(&frame.data).map_err(|source| AnalysisError::Decode {
        index: frame.index,
        source,
    })?;
    Ok(make_report(input, frame.index, frames_total, units, snapshot))
}

/// RFC 3339 rendering of a wall-clock time.
pub fn format_timestamp(ts: SystemTime) -> Option<String> {
    OffsetDateTime::from(ts).format(&Rfc3339).ok()
}
