//! Snapshot sources.
//!
//! A source hands out raw, undecoded snapshot buffers; decoding and length
//! validation happen downstream. Only file-backed dumps live in the core,
//! live shared-memory access belongs to the caller.

mod dump;

pub use dump::DumpSource;

use thiserror::Error;

/// One raw snapshot buffer and its position in the source.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: u64,
    pub data: Vec<u8>,
}

pub trait SnapshotSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
