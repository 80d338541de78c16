//! rFactor 1 shared-memory snapshot decoding.
//!
//! The producer plug-in copies telemetry and scoring into a single packed
//! structure published as the `$rFactorShared$` file mapping. The decoder
//! requires a buffer of exactly `SNAPSHOT_SIZE` bytes, walks the Layout
//! Catalog in declared order and returns an owned `Snapshot`; nothing in the
//! result borrows from the input.
//!
//! Decoding is strict on length and permissive on values: enum codes outside
//! their defined set are kept as raw integers and surfaced through
//! `Option`-returning accessors. Byte offsets live in `layout`, bounded reads
//! and the catalog-walking cursor in `reader`.

pub mod enums;
pub mod error;
pub mod layout;
pub mod model;
pub mod parser;
pub mod reader;

pub use parser::decode;
