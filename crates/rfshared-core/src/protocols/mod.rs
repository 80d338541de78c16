//! Protocol decoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: field order, widths and offsets (source of truth)
//! - `reader`: bounded byte access and protocol conventions
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `error`: explicit, actionable errors
//!
//! Parsers are pure and contain no I/O; sources and analysis layers handle
//! file access and report assembly.

pub(crate) mod common;
pub mod rf1;
