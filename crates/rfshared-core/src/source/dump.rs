use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use tracing::debug;

use crate::protocols::rf1::layout::SNAPSHOT_SIZE;
use crate::source::{Frame, SnapshotSource, SourceError};

/// Raw snapshots stored back to back, `SNAPSHOT_SIZE` bytes each.
///
/// A trailing partial frame is still yielded so that decoding it reports the
/// size mismatch instead of silently dropping the tail.
pub struct DumpSource<R> {
    reader: R,
    next_index: u64,
    done: bool,
}

impl DumpSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> DumpSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            next_index: 0,
            done: false,
        }
    }
}

impl<R: Read> SnapshotSource for DumpSource<R> {
    fn next_frame(&mut self) -> Result<Option<Frame>, SourceError> {
        if self.done {
            return Ok(None);
        }
        let mut data = vec![0u8; SNAPSHOT_SIZE];
        let filled = read_full(&mut self.reader, &mut data)?;
        if filled == 0 {
            self.done = true;
            return Ok(None);
        }
        if filled < SNAPSHOT_SIZE {
            debug!(
                index = self.next_index,
                bytes = filled,
                "dump ends with a partial frame"
            );
            data.truncate(filled);
            self.done = true;
        }
        let frame = Frame {
            index: self.next_index,
            data,
        };
        self.next_index += 1;
        Ok(Some(frame))
    }
}

/// Fill `buf` as far as the reader allows; returns the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, std::io::Error> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}
