//! `rfshared live`: one snapshot straight from the simulator's named mapping.
//!
//! The mapping is opened, copied out and released before anything is decoded.

use std::time::SystemTime;

#[cfg(windows)]
use rfshared_core::layout::SNAPSHOT_SIZE;
use rfshared_core::layout::SHARED_MEMORY_NAME;
use rfshared_core::{Frame, InputInfo, UnitSystem, analyze_frame, format_timestamp};
use tracing::info;

use crate::{CliError, OutputFormat, serialize_report};

pub(crate) fn cmd_live(pretty: bool, units: UnitSystem) -> Result<(), CliError> {
    let data = read_shared_snapshot()?;
    info!(bytes = data.len(), name = SHARED_MEMORY_NAME, "copied live snapshot");

    let input = InputInfo {
        path: SHARED_MEMORY_NAME.to_string(),
        bytes: data.len() as u64,
    };
    let frame = Frame { index: 0, data };
    let mut rep = analyze_frame(input, &frame, 1, units)
        .map_err(|err| CliError::new(format!("live snapshot decoding failed: {err}"), None))?;
    if let Some(now) = format_timestamp(SystemTime::now()) {
        rep.generated_at = now;
    }

    let json = serialize_report(
        &rep,
        OutputFormat {
            pretty,
            compact: false,
        },
    )?;
    println!("{}", json);
    Ok(())
}

#[cfg(windows)]
fn read_shared_snapshot() -> Result<Vec<u8>, CliError> {
    let mapping = mapping::SharedMapping::open(SHARED_MEMORY_NAME, SNAPSHOT_SIZE).map_err(|err| {
        CliError::new(
            format!("cannot open shared memory '{SHARED_MEMORY_NAME}': {err}"),
            Some("start rFactor with the shared-memory plug-in loaded".to_string()),
        )
    })?;
    Ok(mapping.copy_out())
}

#[cfg(not(windows))]
fn read_shared_snapshot() -> Result<Vec<u8>, CliError> {
    Err(CliError::new(
        format!("shared memory '{SHARED_MEMORY_NAME}' is only available on Windows"),
        Some("record a dump on the simulator host and use `rfshared dump decode`".to_string()),
    ))
}

#[cfg(windows)]
mod mapping {
    use std::ffi::OsStr;
    use std::io;
    use std::os::windows::ffi::OsStrExt;

    use windows_sys::Win32::Foundation::{CloseHandle, HANDLE};
    use windows_sys::Win32::System::Memory::{
        FILE_MAP_READ, MEMORY_MAPPED_VIEW_ADDRESS, MapViewOfFile, OpenFileMappingW,
        UnmapViewOfFile,
    };

    /// Read-only view of a named file mapping; unmapped and closed on drop.
    pub(super) struct SharedMapping {
        handle: HANDLE,
        view: MEMORY_MAPPED_VIEW_ADDRESS,
        len: usize,
    }

    impl SharedMapping {
        pub(super) fn open(name: &str, len: usize) -> io::Result<Self> {
            let wide: Vec<u16> = OsStr::new(name).encode_wide().chain(Some(0)).collect();

            // SAFETY: `wide` is NUL-terminated and outlives the call.
            let handle = unsafe { OpenFileMappingW(FILE_MAP_READ, 0, wide.as_ptr()) };
            if handle.is_null() {
                return Err(io::Error::last_os_error());
            }

            // SAFETY: `handle` is a valid mapping handle opened above.
            let view = unsafe { MapViewOfFile(handle, FILE_MAP_READ, 0, 0, len) };
            if view.Value.is_null() {
                let err = io::Error::last_os_error();
                // SAFETY: closing the handle we own; no view was created.
                unsafe { CloseHandle(handle) };
                return Err(err);
            }

            Ok(Self { handle, view, len })
        }

        /// Copy the whole view into an owned buffer.
        pub(super) fn copy_out(&self) -> Vec<u8> {
            // SAFETY: the view is mapped readable for `len` bytes while `self` lives.
            let bytes =
                unsafe { std::slice::from_raw_parts(self.view.Value as *const u8, self.len) };
            bytes.to_vec()
        }
    }

    impl Drop for SharedMapping {
        fn drop(&mut self) {
            // SAFETY: both resources were acquired in `open` and are released once.
            unsafe {
                UnmapViewOfFile(self.view);
                CloseHandle(self.handle);
            }
        }
    }
}
