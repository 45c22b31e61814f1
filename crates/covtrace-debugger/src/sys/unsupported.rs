use std::path::Path;
use std::time::Duration;

use covtrace_engine::StartInfo;
use covtrace_engine::backend::{ContinueStatus, CreationMode, DebugBackend, DebugEvent};
use covtrace_engine::backend::{ModuleEntry, Started, ThreadEntry};

use crate::Error;

/// OS handle (no value exists on this platform).
#[derive(Debug)]
pub enum Handle {}

/// Debugging backend of the host machine.
///
/// # Note
///
/// No debugging interface is supported on this platform: starting a
/// debuggee always fails.
#[derive(Debug, Default)]
pub struct NativeBackend;

impl NativeBackend {
    /// Creates a new backend.
    pub const fn new() -> Self {
        Self
    }
}

impl DebugBackend for NativeBackend {
    type Process = Handle;
    type Thread = Handle;
    type File = Handle;
    type Error = Error;

    fn start(
        &mut self,
        _start_info: &StartInfo,
        _mode: CreationMode,
    ) -> crate::Result<Started<Self>> {
        Err(Error::UnsupportedPlatform)
    }

    fn wait_event(&mut self, _timeout: Duration) -> crate::Result<Option<DebugEvent<Self>>> {
        Err(Error::UnsupportedPlatform)
    }

    fn continue_event(&mut self, _: u32, _: u32, _: ContinueStatus) -> crate::Result<()> {
        Err(Error::UnsupportedPlatform)
    }

    fn is_process_active(&mut self, process: &Handle) -> crate::Result<bool> {
        match *process {}
    }

    fn enumerate_threads(&mut self, _process_id: u32) -> crate::Result<Vec<ThreadEntry<Self>>> {
        Err(Error::UnsupportedPlatform)
    }

    fn open_process(&mut self, _process_id: u32) -> crate::Result<Handle> {
        Err(Error::UnsupportedPlatform)
    }

    fn enumerate_modules(&mut self, process: &Handle) -> crate::Result<Vec<ModuleEntry>> {
        match *process {}
    }

    fn open_file(&mut self, _path: &Path) -> crate::Result<Handle> {
        Err(Error::UnsupportedPlatform)
    }
}
