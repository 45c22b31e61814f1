mod error;
mod event;
mod handle;
mod launcher;
mod snapshot;

use std::path::Path;
use std::time::Duration;

use covtrace_engine::StartInfo;
use covtrace_engine::backend::{ContinueStatus, CreationMode, DebugBackend, DebugEvent};
use covtrace_engine::backend::{ModuleEntry, Started, ThreadEntry};
use windows::Win32::Foundation::{ERROR_SEM_TIMEOUT, HANDLE, NTSTATUS, STILL_ACTIVE};
use windows::Win32::Storage::FileSystem::{
    CreateFileW, FILE_ATTRIBUTE_NORMAL, FILE_GENERIC_READ, FILE_SHARE_DELETE, FILE_SHARE_READ,
    FILE_SHARE_WRITE, OPEN_EXISTING,
};
use windows::Win32::System::Diagnostics::Debug::{
    ContinueDebugEvent, DEBUG_EVENT, WaitForDebugEvent,
};
use windows::Win32::System::Threading::GetExitCodeProcess;
use windows::core::PCWSTR;

pub use self::error::{Error, Result};
use self::error::os;
pub use self::handle::Handle;

const DBG_CONTINUE: NTSTATUS = NTSTATUS(0x0001_0002);
const DBG_EXCEPTION_NOT_HANDLED: NTSTATUS = NTSTATUS(0x8001_0001_u32 as i32);

/// Debugging backend of the host machine, based on the Win32 debug API.
///
/// # Note
///
/// Every method must be called from the thread which started the debuggee.
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
    type Error = crate::Error;

    fn start(
        &mut self,
        start_info: &StartInfo,
        mode: CreationMode,
    ) -> crate::Result<Started<Self>> {
        match start_info.attach.as_ref() {
            Some(target) => {
                let (process_id, root_process) = launcher::attach(target)?;

                Ok(Started {
                    root_process,
                    attached_process_id: Some(process_id),
                })
            }
            None => Ok(Started {
                root_process: launcher::spawn(start_info, mode)?,
                attached_process_id: None,
            }),
        }
    }

    fn wait_event(&mut self, timeout: Duration) -> crate::Result<Option<DebugEvent<Self>>> {
        let mut raw = DEBUG_EVENT::default();
        let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);

        // SAFETY: `raw` is a valid output buffer.
        match unsafe { WaitForDebugEvent(&mut raw, millis) } {
            Ok(()) => Ok(Some(event::translate(&raw))),
            Err(e) if e.code() == ERROR_SEM_TIMEOUT.to_hresult() => Ok(None),
            Err(e) => Err(os("WaitForDebugEvent")(e).into()),
        }
    }

    fn continue_event(
        &mut self,
        process_id: u32,
        thread_id: u32,
        status: ContinueStatus,
    ) -> crate::Result<()> {
        let status = match status {
            ContinueStatus::Continue => DBG_CONTINUE,
            ContinueStatus::ExceptionNotHandled => DBG_EXCEPTION_NOT_HANDLED,
        };

        // SAFETY: plain Win32 call.
        unsafe { ContinueDebugEvent(process_id, thread_id, status) }
            .map_err(os("ContinueDebugEvent"))?;

        Ok(())
    }

    fn is_process_active(&mut self, process: &Handle) -> crate::Result<bool> {
        let mut exit_code = 0u32;

        // SAFETY: `exit_code` is a valid output buffer.
        unsafe { GetExitCodeProcess(process.raw(), &mut exit_code) }
            .map_err(os("GetExitCodeProcess"))?;

        Ok(exit_code == STILL_ACTIVE.0 as u32)
    }

    fn enumerate_threads(&mut self, process_id: u32) -> crate::Result<Vec<ThreadEntry<Self>>> {
        Ok(snapshot::threads(process_id)?)
    }

    fn open_process(&mut self, process_id: u32) -> crate::Result<Handle> {
        Ok(launcher::open_process(process_id)?)
    }

    fn enumerate_modules(&mut self, process: &Handle) -> crate::Result<Vec<ModuleEntry>> {
        Ok(snapshot::modules(process)?)
    }

    fn open_file(&mut self, path: &Path) -> crate::Result<Handle> {
        let wide = launcher::wide_path(path)?;

        // SAFETY: `wide` is nul-terminated and outlives the call.
        let raw = unsafe {
            CreateFileW(
                PCWSTR(wide.as_ptr()),
                FILE_GENERIC_READ.0,
                FILE_SHARE_READ | FILE_SHARE_WRITE | FILE_SHARE_DELETE,
                None,
                OPEN_EXISTING,
                FILE_ATTRIBUTE_NORMAL,
                HANDLE::default(),
            )
        }
        .map_err(os("CreateFileW"))?;

        Ok(Handle::owned(raw))
    }
}
