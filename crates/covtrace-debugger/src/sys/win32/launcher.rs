use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use covtrace_engine::backend::CreationMode;
use covtrace_engine::{AttachTarget, StartInfo};
use windows::Win32::Foundation::CloseHandle;
use windows::Win32::System::Diagnostics::Debug::DebugActiveProcess;
use windows::Win32::System::Threading::{
    CreateProcessW, DEBUG_ONLY_THIS_PROCESS, DEBUG_PROCESS, OpenProcess, PROCESS_INFORMATION,
    PROCESS_QUERY_INFORMATION, PROCESS_VM_READ, STARTUPINFOW,
};
use windows::core::{PCWSTR, PWSTR};

use super::error::os;
use super::{Handle, snapshot};
use crate::common::launch::{launch_failure, select_attach_target};

/// Converts to a nul-terminated wide string.
pub(super) fn wide(s: &OsStr) -> Vec<u16> {
    s.encode_wide().chain(Some(0)).collect()
}

pub(super) fn wide_path(path: &Path) -> super::Result<Vec<u16>> {
    let wide = wide(path.as_os_str());

    if wide[..wide.len() - 1].contains(&0) {
        return Err(super::Error::InteriorNul(path.to_path_buf()));
    }

    Ok(wide)
}

/// Spawns the debuggee.
///
/// On success, the handle of the spawned process is returned.
#[tracing::instrument(name = "Spawn", skip_all, fields(path = %start_info.path.display()))]
pub(super) fn spawn(start_info: &StartInfo, mode: CreationMode) -> crate::Result<Handle> {
    let mut command_line: Vec<u16> = wide(OsStr::new(&start_info.command_line()));

    let working_dir = start_info
        .working_dir
        .as_deref()
        .map(wide_path)
        .transpose()?;

    let creation_flags = match mode {
        CreationMode::ProcessTree => DEBUG_PROCESS,
        CreationMode::SingleProcess => DEBUG_ONLY_THIS_PROCESS,
    };

    let startup_info = STARTUPINFOW {
        cb: size_of::<STARTUPINFOW>() as u32,
        ..Default::default()
    };
    let mut process_info = PROCESS_INFORMATION::default();

    // SAFETY: every buffer outlives the call, and the command line buffer
    // is writable as required.
    let res = unsafe {
        CreateProcessW(
            PCWSTR::null(),
            PWSTR(command_line.as_mut_ptr()),
            None,
            None,
            false,
            creation_flags,
            None,
            working_dir
                .as_ref()
                .map_or(PCWSTR::null(), |dir| PCWSTR(dir.as_ptr())),
            &startup_info,
            &mut process_info,
        )
    };

    if let Err(e) = res {
        tracing::error!("Cannot create process: {e}");
        return Err(launch_failure(start_info, e.to_string()));
    }

    // SAFETY: the thread handle was just returned by the OS.
    if let Err(e) = unsafe { CloseHandle(process_info.hThread) } {
        tracing::warn!("Cannot close thread handle: {e}");
    }

    tracing::debug!(pid = process_info.dwProcessId, "process created");

    Ok(Handle::owned(process_info.hProcess))
}

/// Attaches to a running process.
///
/// On success, the ID and a handle of the attached process are returned.
#[tracing::instrument(name = "Attach", skip_all)]
pub(super) fn attach(target: &AttachTarget) -> crate::Result<(u32, Handle)> {
    let process_id = match target {
        AttachTarget::ProcessId(pid) => *pid,
        AttachTarget::ImageName(name) => select_attach_target(snapshot::processes()?, name)?,
    };

    tracing::debug!(pid = process_id, "attaching");

    // SAFETY: plain Win32 call.
    unsafe { DebugActiveProcess(process_id) }.map_err(os("DebugActiveProcess"))?;

    Ok((process_id, open_process(process_id)?))
}

/// Opens a process for querying its state and reading its memory.
pub(super) fn open_process(process_id: u32) -> super::Result<Handle> {
    // SAFETY: plain Win32 call.
    let raw = unsafe {
        OpenProcess(
            PROCESS_QUERY_INFORMATION | PROCESS_VM_READ,
            false,
            process_id,
        )
    }
    .map_err(os("OpenProcess"))?;

    Ok(Handle::owned(raw))
}
