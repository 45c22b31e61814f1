use std::ffi::OsString;
use std::os::windows::ffi::OsStringExt;
use std::path::PathBuf;

use covtrace_engine::backend::{ModuleEntry, ThreadEntry};
use windows::Win32::Foundation::{FILETIME, HMODULE};
use windows::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, PROCESSENTRY32W, Process32FirstW, Process32NextW,
    TH32CS_SNAPPROCESS, TH32CS_SNAPTHREAD, THREADENTRY32, Thread32First, Thread32Next,
};
use windows::Win32::System::ProcessStatus::{EnumProcessModules, GetModuleFileNameExW};
use windows::Win32::System::Threading::{
    GetThreadTimes, OpenThread, THREAD_GET_CONTEXT, THREAD_QUERY_INFORMATION,
    THREAD_SET_CONTEXT, THREAD_SUSPEND_RESUME,
};

use super::error::os;
use super::{Handle, NativeBackend};
use crate::common::launch::ProcessEntry;

const MAX_PATH_LEN: usize = 32_768;

/// Lists the running processes of the host.
pub(super) fn processes() -> super::Result<Vec<ProcessEntry>> {
    // SAFETY: plain Win32 call.
    let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0) }
        .map(Handle::owned)
        .map_err(os("CreateToolhelp32Snapshot"))?;

    let mut entry = PROCESSENTRY32W {
        dwSize: size_of::<PROCESSENTRY32W>() as u32,
        ..Default::default()
    };

    let mut processes = Vec::new();

    // SAFETY: `entry` is initialized with its size.
    let mut res = unsafe { Process32FirstW(snapshot.raw(), &mut entry) };

    while res.is_ok() {
        processes.push(ProcessEntry {
            process_id: entry.th32ProcessID,
            image_name: from_wide(&entry.szExeFile),
        });

        // SAFETY: same as above.
        res = unsafe { Process32NextW(snapshot.raw(), &mut entry) };
    }

    Ok(processes)
}

/// Lists the threads of a running process, with their creation time.
pub(super) fn threads(process_id: u32) -> super::Result<Vec<ThreadEntry<NativeBackend>>> {
    // SAFETY: plain Win32 call.
    let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPTHREAD, 0) }
        .map(Handle::owned)
        .map_err(os("CreateToolhelp32Snapshot"))?;

    let mut entry = THREADENTRY32 {
        dwSize: size_of::<THREADENTRY32>() as u32,
        ..Default::default()
    };

    let mut threads = Vec::new();

    // SAFETY: `entry` is initialized with its size.
    let mut res = unsafe { Thread32First(snapshot.raw(), &mut entry) };

    while res.is_ok() {
        if entry.th32OwnerProcessID == process_id {
            threads.push(open_thread(entry.th32ThreadID)?);
        }

        // SAFETY: same as above.
        res = unsafe { Thread32Next(snapshot.raw(), &mut entry) };
    }

    Ok(threads)
}

fn open_thread(thread_id: u32) -> super::Result<ThreadEntry<NativeBackend>> {
    // SAFETY: plain Win32 call.
    let thread = unsafe {
        OpenThread(
            THREAD_QUERY_INFORMATION
                | THREAD_GET_CONTEXT
                | THREAD_SET_CONTEXT
                | THREAD_SUSPEND_RESUME,
            false,
            thread_id,
        )
    }
    .map(Handle::owned)
    .map_err(os("OpenThread"))?;

    let mut creation = FILETIME::default();
    let mut exit = FILETIME::default();
    let mut kernel = FILETIME::default();
    let mut user = FILETIME::default();

    // SAFETY: every out-pointer is valid for the call.
    unsafe { GetThreadTimes(thread.raw(), &mut creation, &mut exit, &mut kernel, &mut user) }
        .map_err(os("GetThreadTimes"))?;

    Ok(ThreadEntry {
        thread_id,
        thread,
        creation_time: (u64::from(creation.dwHighDateTime) << 32)
            | u64::from(creation.dwLowDateTime),
    })
}

/// Lists the modules of a running process.
///
/// The first module listed by the OS is the process' executable.
pub(super) fn modules(process: &Handle) -> super::Result<Vec<ModuleEntry>> {
    let mut handles: Vec<HMODULE> = Vec::new();
    let mut needed = 0u32;

    // the module list may grow between calls
    loop {
        let capacity = (needed as usize / size_of::<HMODULE>()).max(handles.len());
        handles.resize(capacity, HMODULE::default());

        // SAFETY: the buffer holds `capacity` module handles.
        unsafe {
            EnumProcessModules(
                process.raw(),
                handles.as_mut_ptr(),
                (capacity * size_of::<HMODULE>()) as u32,
                &mut needed,
            )
        }
        .map_err(os("EnumProcessModules"))?;

        if needed as usize <= capacity * size_of::<HMODULE>() {
            handles.truncate(needed as usize / size_of::<HMODULE>());
            break;
        }
    }

    let mut path_buf = vec![0u16; MAX_PATH_LEN];

    handles
        .into_iter()
        .enumerate()
        .map(|(idx, module)| {
            // SAFETY: `path_buf` is a valid output buffer.
            let len = unsafe { GetModuleFileNameExW(process.raw(), module, &mut path_buf) };

            if len == 0 {
                return Err(os("GetModuleFileNameExW")(windows::core::Error::from_win32()));
            }

            Ok(ModuleEntry {
                path: PathBuf::from(OsString::from_wide(&path_buf[..len as usize])),
                base_addr: module.0 as usize as u64,
                is_main_image: idx == 0,
            })
        })
        .collect()
}

/// Reads a nul-terminated wide string.
fn from_wide(buf: &[u16]) -> String {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..len])
}
