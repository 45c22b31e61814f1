use covtrace_engine::backend::{DebugEvent, DebugEventKind, ExceptionRecord};
use windows::Win32::System::Diagnostics::Debug::{
    CREATE_PROCESS_DEBUG_EVENT, CREATE_THREAD_DEBUG_EVENT, DEBUG_EVENT, EXCEPTION_DEBUG_EVENT,
    EXIT_PROCESS_DEBUG_EVENT, EXIT_THREAD_DEBUG_EVENT, LOAD_DLL_DEBUG_EVENT, RIP_EVENT,
    UNLOAD_DLL_DEBUG_EVENT,
};

use super::{Handle, NativeBackend};

/// Converts a raw debug event.
///
/// The process and thread handles of the event stay owned by the OS, while
/// its file handle (if any) must be closed by the debugger.
pub(super) fn translate(raw: &DEBUG_EVENT) -> DebugEvent<NativeBackend> {
    // SAFETY: each union field is read according to the event code.
    let kind = unsafe {
        match raw.dwDebugEventCode {
            CREATE_PROCESS_DEBUG_EVENT => {
                let info = &raw.u.CreateProcessInfo;

                DebugEventKind::ProcessCreated {
                    process: Handle::borrowed(info.hProcess),
                    thread: Handle::borrowed(info.hThread),
                    file: Handle::owned_opt(info.hFile),
                    image_base: info.lpBaseOfImage as usize as u64,
                }
            }
            CREATE_THREAD_DEBUG_EVENT => DebugEventKind::ThreadCreated {
                thread: Handle::borrowed(raw.u.CreateThread.hThread),
            },
            EXIT_THREAD_DEBUG_EVENT => DebugEventKind::ThreadExited {
                exit_code: raw.u.ExitThread.dwExitCode,
            },
            EXIT_PROCESS_DEBUG_EVENT => DebugEventKind::ProcessExited {
                exit_code: raw.u.ExitProcess.dwExitCode,
            },
            LOAD_DLL_DEBUG_EVENT => {
                let info = &raw.u.LoadDll;

                DebugEventKind::DllLoaded {
                    file: Handle::owned_opt(info.hFile),
                    base_addr: info.lpBaseOfDll as usize as u64,
                }
            }
            UNLOAD_DLL_DEBUG_EVENT => DebugEventKind::DllUnloaded {
                base_addr: raw.u.UnloadDll.lpBaseOfDll as usize as u64,
            },
            EXCEPTION_DEBUG_EVENT => {
                let info = &raw.u.Exception;
                let record = &info.ExceptionRecord;

                let param_count =
                    (record.NumberParameters as usize).min(record.ExceptionInformation.len());

                DebugEventKind::Exception(ExceptionRecord {
                    code: record.ExceptionCode.0 as u32,
                    address: record.ExceptionAddress as usize as u64,
                    first_chance: info.dwFirstChance != 0,
                    parameters: record.ExceptionInformation[..param_count]
                        .iter()
                        .map(|&param| param as u64)
                        .collect(),
                })
            }
            RIP_EVENT => DebugEventKind::Rip {
                error: raw.u.RipInfo.dwError,
                kind: raw.u.RipInfo.dwType.0,
            },
            code => DebugEventKind::Other(code.0),
        }
    };

    DebugEvent {
        process_id: raw.dwProcessId,
        thread_id: raw.dwThreadId,
        kind,
    }
}
