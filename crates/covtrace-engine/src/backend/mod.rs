mod event;

use std::path::{Path, PathBuf};
use std::time::Duration;

pub use self::event::{ContinueStatus, DebugEvent, DebugEventKind, ExceptionRecord};
use crate::StartInfo;

/// Trait implementing the OS debugging primitives used by the
/// [Debugger](crate::debugger::Debugger).
///
/// Every method is called from the thread which called
/// [start](Self::start), which is what most OS debugging interfaces
/// require.
pub trait DebugBackend {
    /// Handle of a debugged process.
    type Process;

    /// Handle of a thread of a debugged process.
    type Thread;

    /// Handle of an executable file (program or DLL) mapped by a debugged
    /// process.
    ///
    /// It is released when dropped.
    type File;

    /// Error returned by this trait.
    type Error: std::error::Error;

    /// Spawns the program described by `start_info` as a debuggee, or
    /// attaches to the running process it designates.
    fn start(
        &mut self,
        start_info: &StartInfo,
        mode: CreationMode,
    ) -> Result<Started<Self>, Self::Error>;

    /// Waits for the next debug event, at most for `timeout`.
    ///
    /// Returns `None` if no event was delivered in time.
    fn wait_event(&mut self, timeout: Duration) -> Result<Option<DebugEvent<Self>>, Self::Error>;

    /// Resumes the debuggee after the event reported for the given process
    /// and thread.
    fn continue_event(
        &mut self,
        process_id: u32,
        thread_id: u32,
        status: ContinueStatus,
    ) -> Result<(), Self::Error>;

    /// Returns whether the given process is still running.
    fn is_process_active(&mut self, process: &Self::Process) -> Result<bool, Self::Error>;

    /// Lists the threads of a running process, in enumeration order.
    fn enumerate_threads(&mut self, process_id: u32) -> Result<Vec<ThreadEntry<Self>>, Self::Error>;

    /// Opens a handle over a running process.
    fn open_process(&mut self, process_id: u32) -> Result<Self::Process, Self::Error>;

    /// Lists the modules loaded by a running process.
    fn enumerate_modules(
        &mut self,
        process: &Self::Process,
    ) -> Result<Vec<ModuleEntry>, Self::Error>;

    /// Opens a read handle over an executable file.
    fn open_file(&mut self, path: &Path) -> Result<Self::File, Self::Error>;
}

/// How the debuggee is created, regarding its descendant processes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreationMode {
    /// The debuggee and every process it spawns are debugged.
    ProcessTree,

    /// Only the debuggee is debugged.
    SingleProcess,
}

impl CreationMode {
    /// Returns the creation mode matching the `cover_children` policy.
    pub const fn from_cover_children(cover_children: bool) -> Self {
        if cover_children {
            Self::ProcessTree
        } else {
            Self::SingleProcess
        }
    }
}

/// Debuggee started by a [DebugBackend].
pub struct Started<B: DebugBackend + ?Sized> {
    /// Handle of the root process, used to check whether it is still alive.
    pub root_process: B::Process,

    /// ID of the root process, if it was attached to instead of spawned.
    pub attached_process_id: Option<u32>,
}

/// Thread of a running process.
pub struct ThreadEntry<B: DebugBackend + ?Sized> {
    /// ID of the thread.
    pub thread_id: u32,

    /// Handle of the thread.
    pub thread: B::Thread,

    /// Creation time of the thread (any monotonic unit).
    pub creation_time: u64,
}

/// Module loaded by a running process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModuleEntry {
    /// Path of the module's file.
    pub path: PathBuf,

    /// Base address of the module in the process' address space.
    pub base_addr: u64,

    /// Whether this is the process' executable.
    pub is_main_image: bool,
}
