use super::DebugBackend;

/// Exception code of a software breakpoint (`int3`).
const EXCEPTION_BREAKPOINT: u32 = 0x8000_0003;

/// Event reported by the OS about some state change within the debuggee.
pub struct DebugEvent<B: DebugBackend + ?Sized> {
    /// ID of the process the event belongs to.
    pub process_id: u32,

    /// ID of the thread the event belongs to.
    pub thread_id: u32,

    /// What happened.
    pub kind: DebugEventKind<B>,
}

/// Kind of a [DebugEvent], with its payload.
pub enum DebugEventKind<B: DebugBackend + ?Sized> {
    /// A process was created (or attached to).
    ProcessCreated {
        /// Handle of the new process.
        process: B::Process,

        /// Handle of the initial thread of the new process.
        thread: B::Thread,

        /// Handle of the process' executable file, if available.
        file: Option<B::File>,

        /// Base address of the executable image.
        image_base: u64,
    },

    /// A thread was created.
    ThreadCreated {
        /// Handle of the new thread.
        thread: B::Thread,
    },

    /// A thread has exited.
    ThreadExited {
        /// Exit code of the thread.
        exit_code: u32,
    },

    /// A process has exited.
    ProcessExited {
        /// Exit code of the process.
        exit_code: u32,
    },

    /// A DLL was loaded.
    DllLoaded {
        /// Handle of the DLL's file, if available.
        file: Option<B::File>,

        /// Base address of the DLL.
        base_addr: u64,
    },

    /// A DLL was unloaded.
    DllUnloaded {
        /// Base address of the DLL before unloading.
        base_addr: u64,
    },

    /// An exception was raised.
    Exception(ExceptionRecord),

    /// The debuggee died outside of the control of the debugger.
    Rip {
        /// OS error code.
        error: u32,

        /// Kind of error, as reported by the OS.
        kind: u32,
    },

    /// An event kind this crate does not handle (e.g., debug strings).
    Other(u32),
}

impl<B: DebugBackend + ?Sized> DebugEventKind<B> {
    /// Returns a short label of the event kind, for logging.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ProcessCreated { .. } => "process created",
            Self::ThreadCreated { .. } => "thread created",
            Self::ThreadExited { .. } => "thread exited",
            Self::ProcessExited { .. } => "process exited",
            Self::DllLoaded { .. } => "dll loaded",
            Self::DllUnloaded { .. } => "dll unloaded",
            Self::Exception(_) => "exception",
            Self::Rip { .. } => "rip",
            Self::Other(_) => "other",
        }
    }
}

/// Exception raised within the debuggee.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExceptionRecord {
    /// Exception code (e.g., `0xC0000005` for an access violation).
    pub code: u32,

    /// Address where the exception occurred.
    pub address: u64,

    /// Whether the debugger sees the exception before the debuggee's own
    /// handlers had a chance to handle it.
    pub first_chance: bool,

    /// Additional exception arguments.
    pub parameters: Vec<u64>,
}

impl ExceptionRecord {
    /// Returns whether the exception is a software breakpoint.
    pub const fn is_breakpoint(&self) -> bool {
        self.code == EXCEPTION_BREAKPOINT
    }
}

/// How the debuggee should proceed once a debug event is handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContinueStatus {
    /// Resume the debuggee normally (the exception, if any, is dismissed).
    #[default]
    Continue,

    /// Let the debuggee's handlers (or the OS default action) deal with the
    /// exception.
    ExceptionNotHandled,
}
