use std::convert::Infallible;
use std::fmt;

use covtrace_engine::backend::{DebugBackend, ExceptionRecord};
use covtrace_engine::handler::{EventHandler, ExceptionCategory};

/// `EXCEPTION_BREAKPOINT`
const BREAKPOINT: u32 = 0x8000_0003;

/// `STATUS_WX86_BREAKPOINT` (loader breakpoint of WOW64 processes)
const WX86_BREAKPOINT: u32 = 0x4000_001F;

/// Exception code of C++ `throw` (MSVC).
const CPP_EXCEPTION: u32 = 0xE06D_7363;

/// Default classification of the exceptions raised by the debuggee.
///
/// The OS raises one loader breakpoint in every new (or attached) process,
/// which is the only breakpoint expected from a process that is not
/// instrumented.
#[derive(Debug, Default)]
pub struct ExceptionTriage {
    pending_loader_breakpoints: usize,
}

impl ExceptionTriage {
    /// Expects the loader breakpoint of a new process.
    pub const fn process_created(&mut self) {
        self.pending_loader_breakpoints += 1;
    }

    /// Classifies an exception.
    pub fn classify(&mut self, exception: &ExceptionRecord) -> ExceptionCategory {
        if !exception.first_chance {
            return if exception.code == CPP_EXCEPTION {
                ExceptionCategory::CppError
            } else {
                ExceptionCategory::Error
            };
        }

        match exception.code {
            WX86_BREAKPOINT => ExceptionCategory::Breakpoint,
            BREAKPOINT if self.pending_loader_breakpoints > 0 => {
                self.pending_loader_breakpoints -= 1;
                ExceptionCategory::Breakpoint
            }
            BREAKPOINT => ExceptionCategory::InvalidBreakpoint,
            _ => ExceptionCategory::NotHandled,
        }
    }
}

/// Counters of a debug session.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Number of debugged processes.
    pub processes: usize,

    /// Number of debugged threads.
    pub threads: usize,

    /// Number of loaded DLLs.
    pub dlls: usize,

    /// Number of breakpoints (including assertion failures).
    pub breakpoints: usize,

    /// Number of exceptions passed to the debuggee.
    pub exceptions: usize,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processes:   {}", self.processes)?;
        writeln!(f, "Threads:     {}", self.threads)?;
        writeln!(f, "DLLs:        {}", self.dlls)?;
        writeln!(f, "Breakpoints: {}", self.breakpoints)?;
        write!(f, "Exceptions:  {}", self.exceptions)
    }
}

/// Event handler logging the debug events of a session.
#[derive(Debug, Default)]
pub struct ReportingHandler {
    triage: ExceptionTriage,
    summary: SessionSummary,
}

impl ReportingHandler {
    /// Returns the counters of the session so far.
    pub const fn summary(&self) -> &SessionSummary {
        &self.summary
    }
}

impl<B: DebugBackend> EventHandler<B> for ReportingHandler {
    type Error = Infallible;

    fn process_created(
        &mut self,
        process_id: u32,
        _process: &B::Process,
        _thread: &B::Thread,
        _file: Option<&B::File>,
        image_base: u64,
    ) -> Result<(), Self::Error> {
        tracing::info!(
            pid = process_id,
            base = format_args!("{image_base:#x}"),
            "process created"
        );

        self.triage.process_created();
        self.summary.processes += 1;
        Ok(())
    }

    fn thread_created(
        &mut self,
        process_id: u32,
        thread_id: u32,
        _thread: &B::Thread,
    ) -> Result<(), Self::Error> {
        tracing::debug!(pid = process_id, tid = thread_id, "thread created");

        self.summary.threads += 1;
        Ok(())
    }

    fn thread_exited(
        &mut self,
        process_id: u32,
        thread_id: u32,
        exit_code: u32,
    ) -> Result<(), Self::Error> {
        tracing::debug!(pid = process_id, tid = thread_id, exit_code, "thread exited");
        Ok(())
    }

    fn process_exited(
        &mut self,
        process_id: u32,
        _process: &B::Process,
        _thread: &B::Thread,
        exit_code: u32,
    ) -> Result<(), Self::Error> {
        tracing::info!(pid = process_id, exit_code, "process exited");
        Ok(())
    }

    fn dll_loaded(
        &mut self,
        _process: &B::Process,
        _thread: &B::Thread,
        _file: Option<&B::File>,
        base_addr: u64,
    ) -> Result<(), Self::Error> {
        tracing::debug!(base = format_args!("{base_addr:#x}"), "dll loaded");

        self.summary.dlls += 1;
        Ok(())
    }

    fn exception_raised(
        &mut self,
        _process: &B::Process,
        _thread: &B::Thread,
        exception: &ExceptionRecord,
    ) -> Result<ExceptionCategory, Self::Error> {
        let category = self.triage.classify(exception);

        match category {
            ExceptionCategory::Breakpoint | ExceptionCategory::InvalidBreakpoint => {
                self.summary.breakpoints += 1;
            }
            ExceptionCategory::Error => {
                tracing::error!(
                    code = format_args!("{:#x}", exception.code),
                    addr = format_args!("{:#x}", exception.address),
                    "unhandled exception"
                );
                self.summary.exceptions += 1;
            }
            ExceptionCategory::NotHandled | ExceptionCategory::CppError => {
                self.summary.exceptions += 1;
            }
        }

        Ok(category)
    }
}
