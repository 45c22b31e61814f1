use crate::backend::{DebugBackend, ExceptionRecord};

/// Category of an exception raised within the debuggee, as decided by an
/// [EventHandler].
///
/// The [Debugger](crate::debugger::Debugger) maps every category to a
/// continuation decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExceptionCategory {
    /// Instrumentation breakpoint: the debuggee is resumed transparently.
    Breakpoint,

    /// Breakpoint not set by the instrumentation (assertion failure, or
    /// explicit break into the debugger).
    InvalidBreakpoint,

    /// Exception unrelated to the instrumentation.
    NotHandled,

    /// The exception could not be resolved meaningfully.
    Error,

    /// Native (C++) exception not handled by the debuggee.
    CppError,
}

/// Trait for implementing a debug event handler (e.g., an instrumentation
/// layer collecting coverage).
///
/// # Note
///
/// File handles are lent for the duration of the call only: they are
/// released as soon as the notification returns.
pub trait EventHandler<B: DebugBackend + ?Sized> {
    /// Error returned by this event handler.
    type Error: std::error::Error;

    /// Function called when a process is created (or attached to).
    ///
    /// The process' initial thread is reported by a subsequent call to
    /// [thread_created](Self::thread_created).
    fn process_created(
        &mut self,
        _process_id: u32,
        _process: &B::Process,
        _thread: &B::Thread,
        _file: Option<&B::File>,
        _image_base: u64,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Function called when a thread is created.
    fn thread_created(
        &mut self,
        _process_id: u32,
        _thread_id: u32,
        _thread: &B::Thread,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Function called when a thread has exited.
    fn thread_exited(
        &mut self,
        _process_id: u32,
        _thread_id: u32,
        _exit_code: u32,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Function called when a process has exited.
    fn process_exited(
        &mut self,
        _process_id: u32,
        _process: &B::Process,
        _thread: &B::Thread,
        _exit_code: u32,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Function called when a DLL is loaded by a process.
    fn dll_loaded(
        &mut self,
        _process: &B::Process,
        _thread: &B::Thread,
        _file: Option<&B::File>,
        _base_addr: u64,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Function called when a DLL is unloaded by a process.
    fn dll_unloaded(
        &mut self,
        _process: &B::Process,
        _thread: &B::Thread,
        _base_addr: u64,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Function called when an exception is raised within a process.
    ///
    /// The returned category decides how the debuggee is resumed.
    fn exception_raised(
        &mut self,
        process: &B::Process,
        thread: &B::Thread,
        exception: &ExceptionRecord,
    ) -> Result<ExceptionCategory, Self::Error>;
}
