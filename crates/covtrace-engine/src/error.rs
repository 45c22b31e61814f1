/// Debugging backend error.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct BackendError<E>(pub E);

/// Event handler error.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct HandlerError<E>(pub E);

/// Bookkeeping error of the process/thread registry.
///
/// Each variant denotes a broken assumption about the OS event stream
/// (creation events precede every other event of the same ID).
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// A process ID was registered twice.
    #[error("Process {0} already exists")]
    ProcessAlreadyRegistered(u32),

    /// A thread ID was registered twice.
    #[error("Thread {0} already exists")]
    ThreadAlreadyRegistered(u32),

    /// An event referenced a process which is not registered.
    #[error("Cannot find process {0}")]
    UnknownProcess(u32),

    /// An event referenced a thread which is not registered.
    #[error("Cannot find thread {0}")]
    UnknownThread(u32),
}

/// Error type of this crate.
#[derive(thiserror::Error, Debug)]
pub enum Error<E1, E2> {
    /// A debugging backend error occurred.
    #[error(transparent)]
    Backend(#[from] BackendError<E1>),

    /// An event handler error occurred.
    #[error(transparent)]
    Handler(#[from] HandlerError<E2>),

    /// The process/thread registry is inconsistent with the event stream.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The attached process has no thread.
    #[error("Attached process {0} has no thread")]
    AttachWithoutThread(u32),
}

/// Result type of this crate.
pub type Result<T, E1, E2> = core::result::Result<T, Error<E1, E2>>;
