use std::path::PathBuf;

use covtrace_engine::StartInfo;

const BITNESS_NOTE: &str = if cfg!(target_pointer_width = "32") {
    "\n*** This version support only 32 bits executable ***.\n\n"
} else {
    ""
};

/// Error type of this crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The program to debug does not exist.
    #[error("Cannot find path: {}", .0.display())]
    CannotFindPath(PathBuf),

    /// The program to debug exists but could not be started.
    #[error(
        "Cannot run process, check if it is a valid executable:\n{}{start_info}{reason}",
        BITNESS_NOTE
    )]
    InvalidExecutable {
        /// How the program was started.
        start_info: Box<StartInfo>,

        /// OS error message.
        reason: String,
    },

    /// No running process has the image name to attach to.
    #[error("Cannot find a running process named {0}")]
    AttachTargetNotFound(String),

    /// Several running processes have the image name to attach to.
    #[error("{count} running processes are named {name}, attach by ID instead")]
    AmbiguousAttachTarget {
        /// Image name to attach to.
        name: String,

        /// Number of matching processes.
        count: usize,
    },

    /// No debugging backend is available on this host.
    #[error("No debugger implementation is available for this platform")]
    UnsupportedPlatform,

    /// Internal debugger error.
    #[cfg(windows)]
    #[error(transparent)]
    DebuggerInternal(#[from] crate::sys::Error),
}

/// Result type of this crate.
pub type Result<T> = core::result::Result<T, Error>;
