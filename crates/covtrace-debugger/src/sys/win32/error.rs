/// Internal error of the Win32 backend.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A Win32 call failed.
    #[error("{0} failed: {1}")]
    Os(&'static str, windows::core::Error),

    /// A path cannot be passed to a Win32 call.
    #[error("path contains a nul character: {0}")]
    InteriorNul(std::path::PathBuf),
}

/// Result type of the Win32 backend.
pub type Result<T> = core::result::Result<T, Error>;

/// Adapts the error of the given Win32 call.
pub(super) fn os(call: &'static str) -> impl FnOnce(windows::core::Error) -> Error {
    move |err| Error::Os(call, err)
}
