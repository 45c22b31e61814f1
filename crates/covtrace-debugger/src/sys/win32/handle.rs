use windows::Win32::Foundation::{CloseHandle, HANDLE};

/// OS handle of a process, thread or file.
///
/// Handles opened by the backend are closed when dropped. Handles provided
/// by debug events are owned by the OS, and left untouched.
#[derive(Debug)]
pub struct Handle {
    raw: HANDLE,
    owned: bool,
}

impl Handle {
    pub(super) const fn owned(raw: HANDLE) -> Self {
        Self { raw, owned: true }
    }

    pub(super) const fn borrowed(raw: HANDLE) -> Self {
        Self { raw, owned: false }
    }

    /// Opened handle, or `None` if `raw` is invalid.
    pub(super) fn owned_opt(raw: HANDLE) -> Option<Self> {
        (!raw.is_invalid()).then(|| Self::owned(raw))
    }

    /// Returns the raw OS handle.
    pub const fn raw(&self) -> HANDLE {
        self.raw
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if !self.owned || self.raw.is_invalid() {
            return;
        }

        if let Err(e) = unsafe { CloseHandle(self.raw) } {
            tracing::error!(handle = ?self.raw, "Cannot close handle: {e}");
        }
    }
}
