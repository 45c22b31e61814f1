use std::time::Duration;

use super::Debugger;
use super::policy::ExceptionPolicy;
use crate::backend::DebugBackend;

/// Default time to wait for a debug event before checking whether the root
/// process is still alive.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(1);

/// Builder for [Debugger].
///
/// It is usually created by calling [Debugger::builder], and allows to
/// specify which backend to use and how the debuggee is handled.
pub struct Builder<S> {
    state: S,
}

impl Builder<NeedsBackend> {
    pub(super) const fn new() -> Self {
        Self {
            state: NeedsBackend,
        }
    }

    /// Specifies the backend to use for starting and debugging a process.
    pub const fn with_backend<B: DebugBackend>(self, backend: B) -> Builder<WithBackend<B>> {
        Builder {
            state: WithBackend {
                backend,
                cover_children: false,
                policy: ExceptionPolicy {
                    continue_after_cpp_exception: false,
                    stop_on_assert: false,
                },
                wait_timeout: DEFAULT_WAIT_TIMEOUT,
            },
        }
    }
}

impl<B: DebugBackend> Builder<WithBackend<B>> {
    /// Specifies whether the processes spawned by the debuggee are debugged
    /// as well.
    ///
    /// If enabled, the session lasts until every debugged process has
    /// exited.
    pub const fn cover_children(mut self, enable: bool) -> Self {
        self.state.cover_children = enable;
        self
    }

    /// Specifies whether the debuggee keeps running after a native (C++)
    /// exception it does not handle.
    pub const fn continue_after_cpp_exception(mut self, enable: bool) -> Self {
        self.state.policy.continue_after_cpp_exception = enable;
        self
    }

    /// Specifies whether assertion-style breakpoints (e.g., `DebugBreak()`)
    /// stop the debuggee, instead of being masked.
    pub const fn stop_on_assert(mut self, enable: bool) -> Self {
        self.state.policy.stop_on_assert = enable;
        self
    }

    /// Specifies how long to wait for a debug event before checking
    /// whether the root process is still alive.
    pub const fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.state.wait_timeout = timeout;
        self
    }

    /// Builds the debugger.
    pub fn build(self) -> Debugger<B> {
        let WithBackend {
            backend,
            cover_children,
            policy,
            wait_timeout,
        } = self.state;

        Debugger {
            backend,
            cover_children,
            policy,
            wait_timeout,
        }
    }
}

pub struct NeedsBackend;

pub struct WithBackend<B> {
    backend: B,
    cover_children: bool,
    policy: ExceptionPolicy,
    wait_timeout: Duration,
}
