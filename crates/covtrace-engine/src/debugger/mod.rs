mod bootstrap;
mod builder;
mod dispatch;
mod policy;
mod registry;

use std::time::Duration;

pub use self::builder::{Builder, DEFAULT_WAIT_TIMEOUT};
use self::builder::NeedsBackend;
use self::dispatch::SessionState;
pub use self::policy::{BREAKPOINT_EXIT_CODE, ExceptionPolicy, ProcessOutcome};
use crate::backend::{CreationMode, DebugBackend};
use crate::handler::EventHandler;
use crate::{BackendError, StartInfo};

/// Exit code reported when the root process vanished without reporting its
/// exit.
pub const VANISHED_EXIT_CODE: u32 = 108;

/// Debug session engine.
///
/// It starts the debuggee, then pumps its debug events until every debugged
/// process has exited, forwarding each event to an [EventHandler].
pub struct Debugger<B> {
    /// Backend implementing the OS debugging primitives.
    backend: B,

    /// Whether descendant processes are debugged as well.
    cover_children: bool,

    /// Continuation policy of exceptions.
    policy: ExceptionPolicy,

    /// Maximum time to wait for a single debug event.
    wait_timeout: Duration,
}

impl Debugger<()> {
    /// Creates a debugger builder.
    pub const fn builder() -> Builder<NeedsBackend> {
        Builder::new()
    }
}

impl<B: DebugBackend> Debugger<B> {
    /// Returns the exception policy of this debugger.
    pub const fn policy(&self) -> &ExceptionPolicy {
        &self.policy
    }

    /// Starts (or attaches to) the debuggee described by `start_info`, and
    /// debugs it until it exits.
    ///
    /// On success, the exit code of the root process is returned. The first
    /// exit code determined for the root process is kept, even if later
    /// events of that process would determine another one.
    #[tracing::instrument(name = "Debug", skip_all, fields(path = %start_info.path.display()))]
    pub fn debug<H: EventHandler<B>>(
        &mut self,
        start_info: &StartInfo,
        handler: &mut H,
    ) -> crate::Result<u32, B::Error, H::Error> {
        let mode = CreationMode::from_cover_children(self.cover_children);

        let started = self
            .backend
            .start(start_info, mode)
            .map_err(BackendError)?;

        let mut state = SessionState::new();

        if let Some(process_id) = started.attached_process_id {
            tracing::info!(pid = process_id, "attached");

            bootstrap::replay_attached_process(
                &mut self.backend,
                start_info,
                process_id,
                &mut state,
                &self.policy,
                handler,
            )?;
        } else {
            tracing::info!("spawned");
        }

        self.run_event_loop(&started.root_process, &mut state, handler)
    }

    #[tracing::instrument(name = "DebugEventLoop", skip_all)]
    fn run_event_loop<H: EventHandler<B>>(
        &mut self,
        root_process: &B::Process,
        state: &mut SessionState<B>,
        handler: &mut H,
    ) -> crate::Result<u32, B::Error, H::Error> {
        let mut exit_code = None;

        loop {
            // the root process may exit before its children do
            match exit_code {
                Some(code) if state.registry.is_empty() => {
                    tracing::info!(exit_code = code, "debuggee has exited");
                    break Ok(code);
                }
                _ => (),
            }

            let Some(event) = self
                .backend
                .wait_event(self.wait_timeout)
                .map_err(BackendError)?
            else {
                if exit_code.is_none()
                    && !self
                        .backend
                        .is_process_active(root_process)
                        .map_err(BackendError)?
                {
                    tracing::warn!(
                        exit_code = VANISHED_EXIT_CODE,
                        "debuggee has exited without notice"
                    );
                    break Ok(VANISHED_EXIT_CODE);
                }

                continue;
            };

            let process_id = event.process_id;
            let thread_id = event.thread_id;

            tracing::debug!(
                pid = process_id,
                tid = thread_id,
                kind = event.kind.label(),
                "debug event"
            );

            let outcome = state.dispatch(&self.policy, event, handler)?;

            tracing::trace!(
                processes = state.registry.process_count(),
                threads = state.registry.thread_count(),
                "under debug"
            );

            if exit_code.is_none() && state.root_process_id == Some(process_id) {
                exit_code = outcome.exit_code;
            }

            self.backend
                .continue_event(
                    process_id,
                    thread_id,
                    outcome.continue_status.unwrap_or_default(),
                )
                .map_err(BackendError)?;
        }
    }
}
