use std::collections::HashSet;

use super::policy::{ExceptionPolicy, ProcessOutcome};
use super::registry::HandleRegistry;
use crate::HandlerError;
use crate::backend::{DebugBackend, DebugEvent, DebugEventKind};
use crate::handler::EventHandler;

/// State of a single debug session.
pub(super) struct SessionState<B: DebugBackend + ?Sized> {
    /// Processes and threads currently under debug.
    pub registry: HandleRegistry<B::Process, B::Thread>,

    /// ID of the first process seen in the session.
    pub root_process_id: Option<u32>,

    /// IDs reported by the attach bootstrap, before the OS reports them.
    pub seeded: SeededIds,
}

/// IDs of the processes, threads and DLLs reported by the attach bootstrap.
///
/// The OS may report them again once attached, in which case the handle it
/// provides replaces the seeded one, without notifying the event handler a
/// second time.
#[derive(Default)]
pub(super) struct SeededIds {
    pub processes: HashSet<u32>,
    pub threads: HashSet<u32>,
    pub dlls: HashSet<(u32, u64)>,
}

impl<B: DebugBackend + ?Sized> SessionState<B> {
    pub fn new() -> Self {
        Self {
            registry: HandleRegistry::new(),
            root_process_id: None,
            seeded: SeededIds::default(),
        }
    }

    /// Handles a single debug event.
    ///
    /// File handles attached to the event are released before returning.
    pub fn dispatch<H: EventHandler<B>>(
        &mut self,
        policy: &ExceptionPolicy,
        event: DebugEvent<B>,
        handler: &mut H,
    ) -> crate::Result<ProcessOutcome, B::Error, H::Error> {
        let DebugEvent {
            process_id,
            thread_id,
            kind,
        } = event;

        match kind {
            DebugEventKind::ProcessCreated {
                process,
                thread,
                file,
                image_base,
            } => {
                self.on_create_process(
                    process_id, thread_id, process, thread, file, image_base, handler,
                )?;
            }
            DebugEventKind::ThreadCreated { thread } => {
                self.on_create_thread(process_id, thread_id, thread, handler)?;
            }
            DebugEventKind::ThreadExited { exit_code } => {
                self.registry.process(process_id)?;
                self.on_exit_thread(process_id, thread_id, exit_code, handler)?;
            }
            DebugEventKind::ProcessExited { exit_code } => {
                return self.on_exit_process(process_id, thread_id, exit_code, handler);
            }
            DebugEventKind::DllLoaded { file, base_addr } => {
                let process = self.registry.process(process_id)?;
                let thread = self.registry.thread(thread_id)?;

                tracing::debug!(
                    pid = process_id,
                    addr = format_args!("{base_addr:#x}"),
                    "load dll"
                );

                if self.seeded.dlls.remove(&(process_id, base_addr)) {
                    tracing::debug!("dll already reported at attach");
                } else {
                    handler
                        .dll_loaded(process, thread, file.as_ref(), base_addr)
                        .map_err(HandlerError)?;
                }
            }
            DebugEventKind::DllUnloaded { base_addr } => {
                let process = self.registry.process(process_id)?;
                let thread = self.registry.thread(thread_id)?;

                tracing::debug!(
                    pid = process_id,
                    addr = format_args!("{base_addr:#x}"),
                    "unload dll"
                );

                self.seeded.dlls.remove(&(process_id, base_addr));

                handler
                    .dll_unloaded(process, thread, base_addr)
                    .map_err(HandlerError)?;
            }
            DebugEventKind::Exception(exception) => {
                let process = self.registry.process(process_id)?;
                let thread = self.registry.thread(thread_id)?;

                tracing::debug!(
                    tid = thread_id,
                    code = format_args!("{:#x}", exception.code),
                    addr = format_args!("{:#x}", exception.address),
                    first_chance = exception.first_chance,
                    "exception"
                );

                let category = handler
                    .exception_raised(process, thread, &exception)
                    .map_err(HandlerError)?;

                return Ok(policy.outcome(category, exception.code));
            }
            DebugEventKind::Rip { error, kind } => {
                self.registry.process(process_id)?;
                self.registry.thread(thread_id)?;

                tracing::error!(
                    pid = process_id,
                    kind,
                    error,
                    "debuggee process terminated unexpectedly"
                );
            }
            DebugEventKind::Other(code) => {
                self.registry.process(process_id)?;
                self.registry.thread(thread_id)?;

                tracing::debug!(code, "unhandled debug event");
            }
        }

        Ok(ProcessOutcome::default())
    }

    #[allow(clippy::too_many_arguments)]
    fn on_create_process<H: EventHandler<B>>(
        &mut self,
        process_id: u32,
        thread_id: u32,
        process: B::Process,
        thread: B::Thread,
        file: Option<B::File>,
        image_base: u64,
        handler: &mut H,
    ) -> crate::Result<(), B::Error, H::Error> {
        tracing::debug!(pid = process_id, "create process");

        if self.seeded.processes.remove(&process_id) {
            tracing::debug!(pid = process_id, "process already reported at attach");

            self.registry.replace_process(process_id, process)?;

            return self.on_create_thread(process_id, thread_id, thread, handler);
        }

        if self.root_process_id.is_none() && self.registry.is_empty() {
            self.root_process_id = Some(process_id);
        }

        self.registry.register_process(process_id, process)?;

        handler
            .process_created(
                process_id,
                self.registry.process(process_id)?,
                &thread,
                file.as_ref(),
                image_base,
            )
            .map_err(HandlerError)?;

        self.on_create_thread(process_id, thread_id, thread, handler)
    }

    fn on_create_thread<H: EventHandler<B>>(
        &mut self,
        process_id: u32,
        thread_id: u32,
        thread: B::Thread,
        handler: &mut H,
    ) -> crate::Result<(), B::Error, H::Error> {
        tracing::debug!(pid = process_id, tid = thread_id, "create thread");

        if self.seeded.threads.remove(&thread_id) {
            tracing::debug!(tid = thread_id, "thread already reported at attach");

            self.registry.replace_thread(thread_id, thread)?;

            return Ok(());
        }

        self.registry.register_thread(thread_id, thread)?;

        handler
            .thread_created(process_id, thread_id, self.registry.thread(thread_id)?)
            .map_err(HandlerError)?;

        Ok(())
    }

    /// On success, returns the handle of the exited thread.
    fn on_exit_thread<H: EventHandler<B>>(
        &mut self,
        process_id: u32,
        thread_id: u32,
        exit_code: u32,
        handler: &mut H,
    ) -> crate::Result<B::Thread, B::Error, H::Error> {
        tracing::debug!(tid = thread_id, exit_code, "exit thread");

        let thread = self.registry.unregister_thread(thread_id)?;
        self.seeded.threads.remove(&thread_id);

        handler
            .thread_exited(process_id, thread_id, exit_code)
            .map_err(HandlerError)?;

        Ok(thread)
    }

    fn on_exit_process<H: EventHandler<B>>(
        &mut self,
        process_id: u32,
        thread_id: u32,
        exit_code: u32,
        handler: &mut H,
    ) -> crate::Result<ProcessOutcome, B::Error, H::Error> {
        self.registry.process(process_id)?;

        let thread = self.on_exit_thread(process_id, thread_id, exit_code, handler)?;

        tracing::debug!(pid = process_id, exit_code, "exit process");

        handler
            .process_exited(
                process_id,
                self.registry.process(process_id)?,
                &thread,
                exit_code,
            )
            .map_err(HandlerError)?;

        self.registry.unregister_process(process_id)?;
        self.seeded.processes.remove(&process_id);

        Ok(ProcessOutcome::exited(exit_code))
    }
}
