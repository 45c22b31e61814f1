use super::dispatch::SessionState;
use super::policy::ExceptionPolicy;
use crate::backend::{DebugBackend, DebugEvent, DebugEventKind, ThreadEntry};
use crate::handler::EventHandler;
use crate::{BackendError, StartInfo};

/// Reports the current state of an attached process (its threads and loaded
/// DLLs) as creation events, so that the session sees the same history as
/// for a spawned process.
#[tracing::instrument(name = "AttachBootstrap", skip_all, fields(pid = process_id))]
pub(super) fn replay_attached_process<B, H>(
    backend: &mut B,
    start_info: &StartInfo,
    process_id: u32,
    state: &mut SessionState<B>,
    policy: &ExceptionPolicy,
    handler: &mut H,
) -> crate::Result<(), B::Error, H::Error>
where
    B: DebugBackend,
    H: EventHandler<B>,
{
    let mut threads = backend
        .enumerate_threads(process_id)
        .map_err(BackendError)?;

    let main_idx =
        main_thread_index(&threads).ok_or(crate::Error::AttachWithoutThread(process_id))?;
    let main_thread = threads.remove(main_idx);
    let main_thread_id = main_thread.thread_id;

    tracing::debug!(
        tid = main_thread_id,
        threads = threads.len() + 1,
        "main thread selected"
    );

    let process = backend.open_process(process_id).map_err(BackendError)?;
    let modules = backend.enumerate_modules(&process).map_err(BackendError)?;
    let main_image = modules.iter().find(|module| module.is_main_image);

    let image_path = main_image.map_or(start_info.path.as_path(), |module| module.path.as_path());
    let image_base = main_image.map_or(0, |module| module.base_addr);

    let file = backend.open_file(image_path).map_err(BackendError)?;

    let process_created = DebugEvent {
        process_id,
        thread_id: main_thread_id,
        kind: DebugEventKind::ProcessCreated {
            process,
            thread: main_thread.thread,
            file: Some(file),
            image_base,
        },
    };

    state.dispatch(policy, process_created, handler)?;

    let mut thread_ids = vec![main_thread_id];

    for entry in threads {
        let thread_created = DebugEvent {
            process_id,
            thread_id: entry.thread_id,
            kind: DebugEventKind::ThreadCreated {
                thread: entry.thread,
            },
        };

        state.dispatch(policy, thread_created, handler)?;
        thread_ids.push(entry.thread_id);
    }

    let mut dll_bases = Vec::new();

    for module in modules.into_iter().filter(|module| !module.is_main_image) {
        let file = backend.open_file(&module.path).map_err(BackendError)?;

        let dll_loaded = DebugEvent {
            process_id,
            thread_id: main_thread_id,
            kind: DebugEventKind::DllLoaded {
                file: Some(file),
                base_addr: module.base_addr,
            },
        };

        state.dispatch(policy, dll_loaded, handler)?;
        dll_bases.push(module.base_addr);
    }

    tracing::info!(
        threads = thread_ids.len(),
        dlls = dll_bases.len(),
        "attached process state reported"
    );

    state.seeded.processes.insert(process_id);
    state.seeded.threads.extend(thread_ids);
    state
        .seeded
        .dlls
        .extend(dll_bases.into_iter().map(|base| (process_id, base)));

    Ok(())
}

/// Returns the index of the earliest created thread (the first one, on
/// ties).
fn main_thread_index<B: DebugBackend + ?Sized>(threads: &[ThreadEntry<B>]) -> Option<usize> {
    threads
        .iter()
        .enumerate()
        .min_by_key(|(_, entry)| entry.creation_time)
        .map(|(idx, _)| idx)
}
