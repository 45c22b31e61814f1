use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use covtrace_engine::StartInfo;
use covtrace_engine::backend::{ContinueStatus, CreationMode, DebugBackend, DebugEvent};
use covtrace_engine::backend::{DebugEventKind, ExceptionRecord, ModuleEntry, Started, ThreadEntry};

use super::Journal;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("no more scripted debug event")]
    Exhausted,

    #[error("cannot open thread {0}")]
    OpenThread(u32),
}

/// Handle of the scripted backend.
///
/// File handles write their release to the journal.
#[derive(Debug)]
pub struct MockHandle {
    pub name: String,
    journal: Option<Journal>,
}

impl MockHandle {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            journal: None,
        }
    }

    fn file(name: impl Into<String>, journal: &Journal) -> Self {
        Self {
            name: name.into(),
            journal: Some(journal.clone()),
        }
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        if let Some(journal) = self.journal.as_ref() {
            journal.push(format!("close {}", self.name));
        }
    }
}

enum Step {
    Event(DebugEvent<ScriptedBackend>),
    Timeout,
}

struct AttachScript {
    process_id: u32,
    threads: Vec<(u32, u64)>,
    modules: Vec<ModuleEntry>,
    unopenable_thread: Option<u32>,
}

/// Backend replaying a scripted sequence of debug events.
pub struct ScriptedBackend {
    journal: Journal,
    steps: VecDeque<Step>,
    root_active: VecDeque<bool>,
    attach: Option<AttachScript>,
}

impl ScriptedBackend {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            steps: VecDeque::new(),
            root_active: VecDeque::new(),
            attach: None,
        }
    }

    fn event(mut self, process_id: u32, thread_id: u32, kind: DebugEventKind<Self>) -> Self {
        self.steps.push_back(Step::Event(DebugEvent {
            process_id,
            thread_id,
            kind,
        }));
        self
    }

    pub fn process_created(self, process_id: u32, thread_id: u32) -> Self {
        let file = MockHandle::file(format!("file:exe@{process_id}"), &self.journal);

        self.event(
            process_id,
            thread_id,
            DebugEventKind::ProcessCreated {
                process: MockHandle::new(format!("process:{process_id}")),
                thread: MockHandle::new(format!("thread:{thread_id}")),
                file: Some(file),
                image_base: 0x40_0000,
            },
        )
    }

    pub fn thread_created(self, process_id: u32, thread_id: u32) -> Self {
        self.event(
            process_id,
            thread_id,
            DebugEventKind::ThreadCreated {
                thread: MockHandle::new(format!("thread:{thread_id}")),
            },
        )
    }

    pub fn thread_exited(self, process_id: u32, thread_id: u32, exit_code: u32) -> Self {
        self.event(
            process_id,
            thread_id,
            DebugEventKind::ThreadExited { exit_code },
        )
    }

    pub fn process_exited(self, process_id: u32, thread_id: u32, exit_code: u32) -> Self {
        self.event(
            process_id,
            thread_id,
            DebugEventKind::ProcessExited { exit_code },
        )
    }

    pub fn dll_loaded(self, process_id: u32, thread_id: u32, base_addr: u64) -> Self {
        let file = MockHandle::file(format!("file:dll@{base_addr:#x}"), &self.journal);

        self.event(
            process_id,
            thread_id,
            DebugEventKind::DllLoaded {
                file: Some(file),
                base_addr,
            },
        )
    }

    pub fn dll_unloaded(self, process_id: u32, thread_id: u32, base_addr: u64) -> Self {
        self.event(
            process_id,
            thread_id,
            DebugEventKind::DllUnloaded { base_addr },
        )
    }

    pub fn exception(self, process_id: u32, thread_id: u32, code: u32) -> Self {
        self.event(
            process_id,
            thread_id,
            DebugEventKind::Exception(ExceptionRecord {
                code,
                address: 0x40_1000,
                first_chance: true,
                parameters: Vec::new(),
            }),
        )
    }

    pub fn rip(self, process_id: u32, thread_id: u32) -> Self {
        self.event(
            process_id,
            thread_id,
            DebugEventKind::Rip { error: 5, kind: 1 },
        )
    }

    pub fn other(self, process_id: u32, thread_id: u32, code: u32) -> Self {
        self.event(process_id, thread_id, DebugEventKind::Other(code))
    }

    pub fn timeout(mut self) -> Self {
        self.steps.push_back(Step::Timeout);
        self
    }

    /// Answers of the root process liveness checks, in order (active once
    /// exhausted).
    pub fn root_active(mut self, answers: &[bool]) -> Self {
        self.root_active.extend(answers);
        self
    }

    /// Attaches to a running process with the given threads (ID, creation
    /// time) and modules.
    pub fn attach(
        mut self,
        process_id: u32,
        threads: &[(u32, u64)],
        modules: Vec<ModuleEntry>,
    ) -> Self {
        self.attach = Some(AttachScript {
            process_id,
            threads: threads.to_vec(),
            modules,
            unopenable_thread: None,
        });
        self
    }

    /// Makes the thread enumeration of the attached process fail on the
    /// given thread (e.g., exited since the snapshot).
    pub fn unopenable_thread(mut self, thread_id: u32) -> Self {
        if let Some(attach) = self.attach.as_mut() {
            attach.unopenable_thread = Some(thread_id);
        }
        self
    }
}

impl DebugBackend for ScriptedBackend {
    type Process = MockHandle;
    type Thread = MockHandle;
    type File = MockHandle;
    type Error = ScriptError;

    fn start(
        &mut self,
        _start_info: &StartInfo,
        mode: CreationMode,
    ) -> Result<Started<Self>, Self::Error> {
        self.journal.push(format!("start {mode:?}"));

        Ok(Started {
            root_process: MockHandle::new("root"),
            attached_process_id: self.attach.as_ref().map(|attach| attach.process_id),
        })
    }

    fn wait_event(
        &mut self,
        _timeout: Duration,
    ) -> Result<Option<DebugEvent<Self>>, Self::Error> {
        match self.steps.pop_front() {
            Some(Step::Event(event)) => Ok(Some(event)),
            Some(Step::Timeout) => {
                self.journal.push("timeout".to_owned());
                Ok(None)
            }
            None => Err(ScriptError::Exhausted),
        }
    }

    fn continue_event(
        &mut self,
        process_id: u32,
        thread_id: u32,
        status: ContinueStatus,
    ) -> Result<(), Self::Error> {
        self.journal
            .push(format!("continue {process_id}/{thread_id} {status:?}"));
        Ok(())
    }

    fn is_process_active(&mut self, process: &Self::Process) -> Result<bool, Self::Error> {
        assert_eq!(process.name, "root");
        Ok(self.root_active.pop_front().unwrap_or(true))
    }

    fn enumerate_threads(
        &mut self,
        process_id: u32,
    ) -> Result<Vec<ThreadEntry<Self>>, Self::Error> {
        let attach = self.attach.as_ref().unwrap();
        assert_eq!(attach.process_id, process_id);

        attach
            .threads
            .iter()
            .map(|&(thread_id, creation_time)| {
                if attach.unopenable_thread == Some(thread_id) {
                    return Err(ScriptError::OpenThread(thread_id));
                }

                Ok(ThreadEntry {
                    thread_id,
                    thread: MockHandle::new(format!("thread:{thread_id}")),
                    creation_time,
                })
            })
            .collect()
    }

    fn open_process(&mut self, process_id: u32) -> Result<Self::Process, Self::Error> {
        Ok(MockHandle::new(format!("process:{process_id}")))
    }

    fn enumerate_modules(
        &mut self,
        _process: &Self::Process,
    ) -> Result<Vec<ModuleEntry>, Self::Error> {
        Ok(self.attach.as_ref().unwrap().modules.clone())
    }

    fn open_file(&mut self, path: &Path) -> Result<Self::File, Self::Error> {
        Ok(MockHandle::file(
            format!("file:{}", path.display()),
            &self.journal,
        ))
    }
}
