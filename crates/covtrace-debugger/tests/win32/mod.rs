use std::convert::Infallible;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use covtrace_debugger::{Error, Handle, NativeBackend};
use covtrace_engine::backend::ExceptionRecord;
use covtrace_engine::debugger::Debugger;
use covtrace_engine::handler::{EventHandler, ExceptionCategory};
use covtrace_engine::{AttachTarget, BackendError, StartInfo};
use test_log::test;

const BREAKPOINT: u32 = 0x8000_0003;
const WX86_BREAKPOINT: u32 = 0x4000_001F;

/// Event handler counting the notifications of a session.
#[derive(Debug, Default)]
struct CountingHandler {
    processes_created: usize,
    processes_exited: usize,
    threads_created: usize,
    threads_exited: usize,
    dlls_loaded: usize,
    pending_loader_breakpoints: usize,
}

impl EventHandler<NativeBackend> for CountingHandler {
    type Error = Infallible;

    fn process_created(
        &mut self,
        _process_id: u32,
        _process: &Handle,
        _thread: &Handle,
        file: Option<&Handle>,
        _image_base: u64,
    ) -> Result<(), Self::Error> {
        assert!(file.is_some());

        self.processes_created += 1;
        self.pending_loader_breakpoints += 1;
        Ok(())
    }

    fn thread_created(
        &mut self,
        _process_id: u32,
        _thread_id: u32,
        _thread: &Handle,
    ) -> Result<(), Self::Error> {
        self.threads_created += 1;
        Ok(())
    }

    fn thread_exited(
        &mut self,
        _process_id: u32,
        _thread_id: u32,
        _exit_code: u32,
    ) -> Result<(), Self::Error> {
        self.threads_exited += 1;
        Ok(())
    }

    fn process_exited(
        &mut self,
        _process_id: u32,
        _process: &Handle,
        _thread: &Handle,
        _exit_code: u32,
    ) -> Result<(), Self::Error> {
        self.processes_exited += 1;
        Ok(())
    }

    fn dll_loaded(
        &mut self,
        _process: &Handle,
        _thread: &Handle,
        _file: Option<&Handle>,
        _base_addr: u64,
    ) -> Result<(), Self::Error> {
        self.dlls_loaded += 1;
        Ok(())
    }

    fn exception_raised(
        &mut self,
        _process: &Handle,
        _thread: &Handle,
        exception: &ExceptionRecord,
    ) -> Result<ExceptionCategory, Self::Error> {
        let category = match exception.code {
            _ if !exception.first_chance => ExceptionCategory::Error,
            WX86_BREAKPOINT => ExceptionCategory::Breakpoint,
            BREAKPOINT if self.pending_loader_breakpoints > 0 => {
                self.pending_loader_breakpoints -= 1;
                ExceptionCategory::Breakpoint
            }
            BREAKPOINT => ExceptionCategory::InvalidBreakpoint,
            _ => ExceptionCategory::NotHandled,
        };

        Ok(category)
    }
}

fn system_program(relative_path: &str) -> PathBuf {
    let root = std::env::var_os("SystemRoot").unwrap_or_else(|| r"C:\Windows".into());
    PathBuf::from(root).join(relative_path)
}

fn debugger() -> Debugger<NativeBackend> {
    Debugger::builder()
        .with_backend(NativeBackend::new())
        .wait_timeout(Duration::from_millis(10))
        .build()
}

#[test]
fn spawned_process_exit_code() {
    let start_info = StartInfo::new(system_program(
        r"System32\WindowsPowerShell\v1.0\powershell.exe",
    ))
    .args(["-NoProfile", "-NonInteractive", "-Command", "exit 3"]);

    let mut handler = CountingHandler::default();

    let exit_code = debugger().debug(&start_info, &mut handler).unwrap();

    assert_eq!(exit_code, 3);
    assert_eq!(handler.processes_created, 1);
    assert_eq!(handler.processes_exited, 1);
    assert!(handler.threads_created >= 1);
    assert!(handler.threads_exited <= handler.threads_created);
    assert!(handler.dlls_loaded > 0);
    assert_eq!(handler.pending_loader_breakpoints, 0);
}

#[test]
fn spawn_missing_program() {
    let dir = tempfile::tempdir().unwrap();
    let start_info = StartInfo::new(dir.path().join("missing.exe"));

    let res = debugger().debug(&start_info, &mut CountingHandler::default());

    assert!(matches!(
        res,
        Err(covtrace_engine::Error::Backend(BackendError(Error::CannotFindPath(_))))
    ));
}

#[test]
fn attach_to_unknown_image_name() {
    let start_info = StartInfo::new("covtrace-missing.exe")
        .attach(AttachTarget::ImageName("covtrace-missing.exe".to_owned()));

    let res = debugger().debug(&start_info, &mut CountingHandler::default());

    assert!(matches!(
        res,
        Err(covtrace_engine::Error::Backend(BackendError(Error::AttachTargetNotFound(_))))
    ));
}

#[test]
fn attach_to_running_process() {
    let mut child = Command::new(system_program(r"System32\PING.EXE"))
        .args(["-n", "30", "127.0.0.1"])
        .stdout(Stdio::null())
        .spawn()
        .unwrap();

    let start_info = StartInfo::new("").attach(AttachTarget::ProcessId(child.id()));

    // the debug loop runs on the attaching thread
    let killer = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_secs(2));
        child.kill().unwrap();
    });

    let mut handler = CountingHandler::default();

    let exit_code = debugger().debug(&start_info, &mut handler).unwrap();
    killer.join().unwrap();

    // `TerminateProcess` exit code
    assert_eq!(exit_code, 1);
    assert_eq!(handler.processes_created, 1);
    assert_eq!(handler.processes_exited, 1);
    assert!(handler.threads_created >= 1);
    assert!(handler.dlls_loaded > 0);
}
