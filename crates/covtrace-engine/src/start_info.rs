use std::fmt;
use std::path::PathBuf;

/// Description of the debuggee to start, providing control over how the
/// process is spawned (or which running process is attached to).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartInfo {
    /// Program to spawn.
    ///
    /// In attach mode, the executable reported by the OS for the running
    /// process takes precedence.
    pub path: PathBuf,

    /// Program arguments for the process to spawn.
    pub args: Vec<String>,

    /// Working directory for the process to spawn.
    pub working_dir: Option<PathBuf>,

    /// Running process to attach to, instead of spawning `path`.
    pub attach: Option<AttachTarget>,
}

/// Identity of a running process to attach to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachTarget {
    /// Process with the given ID.
    ProcessId(u32),

    /// The single running process whose executable has the given file name
    /// (e.g., `app.exe`). The comparison is case-insensitive.
    ImageName(String),
}

impl StartInfo {
    /// Constructs a new `StartInfo` for launching the program at path `path`,
    /// with the following default configuration:
    ///
    /// * No arguments to the program
    /// * Inherit the current process's working directory
    /// * Spawn a new process (no attach)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
            working_dir: None,
            attach: None,
        }
    }

    /// Adds an argument to pass to the program.
    ///
    /// To pass multiple arguments see [`args`](Self::args).
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Adds multiple arguments to pass to the program.
    ///
    /// To pass a single argument see [`arg`](Self::arg).
    pub fn args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        args.into_iter().fold(self, |info, arg| info.arg(arg))
    }

    /// Sets the working directory for the process to spawn.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Attaches to an already running process instead of spawning one.
    pub fn attach(mut self, target: AttachTarget) -> Self {
        self.attach = Some(target);
        self
    }

    /// Builds the command line of the process to spawn.
    ///
    /// The program path comes first, and every element is enclosed in
    /// double quotes.
    pub fn command_line(&self) -> String {
        std::iter::once(self.path.to_string_lossy().into_owned())
            .chain(self.args.iter().cloned())
            .map(|element| format!("\"{element}\""))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for StartInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Path: {}", self.path.display())?;

        if !self.args.is_empty() {
            writeln!(f, "Arguments: {}", self.args.join(" "))?;
        }

        if let Some(dir) = self.working_dir.as_ref() {
            writeln!(f, "Working directory: {}", dir.display())?;
        }

        match self.attach.as_ref() {
            Some(AttachTarget::ProcessId(pid)) => writeln!(f, "Attach to process: {pid}"),
            Some(AttachTarget::ImageName(name)) => writeln!(f, "Attach to process: {name}"),
            None => Ok(()),
        }
    }
}
