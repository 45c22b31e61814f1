use std::path::PathBuf;

use covtrace_engine::AttachTarget;

/// The covtrace debugger.
#[derive(clap::Parser)]
pub struct CliOpts {
    /// The command to run.
    #[clap(subcommand)]
    pub action: CliAction,
}

/// The command to run.
#[derive(clap::Subcommand)]
pub enum CliAction {
    /// Command to spawn a new process and debug it.
    Run {
        /// Configuration of the debug session.
        #[clap(flatten)]
        session: CliSessionArgs,

        /// Working directory of the program.
        #[clap(short, long, value_name = "DIR")]
        working_dir: Option<PathBuf>,

        /// Name of program to run.
        program: PathBuf,

        /// Program's arguments.
        #[clap(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Command to attach to a running process and debug it.
    Attach {
        /// Configuration of the debug session.
        #[clap(flatten)]
        session: CliSessionArgs,

        /// Process to attach to.
        #[clap(flatten)]
        target: CliAttachTarget,

        /// Path of the running program.
        ///
        /// Only used when the OS cannot report the executable of the
        /// process.
        program: Option<PathBuf>,
    },
}

/// Configuration of the debug session.
#[derive(clap::Args)]
pub struct CliSessionArgs {
    /// Debug session configuration (KDL format).
    ///
    /// If it ends with `.kdl`, it is treated as a path to a configuration
    /// file. Otherwise it is directly parsed as inline KDL-formatted
    /// configuration.
    #[clap(short, long, value_name = "CONTENT/PATH")]
    pub config: Option<String>,

    /// Debug the processes spawned by the program as well.
    #[clap(long)]
    pub cover_children: bool,

    /// Keep running after an unhandled C++ exception.
    #[clap(long)]
    pub continue_after_cpp_exception: bool,

    /// Let assertion failures (and `DebugBreak()` calls) stop the program.
    #[clap(long)]
    pub stop_on_assert: bool,
}

/// Process to attach to.
#[derive(clap::Args)]
#[group(required = true, multiple = false)]
pub struct CliAttachTarget {
    /// ID of the process.
    #[clap(long, value_name = "PID")]
    pub pid: Option<u32>,

    /// Image name of the process (e.g., `app.exe`).
    #[clap(long, value_name = "IMAGE")]
    pub name: Option<String>,
}

impl CliAttachTarget {
    /// Returns the process to attach to.
    pub fn into_target(self) -> Option<AttachTarget> {
        self.pid
            .map(AttachTarget::ProcessId)
            .or_else(|| self.name.map(AttachTarget::ImageName))
    }
}

impl CliOpts {
    /// Parses the CLI from the command-line.
    ///
    /// # Warning
    ///
    /// Exits on error.
    pub fn parse_from_cmdline() -> Self {
        <Self as clap::Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use covtrace_engine::AttachTarget;

    use super::{CliAction, CliOpts};

    #[test]
    fn run_with_program_arguments() {
        let opts = CliOpts::try_parse_from([
            "covtrace",
            "run",
            "--cover-children",
            "-w",
            "work",
            "app.exe",
            "--verbose",
            "input.txt",
        ])
        .unwrap();

        let CliAction::Run {
            session,
            working_dir,
            program,
            args,
        } = opts.action
        else {
            panic!("not a run command");
        };

        assert!(session.cover_children);
        assert!(!session.stop_on_assert);
        assert_eq!(working_dir.unwrap().to_str(), Some("work"));
        assert_eq!(program.to_str(), Some("app.exe"));
        assert_eq!(args, ["--verbose", "input.txt"]);
    }

    #[test]
    fn attach_by_pid_or_name() {
        let opts = CliOpts::try_parse_from(["covtrace", "attach", "--pid", "42"]).unwrap();

        let CliAction::Attach {
            target, program, ..
        } = opts.action
        else {
            panic!("not an attach command");
        };
        assert_eq!(target.into_target(), Some(AttachTarget::ProcessId(42)));
        assert_eq!(program, None);

        let opts =
            CliOpts::try_parse_from(["covtrace", "attach", "--name", "app.exe", "bin/app.exe"])
                .unwrap();

        let CliAction::Attach {
            target, program, ..
        } = opts.action
        else {
            panic!("not an attach command");
        };
        assert_eq!(
            target.into_target(),
            Some(AttachTarget::ImageName("app.exe".to_owned()))
        );
        assert_eq!(program.unwrap().to_str(), Some("bin/app.exe"));
    }

    #[test]
    fn attach_needs_exactly_one_target() {
        assert!(CliOpts::try_parse_from(["covtrace", "attach", "app.exe"]).is_err());
        assert!(
            CliOpts::try_parse_from([
                "covtrace", "attach", "--pid", "42", "--name", "app.exe", "app.exe"
            ])
            .is_err()
        );
    }
}
