#![allow(missing_docs)]
#![allow(clippy::print_stderr)]

use covtrace_cli::{CliAction, CliOpts};
use covtrace_engine::StartInfo;
use miette::miette;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = CliOpts::parse_from_cmdline();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_env_var("COVTRACE_LOG")
                .from_env_lossy(),
        )
        .init();

    let res = match cli.action {
        CliAction::Run {
            session,
            working_dir,
            program,
            args,
        } => {
            let start_info = StartInfo::new(program).args(args);
            let start_info = match working_dir {
                Some(dir) => start_info.working_dir(dir),
                None => start_info,
            };

            covtrace_cli::evaluate_run(session, start_info)
        }
        CliAction::Attach {
            session,
            target,
            program,
        } => target
            .into_target()
            .ok_or_else(|| miette!("no process to attach to"))
            .and_then(|target| {
                let start_info = StartInfo::new(program.unwrap_or_default()).attach(target);
                covtrace_cli::evaluate_run(session, start_info)
            }),
    };

    match res {
        Ok((exit_code, summary)) => {
            eprintln!("{summary}");
            std::process::exit(exit_code as i32);
        }
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}
