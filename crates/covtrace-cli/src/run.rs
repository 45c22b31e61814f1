use std::ffi::OsStr;
use std::path::Path;

use covtrace_debugger::NativeBackend;
use covtrace_engine::StartInfo;
use covtrace_engine::debugger::Debugger;
use miette::IntoDiagnostic;

use crate::{CliSessionArgs, DebugConfig, ReportingHandler, SessionSummary};

/// Runs the subcommands debugging a program (spawned or attached to).
///
/// On success, the exit code of the program is returned with the counters
/// of the session.
pub fn evaluate_run(
    session: CliSessionArgs,
    start_info: StartInfo,
) -> miette::Result<(u32, SessionSummary)> {
    let config = parse_run_config(session.config.as_deref())?.with_cli_flags(&session);

    tracing::debug!(?config, "configuration");

    let mut debugger = Debugger::builder()
        .with_backend(NativeBackend::new())
        .cover_children(config.cover_children)
        .continue_after_cpp_exception(config.continue_after_cpp_exception)
        .stop_on_assert(config.stop_on_assert)
        .wait_timeout(config.wait_timeout())
        .build();

    tracing::info!("Start debugging:\n{start_info}");

    let mut handler = ReportingHandler::default();

    let exit_code = debugger
        .debug(&start_info, &mut handler)
        .into_diagnostic()?;

    Ok((exit_code, handler.summary().clone()))
}

fn parse_run_config(config: Option<&str>) -> miette::Result<DebugConfig> {
    let Some(config) = config else {
        return Ok(knus::parse("<default>", "")?);
    };

    let path = Path::new(config);

    let config = if let Some((filename, "kdl")) = path
        .file_name()
        .and_then(OsStr::to_str)
        .zip(path.extension().and_then(OsStr::to_str))
    {
        let content = std::fs::read_to_string(path).into_diagnostic()?;
        knus::parse(filename, &content)?
    } else {
        knus::parse("<content>", config)?
    };

    Ok(config)
}
