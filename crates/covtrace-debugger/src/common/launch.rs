use covtrace_engine::StartInfo;

use crate::Error;

/// Running process, as listed by the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub process_id: u32,
    pub image_name: String,
}

/// Builds the error reported when the debuggee could not be spawned.
///
/// A missing program is reported as such, anything else is blamed on the
/// executable itself.
pub fn launch_failure(start_info: &StartInfo, reason: String) -> Error {
    if start_info.path.exists() {
        Error::InvalidExecutable {
            start_info: Box::new(start_info.clone()),
            reason,
        }
    } else {
        Error::CannotFindPath(start_info.path.clone())
    }
}

/// Returns the ID of the single running process whose image is named
/// `name` (case-insensitive, any leading directories of `name` ignored).
pub fn select_attach_target(
    candidates: impl IntoIterator<Item = ProcessEntry>,
    name: &str,
) -> crate::Result<u32> {
    let wanted = name.rsplit(['\\', '/']).next().unwrap_or(name);

    let matching: Vec<_> = candidates
        .into_iter()
        .filter(|entry| entry.image_name.eq_ignore_ascii_case(wanted))
        .collect();

    match matching.as_slice() {
        [entry] => Ok(entry.process_id),
        [] => Err(Error::AttachTargetNotFound(wanted.to_owned())),
        _ => Err(Error::AmbiguousAttachTarget {
            name: wanted.to_owned(),
            count: matching.len(),
        }),
    }
}
