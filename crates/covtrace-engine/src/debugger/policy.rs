use crate::backend::ContinueStatus;
use crate::handler::ExceptionCategory;

/// Exit code reported when an assertion-style breakpoint is masked
/// (`EXCEPTION_BREAKPOINT`).
pub const BREAKPOINT_EXIT_CODE: u32 = 0x8000_0003;

/// Result of handling a single debug event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Exit code of the event's process, if the event determines it.
    pub exit_code: Option<u32>,

    /// How to resume the debuggee (`Continue` if unset).
    pub continue_status: Option<ContinueStatus>,
}

impl ProcessOutcome {
    pub(crate) const fn exited(exit_code: u32) -> Self {
        Self {
            exit_code: Some(exit_code),
            continue_status: None,
        }
    }

    const fn resume(exit_code: Option<u32>, status: ContinueStatus) -> Self {
        Self {
            exit_code,
            continue_status: Some(status),
        }
    }
}

/// Continuation policy applied to exceptions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExceptionPolicy {
    /// Keep running after a native exception, instead of letting it
    /// propagate.
    pub continue_after_cpp_exception: bool,

    /// Let assertion-style breakpoints propagate, instead of masking them.
    pub stop_on_assert: bool,
}

impl ExceptionPolicy {
    /// Maps an exception category to the outcome of the exception event.
    ///
    /// `exception_code` is the raw code of the exception record.
    pub fn outcome(&self, category: ExceptionCategory, exception_code: u32) -> ProcessOutcome {
        match category {
            ExceptionCategory::Breakpoint => ProcessOutcome::resume(None, ContinueStatus::Continue),
            ExceptionCategory::InvalidBreakpoint => {
                tracing::warn!(
                    "It seems there is an assertion failure or you call DebugBreak() in your program"
                );

                if self.stop_on_assert {
                    tracing::warn!("Stop on assertion");
                    ProcessOutcome::resume(None, ContinueStatus::ExceptionNotHandled)
                } else {
                    ProcessOutcome::resume(Some(BREAKPOINT_EXIT_CODE), ContinueStatus::Continue)
                }
            }
            ExceptionCategory::NotHandled | ExceptionCategory::Error => {
                ProcessOutcome::resume(None, ContinueStatus::ExceptionNotHandled)
            }
            ExceptionCategory::CppError if self.continue_after_cpp_exception => {
                tracing::warn!(
                    code = format_args!("{exception_code:#x}"),
                    "Continue after a C++ exception"
                );
                ProcessOutcome::resume(Some(exception_code), ContinueStatus::Continue)
            }
            ExceptionCategory::CppError => {
                ProcessOutcome::resume(None, ContinueStatus::ExceptionNotHandled)
            }
        }
    }
}
