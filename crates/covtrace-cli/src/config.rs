use std::time::Duration;

use crate::CliSessionArgs;

/// Configuration of a debug session.
#[derive(Debug, PartialEq, knus::Decode)]
pub struct DebugConfig {
    /// Whether the processes spawned by the program are debugged as well.
    #[knus(child, default, unwrap(argument))]
    pub cover_children: bool,

    /// Whether the program keeps running after an unhandled C++ exception.
    #[knus(child, default, unwrap(argument))]
    pub continue_after_cpp_exception: bool,

    /// Whether assertion failures stop the program.
    #[knus(child, default, unwrap(argument))]
    pub stop_on_assert: bool,

    /// Maximum time (in milliseconds) to wait for a debug event before
    /// checking whether the program is still alive.
    #[knus(child, default = 1000, unwrap(argument))]
    pub wait_timeout_ms: u64,
}

impl DebugConfig {
    /// Enables the options set from the command-line.
    pub const fn with_cli_flags(mut self, args: &CliSessionArgs) -> Self {
        self.cover_children |= args.cover_children;
        self.continue_after_cpp_exception |= args.continue_after_cpp_exception;
        self.stop_on_assert |= args.stop_on_assert;
        self
    }

    /// Returns the event wait timeout.
    pub const fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }
}
