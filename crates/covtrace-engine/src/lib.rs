//! This crate drives a debuggee's debug-event stream on behalf of a code
//! coverage tool.
//!
//! Three components are provided:
//! - A trait to implement an OS debugging backend (spawning or attaching to
//!   a process, waiting for and continuing debug events).
//! - A trait to implement a collaborator receiving one notification per
//!   debug event, and deciding how exceptions are classified.
//! - The [Debugger](self::debugger::Debugger), which runs the event loop,
//!   tracks the live processes and threads of the debuggee, and resolves
//!   every exception into a continuation decision.
//!
//! ```no_run
//! # fn run<B: covtrace_engine::backend::DebugBackend>(backend: B) {
//! use covtrace_engine::StartInfo;
//! use covtrace_engine::backend::{DebugBackend, ExceptionRecord};
//! use covtrace_engine::debugger::Debugger;
//! use covtrace_engine::handler::{EventHandler, ExceptionCategory};
//!
//! struct BreakpointsOnly;
//!
//! impl<D: DebugBackend> EventHandler<D> for BreakpointsOnly {
//!     type Error = std::io::Error;
//!
//!     fn exception_raised(
//!         &mut self,
//!         _process: &D::Process,
//!         _thread: &D::Thread,
//!         exception: &ExceptionRecord,
//!     ) -> Result<ExceptionCategory, Self::Error> {
//!         Ok(if exception.is_breakpoint() {
//!             ExceptionCategory::Breakpoint
//!         } else {
//!             ExceptionCategory::NotHandled
//!         })
//!     }
//! }
//!
//! let mut debugger = Debugger::builder()
//!     .with_backend(backend)
//!     .cover_children(true)
//!     .build();
//!
//! let start_info = StartInfo::new("target.exe").arg("--verbose");
//! let exit_code = debugger.debug(&start_info, &mut BreakpointsOnly).unwrap();
//! # }
//! ```

/// Module containing the trait for implementing an OS debugging backend.
pub mod backend;

/// Module implementing the debug session and its event loop.
pub mod debugger;

/// Module containing the trait for handling debug events.
pub mod handler;

mod error;
mod start_info;

pub use self::error::{BackendError, Error, HandlerError, RegistryError, Result};
pub use self::start_info::{AttachTarget, StartInfo};
