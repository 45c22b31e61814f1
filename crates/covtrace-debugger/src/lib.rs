//! This crate provides the default debugging backend (to be used with
//! `covtrace-engine`).
//!
//! The backend is able to spawn a process (on the **same host machine**) as
//! a debuggee, or to attach to a running one, and reports its debug events
//! through the Win32 debug API.
//!
//! <div class="warning">
//!
//! *This crate is not meant to be used on its own! It merely implements the
//! interface (traits) provided by `covtrace-engine`, so that the backend can
//! be used by that crate for driving debug sessions.*
//!
//! </div>
//!
//! # Supported Platforms
//!
//! <table>
//!     <thead>
//!         <tr>
//!             <th>Host Machine</th>
//!             <th>Debuggee Platform</th>
//!         </tr>
//!     </thead>
//!     <tbody>
//!         <tr>
//!             <td rowspan="2">Windows <code>x86_64</code></td>
//!             <td><code>x86_64</code></td>
//!         </tr>
//!         <tr>
//!             <td><code>i386</code> (WOW64)</td>
//!         </tr>
//!     </tbody>
//! </table>
//!
//! On other hosts, [NativeBackend] builds but fails to start any debuggee.

mod common;
mod error;
mod sys;

pub use self::error::{Error, Result};
pub use self::sys::{Handle, NativeBackend};
