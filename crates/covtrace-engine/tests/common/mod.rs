mod backend;
mod handler;

use std::cell::RefCell;
use std::rc::Rc;

pub use self::backend::{ScriptError, ScriptedBackend};
pub use self::handler::RecordingHandler;

/// Ordered record of the handler notifications, backend calls and file
/// releases of a test session.
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: String) {
        self.0.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    /// Returns the number of entries starting with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .count()
    }
}
