use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::RegistryError;

/// Handles of the processes and threads currently under debug.
pub struct HandleRegistry<P, T> {
    processes: HashMap<u32, P>,
    threads: HashMap<u32, T>,
}

impl<P, T> HandleRegistry<P, T> {
    pub fn new() -> Self {
        Self {
            processes: HashMap::new(),
            threads: HashMap::new(),
        }
    }

    pub fn register_process(&mut self, process_id: u32, process: P) -> Result<(), RegistryError> {
        match self.processes.entry(process_id) {
            Entry::Occupied(_) => Err(RegistryError::ProcessAlreadyRegistered(process_id)),
            Entry::Vacant(e) => {
                e.insert(process);
                Ok(())
            }
        }
    }

    pub fn register_thread(&mut self, thread_id: u32, thread: T) -> Result<(), RegistryError> {
        match self.threads.entry(thread_id) {
            Entry::Occupied(_) => Err(RegistryError::ThreadAlreadyRegistered(thread_id)),
            Entry::Vacant(e) => {
                e.insert(thread);
                Ok(())
            }
        }
    }

    /// Replaces the handle of a registered process, returning the previous
    /// one.
    pub fn replace_process(&mut self, process_id: u32, process: P) -> Result<P, RegistryError> {
        self.processes
            .get_mut(&process_id)
            .map(|slot| std::mem::replace(slot, process))
            .ok_or(RegistryError::UnknownProcess(process_id))
    }

    /// Replaces the handle of a registered thread, returning the previous
    /// one.
    pub fn replace_thread(&mut self, thread_id: u32, thread: T) -> Result<T, RegistryError> {
        self.threads
            .get_mut(&thread_id)
            .map(|slot| std::mem::replace(slot, thread))
            .ok_or(RegistryError::UnknownThread(thread_id))
    }

    pub fn unregister_process(&mut self, process_id: u32) -> Result<P, RegistryError> {
        self.processes
            .remove(&process_id)
            .ok_or(RegistryError::UnknownProcess(process_id))
    }

    pub fn unregister_thread(&mut self, thread_id: u32) -> Result<T, RegistryError> {
        self.threads
            .remove(&thread_id)
            .ok_or(RegistryError::UnknownThread(thread_id))
    }

    pub fn process(&self, process_id: u32) -> Result<&P, RegistryError> {
        self.processes
            .get(&process_id)
            .ok_or(RegistryError::UnknownProcess(process_id))
    }

    pub fn thread(&self, thread_id: u32) -> Result<&T, RegistryError> {
        self.threads
            .get(&thread_id)
            .ok_or(RegistryError::UnknownThread(thread_id))
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    /// Returns whether no process is under debug anymore.
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}
