use std::collections::VecDeque;
use std::convert::Infallible;

use covtrace_engine::backend::ExceptionRecord;
use covtrace_engine::handler::{EventHandler, ExceptionCategory};

use super::Journal;
use super::backend::{MockHandle, ScriptedBackend};

/// Event handler writing every notification to the journal.
pub struct RecordingHandler {
    journal: Journal,
    categories: VecDeque<ExceptionCategory>,
}

impl RecordingHandler {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            categories: VecDeque::new(),
        }
    }

    /// Categories returned for the next exceptions, in order
    /// (`Breakpoint` once exhausted).
    pub fn categories(mut self, categories: &[ExceptionCategory]) -> Self {
        self.categories.extend(categories);
        self
    }
}

fn file_name(file: Option<&MockHandle>) -> &str {
    file.map_or("-", |file| file.name.as_str())
}

impl EventHandler<ScriptedBackend> for RecordingHandler {
    type Error = Infallible;

    fn process_created(
        &mut self,
        process_id: u32,
        process: &MockHandle,
        thread: &MockHandle,
        file: Option<&MockHandle>,
        _image_base: u64,
    ) -> Result<(), Self::Error> {
        assert_eq!(process.name, format!("process:{process_id}"));

        self.journal.push(format!(
            "process_created {process_id} {} {}",
            thread.name,
            file_name(file)
        ));
        Ok(())
    }

    fn thread_created(
        &mut self,
        process_id: u32,
        thread_id: u32,
        thread: &MockHandle,
    ) -> Result<(), Self::Error> {
        assert_eq!(thread.name, format!("thread:{thread_id}"));

        self.journal
            .push(format!("thread_created {process_id}/{thread_id}"));
        Ok(())
    }

    fn thread_exited(
        &mut self,
        process_id: u32,
        thread_id: u32,
        exit_code: u32,
    ) -> Result<(), Self::Error> {
        self.journal
            .push(format!("thread_exited {process_id}/{thread_id} {exit_code}"));
        Ok(())
    }

    fn process_exited(
        &mut self,
        process_id: u32,
        _process: &MockHandle,
        thread: &MockHandle,
        exit_code: u32,
    ) -> Result<(), Self::Error> {
        self.journal.push(format!(
            "process_exited {process_id} {} {exit_code}",
            thread.name
        ));
        Ok(())
    }

    fn dll_loaded(
        &mut self,
        process: &MockHandle,
        _thread: &MockHandle,
        file: Option<&MockHandle>,
        base_addr: u64,
    ) -> Result<(), Self::Error> {
        self.journal.push(format!(
            "dll_loaded {} {base_addr:#x} {}",
            process.name,
            file_name(file)
        ));
        Ok(())
    }

    fn dll_unloaded(
        &mut self,
        process: &MockHandle,
        _thread: &MockHandle,
        base_addr: u64,
    ) -> Result<(), Self::Error> {
        self.journal
            .push(format!("dll_unloaded {} {base_addr:#x}", process.name));
        Ok(())
    }

    fn exception_raised(
        &mut self,
        _process: &MockHandle,
        thread: &MockHandle,
        exception: &ExceptionRecord,
    ) -> Result<ExceptionCategory, Self::Error> {
        let category = self
            .categories
            .pop_front()
            .unwrap_or(ExceptionCategory::Breakpoint);

        self.journal.push(format!(
            "exception {} {:#x} {category:?}",
            thread.name, exception.code
        ));

        Ok(category)
    }
}
