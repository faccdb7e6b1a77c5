use crate::error::Result;
use crate::workbench::{Command, Workbench};
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct RecordingWorkbench {
    commands: Mutex<Vec<Command>>,
    reveals: Mutex<usize>,
}

impl RecordingWorkbench {
    pub(crate) fn commands(&self) -> Vec<Command> {
        self.commands.lock().unwrap().clone()
    }

    pub(crate) fn reveals(&self) -> usize {
        *self.reveals.lock().unwrap()
    }
}

impl Workbench for RecordingWorkbench {
    fn execute(&self, command: Command) -> Result<()> {
        self.commands.lock().unwrap().push(command);
        Ok(())
    }

    fn reveal_viewer(&self) -> Result<()> {
        *self.reveals.lock().unwrap() += 1;
        Ok(())
    }
}
