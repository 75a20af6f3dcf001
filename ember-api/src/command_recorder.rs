use crate::EmberRenderCommand;

/// Ordered storage for recorded commands. Replay order is always record order.
#[derive(Default, Debug)]
pub struct EmberCommandRecorder {
    commands: Vec<EmberRenderCommand>,
}

impl EmberCommandRecorder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(
        &mut self,
        command: EmberRenderCommand,
    ) {
        self.commands.push(command);
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[EmberRenderCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
