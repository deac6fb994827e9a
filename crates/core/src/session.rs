//! Session state shared between hook invocations.
//!
//! The stack level is derived purely from call/return event counts. The
//! host must deliver those events in order and without drops while the hook
//! is armed; there is no real stack snapshot to resynchronise against.

use std::fmt;

/// How execution continues after the prompt returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResumeCommand {
    /// Suspend on the very next line event, at any depth.
    #[default]
    Step,
    /// Suspend on the next line event at the paused frame's depth.
    Over,
    /// Suspend once the paused frame has returned.
    Finish,
    /// Suspend only on breakpoints.
    Run,
}

impl ResumeCommand {
    pub fn name(self) -> &'static str {
        match self {
            ResumeCommand::Step => "step",
            ResumeCommand::Over => "over",
            ResumeCommand::Finish => "finish",
            ResumeCommand::Run => "run",
        }
    }
}

impl fmt::Display for ResumeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One per debug session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    pub command: ResumeCommand,
    stack_level: u32,
}

impl SessionState {
    pub fn new(command: ResumeCommand) -> Self {
        Self { command, stack_level: 0 }
    }

    /// Call depth relative to the frame where the user last paused.
    pub fn stack_level(&self) -> u32 {
        self.stack_level
    }

    /// Call-entry event.
    pub fn enter(&mut self) {
        self.stack_level = self.stack_level.saturating_add(1);
    }

    /// Return event (ordinary or tail). Never goes below zero.
    ///
    /// Returns true when the event left a frame at level zero, i.e. the
    /// frame the user paused in (or one of its callers) returned.
    pub fn leave(&mut self) -> bool {
        if self.stack_level == 0 {
            true
        } else {
            self.stack_level -= 1;
            false
        }
    }

    /// Re-anchor depth tracking at the frame about to be shown to the user.
    pub fn reset_level(&mut self) {
        self.stack_level = 0;
    }
}
