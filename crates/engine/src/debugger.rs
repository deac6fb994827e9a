//! Per-session debugger state.

use std::collections::HashMap;

use luadbg_core::{BreakpointRegistry, CanonicalPath, PathPolicy, ResumeCommand, SessionState};

use crate::console::Console;

#[derive(Debug, Clone)]
pub struct DebuggerOptions {
    pub prompt: String,
    /// Expansion depth for `watch` without an explicit depth.
    pub watch_depth: u32,
    pub initial_command: ResumeCommand,
    pub path_policy: PathPolicy,
}

impl Default for DebuggerOptions {
    fn default() -> Self {
        Self {
            prompt: "?>".to_string(),
            watch_depth: 0,
            initial_command: ResumeCommand::Step,
            path_policy: PathPolicy::native(),
        }
    }
}

/// One debug session: command state, breakpoints and the console.
///
/// Driven by [`Debugger::dispatch`] from the runtime hook.
pub struct Debugger {
    pub(crate) state: SessionState,
    pub(crate) breakpoints: BreakpointRegistry,
    /// Chunk name -> canonical path, `None` when it names no file.
    pub(crate) resolved_sources: HashMap<String, Option<CanonicalPath>>,
    pub(crate) options: DebuggerOptions,
    pub(crate) console: Console,
}

impl Debugger {
    pub fn new(options: DebuggerOptions, console: Console) -> Self {
        Self {
            state: SessionState::new(options.initial_command),
            breakpoints: BreakpointRegistry::new(options.path_policy),
            resolved_sources: HashMap::new(),
            options,
            console,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn command(&self) -> ResumeCommand {
        self.state.command
    }

    pub fn set_command(&mut self, command: ResumeCommand) {
        self.state.command = command;
    }

    pub fn options(&self) -> &DebuggerOptions {
        &self.options
    }

    pub fn breakpoints(&self) -> &BreakpointRegistry {
        &self.breakpoints
    }

    pub fn breakpoints_mut(&mut self) -> &mut BreakpointRegistry {
        &mut self.breakpoints
    }

    /// Whether the runtime hook has anything to do.
    ///
    /// Only RUN with no breakpoints can never suspend.
    pub fn hook_wanted(&self) -> bool {
        !(self.state.command == ResumeCommand::Run && self.breakpoints.is_empty())
    }
}
