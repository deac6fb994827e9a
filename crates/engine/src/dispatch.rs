//! Hook dispatch: decide on every runtime event whether to suspend.

use luadbg_core::ResumeCommand;

use crate::debugger::Debugger;
use crate::host::{DebugHost, HookEvent};

impl Debugger {
    /// Handle one hook event. May block in the prompt.
    ///
    /// Panics if the host stack depth differs before and after the event;
    /// the hook must leave the runtime stack untouched.
    pub fn dispatch<H: DebugHost>(&mut self, host: &H, event: HookEvent) {
        let depth = host.stack_depth();

        match event {
            HookEvent::Line { line, source } => self.on_line(host, line, source.as_deref()),
            HookEvent::Call => self.state.enter(),
            HookEvent::TailCall => {}
            HookEvent::Return => {
                let left_paused_frame = self.state.leave();
                if left_paused_frame && self.state.command == ResumeCommand::Finish {
                    log::trace!("paused frame returned, stepping in caller");
                    self.state.command = ResumeCommand::Step;
                }
            }
        }

        assert_eq!(
            depth,
            host.stack_depth(),
            "runtime stack depth changed while handling a hook event"
        );
    }

    fn on_line<H: DebugHost>(&mut self, host: &H, line: u32, source: Option<&str>) {
        match self.state.command {
            ResumeCommand::Step => self.suspend(host),
            ResumeCommand::Over if self.state.stack_level() == 0 => self.suspend(host),
            ResumeCommand::Over | ResumeCommand::Run => {
                if self.breakpoint_hit(source, line) {
                    log::debug!("breakpoint hit at {}:{}", source.unwrap_or("?"), line);
                    self.suspend(host);
                }
            }
            ResumeCommand::Finish => {}
        }
    }

    /// Whether (source, line) is a breakpoint. Sources resolve once.
    pub(crate) fn breakpoint_hit(&mut self, source: Option<&str>, line: u32) -> bool {
        if self.breakpoints.is_empty() {
            return false;
        }
        let Some(source) = source else {
            return false;
        };

        if !self.resolved_sources.contains_key(source) {
            let resolved = source
                .strip_prefix('@')
                .and_then(|path| self.breakpoints.canonicalize(path).ok());
            log::trace!("source {} resolved to {:?}", source, resolved);
            self.resolved_sources.insert(source.to_string(), resolved);
        }

        match self.resolved_sources.get(source) {
            Some(Some(path)) => self.breakpoints.contains(path, line),
            _ => false,
        }
    }

    fn suspend<H: DebugHost>(&mut self, host: &H) {
        self.state.reset_level();
        let command = match self.prompt(host) {
            Ok(command) => command,
            Err(e) => {
                log::warn!("console error ({}), resuming with run", e);
                ResumeCommand::Run
            }
        };
        log::debug!("resuming with {}", command);
        self.state.command = command;
    }
}
