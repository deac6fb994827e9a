//! Interactive prompt entered when execution suspends.

use std::borrow::Cow;
use std::io;

use luadbg_core::{BreakpointError, ResumeCommand};

use crate::command::{Command, HELP};
use crate::debugger::Debugger;
use crate::host::DebugHost;
use crate::inspect;

impl Debugger {
    /// Block on the console until a resume command arrives.
    pub(crate) fn prompt<H: DebugHost>(&mut self, host: &H) -> io::Result<ResumeCommand> {
        self.console.begin()?;
        let result = self.prompt_loop(host);
        let ended = self.console.end();
        let command = result?;
        ended?;
        Ok(command)
    }

    fn prompt_loop<H: DebugHost>(&mut self, host: &H) -> io::Result<ResumeCommand> {
        inspect::print_location(host, self.console.out())?;

        loop {
            write!(self.console.out(), "{}", self.options.prompt)?;
            self.console.out().flush()?;

            let Some(line) = self.console.read_line()? else {
                writeln!(self.console.out())?;
                log::warn!("end of console input, resuming with run");
                return Ok(ResumeCommand::Run);
            };

            match Command::parse(&line) {
                Ok(command) => {
                    if let Some(resume) = command.resume() {
                        return Ok(resume);
                    }
                    self.execute(host, command)?;
                }
                Err(e) => writeln!(self.console.out(), "{}", e)?,
            }
        }
    }

    fn execute<H: DebugHost>(&mut self, host: &H, command: Command) -> io::Result<()> {
        match command {
            Command::Resume(_) => Ok(()),
            Command::ListLocals { level } => inspect::list_locals(host, self.console.out(), level),
            Command::ListUpVars { level } => {
                inspect::list_upvalues(host, self.console.out(), level)
            }
            Command::PrintStack => inspect::print_stack(host, self.console.out()),
            Command::Watch { name, depth } => {
                let depth = depth.unwrap_or(self.options.watch_depth);
                inspect::watch(host, self.console.out(), &name, depth)
            }
            Command::Exec { chunk } => match host.exec(&chunk) {
                Ok(()) => Ok(()),
                Err(e) => writeln!(self.console.out(), "{}", e),
            },
            Command::SetBreakPoint { file, line } => {
                self.change_breakpoint(host, &file, line, true)
            }
            Command::DelBreakPoint { file, line } => {
                self.change_breakpoint(host, &file, line, false)
            }
            Command::ListBreakPoints => {
                let out = self.console.out();
                writeln!(out, "Break Points:>>>>>>>>")?;
                for (path, lines) in self.breakpoints.list() {
                    for line in lines {
                        writeln!(out, "File {} Line {}", path, line)?;
                    }
                }
                writeln!(out, "<<<<<<<<")
            }
            Command::Help => writeln!(self.console.out(), "{}", HELP),
        }
    }

    fn change_breakpoint<H: DebugHost>(
        &mut self,
        host: &H,
        file: &str,
        line: u32,
        set: bool,
    ) -> io::Result<()> {
        let Some(path) = breakpoint_file(host, file) else {
            return writeln!(self.console.out(), "Invalid path!");
        };
        let result = if set {
            self.breakpoints.add(path.as_ref(), line)
        } else {
            self.breakpoints.remove(path.as_ref(), line)
        };
        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                log::debug!("breakpoint command rejected: {}", e);
                writeln!(self.console.out(), "{}", message(&e))
            }
        }
    }
}

/// Expand a user-typed file argument. `.` is the file of the frame the user
/// is paused in; chunks not loaded from files have none.
fn breakpoint_file<'a, H: DebugHost>(host: &H, file: &'a str) -> Option<Cow<'a, str>> {
    if file == "." {
        let frame = host.frame(1).ok().flatten()?;
        return frame.file_path().map(|path| Cow::Owned(path.to_string()));
    }
    Some(shellexpand::tilde(file))
}

fn message(error: &BreakpointError) -> &'static str {
    match error {
        BreakpointError::InvalidLine(_) => "Invalid argument!",
        BreakpointError::InvalidPath { .. } => "Invalid path!",
    }
}
