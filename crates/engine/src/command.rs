//! Console command grammar.
//!
//! A line is a command token followed by a remainder. Tokens match either
//! the canonical name or the short alias, ignoring ASCII case. Each command
//! parses its own remainder.

use std::fmt;

use luadbg_core::ResumeCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Step,
    Over,
    Finish,
    Run,
    ListLocals,
    ListUpVars,
    PrintStack,
    Watch,
    Exec,
    SetBreakPoint,
    DelBreakPoint,
    ListBreakPoints,
    Help,
}

const COMMANDS: &[(CommandKind, &str, &str)] = &[
    (CommandKind::Step, "step", "s"),
    (CommandKind::Over, "over", "o"),
    (CommandKind::Finish, "finish", "f"),
    (CommandKind::Run, "run", "r"),
    (CommandKind::ListLocals, "listLocals", "ll"),
    (CommandKind::ListUpVars, "listUpVars", "lu"),
    (CommandKind::PrintStack, "printStack", "ps"),
    (CommandKind::Watch, "watch", "w"),
    (CommandKind::Exec, "exec", "e"),
    (CommandKind::SetBreakPoint, "setBreakPoint", "sb"),
    (CommandKind::DelBreakPoint, "delBreakPoint", "db"),
    (CommandKind::ListBreakPoints, "listBreakPoints", "lb"),
    (CommandKind::Help, "help", "h"),
];

impl CommandKind {
    pub fn lookup(token: &str) -> Option<Self> {
        COMMANDS
            .iter()
            .find(|(_, name, alias)| {
                token.eq_ignore_ascii_case(name) || token.eq_ignore_ascii_case(alias)
            })
            .map(|(kind, _, _)| *kind)
    }

    pub fn name(self) -> &'static str {
        COMMANDS
            .iter()
            .find(|(kind, _, _)| *kind == self)
            .map(|(_, name, _)| *name)
            .unwrap_or("?")
    }
}

pub const HELP: &str = "\
Commands (name, alias, arguments):
  step, s                          Step into the next line.
  over, o                          Step to the next line of this function.
  finish, f                        Run until this function returns.
  run, r                           Run until a breakpoint is hit.
  setBreakPoint, sb <file> <line>  Set a breakpoint. '.' is the current file.
  delBreakPoint, db <file> <line>  Delete a breakpoint.
  listBreakPoints, lb              List breakpoints.
  watch, w <name> [depth]          Show a variable, expanding tables [depth] levels.
  listLocals, ll [level]           List local variables at a stack level (default 1).
  listUpVars, lu [level]           List up-variables at a stack level (default 1).
  printStack, ps                   Print the call stack.
  exec, e <chunk>                  Run a chunk of Lua in the global environment.
  help, h                          Show this help.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Resume(ResumeCommand),
    ListLocals { level: usize },
    ListUpVars { level: usize },
    PrintStack,
    Watch { name: String, depth: Option<u32> },
    Exec { chunk: String },
    SetBreakPoint { file: String, line: u32 },
    DelBreakPoint { file: String, line: u32 },
    ListBreakPoints,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    InvalidArgument(CommandKind),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => f.write_str("Invalid command!"),
            CommandError::Unknown(_) => {
                f.write_str("Invalid command! Type 'help' or 'h' for help.")
            }
            CommandError::InvalidArgument(_) => f.write_str("Invalid argument!"),
        }
    }
}

impl std::error::Error for CommandError {}

/// Split a console line into its command token and the remainder.
///
/// The remainder keeps its inner whitespace; only the separator after the
/// token and the line terminator are dropped.
pub fn split_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_end_matches(['\r', '\n']).trim_start();
    if line.is_empty() {
        return None;
    }
    match line.find(char::is_whitespace) {
        Some(end) => Some((&line[..end], line[end..].trim_start())),
        None => Some((line, "")),
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let (token, rest) = split_line(line).ok_or(CommandError::Empty)?;
        let kind =
            CommandKind::lookup(token).ok_or_else(|| CommandError::Unknown(token.to_string()))?;
        let invalid = || CommandError::InvalidArgument(kind);
        let mut args = rest.split_whitespace();

        let command = match kind {
            CommandKind::Step => Command::Resume(ResumeCommand::Step),
            CommandKind::Over => Command::Resume(ResumeCommand::Over),
            CommandKind::Finish => Command::Resume(ResumeCommand::Finish),
            CommandKind::Run => Command::Resume(ResumeCommand::Run),
            CommandKind::ListLocals => Command::ListLocals {
                level: parse_level(args.next()).ok_or_else(invalid)?,
            },
            CommandKind::ListUpVars => Command::ListUpVars {
                level: parse_level(args.next()).ok_or_else(invalid)?,
            },
            CommandKind::PrintStack => Command::PrintStack,
            CommandKind::Watch => {
                let name = args.next().ok_or_else(invalid)?.to_string();
                let depth = match args.next() {
                    Some(text) => Some(parse_depth(text).ok_or_else(invalid)?),
                    None => None,
                };
                Command::Watch { name, depth }
            }
            CommandKind::Exec => {
                if rest.is_empty() {
                    return Err(invalid());
                }
                Command::Exec {
                    chunk: rest.to_string(),
                }
            }
            CommandKind::SetBreakPoint | CommandKind::DelBreakPoint => {
                let file = args.next().ok_or_else(invalid)?.to_string();
                let line = args.next().and_then(parse_line_number).ok_or_else(invalid)?;
                if kind == CommandKind::SetBreakPoint {
                    Command::SetBreakPoint { file, line }
                } else {
                    Command::DelBreakPoint { file, line }
                }
            }
            CommandKind::ListBreakPoints => Command::ListBreakPoints,
            CommandKind::Help => Command::Help,
        };
        Ok(command)
    }

    /// The resume command, if this command leaves the prompt.
    pub fn resume(&self) -> Option<ResumeCommand> {
        match self {
            Command::Resume(command) => Some(*command),
            _ => None,
        }
    }
}

// Missing level means 1; anything below 1 clamps to 1.
fn parse_level(arg: Option<&str>) -> Option<usize> {
    match arg {
        None => Some(1),
        Some(text) => {
            let level: i64 = text.parse().ok()?;
            Some(level.clamp(1, u32::MAX as i64) as usize)
        }
    }
}

fn parse_depth(text: &str) -> Option<u32> {
    let depth: i64 = text.parse().ok()?;
    Some(depth.clamp(0, u32::MAX as i64) as u32)
}

fn parse_line_number(text: &str) -> Option<u32> {
    let line: i64 = text.parse().ok()?;
    if line < 1 {
        return None;
    }
    u32::try_from(line).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_commands_and_aliases() {
        for (line, expected) in [
            ("step", ResumeCommand::Step),
            ("s", ResumeCommand::Step),
            ("o", ResumeCommand::Over),
            ("FINISH", ResumeCommand::Finish),
            ("  r  \n", ResumeCommand::Run),
        ] {
            assert_eq!(Command::parse(line).unwrap().resume(), Some(expected), "{line:?}");
        }
    }

    #[test]
    fn test_case_insensitive_names() {
        assert_eq!(Command::parse("LISTLOCALS").unwrap(), Command::ListLocals { level: 1 });
        assert_eq!(Command::parse("Ps").unwrap(), Command::PrintStack);
        assert_eq!(Command::parse("lb").unwrap(), Command::ListBreakPoints);
    }

    #[test]
    fn test_empty_and_unknown() {
        assert_eq!(Command::parse(""), Err(CommandError::Empty));
        assert_eq!(Command::parse("   \r\n"), Err(CommandError::Empty));
        assert_eq!(
            Command::parse("jump 3"),
            Err(CommandError::Unknown("jump".to_string()))
        );
        assert_eq!(CommandError::Empty.to_string(), "Invalid command!");
        assert_eq!(
            CommandError::Unknown("x".into()).to_string(),
            "Invalid command! Type 'help' or 'h' for help."
        );
    }

    #[test]
    fn test_levels_clamp() {
        assert_eq!(Command::parse("ll 3").unwrap(), Command::ListLocals { level: 3 });
        assert_eq!(Command::parse("ll 0").unwrap(), Command::ListLocals { level: 1 });
        assert_eq!(Command::parse("lu -4").unwrap(), Command::ListUpVars { level: 1 });
        assert_eq!(
            Command::parse("ll two"),
            Err(CommandError::InvalidArgument(CommandKind::ListLocals))
        );
    }

    #[test]
    fn test_watch_arguments() {
        assert_eq!(
            Command::parse("w config").unwrap(),
            Command::Watch { name: "config".into(), depth: None }
        );
        assert_eq!(
            Command::parse("watch config 2").unwrap(),
            Command::Watch { name: "config".into(), depth: Some(2) }
        );
        assert_eq!(
            Command::parse("w config -3").unwrap(),
            Command::Watch { name: "config".into(), depth: Some(0) }
        );
        assert!(Command::parse("w").is_err());
        assert!(Command::parse("w config deep").is_err());
    }

    #[test]
    fn test_exec_keeps_remainder_verbatim() {
        assert_eq!(
            Command::parse("e print( 'a  b' )\n").unwrap(),
            Command::Exec { chunk: "print( 'a  b' )".into() }
        );
        assert_eq!(
            Command::parse("exec"),
            Err(CommandError::InvalidArgument(CommandKind::Exec))
        );
    }

    #[test]
    fn test_breakpoint_arguments() {
        assert_eq!(
            Command::parse("sb main.lua 10").unwrap(),
            Command::SetBreakPoint { file: "main.lua".into(), line: 10 }
        );
        assert_eq!(
            Command::parse("db . 4").unwrap(),
            Command::DelBreakPoint { file: ".".into(), line: 4 }
        );
        for bad in ["sb", "sb main.lua", "sb main.lua 0", "sb main.lua -2", "db main.lua x"] {
            assert!(
                matches!(Command::parse(bad), Err(CommandError::InvalidArgument(_))),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_split_line() {
        assert_eq!(split_line("w  x 2\r\n"), Some(("w", "x 2")));
        assert_eq!(split_line("help"), Some(("help", "")));
        assert_eq!(split_line("\n"), None);
    }

    #[test]
    fn test_help_lists_every_command() {
        for (_, name, alias) in COMMANDS {
            assert!(HELP.contains(&format!("{}, {}", name, alias)), "{name}");
        }
        assert_eq!(CommandKind::Watch.name(), "watch");
    }
}
