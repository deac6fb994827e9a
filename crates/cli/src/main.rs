// luadbg - interactive line debugger for Lua scripts
//
// Loads a script into a fresh Lua state, attaches the debugger and runs it.
// The session pauses on the first line unless --run is given.

mod decor;
mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use mlua::{Lua, LuaOptions, StdLib, Variadic};

use luadbg_config::{Settings, SettingsError};
use luadbg_core::{PathPolicy, ResumeCommand};
use luadbg_engine::lua::{self as attachment, format_lua_error};
use luadbg_engine::{Console, Debugger, DebuggerOptions};

use exit_codes::{EXIT_CONFIG, EXIT_IO, EXIT_SCRIPT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "luadbg")]
#[command(about = "Interactive line debugger for Lua scripts")]
#[command(long_version = long_version())]
#[command(version)]
#[command(after_help = "\
Examples:
  luadbg game.lua                      pause on the first line
  luadbg --run -b game.lua:42 game.lua run until line 42
  luadbg tool.lua -- --flag value      pass arguments to the script

Type 'help' at the ?> prompt for debugger commands.")]
struct Cli {
    /// Lua script to debug
    script: PathBuf,

    /// Arguments passed to the script (available as `arg` and `...`)
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,

    /// Set a breakpoint before the script starts (repeatable)
    #[arg(long = "break", short = 'b', value_name = "FILE:LINE")]
    breakpoints: Vec<String>,

    /// Run until a breakpoint instead of pausing on the first line
    #[arg(long)]
    run: bool,

    /// Do not colour the prompt
    #[arg(long)]
    no_color: bool,

    /// Settings file (default: <config dir>/luadbg/settings.json)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// More log output on stderr (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nlua:     5.4 (vendored)",
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = load_settings(cli.config.as_deref())?;
    init_logging(&settings, cli.verbose);

    let source = std::fs::read_to_string(&cli.script).map_err(|e| {
        CliError::io(format!("cannot read {}: {}", cli.script.display(), e))
    })?;

    let breakpoints = cli
        .breakpoints
        .iter()
        .map(|spec| parse_breakpoint(spec))
        .collect::<Result<Vec<_>, _>>()?;

    let options = DebuggerOptions {
        prompt: settings.prompt_text.clone(),
        watch_depth: settings.watch_default_depth,
        initial_command: if cli.run {
            ResumeCommand::Run
        } else {
            ResumeCommand::Step
        },
        path_policy: PathPolicy {
            case_insensitive: settings.case_insensitive_paths(),
        },
    };

    let mut console = Console::stdio();
    if settings.prompt_color && !cli.no_color && atty::is(atty::Stream::Stdout) {
        console = console.with_decor(Box::new(decor::ColorDecor));
    }

    let mut debugger = Debugger::new(options, console);
    for (file, line) in &breakpoints {
        debugger.breakpoints_mut().add(file, *line).map_err(|e| {
            CliError::args(e.to_string()).with_hint("breakpoint files must exist")
        })?;
    }

    // SAFETY: the debug library is required for frame introspection. The
    // script is trusted user code, exactly as under the stock interpreter.
    let lua = unsafe { Lua::unsafe_new_with(StdLib::ALL_SAFE | StdLib::DEBUG, LuaOptions::new()) };
    set_script_args(&lua, &cli.script, &cli.args).map_err(CliError::script)?;

    attachment::attach(&lua, debugger).map_err(CliError::script)?;
    log::info!("debugging {}", cli.script.display());

    let result = lua
        .load(source.as_str())
        .set_name(format!("@{}", cli.script.display()))
        .call::<()>(Variadic::from_iter(cli.args.iter().cloned()));
    attachment::detach(&lua);

    result.map_err(CliError::script)
}

fn load_settings(path: Option<&Path>) -> Result<Settings, CliError> {
    let loaded = match path {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    loaded.map_err(|e: SettingsError| {
        CliError::config(e.to_string()).with_hint("fix or remove the settings file")
    })
}

fn init_logging(settings: &Settings, verbose: u8) {
    let level = settings.log_level.raised(verbose).filter();
    if let Err(e) = simple_logger::SimpleLogger::new()
        .with_level(level)
        .without_timestamps()
        .init()
    {
        eprintln!("warning: logging disabled: {}", e);
    }
}

/// `FILE:LINE`, split at the last colon so Windows drive letters survive.
fn parse_breakpoint(spec: &str) -> Result<(String, u32), CliError> {
    let invalid = || {
        CliError::args(format!("invalid breakpoint '{}'", spec))
            .with_hint("use FILE:LINE with a line number of 1 or more")
    };
    let (file, line) = spec.rsplit_once(':').ok_or_else(invalid)?;
    let line: u32 = line.trim().parse().map_err(|_| invalid())?;
    if file.is_empty() || line == 0 {
        return Err(invalid());
    }
    Ok((file.to_string(), line))
}

/// Global `arg` table as the stock interpreter builds it: `arg[0]` is the
/// script, script arguments from 1.
fn set_script_args(lua: &Lua, script: &Path, args: &[String]) -> mlua::Result<()> {
    let table = lua.create_table()?;
    table.set(0, script.display().to_string())?;
    for (i, value) in args.iter().enumerate() {
        table.set(i + 1, value.as_str())?;
    }
    lua.globals().set("arg", table)
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    pub fn script(err: mlua::Error) -> Self {
        Self { code: EXIT_SCRIPT_ERROR, message: format_lua_error(&err), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_breakpoint() {
        assert_eq!(parse_breakpoint("main.lua:12").unwrap(), ("main.lua".to_string(), 12));
        assert_eq!(
            parse_breakpoint(r"C:\src\main.lua:3").unwrap(),
            (r"C:\src\main.lua".to_string(), 3)
        );
    }

    #[test]
    fn test_parse_breakpoint_rejects_bad_specs() {
        for spec in ["main.lua", "main.lua:", ":4", "main.lua:0", "main.lua:-1", "main.lua:x"] {
            let err = parse_breakpoint(spec).unwrap_err();
            assert_eq!(err.code, EXIT_USAGE, "{spec}");
            assert!(err.hint.is_some());
        }
    }

    #[test]
    fn test_script_args_table() {
        let lua = Lua::new();
        set_script_args(&lua, Path::new("tool.lua"), &["a".to_string(), "--b".to_string()]).unwrap();
        let joined: String = lua
            .load("return arg[0] .. ' ' .. arg[1] .. ' ' .. arg[2] .. ' ' .. #arg")
            .eval()
            .unwrap();
        assert_eq!(joined, "tool.lua a --b 2");
    }

    #[test]
    fn test_cli_parses_trailing_script_args() {
        let cli = Cli::try_parse_from([
            "luadbg", "--run", "-b", "x.lua:3", "-b", "y.lua:9", "-vv", "x.lua", "--", "--flag", "v",
        ])
        .unwrap();
        assert!(cli.run);
        assert_eq!(cli.breakpoints, vec!["x.lua:3", "y.lua:9"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.script, PathBuf::from("x.lua"));
        assert_eq!(cli.args, vec!["--flag", "v"]);
    }
}
