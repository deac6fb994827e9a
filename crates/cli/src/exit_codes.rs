//! CLI Exit Code Registry
//!
//! Exit codes are part of the shell contract; wrappers and CI jobs that
//! run scripts under the debugger rely on them.
//!
//! | Code | Meaning                                                     |
//! |------|-------------------------------------------------------------|
//! | 0    | Script ran to completion                                    |
//! | 1    | Script raised an error (load, runtime or attach failure)    |
//! | 2    | Usage error: bad arguments, bad `--break`, breakpoint path  |
//! | 3    | I/O error: script unreadable                                |
//! | 4    | Settings file unreadable or invalid                         |

/// Success - the script finished.
pub const EXIT_SUCCESS: u8 = 0;

/// The debuggee failed: syntax error, uncaught runtime error, or the Lua
/// state could not be prepared.
pub const EXIT_SCRIPT_ERROR: u8 = 1;

/// Usage error - bad arguments, malformed or unresolvable `--break`.
pub const EXIT_USAGE: u8 = 2;

/// The script file could not be read.
pub const EXIT_IO: u8 = 3;

/// The settings file exists but could not be read or parsed.
pub const EXIT_CONFIG: u8 = 4;
