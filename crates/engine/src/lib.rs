//! Debugger engine: everything between a runtime hook event and the console.
//!
//! The engine is written against [`host::DebugHost`]; the [`lua`] module
//! binds it to an `mlua` state.

pub mod command;
pub mod console;
pub mod debugger;
mod dispatch;
pub mod host;
pub mod inspect;
pub mod lua;
mod prompt;

#[cfg(test)]
pub(crate) mod fake;

pub use command::{Command, CommandError, CommandKind};
pub use console::{Console, PlainDecor, PromptDecor};
pub use debugger::{Debugger, DebuggerOptions};
pub use host::{Binding, DebugHost, FrameInfo, HookEvent, HostError, HostResult};
pub use inspect::Scope;
