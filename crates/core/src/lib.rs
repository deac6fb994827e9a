//! Core types for the luadbg debugger.
//!
//! Nothing in this crate talks to a Lua state. The engine crate feeds hook
//! events and runtime values in; this crate owns the bookkeeping:
//!
//! - [`SessionState`]: resume command + stack level shared between hooks
//! - [`BreakpointRegistry`]: canonical path -> line set
//! - [`Value`]: closed tagged union over the runtime's value kinds

pub mod breakpoints;
pub mod paths;
pub mod session;
pub mod value;

pub use breakpoints::{BreakpointError, BreakpointRegistry};
pub use paths::{CanonicalPath, PathPolicy};
pub use session::{ResumeCommand, SessionState};
pub use value::{compare_keys, Composite, Handle, Value, ValueKind};
