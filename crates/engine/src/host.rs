//! The runtime seen from the debugger.
//!
//! Levels are 1-based and relative to the function that triggered the
//! current hook event: level 1 is that function, level 2 its caller.

use std::fmt;

use luadbg_core::{Composite, Value};

/// Runtime notifications the dispatcher reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    Call,
    /// A call that replaces the current frame. No matching return follows.
    TailCall,
    Return,
    Line {
        line: u32,
        /// Chunk name of the executing function, e.g. `@main.lua`.
        source: Option<String>,
    },
}

/// One activation record, as reported by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub source: Option<String>,
    pub short_src: String,
    /// -1 when no line information is available (native functions).
    pub line: i64,
    pub name: Option<String>,
    pub what: Option<String>,
}

impl FrameInfo {
    /// Filesystem path of the chunk, if it was loaded from a file.
    pub fn file_path(&self) -> Option<&str> {
        self.source.as_deref().and_then(|s| s.strip_prefix('@'))
    }
}

impl fmt::Display for FrameInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} \tLine:{} \tName:{} \tWhat:{}",
            self.short_src,
            self.line,
            self.name.as_deref().unwrap_or("(N/A)"),
            self.what.as_deref().unwrap_or("(N/A)"),
        )
    }
}

/// A named slot: a local variable or an upvalue.
#[derive(Debug, Clone)]
pub struct Binding<C> {
    pub name: String,
    pub value: Value<C>,
}

impl<C> Binding<C> {
    pub fn new(name: impl Into<String>, value: Value<C>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Compiler-generated slots such as `(temporary)` or `(for state)`.
    pub fn is_synthetic(&self) -> bool {
        self.name.starts_with('(')
    }
}

/// Failure reported by the runtime while answering a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError(pub String);

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for HostError {}

pub type HostResult<T> = Result<T, HostError>;

/// Introspection the dispatcher and inspector need from a runtime.
///
/// Only valid while the runtime is stopped inside a hook callback.
pub trait DebugHost {
    type Table: Composite;

    /// Number of active frames. Read before and after every dispatch to
    /// check that it leaves the runtime stack as it found it, so it must
    /// not walk the stack.
    fn stack_depth(&self) -> usize;

    /// `None` when `level` is past the outermost frame.
    fn frame(&self, level: usize) -> HostResult<Option<FrameInfo>>;

    /// Locals of the frame at `level` in declaration order.
    fn locals(&self, level: usize) -> HostResult<Option<Vec<Binding<Self::Table>>>>;

    /// Upvalues of the function running at `level`.
    fn upvalues(&self, level: usize) -> HostResult<Option<Vec<Binding<Self::Table>>>>;

    fn global(&self, name: &str) -> HostResult<Value<Self::Table>>;

    /// Compile and run `chunk` in the global environment.
    fn exec(&self, chunk: &str) -> HostResult<()>;
}
