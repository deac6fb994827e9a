//! Runtime values as seen by the inspector.
//!
//! The runtime only exposes a value's kind at runtime; here it becomes a
//! closed enum. Only the composite variant can enumerate its pairs, through
//! the [`Composite`] capability the host provides.

use std::cmp::Ordering;
use std::fmt;

/// Stable identity of a non-primitive value (its runtime address).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Handle(pub usize);

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

/// Kind tag printed next to every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Nil,
    Boolean,
    Number,
    String,
    Table,
    Function,
    UserData,
    Thread,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Nil => "nil",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Table => "table",
            ValueKind::Function => "function",
            ValueKind::UserData => "userdata",
            ValueKind::Thread => "thread",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An associative aggregate owned by the runtime.
pub trait Composite: Clone {
    fn handle(&self) -> Handle;

    /// Raw key/value pairs in the runtime's iteration order.
    fn pairs(&self) -> Vec<(Value<Self>, Value<Self>)>;
}

#[derive(Debug, Clone)]
pub enum Value<C> {
    Nil,
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Composite(C),
    Callable(Handle),
    Opaque(Handle),
    Thread(Handle),
}

impl<C: Composite> Value<C> {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Nil => ValueKind::Nil,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Integer(_) | Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Composite(_) => ValueKind::Table,
            Value::Callable(_) => ValueKind::Function,
            Value::Opaque(_) => ValueKind::UserData,
            Value::Thread(_) => ValueKind::Thread,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_composite(&self) -> Option<&C> {
        match self {
            Value::Composite(table) => Some(table),
            _ => None,
        }
    }

    pub fn handle(&self) -> Option<Handle> {
        match self {
            Value::Composite(table) => Some(table.handle()),
            Value::Callable(h) | Value::Opaque(h) | Value::Thread(h) => Some(*h),
            _ => None,
        }
    }

    /// Literal text for primitives, identity token for everything else.
    pub fn render(&self) -> String {
        match self {
            Value::Nil => "nil".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Number(n) => format_float(*n),
            Value::String(s) => s.clone(),
            Value::Composite(table) => table.handle().to_string(),
            Value::Callable(h) | Value::Opaque(h) | Value::Thread(h) => h.to_string(),
        }
    }
}

/// Floats keep a trailing `.0` when integral so they read differently from
/// integers, the way the runtime itself prints them. Integral values too
/// large for that switch to exponent form.
fn format_float(n: f64) -> String {
    if n.is_nan() {
        "nan".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "inf" } else { "-inf" };
        text.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e16 {
        format!("{:.1}", n)
    } else if n.fract() == 0.0 {
        format!("{:e}", n)
    } else {
        format!("{}", n)
    }
}

fn key_rank<C: Composite>(value: &Value<C>) -> u8 {
    match value {
        Value::Integer(_) | Value::Number(_) => 0,
        Value::String(_) => 1,
        Value::Boolean(_) => 2,
        Value::Composite(_) | Value::Callable(_) | Value::Opaque(_) | Value::Thread(_) => 3,
        Value::Nil => 4,
    }
}

/// Total order for table keys: numbers numerically, then strings lexically,
/// then booleans, then everything else by identity.
pub fn compare_keys<C: Composite>(a: &Value<C>, b: &Value<C>) -> Ordering {
    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => x.cmp(y),
        (Value::Integer(x), Value::Number(y)) => (*x as f64).total_cmp(y),
        (Value::Number(x), Value::Integer(y)) => x.total_cmp(&(*y as f64)),
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        _ => key_rank(a)
            .cmp(&key_rank(b))
            .then_with(|| a.handle().cmp(&b.handle())),
    }
}
