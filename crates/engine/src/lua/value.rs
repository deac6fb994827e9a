//! Conversion from `mlua` values to the inspector's value model.

use luadbg_core::{Composite, Handle, Value};
use mlua::Value as LuaValue;

/// A Lua table viewed through the inspector.
#[derive(Debug, Clone)]
pub struct LuaTable(mlua::Table);

impl LuaTable {
    pub fn new(table: mlua::Table) -> Self {
        LuaTable(table)
    }
}

impl Composite for LuaTable {
    fn handle(&self) -> Handle {
        Handle(self.0.to_pointer() as usize)
    }

    /// Raw pairs, metamethods bypassed. A failed traversal yields the
    /// pairs seen so far.
    fn pairs(&self) -> Vec<(Value<Self>, Value<Self>)> {
        let mut pairs = Vec::new();
        let walked = self.0.for_each(|key: LuaValue, value: LuaValue| {
            pairs.push((convert(key), convert(value)));
            Ok(())
        });
        if let Err(e) = walked {
            log::warn!("table traversal stopped: {}", format_lua_error(&e));
        }
        pairs
    }
}

pub fn convert(value: LuaValue) -> Value<LuaTable> {
    let handle = Handle(value.to_pointer() as usize);
    match value {
        LuaValue::Nil => Value::Nil,
        LuaValue::Boolean(b) => Value::Boolean(b),
        LuaValue::Integer(i) => Value::Integer(i),
        LuaValue::Number(n) => Value::Number(n),
        LuaValue::String(s) => Value::String(s.to_string_lossy().to_string()),
        LuaValue::Table(t) => Value::Composite(LuaTable(t)),
        LuaValue::Function(_) => Value::Callable(handle),
        LuaValue::Thread(_) => Value::Thread(handle),
        LuaValue::LightUserData(ud) => Value::Opaque(Handle(ud.0 as usize)),
        _ => Value::Opaque(handle),
    }
}

/// Format a Lua error for the console.
pub fn format_lua_error(error: &mlua::Error) -> String {
    match error {
        mlua::Error::SyntaxError { message, .. } => message.clone(),
        mlua::Error::RuntimeError(msg) => strip_traceback(msg).to_string(),
        mlua::Error::CallbackError { cause, .. } => format_lua_error(cause),
        _ => error.to_string(),
    }
}

fn strip_traceback(message: &str) -> &str {
    match message.find("\nstack traceback:") {
        Some(idx) => &message[..idx],
        None => message,
    }
}
