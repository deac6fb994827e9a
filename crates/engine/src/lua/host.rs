//! [`DebugHost`] over a live `mlua` state, valid inside the hook callback.
//!
//! Queries go through the `debug` library functions captured at attach
//! time. Called from the hook, level 1 of those functions is the Lua
//! function that raised the hook event, which matches the host levels.

use std::cell::Cell;

use mlua::{Function, Lua, Table, Value as LuaValue};

use luadbg_core::Value;

use super::value::{convert, format_lua_error, LuaTable};
use crate::host::{Binding, DebugHost, FrameInfo, HostError, HostResult};

/// Captured `debug.getlocal`, `debug.getupvalue`, `debug.getinfo`.
pub(crate) struct Introspection {
    getlocal: Function,
    getupvalue: Function,
    getinfo: Function,
}

impl Introspection {
    /// Fails when the state was created without the `debug` library.
    pub(crate) fn capture(lua: &Lua) -> mlua::Result<Self> {
        let debug: Option<Table> = lua.globals().get("debug")?;
        let debug = debug.ok_or_else(|| {
            mlua::Error::RuntimeError(
                "the debug library is not loaded in this Lua state".to_string(),
            )
        })?;
        Ok(Introspection {
            getlocal: debug.get("getlocal")?,
            getupvalue: debug.get("getupvalue")?,
            getinfo: debug.get("getinfo")?,
        })
    }
}

pub struct LuaHost<'a> {
    lua: &'a Lua,
    introspection: &'a Introspection,
    frames: &'a Cell<usize>,
}

impl<'a> LuaHost<'a> {
    /// `frames` is the depth the hook tracks from call and return events.
    pub(crate) fn new(
        lua: &'a Lua,
        introspection: &'a Introspection,
        frames: &'a Cell<usize>,
    ) -> Self {
        Self {
            lua,
            introspection,
            frames,
        }
    }

    fn info(&self, level: usize, what: &str) -> HostResult<Option<Table>> {
        self.introspection
            .getinfo
            .call::<Option<Table>>((level, what))
            .map_err(host_error)
    }

    fn collect(
        &self,
        mut next: impl FnMut(usize) -> mlua::Result<(Option<String>, LuaValue)>,
    ) -> HostResult<Vec<Binding<LuaTable>>> {
        let mut bindings = Vec::new();
        for index in 1.. {
            let (name, value) = next(index).map_err(host_error)?;
            let Some(name) = name else {
                break;
            };
            bindings.push(Binding::new(name, convert(value)));
        }
        Ok(bindings)
    }
}

fn host_error(error: mlua::Error) -> HostError {
    HostError(format_lua_error(&error))
}

impl DebugHost for LuaHost<'_> {
    type Table = LuaTable;

    fn stack_depth(&self) -> usize {
        // Lua disables hooks while one runs, so code executed from the
        // prompt cannot move this.
        self.frames.get()
    }

    fn frame(&self, level: usize) -> HostResult<Option<FrameInfo>> {
        let Some(info) = self.info(level, "nSl")? else {
            return Ok(None);
        };
        let field = |key: &str| info.get::<Option<String>>(key).map_err(host_error);
        Ok(Some(FrameInfo {
            source: field("source")?,
            short_src: field("short_src")?.unwrap_or_default(),
            line: info
                .get::<Option<i64>>("currentline")
                .map_err(host_error)?
                .unwrap_or(-1),
            name: field("name")?,
            what: field("what")?,
        }))
    }

    fn locals(&self, level: usize) -> HostResult<Option<Vec<Binding<LuaTable>>>> {
        // getlocal raises on a level past the stack; probe first.
        if self.info(level, "l")?.is_none() {
            return Ok(None);
        }
        let getlocal = &self.introspection.getlocal;
        self.collect(|index| getlocal.call((level, index))).map(Some)
    }

    fn upvalues(&self, level: usize) -> HostResult<Option<Vec<Binding<LuaTable>>>> {
        let Some(info) = self.info(level, "f")? else {
            return Ok(None);
        };
        let func: Function = info.get("func").map_err(host_error)?;
        let getupvalue = &self.introspection.getupvalue;
        self.collect(|index| getupvalue.call((func.clone(), index))).map(Some)
    }

    fn global(&self, name: &str) -> HostResult<Value<LuaTable>> {
        self.lua
            .globals()
            .get::<LuaValue>(name)
            .map(convert)
            .map_err(host_error)
    }

    fn exec(&self, chunk: &str) -> HostResult<()> {
        self.lua
            .load(chunk)
            .set_name("=exec")
            .exec()
            .map_err(host_error)
    }
}
