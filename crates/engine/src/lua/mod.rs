//! Attaching a [`Debugger`] to an `mlua` state.
//!
//! - [`attach`] captures the `debug` introspection functions, stores the
//!   session in the state's app data, arms the hook and registers the
//!   `debugger` module for scripts
//! - The hook is armed only while it can still suspend: a session in RUN
//!   with no breakpoints runs at full speed until a breakpoint is added
//! - The hook is bound to the main Lua thread; coroutine bodies are not
//!   traced

mod host;
mod value;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mlua::{DebugEvent, HookTriggers, Lua, Table, VmState};

use luadbg_core::ResumeCommand;

use crate::debugger::Debugger;
use crate::host::HookEvent;
use host::Introspection;

pub use host::LuaHost;
pub use value::{convert, format_lua_error, LuaTable};

/// Name scripts `require` to reach the debugger.
pub const MODULE_NAME: &str = "debugger";

struct Attachment {
    debugger: RefCell<Debugger>,
    introspection: Introspection,
    hook_armed: Cell<bool>,
    /// Frames entered minus frames left since the hook was armed.
    frames: Cell<usize>,
}

/// Shared handle to an attached session.
#[derive(Clone)]
pub struct DebugHandle(Rc<Attachment>);

impl DebugHandle {
    /// Run `f` against the session. `None` while the session is busy,
    /// i.e. from code running inside the prompt.
    pub fn with<R>(&self, f: impl FnOnce(&mut Debugger) -> R) -> Option<R> {
        let mut debugger = self.0.debugger.try_borrow_mut().ok()?;
        Some(f(&mut debugger))
    }

    pub fn is_hook_armed(&self) -> bool {
        self.0.hook_armed.get()
    }
}

pub fn attach(lua: &Lua, debugger: Debugger) -> mlua::Result<DebugHandle> {
    let introspection = Introspection::capture(lua)?;
    let handle = DebugHandle(Rc::new(Attachment {
        debugger: RefCell::new(debugger),
        introspection,
        hook_armed: Cell::new(false),
        frames: Cell::new(0),
    }));

    register_module(lua)?;
    lua.set_app_data(handle.clone());
    sync_hook(lua, &handle);
    log::debug!("debugger attached");
    Ok(handle)
}

/// Remove hook, module and session from `lua`.
pub fn detach(lua: &Lua) -> Option<DebugHandle> {
    let handle = lua.remove_app_data::<DebugHandle>()?;
    lua.remove_hook();
    handle.0.hook_armed.set(false);
    if let Err(e) = unregister_module(lua) {
        log::warn!("could not unregister the {} module: {}", MODULE_NAME, e);
    }
    log::debug!("debugger detached");
    Some(handle)
}

/// The session attached to `lua`, if any.
pub fn handle(lua: &Lua) -> Option<DebugHandle> {
    lua.app_data_ref::<DebugHandle>().map(|handle| handle.clone())
}

/// Arm or disarm the hook to match the session. Idempotent.
pub fn sync_hook(lua: &Lua, handle: &DebugHandle) {
    let Some(wanted) = handle.with(|debugger| debugger.hook_wanted()) else {
        return;
    };
    match (wanted, handle.is_hook_armed()) {
        (true, false) => {
            handle.0.frames.set(0);
            install_hook(lua, handle);
            handle.0.hook_armed.set(true);
            log::debug!("hook armed");
        }
        (false, true) => {
            lua.remove_hook();
            handle.0.hook_armed.set(false);
            log::debug!("hook disarmed");
        }
        _ => {}
    }
}

fn install_hook(lua: &Lua, handle: &DebugHandle) {
    let handle = handle.clone();
    lua.set_hook(
        HookTriggers::new().on_calls().on_returns().every_line(),
        move |lua, debug| {
            let event = match debug.event() {
                DebugEvent::Call => HookEvent::Call,
                DebugEvent::TailCall => HookEvent::TailCall,
                DebugEvent::Ret => HookEvent::Return,
                DebugEvent::Line => HookEvent::Line {
                    line: u32::try_from(debug.curr_line()).unwrap_or(0),
                    source: debug.source().source.map(|s| s.into_owned()),
                },
                _ => return Ok(VmState::Continue),
            };
            drop(debug);

            let frames = &handle.0.frames;
            match event {
                HookEvent::Call => frames.set(frames.get() + 1),
                HookEvent::Return => frames.set(frames.get().saturating_sub(1)),
                _ => {}
            }

            {
                let Ok(mut debugger) = handle.0.debugger.try_borrow_mut() else {
                    return Ok(VmState::Continue);
                };
                let host = LuaHost::new(lua, &handle.0.introspection, frames);
                debugger.dispatch(&host, event);
            }
            sync_hook(lua, &handle);
            Ok(VmState::Continue)
        },
    );
}

fn loaded_modules(lua: &Lua) -> mlua::Result<Table> {
    let package: Table = lua.globals().get("package")?;
    package.get("loaded")
}

fn register_module(lua: &Lua) -> mlua::Result<()> {
    let module = lua.create_table()?;

    module.set(
        "setBreakPoint",
        lua.create_function(|lua, (file, line): (String, i64)| {
            let line = line_number(line)?;
            with_session(lua, |debugger| debugger.breakpoints_mut().add(&file, line))?
                .map_err(|e| mlua::Error::RuntimeError(e.to_string()))
        })?,
    )?;

    module.set(
        "delBreakPoint",
        lua.create_function(|lua, (file, line): (String, i64)| {
            let line = line_number(line)?;
            with_session(lua, |debugger| debugger.breakpoints_mut().remove(&file, line))?
                .map_err(|e| mlua::Error::RuntimeError(e.to_string()))
        })?,
    )?;

    module.set(
        "pause",
        lua.create_function(|lua, ()| {
            with_session(lua, |debugger| debugger.set_command(ResumeCommand::Step))
        })?,
    )?;

    loaded_modules(lua)?.set(MODULE_NAME, module)
}

fn unregister_module(lua: &Lua) -> mlua::Result<()> {
    loaded_modules(lua)?.set(MODULE_NAME, mlua::Value::Nil)
}

fn line_number(line: i64) -> mlua::Result<u32> {
    u32::try_from(line)
        .ok()
        .filter(|line| *line > 0)
        .ok_or_else(|| mlua::Error::RuntimeError(format!("invalid line number {}", line)))
}

/// Script API entry: mutate the session, then re-sync the hook.
fn with_session<R>(lua: &Lua, f: impl FnOnce(&mut Debugger) -> R) -> mlua::Result<R> {
    let handle = handle(lua)
        .ok_or_else(|| mlua::Error::RuntimeError("debugger is not attached".to_string()))?;
    let result = handle.with(f).ok_or_else(|| {
        mlua::Error::RuntimeError(
            "debugger is busy; use the prompt commands while paused".to_string(),
        )
    })?;
    sync_hook(lua, &handle);
    Ok(result)
}
