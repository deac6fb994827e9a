//! In-memory runtime for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::{self, Cursor, Write};
use std::path::PathBuf;
use std::rc::Rc;

use luadbg_core::{Composite, Handle, Value};
use tempfile::TempDir;

use crate::console::Console;
use crate::host::{Binding, DebugHost, FrameInfo, HostError, HostResult};

/// Clonable writer whose contents tests can read back.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).to_string()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub(crate) fn console(input: &str) -> Console {
    Console::new(Box::new(Cursor::new(input.to_string())), Box::new(io::sink()))
}

pub(crate) fn captured_console(input: &str) -> (Console, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let console = Console::new(Box::new(Cursor::new(input.to_string())), Box::new(buffer.clone()));
    (console, buffer)
}

pub(crate) fn script_file(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("script.lua");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

#[derive(Debug)]
struct TableData {
    id: usize,
    pairs: RefCell<Vec<(Value<FakeTable>, Value<FakeTable>)>>,
}

#[derive(Debug, Clone)]
pub(crate) struct FakeTable(Rc<TableData>);

impl FakeTable {
    pub(crate) fn new(id: usize) -> Self {
        FakeTable(Rc::new(TableData {
            id,
            pairs: RefCell::new(Vec::new()),
        }))
    }

    pub(crate) fn insert(&self, key: Value<FakeTable>, value: Value<FakeTable>) {
        self.0.pairs.borrow_mut().push((key, value));
    }
}

impl Composite for FakeTable {
    fn handle(&self) -> Handle {
        Handle(self.0.id)
    }

    fn pairs(&self) -> Vec<(Value<Self>, Value<Self>)> {
        self.0.pairs.borrow().clone()
    }
}

pub(crate) struct FakeFrame {
    info: FrameInfo,
    locals: Vec<Binding<FakeTable>>,
    upvalues: Vec<Binding<FakeTable>>,
}

impl FakeFrame {
    /// `path` is the file the function was loaded from, if any.
    pub(crate) fn new(path: Option<&str>, line: i64, name: Option<&str>) -> Self {
        let (source, short_src) = match path {
            Some(path) => (format!("@{}", path), path.to_string()),
            None => ("=test".to_string(), "test".to_string()),
        };
        FakeFrame {
            info: FrameInfo {
                source: Some(source),
                short_src,
                line,
                name: name.map(str::to_string),
                what: Some("Lua".to_string()),
            },
            locals: Vec::new(),
            upvalues: Vec::new(),
        }
    }

    pub(crate) fn local(mut self, name: &str, value: Value<FakeTable>) -> Self {
        self.locals.push(Binding::new(name, value));
        self
    }

    pub(crate) fn upvalue(mut self, name: &str, value: Value<FakeTable>) -> Self {
        self.upvalues.push(Binding::new(name, value));
        self
    }
}

/// Frames are listed innermost first (index 0 is level 1).
#[derive(Default)]
pub(crate) struct FakeHost {
    frames: Vec<FakeFrame>,
    globals: RefCell<HashMap<String, Value<FakeTable>>>,
    executed: RefCell<Vec<String>>,
    extra_depth: Cell<usize>,
    grow_on_exec: Cell<bool>,
    failure: RefCell<Option<String>>,
}

impl FakeHost {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_frame(mut self, frame: FakeFrame) -> Self {
        self.frames.push(frame);
        self
    }

    pub(crate) fn set_global(&self, name: &str, value: Value<FakeTable>) {
        self.globals.borrow_mut().insert(name.to_string(), value);
    }

    pub(crate) fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }

    /// Make every `exec` leave a frame behind.
    pub(crate) fn grow_stack_on_exec(&self) {
        self.grow_on_exec.set(true);
    }

    /// Make every variable query fail with `message`.
    pub(crate) fn fail_queries(&self, message: &str) {
        *self.failure.borrow_mut() = Some(message.to_string());
    }

    fn check(&self) -> HostResult<()> {
        match &*self.failure.borrow() {
            Some(message) => Err(HostError(message.clone())),
            None => Ok(()),
        }
    }

    fn at(&self, level: usize) -> Option<&FakeFrame> {
        level.checked_sub(1).and_then(|index| self.frames.get(index))
    }
}

impl DebugHost for FakeHost {
    type Table = FakeTable;

    fn stack_depth(&self) -> usize {
        self.frames.len() + self.extra_depth.get()
    }

    fn frame(&self, level: usize) -> HostResult<Option<FrameInfo>> {
        Ok(self.at(level).map(|frame| frame.info.clone()))
    }

    fn locals(&self, level: usize) -> HostResult<Option<Vec<Binding<FakeTable>>>> {
        self.check()?;
        Ok(self.at(level).map(|frame| frame.locals.clone()))
    }

    fn upvalues(&self, level: usize) -> HostResult<Option<Vec<Binding<FakeTable>>>> {
        self.check()?;
        Ok(self.at(level).map(|frame| frame.upvalues.clone()))
    }

    fn global(&self, name: &str) -> HostResult<Value<FakeTable>> {
        self.check()?;
        Ok(self.globals.borrow().get(name).cloned().unwrap_or(Value::Nil))
    }

    fn exec(&self, chunk: &str) -> HostResult<()> {
        if self.grow_on_exec.get() {
            self.extra_depth.set(self.extra_depth.get() + 1);
        }
        if let Some(message) = chunk.strip_prefix("error(") {
            let message = message.trim_end_matches(')').trim_matches('\'');
            return Err(HostError(format!("exec:1: {}", message)));
        }
        self.executed.borrow_mut().push(chunk.to_string());
        Ok(())
    }
}
