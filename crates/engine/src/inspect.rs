//! Variable lookup and printing.
//!
//! Every function here writes to the console and reports runtime query
//! failures as an `Error:` line rather than returning them; only console
//! write errors propagate.

use std::fmt;
use std::io::{self, Write};

use luadbg_core::{compare_keys, Composite, Value};

use crate::host::{Binding, DebugHost, HostError};

/// Where a watched name was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Local,
    Upvalue,
    Global,
}

impl Scope {
    pub fn label(self) -> &'static str {
        match self {
            Scope::Local => "local",
            Scope::Upvalue => "up",
            Scope::Global => "global",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Look `name` up as the paused function sees it: locals, then upvalues,
/// then globals. Within a category the last binding wins, so an inner
/// block's local shadows an outer one. A local holding nil still counts;
/// a nil global does not.
pub fn resolve<H: DebugHost>(
    host: &H,
    name: &str,
) -> Result<Option<(Scope, Value<H::Table>)>, HostError> {
    if let Some(value) = last_named(host.locals(1)?, name) {
        return Ok(Some((Scope::Local, value)));
    }
    if let Some(value) = last_named(host.upvalues(1)?, name) {
        return Ok(Some((Scope::Upvalue, value)));
    }
    let global = host.global(name)?;
    if global.is_nil() {
        return Ok(None);
    }
    Ok(Some((Scope::Global, global)))
}

fn last_named<C>(bindings: Option<Vec<Binding<C>>>, name: &str) -> Option<Value<C>> {
    bindings?
        .into_iter()
        .filter(|binding| binding.name == name)
        .last()
        .map(|binding| binding.value)
}

pub fn watch<H: DebugHost>(
    host: &H,
    out: &mut dyn Write,
    name: &str,
    depth: u32,
) -> io::Result<()> {
    match resolve(host, name) {
        Ok(Some((scope, value))) => write_variable(out, Some(scope), name, &value, depth),
        Ok(None) => writeln!(out, "Variable({}) is not defined!", name),
        Err(e) => host_error(out, &e),
    }
}

/// One variable line, followed by its table pairs down to `depth` levels.
pub fn write_variable<C: Composite>(
    out: &mut dyn Write,
    scope: Option<Scope>,
    name: &str,
    value: &Value<C>,
    depth: u32,
) -> io::Result<()> {
    if let Some(scope) = scope {
        write!(out, "Scope({}) \t", scope)?;
    }
    writeln!(
        out,
        "Name({}) \tType({}) \tValue({})",
        name,
        value.kind(),
        value.render()
    )?;
    if let Value::Composite(table) = value {
        expand(out, table, depth, 2)?;
    }
    Ok(())
}

/// Depth bounds the recursion, so self-referencing tables terminate.
fn expand<C: Composite>(out: &mut dyn Write, table: &C, depth: u32, indent: usize) -> io::Result<()> {
    if depth == 0 {
        return Ok(());
    }
    let mut pairs = table.pairs();
    pairs.sort_by(|a, b| compare_keys(&a.0, &b.0));

    for (key, value) in &pairs {
        writeln!(
            out,
            "{:indent$}* KT({}) \tKey({}) \tVT({}) \tVal({})",
            "",
            key.kind(),
            key.render(),
            value.kind(),
            value.render(),
            indent = indent
        )?;
        if let Value::Composite(nested) = value {
            expand(out, nested, depth - 1, indent + 2)?;
        }
    }
    Ok(())
}

pub fn list_locals<H: DebugHost>(host: &H, out: &mut dyn Write, level: usize) -> io::Result<()> {
    match host.locals(level) {
        Ok(Some(bindings)) => write_bindings(
            out,
            &format!("Local Variables of Stack Level {}", level),
            &bindings,
        ),
        Ok(None) => writeln!(out, "No local variable info available at stack level {}.", level),
        Err(e) => host_error(out, &e),
    }
}

pub fn list_upvalues<H: DebugHost>(host: &H, out: &mut dyn Write, level: usize) -> io::Result<()> {
    match host.upvalues(level) {
        Ok(Some(bindings)) => write_bindings(
            out,
            &format!("Up-Variables of Stack Level {}", level),
            &bindings,
        ),
        Ok(None) => writeln!(out, "No up-variable info available at stack level {}.", level),
        Err(e) => host_error(out, &e),
    }
}

fn write_bindings<C: Composite>(
    out: &mut dyn Write,
    title: &str,
    bindings: &[Binding<C>],
) -> io::Result<()> {
    writeln!(out, "{}:>>>>>>>>", title)?;
    for binding in bindings.iter().filter(|b| !b.is_synthetic()) {
        write_variable(out, None, &binding.name, &binding.value, 0)?;
    }
    writeln!(out, "<<<<<<<<")
}

pub fn print_stack<H: DebugHost>(host: &H, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Call Stack:>>>>>>>>")?;
    let mut level = 1;
    loop {
        match host.frame(level) {
            Ok(Some(frame)) => writeln!(out, "{}", frame)?,
            Ok(None) => break,
            Err(e) => {
                host_error(out, &e)?;
                break;
            }
        }
        level += 1;
    }
    writeln!(out, "<<<<<<<<")
}

/// Frame summary printed when the prompt opens.
pub fn print_location<H: DebugHost>(host: &H, out: &mut dyn Write) -> io::Result<()> {
    match host.frame(1) {
        Ok(Some(frame)) => writeln!(out, "{}", frame),
        Ok(None) => Ok(()),
        Err(e) => host_error(out, &e),
    }
}

fn host_error(out: &mut dyn Write, error: &HostError) -> io::Result<()> {
    log::warn!("runtime query failed: {}", error);
    writeln!(out, "Error: {}", error)
}
