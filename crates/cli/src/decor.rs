// Terminal colours around a suspension

use std::io::{self, Write};

use crossterm::style::{Color, ResetColor, SetForegroundColor};
use crossterm::QueueableCommand;
use luadbg_engine::PromptDecor;

/// Green while paused, reset before the script continues.
pub struct ColorDecor;

impl PromptDecor for ColorDecor {
    fn begin(&mut self, out: &mut dyn Write) -> io::Result<()> {
        out.queue(SetForegroundColor(Color::Green))?;
        Ok(())
    }

    fn end(&mut self, out: &mut dyn Write) -> io::Result<()> {
        out.queue(ResetColor)?;
        Ok(())
    }
}
