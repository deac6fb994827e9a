//! Console the prompt talks to.

use std::io::{self, BufRead, Write};

/// Styling applied around a suspension, e.g. terminal colours.
pub trait PromptDecor {
    fn begin(&mut self, out: &mut dyn Write) -> io::Result<()>;
    fn end(&mut self, out: &mut dyn Write) -> io::Result<()>;
}

/// No decoration.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainDecor;

impl PromptDecor for PlainDecor {
    fn begin(&mut self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }

    fn end(&mut self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }
}

pub struct Console {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
    decor: Box<dyn PromptDecor>,
}

impl Console {
    pub fn new(input: Box<dyn BufRead>, output: Box<dyn Write>) -> Self {
        Self {
            input,
            output,
            decor: Box::new(PlainDecor),
        }
    }

    /// Process stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(Box::new(io::stdin().lock()), Box::new(io::stdout()))
    }

    pub fn with_decor(mut self, decor: Box<dyn PromptDecor>) -> Self {
        self.decor = decor;
        self
    }

    /// One line of input, or `None` at end of input.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    pub fn out(&mut self) -> &mut dyn Write {
        &mut *self.output
    }

    pub fn begin(&mut self) -> io::Result<()> {
        self.decor.begin(&mut *self.output)
    }

    pub fn end(&mut self) -> io::Result<()> {
        self.decor.end(&mut *self.output)?;
        self.output.flush()
    }
}
