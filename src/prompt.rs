use std::io::{self, BufRead, Write};

use crate::error::Result;

/// Line-oriented question/answer over any reader and writer.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }

    /// Prints `question` and returns the trimmed answer. End of input is an error,
    /// since no further answer can ever arrive.
    pub fn ask(&mut self, question: &str) -> Result<String> {
        writeln!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed").into());
        }

        Ok(answer.trim().to_string())
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}
