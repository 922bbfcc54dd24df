//! Line prompts for the interactive shell.
//!
//! A terminal gets `dialoguer` line editing; piped input is read line by line
//! so the shell can be scripted.

use std::io::{BufRead, ErrorKind, Write};

use dialoguer::Input;

use crate::error::{CarnetError, Result};

pub trait Prompt {
    /// Ask for one line. An empty answer becomes `default` when one is given.
    /// `None` means the user is gone (end of input or interrupt).
    fn ask(&mut self, label: &str, default: Option<&str>) -> Result<Option<String>>;
}

pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&mut self, label: &str, default: Option<&str>) -> Result<Option<String>> {
        let mut input = Input::<String>::new().with_prompt(label).allow_empty(true);
        if let Some(d) = default {
            input = input.default(d.to_string());
        }
        match input.interact_text() {
            Ok(answer) => Ok(Some(answer.trim().to_string())),
            Err(dialoguer::Error::IO(e))
                if matches!(e.kind(), ErrorKind::UnexpectedEof | ErrorKind::Interrupted) =>
            {
                Ok(None)
            }
            Err(e) => Err(CarnetError::Prompt(e.to_string())),
        }
    }
}

/// Reads answers from any buffered reader, echoing the label to stdout.
pub struct ScriptPrompt<R> {
    reader: R,
}

impl<R: BufRead> ScriptPrompt<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> Prompt for ScriptPrompt<R> {
    fn ask(&mut self, label: &str, default: Option<&str>) -> Result<Option<String>> {
        match default {
            Some(d) => print!("{label} [{d}]: "),
            None => print!("{label}: "),
        }
        std::io::stdout().flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            println!();
            return Ok(None);
        }
        let answer = line.trim();
        println!();
        match default {
            Some(d) if answer.is_empty() => Ok(Some(d.to_string())),
            _ => Ok(Some(answer.to_string())),
        }
    }
}
