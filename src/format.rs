//! Source formatters.
//!
//! A formatter turns the lines of a document into their formatted equivalent. The
//! formatters in this module never change the document themselves, which lets the
//! caller wrap the result in an undoable command.

use crate::error::{Error, Result};
use crate::io;
use indexmap::IndexMap;
use std::io::Write;
use std::process::{Command, Stdio};
use std::thread;
use tracing::debug;

pub trait Formatter {
    /// Returns `true` if this formatter has rules for `language`.
    fn handles(&self, language: Option<&str>) -> bool;

    /// Returns `lines` formatted according to the rules of `language`.
    fn format(&self, lines: &[String], language: Option<&str>) -> Result<Vec<String>>;
}

/// A formatter that handles no language and returns its input unchanged.
pub struct Identity;

impl Formatter for Identity {
    fn handles(&self, _: Option<&str>) -> bool {
        false
    }

    fn format(&self, lines: &[String], _: Option<&str>) -> Result<Vec<String>> {
        Ok(lines.to_vec())
    }
}

/// A formatter that pipes source through an external program chosen by language.
///
/// Each command line is a program followed by its arguments separated by whitespace.
/// The program reads source on standard input and writes formatted source on standard
/// output. Languages without a command are returned unchanged.
pub struct CommandFormatter {
    commands: IndexMap<String, String>,
}

impl CommandFormatter {
    pub fn new(commands: IndexMap<String, String>) -> CommandFormatter {
        CommandFormatter { commands }
    }

    pub fn command(&self, language: &str) -> Option<&str> {
        self.commands.get(language).map(|cmd| cmd.as_str())
    }

    fn run(&self, language: &str, command: &str, input: String) -> Result<String> {
        let mut args = command.split_whitespace();
        let program = args
            .next()
            .ok_or_else(|| Error::formatter(language, "empty command"))?;
        debug!(language, command, "running formatter");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::formatter(language, &format!("{program}: {e}")))?;

        // Input is written from a separate thread so that a program producing output
        // before consuming all of its input cannot block on a full pipe.
        let writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child
            .wait_with_output()
            .map_err(|e| Error::formatter(language, &e.to_string()))?;
        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => (),
                Ok(Err(e)) if output.status.success() => {
                    return Err(Error::formatter(language, &e.to_string()));
                }
                Ok(Err(_)) => (),
                Err(_) => return Err(Error::formatter(language, "writer failed")),
            }
        }

        if output.status.success() {
            String::from_utf8(output.stdout)
                .map_err(|e| Error::formatter(language, &e.to_string()))
        } else {
            let errors = String::from_utf8_lossy(&output.stderr);
            let cause = match errors.lines().next() {
                Some(line) => format!("{}: {line}", output.status),
                None => output.status.to_string(),
            };
            Err(Error::formatter(language, &cause))
        }
    }
}

impl Formatter for CommandFormatter {
    fn handles(&self, language: Option<&str>) -> bool {
        language.is_some_and(|lang| self.command(lang).is_some())
    }

    fn format(&self, lines: &[String], language: Option<&str>) -> Result<Vec<String>> {
        match language.and_then(|lang| self.command(lang).map(|cmd| (lang, cmd))) {
            Some((lang, cmd)) => {
                let output = self.run(lang, cmd, lines.join("\n"))?;
                Ok(io::split_lines(&output))
            }
            None => Ok(lines.to_vec()),
        }
    }
}
