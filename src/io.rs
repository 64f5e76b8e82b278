//! I/O operations with files.
//!
//! A file is a sequence of lines separated by line feeds, optionally preceded by
//! carriage returns. A final line break is represented by an empty last line, so
//! writing the lines joined by the detected [`LineEnding`] reproduces the original
//! content.

use crate::error::{Error, Result};
use crate::sys::AsString;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use tracing::{debug, warn};

// Suggested capacity of internal buffers for readers and writers.
const BUFFER_SIZE: usize = 65_536;

/// The line break written between lines.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// Returns the ending of the first line break in `text`, or [`LineEnding::Lf`] if
    /// there is none.
    pub fn detect(text: &str) -> LineEnding {
        match text.find('\n') {
            Some(i) if text[..i].ends_with('\r') => LineEnding::CrLf,
            _ => LineEnding::Lf,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LineEnding::Lf => "lf",
            LineEnding::CrLf => "crlf",
        }
    }
}

/// Reads the lines of the file at `path` along with its line ending.
pub fn read_file<P>(path: P) -> Result<(Vec<String>, LineEnding)>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(&path.as_string(), e))?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| Error::io(&path.as_string(), e))?;
    let ending = LineEnding::detect(&text);
    let crlf = text.matches("\r\n").count();
    if crlf > 0 && crlf < text.matches('\n').count() {
        warn!(path = %path.as_string(), ending = ending.name(), "mixed line endings");
    }
    Ok((split_lines(&text), ending))
}

/// Writes `lines` separated by `ending` to the file at `path`, returning the number
/// of bytes written.
pub fn write_file<P>(path: P, lines: &[String], ending: LineEnding) -> Result<usize>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| Error::io(&path.as_string(), e))?;
    let mut writer = BufWriter::with_capacity(BUFFER_SIZE, file);
    write_lines(&mut writer, lines, ending).map_err(|e| Error::io(&path.as_string(), e))
}

/// Returns the lines and line ending of the file at `path`, or a single empty line if
/// the file does not exist or cannot be read.
pub fn load<P>(path: P) -> (Vec<String>, LineEnding)
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    match read_file(path) {
        Ok(content) => content,
        Err(Error::Io { cause, .. }) if cause.kind() == ErrorKind::NotFound => {
            debug!(path = %path.as_string(), "new file");
            (vec![String::new()], LineEnding::default())
        }
        Err(e) => {
            warn!("{e}: loading empty buffer");
            (vec![String::new()], LineEnding::default())
        }
    }
}

/// Splits `text` on line feeds. Carriage returns preceding a line feed are dropped.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = text.lines().map(|l| l.to_string()).collect::<Vec<_>>();
    if text.is_empty() || text.ends_with('\n') {
        lines.push(String::new());
    }
    lines
}

fn write_lines<W: Write>(writer: &mut W, lines: &[String], ending: LineEnding) -> io::Result<usize> {
    let brk = ending.as_str();
    let mut n = 0;
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            writer.write_all(brk.as_bytes())?;
            n += brk.len();
        }
        writer.write_all(line.as_bytes())?;
        n += line.len();
    }
    writer.flush()?;
    Ok(n)
}
