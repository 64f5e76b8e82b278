//! Document model.
//!
//! A [`Document`] owns the lines of text being edited along with the cursor, the
//! selection and a handful of flags describing the editing session. All cursor and
//! selection setters clamp their inputs, so callers never have to validate positions
//! and the following invariants always hold:
//!
//! * there is at least one line, possibly empty
//! * `cursor.row < lines.len()`
//! * `cursor.col <= lines[cursor.row].chars().count()`
//!
//! Text is only changed through [commands](crate::command::Command), which use the
//! crate-private mutators defined here.

use crate::etc;
use crate::io::LineEnding;
use crate::pos::{Direction, Position};
use std::fmt::{self, Display, Formatter};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

pub struct Document {
    lines: Vec<String>,
    cursor: Position,
    anchor: Option<Position>,
    head: Option<Position>,
    insert_mode: bool,
    modified: bool,
    saves: u64,
    line_ending: LineEnding,
    path: Option<PathBuf>,
    language: Option<String>,
    message: Option<String>,
}

/// A normalized selection where `start <= end`.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Selection {
    pub start: Position,
    pub end: Position,
}

impl Selection {
    /// Returns the rows spanned by this selection, inclusive of both ends.
    pub fn rows(&self) -> RangeInclusive<usize> {
        self.start.row..=self.end.row
    }

    /// Returns `true` if `pos` falls inside the selection, treating `end` as an
    /// exclusive bound.
    pub fn contains(&self, pos: Position) -> bool {
        pos >= self.start && pos < self.end
    }
}

/// The editing state besides text and cursor that an undo puts back.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Marks {
    anchor: Option<Position>,
    head: Option<Position>,
    modified: bool,
    saves: u64,
}

/// Status fields presented to users alongside the document.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Status {
    pub name: String,
    pub row: usize,
    pub col: usize,
    pub insert_mode: bool,
    pub modified: bool,
    pub message: Option<String>,
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} {}:{} {}",
            self.name,
            if self.modified { "*" } else { "" },
            self.row,
            self.col,
            if self.insert_mode { "INS" } else { "OVR" }
        )?;
        if let Some(ref msg) = self.message {
            write!(f, " {msg}")?;
        }
        Ok(())
    }
}

impl Document {
    /// Creates a document containing `lines`, where an empty collection is replaced
    /// with a single empty line.
    pub fn new(lines: Vec<String>) -> Document {
        Document {
            lines: Self::nonempty(lines),
            cursor: Position::TOP,
            anchor: None,
            head: None,
            insert_mode: true,
            modified: false,
            saves: 0,
            line_ending: LineEnding::Lf,
            path: None,
            language: None,
            message: None,
        }
    }

    /// Creates a document from `text` by splitting on line feeds.
    pub fn from_text(text: &str) -> Document {
        Document::new(text.split('\n').map(|s| s.to_string()).collect())
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Document {
        self.line_ending = line_ending;
        self
    }

    /// Attaches the file `path` and its `language` tag to this document.
    pub fn with_path<P: AsRef<Path>>(mut self, path: P, language: Option<&str>) -> Document {
        self.path = Some(path.as_ref().to_path_buf());
        self.language = language.map(|lang| lang.to_string());
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns the text of `row`, or an empty string if `row` is out of range.
    pub fn line(&self, row: usize) -> &str {
        self.lines.get(row).map(|l| l.as_str()).unwrap_or("")
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the number of characters in `row`.
    pub fn line_len(&self, row: usize) -> usize {
        etc::char_len(self.line(row))
    }

    /// Returns the full text with lines joined by line feeds.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn insert_mode(&self) -> bool {
        self.insert_mode
    }

    pub fn toggle_insert_mode(&mut self) -> bool {
        self.insert_mode = !self.insert_mode;
        self.insert_mode
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.modified
    }

    pub fn mark_modified(&mut self) {
        self.modified = true;
    }

    /// Clears the modified flag, typically after content has been written.
    pub fn mark_saved(&mut self) {
        self.modified = false;
        self.saves += 1;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_message(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Returns the position nearest to (`row`, `col`) that satisfies the cursor
    /// invariants.
    pub fn clamp(&self, row: usize, col: usize) -> Position {
        let row = row.min(self.lines.len() - 1);
        let col = col.min(self.line_len(row));
        Position::new(row, col)
    }

    /// Sets the cursor to (`row`, `col`) after clamping and returns the position
    /// actually taken.
    pub fn set_cursor(&mut self, row: usize, col: usize) -> Position {
        self.cursor = self.clamp(row, col);
        self.cursor
    }

    /// Moves the cursor `amount` steps in `direction`.
    ///
    /// Horizontal movement is confined to the current line. Vertical movement pulls
    /// the column left when the destination line is shorter.
    pub fn move_cursor(&mut self, direction: Direction, amount: usize) -> Position {
        let Position { row, col } = self.cursor;
        match direction {
            Direction::Up => self.set_cursor(row.saturating_sub(amount), col),
            Direction::Down => self.set_cursor(row.saturating_add(amount), col),
            Direction::Left => self.set_cursor(row, col.saturating_sub(amount)),
            Direction::Right => self.set_cursor(row, col.saturating_add(amount)),
        }
    }

    pub fn move_home(&mut self) -> Position {
        self.set_cursor(self.cursor.row, 0)
    }

    pub fn move_end(&mut self) -> Position {
        self.set_cursor(self.cursor.row, usize::MAX)
    }

    pub fn move_top(&mut self) -> Position {
        self.set_cursor(0, 0)
    }

    pub fn move_bottom(&mut self) -> Position {
        self.set_cursor(usize::MAX, usize::MAX)
    }

    /// Moves the cursor to the next word boundary on the current line, skipping
    /// whitespace and then the run of non-whitespace that follows it.
    pub fn move_word_right(&mut self) -> Position {
        let col = word_boundary(self.line(self.cursor.row), self.cursor.col, true);
        self.set_cursor(self.cursor.row, col)
    }

    /// Mirror of [`move_word_right`](Self::move_word_right) scanning backwards.
    pub fn move_word_left(&mut self) -> Position {
        let col = word_boundary(self.line(self.cursor.row), self.cursor.col, false);
        self.set_cursor(self.cursor.row, col)
    }

    /// Starts a new selection anchored at the cursor.
    pub fn begin_selection(&mut self) {
        self.anchor = Some(self.cursor);
        self.head = Some(self.cursor);
    }

    /// Extends the selection to the cursor, anchoring it first if no selection is
    /// active.
    pub fn update_selection(&mut self) {
        if self.anchor.is_none() {
            self.anchor = Some(self.cursor);
        }
        self.head = Some(self.cursor);
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
        self.head = None;
    }

    pub fn has_selection(&self) -> bool {
        self.anchor.is_some()
    }

    /// Returns the normalized selection, or `None` if no selection is active.
    ///
    /// Both ends are clipped to the current content, which may have changed since
    /// the selection was made.
    pub fn selection(&self) -> Option<Selection> {
        self.anchor.map(|anchor| {
            let head = self.head.unwrap_or(self.cursor);
            let a = self.clamp(anchor.row, anchor.col);
            let h = self.clamp(head.row, head.col);
            Selection {
                start: a.min(h),
                end: a.max(h),
            }
        })
    }

    /// Returns the selection endpoints and modified flag.
    pub fn marks(&self) -> Marks {
        Marks {
            anchor: self.anchor,
            head: self.head,
            modified: self.modified,
            saves: self.saves,
        }
    }

    /// Puts back the selection and modified flag captured in `marks`. A save since
    /// then leaves the document modified, as its text no longer matches the file.
    pub fn restore_marks(&mut self, marks: Marks) {
        self.anchor = marks.anchor;
        self.head = marks.head;
        self.modified = marks.modified || marks.saves != self.saves;
    }

    /// Returns the status fields for this document.
    pub fn status(&self) -> Status {
        let name = self
            .path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "[new]".to_string());
        Status {
            name,
            row: self.cursor.row + 1,
            col: self.cursor.col + 1,
            insert_mode: self.insert_mode,
            modified: self.modified,
            message: self.message.clone(),
        }
    }

    pub(crate) fn line_mut(&mut self, row: usize) -> &mut String {
        let row = row.min(self.lines.len() - 1);
        &mut self.lines[row]
    }

    pub(crate) fn insert_line(&mut self, row: usize, line: String) {
        let row = row.min(self.lines.len());
        self.lines.insert(row, line);
    }

    /// Removes and returns the line at `row`, unless it is the only line, in which
    /// case the line is emptied instead.
    pub(crate) fn remove_line(&mut self, row: usize) -> String {
        if self.lines.len() > 1 {
            let row = row.min(self.lines.len() - 1);
            self.lines.remove(row)
        } else {
            std::mem::take(&mut self.lines[0])
        }
    }

    /// Replaces all lines with `lines` and reclamps the cursor.
    pub(crate) fn replace_lines(&mut self, lines: Vec<String>) -> Vec<String> {
        let prior = std::mem::replace(&mut self.lines, Self::nonempty(lines));
        self.set_cursor(self.cursor.row, self.cursor.col);
        prior
    }

    fn nonempty(lines: Vec<String>) -> Vec<String> {
        if lines.is_empty() {
            vec![String::new()]
        } else {
            lines
        }
    }
}

impl Default for Document {
    fn default() -> Document {
        Document::new(vec![])
    }
}

/// Returns the column of the next word boundary in `line` starting at `col`.
pub fn word_boundary(line: &str, col: usize, forward: bool) -> usize {
    let chars = line.chars().collect::<Vec<_>>();
    let mut col = col.min(chars.len());
    if forward {
        while col < chars.len() && chars[col].is_whitespace() {
            col += 1;
        }
        while col < chars.len() && !chars[col].is_whitespace() {
            col += 1;
        }
    } else {
        while col > 0 && chars[col - 1].is_whitespace() {
            col -= 1;
        }
        while col > 0 && !chars[col - 1].is_whitespace() {
            col -= 1;
        }
    }
    col
}
