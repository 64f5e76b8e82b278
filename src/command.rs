//! Reversible editing commands and the undo/redo history.
//!
//! Every change to a [`Document`] is expressed as a [`Command`], a closed set of
//! variants that each capture just enough state to invert themselves. Commands are
//! run through a [`History`], which keeps bounded undo and redo stacks.

use crate::document::{Document, Marks};
use crate::etc;
use crate::pos::{Direction, Position};
use crate::search;
use std::collections::VecDeque;
use tracing::debug;

#[derive(Clone, Debug)]
pub enum Command {
    /// Moves the cursor, optionally extending the selection.
    Move {
        direction: Direction,
        amount: usize,
        select: bool,
        prior: Position,
    },

    /// Inserts or overwrites a single character at the cursor.
    InsertChar {
        c: char,
        prior: Position,
        replaced: Option<char>,
    },

    /// Removes the character or line break left of the cursor.
    Backspace {
        prior: Position,
        at: Position,
        removed: Option<Removed>,
    },

    /// Removes the character or line break right of the cursor.
    DeleteForward {
        prior: Position,
        removed: Option<Removed>,
    },

    /// Splits the line at the cursor, carrying the indentation onto the new line.
    SplitLine { prior: Position, indent: usize },

    /// Replaces every occurrence of a literal term across the document.
    ReplaceAll {
        term: String,
        replacement: String,
        case_strict: bool,
        count: usize,
        snapshot: Option<Snapshot>,
    },

    /// Replaces the document content with formatter output.
    Format {
        formatted: Vec<String>,
        snapshot: Option<Snapshot>,
    },

    /// Removes an inclusive span of rows.
    CutLines {
        start_row: usize,
        end_row: usize,
        snapshot: Option<Snapshot>,
    },

    /// Inserts text that may span multiple lines at the cursor.
    InsertText {
        text: String,
        prior: Position,
        end: Position,
    },
}

/// What a deletion took out of the document.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Removed {
    Char(char),
    LineBreak,
}

/// A copy of the document content and cursor for bulk commands.
#[derive(Clone, Debug)]
pub struct Snapshot {
    lines: Vec<String>,
    cursor: Position,
}

impl Snapshot {
    fn take(doc: &Document) -> Snapshot {
        Snapshot {
            lines: doc.lines().to_vec(),
            cursor: doc.cursor(),
        }
    }

    fn restore(&self, doc: &mut Document) {
        doc.replace_lines(self.lines.clone());
        doc.set_cursor(self.cursor.row, self.cursor.col);
    }
}

impl Command {
    pub fn move_cursor(direction: Direction, amount: usize, select: bool) -> Command {
        Command::Move {
            direction,
            amount,
            select,
            prior: Position::TOP,
        }
    }

    pub fn insert_char(c: char) -> Command {
        Command::InsertChar {
            c,
            prior: Position::TOP,
            replaced: None,
        }
    }

    pub fn backspace() -> Command {
        Command::Backspace {
            prior: Position::TOP,
            at: Position::TOP,
            removed: None,
        }
    }

    pub fn delete_forward() -> Command {
        Command::DeleteForward {
            prior: Position::TOP,
            removed: None,
        }
    }

    pub fn split_line() -> Command {
        Command::SplitLine {
            prior: Position::TOP,
            indent: 0,
        }
    }

    pub fn replace_all(term: &str, replacement: &str, case_strict: bool) -> Command {
        Command::ReplaceAll {
            term: term.to_string(),
            replacement: replacement.to_string(),
            case_strict,
            count: 0,
            snapshot: None,
        }
    }

    pub fn format(formatted: Vec<String>) -> Command {
        Command::Format {
            formatted,
            snapshot: None,
        }
    }

    pub fn cut_lines(start_row: usize, end_row: usize) -> Command {
        Command::CutLines {
            start_row: start_row.min(end_row),
            end_row: start_row.max(end_row),
            snapshot: None,
        }
    }

    pub fn insert_text(text: &str) -> Command {
        Command::InsertText {
            text: text.to_string(),
            prior: Position::TOP,
            end: Position::TOP,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Move { .. } => "move",
            Command::InsertChar { .. } => "insert-char",
            Command::Backspace { .. } => "backspace",
            Command::DeleteForward { .. } => "delete-forward",
            Command::SplitLine { .. } => "split-line",
            Command::ReplaceAll { .. } => "replace-all",
            Command::Format { .. } => "format",
            Command::CutLines { .. } => "cut-lines",
            Command::InsertText { .. } => "insert-text",
        }
    }

    /// Runs the forward action of this command against `doc`.
    pub fn apply(&mut self, doc: &mut Document) {
        match self {
            Command::Move {
                direction,
                amount,
                select,
                prior,
            } => {
                *prior = doc.cursor();
                if *select {
                    doc.update_selection();
                    doc.move_cursor(*direction, *amount);
                    doc.update_selection();
                } else {
                    doc.move_cursor(*direction, *amount);
                    doc.clear_selection();
                }
            }
            Command::InsertChar { c, prior, replaced } => {
                let cur = doc.cursor();
                *prior = cur;
                let insert = doc.insert_mode();
                let line = doc.line_mut(cur.row);
                *replaced = if insert {
                    etc::insert_at(line, cur.col, &c.to_string());
                    None
                } else {
                    etc::overwrite_at(line, cur.col, *c)
                };
                doc.set_cursor(cur.row, cur.col + 1);
                doc.mark_modified();
                doc.clear_selection();
            }
            Command::Backspace { prior, at, removed } => {
                let cur = doc.cursor();
                *prior = cur;
                *removed = if cur.col > 0 {
                    let c = etc::remove_at(doc.line_mut(cur.row), cur.col - 1);
                    *at = doc.set_cursor(cur.row, cur.col - 1);
                    c.map(Removed::Char)
                } else if cur.row > 0 {
                    let line = doc.remove_line(cur.row);
                    let join_col = doc.line_len(cur.row - 1);
                    doc.line_mut(cur.row - 1).push_str(&line);
                    *at = doc.set_cursor(cur.row - 1, join_col);
                    Some(Removed::LineBreak)
                } else {
                    *at = cur;
                    None
                };
                if removed.is_some() {
                    doc.mark_modified();
                }
                doc.clear_selection();
            }
            Command::DeleteForward { prior, removed } => {
                let cur = doc.cursor();
                *prior = cur;
                *removed = if cur.col < doc.line_len(cur.row) {
                    etc::remove_at(doc.line_mut(cur.row), cur.col).map(Removed::Char)
                } else if cur.row + 1 < doc.line_count() {
                    let line = doc.remove_line(cur.row + 1);
                    doc.line_mut(cur.row).push_str(&line);
                    Some(Removed::LineBreak)
                } else {
                    None
                };
                if removed.is_some() {
                    doc.mark_modified();
                }
                doc.clear_selection();
            }
            Command::SplitLine { prior, indent } => {
                let cur = doc.cursor();
                *prior = cur;
                let line = doc.line_mut(cur.row);
                let lead = line
                    .chars()
                    .take_while(|c| c.is_whitespace())
                    .collect::<String>();
                let rest = etc::split_off_at(line, cur.col);
                *indent = etc::char_len(&lead);
                doc.insert_line(cur.row + 1, lead + &rest);
                doc.set_cursor(cur.row + 1, *indent);
                doc.mark_modified();
                doc.clear_selection();
            }
            Command::ReplaceAll {
                term,
                replacement,
                case_strict,
                count,
                snapshot,
            } => {
                *snapshot = Some(Snapshot::take(doc));
                let mut total = 0;
                let lines = doc
                    .lines()
                    .iter()
                    .map(|line| {
                        let (text, n) = search::replace_term(line, term, replacement, *case_strict);
                        total += n;
                        text
                    })
                    .collect::<Vec<_>>();
                *count = total;
                if total > 0 {
                    doc.replace_lines(lines);
                    doc.mark_modified();
                }
                doc.clear_selection();
            }
            Command::Format {
                formatted,
                snapshot,
            } => {
                *snapshot = Some(Snapshot::take(doc));
                doc.replace_lines(formatted.clone());
                doc.mark_modified();
                doc.clear_selection();
            }
            Command::CutLines {
                start_row,
                end_row,
                snapshot,
            } => {
                *snapshot = Some(Snapshot::take(doc));
                if *start_row >= doc.line_count() {
                    return;
                }
                let end = (*end_row).min(doc.line_count() - 1);
                for _ in *start_row..=end {
                    doc.remove_line(*start_row);
                }
                doc.set_cursor(*start_row, 0);
                doc.mark_modified();
                doc.clear_selection();
            }
            Command::InsertText { text, prior, end } => {
                let cur = doc.cursor();
                *prior = cur;
                let mut segs = text.split('\n');
                let first = segs.next().unwrap_or("");
                let rest = etc::split_off_at(doc.line_mut(cur.row), cur.col);
                doc.line_mut(cur.row).push_str(first);
                let mut row = cur.row;
                let mut col = cur.col + etc::char_len(first);
                for seg in segs {
                    row += 1;
                    col = etc::char_len(seg);
                    doc.insert_line(row, seg.to_string());
                }
                doc.line_mut(row).push_str(&rest);
                *end = doc.set_cursor(row, col);
                doc.mark_modified();
                doc.clear_selection();
            }
        }
    }

    /// Runs the inverse action of this command against `doc`, which is expected to
    /// be in the state left by [`apply`](Self::apply).
    pub fn revert(&mut self, doc: &mut Document) {
        match self {
            Command::Move { prior, .. } => {
                doc.set_cursor(prior.row, prior.col);
            }
            Command::InsertChar {
                prior, replaced, ..
            } => {
                let line = doc.line_mut(prior.row);
                etc::remove_at(line, prior.col);
                if let Some(c) = replaced {
                    etc::insert_at(line, prior.col, &c.to_string());
                }
                doc.set_cursor(prior.row, prior.col);
            }
            Command::Backspace { prior, at, removed } => {
                match removed {
                    Some(Removed::Char(c)) => {
                        etc::insert_at(doc.line_mut(at.row), at.col, &c.to_string());
                    }
                    Some(Removed::LineBreak) => {
                        let rest = etc::split_off_at(doc.line_mut(at.row), at.col);
                        doc.insert_line(at.row + 1, rest);
                    }
                    None => (),
                }
                doc.set_cursor(prior.row, prior.col);
            }
            Command::DeleteForward { prior, removed } => {
                match removed {
                    Some(Removed::Char(c)) => {
                        etc::insert_at(doc.line_mut(prior.row), prior.col, &c.to_string());
                    }
                    Some(Removed::LineBreak) => {
                        let rest = etc::split_off_at(doc.line_mut(prior.row), prior.col);
                        doc.insert_line(prior.row + 1, rest);
                    }
                    None => (),
                }
                doc.set_cursor(prior.row, prior.col);
            }
            Command::SplitLine { prior, indent } => {
                let line = doc.remove_line(prior.row + 1);
                let rest = line.chars().skip(*indent).collect::<String>();
                doc.line_mut(prior.row).push_str(&rest);
                doc.set_cursor(prior.row, prior.col);
            }
            Command::ReplaceAll { snapshot, .. }
            | Command::Format { snapshot, .. }
            | Command::CutLines { snapshot, .. } => {
                if let Some(snapshot) = snapshot {
                    snapshot.restore(doc);
                }
            }
            Command::InsertText { prior, end, .. } => {
                let tail = etc::split_off_at(doc.line_mut(end.row), end.col);
                for _ in prior.row..end.row {
                    doc.remove_line(prior.row + 1);
                }
                let line = doc.line_mut(prior.row);
                etc::split_off_at(line, prior.col);
                line.push_str(&tail);
                doc.set_cursor(prior.row, prior.col);
            }
        }
    }
}

/// Bounded undo and redo stacks of executed commands.
///
/// Each entry keeps the [`Marks`] of the document from just before the command ran,
/// so an undo also restores the selection and the modified flag.
pub struct History {
    undo: VecDeque<Entry>,
    redo: VecDeque<Entry>,
    limit: usize,
}

struct Entry {
    cmd: Command,
    marks: Marks,
}

impl History {
    pub const DEFAULT_LIMIT: usize = 100;

    pub fn new(limit: usize) -> History {
        History {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            limit,
        }
    }

    /// Applies `cmd` to `doc` and records it for undo, discarding any redo history.
    pub fn execute(&mut self, mut cmd: Command, doc: &mut Document) {
        debug!(command = cmd.name(), "execute");
        let marks = doc.marks();
        cmd.apply(doc);
        Self::push(&mut self.undo, Entry { cmd, marks }, self.limit);
        self.redo.clear();
    }

    /// Reverts the most recent command, returning `false` if there was nothing to
    /// undo.
    pub fn undo(&mut self, doc: &mut Document) -> bool {
        if let Some(mut entry) = self.undo.pop_back() {
            debug!(command = entry.cmd.name(), "undo");
            entry.cmd.revert(doc);
            doc.restore_marks(entry.marks);
            Self::push(&mut self.redo, entry, self.limit);
            true
        } else {
            false
        }
    }

    /// Reapplies the most recently undone command, returning `false` if there was
    /// nothing to redo.
    pub fn redo(&mut self, doc: &mut Document) -> bool {
        if let Some(Entry { mut cmd, .. }) = self.redo.pop_back() {
            debug!(command = cmd.name(), "redo");
            let marks = doc.marks();
            cmd.apply(doc);
            Self::push(&mut self.undo, Entry { cmd, marks }, self.limit);
            true
        } else {
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        self.undo.len() > 0
    }

    pub fn can_redo(&self) -> bool {
        self.redo.len() > 0
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Returns the most recently executed or redone command.
    pub fn last(&self) -> Option<&Command> {
        self.undo.back().map(|entry| &entry.cmd)
    }

    fn push(stack: &mut VecDeque<Entry>, entry: Entry, limit: usize) {
        stack.push_back(entry);
        while stack.len() > limit {
            if let Some(evicted) = stack.pop_front() {
                debug!(command = evicted.cmd.name(), "evicted from history");
            }
        }
    }
}

impl Default for History {
    fn default() -> History {
        History::new(Self::DEFAULT_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn build_doc(lines: &[&str]) -> Document {
        Document::new(lines.iter().map(|l| l.to_string()).collect())
    }

    fn run(doc: &mut Document, cmd: Command) -> History {
        let mut history = History::default();
        history.execute(cmd, doc);
        history
    }

    #[test]
    fn insert_char_in_insert_mode() {
        let mut doc = build_doc(&["hello"]);
        doc.set_cursor(0, 2);
        let mut history = run(&mut doc, Command::insert_char('X'));
        assert_eq!(doc.lines(), ["heXllo"]);
        assert_eq!(doc.cursor(), Position::new(0, 3));
        assert!(doc.is_modified());
        history.undo(&mut doc);
        assert_eq!(doc.lines(), ["hello"]);
        assert_eq!(doc.cursor(), Position::new(0, 2));
    }

    #[test]
    fn undo_restores_modified_and_selection() {
        let mut doc = build_doc(&["hello"]);
        doc.begin_selection();
        doc.set_cursor(0, 3);
        doc.update_selection();
        let mut history = run(&mut doc, Command::insert_char('X'));
        assert!(doc.is_modified());
        assert!(!doc.has_selection());
        history.undo(&mut doc);
        assert!(!doc.is_modified());
        assert_eq!(
            doc.selection().map(|sel| (sel.start, sel.end)),
            Some((Position::TOP, Position::new(0, 3)))
        );
        history.redo(&mut doc);
        assert!(doc.is_modified());
        assert_eq!(doc.lines(), ["helXlo"]);
    }

    #[test]
    fn undo_after_save_stays_modified() {
        let mut doc = build_doc(&["abc"]);
        let mut history = run(&mut doc, Command::insert_char('X'));
        doc.mark_saved();
        history.undo(&mut doc);
        assert_eq!(doc.lines(), ["abc"]);
        assert!(doc.is_modified());
    }

    #[test]
    fn insert_char_in_overwrite_mode() {
        let mut doc = build_doc(&["abc"]);
        doc.toggle_insert_mode();
        doc.set_cursor(0, 1);
        let mut history = run(&mut doc, Command::insert_char('Z'));
        assert_eq!(doc.lines(), ["aZc"]);
        history.undo(&mut doc);
        assert_eq!(doc.lines(), ["abc"]);

        doc.set_cursor(0, 3);
        history.execute(Command::insert_char('!'), &mut doc);
        assert_eq!(doc.lines(), ["abc!"]);
        assert_eq!(doc.cursor(), Position::new(0, 4));
        history.undo(&mut doc);
        assert_eq!(doc.lines(), ["abc"]);
        assert_eq!(doc.cursor(), Position::new(0, 3));
    }

    #[test]
    fn backspace_char_and_merge() {
        let mut doc = build_doc(&["ab", "cd"]);
        doc.set_cursor(1, 1);
        let mut history = run(&mut doc, Command::backspace());
        assert_eq!(doc.lines(), ["ab", "d"]);
        assert_eq!(doc.cursor(), Position::new(1, 0));

        history.execute(Command::backspace(), &mut doc);
        assert_eq!(doc.lines(), ["abd"]);
        assert_eq!(doc.cursor(), Position::new(0, 2));

        history.undo(&mut doc);
        assert_eq!(doc.lines(), ["ab", "d"]);
        assert_eq!(doc.cursor(), Position::new(1, 0));
        history.undo(&mut doc);
        assert_eq!(doc.lines(), ["ab", "cd"]);
        assert_eq!(doc.cursor(), Position::new(1, 1));
    }

    #[test]
    fn backspace_at_top_does_nothing() {
        let mut doc = build_doc(&["ab"]);
        let mut history = run(&mut doc, Command::backspace());
        assert_eq!(doc.lines(), ["ab"]);
        assert!(!doc.is_modified());
        assert!(history.undo(&mut doc));
        assert_eq!(doc.lines(), ["ab"]);
    }

    #[test]
    fn delete_forward_char_and_merge() {
        let mut doc = build_doc(&["ab", "cd"]);
        doc.set_cursor(0, 1);
        let mut history = run(&mut doc, Command::delete_forward());
        assert_eq!(doc.lines(), ["a", "cd"]);
        assert_eq!(doc.cursor(), Position::new(0, 1));

        history.execute(Command::delete_forward(), &mut doc);
        assert_eq!(doc.lines(), ["acd"]);
        assert_eq!(doc.cursor(), Position::new(0, 1));

        history.undo(&mut doc);
        history.undo(&mut doc);
        assert_eq!(doc.lines(), ["ab", "cd"]);
        assert_eq!(doc.cursor(), Position::new(0, 1));
    }

    #[test]
    fn delete_forward_at_end_does_nothing() {
        let mut doc = build_doc(&["ab"]);
        doc.set_cursor(0, 2);
        run(&mut doc, Command::delete_forward());
        assert_eq!(doc.lines(), ["ab"]);
        assert!(!doc.is_modified());
    }

    #[test]
    fn split_line_keeps_indent() {
        let mut doc = build_doc(&["  foobar"]);
        doc.set_cursor(0, 5);
        let mut history = run(&mut doc, Command::split_line());
        assert_eq!(doc.lines(), ["  foo", "  bar"]);
        assert_eq!(doc.cursor(), Position::new(1, 2));
        history.undo(&mut doc);
        assert_eq!(doc.lines(), ["  foobar"]);
        assert_eq!(doc.cursor(), Position::new(0, 5));
    }

    #[test]
    fn split_line_inside_indent() {
        let mut doc = build_doc(&["  foo"]);
        doc.set_cursor(0, 1);
        let mut history = run(&mut doc, Command::split_line());
        assert_eq!(doc.lines(), [" ", "   foo"]);
        history.undo(&mut doc);
        assert_eq!(doc.lines(), ["  foo"]);
    }

    #[test]
    fn move_with_and_without_select() {
        let mut doc = build_doc(&["abcdef", "ghijkl"]);
        doc.set_cursor(0, 1);
        let mut history = run(&mut doc, Command::move_cursor(Direction::Right, 3, true));
        let sel = doc.selection().unwrap();
        assert_eq!(sel.start, Position::new(0, 1));
        assert_eq!(sel.end, Position::new(0, 4));

        history.execute(Command::move_cursor(Direction::Down, 1, true), &mut doc);
        assert_eq!(doc.selection().unwrap().end, Position::new(1, 4));

        history.execute(Command::move_cursor(Direction::Left, 1, false), &mut doc);
        assert!(doc.selection().is_none());
        history.undo(&mut doc);
        assert_eq!(doc.cursor(), Position::new(1, 4));
    }

    #[test]
    fn replace_all_preserves_unmatched_case() {
        let mut doc = build_doc(&["Foo foo FOO", "Bar"]);
        let mut history = run(&mut doc, Command::replace_all("foo", "x", false));
        assert_eq!(doc.lines(), ["x x x", "Bar"]);
        match history.last() {
            Some(Command::ReplaceAll { count, .. }) => assert_eq!(*count, 3),
            _ => panic!("expected replace-all"),
        }
        history.undo(&mut doc);
        assert_eq!(doc.lines(), ["Foo foo FOO", "Bar"]);

        history.execute(Command::replace_all("foo", "x", true), &mut doc);
        assert_eq!(doc.lines(), ["Foo x FOO", "Bar"]);
    }

    #[test]
    fn format_and_restore() {
        let mut doc = build_doc(&["a=1", "b=2"]);
        doc.set_cursor(1, 3);
        let formatted = vec!["a = 1".to_string()];
        let mut history = run(&mut doc, Command::format(formatted));
        assert_eq!(doc.lines(), ["a = 1"]);
        assert_eq!(doc.cursor(), Position::new(0, 5));
        history.undo(&mut doc);
        assert_eq!(doc.lines(), ["a=1", "b=2"]);
        assert_eq!(doc.cursor(), Position::new(1, 3));
    }

    #[test]
    fn cut_lines_and_restore() {
        let mut doc = build_doc(&["one", "two", "three"]);
        let mut history = run(&mut doc, Command::cut_lines(2, 1));
        assert_eq!(doc.lines(), ["one"]);
        assert_eq!(doc.cursor(), Position::new(0, 0));
        history.undo(&mut doc);
        assert_eq!(doc.lines(), ["one", "two", "three"]);

        history.execute(Command::cut_lines(0, 2), &mut doc);
        assert_eq!(doc.lines(), [""]);
    }

    #[test]
    fn cut_lines_past_end_changes_nothing() {
        let mut doc = build_doc(&["one", "two"]);
        doc.set_cursor(1, 2);
        let mut history = run(&mut doc, Command::cut_lines(4, 5));
        assert_eq!(doc.lines(), ["one", "two"]);
        assert_eq!(doc.cursor(), Position::new(1, 2));
        assert!(!doc.is_modified());
        history.undo(&mut doc);
        assert_eq!(doc.lines(), ["one", "two"]);
    }

    #[test]
    fn insert_multiline_text() {
        let mut doc = build_doc(&["head tail"]);
        doc.set_cursor(0, 5);
        let mut history = run(&mut doc, Command::insert_text("one\ntwo\nthree "));
        assert_eq!(doc.lines(), ["head one", "two", "three tail"]);
        assert_eq!(doc.cursor(), Position::new(2, 6));
        history.undo(&mut doc);
        assert_eq!(doc.lines(), ["head tail"]);
        assert_eq!(doc.cursor(), Position::new(0, 5));
    }

    #[test]
    fn history_capacity_evicts_oldest() {
        let mut doc = Document::default();
        let mut history = History::new(100);
        for _ in 0..101 {
            history.execute(Command::insert_char('a'), &mut doc);
        }
        assert_eq!(history.undo_len(), 100);
        for _ in 0..100 {
            assert!(history.undo(&mut doc));
        }
        assert!(!history.undo(&mut doc));
        assert_eq!(doc.lines(), ["a"]);
    }

    #[test]
    fn fresh_execute_clears_redo() {
        let mut doc = Document::default();
        let mut history = History::default();
        history.execute(Command::insert_char('A'), &mut doc);
        history.execute(Command::insert_char('B'), &mut doc);
        history.undo(&mut doc);
        assert!(history.can_redo());
        history.execute(Command::insert_char('C'), &mut doc);
        assert!(!history.can_redo());
        assert!(!history.redo(&mut doc));
        assert_eq!(doc.lines(), ["AC"]);
    }

    #[test]
    fn undo_then_redo() {
        let mut doc = build_doc(&["x"]);
        let mut history = History::default();
        assert!(!history.undo(&mut doc));
        assert!(!history.redo(&mut doc));
        history.execute(Command::split_line(), &mut doc);
        history.undo(&mut doc);
        assert_eq!(doc.lines(), ["x"]);
        assert!(history.redo(&mut doc));
        assert_eq!(doc.lines(), ["", "x"]);
        assert_eq!(doc.cursor(), Position::new(1, 0));
    }

    fn command() -> impl Strategy<Value = Command> {
        let dir = prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ];
        prop_oneof![
            (dir, 0usize..5, any::<bool>())
                .prop_map(|(d, n, select)| Command::move_cursor(d, n, select)),
            "[a-z é]".prop_map(|s| Command::insert_char(s.chars().next().unwrap_or('a'))),
            Just(Command::backspace()),
            Just(Command::delete_forward()),
            Just(Command::split_line()),
            ("[ab]{1,2}", "[xy]{0,3}", any::<bool>())
                .prop_map(|(t, r, case)| Command::replace_all(&t, &r, case)),
            prop::collection::vec("[a-z ]{0,6}", 0..4).prop_map(Command::format),
            (0usize..6, 0usize..6).prop_map(|(a, b)| Command::cut_lines(a, b)),
            "[a-z\n]{0,8}".prop_map(|t| Command::insert_text(&t)),
        ]
    }

    proptest! {
        #[test]
        fn undo_restores_exact_state(
            lines in prop::collection::vec("[ abAB]{0,8}", 1..6),
            cursor in (0usize..8, 0usize..10),
            overwrite in any::<bool>(),
            select in any::<bool>(),
            cmd in command(),
        ) {
            let mut doc = Document::new(lines);
            if overwrite {
                doc.toggle_insert_mode();
            }
            doc.set_cursor(cursor.0, cursor.1);
            if select {
                doc.begin_selection();
                doc.move_cursor(Direction::Right, 1);
                doc.update_selection();
            }
            let before = (doc.lines().to_vec(), doc.cursor(), doc.marks());

            let mut history = History::default();
            history.execute(cmd, &mut doc);
            prop_assert!(doc.cursor().row < doc.line_count());
            prop_assert!(doc.cursor().col <= doc.line_len(doc.cursor().row));
            history.undo(&mut doc);
            prop_assert_eq!((doc.lines().to_vec(), doc.cursor(), doc.marks()), before);
        }
    }
}
