//! Editor.
//!
//! An [`Editor`] combines a document with everything needed to edit it: the undo
//! history, the display mapping and viewport, an interactive search session, a
//! highlighter bound to the shared syntax registry, a formatter, and a cut buffer.
//! It is the surface that an input loop drives, one operation per user action.

use crate::color::Color;
use crate::command::{Command, History};
use crate::config::Configuration;
use crate::display::{self, DisplayLine, DisplayMap, Size, Viewport};
use crate::document::{Document, Status};
use crate::error::{Error, Result};
use crate::format::{CommandFormatter, Formatter, Identity};
use crate::io;
use crate::pos::{Direction, Position};
use crate::search::{SearchSession, Summary};
use crate::syntax::Registry;
use crate::sys::AsString;
use crate::token::{Highlighter, Span};
use crate::wrap::Wrapper;
use std::io::ErrorKind;
use std::path::Path;
use tracing::warn;

pub struct Editor<'r> {
    doc: Document,
    history: History,
    wrapper: Wrapper,
    viewport: Viewport,
    search: SearchSession,
    highlighter: Highlighter<'r>,
    formatter: Box<dyn Formatter>,
    cut_buffer: Option<String>,
}

impl<'r> Editor<'r> {
    /// Creates an editor for `doc` using the settings, colors and formatters in
    /// `config` along with the syntax definitions in `registry`.
    pub fn new(mut doc: Document, config: &'r Configuration, registry: &'r Registry) -> Editor<'r> {
        let settings = &config.settings;
        if doc.insert_mode() != settings.insert_mode {
            doc.toggle_insert_mode();
        }
        Editor {
            doc,
            history: History::new(settings.undo_limit),
            wrapper: Wrapper::new(settings.wrap_cache_size),
            viewport: Viewport::new(Size::new(settings.height, settings.width)),
            search: SearchSession::new(settings.search_options(), settings.search_history_size),
            highlighter: Highlighter::new(registry, &config.theme),
            formatter: if config.formatters.is_empty() {
                Box::new(Identity)
            } else {
                Box::new(CommandFormatter::new(config.formatters.clone()))
            },
            cut_buffer: None,
        }
    }

    /// Creates an editor for the file at `path`, which need not exist. The language
    /// is derived from the file extension.
    pub fn open<P: AsRef<Path>>(
        path: P,
        config: &'r Configuration,
        registry: &'r Registry,
    ) -> Editor<'r> {
        let path = path.as_ref();
        let language = registry.language_for(path);
        let (lines, line_ending) = io::load(path);
        let doc = Document::new(lines)
            .with_path(path, language.as_deref())
            .with_line_ending(line_ending);
        Editor::new(doc, config, registry)
    }

    /// Replaces the formatter.
    pub fn with_formatter(mut self, formatter: Box<dyn Formatter>) -> Editor<'r> {
        self.formatter = formatter;
        self
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn search(&self) -> &SearchSession {
        &self.search
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn cut_buffer(&self) -> Option<&str> {
        self.cut_buffer.as_deref()
    }

    pub fn status(&self) -> Status {
        self.doc.status()
    }

    pub fn search_summary(&self) -> Summary {
        self.search.summary()
    }

    pub fn clear_message(&mut self) {
        self.doc.clear_message();
    }

    // --- editing ---

    /// Inserts `c` at the cursor, treating a line feed as [`enter`](Self::enter).
    pub fn insert_char(&mut self, c: char) {
        if c == '\n' {
            self.enter();
        } else {
            self.execute(Command::insert_char(c));
        }
    }

    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars() {
            self.insert_char(c);
        }
    }

    pub fn backspace(&mut self) {
        self.execute(Command::backspace());
    }

    pub fn delete(&mut self) {
        self.execute(Command::delete_forward());
    }

    pub fn enter(&mut self) {
        self.execute(Command::split_line());
    }

    pub fn toggle_insert_mode(&mut self) -> bool {
        self.doc.toggle_insert_mode()
    }

    pub fn undo(&mut self) -> bool {
        let done = self.history.undo(&mut self.doc);
        if !done {
            self.doc.set_message("nothing to undo");
        }
        self.scroll();
        done
    }

    pub fn redo(&mut self) -> bool {
        let done = self.history.redo(&mut self.doc);
        if !done {
            self.doc.set_message("nothing to redo");
        }
        self.scroll();
        done
    }

    /// Removes the rows spanned by the selection, or the cursor row if nothing is
    /// selected, and keeps them in the cut buffer.
    pub fn cut_lines(&mut self) {
        let rows = self
            .doc
            .selection()
            .map(|sel| sel.rows())
            .unwrap_or(self.doc.cursor().row..=self.doc.cursor().row);
        let (start, end) = (*rows.start(), *rows.end());
        let mut text = self.doc.lines()[start..=end].join("\n");
        text.push('\n');
        self.cut_buffer = Some(text);
        self.execute(Command::cut_lines(start, end));
        let n = end - start + 1;
        self.doc
            .set_message(&format!("cut {n} line{}", if n == 1 { "" } else { "s" }));
    }

    /// Inserts the contents of the cut buffer at the cursor.
    pub fn paste(&mut self) -> bool {
        match self.cut_buffer.clone() {
            Some(text) => {
                self.execute(Command::insert_text(&text));
                true
            }
            None => {
                self.doc.set_message("cut buffer is empty");
                false
            }
        }
    }

    /// Replaces every occurrence of `term` with `replacement` across the whole
    /// document, returning the number of replacements.
    pub fn replace_all(&mut self, term: &str, replacement: &str, case_strict: bool) -> usize {
        self.execute(Command::replace_all(term, replacement, case_strict));
        let count = match self.history.last() {
            Some(Command::ReplaceAll { count, .. }) => *count,
            _ => 0,
        };
        self.doc
            .set_message(&format!("replaced {count} occurrence(s) of '{term}'"));
        if self.search.is_active() {
            self.search.search(&self.doc);
        }
        count
    }

    /// Formats the document, leaving it unchanged and reporting the reason in the
    /// status message if the formatter fails.
    pub fn format(&mut self) -> bool {
        if !self.formatter.handles(self.doc.language()) {
            let msg = match self.doc.language() {
                Some(lang) => format!("no formatter configured for {lang}"),
                None => "no formatter configured".to_string(),
            };
            self.doc.set_message(&msg);
            return false;
        }
        match self.formatter.format(self.doc.lines(), self.doc.language()) {
            Ok(lines) if lines == self.doc.lines() => {
                self.doc.set_message("already formatted");
                false
            }
            Ok(lines) => {
                self.execute(Command::format(lines));
                self.doc.set_message("formatted");
                true
            }
            Err(e) => {
                warn!("{e}");
                self.doc.set_message(&e.to_string());
                false
            }
        }
    }

    /// Writes the document to its file, returning the number of bytes written.
    pub fn save(&mut self) -> Result<usize> {
        let path = self.doc.path().map(|p| p.to_path_buf()).ok_or_else(|| {
            Error::io(
                "[new]",
                std::io::Error::new(ErrorKind::NotFound, "no file path"),
            )
        })?;
        let n = io::write_file(&path, self.doc.lines(), self.doc.line_ending())?;
        self.doc.mark_saved();
        self.doc
            .set_message(&format!("{}: wrote {n} bytes", path.as_string()));
        Ok(n)
    }

    fn execute(&mut self, cmd: Command) {
        self.history.execute(cmd, &mut self.doc);
        self.scroll();
    }

    // --- navigation ---

    /// Moves the cursor `amount` steps in `direction`, extending the selection if
    /// `select` is `true` and clearing it otherwise.
    pub fn move_cursor(&mut self, direction: Direction, amount: usize, select: bool) -> Position {
        Command::move_cursor(direction, amount, select).apply(&mut self.doc);
        self.scroll();
        self.doc.cursor()
    }

    pub fn move_home(&mut self, select: bool) -> Position {
        self.navigate(select, Document::move_home)
    }

    pub fn move_end(&mut self, select: bool) -> Position {
        self.navigate(select, Document::move_end)
    }

    pub fn move_top(&mut self, select: bool) -> Position {
        self.navigate(select, Document::move_top)
    }

    pub fn move_bottom(&mut self, select: bool) -> Position {
        self.navigate(select, Document::move_bottom)
    }

    pub fn move_word_left(&mut self, select: bool) -> Position {
        self.navigate(select, Document::move_word_left)
    }

    pub fn move_word_right(&mut self, select: bool) -> Position {
        self.navigate(select, Document::move_word_right)
    }

    pub fn page_up(&mut self, select: bool) -> Position {
        self.move_cursor(Direction::Up, self.viewport.height(), select)
    }

    pub fn page_down(&mut self, select: bool) -> Position {
        self.move_cursor(Direction::Down, self.viewport.height(), select)
    }

    /// Moves the cursor to the `1`-based position in `value`, returning `None` if
    /// `value` is malformed.
    pub fn goto(&mut self, value: &str) -> Option<Position> {
        let pos = Position::parse(value)?;
        self.doc.clear_selection();
        self.doc.set_cursor(pos.row, pos.col);
        self.scroll();
        Some(self.doc.cursor())
    }

    fn navigate<F>(&mut self, select: bool, f: F) -> Position
    where
        F: FnOnce(&mut Document) -> Position,
    {
        if select {
            self.doc.update_selection();
            f(&mut self.doc);
            self.doc.update_selection();
        } else {
            f(&mut self.doc);
            self.doc.clear_selection();
        }
        self.scroll();
        self.doc.cursor()
    }

    // --- search ---

    /// Starts a search session, scoped to the selected rows if a selection exists.
    pub fn search_begin(&mut self) {
        self.search.begin();
        self.search.set_term("");
        self.search.options_mut().in_selection = self.doc.has_selection();
        self.search.search(&self.doc);
    }

    /// Replaces the search term and returns the number of matches.
    pub fn search_set_term(&mut self, term: &str) -> usize {
        self.search.set_term(term);
        self.search.search(&self.doc)
    }

    /// Appends `c` to the search term, refreshing matches when searching is
    /// incremental.
    pub fn search_input(&mut self, c: char) -> usize {
        self.search.push_char(c);
        self.refresh_search()
    }

    pub fn search_backspace(&mut self) -> usize {
        if self.search.pop_char().is_some() {
            self.refresh_search()
        } else {
            self.search.matches().len()
        }
    }

    pub fn search_toggle_case(&mut self) -> usize {
        let opts = self.search.options_mut();
        opts.case_strict = !opts.case_strict;
        self.search.search(&self.doc)
    }

    pub fn search_toggle_word(&mut self) -> usize {
        let opts = self.search.options_mut();
        opts.whole_word = !opts.whole_word;
        self.search.search(&self.doc)
    }

    pub fn search_toggle_regex(&mut self) -> usize {
        let opts = self.search.options_mut();
        opts.regex = !opts.regex;
        self.search.search(&self.doc)
    }

    /// Moves the cursor to the next match, recording the term in history.
    pub fn search_next(&mut self) -> Option<Position> {
        self.refresh_if_stale();
        let pos = self.search.next_match()?;
        self.goto_match(pos)
    }

    /// Moves the cursor to the previous match, recording the term in history.
    pub fn search_previous(&mut self) -> Option<Position> {
        self.refresh_if_stale();
        let pos = self.search.previous_match()?;
        self.goto_match(pos)
    }

    /// Recalls the previous term in search history and searches for it.
    pub fn search_history_previous(&mut self) -> Option<usize> {
        let term = self.search.previous_search()?.to_string();
        Some(self.search_set_term(&term))
    }

    /// Recalls the next term in search history and searches for it.
    pub fn search_history_next(&mut self) -> Option<usize> {
        let term = self.search.next_search()?.to_string();
        Some(self.search_set_term(&term))
    }

    /// Ends the search session.
    pub fn search_reset(&mut self) {
        self.search.reset();
    }

    fn refresh_search(&mut self) -> usize {
        if self.search.options().incremental {
            self.search.search(&self.doc)
        } else {
            self.search.matches().len()
        }
    }

    fn refresh_if_stale(&mut self) {
        if self.search.matches().is_empty() && !self.search.term().is_empty() {
            self.search.search(&self.doc);
        }
    }

    fn goto_match(&mut self, pos: Position) -> Option<Position> {
        self.search.commit();
        self.doc.set_cursor(pos.row, pos.col);
        self.scroll();
        Some(self.doc.cursor())
    }

    // --- display ---

    pub fn resize(&mut self, size: Size) {
        self.viewport.resize(size);
        self.scroll();
    }

    /// Returns the display lines of the whole document at the viewport width.
    pub fn display_map(&mut self) -> DisplayMap {
        DisplayMap::build(&mut self.wrapper, self.doc.lines(), self.viewport.width())
    }

    /// Returns the display lines inside the viewport.
    pub fn visible_lines(&mut self) -> Vec<DisplayLine> {
        let map = self.display_map();
        map.window(&self.viewport).to_vec()
    }

    /// Returns the index of the display line holding the cursor, which is the first
    /// display line of the cursor row.
    pub fn cursor_display_line(&mut self) -> usize {
        display::display_index(
            &mut self.wrapper,
            self.doc.lines(),
            self.doc.cursor().row,
            self.viewport.width(),
        )
    }

    /// Returns the highlight spans of `text` in the language of the document, paired
    /// with their theme colors.
    pub fn colorize<'a>(&self, text: &'a str) -> Vec<(Color, Span<'a>)> {
        self.highlighter.colorize(text, self.doc.language())
    }

    /// Adjusts the viewport so that the cursor line is visible.
    fn scroll(&mut self) {
        let width = self.viewport.width();
        let line = self.cursor_display_line();
        let total = display::display_index(
            &mut self.wrapper,
            self.doc.lines(),
            self.doc.line_count(),
            width,
        );
        self.viewport.scroll_to(line, total);
    }
}
