//! Text searching.
//!
//! Patterns come in two flavors: literal terms matched with Boyer-Moore, and regular
//! expressions. A [`SearchSession`] ties a pattern to a document, collecting every
//! occurrence and tracking which one is current as the user steps through them.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::etc;
use crate::pos::Position;
use regex_lite::{Regex, RegexBuilder};
use std::collections::{HashMap, VecDeque};
use std::fmt::{self, Display, Formatter};
use std::ops::{Range, RangeInclusive};
use tracing::debug;

/// Defines an interface for a pattern-matching algorithm.
pub trait Pattern {
    /// Returns every match in `buffer` from left to right.
    fn find_all(&self, buffer: &str) -> Vec<Match>;
}

/// Represents a pattern match, where the first value is the _starting_ character
/// position and the second value is the _ending_ character position.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Match(pub usize, pub usize);

/// Returns a pattern-matching algorithm using `term` as the search string, and
/// `case_strict` to indicate the sensitivity of case when searching.
pub fn using_term(term: &str, case_strict: bool) -> Box<dyn Pattern> {
    Box::new(TermPattern::new(term, case_strict))
}

/// Returns a pattern-matching algorithm that compiles `term` as a regular expression.
pub fn using_regex(term: &str, case_strict: bool) -> Result<Box<dyn Pattern>> {
    let regex = RegexBuilder::new(term)
        .case_insensitive(!case_strict)
        .build()
        .map_err(|e| Error::invalid_regex(term, &e))?;
    Ok(Box::new(RegexPattern::new(regex)))
}

/// Folds `c` for comparison, keeping a one-to-one mapping between characters so
/// that match positions in folded text are valid in the original.
#[inline(always)]
fn fold(c: char, case_strict: bool) -> char {
    if case_strict {
        c
    } else {
        c.to_lowercase().next().unwrap_or(c)
    }
}

/// A term-oriented pattern-matching algorithm implemented using the Boyer-Moore
/// algorithm.
///
/// Successive matches found by [`find_all()`](Pattern::find_all) may overlap, since
/// scanning resumes one character past the start of each match.
struct TermPattern {
    /// The search term folded according to `case_strict`.
    pattern: Vec<char>,

    /// Bad character shift table maps characters in `pattern` to their rightmost
    /// position.
    bc_shift: HashMap<char, usize>,

    /// Good suffix shift table determines how far to shift based on position in
    /// `pattern`.
    gs_shift: Vec<usize>,

    /// Indicates the sensitivity of case.
    case_strict: bool,
}

impl TermPattern {
    fn new(term: &str, case_strict: bool) -> TermPattern {
        let pattern = term
            .chars()
            .map(|c| fold(c, case_strict))
            .collect::<Vec<_>>();
        let bc_shift = Self::build_bc_shift(&pattern);
        let gs_shift = Self::build_gs_shift(&pattern);
        TermPattern {
            pattern,
            bc_shift,
            gs_shift,
            case_strict,
        }
    }

    fn build_bc_shift(pattern: &[char]) -> HashMap<char, usize> {
        let len = pattern.len();
        pattern
            .iter()
            .enumerate()
            .take(len.saturating_sub(1))
            .map(|(i, c)| (*c, i))
            .collect()
    }

    fn build_gs_shift(pattern: &[char]) -> Vec<usize> {
        let len = pattern.len();
        if len > 0 {
            let mut gs_shift = vec![len; len];
            let mut border = vec![0; len + 1];
            border[len] = len + 1;
            let mut i = len;
            let mut j = len + 1;
            while i > 0 {
                while j <= len && pattern[i - 1] != pattern[j - 1] {
                    if gs_shift[j - 1] == len {
                        gs_shift[j - 1] = j - i;
                    }
                    j = border[j];
                }
                i -= 1;
                j -= 1;
                border[i] = j;
            }
            j = border[0];
            for i in 0..len {
                if gs_shift[i] == len {
                    gs_shift[i] = j;
                }
                if i == j {
                    j = border[j];
                }
            }
            gs_shift
        } else {
            vec![]
        }
    }

    /// Returns the folded characters of `buffer` ready for searching.
    fn prepare(&self, buffer: &str) -> Vec<char> {
        buffer.chars().map(|c| fold(c, self.case_strict)).collect()
    }

    fn search(&self, text: &[char], pos: usize) -> Option<Match> {
        let len = self.pattern.len();
        if len > 0 && pos + len <= text.len() {
            // Boyer-Moore compares right-to-left, so this is the last position at
            // which the pattern still fits inside text.
            let stop_pos = text.len() - len;
            let mut pos = pos;
            while pos <= stop_pos {
                let mut i = len;
                while i > 0 && self.pattern[i - 1] == text[pos + i - 1] {
                    i -= 1;
                }
                if i == 0 {
                    return Some(Match(pos, pos + len));
                } else {
                    let bc = text[pos + i - 1];
                    let bc_shift = if let Some(&p) = self.bc_shift.get(&bc) {
                        (i - 1).saturating_sub(p).max(1)
                    } else {
                        i
                    };
                    pos += bc_shift.max(self.gs_shift[i - 1]);
                }
            }
            None
        } else {
            None
        }
    }
}

impl Pattern for TermPattern {
    fn find_all(&self, buffer: &str) -> Vec<Match> {
        let text = self.prepare(buffer);
        let mut matches = Vec::new();
        let mut pos = 0;
        while let Some(m) = self.search(&text, pos) {
            pos = m.0 + 1;
            matches.push(m);
        }
        matches
    }
}

/// A regex-oriented pattern-matching algorithm.
///
/// Matches reported by [`find_all()`](Pattern::find_all) never overlap.
struct RegexPattern {
    regex: Regex,
}

impl RegexPattern {
    fn new(regex: Regex) -> RegexPattern {
        RegexPattern { regex }
    }

    /// Converts the byte range of a regex match in `buffer` to character positions.
    fn to_match(buffer: &str, range: Range<usize>) -> Match {
        let Range { start, end } = range;
        let start_pos = etc::offset_to_pos(buffer, start);
        let end_pos = start_pos + etc::offset_to_pos(&buffer[start..], end - start);
        Match(start_pos, end_pos)
    }
}

impl Pattern for RegexPattern {
    fn find_all(&self, buffer: &str) -> Vec<Match> {
        self.regex
            .find_iter(buffer)
            .map(|m| Self::to_match(buffer, m.range()))
            .collect()
    }
}

/// Replaces every non-overlapping occurrence of `term` in `line` with `replacement`,
/// returning the new text and the number of replacements.
///
/// When `case_strict` is `false`, occurrences are found without regard to case, but
/// text outside of each occurrence keeps its original case.
pub fn replace_term(line: &str, term: &str, replacement: &str, case_strict: bool) -> (String, usize) {
    if term.is_empty() {
        return (line.to_string(), 0);
    }
    let pattern = TermPattern::new(term, case_strict);
    let text = pattern.prepare(line);
    let chars = line.chars().collect::<Vec<_>>();
    let mut out = String::with_capacity(line.len());
    let mut pos = 0;
    let mut count = 0;
    while let Some(Match(start, end)) = pattern.search(&text, pos) {
        out.extend(&chars[pos..start]);
        out.push_str(replacement);
        pos = end;
        count += 1;
    }
    out.extend(&chars[pos..]);
    (out, count)
}

/// Options that control how searching is performed.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct SearchOptions {
    /// If `true`, letters must match in case.
    pub case_strict: bool,

    /// If `true`, a match must not be adjacent to alphanumeric characters.
    pub whole_word: bool,

    /// If `true`, the pattern is a regular expression.
    pub regex: bool,

    /// If `true`, only rows spanned by the selection are searched.
    pub in_selection: bool,

    /// If `true`, matches are recomputed as the pattern is typed.
    pub incremental: bool,
}

impl Default for SearchOptions {
    fn default() -> SearchOptions {
        SearchOptions {
            case_strict: true,
            whole_word: false,
            regex: false,
            in_selection: false,
            incremental: true,
        }
    }
}

/// A single occurrence of a pattern in a document, where `len` counts characters.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Occurrence {
    pub pos: Position,
    pub len: usize,
}

/// Returns every occurrence of `term` in `lines` under `opts`, in row-major order.
///
/// Only rows in `rows` are searched when given. A malformed regular expression is
/// treated as matching nothing.
pub fn find_all(
    lines: &[String],
    term: &str,
    opts: &SearchOptions,
    rows: Option<RangeInclusive<usize>>,
) -> Vec<Occurrence> {
    if term.is_empty() || lines.is_empty() {
        return vec![];
    }
    let pattern = if opts.regex {
        match using_regex(term, opts.case_strict) {
            Ok(pattern) => pattern,
            Err(e) => {
                debug!("{e}");
                return vec![];
            }
        }
    } else {
        using_term(term, opts.case_strict)
    };

    let last = lines.len() - 1;
    let rows = rows
        .map(|r| (*r.start()).min(last)..=(*r.end()).min(last))
        .unwrap_or(0..=last);

    let mut found = Vec::new();
    for row in rows {
        let line = &lines[row];
        let chars = line.chars().collect::<Vec<_>>();
        for Match(start, end) in pattern.find_all(line) {
            if !opts.whole_word || is_whole_word(&chars, start, end) {
                found.push(Occurrence {
                    pos: Position::new(row, start),
                    len: end - start,
                });
            }
        }
    }
    found
}

fn is_whole_word(chars: &[char], start: usize, end: usize) -> bool {
    let before = start == 0 || !etc::is_word_char(chars[start - 1]);
    let after = end >= chars.len() || !etc::is_word_char(chars[end]);
    before && after
}

/// The state of an interactive search over a document.
pub struct SearchSession {
    term: String,
    options: SearchOptions,
    defaults: SearchOptions,
    matches: Vec<Occurrence>,
    current: Option<usize>,
    active: bool,
    history: VecDeque<String>,
    history_index: Option<usize>,
    history_limit: usize,
    last_search: Option<String>,
}

impl SearchSession {
    pub const DEFAULT_HISTORY_LIMIT: usize = 50;

    pub fn new(defaults: SearchOptions, history_limit: usize) -> SearchSession {
        SearchSession {
            term: String::new(),
            options: defaults,
            defaults,
            matches: vec![],
            current: None,
            active: false,
            history: VecDeque::new(),
            history_index: None,
            history_limit,
            last_search: None,
        }
    }

    pub fn begin(&mut self) {
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn set_term(&mut self, term: &str) {
        self.term = term.to_string();
    }

    pub fn push_char(&mut self, c: char) {
        self.term.push(c);
    }

    pub fn pop_char(&mut self) -> Option<char> {
        self.term.pop()
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut SearchOptions {
        &mut self.options
    }

    /// Recomputes all matches of the current term in `doc`, returning the number of
    /// matches found. No match is current until the user navigates.
    pub fn search(&mut self, doc: &Document) -> usize {
        let rows = if self.options.in_selection {
            doc.selection().map(|sel| sel.rows())
        } else {
            None
        };
        self.matches = find_all(doc.lines(), &self.term, &self.options, rows);
        self.current = None;
        debug!(term = %self.term, matches = self.matches.len(), "search");
        self.matches.len()
    }

    pub fn matches(&self) -> &[Occurrence] {
        &self.matches
    }

    pub fn current(&self) -> Option<&Occurrence> {
        self.current.and_then(|i| self.matches.get(i))
    }

    /// Advances to the next match, wrapping around to the first.
    pub fn next_match(&mut self) -> Option<Position> {
        let n = self.matches.len();
        if n > 0 {
            let i = self.current.map(|i| (i + 1) % n).unwrap_or(0);
            self.current = Some(i);
            Some(self.matches[i].pos)
        } else {
            None
        }
    }

    /// Retreats to the previous match, wrapping around to the last.
    pub fn previous_match(&mut self) -> Option<Position> {
        let n = self.matches.len();
        if n > 0 {
            let i = self.current.map(|i| (i + n - 1) % n).unwrap_or(n - 1);
            self.current = Some(i);
            Some(self.matches[i].pos)
        } else {
            None
        }
    }

    /// Records the current term in history if it is non-empty and differs from the
    /// last recorded search.
    pub fn commit(&mut self) {
        if self.term.len() > 0 && self.last_search.as_deref() != Some(self.term.as_str()) {
            self.history.push_back(self.term.clone());
            while self.history.len() > self.history_limit {
                self.history.pop_front();
            }
            self.last_search = Some(self.term.clone());
        }
        self.history_index = self.history.len().checked_sub(1);
    }

    pub fn last_search(&self) -> Option<&str> {
        self.last_search.as_deref()
    }

    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(|s| s.as_str())
    }

    /// Steps back through history, returning the older term if there is one.
    pub fn previous_search(&mut self) -> Option<&str> {
        match self.history_index {
            Some(i) if i > 0 => {
                self.history_index = Some(i - 1);
                self.history.get(i - 1).map(|s| s.as_str())
            }
            _ => None,
        }
    }

    /// Steps forward through history, returning the newer term if there is one.
    pub fn next_search(&mut self) -> Option<&str> {
        match self.history_index {
            Some(i) if i + 1 < self.history.len() => {
                self.history_index = Some(i + 1);
                self.history.get(i + 1).map(|s| s.as_str())
            }
            _ => None,
        }
    }

    /// Ends the session, discarding the term, matches and per-session options while
    /// keeping history.
    pub fn reset(&mut self) {
        self.term.clear();
        self.matches.clear();
        self.current = None;
        self.active = false;
        self.options = SearchOptions {
            case_strict: self.options.case_strict,
            ..self.defaults
        };
    }

    /// Returns a summary suitable for a search prompt.
    pub fn summary(&self) -> Summary {
        Summary {
            current: self.current.map(|i| i + 1).unwrap_or(0),
            total: self.matches.len(),
            options: self.options,
        }
    }
}

impl Default for SearchSession {
    fn default() -> SearchSession {
        SearchSession::new(SearchOptions::default(), Self::DEFAULT_HISTORY_LIMIT)
    }
}

/// Match position and option flags of a search session.
pub struct Summary {
    pub current: usize,
    pub total: usize,
    pub options: SearchOptions,
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}/{})", self.current, self.total)?;
        let flags = [
            (self.options.case_strict, "Aa"),
            (self.options.whole_word, "W"),
            (self.options.regex, "R"),
            (self.options.in_selection, "Sel"),
        ];
        for (_, flag) in flags.iter().filter(|(on, _)| *on) {
            write!(f, " {flag}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "The quick brown fox jumps over the lazy dog";

    fn build_lines(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    fn cols(found: &[Occurrence]) -> Vec<(usize, usize)> {
        found.iter().map(|o| (o.pos.row, o.pos.col)).collect()
    }

    #[test]
    fn search_term_normal() {
        let pattern = TermPattern::new("BrOwN FoX", false);
        assert_eq!(pattern.find_all(TEXT), vec![Match(10, 19)]);
    }

    #[test]
    fn search_term_case() {
        let pattern = TermPattern::new("jump", true);
        assert_eq!(pattern.find_all(TEXT), vec![Match(20, 24)]);
        let pattern = TermPattern::new("Jump", true);
        assert!(pattern.find_all(TEXT).is_empty());
    }

    #[test]
    fn search_term_all_occurrences() {
        let pattern = TermPattern::new("the", false);
        assert_eq!(pattern.find_all(TEXT), vec![Match(0, 3), Match(31, 34)]);
        let pattern = TermPattern::new("the", true);
        assert_eq!(pattern.find_all(TEXT), vec![Match(31, 34)]);
    }

    #[test]
    fn search_term_non_ascii() {
        let pattern = TermPattern::new("ÉTÉ", false);
        assert_eq!(pattern.find_all("un été chaud"), vec![Match(3, 6)]);
    }

    #[test]
    fn search_with_empty_term() {
        let pattern = TermPattern::new("", false);
        assert!(pattern.find_all(TEXT).is_empty());
    }

    #[test]
    fn search_regex() {
        let pattern = using_regex("qu[A-Z]+\\s*.+wN", false).unwrap();
        assert_eq!(pattern.find_all(TEXT), vec![Match(4, 15)]);
        let pattern = using_regex("qu[A-Z]+", true).unwrap();
        assert!(pattern.find_all(TEXT).is_empty());
    }

    #[test]
    fn invalid_regex() {
        assert!(using_regex("(bad", true).is_err());
    }

    #[test]
    fn literal_matches_overlap() {
        let found = find_all(&build_lines(&["aaa"]), "a", &SearchOptions::default(), None);
        assert_eq!(cols(&found), vec![(0, 0), (0, 1), (0, 2)]);

        let found = find_all(&build_lines(&["aaaa"]), "aa", &SearchOptions::default(), None);
        assert_eq!(cols(&found), vec![(0, 0), (0, 1), (0, 2)]);
    }

    #[test]
    fn regex_matches_do_not_overlap() {
        let opts = SearchOptions {
            regex: true,
            ..SearchOptions::default()
        };
        let found = find_all(&build_lines(&["aaaa"]), "aa", &opts, None);
        assert_eq!(cols(&found), vec![(0, 0), (0, 2)]);
    }

    #[test]
    fn whole_word_match() {
        let opts = SearchOptions {
            whole_word: true,
            ..SearchOptions::default()
        };
        let found = find_all(&build_lines(&["concatenate cat"]), "cat", &opts, None);
        assert_eq!(cols(&found), vec![(0, 12)]);
        assert_eq!(found[0].len, 3);
    }

    #[test]
    fn case_folding() {
        let lines = build_lines(&["Cat cAT", "dog CAT"]);
        let strict = find_all(&lines, "cat", &SearchOptions::default(), None);
        assert!(strict.is_empty());
        let opts = SearchOptions {
            case_strict: false,
            ..SearchOptions::default()
        };
        let found = find_all(&lines, "cat", &opts, None);
        assert_eq!(cols(&found), vec![(0, 0), (0, 4), (1, 4)]);
    }

    #[test]
    fn malformed_regex_matches_nothing() {
        let opts = SearchOptions {
            regex: true,
            ..SearchOptions::default()
        };
        assert!(find_all(&build_lines(&["(((("]), "((", &opts, None).is_empty());
    }

    #[test]
    fn rows_restrict_search() {
        let lines = build_lines(&["x", "x", "x", "x"]);
        let found = find_all(&lines, "x", &SearchOptions::default(), Some(1..=2));
        assert_eq!(cols(&found), vec![(1, 0), (2, 0)]);
        let found = find_all(&lines, "x", &SearchOptions::default(), Some(3..=9));
        assert_eq!(cols(&found), vec![(3, 0)]);
    }

    #[test]
    fn replace_term_variants() {
        assert_eq!(replace_term("aXa xa", "a", "bb", true), ("bbXbb xbb".to_string(), 3));
        assert_eq!(replace_term("Hello HELLO", "hello", "hi", false), ("hi hi".to_string(), 2));
        assert_eq!(replace_term("MiXeD foo", "FOO", "bar", false), ("MiXeD bar".to_string(), 1));
        assert_eq!(replace_term("aaa", "aa", "b", true), ("ba".to_string(), 1));
        assert_eq!(replace_term("abc", "", "z", true), ("abc".to_string(), 0));
    }

    #[test]
    fn session_navigation_wraps() {
        let doc = Document::new(build_lines(&["a b a", "a"]));
        let mut session = SearchSession::default();
        session.begin();
        session.set_term("a");
        assert_eq!(session.search(&doc), 3);
        assert!(session.current().is_none());
        assert_eq!(session.next_match(), Some(Position::new(0, 0)));
        assert_eq!(session.next_match(), Some(Position::new(0, 4)));
        assert_eq!(session.next_match(), Some(Position::new(1, 0)));
        assert_eq!(session.next_match(), Some(Position::new(0, 0)));
        assert_eq!(session.previous_match(), Some(Position::new(1, 0)));
        assert_eq!(session.summary().to_string(), "(3/3) Aa");
    }

    #[test]
    fn session_without_matches() {
        let doc = Document::new(build_lines(&["abc"]));
        let mut session = SearchSession::default();
        session.set_term("z");
        assert_eq!(session.search(&doc), 0);
        assert_eq!(session.next_match(), None);
        assert_eq!(session.previous_match(), None);
        assert_eq!(session.summary().to_string(), "(0/0) Aa");
    }

    #[test]
    fn session_incremental_term() {
        let doc = Document::new(build_lines(&["cart cat car"]));
        let mut session = SearchSession::default();
        session.push_char('c');
        session.push_char('a');
        assert_eq!(session.search(&doc), 3);
        session.push_char('t');
        assert_eq!(session.search(&doc), 1);
        session.pop_char();
        assert_eq!(session.search(&doc), 3);
    }

    #[test]
    fn session_in_selection() {
        let mut doc = Document::new(build_lines(&["x", "x", "x"]));
        doc.set_cursor(1, 0);
        doc.update_selection();
        doc.set_cursor(2, 1);
        doc.update_selection();
        let mut session = SearchSession::default();
        session.options_mut().in_selection = true;
        session.set_term("x");
        assert_eq!(session.search(&doc), 2);
        assert_eq!(session.summary().to_string(), "(0/2) Aa Sel");
    }

    #[test]
    fn session_history() {
        let mut session = SearchSession::new(SearchOptions::default(), 2);
        for term in ["one", "two", "two", "", "three"] {
            session.set_term(term);
            session.commit();
        }
        assert_eq!(session.history().collect::<Vec<_>>(), vec!["two", "three"]);
        assert_eq!(session.last_search(), Some("three"));
        assert_eq!(session.next_search(), None);
        assert_eq!(session.previous_search(), Some("two"));
        assert_eq!(session.previous_search(), None);
        assert_eq!(session.next_search(), Some("three"));
        assert_eq!(session.history().count(), 2);
    }

    #[test]
    fn session_reset_keeps_case_and_history() {
        let mut session = SearchSession::default();
        session.begin();
        session.options_mut().case_strict = false;
        session.options_mut().regex = true;
        session.options_mut().whole_word = true;
        session.set_term("abc");
        session.commit();
        session.reset();
        assert!(!session.is_active());
        assert_eq!(session.term(), "");
        assert!(!session.options().case_strict);
        assert!(!session.options().regex);
        assert!(!session.options().whole_word);
        assert_eq!(session.last_search(), Some("abc"));
    }
}
