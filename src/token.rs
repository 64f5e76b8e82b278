//! Tokenization for syntax coloring.
//!
//! A line is tokenized by running every token class of its [`Syntax`] over the whole
//! line, one class at a time in order of priority. A match is accepted only if it
//! starts at or after the end of the last accepted match, so classes listed earlier
//! win whenever they overlap with later ones. Text not covered by any accepted match
//! becomes a [`Category::Plain`] span.

use crate::color::Color;
use crate::syntax::{Category, Registry, Syntax, TokenClass};
use crate::theme::Theme;
use std::ops::Range;

/// A slice of a line that belongs to a single token category.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Span<'a> {
    pub category: Category,
    pub text: &'a str,
}

impl<'a> Span<'a> {
    fn plain(text: &'a str) -> Span<'a> {
        Span {
            category: Category::Plain,
            text,
        }
    }
}

/// Returns the spans of `line` according to `syntax`, or a single plain span if
/// `syntax` is `None`. An empty line produces no spans.
///
/// The concatenation of the text of all spans is always equal to `line`.
pub fn tokenize<'a>(line: &'a str, syntax: Option<&Syntax>) -> Vec<Span<'a>> {
    if line.is_empty() {
        return Vec::new();
    }
    let Some(syntax) = syntax else {
        return vec![Span::plain(line)];
    };

    let mut spans = Vec::new();

    // Byte offset following the last accepted token.
    let mut end = 0;

    for class in syntax.classes() {
        for Range { start, end: stop } in matches(class, line) {
            if start >= end && stop > start {
                if start > end {
                    spans.push(Span::plain(&line[end..start]));
                }
                spans.push(Span {
                    category: class.category,
                    text: &line[start..stop],
                });
                end = stop;
            }
        }
    }
    if end < line.len() {
        spans.push(Span::plain(&line[end..]));
    }
    spans
}

/// Returns the byte ranges of all tokens matched by `class` in order of occurrence.
fn matches(class: &TokenClass, line: &str) -> Vec<Range<usize>> {
    if class.focused {
        class
            .re
            .captures_iter(line)
            .filter_map(|cap| cap.name("tok").or_else(|| cap.get(0)))
            .map(|m| m.range())
            .collect()
    } else {
        class.re.find_iter(line).map(|m| m.range()).collect()
    }
}

/// Produces highlight spans for lines of a given language using a shared registry.
pub struct Highlighter<'r> {
    registry: &'r Registry,
    theme: &'r Theme,
}

impl<'r> Highlighter<'r> {
    pub fn new(registry: &'r Registry, theme: &'r Theme) -> Highlighter<'r> {
        Highlighter { registry, theme }
    }

    /// Returns the spans of `line` for `language`. An unknown or absent language
    /// produces a single plain span.
    pub fn highlight<'a>(&self, line: &'a str, language: Option<&str>) -> Vec<Span<'a>> {
        tokenize(line, language.and_then(|lang| self.registry.find(lang)))
    }

    /// Returns the spans of `line` paired with the color of each span.
    pub fn colorize<'a>(&self, line: &'a str, language: Option<&str>) -> Vec<(Color, Span<'a>)> {
        self.highlight(line, language)
            .into_iter()
            .map(|span| (self.theme.color_of(language, span.category), span))
            .collect()
    }
}
