//! Soft wrapping of lines.
//!
//! A line longer than the target width is broken at whitespace into display lines,
//! each of which repeats the leading indentation of the original line. Words are
//! rejoined with a single space. A word that cannot fit on a line by itself is split
//! into chunks of exactly the available width.

use crate::etc;
use indexmap::IndexMap;
use tracing::debug;

/// Wraps lines to a given width and memoizes the results.
///
/// The cache is bounded and evicts entries in the order they were inserted. Results
/// never depend on the state of the cache.
pub struct Wrapper {
    cache: IndexMap<(String, usize), Vec<String>>,
    capacity: usize,
}

impl Wrapper {
    pub const DEFAULT_CAPACITY: usize = 1000;

    pub fn new(capacity: usize) -> Wrapper {
        Wrapper {
            cache: IndexMap::new(),
            capacity,
        }
    }

    /// Returns the display lines for `line` wrapped to `width` columns.
    pub fn wrap(&mut self, line: &str, width: usize) -> Vec<String> {
        let key = (line.to_string(), width);
        if let Some(lines) = self.cache.get(&key) {
            lines.clone()
        } else {
            let lines = wrap_line(line, width);
            if self.capacity > 0 {
                while self.cache.len() >= self.capacity {
                    self.cache.shift_remove_index(0);
                    debug!(capacity = self.capacity, "wrap cache eviction");
                }
                self.cache.insert(key, lines.clone());
            }
            lines
        }
    }

    /// Returns the number of display lines that `line` occupies at `width`.
    pub fn count(&mut self, line: &str, width: usize) -> usize {
        self.wrap(line, width).len()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

impl Default for Wrapper {
    fn default() -> Wrapper {
        Wrapper::new(Self::DEFAULT_CAPACITY)
    }
}

/// Wraps `line` to `width` columns without consulting any cache.
///
/// A `width` of `0` is treated as `1`. If the indentation leaves no room for text,
/// one column is still given to the text so that wrapping makes progress.
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    if etc::char_len(line) <= width {
        return vec![line.to_string()];
    }

    let indent_len = etc::indent_len(line);
    let (indent, text) = line.split_at(etc::pos_to_offset(line, indent_len));
    let words = text.split_whitespace().collect::<Vec<_>>();
    if words.is_empty() {
        return vec![line.to_string()];
    }

    let avail = width.saturating_sub(indent_len).max(1);
    let mut lines = Vec::new();
    let mut cur = String::new();
    let mut cur_len = 0;

    for word in words {
        let word_len = etc::char_len(word);
        if word_len > avail {
            if cur_len > 0 {
                lines.push(format!("{indent}{cur}"));
                cur.clear();
                cur_len = 0;
            }
            let chars = word.chars().collect::<Vec<_>>();
            for chunk in chars.chunks(avail) {
                lines.push(format!("{indent}{}", chunk.iter().collect::<String>()));
            }
        } else if cur_len == 0 {
            cur.push_str(word);
            cur_len = word_len;
        } else if cur_len + 1 + word_len <= avail {
            cur.push(' ');
            cur.push_str(word);
            cur_len += 1 + word_len;
        } else {
            lines.push(format!("{indent}{cur}"));
            cur = word.to_string();
            cur_len = word_len;
        }
    }
    if cur_len > 0 {
        lines.push(format!("{indent}{cur}"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn short_line_unchanged() {
        assert_eq!(wrap_line("  short", 10), vec!["  short"]);
        assert_eq!(wrap_line("", 10), vec![""]);
    }

    #[test]
    fn wrap_preserves_indent() {
        let lines = wrap_line("    alpha beta gamma delta", 16);
        assert_eq!(lines, vec!["    alpha beta", "    gamma delta"]);
    }

    #[test]
    fn whitespace_only_line_unchanged() {
        assert_eq!(wrap_line("          ", 4), vec!["          "]);
    }

    #[test]
    fn long_word_is_chunked() {
        let lines = wrap_line("ab abcdefghij cd", 4);
        assert_eq!(lines, vec!["ab", "abcd", "efgh", "ij", "cd"]);
    }

    #[test]
    fn long_word_with_indent() {
        let lines = wrap_line("  abcdefg", 5);
        assert_eq!(lines, vec!["  abc", "  def", "  g"]);
    }

    #[test]
    fn indent_wider_than_width() {
        let lines = wrap_line("      abc", 4);
        assert_eq!(lines, vec!["      a", "      b", "      c"]);
    }

    #[test]
    fn cache_is_bounded_fifo() {
        let mut wrapper = Wrapper::new(2);
        wrapper.wrap("one two three", 5);
        wrapper.wrap("four five six", 5);
        assert_eq!(wrapper.cache_len(), 2);
        wrapper.wrap("seven eight", 5);
        assert_eq!(wrapper.cache_len(), 2);
        assert!(!wrapper.cache.contains_key(&("one two three".to_string(), 5)));
        assert!(wrapper.cache.contains_key(&("four five six".to_string(), 5)));
    }

    #[test]
    fn zero_capacity_never_caches() {
        let mut wrapper = Wrapper::new(0);
        assert_eq!(wrapper.count("a b c d", 3), 2);
        assert_eq!(wrapper.cache_len(), 0);
    }

    proptest! {
        #[test]
        fn wrap_then_rejoin(
            indent in "[ \t]{0,4}",
            body in "[a-zA-Z0-9 .,]{0,80}",
            width in 1usize..30,
        ) {
            let line = format!("{indent}{body}");
            let lines = wrap_line(&line, width);
            if line.chars().count() <= width {
                prop_assert_eq!(lines, vec![line.clone()]);
            } else {
                let has_words = body.split_whitespace().next().is_some();
                let mut contents = Vec::new();
                for l in &lines {
                    prop_assert!(l.starts_with(&indent));
                    let content = &l[indent.len()..];
                    prop_assert!(!has_words || content.trim().len() > 0);
                    contents.push(content.to_string());
                }
                let rejoined = contents.join(" ");
                let actual = rejoined.split_whitespace().collect::<String>();
                let expected = body.split_whitespace().collect::<String>();
                prop_assert_eq!(actual, expected);
            }
        }

        #[test]
        fn cache_does_not_change_results(
            lines in prop::collection::vec("[a-z ]{0,40}", 1..20),
            width in 1usize..20,
            capacity in 0usize..4,
        ) {
            let mut wrapper = Wrapper::new(capacity);
            for _ in 0..2 {
                for line in &lines {
                    prop_assert_eq!(wrapper.wrap(line, width), wrap_line(line, width));
                }
            }
            prop_assert!(wrapper.cache_len() <= capacity);
        }
    }
}
