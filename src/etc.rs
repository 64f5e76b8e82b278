//! Character-oriented helpers for working with lines of text.
//!
//! All positions in this crate count characters, not bytes, so these functions
//! translate between the two and perform the small edits that commands need.

use std::ops::ControlFlow;

/// Returns the byte offset in `buf` corresponding to the `pos`-th character, which is
/// guaranteed to be aligned to a UTF-8 code point boundary in `buf`.
///
/// If `buf` contains less than `pos` characters, then `buf.len()` is returned.
pub fn pos_to_offset(buf: &str, pos: usize) -> usize {
    buf.char_indices()
        .nth(pos)
        .map(|(offset, _)| offset)
        .unwrap_or(buf.len())
}

/// Returns the character position in `buf` corresponding to the byte `offset`.
///
/// If `buf` contains less than `offset` bytes, then the value returned is equal to
/// `buf.chars().count()`.
pub fn offset_to_pos(buf: &str, offset: usize) -> usize {
    let result = buf.chars().try_fold((0, 0), |(ofs, pos), c| {
        if ofs < offset {
            ControlFlow::Continue((ofs + c.len_utf8(), pos + 1))
        } else {
            ControlFlow::Break(pos)
        }
    });
    match result {
        ControlFlow::Break(pos) => pos,
        ControlFlow::Continue((_, pos)) => pos,
    }
}

/// Returns the number of characters in `buf`.
#[inline]
pub fn char_len(buf: &str) -> usize {
    buf.chars().count()
}

/// Returns the slice of `buf` between character positions `start` and `end`, both
/// of which are clamped to the length of `buf`.
pub fn slice(buf: &str, start: usize, end: usize) -> &str {
    let start = pos_to_offset(buf, start);
    let end = pos_to_offset(buf, end).max(start);
    &buf[start..end]
}

/// Inserts `text` into `line` at character position `pos`.
pub fn insert_at(line: &mut String, pos: usize, text: &str) {
    let offset = pos_to_offset(line, pos);
    line.insert_str(offset, text);
}

/// Removes and returns the character at position `pos`, or `None` if `pos` is at or
/// beyond the end of `line`.
pub fn remove_at(line: &mut String, pos: usize) -> Option<char> {
    let offset = pos_to_offset(line, pos);
    if offset < line.len() {
        Some(line.remove(offset))
    } else {
        None
    }
}

/// Replaces the character at position `pos` with `c`, returning the character that
/// was replaced. If `pos` is at the end of `line`, then `c` is appended instead.
pub fn overwrite_at(line: &mut String, pos: usize, c: char) -> Option<char> {
    let prior = remove_at(line, pos);
    let offset = pos_to_offset(line, pos);
    line.insert(offset, c);
    prior
}

/// Truncates `line` at character position `pos` and returns the remainder.
pub fn split_off_at(line: &mut String, pos: usize) -> String {
    let offset = pos_to_offset(line, pos);
    line.split_off(offset)
}

/// Returns the number of leading whitespace characters in `line`.
pub fn indent_len(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Returns `true` if `c` is considered part of a word when testing word boundaries.
#[inline]
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "añb→c";

    #[test]
    fn positions_and_offsets() {
        assert_eq!(pos_to_offset(TEXT, 0), 0);
        assert_eq!(pos_to_offset(TEXT, 2), 3);
        assert_eq!(pos_to_offset(TEXT, 4), 7);
        assert_eq!(pos_to_offset(TEXT, 99), TEXT.len());
        assert_eq!(offset_to_pos(TEXT, 3), 2);
        assert_eq!(offset_to_pos(TEXT, 7), 4);
        assert_eq!(offset_to_pos(TEXT, 99), 5);
    }

    #[test]
    fn slice_by_position() {
        assert_eq!(slice(TEXT, 1, 4), "ñb→");
        assert_eq!(slice(TEXT, 3, 99), "→c");
        assert_eq!(slice(TEXT, 4, 2), "");
    }

    #[test]
    fn edit_by_position() {
        let mut line = TEXT.to_string();
        insert_at(&mut line, 2, "XY");
        assert_eq!(line, "añXYb→c");
        assert_eq!(remove_at(&mut line, 1), Some('ñ'));
        assert_eq!(remove_at(&mut line, 99), None);
        assert_eq!(overwrite_at(&mut line, 0, 'z'), Some('a'));
        assert_eq!(overwrite_at(&mut line, 6, '!'), None);
        assert_eq!(line, "zXYb→c!");
        let rest = split_off_at(&mut line, 4);
        assert_eq!(line, "zXYb");
        assert_eq!(rest, "→c!");
    }

    #[test]
    fn indentation() {
        assert_eq!(indent_len("    foo"), 4);
        assert_eq!(indent_len("\t foo"), 2);
        assert_eq!(indent_len("   "), 3);
        assert_eq!(indent_len(""), 0);
    }
}
