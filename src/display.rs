//! Mapping between logical lines and display lines.
//!
//! A [`DisplayMap`] is a projection of the document at a given width: every logical
//! line becomes one or more display lines, and each display line is tagged with the
//! logical row that owns it and whether it continues a wrapped line. The tags are
//! produced at wrap time, so translating back to logical rows never has to guess
//! from the shape of the text.

use crate::wrap::Wrapper;
use std::fmt::{self, Display, Formatter};
use std::ops::Range;

/// Represents the size of the visible area expressed as _rows_ and _columns_.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Size {
    pub rows: usize,
    pub cols: usize,
}

impl Size {
    pub const fn new(rows: usize, cols: usize) -> Size {
        Size { rows, cols }
    }
}

impl Display for Size {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// A single line as drawn on screen.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DisplayLine {
    /// The logical row that owns this line.
    pub row: usize,

    /// The text to draw, including any indentation reproduced from the logical line.
    pub text: String,

    /// `true` if this line is the second or later piece of a wrapped logical line.
    pub continuation: bool,
}

pub struct DisplayMap {
    lines: Vec<DisplayLine>,

    /// Index of the first display line of each logical row.
    starts: Vec<usize>,

    width: usize,
}

impl DisplayMap {
    /// Builds the display lines for `lines` wrapped to `width` using `wrapper`.
    pub fn build(wrapper: &mut Wrapper, lines: &[String], width: usize) -> DisplayMap {
        let mut display = Vec::new();
        let mut starts = Vec::with_capacity(lines.len());
        for (row, line) in lines.iter().enumerate() {
            starts.push(display.len());
            for (i, text) in wrapper.wrap(line, width).into_iter().enumerate() {
                display.push(DisplayLine {
                    row,
                    text,
                    continuation: i > 0,
                });
            }
        }
        DisplayMap {
            lines: display,
            starts,
            width,
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn lines(&self) -> &[DisplayLine] {
        &self.lines
    }

    pub fn get(&self, index: usize) -> Option<&DisplayLine> {
        self.lines.get(index)
    }

    /// Returns the index of the first display line of logical `row`, which is the
    /// number of display lines occupied by all rows before it.
    ///
    /// A `row` beyond the last logical line maps to the end of the display.
    pub fn logical_to_display(&self, row: usize) -> usize {
        self.starts.get(row).copied().unwrap_or(self.lines.len())
    }

    /// Returns the logical row owning display line `index`, clamped to the last
    /// logical row if `index` is out of range.
    pub fn display_to_logical(&self, index: usize) -> usize {
        if index >= self.lines.len() {
            return self.starts.len().saturating_sub(1);
        }
        self.lines
            .iter()
            .take(index + 1)
            .skip(1)
            .filter(|line| !line.continuation)
            .count()
    }

    /// Returns the range of display lines occupied by logical `row`.
    pub fn row_span(&self, row: usize) -> Range<usize> {
        let start = self.logical_to_display(row);
        let end = self.logical_to_display(row + 1);
        start..end
    }

    /// Returns the display lines visible in `viewport`.
    pub fn window(&self, viewport: &Viewport) -> &[DisplayLine] {
        &self.lines[viewport.visible(self.lines.len())]
    }
}

/// Returns the display index of logical `row` without building a full map, by summing
/// the wrap counts of every line before it.
pub fn display_index(wrapper: &mut Wrapper, lines: &[String], row: usize, width: usize) -> usize {
    lines
        .iter()
        .take(row)
        .map(|line| wrapper.count(line, width))
        .sum()
}

/// The scroll state of the visible window.
#[derive(Copy, Clone, Debug)]
pub struct Viewport {
    offset: usize,
    size: Size,
}

impl Viewport {
    pub fn new(size: Size) -> Viewport {
        Viewport { offset: 0, size }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn height(&self) -> usize {
        self.size.rows.max(1)
    }

    pub fn width(&self) -> usize {
        self.size.cols.max(1)
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }

    /// Scrolls by the least amount needed to show display line `line`, then keeps
    /// the offset within `max(0, total - height)`. Returns the new offset.
    pub fn scroll_to(&mut self, line: usize, total: usize) -> usize {
        let height = self.height();
        if line < self.offset {
            self.offset = line;
        } else if line >= self.offset + height {
            self.offset = line + 1 - height;
        }
        self.offset = self.offset.min(total.saturating_sub(height));
        self.offset
    }

    /// Returns the range of display lines visible given `total` display lines.
    pub fn visible(&self, total: usize) -> Range<usize> {
        let start = self.offset.min(total);
        let end = (self.offset + self.height()).min(total);
        start..end
    }
}
