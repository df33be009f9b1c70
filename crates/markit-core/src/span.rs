//! Source positions
//!
//! Spans are half-open byte ranges into the (normalized) source text, with
//! 1-based line/column coordinates cached for both ends.

use std::fmt;

/// A point in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Byte offset from the start of the source
    pub offset: usize,
    /// 1-based line number
    pub line: usize,
    /// 1-based byte column
    pub column: usize,
}

/// A half-open range `[start, end)` of the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceSpan {
    pub start: Position,
    pub end: Position,
}

impl SourceSpan {
    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.end.offset == self.start.offset
    }

    /// `l:c-l:c` with an inclusive end column, as used by `data-sourcepos`
    pub fn to_sourcepos(&self) -> String {
        let (end_line, end_column) = if self.is_empty() {
            (self.start.line, self.start.column)
        } else {
            (self.end.line, self.end.column.saturating_sub(1).max(1))
        };
        format!(
            "{}:{}-{}:{}",
            self.start.line, self.start.column, end_line, end_column
        )
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start.offset, self.end.offset)
    }
}

/// Line start table for converting byte offsets to line/column pairs
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self {
            line_starts,
            len: source.len(),
        }
    }

    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        Position {
            offset,
            line: line + 1,
            column: offset - self.line_starts[line] + 1,
        }
    }

    pub fn span(&self, start: usize, end: usize) -> SourceSpan {
        SourceSpan {
            start: self.position(start),
            end: self.position(end.max(start)),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_first_line() {
        let index = LineIndex::new("abc\ndef");
        let pos = index.position(2);
        assert_eq!((pos.line, pos.column), (1, 3));
    }

    #[test]
    fn test_position_after_newline() {
        let index = LineIndex::new("abc\ndef");
        let pos = index.position(4);
        assert_eq!((pos.line, pos.column), (2, 1));
        assert_eq!(index.line_count(), 2);
    }

    #[test]
    fn test_position_clamps_past_end() {
        let index = LineIndex::new("ab");
        assert_eq!(index.position(10).offset, 2);
    }

    #[test]
    fn test_sourcepos_format() {
        let index = LineIndex::new("# markdown-it rulezz!");
        assert_eq!(index.span(0, 21).to_sourcepos(), "1:1-1:21");
        assert_eq!(index.span(0, 21).to_string(), "0:21");
    }

    #[test]
    fn test_sourcepos_multiline() {
        let index = LineIndex::new("> a\n> b\n");
        assert_eq!(index.span(0, 7).to_sourcepos(), "1:1-2:3");
    }
}
