use tower_lsp_server::ls_types::{Position, Range};

/// Line start table for one text, converting between LSP positions and byte offsets
///
/// The index does not own the text; every lookup takes the text it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build the line start table for `text`
    pub fn new(text: &str) -> Self {
        Self {
            line_starts: compute_line_starts(text),
        }
    }

    /// Number of lines (a trailing newline opens an empty last line)
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte range of `line`, excluding its line terminator
    fn line_bounds(&self, text: &str, line: usize) -> Option<(usize, usize)> {
        let start = *self.line_starts.get(line)?;
        let end = match self.line_starts.get(line + 1) {
            Some(next) => next - 1,
            None => text.len(),
        };
        // Tolerate CRLF line endings
        let end = if end > start && text.as_bytes().get(end - 1) == Some(&b'\r') {
            end - 1
        } else {
            end
        };
        Some((start, end.min(text.len())))
    }

    /// Convert an LSP position to a byte offset
    ///
    /// A character past the end of the line clamps to the line end.
    pub fn position_to_offset(&self, text: &str, position: Position) -> Option<usize> {
        let (line_start, line_end) = self.line_bounds(text, position.line as usize)?;
        let line_text = &text[line_start..line_end];

        match convert_utf16_to_byte_in_line(line_text, position.character as usize) {
            Some(byte_offset) => Some(line_start + byte_offset),
            None => Some(line_end),
        }
    }

    /// Convert a byte offset to an LSP position
    ///
    /// Offsets inside a multi-byte character snap back to the character start.
    /// Offsets beyond the text yield `None`.
    pub fn offset_to_position(&self, text: &str, offset: usize) -> Option<Position> {
        if offset > text.len() {
            return None;
        }

        // Binary search for the line containing this offset
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let (line_start, line_end) = self.line_bounds(text, line)?;
        let line_text = &text[line_start..line_end];
        let line_offset = offset.saturating_sub(line_start).min(line_text.len());

        let mut valid_offset = line_offset;
        let character = loop {
            if let Some(utf16) = convert_byte_to_utf16_in_line(line_text, valid_offset) {
                break utf16;
            }
            if valid_offset == 0 {
                break 0;
            }
            valid_offset -= 1;
        };

        Some(Position {
            line: line as u32,
            character: character as u32,
        })
    }

    /// Convert a byte range to an LSP range
    pub fn offsets_to_range(&self, text: &str, start: usize, end: usize) -> Option<Range> {
        Some(Range {
            start: self.offset_to_position(text, start)?,
            end: self.offset_to_position(text, end)?,
        })
    }
}

/// Compute line start offsets for efficient position mapping
pub fn compute_line_starts(text: &str) -> Vec<usize> {
    let mut line_starts = vec![0];
    line_starts.extend(
        text.bytes()
            .enumerate()
            .filter(|(_, byte)| *byte == b'\n')
            .map(|(index, _)| index + 1),
    );
    line_starts
}

/// Convert UTF-16 position to byte position within a line
/// Returns None if the UTF-16 position is past the end of the line
#[inline(always)]
pub fn convert_utf16_to_byte_in_line(line_text: &str, utf16_pos: usize) -> Option<usize> {
    let mut byte_offset = 0;
    let mut utf16_offset = 0;

    for ch in line_text.chars() {
        if utf16_offset >= utf16_pos {
            return Some(byte_offset);
        }
        utf16_offset += ch.len_utf16();
        byte_offset += ch.len_utf8();
    }

    if utf16_offset == utf16_pos {
        Some(byte_offset)
    } else {
        None
    }
}

/// Convert byte position to UTF-16 position within a line
/// Returns None if the byte position is invalid (e.g., in the middle of a multi-byte character)
#[inline(always)]
pub fn convert_byte_to_utf16_in_line(line_text: &str, byte_pos: usize) -> Option<usize> {
    let mut utf16_offset = 0;
    let mut byte_count = 0;

    for ch in line_text.chars() {
        if byte_count == byte_pos {
            return Some(utf16_offset);
        }
        let ch_bytes = ch.len_utf8();
        if byte_count + ch_bytes > byte_pos {
            return None;
        }
        byte_count += ch_bytes;
        utf16_offset += ch.len_utf16();
    }

    if byte_count == byte_pos {
        Some(utf16_offset)
    } else {
        None
    }
}
