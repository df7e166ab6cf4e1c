//! codegen::wrap
//!
//! Greedy line wrapping over configurable chunk boundaries.
//!
//! Text is first cut into chunks, then chunks are packed onto lines no wider
//! than the target width. A chunk is never split, so a single chunk wider than
//! the target gets a line of its own. Whitespace-only chunks are dropped at
//! line boundaries.

/// Non-breaking indent marker used in documentation records.
pub const NBSP: &str = "&nbsp;";

/// Width of one tab stop when measuring columns.
const TAB_WIDTH: usize = 8;

/// Where text may be broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breaks {
    /// At whitespace, and between a run of [`NBSP`] markers and the word
    /// that follows it. The markers themselves are never split.
    Words,
    /// After each comma.
    Commas,
}

/// A line wrapper for a fixed width.
#[derive(Debug, Clone, Copy)]
pub struct Wrapper {
    width: usize,
    breaks: Breaks,
}

impl Wrapper {
    /// Create a wrapper.
    pub fn new(width: usize, breaks: Breaks) -> Self {
        Self { width, breaks }
    }

    /// Wrap `text` into lines.
    ///
    /// # Example
    ///
    /// ```
    /// use apiconf::codegen::wrap::{Breaks, Wrapper};
    ///
    /// let lines = Wrapper::new(10, Breaks::Commas).wrap("a=1,bb=2,ccc=3");
    /// assert_eq!(lines, vec!["a=1,bb=2,", "ccc=3"]);
    /// ```
    pub fn wrap(&self, text: &str) -> Vec<String> {
        let chunks = match self.breaks {
            Breaks::Words => word_chunks(text),
            Breaks::Commas => comma_chunks(text),
        };
        pack(&chunks, self.width)
    }
}

fn is_blank(chunk: &str) -> bool {
    chunk.trim().is_empty()
}

fn pack(chunks: &[&str], width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut i = 0;

    while i < chunks.len() {
        if !lines.is_empty() && is_blank(chunks[i]) {
            i += 1;
            continue;
        }

        let mut line: Vec<&str> = Vec::new();
        let mut len = 0;
        while i < chunks.len() {
            let chunk_len = chunks[i].chars().count();
            if len + chunk_len <= width {
                line.push(chunks[i]);
                len += chunk_len;
                i += 1;
            } else {
                break;
            }
        }

        // Oversized chunk on an empty line: take it whole.
        if line.is_empty() && i < chunks.len() {
            line.push(chunks[i]);
            i += 1;
        }

        if line.last().map(|c| is_blank(c)).unwrap_or(false) {
            line.pop();
        }
        if !line.is_empty() {
            lines.push(line.concat());
        }
    }

    lines
}

fn comma_chunks(text: &str) -> Vec<&str> {
    text.split_inclusive(',').collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | ',' | '.' | ';' | ':')
}

fn word_chunks(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c.is_whitespace() {
            let mut end = i + c.len_utf8();
            while let Some(&(j, next)) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                end = j + next.len_utf8();
                chars.next();
            }
            if start < i {
                chunks.push(&text[start..i]);
            }
            chunks.push(&text[i..end]);
            start = end;
            continue;
        }

        // A word directly after an indent marker is a chunk of its own.
        let after = i + c.len_utf8();
        if text[..after].ends_with(NBSP) {
            let word_len = text[after..]
                .find(|ch: char| !is_word_char(ch))
                .unwrap_or(text.len() - after);
            if word_len > 0 {
                chunks.push(&text[start..after]);
                chunks.push(&text[after..after + word_len]);
                start = after + word_len;
                while let Some(&(j, _)) = chars.peek() {
                    if j >= start {
                        break;
                    }
                    chars.next();
                }
            }
        }
    }

    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks.retain(|c| !c.is_empty());
    chunks
}

/// Column width of `text` with tabs expanded.
pub fn display_width(text: &str) -> usize {
    text.chars().fold(0, |col, c| {
        if c == '\t' {
            (col / TAB_WIDTH + 1) * TAB_WIDTH
        } else {
            col + 1
        }
    })
}
