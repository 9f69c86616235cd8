//! Text segmentation for streaming synthesis.
//!
//! Kokoro synthesizes a whole input at once, so long requests are cut into
//! sentence-sized segments. Each segment becomes one audio chunk, which lets
//! the first audio reach the host early and gives interrupts a chance to land
//! between segments.

/// Upper bound on characters per segment.
pub const MAX_SEGMENT_CHARS: usize = 300;

/// Split `text` into segments of at most [`MAX_SEGMENT_CHARS`] characters.
#[must_use]
pub fn segment_text(text: &str) -> Vec<String> {
    segment_text_with_limit(text, MAX_SEGMENT_CHARS)
}

/// Split `text` into segments of at most `limit` characters.
///
/// Sentences (ending in `.`, `!` or `?` before whitespace) and line breaks
/// are the preferred cut points; neighbouring sentences are merged while they
/// fit. A sentence over the limit is cut at clause punctuation, then between
/// words, and a single word over the limit is cut anywhere. Blank input yields
/// no segments.
#[must_use]
pub fn segment_text_with_limit(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut segments = Vec::new();
    let mut packer = Packer::new(limit);

    for sentence in split_at_boundaries(text, is_sentence_end, true) {
        if char_len(sentence) > limit {
            packer.flush_into(&mut segments);
            split_sentence(sentence, limit, &mut segments);
        } else {
            packer.push(sentence, &mut segments);
        }
    }
    packer.flush_into(&mut segments);

    segments
}

// ── Internal helpers ───────────────────────────────────────────────

/// Greedily joins pieces with single spaces while they fit in `limit`.
struct Packer {
    limit: usize,
    current: String,
    current_len: usize,
}

impl Packer {
    const fn new(limit: usize) -> Self {
        Self {
            limit,
            current: String::new(),
            current_len: 0,
        }
    }

    /// `piece` must already fit within the limit.
    fn push(&mut self, piece: &str, out: &mut Vec<String>) {
        let len = char_len(piece);
        if self.current_len > 0 && self.current_len + 1 + len > self.limit {
            self.flush_into(out);
        }
        if self.current_len > 0 {
            self.current.push(' ');
            self.current_len += 1;
        }
        self.current.push_str(piece);
        self.current_len += len;
    }

    fn flush_into(&mut self, out: &mut Vec<String>) {
        if self.current_len > 0 {
            out.push(std::mem::take(&mut self.current));
            self.current_len = 0;
        }
    }
}

fn split_sentence(sentence: &str, limit: usize, out: &mut Vec<String>) {
    let mut packer = Packer::new(limit);

    for clause in split_at_boundaries(sentence, is_clause_end, false) {
        if char_len(clause) <= limit {
            packer.push(clause, out);
            continue;
        }
        for word in clause.split_whitespace() {
            if char_len(word) <= limit {
                packer.push(word, out);
            } else {
                packer.flush_into(out);
                out.extend(hard_split(word, limit));
            }
        }
    }

    packer.flush_into(out);
}

/// Cut `text` after every char matching `is_end` that is followed by
/// whitespace or the end of input. Returns trimmed, non-empty pieces.
fn split_at_boundaries(text: &str, is_end: fn(char) -> bool, newlines: bool) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        let end = if newlines && ch == '\n' {
            Some(idx)
        } else if is_end(ch) && chars.peek().is_none_or(|&(_, next)| next.is_whitespace()) {
            Some(idx + ch.len_utf8())
        } else {
            None
        };

        if let Some(end) = end {
            pieces.push(&text[start..end]);
            start = idx + ch.len_utf8();
        }
    }
    pieces.push(&text[start..]);

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

fn hard_split(word: &str, limit: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars.chunks(limit).map(|c| c.iter().collect()).collect()
}

const fn is_sentence_end(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | '…')
}

const fn is_clause_end(ch: char) -> bool {
    matches!(ch, ',' | ';' | ':' | '—')
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
