//! Reply chunking — split long text into transport-sized messages.
//!
//! Text is split on `\n`. Lines are accumulated greedily into a chunk until
//! the next line would push it past `max_bytes`; the chunk is then trimmed and
//! emitted. A line is never cut in the middle: a line whose UTF-8 size plus its
//! newline exceeds the limit is an error.

use crate::error::ChunkError;

/// Default outbound message size, kept under the transport's hard limit.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 8192;

/// Split `text` into ordered chunks of at most `max_bytes` UTF-8 bytes.
///
/// Every returned chunk is trimmed and non-empty. Rejoining the chunks with
/// `\n` yields the original lines in order, minus whitespace trimmed at
/// chunk boundaries.
pub fn split_text(text: &str, max_bytes: usize) -> Result<Vec<String>, ChunkError> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for (index, line) in text.split('\n').enumerate() {
        // +1 for the newline that follows the line inside a chunk
        let line_bytes = line.len() + 1;

        if line_bytes > max_bytes {
            return Err(ChunkError::LineTooLarge {
                line_number: index + 1,
                line_bytes,
                max_bytes,
            });
        }

        if current.len() + line_bytes > max_bytes {
            push_trimmed(&mut chunks, &current);
            current.clear();
        }

        current.push_str(line);
        current.push('\n');
    }

    push_trimmed(&mut chunks, &current);
    Ok(chunks)
}

fn push_trimmed(chunks: &mut Vec<String>, chunk: &str) {
    let trimmed = chunk.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}
