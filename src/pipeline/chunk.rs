//! Greedy whitespace chunking for the local model's context window.
//!
//! Sentence boundaries are approximated by inserting a space after every
//! `.`, `?` and `!`, then splitting on whitespace. Tokens are packed into a
//! buffer until the next one would bring the buffer to `max_chunk_size`
//! characters. Lengths are counted in `char`s so multi-byte text is not
//! split more aggressively than ASCII.

/// Default chunk length, in characters.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 512;

/// Split `text` into ordered chunks of fewer than `max_chunk_size` characters.
///
/// A single token longer than the limit becomes a chunk on its own. Chunks
/// are trimmed and never empty; empty or all-whitespace input yields no
/// chunks. Joining the chunks with single spaces gives back the token
/// sequence of the input.
pub fn chunk_text(text: &str, max_chunk_size: usize) -> Vec<String> {
    let spaced = text
        .replace('.', ". ")
        .replace('?', "? ")
        .replace('!', "! ");

    let mut chunks = Vec::new();
    let mut buffer = String::new();
    // char count of `buffer`, including its trailing space
    let mut buffer_len = 0usize;

    for token in spaced.split_whitespace() {
        let token_len = token.chars().count();
        if buffer_len + token_len >= max_chunk_size && !buffer.is_empty() {
            chunks.push(buffer.trim().to_string());
            buffer.clear();
            buffer_len = 0;
        }
        buffer.push_str(token);
        buffer.push(' ');
        buffer_len += token_len + 1;
    }

    if !buffer.is_empty() {
        chunks.push(buffer.trim().to_string());
    }

    chunks
}
