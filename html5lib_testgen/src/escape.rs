//! Embedding fixture input in generated raw string literals.
//!
//! Rust raw strings cannot contain a bare carriage return, so a lone `\r` is
//! widened to `\r\n`. This changes the bytes under test for CR-only inputs;
//! the generated snapshot reflects the widened input.

/// Number of `#` used around raw literals unless the input forces more.
pub const DEFAULT_HASHES: usize = 4;

/// Rewrite every carriage return that is not already followed by a line feed.
pub fn escape_input(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        out.push(ch);
        if ch == '\r' && chars.peek() != Some(&'\n') {
            out.push('\n');
        }
    }
    out
}

/// Smallest hash count `>= min_hashes` whose closing delimiter never occurs in `text`.
pub fn hashes_needed(text: &str, min_hashes: usize) -> usize {
    let mut longest = 0;
    let mut rest = text;
    while let Some(pos) = rest.find('"') {
        rest = &rest[pos + 1..];
        let run = rest.chars().take_while(|&c| c == '#').count();
        longest = longest.max(run + 1);
    }
    longest.max(min_hashes)
}

/// Render `raw` as a raw string literal, e.g. `r####"<a>"####`.
pub fn raw_literal(raw: &str, min_hashes: usize) -> String {
    let body = escape_input(raw);
    let hashes = "#".repeat(hashes_needed(&body, min_hashes));
    format!("r{hashes}\"{body}\"{hashes}")
}
