//! The chunker (spec §4.1). Runs once, ahead of parsing, to validate that
//! braces/parens/strings/comments are balanced and to produce chunk
//! boundaries the parser can use for cheap lookahead. Fails fast rather
//! than letting the recursive-descent parser discover an unterminated
//! string three levels of nesting later with a confusing error.

use codemap::{File, Span};
use std::sync::Arc;

use crate::error::{LessError, LessResult};

/// A validated, balanced fragment of source: `[start, end)` byte offsets
/// into the file, split at a safe point (top-level `;` or `}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringState {
    None,
    Double,
    Single,
}

/// Scans `file`'s source, tracking brace/paren nesting and string/comment
/// state, and returns the list of top-level chunks. The reference
/// classifier treats a `/* comment */` inside parens as valid (spec §4.1);
/// we do too, by only breaking out of comment-skipping once the closing
/// `*/` is found regardless of paren depth.
pub fn chunk(file: &Arc<File>) -> LessResult<Vec<Chunk>> {
    let source = file.source();
    let bytes = source.as_bytes();
    let mut chunks = Vec::new();
    let mut chunk_start = 0usize;
    let mut brace_depth: i32 = 0;
    let mut paren_depth: i32 = 0;
    let mut string_state = StringState::None;
    let mut i = 0usize;

    macro_rules! err_at {
        ($msg:expr, $idx:expr) => {
            return Err(LessError::parse($msg, file.span.subspan($idx as u64, $idx as u64)))
        };
    }

    while i < bytes.len() {
        let c = bytes[i] as char;
        match string_state {
            StringState::Double | StringState::Single => {
                let quote = if string_state == StringState::Double {
                    '"'
                } else {
                    '\''
                };
                if c == '\\' && i + 1 < bytes.len() {
                    i += 2;
                    continue;
                }
                if c == quote {
                    string_state = StringState::None;
                }
                if c == '\n' {
                    err_at!("Unterminated string", chunk_start);
                }
                i += 1;
                continue;
            }
            StringState::None => {}
        }

        match c {
            '"' => string_state = StringState::Double,
            '\'' => string_state = StringState::Single,
            '/' if bytes.get(i + 1) == Some(&b'*') => {
                let close = find_comment_close(bytes, i + 2);
                match close {
                    Some(end) => i = end,
                    None => err_at!("Missing closing */", i),
                }
            }
            '/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            '{' => brace_depth += 1,
            '}' => {
                brace_depth -= 1;
                if brace_depth < 0 {
                    err_at!("Unexpected }", i);
                }
                if brace_depth == 0 && paren_depth == 0 {
                    chunks.push(Chunk {
                        start: chunk_start,
                        end: i + 1,
                    });
                    chunk_start = i + 1;
                }
            }
            '(' => paren_depth += 1,
            ')' => {
                paren_depth -= 1;
                if paren_depth < 0 {
                    err_at!("Unexpected )", i);
                }
            }
            ';' if brace_depth == 0 && paren_depth == 0 => {
                chunks.push(Chunk {
                    start: chunk_start,
                    end: i + 1,
                });
                chunk_start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if string_state != StringState::None {
        err_at!("Unterminated string", chunk_start);
    }
    if brace_depth != 0 {
        err_at!("Missing closing }", bytes.len().saturating_sub(1));
    }
    if paren_depth != 0 {
        err_at!("Missing closing )", bytes.len().saturating_sub(1));
    }
    if chunk_start < bytes.len() {
        chunks.push(Chunk {
            start: chunk_start,
            end: bytes.len(),
        });
    }
    Ok(chunks)
}

fn find_comment_close(bytes: &[u8], mut i: usize) -> Option<usize> {
    while i + 1 < bytes.len() {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return Some(i + 2);
        }
        i += 1;
    }
    None
}

/// Helper used by callers that want a `Span` for a byte offset within the
/// chunked file without re-deriving it each time.
pub fn span_at(file: &Arc<File>, index: usize) -> Span {
    let lo = index.min(file.source().len()) as u64;
    file.span.subspan(lo, lo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pos::SourceMap;

    fn chunks_of(src: &str) -> LessResult<Vec<String>> {
        let map = SourceMap::new();
        let file = map.add_file("t.less".into(), src.into());
        Ok(chunk(&file)?
            .into_iter()
            .map(|c| file.source()[c.start..c.end].to_owned())
            .collect())
    }

    #[test]
    fn splits_on_top_level_semicolons_and_braces() {
        let chunks = chunks_of("@a: 1; .b { color: red; }").unwrap();
        assert_eq!(chunks, vec!["@a: 1;", " .b { color: red; }"]);
    }

    #[test]
    fn comment_inside_parens_is_valid() {
        assert!(chunks_of(".a { width: calc(1px /* ok */); }").is_ok());
    }

    #[test]
    fn unterminated_brace_fails() {
        assert!(chunks_of(".a { color: red;").is_err());
    }

    #[test]
    fn unterminated_string_fails() {
        assert!(chunks_of(".a { content: \"oops; }").is_err());
    }
}
