use std::ops::Range;

use crate::error::{ScriptError, ScriptResult};

/// A token of the condition language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `(`
    Open,
    /// `)`
    Close,
    /// `&&`
    And,
    /// `||`
    Or,
    /// A `!` that is not the start of `!=`.
    Not,
    /// An atom run, trimmed: `light`, `item:owner = kitchen`, `count>2`.
    Atom(String),
}

/// A token with its byte range in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    /// The token.
    pub token: Token,
    /// Its byte range.
    pub span: Range<usize>,
}

/// Split a condition into grouping, logic, and atom tokens.
///
/// An atom run extends until `&`, `|`, `(`, `)`, or the end of input, so
/// comparison operators and whitespace inside an atom stay with it. Those
/// characters do not end a run inside a quoted literal.
pub fn scan(source: &str) -> ScriptResult<Vec<Spanned>> {
    let chars: Vec<(usize, char)> = source.char_indices().collect();
    let at = |i: usize| chars.get(i).map(|&(_, c)| c);
    let pos = |i: usize| chars.get(i).map_or(source.len(), |&(p, _)| p);

    let mut tokens = Vec::new();
    let mut i = 0;
    while let Some(c) = at(i) {
        let start = pos(i);
        let (token, len) = match (c, at(i + 1)) {
            (c, _) if c.is_whitespace() => {
                i += 1;
                continue;
            }
            ('(', _) => (Token::Open, 1),
            (')', _) => (Token::Close, 1),
            ('&', Some('&')) => (Token::And, 2),
            ('|', Some('|')) => (Token::Or, 2),
            ('&', _) => return Err(ScriptError::syntax("expected `&&`", start..start + 1)),
            ('|', _) => return Err(ScriptError::syntax("expected `||`", start..start + 1)),
            ('!', next) if next != Some('=') => (Token::Not, 1),
            _ => {
                let mut j = i;
                // A quote that never closes is a plain character: the run
                // then ends at the first delimiter after it.
                let mut quote: Option<char> = None;
                let mut delimiter_in_quote = None;
                while let Some(c) = at(j) {
                    let delimiter = matches!(c, '(' | ')' | '&' | '|');
                    match quote {
                        Some(q) if c == q => quote = None,
                        Some(_) if delimiter && delimiter_in_quote.is_none() => {
                            delimiter_in_quote = Some(j);
                        }
                        Some(_) => {}
                        None if c == '"' || c == '\'' => {
                            quote = Some(c);
                            delimiter_in_quote = None;
                        }
                        None if delimiter => break,
                        None => {}
                    }
                    j += 1;
                }
                if quote.is_some()
                    && let Some(d) = delimiter_in_quote
                {
                    j = d;
                }
                let text = source[start..pos(j)].trim_end();
                tokens.push(Spanned {
                    token: Token::Atom(text.to_string()),
                    span: start..start + text.len(),
                });
                i = j;
                continue;
            }
        };
        tokens.push(Spanned {
            token,
            span: start..pos(i + len),
        });
        i += len;
    }
    Ok(tokens)
}
