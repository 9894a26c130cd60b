use std::fmt;
use std::ops::Range;

use crate::error::{ScriptError, ScriptResult};

/// A token of the assignment language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Numeric literal.
    Number(f64),
    /// Quoted string literal, escapes resolved.
    Str(String),
    /// `true` or `false`.
    Bool(bool),
    /// A variable id or colon path.
    Ident(String),
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `(`
    Open,
    /// `)`
    Close,
}

impl Token {
    /// Whether a `-` after this token is binary subtraction.
    pub fn ends_operand(&self) -> bool {
        matches!(
            self,
            Self::Number(_) | Self::Str(_) | Self::Bool(_) | Self::Ident(_) | Self::Close
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Ident(s) => write!(f, "{s}"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Percent => write!(f, "%"),
            Self::Open => write!(f, "("),
            Self::Close => write!(f, ")"),
        }
    }
}

/// A token with its byte range in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    /// The token.
    pub token: Token,
    /// Its byte range.
    pub span: Range<usize>,
}

struct Scanner<'a> {
    source: &'a str,
    chars: Vec<(usize, char)>,
    i: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().collect(),
            i: 0,
        }
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.i + ahead).map(|&(_, c)| c)
    }

    fn pos(&self) -> usize {
        self.chars.get(self.i).map_or(self.source.len(), |&(p, _)| p)
    }

    fn take_while(&mut self, mut pred: impl FnMut(&Self) -> bool) -> &'a str {
        let source = self.source;
        let start = self.pos();
        while self.peek(0).is_some() && pred(self) {
            self.i += 1;
        }
        &source[start..self.pos()]
    }

    fn next_token(&mut self) -> ScriptResult<Option<Spanned>> {
        while self.peek(0).is_some_and(char::is_whitespace) {
            self.i += 1;
        }
        let start = self.pos();
        let Some(c) = self.peek(0) else {
            return Ok(None);
        };

        let token = match c {
            '+' | '-' | '*' | '/' | '%' | '(' | ')' => {
                self.i += 1;
                match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '%' => Token::Percent,
                    '(' => Token::Open,
                    _ => Token::Close,
                }
            }
            '"' | '\'' => self.string(c, start)?,
            c if c.is_ascii_digit()
                || (c == '.' && self.peek(1).is_some_and(|n| n.is_ascii_digit())) =>
            {
                let text = self.take_while(|s| {
                    s.peek(0)
                        .is_some_and(|c| c.is_ascii_digit() || c == '.')
                });
                let n = text.parse::<f64>().map_err(|_| {
                    ScriptError::syntax(
                        format!("malformed number `{text}`"),
                        start..start + text.len(),
                    )
                })?;
                Token::Number(n)
            }
            c if c.is_alphabetic() || c == '_' => {
                let text = self.take_while(|s| match s.peek(0) {
                    Some(c) if c.is_alphanumeric() || matches!(c, '_' | ':' | '.') => true,
                    Some('-') => s.peek(1).is_some_and(char::is_alphabetic),
                    _ => false,
                });
                match text {
                    "true" => Token::Bool(true),
                    "false" => Token::Bool(false),
                    _ => Token::Ident(text.to_string()),
                }
            }
            other => {
                return Err(ScriptError::syntax(
                    format!("unexpected character `{other}`"),
                    start..start + other.len_utf8(),
                ));
            }
        };
        Ok(Some(Spanned {
            token,
            span: start..self.pos(),
        }))
    }

    fn string(&mut self, quote: char, start: usize) -> ScriptResult<Token> {
        self.i += 1;
        let mut text = String::new();
        loop {
            match self.peek(0) {
                None => {
                    return Err(ScriptError::syntax(
                        "unterminated string",
                        start..self.source.len(),
                    ));
                }
                Some('\\') => {
                    if let Some(escaped) = self.peek(1) {
                        text.push(escaped);
                        self.i += 2;
                    } else {
                        self.i += 1;
                    }
                }
                Some(c) if c == quote => {
                    self.i += 1;
                    return Ok(Token::Str(text));
                }
                Some(c) => {
                    text.push(c);
                    self.i += 1;
                }
            }
        }
    }
}

/// Tokenize an arithmetic expression.
pub fn scan(source: &str) -> ScriptResult<Vec<Spanned>> {
    let mut scanner = Scanner::new(source);
    let mut tokens = Vec::new();
    while let Some(token) = scanner.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}
