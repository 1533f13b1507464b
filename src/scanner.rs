//! Scanner for the small slice of T-SQL that declare blocks are made of.
//!
//! The scanner only distinguishes what the declare rewriter needs to see:
//! the `declare` and `go` keywords, `@variables`, plain words, string
//! literals and a handful of punctuation. Anything else comes back as
//! [`TokenKind::Other`], so arbitrary script text never fails to scan
//! unless a string literal is left open.

use alloc::string::String;
use core::ops::Range;

/// A token produced by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// Byte range of the token in the scanned input.
    pub span: Range<usize>,
}

/// The different kinds of tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// DECLARE keyword
    Declare,
    /// GO batch separator
    Go,
    /// A variable name, including the leading `@`.
    Variable(String),
    /// Any other run of word characters (type names, identifiers, numbers).
    Word(String),
    /// A single-quoted string literal.
    StringLiteral {
        /// Text between the outer quotes, doubled quotes left as written.
        raw: String,
        /// Whether the literal carried an `N` prefix.
        national: bool,
    },
    /// Left parenthesis
    LParen,
    /// Right parenthesis
    RParen,
    /// Comma
    Comma,
    /// Equals sign
    Equals,
    /// Semicolon
    Semicolon,
    /// Any other character.
    Other(char),
    /// End of input
    Eof,
}

/// Errors that can occur during scanning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    /// Unterminated string literal.
    #[error("Unterminated string literal starting at position {pos}")]
    UnterminatedString {
        /// Position where the literal started.
        pos: usize,
    },
}

/// Pull-based scanner with one token of lookahead.
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    peeked: Option<Token>,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            peeked: None,
        }
    }

    /// Get the current position in the input.
    #[must_use]
    pub fn position(&self) -> usize {
        self.peeked.as_ref().map_or(self.pos, |token| token.span.start)
    }

    /// Peek at the next token without consuming it.
    ///
    /// # Errors
    ///
    /// Returns an error if a string literal is not terminated.
    pub fn peek(&mut self) -> Result<&Token, ScanError> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.next_token()?,
        };
        Ok(&*self.peeked.insert(token))
    }

    /// Consume and return the next token.
    ///
    /// # Errors
    ///
    /// Returns an error if a string literal is not terminated.
    pub fn next(&mut self) -> Result<Token, ScanError> {
        if let Some(token) = self.peeked.take() {
            return Ok(token);
        }
        self.next_token()
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        let bytes = self.input.as_bytes();
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else if b == b'-' && bytes.get(self.pos + 1) == Some(&b'-') {
                self.pos += 2;
                while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
            } else if b == b'/' && bytes.get(self.pos + 1) == Some(&b'*') {
                self.pos += 2;
                while self.pos + 1 < bytes.len()
                    && !(bytes[self.pos] == b'*' && bytes[self.pos + 1] == b'/')
                {
                    self.pos += 1;
                }
                // An unterminated block comment swallows the rest of the input.
                self.pos = (self.pos + 2).min(bytes.len());
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, ScanError> {
        self.skip_trivia();

        let start = self.pos;
        let Some(c) = self.input[start..].chars().next() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: start..start,
            });
        };

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '=' => TokenKind::Equals,
            ';' => TokenKind::Semicolon,
            '\'' => return self.read_string(start, start),
            'N' | 'n' if self.input[start + 1..].starts_with('\'') => {
                return self.read_string(start, start + 1);
            }
            '@' if self.input[start + 1..].starts_with(is_word_char) => {
                self.pos += 1;
                let name_end = self.word_end();
                self.pos = name_end;
                return Ok(Token {
                    kind: TokenKind::Variable(self.input[start..name_end].into()),
                    span: start..name_end,
                });
            }
            _ if is_word_char(c) => return Ok(self.read_word(start)),
            _ => TokenKind::Other(c),
        };

        self.pos += c.len_utf8();
        Ok(Token {
            kind,
            span: start..self.pos,
        })
    }

    /// Read a literal whose opening quote sits at `quote_pos`.
    fn read_string(&mut self, start: usize, quote_pos: usize) -> Result<Token, ScanError> {
        let bytes = self.input.as_bytes();
        let content_start = quote_pos + 1;
        self.pos = content_start;

        while self.pos < bytes.len() {
            if bytes[self.pos] == b'\'' {
                if bytes.get(self.pos + 1) == Some(&b'\'') {
                    self.pos += 2;
                } else {
                    let raw = self.input[content_start..self.pos].into();
                    self.pos += 1;
                    return Ok(Token {
                        kind: TokenKind::StringLiteral {
                            raw,
                            national: quote_pos != start,
                        },
                        span: start..self.pos,
                    });
                }
            } else {
                self.pos += 1;
            }
        }

        Err(ScanError::UnterminatedString { pos: start })
    }

    fn read_word(&mut self, start: usize) -> Token {
        let end = self.word_end();
        self.pos = end;
        let word = &self.input[start..end];
        let kind = if word.eq_ignore_ascii_case("declare") {
            TokenKind::Declare
        } else if word.eq_ignore_ascii_case("go") {
            TokenKind::Go
        } else {
            TokenKind::Word(word.into())
        };
        Token {
            kind,
            span: start..end,
        }
    }

    /// Byte offset where the word starting at the current position ends.
    fn word_end(&self) -> usize {
        self.input[self.pos..]
            .find(|c: char| !is_word_char(c))
            .map_or(self.input.len(), |offset| self.pos + offset)
    }
}

/// Word characters in the `\w` sense: ASCII letters, digits and underscore.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
