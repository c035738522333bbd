//! Lexer (tokenizer) for the netlist language.

use crate::error::{GatewaveError, Result};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in the netlist language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A word: keyword, component or pin name, or a value such as `X` or `1X0`.
    /// A double-quoted string is also an identifier, with its quotes removed.
    Identifier,
    /// An optionally signed decimal integer
    Number,
    /// A directive (starts with '.')
    Directive,
    /// Equals sign '='
    Equals,
    /// Newline
    Newline,
    /// End of file
    Eof,
}

/// Lexer for tokenizing netlist input.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments();

        let line = self.line;
        let column = self.column;
        let token = |kind: TokenKind, text: String| Token {
            kind,
            text,
            line,
            column,
        };

        let ch = match self.chars.peek().copied() {
            Some(ch) => ch,
            None => return Ok(token(TokenKind::Eof, String::new())),
        };

        match ch {
            '\n' => {
                self.advance();
                Ok(token(TokenKind::Newline, "\n".to_string()))
            }
            '.' => {
                self.advance();
                let text = self.read_word();
                if text.is_empty() {
                    return Err(GatewaveError::lexer(line, column, "expected directive name after '.'"));
                }
                Ok(token(TokenKind::Directive, format!(".{}", text)))
            }
            '=' => {
                self.advance();
                Ok(token(TokenKind::Equals, "=".to_string()))
            }
            '"' => {
                self.advance();
                let text = self.read_quoted(line, column)?;
                Ok(token(TokenKind::Identifier, text))
            }
            '-' | '+' => {
                self.advance();
                let digits = self.read_word();
                if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                    return Err(GatewaveError::lexer(
                        line,
                        column,
                        format!("expected digits after '{}'", ch),
                    ));
                }
                Ok(token(TokenKind::Number, format!("{}{}", ch, digits)))
            }
            _ if ch.is_alphanumeric() || ch == '_' => {
                let text = self.read_word();
                // Words that start with a digit but continue with letters
                // (`1X0`, `2b`) are identifiers.
                let kind = if text.chars().all(|c| c.is_ascii_digit()) {
                    TokenKind::Number
                } else {
                    TokenKind::Identifier
                };
                Ok(token(kind, text))
            }
            _ => Err(GatewaveError::lexer(
                line,
                column,
                format!("unexpected character '{}'", ch),
            )),
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else if ch == '#' || ch == ';' {
                // Skip comment until end of line
                while let Some(&c) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    /// Read the rest of a quoted string. Supports `\"`, `\\` and `\n`.
    fn read_quoted(&mut self, line: usize, column: usize) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.advance() {
                Some('"') => return Ok(text),
                Some('\\') => match self.advance() {
                    Some('"') => text.push('"'),
                    Some('\\') => text.push('\\'),
                    Some('n') => text.push('\n'),
                    other => {
                        return Err(GatewaveError::lexer(
                            self.line,
                            self.column,
                            format!("invalid escape {:?} in quoted string", other),
                        ))
                    }
                },
                Some('\n') | None => {
                    return Err(GatewaveError::lexer(line, column, "unterminated quoted string"));
                }
                Some(ch) => text.push(ch),
            }
        }
    }

    fn read_word(&mut self) -> String {
        let mut text = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<(TokenKind, String)> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().unwrap();
            if tok.kind == TokenKind::Eof {
                break;
            }
            out.push((tok.kind, tok.text));
        }
        out
    }

    #[test]
    fn test_lexer_basic() {
        let tokens = kinds("AND g1 inputs=3");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Identifier, "AND".to_string()),
                (TokenKind::Identifier, "g1".to_string()),
                (TokenKind::Identifier, "inputs".to_string()),
                (TokenKind::Equals, "=".to_string()),
                (TokenKind::Number, "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_lexer_directive_and_values() {
        let tokens = kinds(".force ff q X\nREG r state=1X0 y=-12");
        assert_eq!(tokens[0], (TokenKind::Directive, ".force".to_string()));
        assert_eq!(tokens[3], (TokenKind::Identifier, "X".to_string()));
        assert_eq!(tokens[4].0, TokenKind::Newline);
        assert_eq!(tokens[9], (TokenKind::Identifier, "1X0".to_string()));
        assert_eq!(tokens[12], (TokenKind::Number, "-12".to_string()));
    }

    #[test]
    fn test_lexer_skips_comments() {
        let tokens = kinds("# header\nNOT n ; trailing\n");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[1], (TokenKind::Identifier, "NOT".to_string()));
    }

    #[test]
    fn test_lexer_quoted_strings() {
        let tokens = kinds(r##"SWITCH "my switch" color="#f00; x" tag="a\"b\\c""##);
        assert_eq!(tokens[1], (TokenKind::Identifier, "my switch".to_string()));
        assert_eq!(tokens[4], (TokenKind::Identifier, "#f00; x".to_string()));
        assert_eq!(tokens[7], (TokenKind::Identifier, r#"a"b\c"#.to_string()));

        let mut lexer = Lexer::new("NOT \"open\nNOT m");
        lexer.next_token().unwrap();
        assert!(matches!(
            lexer.next_token(),
            Err(GatewaveError::LexerError { line: 1, column: 5, .. })
        ));
    }

    #[test]
    fn test_lexer_reports_position() {
        let mut lexer = Lexer::new("NOT n\n  @");
        for _ in 0..3 {
            lexer.next_token().unwrap();
        }
        match lexer.next_token() {
            Err(GatewaveError::LexerError { line, column, .. }) => {
                assert_eq!((line, column), (2, 3));
            }
            other => panic!("expected lexer error, got {:?}", other),
        }
    }
}
