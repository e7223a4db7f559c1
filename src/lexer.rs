//! Text → token stream.
//!
//! Single-pass, one-character lookahead. Multi-character tokens are
//! resolved by a small family of `make_*` helpers that peek one character
//! past the one that triggered them, falling back to the single-character
//! token when the lookahead doesn't match.

use crate::diagnostic::{Context, Diagnostic, ErrorKind, Stage};
use crate::position::Position;
use crate::token::{is_type_word, Keyword, Token, TokenKind, TokenValue};

pub struct Lexer {
    context: Context,
    chars: Vec<char>,
    idx: usize,
    pos: Position,
    current: Option<char>,
}

impl Lexer {
    pub fn new(source: &str, context: Context) -> Lexer {
        let chars: Vec<char> = source.chars().collect();
        let current = chars.first().copied();
        Lexer {
            context,
            chars,
            idx: 0,
            pos: Position::start(),
            current,
        }
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current {
            self.pos.advance(ch);
        }
        self.idx += 1;
        self.current = self.chars.get(self.idx).copied();
    }

    fn error(&self, kind: ErrorKind, details: impl Into<String>, start: Position) -> Diagnostic {
        Diagnostic::new(
            kind,
            details,
            Some(start),
            self.context.clone(),
            Stage::Tokenizing,
        )
    }

    /// Tokenize the full input, returning the token stream ending in `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, Diagnostic> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.current {
            match ch {
                ' ' | '\t' | '\r' => self.advance(),
                '#' => self.skip_comment(),
                '\n' | ';' => {
                    let start = self.pos.copy();
                    self.advance();
                    tokens.push(Token::new(TokenKind::Newline, None, Position::spanning_from(start, self.pos.copy())));
                }
                '+' => self.emit_single(&mut tokens, TokenKind::Plus),
                '*' => self.emit_single(&mut tokens, TokenKind::Mul),
                '/' => self.emit_single(&mut tokens, TokenKind::Div),
                '%' => self.emit_single(&mut tokens, TokenKind::Mod),
                '^' => self.emit_single(&mut tokens, TokenKind::Pow),
                '(' => self.emit_single(&mut tokens, TokenKind::LParen),
                ')' => self.emit_single(&mut tokens, TokenKind::RParen),
                '!' => self.emit_single(&mut tokens, TokenKind::Not),
                '=' => self.emit_single(&mut tokens, TokenKind::Equals),
                '&' => self.emit_single(&mut tokens, TokenKind::And),
                '|' => self.emit_single(&mut tokens, TokenKind::Or),
                '~' => self.emit_single(&mut tokens, TokenKind::Xor),
                ',' => self.emit_single(&mut tokens, TokenKind::Comma),
                '[' => self.emit_single(&mut tokens, TokenKind::LSquare),
                ']' => self.emit_single(&mut tokens, TokenKind::RSquare),
                ':' => self.emit_single(&mut tokens, TokenKind::Colon),
                '{' => self.emit_single(&mut tokens, TokenKind::LCurly),
                '}' => self.emit_single(&mut tokens, TokenKind::RCurly),
                '-' => tokens.push(self.make_minus_things()),
                '.' => tokens.push(self.make_dot_things()),
                '<' => tokens.push(self.make_smaller_things()),
                '>' => tokens.push(self.make_bigger_things()),
                '\'' => tokens.push(self.make_string()?),
                c if c.is_ascii_digit() => tokens.push(self.make_number()),
                c if c.is_alphabetic() => tokens.push(self.make_identifier()),
                other => {
                    let start = self.pos.copy();
                    return Err(self.error(
                        ErrorKind::IllegalChar,
                        format!("found illegal char: {}", other),
                        start,
                    ));
                }
            }
        }

        tokens.push(Token::new(TokenKind::Eof, None, self.pos.copy()));
        Ok(tokens)
    }

    fn emit_single(&mut self, tokens: &mut Vec<Token>, kind: TokenKind) {
        let start = self.pos.copy();
        self.advance();
        tokens.push(Token::new(kind, None, Position::spanning_from(start, self.pos.copy())));
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.current {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn make_identifier(&mut self) -> Token {
        let start = self.pos.copy();
        let mut text = String::new();
        while let Some(c) = self.current {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let position = Position::spanning_from(start, self.pos.copy());
        let upper = text.to_uppercase();
        if is_type_word(&upper) {
            Token::new(TokenKind::TypeWord, Some(TokenValue::Text(text)), position)
        } else if let Some(kw) = Keyword::from_upper(&upper) {
            Token::new(TokenKind::Keyword, Some(TokenValue::Keyword(kw)), position)
        } else {
            Token::new(TokenKind::Identifier, Some(TokenValue::Text(text)), position)
        }
    }

    fn make_number(&mut self) -> Token {
        let start = self.pos.copy();
        let mut text = String::new();
        let mut dot_count = 0;
        while let Some(c) = self.current {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else if c == '.' && dot_count == 0 {
                dot_count += 1;
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let position = Position::spanning_from(start, self.pos.copy());
        if dot_count == 0 {
            Token::new(
                TokenKind::Int,
                Some(TokenValue::Int(text.parse().unwrap_or(0))),
                position,
            )
        } else {
            Token::new(
                TokenKind::Float,
                Some(TokenValue::Float(text.parse().unwrap_or(0.0))),
                position,
            )
        }
    }

    fn make_string(&mut self) -> Result<Token, Diagnostic> {
        let start = self.pos.copy();
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.current {
                None => {
                    return Err(self.error(
                        ErrorKind::InvalidSyntax,
                        format!("unclosed string literal '{}'", text),
                        start,
                    ))
                }
                Some('\'') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.current {
                        None => {
                            return Err(self.error(
                                ErrorKind::InvalidSyntax,
                                format!("unclosed string literal '{}'", text),
                                start,
                            ))
                        }
                        Some(escaped) => {
                            let mapped = match escaped {
                                'n' => '\n',
                                't' => '\t',
                                other => other,
                            };
                            text.push(mapped);
                            self.advance();
                        }
                    }
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
        let position = Position::spanning_from(start, self.pos.copy());
        Ok(Token::new(TokenKind::Str, Some(TokenValue::Str(text)), position))
    }

    fn make_smaller_things(&mut self) -> Token {
        let start = self.pos.copy();
        self.advance();
        match self.current {
            Some('=') => {
                self.advance();
                Token::new(TokenKind::LessEqual, None, Position::spanning_from(start, self.pos.copy()))
            }
            Some('>') => {
                self.advance();
                Token::new(TokenKind::NotEquals, None, Position::spanning_from(start, self.pos.copy()))
            }
            Some('-') => {
                self.advance();
                Token::new(TokenKind::Assign, None, Position::spanning_from(start, self.pos.copy()))
            }
            _ => Token::new(TokenKind::Less, None, Position::spanning_from(start, self.pos.copy())),
        }
    }

    fn make_bigger_things(&mut self) -> Token {
        let start = self.pos.copy();
        self.advance();
        if self.current == Some('=') {
            self.advance();
            Token::new(TokenKind::GreaterEqual, None, Position::spanning_from(start, self.pos.copy()))
        } else {
            Token::new(TokenKind::Greater, None, Position::spanning_from(start, self.pos.copy()))
        }
    }

    fn make_dot_things(&mut self) -> Token {
        let start = self.pos.copy();
        self.advance();
        if self.current == Some('.') {
            self.advance();
            Token::new(TokenKind::Range, None, Position::spanning_from(start, self.pos.copy()))
        } else {
            Token::new(TokenKind::Dot, None, Position::spanning_from(start, self.pos.copy()))
        }
    }

    fn make_minus_things(&mut self) -> Token {
        let start = self.pos.copy();
        self.advance();
        if self.current == Some('>') {
            self.advance();
            Token::new(TokenKind::Arrow, None, Position::spanning_from(start, self.pos.copy()))
        } else {
            Token::new(TokenKind::Minus, None, Position::spanning_from(start, self.pos.copy()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(src: &str) -> Vec<Token> {
        Lexer::new(src, Context::root("test.ember"))
            .tokenize()
            .expect("tokenize should succeed")
    }

    #[test]
    fn lex_round_trip_length() {
        let tokens = tokenize("x <- 12 + foo_bar");
        for tok in &tokens {
            if tok.kind == TokenKind::Eof {
                continue;
            }
            assert!(tok.position.len > 0, "token {:?} has zero length", tok);
        }
    }

    #[test]
    fn newline_and_semicolon_are_equivalent() {
        let a = tokenize("x\n");
        let b = tokenize("x;");
        assert_eq!(a.len(), b.len());
        assert_eq!(a[1].kind, TokenKind::Newline);
        assert_eq!(b[1].kind, TokenKind::Newline);
    }

    #[test]
    fn comment_consumed_to_newline() {
        let tokens = tokenize("x <- 1 # a comment\ny <- 2");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert!(!kinds.contains(&TokenKind::Not)); // '#' never becomes a token
    }

    #[test]
    fn multi_char_operators_resolve_with_fallback() {
        let tokens = tokenize("<= <> <- < >= > .. . ->");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::LessEqual,
                TokenKind::NotEquals,
                TokenKind::Assign,
                TokenKind::Less,
                TokenKind::GreaterEqual,
                TokenKind::Greater,
                TokenKind::Range,
                TokenKind::Dot,
                TokenKind::Arrow,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_escapes() {
        let tokens = tokenize(r"'hi\n\tthere\' end'");
        match &tokens[0].value {
            Some(TokenValue::Str(s)) => assert_eq!(s, "hi\n\tthere' end"),
            other => panic!("expected string token, got {:?}", other),
        }
    }

    #[test]
    fn unterminated_string_is_invalid_syntax() {
        let err = Lexer::new("'unterminated", Context::root("test.ember"))
            .tokenize()
            .unwrap_err();
        assert_eq!(err.kind, crate::diagnostic::ErrorKind::InvalidSyntax);
    }

    #[test]
    fn illegal_char_is_reported() {
        let err = Lexer::new("@", Context::root("test.ember"))
            .tokenize()
            .unwrap_err();
        assert_eq!(err.kind, crate::diagnostic::ErrorKind::IllegalChar);
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let tokens = tokenize("if While fun");
        assert_eq!(tokens[0].kind, TokenKind::Keyword);
        assert_eq!(tokens[1].kind, TokenKind::Keyword);
        assert_eq!(tokens[2].kind, TokenKind::Keyword);
    }

    #[test]
    fn type_words_recognized() {
        let tokens = tokenize("int float list byte");
        for t in &tokens[..4] {
            assert_eq!(t.kind, TokenKind::TypeWord);
        }
    }
}
