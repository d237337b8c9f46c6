//! Tokenizer for the surface syntax.

mod cursor;

use cursor::Cursor;
use sysf_common::error::{LexError, LexErrorKind};
use sysf_common::span::Span;
use sysf_common::token::{keyword_from_str, PragmaEntry, Token, TokenKind};

/// The lexer. Converts source text into a stream of tokens, accumulating
/// lexical errors rather than aborting on the first one.
///
/// Indentation carries no syntactic meaning in this language, so unlike a
/// layout-sensitive lexer this one never tracks column for anything but
/// diagnostics (via [`sysf_common::span::LineIndex`], computed on demand).
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    errors: Vec<LexError>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source into a token stream and the list of
    /// lexical errors encountered along the way. The token stream always
    /// ends with `Eof`, even when errors were collected.
    pub fn tokenize(source: &str) -> (Vec<Token>, Vec<LexError>) {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let tok = lexer.next_token();
            let is_eof = matches!(tok.kind, TokenKind::Eof);
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        (tokens, lexer.errors)
    }

    fn push_error(&mut self, kind: LexErrorKind, span: Span) {
        self.errors.push(LexError::new(kind, span));
    }

    fn next_token(&mut self) -> Token {
        self.cursor.eat_while(|c| c.is_whitespace());

        let start = self.cursor.pos();
        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, start, start);
        };

        match c {
            '(' => self.single(TokenKind::LParen, start),
            ')' => self.single(TokenKind::RParen, start),
            '[' => self.single(TokenKind::LBracket, start),
            ']' => self.single(TokenKind::RBracket, start),
            '{' => {
                if self.cursor.peek_next() == Some('-') {
                    self.lex_pragma(start)
                } else {
                    self.single(TokenKind::LBrace, start)
                }
            }
            '}' => self.single(TokenKind::RBrace, start),
            ',' => self.single(TokenKind::Comma, start),
            '@' => self.single(TokenKind::At, start),
            '|' => self.single(TokenKind::Pipe, start),
            '=' => self.single(TokenKind::Equals, start),
            '.' => self.single(TokenKind::Dot, start),
            '+' => self.single(TokenKind::Plus, start),
            '*' => self.single(TokenKind::Star, start),

            ':' => self.lex_colon(start),
            '-' => self.lex_minus_or_comment(start),
            '/' => self.lex_slash(start),
            '\\' => self.single(TokenKind::Lambda, start),

            '→' => self.single(TokenKind::Arrow, start),
            '∀' => self.single(TokenKind::Forall, start),
            'λ' => self.single(TokenKind::Lambda, start),
            'Λ' => self.single(TokenKind::BigLambda, start),

            '"' => self.lex_string(start),

            '0'..='9' => self.lex_int(start),

            c if is_ident_start(c) => self.lex_ident(start),

            other => {
                self.cursor.advance();
                let span = Span::new(start, self.cursor.pos());
                self.push_error(LexErrorKind::UnexpectedCharacter(other), span);
                self.next_token()
            }
        }
    }

    fn single(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        Token::new(kind, start, self.cursor.pos())
    }

    fn lex_colon(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some(':') {
            self.cursor.advance();
            Token::new(TokenKind::ColonColon, start, self.cursor.pos())
        } else {
            Token::new(TokenKind::Colon, start, self.cursor.pos())
        }
    }

    fn lex_slash(&mut self, start: u32) -> Token {
        self.cursor.advance();
        if self.cursor.peek() == Some('\\') {
            self.cursor.advance();
            Token::new(TokenKind::BigLambda, start, self.cursor.pos())
        } else {
            Token::new(TokenKind::Slash, start, self.cursor.pos())
        }
    }

    /// `-` -> `Minus`, `->` -> `Arrow`, `-- | …` -> `DocComment`,
    /// `-- ^ …` -> `ParamDocComment`, any other `-- …` is trivia: skipped,
    /// and lexing resumes with the following token.
    fn lex_minus_or_comment(&mut self, start: u32) -> Token {
        self.cursor.advance(); // consume '-'
        match self.cursor.peek() {
            Some('>') => {
                self.cursor.advance();
                Token::new(TokenKind::Arrow, start, self.cursor.pos())
            }
            Some('-') => {
                self.cursor.advance(); // consume second '-'
                self.cursor.eat_while(|c| c == ' ');
                match self.cursor.peek() {
                    Some('|') => {
                        self.cursor.advance();
                        if self.cursor.peek() == Some(' ') {
                            self.cursor.advance();
                        }
                        let text_start = self.cursor.pos();
                        self.cursor.eat_while(|c| c != '\n');
                        let text = self.cursor.slice(text_start, self.cursor.pos()).to_string();
                        Token::new(TokenKind::DocComment(text), start, self.cursor.pos())
                    }
                    Some('^') => {
                        self.cursor.advance();
                        if self.cursor.peek() == Some(' ') {
                            self.cursor.advance();
                        }
                        let text_start = self.cursor.pos();
                        self.cursor.eat_while(|c| c != '\n');
                        let text = self.cursor.slice(text_start, self.cursor.pos()).to_string();
                        Token::new(TokenKind::ParamDocComment(text), start, self.cursor.pos())
                    }
                    _ => {
                        self.cursor.eat_while(|c| c != '\n');
                        self.next_token()
                    }
                }
            }
            _ => Token::new(TokenKind::Minus, start, self.cursor.pos()),
        }
    }

    /// Lex a `{-# ... #-}` pragma block. The opening `{-` was peeked, not
    /// consumed, by the caller.
    fn lex_pragma(&mut self, start: u32) -> Token {
        self.cursor.advance(); // '{'
        self.cursor.advance(); // '-'
        if self.cursor.peek() != Some('#') {
            // `{-` without a following `#` never occurs in well-formed
            // input (there is no block-comment syntax); treat the dash as
            // an unexpected character and keep the brace as a token.
            let span = Span::new(start, self.cursor.pos());
            self.push_error(LexErrorKind::UnexpectedCharacter('-'), span);
            return Token::new(TokenKind::LBrace, start, start + 1);
        }
        self.cursor.advance(); // '#'

        let content_start = self.cursor.pos();
        loop {
            match self.cursor.peek() {
                None => {
                    let span = Span::new(start, self.cursor.pos());
                    self.push_error(LexErrorKind::UnterminatedPragma, span);
                    return self.next_token();
                }
                Some('#') if self.cursor.peek_next() == Some('-') => {
                    let content_end = self.cursor.pos();
                    self.cursor.advance(); // '#'
                    self.cursor.advance(); // '-'
                    if self.cursor.peek() == Some('}') {
                        self.cursor.advance(); // '}'
                        let content = self.cursor.slice(content_start, content_end);
                        let entries = parse_pragma_entries(content);
                        return Token::new(TokenKind::Pragma(entries), start, self.cursor.pos());
                    }
                    // '#-' not followed by '}': keep scanning, it was content.
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    /// Lex a string literal: `"""…"""` triple-quoted docstrings, or a
    /// single-line `"…"` with escape decoding.
    fn lex_string(&mut self, start: u32) -> Token {
        self.cursor.advance(); // opening '"'

        if self.cursor.peek() == Some('"') && self.cursor.peek_next() == Some('"') {
            self.cursor.advance();
            self.cursor.advance();
            return self.lex_triple_doc(start);
        }

        let mut content = String::new();
        loop {
            match self.cursor.peek() {
                None | Some('\n') => {
                    let span = Span::new(start, self.cursor.pos());
                    self.push_error(LexErrorKind::UnterminatedString, span);
                    return self.next_token();
                }
                Some('"') => {
                    self.cursor.advance();
                    return Token::new(TokenKind::StringLit(content), start, self.cursor.pos());
                }
                Some('\\') => {
                    self.cursor.advance();
                    match self.cursor.advance() {
                        Some('\\') => content.push('\\'),
                        Some('"') => content.push('"'),
                        Some('n') => content.push('\n'),
                        Some('t') => content.push('\t'),
                        Some('r') => content.push('\r'),
                        Some('b') => content.push('\u{0008}'),
                        Some('f') => content.push('\u{000C}'),
                        Some(other) => {
                            let span = Span::new(start, self.cursor.pos());
                            self.push_error(LexErrorKind::UnexpectedCharacter(other), span);
                        }
                        None => {
                            let span = Span::new(start, self.cursor.pos());
                            self.push_error(LexErrorKind::UnterminatedString, span);
                            return self.next_token();
                        }
                    }
                }
                Some(c) => {
                    self.cursor.advance();
                    content.push(c);
                }
            }
        }
    }

    fn lex_triple_doc(&mut self, start: u32) -> Token {
        let content_start = self.cursor.pos();
        loop {
            match self.cursor.peek() {
                None => {
                    let span = Span::new(start, self.cursor.pos());
                    self.push_error(LexErrorKind::UnterminatedString, span);
                    return self.next_token();
                }
                Some('"') if self.cursor.peek_next() == Some('"') => {
                    let content_end = self.cursor.pos();
                    self.cursor.advance();
                    self.cursor.advance();
                    if self.cursor.peek() == Some('"') {
                        self.cursor.advance();
                        let text = self.cursor.slice(content_start, content_end).to_string();
                        return Token::new(TokenKind::TripleDoc(text), start, self.cursor.pos());
                    }
                }
                Some(_) => {
                    self.cursor.advance();
                }
            }
        }
    }

    fn lex_int(&mut self, start: u32) -> Token {
        self.cursor.eat_while(|c| c.is_ascii_digit());
        let text = self.cursor.slice(start, self.cursor.pos());
        let value = text.parse::<i64>().unwrap_or(i64::MAX);
        Token::new(TokenKind::IntLit(value), start, self.cursor.pos())
    }

    fn lex_ident(&mut self, start: u32) -> Token {
        let first = self.cursor.advance().unwrap();
        self.cursor.eat_while(is_ident_continue);
        let text = self.cursor.slice(start, self.cursor.pos());

        if let Some(kw) = keyword_from_str(text) {
            return Token::new(kw, start, self.cursor.pos());
        }
        if first.is_uppercase() {
            Token::new(
                TokenKind::Constructor(text.to_string()),
                start,
                self.cursor.pos(),
            )
        } else {
            Token::new(TokenKind::Ident(text.to_string()), start, self.cursor.pos())
        }
    }
}

/// Parse a pragma payload (the text between `{-#` and `#-}`) into ordered
/// key=value entries. Entries are comma-separated; an entry with no `=`
/// is a bare tag stored under the empty key.
fn parse_pragma_entries(content: &str) -> Vec<PragmaEntry> {
    content
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|part| match part.split_once('=') {
            Some((key, value)) => PragmaEntry {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            },
            None => PragmaEntry {
                key: String::new(),
                value: part.trim().to_string(),
            },
        })
        .collect()
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
