use crate::builtin::{Keyword, KEYWORDS};
use crate::errors::*;

/// One classified piece of input
#[derive(Debug, Clone, PartialEq)]
pub enum Lexeme<'a> {
    Number(f64),
    Text(&'a str),
    Keyword(Keyword),
    Identifier(&'a str),
}

/// Cursor over a line of input that yields one lexeme at a time
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    /// Advance past exactly one lexeme. `None` at end of input.
    pub fn next_lexeme(&mut self) -> Result<Option<Lexeme<'a>>> {
        self.skip_whitespace();

        match self.peek() {
            None => Ok(None),
            Some(b'0'..=b'9') => self.number().map(Some),
            Some(b'"') => self.string().map(Some),
            Some(_) => Ok(Some(self.keyword_or_identifier())),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).cloned()
    }

    fn byte_at(&self, pos: usize) -> Option<u8> {
        self.input.as_bytes().get(pos).cloned()
    }

    fn at_boundary(&self, pos: usize) -> bool {
        match self.byte_at(pos) {
            None => true,
            Some(ch) => is_whitespace(ch),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(true) = self.peek().map(is_whitespace) {
            self.pos += 1;
        }
    }

    fn digit(&self) -> Option<f64> {
        match self.peek() {
            Some(ch @ b'0'..=b'9') => Some(f64::from(ch - b'0')),
            _ => None,
        }
    }

    fn number(&mut self) -> Result<Lexeme<'a>> {
        let start = self.pos;

        let mut value = 0.0;
        while let Some(d) = self.digit() {
            value = value * 10.0 + d;
            self.pos += 1;
        }

        if self.peek() == Some(b'.') && self.byte_at(self.pos + 1).map_or(false, is_digit) {
            self.pos += 1;
            let mut divisor = 10.0;
            while let Some(d) = self.digit() {
                value += d / divisor;
                divisor *= 10.0;
                self.pos += 1;
            }
        }

        if self.at_boundary(self.pos) || self.peek() == Some(b'.') {
            Ok(Lexeme::Number(value))
        } else {
            self.pos = start;
            let word = self.word();
            Err(ErrorKind::UnknownToken(word.to_string()).into())
        }
    }

    fn string(&mut self) -> Result<Lexeme<'a>> {
        let input = self.input;
        let start = self.pos + 1;
        match input[start..].find('"') {
            Some(len) => {
                self.pos = start + len + 1;
                Ok(Lexeme::Text(&input[start..start + len]))
            }
            None => {
                self.pos = input.len();
                Err(ErrorKind::UnterminatedString.into())
            }
        }
    }

    fn keyword_or_identifier(&mut self) -> Lexeme<'a> {
        let input = self.input;
        let rest = &input[self.pos..];
        for &(name, keyword) in KEYWORDS {
            if rest.starts_with(name) && self.at_boundary(self.pos + name.len()) {
                self.pos += name.len();
                return Lexeme::Keyword(keyword);
            }
        }
        Lexeme::Identifier(self.word())
    }

    /// Everything up to the next whitespace.
    fn word(&mut self) -> &'a str {
        let input = self.input;
        let start = self.pos;
        while !self.at_boundary(self.pos) {
            self.pos += 1;
        }
        &input[start..self.pos]
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Lexeme<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_lexeme().transpose()
    }
}

/// Whether `name` would be read back as an identifier.
pub fn is_identifier(name: &str) -> bool {
    if name.is_empty() || name.bytes().any(is_whitespace) {
        return false;
    }
    match Lexer::new(name).next_lexeme() {
        Ok(Some(Lexeme::Identifier(word))) => word == name,
        _ => false,
    }
}

fn is_whitespace(ch: u8) -> bool {
    ch == b' ' || ch == b'\t' || ch == b'\n' || ch == b'\r'
}

fn is_digit(ch: u8) -> bool {
    ch.is_ascii_digit()
}
