use std::str::Chars;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Maximize,
    Minimize,
    Subject,
    To,
    St,

    // Literals
    Ident,
    Number,

    // Operators
    Plus,
    Minus,
    Star,
    Le,
    Ge,
    Eq,
    Colon,

    // Special
    Newline,
    Semicolon,
    Comment,
    Eof,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    pos: usize,
    current: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            source,
            chars,
            pos: 0,
            current,
        }
    }

    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current;
        self.current = self.chars.next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        c
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_comment(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        self.token(TokenKind::Comment, start)
    }

    fn read_number(&mut self) -> Token {
        let start = self.pos;

        // Integer part
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        // Decimal part, also accepts a bare leading dot like `.5`
        if self.peek() == Some('.') {
            self.advance();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        // Exponent, only when digits follow so `2ex` stays a number and a name
        if matches!(self.peek(), Some('e' | 'E')) && self.exponent_follows() {
            self.advance();
            if matches!(self.peek(), Some('+' | '-')) {
                self.advance();
            }
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        self.token(TokenKind::Number, start)
    }

    /// Looks past an `e` for an optional sign and a digit
    fn exponent_follows(&self) -> bool {
        let mut rest = self.chars.clone();
        match rest.next() {
            Some('+' | '-') => rest.next().is_some_and(|c| c.is_ascii_digit()),
            Some(c) => c.is_ascii_digit(),
            None => false,
        }
    }

    fn read_ident(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.source[start..self.pos];
        let kind = match text.to_ascii_lowercase().as_str() {
            "maximize" | "maximise" | "max" => TokenKind::Maximize,
            "minimize" | "minimise" | "min" => TokenKind::Minimize,
            "subject" => TokenKind::Subject,
            "to" => TokenKind::To,
            "st" => TokenKind::St,
            _ => TokenKind::Ident,
        };
        Token::new(kind, Span::new(start, self.pos), text)
    }

    /// Consume `len` chars and emit a token covering them
    fn single(&mut self, kind: TokenKind, len: usize) -> Token {
        let start = self.pos;
        for _ in 0..len {
            self.advance();
        }
        self.token(kind, start)
    }

    fn token(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(kind, Span::new(start, self.pos), &self.source[start..self.pos])
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;

        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, Span::new(start, start), "");
        };

        match c {
            '\n' => self.single(TokenKind::Newline, 1),
            ';' => self.single(TokenKind::Semicolon, 1),
            '#' => self.read_comment(),
            '/' if self.peek_next() == Some('/') => self.read_comment(),
            '+' => self.single(TokenKind::Plus, 1),
            '-' => self.single(TokenKind::Minus, 1),
            '*' => self.single(TokenKind::Star, 1),
            ':' => self.single(TokenKind::Colon, 1),
            '≤' => self.single(TokenKind::Le, 1),
            '≥' => self.single(TokenKind::Ge, 1),
            '<' if self.peek_next() == Some('=') => self.single(TokenKind::Le, 2),
            '>' if self.peek_next() == Some('=') => self.single(TokenKind::Ge, 2),
            '=' => match self.peek_next() {
                Some('<') => self.single(TokenKind::Le, 2),
                Some('>') => self.single(TokenKind::Ge, 2),
                Some('=') => self.single(TokenKind::Eq, 2),
                _ => self.single(TokenKind::Eq, 1),
            },
            '.' if self.peek_next().is_some_and(|n| n.is_ascii_digit()) => self.read_number(),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_alphabetic() || c == '_' => self.read_ident(),
            _ => self.single(TokenKind::Error, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("maximize MIN Maximise subject to st"),
            vec![
                TokenKind::Maximize,
                TokenKind::Minimize,
                TokenKind::Maximize,
                TokenKind::Subject,
                TokenKind::To,
                TokenKind::St,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = Lexer::tokenize("100 8.5 0.005 .25");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["100", "8.5", "0.005", ".25", ""]);
    }

    #[test]
    fn test_scientific_notation() {
        let tokens = Lexer::tokenize("1e3x 2.5E-2 4e+1y");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["1e3", "x", "2.5E-2", "4e+1", "y", ""]);
    }

    #[test]
    fn test_bare_e_is_not_an_exponent() {
        assert_eq!(
            kinds("2ex 3e-"),
            vec![
                TokenKind::Number,
                TokenKind::Ident,
                TokenKind::Number,
                TokenKind::Ident,
                TokenKind::Minus,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_minus_is_always_an_operator() {
        assert_eq!(
            kinds("3x -2y"),
            vec![
                TokenKind::Number,
                TokenKind::Ident,
                TokenKind::Minus,
                TokenKind::Number,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_relations() {
        assert_eq!(
            kinds("<= >= = =< => == ≤ ≥"),
            vec![
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::Eq,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::Eq,
                TokenKind::Le,
                TokenKind::Ge,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strict_relation_is_an_error() {
        assert_eq!(kinds("x < 4")[1], TokenKind::Error);
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("x # note\n// whole line\ny"),
            vec![
                TokenKind::Ident,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let tokens = Lexer::tokenize("x ≤ 4");
        assert_eq!(tokens[1].span, Span::new(2, 5));
        assert_eq!(tokens[2].span, Span::new(6, 7));
    }
}
