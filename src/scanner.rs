use std::str::Chars;

use peekmore::{PeekMore, PeekMoreIterator};
use substring::Substring;

use crate::error::{Error, ScanError};
use crate::literal::Literal;
use crate::token::{Location, Token, Kind};

/// Converts a character stream into a token stream.
///
/// The scanner keeps a `[start, current)` window of char indices over the
/// source while a peekable cursor walks the characters. Lexemes are the exact
/// source slice of the window, so concatenating every lexeme recovers the
/// source modulo whitespace and comments.
pub struct Scanner<'a> {
    source: &'a str,
    chars: PeekMoreIterator<Chars<'a>>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    column_offset: usize,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner.
    pub fn new(source: &'a str) -> Scanner<'a> {
        Scanner {
            source,
            chars: source.chars().peekmore(),
            tokens: vec!(),
            start: 0,
            current: 0,
            line: 1,
            column_offset: 0,
        }
    }

    /// Scans the source code and returns a vector of tokens.
    /// The returned stream always ends with exactly one EOF token.
    pub fn scan_tokens(&mut self) -> Vec<Token> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token();
        }

        self.tokens.push(
            Token::new(
                Kind::EOF,
                String::from(""),
                None,
                Location::new(self.line, self.current - self.column_offset + 1),
            )
        );

        self.tokens.clone()
    }

    /// Consumes and returns the next character.
    fn advance(&mut self) -> char {
        match self.chars.next() {
            Some(char) => {
                self.current += 1;
                char
            },
            None => panic!("tried to advance past end of the source."),
        }
    }

    /// Returns the next character without consuming it.
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Returns the character after the next one without consuming anything.
    fn peek_next(&mut self) -> Option<char> {
        self.chars.peek_nth(1).copied()
    }

    /// Consumes the next character if it is the expected character.
    fn match_next(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            return true;
        }

        false
    }

    /// Returns if the scanner has reached the end of the source.
    fn is_at_end(&mut self) -> bool {
        self.chars.peek().is_none()
    }

    /// Returns the location of the current lexeme's first character.
    fn location(&self) -> Location {
        Location::new(self.line, self.start - self.column_offset + 1)
    }

    /// Adds a new token to the list of tokens, slicing its lexeme from the window.
    fn add_token(&mut self, kind: Kind) {
        let lexeme = self.source.substring(self.start, self.current).to_string();
        self.tokens.push(Token::new(kind, lexeme, None, self.location()));
    }

    /// Adds a new literal-carrying token at an explicit location.
    fn add_literal_token(&mut self, kind: Kind, literal: Literal, location: Location) {
        let lexeme = self.source.substring(self.start, self.current).to_string();
        self.tokens.push(Token::new(kind, lexeme, Some(literal), location));
    }

    /// Handles a string literal. Strings may span lines.
    fn string(&mut self) {
        // The opening quote is already consumed; the token points at it.
        let location = self.location();

        while let Some(c) = self.peek() {
            if c == '"' {
                break;
            }

            self.advance();

            if c == '\n' {
                self.line += 1;
                self.column_offset = self.current;
            }
        }

        if self.is_at_end() {
            ScanError {
                location,
                message: String::from("Unterminated string"),
            }.throw();
            return;
        }

        self.advance(); // The closing quote.

        // The literal value excludes the surrounding quotes, the lexeme keeps them.
        let value = self.source.substring(self.start + 1, self.current - 1).to_string();
        self.add_literal_token(Kind::String, Literal::String(value), location);
    }

    /// Handles a number literal.
    /// A trailing `.` with no fractional digit is not part of the number.
    fn number(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') && matches!(self.peek_next(), Some(c) if c.is_ascii_digit()) {
            self.advance(); // The dot.

            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.advance();
            }
        }

        let value: f64 = self.source.substring(self.start, self.current)
            .parse()
            .expect("scanned number to be a valid double");

        self.add_literal_token(Kind::Number, Literal::Number(value), self.location());
    }

    /// Handles an identifier or a keyword.
    fn identifier(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.advance();
        }

        let kind = match self.source.substring(self.start, self.current) {
            "and"      => Kind::And,
            "class"    => Kind::Class,
            "else"     => Kind::Else,
            "false"    => Kind::False,
            "for"      => Kind::For,
            "fun"      => Kind::Fun,
            "if"       => Kind::If,
            "nil"      => Kind::Nil,
            "or"       => Kind::Or,
            "print"    => Kind::Print,
            "return"   => Kind::Return,
            "super"    => Kind::Super,
            "this"     => Kind::This,
            "true"     => Kind::True,
            "var"      => Kind::Var,
            "while"    => Kind::While,
            _          => Kind::Identifier,
        };

        self.add_token(kind);
    }

    /// Handles a `/* ... */` comment. Nesting is not supported.
    fn block_comment(&mut self) {
        let location = self.location();

        loop {
            match self.peek() {
                None => {
                    ScanError {
                        location,
                        message: String::from("Unterminated block comment"),
                    }.throw();
                    return;
                },
                Some('*') if self.peek_next() == Some('/') => {
                    self.advance();
                    self.advance();
                    return;
                },
                Some(c) => {
                    self.advance();

                    if c == '\n' {
                        self.line += 1;
                        self.column_offset = self.current;
                    }
                },
            }
        }
    }

    /// Scans the next token.
    fn scan_token(&mut self) {
        let c = self.advance();
        match c {
            // One character tokens
            '(' => self.add_token(Kind::LeftParen),
            ')' => self.add_token(Kind::RightParen),
            '{' => self.add_token(Kind::LeftBrace),
            '}' => self.add_token(Kind::RightBrace),
            ',' => self.add_token(Kind::Comma),
            '.' => self.add_token(Kind::Dot),
            '-' => self.add_token(Kind::Minus),
            '+' => self.add_token(Kind::Plus),
            ';' => self.add_token(Kind::Semicolon),
            '*' => self.add_token(Kind::Star),

            // One or two character tokens
            '!' => {
                let kind = if self.match_next('=') { Kind::BangEqual } else { Kind::Bang };
                self.add_token(kind);
            },
            '=' => {
                let kind = if self.match_next('=') { Kind::EqualEqual } else { Kind::Equal };
                self.add_token(kind);
            },
            '<' => {
                let kind = if self.match_next('=') { Kind::LessEqual } else { Kind::Less };
                self.add_token(kind);
            },
            '>' => {
                let kind = if self.match_next('=') { Kind::GreaterEqual } else { Kind::Greater };
                self.add_token(kind);
            },
            '/' => {
                if self.match_next('/') {
                    while matches!(self.peek(), Some(c) if c != '\n') {
                        self.advance();
                    }
                } else if self.match_next('*') {
                    self.block_comment();
                } else {
                    self.add_token(Kind::Slash);
                }
            },

            // Ignore whitespace
            ' ' | '\r' | '\t' => {},

            // Update line counter
            '\n' => {
                self.line += 1;
                self.column_offset = self.current;
            },

            // String
            '"' => self.string(),

            // Numbers
            c if c.is_ascii_digit() => self.number(),

            // Identifiers
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),

            _ => {
                ScanError {
                    location: self.location(),
                    message: format!("Unexpected character '{c}'"),
                }.throw();
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn scan(source: &str) -> Vec<Token> {
        Scanner::new(source).scan_tokens()
    }

    fn types(source: &str) -> Vec<Kind> {
        scan(source).iter().map(|token| token.kind).collect()
    }

    #[test]
    fn ends_with_single_eof() {
        assert_eq!(types(""), vec![Kind::EOF]);
        assert_eq!(types("1 + 2"), vec![Kind::Number, Kind::Plus, Kind::Number, Kind::EOF]);

        let eofs = scan("var a = 1;").iter().filter(|t| t.kind == Kind::EOF).count();
        assert_eq!(eofs, 1);
    }

    #[test]
    fn lines_are_monotonic() {
        let tokens = scan("var a = 1;\nvar b = 2;\n\nprint a + b;");

        let mut last = 0;
        for token in &tokens {
            assert!(token.location.line >= last);
            last = token.location.line;
        }
        assert_eq!(tokens.last().unwrap().location.line, 4);
    }

    #[test]
    fn lexemes_round_trip() {
        let source = "fun add(a, b) { return a + b; } // trailing";
        let lexemes: String = scan(source).iter().map(|t| t.lexeme.as_str()).collect();

        let mut stripped = source.to_string();
        stripped.truncate(source.find("//").unwrap());
        stripped.retain(|c| !c.is_whitespace());
        assert_eq!(lexemes, stripped);
    }

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(
            types("nil this super classy _under x2"),
            vec![
                Kind::Nil,
                Kind::This,
                Kind::Super,
                Kind::Identifier,
                Kind::Identifier,
                Kind::Identifier,
                Kind::EOF,
            ]
        );
    }

    #[test]
    fn two_char_operators_win() {
        assert_eq!(
            types("= == ! != < <= > >="),
            vec![
                Kind::Equal,
                Kind::EqualEqual,
                Kind::Bang,
                Kind::BangEqual,
                Kind::Less,
                Kind::LessEqual,
                Kind::Greater,
                Kind::GreaterEqual,
                Kind::EOF,
            ]
        );
    }

    #[test]
    fn number_literals() {
        let tokens = scan("12 3.5");
        assert_eq!(tokens[0].literal, Some(Literal::Number(12.0)));
        assert_eq!(tokens[0].lexeme, "12");
        assert_eq!(tokens[1].literal, Some(Literal::Number(3.5)));
    }

    #[test]
    fn trailing_dot_is_not_consumed() {
        assert_eq!(types("123."), vec![Kind::Number, Kind::Dot, Kind::EOF]);
        assert_eq!(scan("123.")[0].lexeme, "123");
    }

    #[test]
    fn string_literal_excludes_quotes() {
        let tokens = scan("\"hello\"");
        assert_eq!(tokens[0].lexeme, "\"hello\"");
        assert_eq!(tokens[0].literal, Some(Literal::from("hello")));
    }

    #[test]
    fn multiline_string_counts_lines() {
        let tokens = scan("\"one\ntwo\" x");
        assert_eq!(tokens[0].location.line, 1);
        assert_eq!(tokens[1].location.line, 2);
        assert_eq!(tokens[1].lexeme, "x");
    }

    #[test]
    fn comments_emit_no_tokens() {
        assert_eq!(types("// all gone"), vec![Kind::EOF]);
        assert_eq!(types("1 /* 2\n3 */ 4"), vec![Kind::Number, Kind::Number, Kind::EOF]);

        let tokens = scan("/* a\nb */ x");
        assert_eq!(tokens[0].location.line, 2);
    }

    #[test]
    fn unterminated_string_emits_no_token() {
        assert_eq!(types("\"open"), vec![Kind::EOF]);
        crate::error::reset_error();
    }

    #[test]
    fn unexpected_character_is_skipped() {
        assert_eq!(types("1 @ 2"), vec![Kind::Number, Kind::Number, Kind::EOF]);
        crate::error::reset_error();
    }
}
