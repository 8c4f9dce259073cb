use skyql_error::{Result, SkyqlError};

use crate::keywords::{Keyword, keyword_from_str};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Word(Word<'a>),
    /// Unsigned numeric literal, as written.
    Number(&'a str),
    /// Contents of a single quoted string. Escapes are left as is.
    SingleQuotedString(&'a str),
    /// Contents of a double quoted string. Escapes are left as is.
    DoubleQuotedString(&'a str),
    Whitespace,
    /// `-- ...` through the end of the line.
    Comment,
    /// `,`
    Comma,
    /// `.`
    Period,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `;`
    SemiColon,
    /// `*`
    Mul,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `=`
    Eq,
    /// `==`
    DoubleEq,
    /// `!=` or `<>`
    Neq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word<'a> {
    pub value: &'a str,
    /// Set if the word is a keyword. Keyword matching is case insensitive.
    pub keyword: Option<Keyword>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenWithLocation<'a> {
    pub token: Token<'a>,
    /// Byte offset of the start of the token in the input.
    pub offset: usize,
}

impl TokenWithLocation<'_> {
    pub fn is_keyword(&self, other: Keyword) -> bool {
        self.keyword() == Some(other)
    }

    pub fn keyword(&self) -> Option<Keyword> {
        match &self.token {
            Token::Word(w) => w.keyword,
            _ => None,
        }
    }

    /// Returns if this token is skipped during parsing.
    pub fn is_trivia(&self) -> bool {
        matches!(self.token, Token::Whitespace | Token::Comment)
    }
}

#[derive(Debug)]
pub struct Tokenizer<'a> {
    sql: &'a str,
    /// Byte position of the next char.
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(sql: &'a str) -> Self {
        Tokenizer { sql, pos: 0 }
    }

    pub fn tokenize(mut self) -> Result<Vec<TokenWithLocation<'a>>> {
        let mut toks = Vec::new();

        while let Some(c) = self.peek_char() {
            let offset = self.pos;
            let token = match c {
                c if c.is_whitespace() => {
                    self.take_while(|c| c.is_whitespace());
                    Token::Whitespace
                }
                c if c.is_ascii_alphabetic() => {
                    let value =
                        self.take_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
                    Token::Word(Word {
                        value,
                        keyword: keyword_from_str(value),
                    })
                }
                c if c.is_ascii_digit() => Token::Number(self.tokenize_number()),
                '.' if self.peek_char_nth(1).is_some_and(|c| c.is_ascii_digit()) => {
                    Token::Number(self.tokenize_number())
                }
                '\'' => Token::SingleQuotedString(self.tokenize_quoted('\'', offset)?),
                '"' => Token::DoubleQuotedString(self.tokenize_quoted('"', offset)?),
                '-' if self.peek_char_nth(1) == Some('-') => {
                    self.take_while(|c| c != '\n');
                    Token::Comment
                }
                '-' => self.single(Token::Minus),
                '+' => self.single(Token::Plus),
                ',' => self.single(Token::Comma),
                '.' => self.single(Token::Period),
                '(' => self.single(Token::LeftParen),
                ')' => self.single(Token::RightParen),
                ';' => self.single(Token::SemiColon),
                '*' => self.single(Token::Mul),
                '=' => {
                    self.bump();
                    if self.consume_char('=') {
                        Token::DoubleEq
                    } else {
                        Token::Eq
                    }
                }
                '!' => {
                    self.bump();
                    if !self.consume_char('=') {
                        return Err(SkyqlError::syntax(self.sql, offset, "Expected '=' after '!'"));
                    }
                    Token::Neq
                }
                '<' => {
                    self.bump();
                    if self.consume_char('=') {
                        Token::LtEq
                    } else if self.consume_char('>') {
                        Token::Neq
                    } else {
                        Token::Lt
                    }
                }
                '>' => {
                    self.bump();
                    if self.consume_char('=') {
                        Token::GtEq
                    } else {
                        Token::Gt
                    }
                }
                other => {
                    return Err(SkyqlError::syntax(
                        self.sql,
                        offset,
                        format!("Unexpected character '{other}'"),
                    ));
                }
            };

            toks.push(TokenWithLocation { token, offset });
        }

        Ok(toks)
    }

    /// Digits with an optional fraction and exponent.
    ///
    /// An exponent marker not followed by digits is left for the next token.
    fn tokenize_number(&mut self) -> &'a str {
        let start = self.pos;
        self.take_while(|c| c.is_ascii_digit());
        if self.consume_char('.') {
            self.take_while(|c| c.is_ascii_digit());
        }

        if matches!(self.peek_char(), Some('e' | 'E')) {
            let has_sign = matches!(self.peek_char_nth(1), Some('+' | '-'));
            let digit_idx = if has_sign { 2 } else { 1 };
            if self
                .peek_char_nth(digit_idx)
                .is_some_and(|c| c.is_ascii_digit())
            {
                self.bump();
                if has_sign {
                    self.bump();
                }
                self.take_while(|c| c.is_ascii_digit());
            }
        }

        &self.sql[start..self.pos]
    }

    /// Read a quoted string starting at the opening quote, returning the
    /// contents between the quotes.
    ///
    /// A doubled quote or a backslash escapes the following char.
    fn tokenize_quoted(&mut self, quote: char, offset: usize) -> Result<&'a str> {
        self.bump();
        let start = self.pos;
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some(c) if c == quote => {
                    if self.consume_char(quote) {
                        continue;
                    }
                    return Ok(&self.sql[start..self.pos - quote.len_utf8()]);
                }
                Some(_) => (),
                None => {
                    return Err(SkyqlError::syntax(
                        self.sql,
                        offset,
                        "Unterminated string literal",
                    ));
                }
            }
        }
    }

    fn single(&mut self, token: Token<'a>) -> Token<'a> {
        self.bump();
        token
    }

    fn peek_char(&self) -> Option<char> {
        self.sql[self.pos..].chars().next()
    }

    fn peek_char_nth(&self, n: usize) -> Option<char> {
        self.sql[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn consume_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.sql[start..self.pos]
    }
}
