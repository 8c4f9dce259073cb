use skyql_error::{Result, SkyqlError, unsupported};

use crate::ast::{AstParseable, ObjectReference, ParsedStatement, WhereNode};
use crate::hooks::ParseHooks;
use crate::keywords::Keyword;
use crate::tokens::{Token, TokenWithLocation, Tokenizer};

#[derive(Debug)]
pub struct Parser<'a, 'h> {
    sql: &'a str,
    toks: Vec<TokenWithLocation<'a>>,
    /// Index of token we should process next.
    pub(crate) idx: usize,
    hooks: &'a mut ParseHooks<'h>,
    /// Number of enclosing statements. Zero while parsing the top-level
    /// statement.
    depth: usize,
}

impl<'a, 'h> Parser<'a, 'h> {
    pub fn with_sql_string(sql: &'a str, hooks: &'a mut ParseHooks<'h>) -> Result<Self> {
        let toks = Tokenizer::new(sql).tokenize()?;
        Ok(Parser {
            sql,
            toks,
            idx: 0,
            hooks,
            depth: 0,
        })
    }

    /// Parse a complete, `;` terminated statement.
    ///
    /// Anything other than whitespace or comments following the terminator
    /// is an error.
    pub fn parse_statement(&mut self) -> Result<ParsedStatement> {
        if self.peek().is_none() {
            return Err(self.error_here("Empty SQL statement"));
        }

        let statement = ParsedStatement::parse(self)?;
        self.expect_token(&Token::SemiColon, "';' to terminate the statement")?;

        if let Some(tok) = self.next() {
            return Err(self.error_at(tok.offset, "Unexpected input after end of statement"));
        }

        Ok(statement)
    }

    /// Parse a statement nested inside another.
    ///
    /// Only one level of nesting is supported.
    pub(crate) fn parse_subquery(&mut self) -> Result<ParsedStatement> {
        if self.depth > 0 {
            return Err(unsupported!(
                "Subqueries nested more than one level deep (at offset {})",
                self.current_offset()
            ));
        }

        self.depth += 1;
        let result = ParsedStatement::parse(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn apply_table_name_hooks(&mut self, reference: ObjectReference) -> ObjectReference {
        self.hooks.apply_table_name(reference)
    }

    pub(crate) fn apply_where_leaf_hooks(&mut self, leaf: WhereNode) -> WhereNode {
        self.hooks.apply_where_leaf(leaf)
    }

    /// Parse a single keyword.
    pub fn parse_keyword(&mut self, keyword: Keyword) -> bool {
        let idx = self.idx;
        if let Some(tok) = self.next() {
            if tok.is_keyword(keyword) {
                return true;
            }
        }

        // Keyword doesn't match. Reset index and return.
        self.idx = idx;
        false
    }

    pub fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        if self.parse_keyword(keyword) {
            return Ok(());
        }
        Err(self.error_here(format!("Expected keyword {keyword:?}")))
    }

    /// Consume the next token if it matches the expected token.
    pub fn consume_token(&mut self, expected: &Token) -> bool {
        let idx = self.idx;
        if let Some(tok) = self.next() {
            if &tok.token == expected {
                return true;
            }
        }

        self.idx = idx;
        false
    }

    /// Consume the next token, erroring if it doesn't match.
    ///
    /// `what` describes the expected token in the error message.
    pub fn expect_token(&mut self, expected: &Token, what: &str) -> Result<()> {
        if self.consume_token(expected) {
            return Ok(());
        }
        match self.peek() {
            Some(tok) => Err(self.error_at(
                tok.offset,
                format!("Expected {what}, found {:?}", tok.token),
            )),
            None => Err(self.error_here(format!("Expected {what}, found end of statement"))),
        }
    }

    pub fn parse_comma_separated<T>(
        &mut self,
        mut f: impl FnMut(&mut Parser<'a, 'h>) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut values = Vec::new();
        loop {
            values.push(f(self)?);
            if !self.consume_token(&Token::Comma) {
                break;
            }
        }
        Ok(values)
    }

    pub fn parse_parenthesized_comma_separated<T>(
        &mut self,
        f: impl FnMut(&mut Parser<'a, 'h>) -> Result<T>,
    ) -> Result<Vec<T>> {
        self.expect_token(&Token::LeftParen, "'('")?;
        let values = self.parse_comma_separated(f)?;
        self.expect_token(&Token::RightParen, "')'")?;
        Ok(values)
    }

    /// Get the next non-whitespace token.
    pub fn next(&mut self) -> Option<TokenWithLocation<'a>> {
        loop {
            let tok = *self.toks.get(self.idx)?;
            self.idx += 1;

            if tok.is_trivia() {
                continue;
            }

            return Some(tok);
        }
    }

    /// Peek the next non-whitespace token.
    pub fn peek(&self) -> Option<TokenWithLocation<'a>> {
        self.peek_nth(0)
    }

    /// Peek the nth non-whitespace token, zero-indexed.
    pub fn peek_nth(&self, n: usize) -> Option<TokenWithLocation<'a>> {
        self.toks[self.idx..]
            .iter()
            .filter(|tok| !tok.is_trivia())
            .nth(n)
            .copied()
    }

    /// Peek the very next token, whitespace included.
    pub fn peek_adjacent(&self) -> Option<TokenWithLocation<'a>> {
        self.toks.get(self.idx).copied()
    }

    /// Offset of the next non-whitespace token, or the end of the input.
    pub fn current_offset(&self) -> usize {
        match self.peek() {
            Some(tok) => tok.offset,
            None => self.sql.len(),
        }
    }

    pub fn error_at(&self, offset: usize, message: impl Into<String>) -> SkyqlError {
        SkyqlError::syntax(self.sql, offset, message)
    }

    /// Syntax error pointing at the next token to process.
    pub fn error_here(&self, message: impl Into<String>) -> SkyqlError {
        self.error_at(self.current_offset(), message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_skips_trivia() {
        let mut hooks = ParseHooks::new();
        let parser = Parser::with_sql_string("a -- comment\n  b", &mut hooks).unwrap();
        assert_eq!(0, parser.peek().unwrap().offset);
        assert_eq!(15, parser.peek_nth(1).unwrap().offset);
        assert!(parser.peek_nth(2).is_none());
    }

    #[test]
    fn parse_keyword_resets_on_mismatch() {
        let mut hooks = ParseHooks::new();
        let mut parser = Parser::with_sql_string("SELECT a", &mut hooks).unwrap();
        assert!(!parser.parse_keyword(Keyword::FROM));
        assert!(parser.parse_keyword(Keyword::SELECT));
        assert_eq!(7, parser.current_offset());
    }

    #[test]
    fn empty_statement() {
        let mut hooks = ParseHooks::new();
        let mut parser = Parser::with_sql_string("  -- nothing", &mut hooks).unwrap();
        let err = parser.parse_statement().unwrap_err();
        assert_eq!(Some(12), err.offset());
    }
}
