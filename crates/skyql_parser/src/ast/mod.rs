pub mod expr;
pub use expr::*;
pub mod from;
pub use from::*;
pub mod select;
pub use select::*;

use std::fmt;

use skyql_error::Result;

use crate::parser::Parser;
use crate::tokens::Token;

pub trait AstParseable: Sized {
    /// Parse an instance of Self from the provided parser.
    ///
    /// It's assumed that the parser is in the correct state for parsing Self,
    /// and if it isn't, an error should be returned.
    fn parse(parser: &mut Parser) -> Result<Self>;
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;
    use crate::hooks::ParseHooks;

    /// Parse an AST node directly from a string.
    pub(crate) fn parse_ast<A: AstParseable>(s: &str) -> Result<A> {
        let mut hooks = ParseHooks::new();
        let mut parser = Parser::with_sql_string(s, &mut hooks)?;
        A::parse(&mut parser)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ident {
    pub value: String,
}

impl Ident {
    pub fn new(s: impl Into<String>) -> Self {
        Ident { value: s.into() }
    }

    /// Case insensitive comparison against a string.
    pub fn matches(&self, s: &str) -> bool {
        self.value.eq_ignore_ascii_case(s)
    }
}

impl AstParseable for Ident {
    fn parse(parser: &mut Parser) -> Result<Self> {
        let tok = match parser.next() {
            Some(tok) => tok,
            None => return Err(parser.error_here("Expected identifier, found end of statement")),
        };

        match tok.token {
            Token::Word(w) if w.keyword.is_none() => Ok(Ident::new(w.value)),
            Token::Word(w) => Err(parser.error_at(
                tok.offset,
                format!("Unexpected keyword '{}'. Expected an identifier.", w.value),
            )),
            other => Err(parser.error_at(
                tok.offset,
                format!("Unexpected token {other:?}. Expected an identifier."),
            )),
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A dot-qualified name, e.g. `db.table` or `alias.col`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectReference {
    /// Leading parts of the name, possibly empty.
    pub qualifier: Vec<Ident>,
    /// The last part of the name. The column name for a column reference,
    /// the table name for a table reference.
    pub base: Ident,
}

impl ObjectReference {
    pub fn new(base: impl Into<String>) -> Self {
        ObjectReference {
            qualifier: Vec::new(),
            base: Ident::new(base),
        }
    }

    /// Create an object from an iterator of strings.
    ///
    /// Useful in tests. Panics if the iterator is empty.
    pub fn from_strings<S>(strings: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<String>,
    {
        let mut qualifier: Vec<_> = strings.into_iter().map(Ident::new).collect();
        let base = qualifier
            .pop()
            .expect("object reference requires at least one ident");
        ObjectReference { qualifier, base }
    }

    pub fn is_qualified(&self) -> bool {
        !self.qualifier.is_empty()
    }

    pub fn idents(&self) -> impl Iterator<Item = &Ident> {
        self.qualifier.iter().chain(std::iter::once(&self.base))
    }
}

impl AstParseable for ObjectReference {
    fn parse(parser: &mut Parser) -> Result<Self> {
        let mut qualifier = Vec::new();
        let mut base = Ident::parse(parser)?;

        // Compound identifiers must not have whitespace around the period.
        while parser
            .peek_adjacent()
            .is_some_and(|tok| tok.token == Token::Period)
        {
            parser.next();
            if !parser
                .peek_adjacent()
                .is_some_and(|tok| matches!(tok.token, Token::Word(_)))
            {
                return Err(parser.error_here("Expected an identifier after '.'"));
            }
            let next = Ident::parse(parser)?;
            qualifier.push(std::mem::replace(&mut base, next));
        }

        Ok(ObjectReference { qualifier, base })
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ident in &self.qualifier {
            write!(f, "{ident}.")?;
        }
        write!(f, "{}", self.base)
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::parse_ast;
    use super::*;

    #[test]
    fn object_reference_single() {
        let got: ObjectReference = parse_ast("col").unwrap();
        assert_eq!(ObjectReference::new("col"), got);
        assert!(!got.is_qualified());
    }

    #[test]
    fn object_reference_compound() {
        let got: ObjectReference = parse_ast("LSST.Object.ra").unwrap();
        assert_eq!(ObjectReference::from_strings(["LSST", "Object", "ra"]), got);
        assert_eq!("ra", got.base.value);
        assert_eq!(2, got.qualifier.len());
        assert_eq!("LSST.Object.ra", got.to_string());
    }

    #[test]
    fn object_reference_keyword_rejected() {
        let err = parse_ast::<ObjectReference>("from").unwrap_err();
        assert_eq!(Some(0), err.offset());
    }

    #[test]
    fn object_reference_trailing_period() {
        let err = parse_ast::<ObjectReference>("a. b").unwrap_err();
        assert_eq!(Some(3), err.offset());
    }
}
