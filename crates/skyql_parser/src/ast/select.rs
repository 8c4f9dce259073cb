use std::fmt;

use skyql_error::{Result, unsupported};

use super::{AstParseable, Ident, ObjectReference, TableRef, WhereNode};
use crate::keywords::Keyword;
use crate::parser::Parser;
use crate::tokens::Token;

/// A parsed SELECT statement.
///
/// `SELECT <select_list> FROM <table_refs> [WHERE <where_tree>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStatement {
    pub select_list: SelectList,
    /// FROM list, cross product of all tables.
    pub table_refs: Vec<TableRef>,
    /// WHERE
    pub where_tree: Option<WhereNode>,
}

impl ParsedStatement {
    /// Render the statement with its `;` terminator.
    pub fn to_sql(&self) -> String {
        format!("{self};")
    }

    /// Produce a new statement with every table reference replaced,
    /// subqueries included.
    pub fn map_table_refs<F>(&self, f: &mut F) -> ParsedStatement
    where
        F: FnMut(&TableRef) -> TableRef,
    {
        ParsedStatement {
            select_list: self.select_list.clone(),
            table_refs: self.table_refs.iter().map(&mut *f).collect(),
            where_tree: self.where_tree.as_ref().map(|w| w.map_table_refs(f)),
        }
    }

    /// Produce a new statement with every column reference replaced,
    /// including column arguments to functions and subqueries.
    pub fn map_column_refs<F>(&self, f: &mut F) -> ParsedStatement
    where
        F: FnMut(&ObjectReference) -> ObjectReference,
    {
        let select_list = match &self.select_list {
            SelectList::Wildcard => SelectList::Wildcard,
            SelectList::Items(items) => SelectList::Items(
                items
                    .iter()
                    .map(|item| SelectItem {
                        expr: item.expr.map_column_refs(f),
                        alias: item.alias.clone(),
                    })
                    .collect(),
            ),
        };

        ParsedStatement {
            select_list,
            table_refs: self.table_refs.clone(),
            where_tree: self.where_tree.as_ref().map(|w| w.map_column_refs(f)),
        }
    }
}

impl AstParseable for ParsedStatement {
    fn parse(parser: &mut Parser) -> Result<Self> {
        parser.expect_keyword(Keyword::SELECT)?;
        let select_list = SelectList::parse(parser)?;

        parser.expect_keyword(Keyword::FROM)?;
        let table_refs = parser.parse_comma_separated(TableRef::parse)?;
        for (idx, table) in table_refs.iter().enumerate() {
            if let Some(alias) = &table.alias {
                let dup = table_refs[..idx]
                    .iter()
                    .filter_map(|t| t.alias.as_ref())
                    .any(|other| other.matches(&alias.value));
                if dup {
                    return Err(unsupported!("Duplicate table alias '{alias}'"));
                }
            }
        }

        let where_tree = if parser.parse_keyword(Keyword::WHERE) {
            Some(WhereNode::parse(parser)?)
        } else {
            None
        };

        Ok(ParsedStatement {
            select_list,
            table_refs,
            where_tree,
        })
    }
}

impl fmt::Display for ParsedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {} FROM ", self.select_list)?;
        let tables: Vec<_> = self.table_refs.iter().map(|t| t.to_string()).collect();
        write!(f, "{}", tables.join(", "))?;

        // A tree reduced to TRUE filters nothing.
        match &self.where_tree {
            Some(tree) if !tree.is_true() => write!(f, " WHERE {tree}"),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectList {
    /// `SELECT *`
    Wildcard,
    Items(Vec<SelectItem>),
}

impl AstParseable for SelectList {
    fn parse(parser: &mut Parser) -> Result<Self> {
        if parser.consume_token(&Token::Mul) {
            return Ok(SelectList::Wildcard);
        }
        let items = parser.parse_comma_separated(SelectItem::parse)?;
        Ok(SelectList::Items(items))
    }
}

impl fmt::Display for SelectList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectList::Wildcard => write!(f, "*"),
            SelectList::Items(items) => {
                let items: Vec<_> = items.iter().map(|i| i.to_string()).collect();
                write!(f, "{}", items.join(", "))
            }
        }
    }
}

/// `<expr> [AS <alias>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectItem {
    pub expr: SelectExpr,
    pub alias: Option<Ident>,
}

impl AstParseable for SelectItem {
    fn parse(parser: &mut Parser) -> Result<Self> {
        let expr = SelectExpr::parse(parser)?;
        let alias = if parser.parse_keyword(Keyword::AS) {
            Some(Ident::parse(parser)?)
        } else {
            None
        };
        Ok(SelectItem { expr, alias })
    }
}

impl fmt::Display for SelectItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectExpr {
    /// `col`, `table.col`
    Column(ObjectReference),
    /// `func(col, ...)`
    ///
    /// Only column references are accepted as arguments.
    Function {
        name: Ident,
        args: Vec<ObjectReference>,
    },
}

impl SelectExpr {
    fn map_column_refs<F>(&self, f: &mut F) -> SelectExpr
    where
        F: FnMut(&ObjectReference) -> ObjectReference,
    {
        match self {
            SelectExpr::Column(c) => SelectExpr::Column(f(c)),
            SelectExpr::Function { name, args } => SelectExpr::Function {
                name: name.clone(),
                args: args.iter().map(&mut *f).collect(),
            },
        }
    }

    fn parse_function_arg(parser: &mut Parser) -> Result<ObjectReference> {
        let tok = match parser.peek() {
            Some(tok) => tok,
            None => return Err(parser.error_here("Expected function argument, found end of statement")),
        };

        match tok.token {
            Token::Word(w) if w.keyword.is_none() => {
                let arg = ObjectReference::parse(parser)?;
                if parser
                    .peek()
                    .is_some_and(|tok| tok.token == Token::LeftParen)
                {
                    return Err(unsupported!("Nested function call '{arg}(...)'"));
                }
                Ok(arg)
            }
            Token::Mul
            | Token::Number(_)
            | Token::SingleQuotedString(_)
            | Token::DoubleQuotedString(_)
            | Token::Plus
            | Token::Minus
            | Token::LeftParen => Err(unsupported!(
                "Function arguments must be column references (at offset {})",
                tok.offset
            )),
            other => Err(parser.error_at(
                tok.offset,
                format!("Unexpected token {other:?}. Expected a function argument."),
            )),
        }
    }
}

impl AstParseable for SelectExpr {
    fn parse(parser: &mut Parser) -> Result<Self> {
        let reference = ObjectReference::parse(parser)?;

        if !parser
            .peek()
            .is_some_and(|tok| tok.token == Token::LeftParen)
        {
            return Ok(SelectExpr::Column(reference));
        }

        if reference.is_qualified() {
            return Err(unsupported!("Qualified function name '{reference}'"));
        }

        let args = parser.parse_parenthesized_comma_separated(Self::parse_function_arg)?;
        Ok(SelectExpr::Function {
            name: reference.base,
            args,
        })
    }
}

impl fmt::Display for SelectExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectExpr::Column(c) => write!(f, "{c}"),
            SelectExpr::Function { name, args } => {
                let args: Vec<_> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{name}({})", args.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::testutil::parse_ast;
    use skyql_error::SkyqlError;

    #[test]
    fn select_wildcard() {
        let got: ParsedStatement = parse_ast("SELECT * FROM Object").unwrap();
        assert_eq!(SelectList::Wildcard, got.select_list);
        assert_eq!(None, got.where_tree);
        assert_eq!("SELECT * FROM Object", got.to_string());
    }

    #[test]
    fn select_function_with_alias() {
        let got: ParsedStatement = parse_ast(
            "SELECT o1.id, spdist(o1.ra, o1.decl, o2.ra, o2.decl) AS dist FROM Object AS o1, Object AS o2",
        )
        .unwrap();
        assert_eq!(
            "SELECT o1.id, spdist(o1.ra, o1.decl, o2.ra, o2.decl) AS dist FROM Object AS o1, Object AS o2",
            got.to_string()
        );
    }

    #[test]
    fn function_literal_arg_unsupported() {
        let err = parse_ast::<ParsedStatement>("SELECT f(1) FROM t").unwrap_err();
        assert!(matches!(err, SkyqlError::UnsupportedConstruct(_)), "{err:?}");
    }

    #[test]
    fn nested_function_unsupported() {
        let err = parse_ast::<ParsedStatement>("SELECT f(g(a)) FROM t").unwrap_err();
        assert!(matches!(err, SkyqlError::UnsupportedConstruct(_)), "{err:?}");
    }

    #[test]
    fn duplicate_alias_unsupported() {
        let err = parse_ast::<ParsedStatement>("SELECT * FROM a AS x, b AS X").unwrap_err();
        assert!(matches!(err, SkyqlError::UnsupportedConstruct(_)), "{err:?}");
    }

    #[test]
    fn true_where_omitted() {
        let mut got: ParsedStatement = parse_ast("SELECT id FROM Object WHERE a = 1").unwrap();
        got.where_tree = Some(WhereNode::True);
        assert_eq!("SELECT id FROM Object;", got.to_sql());
    }

    #[test]
    fn map_column_refs_reaches_functions_and_where() {
        let stmt: ParsedStatement =
            parse_ast("SELECT f(a), b FROM t WHERE c IN (SELECT d FROM u WHERE e = 1)").unwrap();
        let upper = stmt.map_column_refs(&mut |c| ObjectReference::new(c.base.value.to_uppercase()));
        assert_eq!(
            "SELECT f(A), B FROM t WHERE C IN (SELECT D FROM u WHERE E = 1)",
            upper.to_string()
        );
    }

    #[test]
    fn map_table_refs_reaches_subqueries() {
        let stmt: ParsedStatement =
            parse_ast("SELECT a FROM t AS x WHERE a IN (SELECT b FROM t) AND c = 1").unwrap();
        let renamed = stmt.map_table_refs(&mut |t| TableRef {
            name: ObjectReference::new(format!("{}_1", t.name.base)),
            alias: t.alias.clone(),
        });
        assert_eq!(
            "SELECT a FROM t_1 AS x WHERE a IN (SELECT b FROM t_1) AND c = 1",
            renamed.to_string()
        );
    }
}
