use std::fmt;

use skyql_error::Result;

use super::{AstParseable, ObjectReference, ParsedStatement, TableRef};
use crate::keywords::Keyword;
use crate::parser::Parser;
use crate::tokens::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteStyle {
    Single,
    Double,
}

impl QuoteStyle {
    pub fn as_char(&self) -> char {
        match self {
            QuoteStyle::Single => '\'',
            QuoteStyle::Double => '"',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    /// Number literal as written, including any sign.
    Number(String),
    /// String literal. Value is the raw text between the quotes.
    String { value: String, quote: QuoteStyle },
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{n}"),
            Literal::String { value, quote } => {
                let q = quote.as_char();
                write!(f, "{q}{value}{q}")
            }
        }
    }
}

/// Right hand side of a condition, or the subject of a BETWEEN.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    Column(ObjectReference),
    Literal(Literal),
}

impl Operand {
    pub fn number(n: impl Into<String>) -> Self {
        Operand::Literal(Literal::Number(n.into()))
    }

    pub fn column(name: impl Into<String>) -> Self {
        Operand::Column(ObjectReference::new(name))
    }

    pub fn as_column(&self) -> Option<&ObjectReference> {
        match self {
            Operand::Column(c) => Some(c),
            Operand::Literal(_) => None,
        }
    }

    fn map_column<F>(&self, f: &mut F) -> Operand
    where
        F: FnMut(&ObjectReference) -> ObjectReference,
    {
        match self {
            Operand::Column(c) => Operand::Column(f(c)),
            Operand::Literal(l) => Operand::Literal(l.clone()),
        }
    }
}

impl AstParseable for Operand {
    fn parse(parser: &mut Parser) -> Result<Self> {
        let idx = parser.idx; // Needed for resetting the position if this is a column.

        let tok = match parser.next() {
            Some(tok) => tok,
            None => {
                return Err(parser.error_here(
                    "Expected a number, string, or column reference, found end of statement",
                ));
            }
        };

        match tok.token {
            Token::Number(n) => Ok(Operand::number(n)),
            Token::Plus | Token::Minus => {
                // The sign must be attached to the number.
                match parser.peek_adjacent().map(|t| t.token) {
                    Some(Token::Number(n)) => {
                        parser.next();
                        let sign = if tok.token == Token::Minus { "-" } else { "+" };
                        Ok(Operand::number(format!("{sign}{n}")))
                    }
                    _ => Err(parser.error_at(tok.offset, "Expected a number directly after sign")),
                }
            }
            Token::SingleQuotedString(s) => Ok(Operand::Literal(Literal::String {
                value: s.to_string(),
                quote: QuoteStyle::Single,
            })),
            Token::DoubleQuotedString(s) => Ok(Operand::Literal(Literal::String {
                value: s.to_string(),
                quote: QuoteStyle::Double,
            })),
            Token::Word(w) if w.keyword.is_none() => {
                parser.idx = idx;
                Ok(Operand::Column(ObjectReference::parse(parser)?))
            }
            other => Err(parser.error_at(
                tok.offset,
                format!("Unexpected token {other:?}. Expected a number, string, or column reference."),
            )),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Column(c) => write!(f, "{c}"),
            Operand::Literal(l) => write!(f, "{l}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    /// `=`, `==`, `eq`
    Eq,
    /// `!=`, `<>`, `ne`
    NotEq,
    /// `<`, `lt`
    Lt,
    /// `>`, `gt`
    Gt,
    /// `<=`, `le`
    LtEq,
    /// `>=`, `ge`
    GtEq,
}

impl ComparisonOperator {
    /// Get the canonical operator for a token, accepting the word synonyms in
    /// any case.
    pub fn from_token(token: &Token) -> Option<Self> {
        match token {
            Token::Eq | Token::DoubleEq => Some(ComparisonOperator::Eq),
            Token::Neq => Some(ComparisonOperator::NotEq),
            Token::Lt => Some(ComparisonOperator::Lt),
            Token::LtEq => Some(ComparisonOperator::LtEq),
            Token::Gt => Some(ComparisonOperator::Gt),
            Token::GtEq => Some(ComparisonOperator::GtEq),
            Token::Word(w) if w.keyword.is_none() => {
                let op = match w.value.to_ascii_lowercase().as_str() {
                    "eq" => ComparisonOperator::Eq,
                    "ne" => ComparisonOperator::NotEq,
                    "lt" => ComparisonOperator::Lt,
                    "gt" => ComparisonOperator::Gt,
                    "le" => ComparisonOperator::LtEq,
                    "ge" => ComparisonOperator::GtEq,
                    _ => return None,
                };
                Some(op)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::NotEq => "!=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::LtEq => "<=",
            ComparisonOperator::GtEq => ">=",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A WHERE condition tree.
///
/// The grammar gives AND and OR the same precedence and associates them left
/// to right, so `a OR b AND c` parses as `(a OR b) AND c`. This differs from
/// standard SQL and is kept as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhereNode {
    /// `<column> <op> <value>`
    Leaf {
        column: ObjectReference,
        op: ComparisonOperator,
        value: Operand,
    },
    /// `<subject> BETWEEN <low> AND <high>`
    ///
    /// Parsing always produces a column subject.
    Between {
        subject: Operand,
        low: Operand,
        high: Operand,
    },
    /// `<column> IN (<value>, ...)`
    InList {
        column: ObjectReference,
        values: Vec<Operand>,
    },
    /// `<column> IN (SELECT ...)`
    InSubquery {
        column: ObjectReference,
        subquery: Box<ParsedStatement>,
    },
    And {
        left: Box<WhereNode>,
        right: Box<WhereNode>,
    },
    Or {
        left: Box<WhereNode>,
        right: Box<WhereNode>,
    },
    /// Matches everything. Never produced by the parser itself.
    True,
}

impl WhereNode {
    pub fn and(left: WhereNode, right: WhereNode) -> Self {
        WhereNode::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: WhereNode, right: WhereNode) -> Self {
        WhereNode::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, WhereNode::True)
    }

    /// If this is a single condition rather than a combination of
    /// conditions.
    pub fn is_flat(&self) -> bool {
        matches!(
            self,
            WhereNode::Leaf { .. }
                | WhereNode::Between { .. }
                | WhereNode::InList { .. }
                | WhereNode::InSubquery { .. }
        )
    }

    /// Call `f` for each column referenced by this condition.
    ///
    /// Columns inside subqueries are scoped to the subquery and are not
    /// visited.
    pub fn for_each_column<F>(&self, f: &mut F)
    where
        F: FnMut(&ObjectReference),
    {
        match self {
            WhereNode::Leaf { column, value, .. } => {
                f(column);
                if let Some(c) = value.as_column() {
                    f(c);
                }
            }
            WhereNode::Between { subject, low, high } => {
                for operand in [subject, low, high] {
                    if let Some(c) = operand.as_column() {
                        f(c);
                    }
                }
            }
            WhereNode::InList { column, values } => {
                f(column);
                for c in values.iter().filter_map(Operand::as_column) {
                    f(c);
                }
            }
            WhereNode::InSubquery { column, .. } => f(column),
            WhereNode::And { left, right } | WhereNode::Or { left, right } => {
                left.for_each_column(f);
                right.for_each_column(f);
            }
            WhereNode::True => (),
        }
    }

    /// Produce a new tree with every column reference replaced, subqueries
    /// included.
    pub fn map_column_refs<F>(&self, f: &mut F) -> WhereNode
    where
        F: FnMut(&ObjectReference) -> ObjectReference,
    {
        match self {
            WhereNode::Leaf { column, op, value } => WhereNode::Leaf {
                column: f(column),
                op: *op,
                value: value.map_column(f),
            },
            WhereNode::Between { subject, low, high } => WhereNode::Between {
                subject: subject.map_column(f),
                low: low.map_column(f),
                high: high.map_column(f),
            },
            WhereNode::InList { column, values } => WhereNode::InList {
                column: f(column),
                values: values.iter().map(|v| v.map_column(f)).collect(),
            },
            WhereNode::InSubquery { column, subquery } => WhereNode::InSubquery {
                column: f(column),
                subquery: Box::new(subquery.map_column_refs(f)),
            },
            WhereNode::And { left, right } => {
                WhereNode::and(left.map_column_refs(f), right.map_column_refs(f))
            }
            WhereNode::Or { left, right } => {
                WhereNode::or(left.map_column_refs(f), right.map_column_refs(f))
            }
            WhereNode::True => WhereNode::True,
        }
    }

    /// Produce a new tree with the table references of any subqueries
    /// replaced.
    pub fn map_table_refs<F>(&self, f: &mut F) -> WhereNode
    where
        F: FnMut(&TableRef) -> TableRef,
    {
        match self {
            WhereNode::InSubquery { column, subquery } => WhereNode::InSubquery {
                column: column.clone(),
                subquery: Box::new(subquery.map_table_refs(f)),
            },
            WhereNode::And { left, right } => {
                WhereNode::and(left.map_table_refs(f), right.map_table_refs(f))
            }
            WhereNode::Or { left, right } => {
                WhereNode::or(left.map_table_refs(f), right.map_table_refs(f))
            }
            other => other.clone(),
        }
    }

    fn bool_op(&self) -> Option<&'static str> {
        match self {
            WhereNode::And { .. } => Some("AND"),
            WhereNode::Or { .. } => Some("OR"),
            _ => None,
        }
    }

    fn parse_term(parser: &mut Parser) -> Result<Self> {
        if parser.consume_token(&Token::LeftParen) {
            let node = Self::parse(parser)?;
            parser.expect_token(&Token::RightParen, "')'")?;
            return Ok(node);
        }

        let leaf = Self::parse_leaf(parser)?;
        Ok(parser.apply_where_leaf_hooks(leaf))
    }

    fn parse_leaf(parser: &mut Parser) -> Result<Self> {
        let column = ObjectReference::parse(parser)?;

        let tok = match parser.peek() {
            Some(tok) => tok,
            None => {
                return Err(parser.error_here(
                    "Expected comparison operator, IN, or BETWEEN, found end of statement",
                ));
            }
        };

        if let Some(op) = ComparisonOperator::from_token(&tok.token) {
            parser.next();
            let value = Operand::parse(parser)?;
            return Ok(WhereNode::Leaf { column, op, value });
        }

        match tok.keyword() {
            Some(Keyword::IN) => {
                parser.next();
                parser.expect_token(&Token::LeftParen, "'(' after IN")?;
                let node = if parser
                    .peek()
                    .is_some_and(|tok| tok.is_keyword(Keyword::SELECT))
                {
                    let subquery = parser.parse_subquery()?;
                    WhereNode::InSubquery {
                        column,
                        subquery: Box::new(subquery),
                    }
                } else {
                    let values = parser.parse_comma_separated(Operand::parse)?;
                    WhereNode::InList { column, values }
                };
                parser.expect_token(&Token::RightParen, "')'")?;
                Ok(node)
            }
            Some(Keyword::BETWEEN) => {
                parser.next();
                let low = Operand::parse(parser)?;
                parser.expect_keyword(Keyword::AND)?;
                let high = Operand::parse(parser)?;
                Ok(WhereNode::Between {
                    subject: Operand::Column(column),
                    low,
                    high,
                })
            }
            _ => Err(parser.error_at(
                tok.offset,
                format!(
                    "Unexpected token {:?}. Expected comparison operator, IN, or BETWEEN.",
                    tok.token
                ),
            )),
        }
    }
}

impl AstParseable for WhereNode {
    fn parse(parser: &mut Parser) -> Result<Self> {
        let mut node = Self::parse_term(parser)?;

        // AND and OR share a precedence level.
        loop {
            if parser.parse_keyword(Keyword::AND) {
                let right = Self::parse_term(parser)?;
                node = WhereNode::and(node, right);
            } else if parser.parse_keyword(Keyword::OR) {
                let right = Self::parse_term(parser)?;
                node = WhereNode::or(node, right);
            } else {
                break;
            }
        }

        Ok(node)
    }
}

impl fmt::Display for WhereNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WhereNode::Leaf { column, op, value } => write!(f, "{column} {op} {value}"),
            WhereNode::Between { subject, low, high } => {
                write!(f, "{subject} BETWEEN {low} AND {high}")
            }
            WhereNode::InList { column, values } => {
                let values: Vec<_> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{column} IN ({})", values.join(", "))
            }
            WhereNode::InSubquery { column, subquery } => write!(f, "{column} IN ({subquery})"),
            WhereNode::And { left, right } | WhereNode::Or { left, right } => {
                let op = self.bool_op().unwrap_or_default();

                // Parenthesize so the output reads the same under either
                // precedence rule.
                match left.bool_op() {
                    Some(left_op) if left_op != op => write!(f, "({left})")?,
                    _ => write!(f, "{left}")?,
                }
                write!(f, " {op} ")?;
                match right.bool_op() {
                    Some(_) => write!(f, "({right})"),
                    None => write!(f, "{right}"),
                }
            }
            WhereNode::True => write!(f, "TRUE"),
        }
    }
}
