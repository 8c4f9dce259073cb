use skyql_error::Result;
use tracing::trace;

use crate::ast::ParsedStatement;
use crate::hooks::ParseHooks;
use crate::parser::Parser;

/// Entry point for parsing the supported SQL subset.
///
/// A grammar owns the hooks it was created with. Parsing requires `&mut
/// self` since hooks may record what they see, so a grammar can't be shared
/// across threads while parsing. Create a new grammar per rewriting
/// operation.
#[derive(Debug, Default)]
pub struct Grammar<'h> {
    hooks: ParseHooks<'h>,
}

impl<'h> Grammar<'h> {
    pub fn new(hooks: ParseHooks<'h>) -> Self {
        Grammar { hooks }
    }

    /// Parse a single `;` terminated SELECT statement.
    ///
    /// Fails with a syntax error if the input isn't consumed entirely.
    pub fn parse(&mut self, sql: &str) -> Result<ParsedStatement> {
        trace!(%sql, hooks = ?self.hooks, "parsing statement");
        let mut parser = Parser::with_sql_string(sql, &mut self.hooks)?;
        parser.parse_statement()
    }
}

/// Parse a statement without any hooks.
pub fn parse(sql: &str) -> Result<ParsedStatement> {
    Grammar::default().parse(sql)
}
