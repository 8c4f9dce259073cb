use std::fmt;

use skyql_error::Result;

use super::{AstParseable, Ident, ObjectReference};
use crate::keywords::Keyword;
use crate::parser::Parser;

/// A table in the FROM list.
///
/// `<name> [AS <alias>]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub name: ObjectReference,
    pub alias: Option<Ident>,
}

impl TableRef {
    /// Name the table is referred to by in the rest of the statement.
    pub fn visible_name(&self) -> &Ident {
        self.alias.as_ref().unwrap_or(&self.name.base)
    }
}

impl AstParseable for TableRef {
    fn parse(parser: &mut Parser) -> Result<Self> {
        let name = ObjectReference::parse(parser)?;
        let name = parser.apply_table_name_hooks(name);

        // AS is required for aliasing.
        let alias = if parser.parse_keyword(Keyword::AS) {
            Some(Ident::parse(parser)?)
        } else {
            None
        };

        Ok(TableRef { name, alias })
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {alias}")?;
        }
        Ok(())
    }
}
