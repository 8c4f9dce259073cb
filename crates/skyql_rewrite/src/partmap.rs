use skyql_error::{Result, unsupported};
use skyql_parser::ast::{
    ObjectReference, ParsedStatement, SelectExpr, SelectItem, SelectList, TableRef, WhereNode,
};
use tracing::debug;

use crate::WhereRewriteRule;
use crate::between::BetweenExpander;
use crate::columns::RelevantColumns;
use crate::reducer::WhereClauseReducer;

/// Table holding the spatial extent of every (chunk, subchunk).
pub const PARTMAP_TABLE: &str = "partmap";

/// Builds the query against the partition map that selects every
/// (chunk, subchunk) that could contain rows matching a statement.
#[derive(Debug)]
pub struct PartitionMapQueryBuilder<'a> {
    columns: &'a RelevantColumns,
}

impl<'a> PartitionMapQueryBuilder<'a> {
    pub fn new(columns: &'a RelevantColumns) -> Self {
        PartitionMapQueryBuilder { columns }
    }

    /// Derive the condition to run against the partition map.
    ///
    /// Returns `None` if the statement places no constraints on the relevant
    /// columns, in which case every partition is a candidate.
    pub fn build_where(&self, statement: &ParsedStatement) -> Result<Option<WhereNode>> {
        let tree = match &statement.where_tree {
            Some(tree) => tree.clone(),
            None => return Ok(None),
        };

        let reduced = WhereClauseReducer::rewrite(self.columns, tree);
        if reduced.is_true() {
            return Ok(None);
        }

        // Partition extents only exist for one table, so an unqualified
        // column is ambiguous once there's more than one in the FROM list.
        if statement.table_refs.len() > 1 {
            let mut ambiguous = None;
            reduced.for_each_column(&mut |c| {
                if ambiguous.is_none() && !c.is_qualified() && self.columns.contains(c) {
                    ambiguous = Some(c.clone());
                }
            });
            if let Some(column) = ambiguous {
                return Err(unsupported!(
                    "Unqualified column '{column}' with multiple tables in FROM"
                ));
            }
        }

        // Partition map columns are unqualified, `o1.decl` is `decl` there.
        let expanded = BetweenExpander::rewrite(self.columns, reduced);
        Ok(Some(expanded.map_column_refs(&mut |c| ObjectReference {
            qualifier: Vec::new(),
            base: c.base.clone(),
        })))
    }

    /// Build the `;` terminated partition map query.
    pub fn build(&self, statement: &ParsedStatement) -> Result<String> {
        let where_tree = self.build_where(statement)?;
        let query = ParsedStatement {
            select_list: SelectList::Items(vec![
                SelectItem {
                    expr: SelectExpr::Column(ObjectReference::new("chunkid")),
                    alias: None,
                },
                SelectItem {
                    expr: SelectExpr::Column(ObjectReference::new("subchunkid")),
                    alias: None,
                },
            ]),
            table_refs: vec![TableRef {
                name: ObjectReference::new(PARTMAP_TABLE),
                alias: None,
            }],
            where_tree,
        }
        .to_sql();

        debug!(%query, "built partition map query");
        Ok(query)
    }
}
