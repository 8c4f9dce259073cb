use std::fmt;

use skyql_error::{Result, SkyqlError};
use skyql_parser::Grammar;
use skyql_parser::ast::{Ident, ObjectReference, ParsedStatement, TableRef};
use skyql_parser::hooks::ParseHooks;
use tracing::{debug, trace};

use crate::collector::PartitionMapping;

/// Physical name of a logical table's copy for one subchunk.
///
/// `Object`, chunk 12, subchunk 3 => `Subchunks_3.Object_12_3`
pub fn physical_table_name(logical: &str, chunk: i64, subchunk: i64) -> ObjectReference {
    ObjectReference {
        qualifier: vec![Ident::new(format!("Subchunks_{subchunk}"))],
        base: Ident::new(format!("{logical}_{chunk}_{subchunk}")),
    }
}

/// Rewritten queries for every candidate subchunk of one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkQueryBatch {
    pub chunk_id: i64,
    pub subchunks: Vec<i64>,
    /// One `;` terminated query per subchunk, in subchunk order.
    pub queries: Vec<String>,
}

impl fmt::Display for ChunkQueryBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-- SUBCHUNKS:")?;
        if !self.subchunks.is_empty() {
            let subchunks: Vec<_> = self.subchunks.iter().map(|s| s.to_string()).collect();
            write!(f, " {}", subchunks.join(", "))?;
        }
        for query in &self.queries {
            write!(f, "\n{query}")?;
        }
        Ok(())
    }
}

/// Rewrites a statement to run against the per-subchunk copies of its
/// partitioned tables.
#[derive(Debug)]
pub struct ChunkQueryGenerator {
    statement: ParsedStatement,
    /// Logical tables to substitute, as configured.
    tables: Vec<String>,
}

impl ChunkQueryGenerator {
    /// Parse `sql` and check that every table in `tables` is referenced by
    /// it.
    ///
    /// Table names are matched case-insensitively against the last part of
    /// each FROM entry, subqueries included.
    pub fn try_new<S>(sql: &str, tables: impl IntoIterator<Item = S>) -> Result<Self>
    where
        S: Into<String>,
    {
        let tables: Vec<String> = tables.into_iter().map(Into::into).collect();

        let mut seen = Vec::new();
        let statement = Grammar::new(ParseHooks::new().with_table_name_hook(|name| {
            trace!(%name, "saw table");
            seen.push(name.base.clone());
            name
        }))
        .parse(sql)?;

        for table in &tables {
            if !seen.iter().any(|name| name.matches(table)) {
                return Err(SkyqlError::SubstitutionNotFound {
                    table: table.clone(),
                });
            }
        }

        Ok(ChunkQueryGenerator { statement, tables })
    }

    pub fn statement(&self) -> &ParsedStatement {
        &self.statement
    }

    /// Generate the query batch for one chunk.
    pub fn generate(&self, chunk: i64, subchunks: &[i64]) -> ChunkQueryBatch {
        let queries: Vec<_> = subchunks
            .iter()
            .map(|&subchunk| self.substitute(chunk, subchunk).to_sql())
            .collect();
        debug!(chunk, num_queries = queries.len(), "generated chunk queries");

        ChunkQueryBatch {
            chunk_id: chunk,
            subchunks: subchunks.to_vec(),
            queries,
        }
    }

    /// Generate batches for every chunk in the mapping, in mapping order.
    pub fn fanout(&self, mapping: PartitionMapping) -> Vec<ChunkQueryBatch> {
        mapping
            .into_iter()
            .map(|(chunk, subchunks)| self.generate(chunk, &subchunks))
            .collect()
    }

    fn logical_name(&self, ident: &Ident) -> Option<&str> {
        self.tables
            .iter()
            .find(|table| ident.matches(table))
            .map(|table| table.as_str())
    }

    fn substitute(&self, chunk: i64, subchunk: i64) -> ParsedStatement {
        let statement = self.statement.map_table_refs(&mut |table| {
            match self.logical_name(&table.name.base) {
                Some(logical) => TableRef {
                    name: physical_table_name(logical, chunk, subchunk),
                    alias: table.alias.clone(),
                },
                None => table.clone(),
            }
        });

        // Columns qualified by the logical table name, e.g. `Object.ra`.
        statement.map_column_refs(&mut |column| {
            match column.qualifier.last().and_then(|q| self.logical_name(q)) {
                Some(logical) => {
                    let physical = physical_table_name(logical, chunk, subchunk);
                    ObjectReference {
                        qualifier: physical.idents().cloned().collect(),
                        base: column.base.clone(),
                    }
                }
                None => column.clone(),
            }
        })
    }
}
