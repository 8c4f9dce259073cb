use skyql_error::Result;
use skyql_parser::Grammar;
use skyql_parser::ast::ParsedStatement;
use skyql_parser::hooks::ParseHooks;
use tracing::{debug, trace};

use crate::chunk_query::{ChunkQueryBatch, ChunkQueryGenerator};
use crate::collector::{PartitionMapping, SubchunkTupleCollector};
use crate::columns::RelevantColumns;
use crate::partmap::PartitionMapQueryBuilder;
use crate::scheme::PartitioningScheme;

/// Rewriting session for a single user query.
///
/// Holds the parsed query along with the scheme it's partitioned by. The
/// partition map query is run externally, and its rows are fed back through
/// `collect` to produce the per-chunk queries.
#[derive(Debug)]
pub struct QueryRewriter {
    sql: String,
    statement: ParsedStatement,
    scheme: PartitioningScheme,
    columns: RelevantColumns,
    spatial_leaf_count: usize,
}

impl QueryRewriter {
    pub fn try_new(sql: impl Into<String>, scheme: &PartitioningScheme) -> Result<Self> {
        scheme.validate()?;
        let sql = sql.into();
        let columns = scheme.relevant_columns();

        let mut spatial_leaf_count = 0;
        let statement = Grammar::new(ParseHooks::new().with_where_leaf_hook(|leaf| {
            if columns.depends_only_on(&leaf) {
                trace!(%leaf, "spatial condition");
                spatial_leaf_count += 1;
            }
            leaf
        }))
        .parse(&sql)?;

        debug!(
            tables = statement.table_refs.len(),
            spatial_leaf_count, "parsed query"
        );

        Ok(QueryRewriter {
            sql,
            statement,
            scheme: scheme.clone(),
            columns,
            spatial_leaf_count,
        })
    }

    pub fn statement(&self) -> &ParsedStatement {
        &self.statement
    }

    pub fn scheme(&self) -> &PartitioningScheme {
        &self.scheme
    }

    /// Number of conditions that depend only on spatial columns, subqueries
    /// included.
    pub fn spatial_leaf_count(&self) -> usize {
        self.spatial_leaf_count
    }

    pub fn partition_map_query(&self) -> Result<String> {
        PartitionMapQueryBuilder::new(&self.columns).build(&self.statement)
    }

    /// Group rows returned by the partition map query.
    pub fn collect(&self, rows: impl IntoIterator<Item = (i64, i64)>) -> PartitionMapping {
        SubchunkTupleCollector::collect(rows)
    }

    /// Rewrite the query for every chunk in `mapping` against the director
    /// table's subchunk copies.
    pub fn chunk_queries(&self, mapping: PartitionMapping) -> Result<Vec<ChunkQueryBatch>> {
        let generator = ChunkQueryGenerator::try_new(&self.sql, [&self.scheme.director_table])?;
        Ok(generator.fanout(mapping))
    }
}

#[cfg(test)]
mod tests {
    use skyql_error::SkyqlError;

    use super::*;

    #[test]
    fn counts_spatial_leaves() {
        let rewriter = QueryRewriter::try_new(
            "SELECT id FROM Object WHERE ra BETWEEN 1 AND 2 AND flux > 3 AND (decl < 1 OR id IN (SELECT id FROM Object WHERE ra > 1));",
            &PartitioningScheme::default(),
        )
        .unwrap();
        assert_eq!(3, rewriter.spatial_leaf_count());
    }

    #[test]
    fn comparison_against_other_column_not_spatial() {
        let rewriter = QueryRewriter::try_new(
            "SELECT id FROM Object WHERE blah < decl AND ra > 1;",
            &PartitioningScheme::default(),
        )
        .unwrap();
        assert_eq!(1, rewriter.spatial_leaf_count());
        assert_eq!(
            "SELECT chunkid, subchunkid FROM partmap WHERE ra > 1;",
            rewriter.partition_map_query().unwrap()
        );
    }

    #[test]
    fn invalid_scheme_rejected() {
        let scheme = PartitioningScheme {
            num_stripes: 0,
            ..Default::default()
        };
        let err = QueryRewriter::try_new("SELECT * FROM Object;", &scheme).unwrap_err();
        assert!(matches!(err, SkyqlError::InvalidScheme(_)), "{err:?}");
    }

    #[test]
    fn director_table_missing() {
        let rewriter =
            QueryRewriter::try_new("SELECT * FROM Source;", &PartitioningScheme::default())
                .unwrap();
        let mapping = rewriter.collect([(1, 1)]);
        let err = rewriter.chunk_queries(mapping).unwrap_err();
        assert!(matches!(err, SkyqlError::SubstitutionNotFound { .. }), "{err:?}");
    }

    #[test]
    fn extra_columns_used_for_pruning() {
        let scheme = PartitioningScheme {
            extra_columns: vec!["mjd".to_string()],
            ..Default::default()
        };
        let rewriter = QueryRewriter::try_new(
            "SELECT id FROM Object WHERE mjd BETWEEN 10 AND 20;",
            &scheme,
        )
        .unwrap();
        assert_eq!(
            "SELECT chunkid, subchunkid FROM partmap WHERE 20 BETWEEN mjdmin AND mjdmax OR 10 BETWEEN mjdmin AND mjdmax OR mjdmin BETWEEN 10 AND 20;",
            rewriter.partition_map_query().unwrap()
        );
    }
}
