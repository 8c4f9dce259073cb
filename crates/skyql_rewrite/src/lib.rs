//! Partition pruning and per-chunk rewriting of parsed queries.
pub mod between;
pub mod chunk_query;
pub mod collector;
pub mod columns;
pub mod partmap;
pub mod reducer;
pub mod rewriter;
pub mod scheme;

use columns::RelevantColumns;
use skyql_parser::ast::WhereNode;

pub trait WhereRewriteRule {
    /// Rewrite a condition tree.
    ///
    /// If the rewrite doesn't apply, then the tree should be returned
    /// unmodified.
    fn rewrite(columns: &RelevantColumns, node: WhereNode) -> WhereNode;
}
