use skyql_parser::ast::WhereNode;

use crate::WhereRewriteRule;
use crate::columns::RelevantColumns;

/// Reduce a condition to one that only depends on the relevant columns.
///
/// Conditions whose column isn't relevant, or that compare against a column
/// that isn't relevant, are assumed to match everything and are replaced
/// with TRUE, then TRUE is folded away:
///
/// 'TRUE AND x => x'
/// 'TRUE OR x => TRUE'
///
/// The result matches a superset of what the original matches, so pruning
/// with it never drops a partition that could hold matching rows.
#[derive(Debug)]
pub struct WhereClauseReducer;

impl WhereRewriteRule for WhereClauseReducer {
    fn rewrite(columns: &RelevantColumns, node: WhereNode) -> WhereNode {
        match node {
            WhereNode::And { left, right } => {
                let left = Self::rewrite(columns, *left);
                let right = Self::rewrite(columns, *right);
                match (left, right) {
                    (WhereNode::True, right) => right,
                    (left, WhereNode::True) => left,
                    (left, right) => WhereNode::and(left, right),
                }
            }
            WhereNode::Or { left, right } => {
                let left = Self::rewrite(columns, *left);
                let right = Self::rewrite(columns, *right);
                if left.is_true() || right.is_true() {
                    WhereNode::True
                } else {
                    WhereNode::or(left, right)
                }
            }
            WhereNode::True => WhereNode::True,
            flat => {
                if columns.depends_only_on(&flat) {
                    flat
                } else {
                    WhereNode::True
                }
            }
        }
    }
}
