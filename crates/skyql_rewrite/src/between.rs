use skyql_parser::ast::{ObjectReference, Operand, WhereNode};

use crate::WhereRewriteRule;
use crate::columns::RelevantColumns;

/// Names of the columns holding a partition's extent along `column`.
///
/// The qualifier is dropped since the extents live in the partition map
/// table, e.g. `o1.ra` => (`ramin`, `ramax`).
pub fn extent_columns(column: &ObjectReference) -> (ObjectReference, ObjectReference) {
    let base = &column.base.value;
    (
        ObjectReference::new(format!("{base}min")),
        ObjectReference::new(format!("{base}max")),
    )
}

/// Turn a point range on a relevant column into a test for overlap with a
/// partition's extent.
///
/// 'col BETWEEN lo AND hi'
/// =>
/// 'hi BETWEEN colmin AND colmax OR lo BETWEEN colmin AND colmax OR colmin BETWEEN lo AND hi'
///
/// The first two terms catch an end of the range falling inside the extent,
/// the last catches the range covering the extent entirely.
#[derive(Debug)]
pub struct BetweenExpander;

impl WhereRewriteRule for BetweenExpander {
    fn rewrite(columns: &RelevantColumns, node: WhereNode) -> WhereNode {
        match node {
            WhereNode::Between {
                subject: Operand::Column(column),
                low,
                high,
            } if columns.contains(&column) => {
                let (min, max) = extent_columns(&column);
                let high_inside = WhereNode::Between {
                    subject: high.clone(),
                    low: Operand::Column(min.clone()),
                    high: Operand::Column(max.clone()),
                };
                let low_inside = WhereNode::Between {
                    subject: low.clone(),
                    low: Operand::Column(min.clone()),
                    high: Operand::Column(max),
                };
                let covers = WhereNode::Between {
                    subject: Operand::Column(min),
                    low,
                    high,
                };
                WhereNode::or(WhereNode::or(high_inside, low_inside), covers)
            }
            WhereNode::And { left, right } => WhereNode::and(
                Self::rewrite(columns, *left),
                Self::rewrite(columns, *right),
            ),
            WhereNode::Or { left, right } => WhereNode::or(
                Self::rewrite(columns, *left),
                Self::rewrite(columns, *right),
            ),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use skyql_parser::parse;

    use super::*;

    fn expand_str(condition: &str) -> String {
        let tree = parse(&format!("SELECT id FROM Object WHERE {condition};"))
            .unwrap()
            .where_tree
            .unwrap();
        BetweenExpander::rewrite(&RelevantColumns::new(["ra", "decl"]), tree).to_string()
    }

    #[test]
    fn expand_single() {
        assert_eq!(
            "5 BETWEEN ramin AND ramax OR 2 BETWEEN ramin AND ramax OR ramin BETWEEN 2 AND 5",
            expand_str("ra BETWEEN 2 AND 5")
        );
    }

    #[test]
    fn expand_qualified_drops_qualifier() {
        assert_eq!(
            "-1.5 BETWEEN declmin AND declmax OR -3 BETWEEN declmin AND declmax OR declmin BETWEEN -3 AND -1.5",
            expand_str("o1.decl BETWEEN -3 AND -1.5")
        );
    }

    #[test]
    fn expand_inside_and() {
        assert_eq!(
            "decl > 4 AND (5 BETWEEN ramin AND ramax OR 2 BETWEEN ramin AND ramax OR ramin BETWEEN 2 AND 5)",
            expand_str("decl > 4 AND ra BETWEEN 2 AND 5")
        );
    }

    #[test]
    fn irrelevant_between_untouched() {
        assert_eq!("flux BETWEEN 1 AND 2", expand_str("flux BETWEEN 1 AND 2"));
    }

    #[test]
    fn extent_column_names() {
        let (min, max) = extent_columns(&ObjectReference::from_strings(["LSST", "Object", "ra"]));
        assert_eq!("ramin", min.to_string());
        assert_eq!("ramax", max.to_string());
    }

    proptest! {
        /// For any point range and partition extent, the expansion is true
        /// exactly when the two intervals intersect.
        #[test]
        fn expansion_matches_interval_overlap(
            lo in -10i64..10,
            len in 0i64..10,
            min in -10i64..10,
            width in 0i64..10,
        ) {
            let hi = lo + len;
            let max = min + width;
            let between = |s: i64, l: i64, h: i64| l <= s && s <= h;

            let expanded = between(hi, min, max) || between(lo, min, max) || between(min, lo, hi);
            let overlaps = lo <= max && min <= hi;
            prop_assert_eq!(overlaps, expanded);
        }
    }
}
