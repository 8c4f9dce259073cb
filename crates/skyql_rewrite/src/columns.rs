use std::collections::HashSet;

use skyql_parser::ast::{ObjectReference, WhereNode};
use unicase::Ascii;

/// Set of column names that partitions are indexed on.
///
/// Matching ignores case and any table qualifier, so `o1.RA` matches `ra`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelevantColumns {
    columns: HashSet<Ascii<String>>,
}

impl RelevantColumns {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        columns.into_iter().collect()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.columns.contains(&Ascii::new(name.to_string()))
    }

    pub fn contains(&self, column: &ObjectReference) -> bool {
        self.contains_name(&column.base.value)
    }

    /// Check if a condition depends only on relevant columns.
    ///
    /// The condition's own column and any column used as a value or bound
    /// must all be relevant. Columns inside a subquery are scoped to the
    /// subquery and aren't considered.
    pub fn depends_only_on(&self, node: &WhereNode) -> bool {
        let mut any = false;
        let mut all = true;
        node.for_each_column(&mut |c| {
            any = true;
            all &= self.contains(c);
        });
        any && all
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for RelevantColumns {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        RelevantColumns {
            columns: iter.into_iter().map(|s| Ascii::new(s.into())).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyql_parser::parse;

    #[test]
    fn case_and_qualifier_ignored() {
        let cols = RelevantColumns::new(["ra", "DECL"]);
        assert!(cols.contains(&ObjectReference::new("RA")));
        assert!(cols.contains(&ObjectReference::from_strings(["o1", "decl"])));
        assert!(!cols.contains(&ObjectReference::new("blah")));
        assert_eq!(2, cols.len());
    }

    #[test]
    fn depends_only_on_skips_subquery_columns() {
        let cols = RelevantColumns::new(["ra"]);
        let stmt = parse("SELECT id FROM Object WHERE id IN (SELECT id FROM Source WHERE ra > 1);")
            .unwrap();
        let tree = stmt.where_tree.unwrap();
        assert!(!cols.depends_only_on(&tree));
    }

    #[test]
    fn depends_only_on_requires_every_column() {
        let cols = RelevantColumns::new(["ra", "decl"]);
        // (condition, expected)
        let cases = [
            ("decl > 4", true),
            ("o1.ra != o2.ra", true),
            ("ra BETWEEN decl AND 5", true),
            ("blah < decl", false),
            ("decl < blah", false),
            ("flux BETWEEN ra AND 5", false),
            ("ra BETWEEN 1 AND flux", false),
            ("ra IN (1, flux)", false),
            ("ra IN (1, decl)", true),
        ];

        for (condition, expected) in cases {
            let stmt = parse(&format!("SELECT id FROM Object WHERE {condition};")).unwrap();
            let got = cols.depends_only_on(&stmt.where_tree.unwrap());
            assert_eq!(expected, got, "condition: {condition}");
        }
    }
}
