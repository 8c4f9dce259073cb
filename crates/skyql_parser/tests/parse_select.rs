use insta::assert_debug_snapshot;
use skyql_error::SkyqlError;
use skyql_parser::ast::{ObjectReference, WhereNode};
use skyql_parser::hooks::ParseHooks;
use skyql_parser::{Grammar, parse};

#[test]
fn parse_select_simple() {
    assert_debug_snapshot!(parse("SELECT id FROM Object;").unwrap(), @r###"
    ParsedStatement {
        select_list: Items(
            [
                SelectItem {
                    expr: Column(
                        ObjectReference {
                            qualifier: [],
                            base: Ident {
                                value: "id",
                            },
                        },
                    ),
                    alias: None,
                },
            ],
        ),
        table_refs: [
            TableRef {
                name: ObjectReference {
                    qualifier: [],
                    base: Ident {
                        value: "Object",
                    },
                },
                alias: None,
            },
        ],
        where_tree: None,
    }
    "###);
}

#[test]
fn parse_where_leaf() {
    let stmt = parse("select id from Object where decl > 4;").unwrap();
    assert_debug_snapshot!(stmt.where_tree, @r###"
    Some(
        Leaf {
            column: ObjectReference {
                qualifier: [],
                base: Ident {
                    value: "decl",
                },
            },
            op: Gt,
            value: Literal(
                Number(
                    "4",
                ),
            ),
        },
    )
    "###);
}

#[test]
fn parse_case_insensitive_keywords() {
    let stmt = parse("sElEcT id FrOm Object WhErE ra BeTwEeN 1 aNd 2 oR decl iN (3);").unwrap();
    assert_eq!(
        "SELECT id FROM Object WHERE ra BETWEEN 1 AND 2 OR decl IN (3)",
        stmt.to_string()
    );
}

#[test]
fn parse_trailing_comment() {
    let stmt = parse("SELECT id FROM Object; -- grab ids; all of them").unwrap();
    assert_eq!("SELECT id FROM Object;", stmt.to_sql());

    // Comment markers inside strings are kept.
    let stmt = parse("SELECT id FROM Object WHERE name = 'a--b';").unwrap();
    assert_eq!("SELECT id FROM Object WHERE name = 'a--b';", stmt.to_sql());
}

#[test]
fn parse_subquery() {
    let stmt =
        parse("SELECT id FROM Object WHERE id IN (SELECT objectId FROM Source WHERE flux > 3);")
            .unwrap();
    match stmt.where_tree {
        Some(WhereNode::InSubquery { column, subquery }) => {
            assert_eq!(ObjectReference::new("id"), column);
            assert_eq!(
                "SELECT objectId FROM Source WHERE flux > 3",
                subquery.to_string()
            );
        }
        other => panic!("unexpected where tree: {other:?}"),
    }
}

#[test]
fn missing_column_list() {
    let err = parse("SELECT FROM x;").unwrap_err();
    match err {
        SkyqlError::Syntax {
            offset, remainder, ..
        } => {
            assert_eq!(7, offset);
            assert_eq!("FROM x;", remainder);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn missing_terminator() {
    let err = parse("SELECT id FROM Object").unwrap_err();
    assert_eq!(Some(21), err.offset());
}

#[test]
fn trailing_garbage() {
    let err = parse("SELECT id FROM Object; SELECT").unwrap_err();
    assert_eq!(Some(23), err.offset());
}

#[test]
fn unterminated_string() {
    let err = parse("SELECT id FROM Object WHERE name = 'abc;").unwrap_err();
    assert_eq!(Some(35), err.offset());
}

#[test]
fn nested_subquery_unsupported() {
    let err = parse(
        "SELECT a FROM t WHERE a IN (SELECT b FROM u WHERE b IN (SELECT c FROM v));",
    )
    .unwrap_err();
    assert!(matches!(err, SkyqlError::UnsupportedConstruct(_)), "{err:?}");
}

#[test]
fn table_name_hooks_replace_and_record() {
    let mut seen = Vec::new();
    let hooks = ParseHooks::new()
        .with_table_name_hook(|name| {
            seen.push(name.to_string());
            name
        })
        .with_table_name_hook(|name| {
            if name.base.matches("object") {
                ObjectReference::new("partmap")
            } else {
                name
            }
        });

    let stmt = Grammar::new(hooks)
        .parse("SELECT id FROM LSST.Object, Source WHERE id IN (SELECT id FROM Object);")
        .unwrap();

    assert_eq!(
        "SELECT id FROM partmap, Source WHERE id IN (SELECT id FROM partmap)",
        stmt.to_string()
    );
    assert_eq!(vec!["LSST.Object", "Source", "Object"], seen);
}

#[test]
fn where_leaf_hooks_see_flat_conditions() {
    let mut leaves = Vec::new();
    let hooks = ParseHooks::new().with_where_leaf_hook(|leaf| {
        leaves.push(leaf.to_string());
        leaf
    });

    Grammar::new(hooks)
        .parse("SELECT id FROM Object WHERE (ra > 1 OR ra < -1) AND decl BETWEEN 2 AND 3;")
        .unwrap();

    assert_eq!(vec!["ra > 1", "ra < -1", "decl BETWEEN 2 AND 3"], leaves);
}

#[test]
fn where_leaf_hook_replaces_leaf() {
    let hooks = ParseHooks::new().with_where_leaf_hook(|leaf| {
        if matches!(&leaf, WhereNode::Leaf { column, .. } if column.base.matches("blah")) {
            WhereNode::True
        } else {
            leaf
        }
    });

    let stmt = Grammar::new(hooks)
        .parse("SELECT id FROM Object WHERE blah < 3;")
        .unwrap();
    assert_eq!(Some(WhereNode::True), stmt.where_tree);
    assert_eq!("SELECT id FROM Object;", stmt.to_sql());
}

#[test]
fn rendered_statement_reparses() {
    let queries = [
        "SELECT o1.id, o2.id, spdist(o1.ra, o1.decl, o2.ra, o2.decl) AS dist FROM Object AS o1, Object AS o2 WHERE dist < 25 AND o1.id != o2.id;",
        "SELECT id FROM Object WHERE ra BETWEEN 2 AND 5 AND blah < 3 AND decl > 4;",
        "SELECT * FROM LSST.Object WHERE name IN ('a', \"b\") OR flux >= 1.5e-3;",
    ];

    for query in queries {
        let stmt = parse(query).unwrap();
        let reparsed = parse(&stmt.to_sql()).unwrap();
        assert_eq!(stmt, reparsed, "query: {query}");
    }
}
