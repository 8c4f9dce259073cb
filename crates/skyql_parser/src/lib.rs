//! Parser for the constrained SQL subset used for spatial range queries.
//!
//! Only `SELECT ... FROM ... [WHERE ...];` is supported, with simple
//! comparisons, IN lists, single level IN subqueries, and BETWEEN. See
//! [`ast::WhereNode`] for how AND and OR are combined.
pub mod ast;
pub mod grammar;
pub mod hooks;
pub mod keywords;
pub mod parser;
pub mod tokens;

pub use grammar::{Grammar, parse};
