//! Parse-time hooks.
//!
//! Hooks are provided up front when building a [`Grammar`](crate::Grammar)
//! and can't be changed afterwards. Each hook receives the node the parser
//! just recognized and returns the node to use in its place. Hooks of the
//! same kind are applied in the order they were added, each receiving the
//! output of the previous one.
//!
//! A hook that only needs to observe can return its input unchanged.
use std::fmt;

use crate::ast::{ObjectReference, WhereNode};

/// Invoked with every table name in a FROM list, including those in
/// subqueries.
pub type TableNameHook<'h> = Box<dyn FnMut(ObjectReference) -> ObjectReference + 'h>;

/// Invoked with every flat WHERE condition (comparison, BETWEEN, IN), before
/// it's combined with its neighbors.
pub type WhereLeafHook<'h> = Box<dyn FnMut(WhereNode) -> WhereNode + 'h>;

#[derive(Default)]
pub struct ParseHooks<'h> {
    table_name: Vec<TableNameHook<'h>>,
    where_leaf: Vec<WhereLeafHook<'h>>,
}

impl<'h> ParseHooks<'h> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table_name_hook(
        mut self,
        hook: impl FnMut(ObjectReference) -> ObjectReference + 'h,
    ) -> Self {
        self.table_name.push(Box::new(hook));
        self
    }

    pub fn with_where_leaf_hook(mut self, hook: impl FnMut(WhereNode) -> WhereNode + 'h) -> Self {
        self.where_leaf.push(Box::new(hook));
        self
    }

    pub(crate) fn apply_table_name(&mut self, reference: ObjectReference) -> ObjectReference {
        self.table_name
            .iter_mut()
            .fold(reference, |reference, hook| hook(reference))
    }

    pub(crate) fn apply_where_leaf(&mut self, leaf: WhereNode) -> WhereNode {
        self.where_leaf.iter_mut().fold(leaf, |leaf, hook| hook(leaf))
    }
}

impl fmt::Debug for ParseHooks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseHooks")
            .field("table_name", &self.table_name.len())
            .field("where_leaf", &self.where_leaf.len())
            .finish()
    }
}
