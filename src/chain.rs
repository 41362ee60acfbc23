//! Walking an error's chain of causes.
//!
//! A chain starts at the error being queried and follows
//! [`Error::source`](std::error::Error::source) until a node reports no
//! further cause. Every walk is bounded by a ceiling so that a misbehaving
//! error type with a cyclic `source()` cannot hang a query.

use std::error::Error as StdError;
use std::sync::Arc;

use crate::traversal::Traversal;

/// The error type selectors are evaluated against.
///
/// `Send + Sync` is required so that concurrent combinators can share the
/// root error across tasks.
pub type DynError = dyn StdError + Send + Sync + 'static;

/// A shared, reference-counted error.
///
/// Wrappers built by this crate own their cause as a `SharedError`, so the
/// address of a node in a chain is stable and can be compared for identity.
pub type SharedError = Arc<DynError>;

/// A single node of a chain, borrowed from the root error.
pub type Node<'e> = &'e (dyn StdError + 'static);

/// Maximum number of nodes any walk will visit unless configured otherwise.
pub const DEFAULT_CEILING: usize = 1024;

/// Moves a concrete error into a [`SharedError`].
pub fn share<E>(err: E) -> SharedError
where
    E: StdError + Send + Sync + 'static,
{
    Arc::new(err)
}

/// Lazy iterator over the nodes of a chain, outermost first.
#[derive(Debug, Clone)]
pub struct Chain<'e> {
    next: Option<Node<'e>>,
    remaining: usize,
    ceiling: usize,
}

impl<'e> Chain<'e> {
    /// Number of nodes this walk may still visit.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl<'e> Iterator for Chain<'e> {
    type Item = Node<'e>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next.take()?;
        if self.remaining == 0 {
            tracing::warn!(
                ceiling = self.ceiling,
                "error chain exceeds traversal ceiling, treating it as cyclic"
            );
            return None;
        }
        self.remaining -= 1;
        self.next = node.source();
        Some(node)
    }
}

/// Walks `err` and its causes with the [`DEFAULT_CEILING`].
pub fn walk(err: &DynError) -> Chain<'_> {
    walk_bounded(err, DEFAULT_CEILING)
}

/// Walks `err` and its causes, visiting at most `ceiling` nodes.
///
/// A ceiling of zero is treated as one: the root error is always visited.
pub fn walk_bounded(err: &DynError, ceiling: usize) -> Chain<'_> {
    let ceiling = ceiling.max(1);
    Chain {
        next: Some(err),
        remaining: ceiling,
        ceiling,
    }
}

/// Collects the chain of `err` after applying `traversal`.
///
/// ```
/// use causeway::chain::causes_of;
/// use causeway::traversal::Traversal;
/// use causeway::wrap;
///
/// let err = wrap::with_message(wrap::new("disk full"), "saving index");
/// assert_eq!(causes_of(&*err, Traversal::default()).len(), 2);
/// assert_eq!(causes_of(&*err, Traversal::new().with_lens(5)).len(), 1);
/// ```
pub fn causes_of(err: &DynError, traversal: Traversal) -> Vec<Node<'_>> {
    traversal
        .apply(walk_bounded(err, traversal.ceiling()))
        .collect()
}

/// Returns the deepest node reachable from `err`.
pub fn root_cause(err: &DynError) -> Node<'_> {
    let mut deepest: Node<'_> = err;
    for node in walk(err) {
        deepest = node;
    }
    deepest
}
