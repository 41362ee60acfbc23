//! Composable queries over error chains.
//!
//! A [`Selector`] tests an error and, on a match, returns the node that
//! matched. Primitives decide how much of the chain to look at:
//!
//! - [`root`] applies a predicate to the error as given.
//! - [`causes`] applies a predicate to every node of the chain.
//! - [`classes`] applies a predicate to every classified node, honouring
//!   shadowing.
//!
//! [`error`], [`type_of`] and [`grep`] are ready-made primitives, and the
//! combinators ([`and`], [`or`], [`not`], [`call`], [`once`], ...) build
//! larger queries out of smaller ones. Classes are selectors themselves.
//!
//! ```
//! use causeway::selector::{and, grep, not, Selector};
//! use causeway::{Class, Lifter};
//!
//! let database = Class::named("database");
//! let retryable = and([
//!     database.clone().shared(),
//!     not(grep("constraint")).shared(),
//! ]);
//!
//! assert!(retryable.is_in(&database.error("connection reset")));
//! assert!(!retryable.is_in(&database.error("constraint violated")));
//! ```

mod combinators;
mod primitives;

use std::fmt;
use std::sync::Arc;

use crate::chain::{walk_bounded, DynError, Node};
use crate::class::Classified;
use crate::traversal::{Traversal, TraversalOption};

pub use combinators::{and, and_c, call, mask, not, once, or, or_c};
pub use combinators::{And, AndC, Call, Masked, Not, Once, Or, OrC};
pub use primitives::{causes, classes, error, grep, root, type_of};
pub use primitives::{Causes, Classes, Grep, Root, Sentinel, TypeOf};

/// A selector behind shared ownership, as held by combinators.
pub type SharedSelector = Arc<dyn Selector>;

/// A query over an error chain.
pub trait Selector: Send + Sync {
    /// Evaluates the selector against `err` under `traversal`.
    ///
    /// Returns the matched node, or `None` when nothing matched.
    fn select<'e>(&self, err: &'e DynError, traversal: Traversal) -> Option<Node<'e>>;

    /// Returns the matched node under the default traversal.
    fn query<'e>(&self, err: &'e DynError) -> Option<Node<'e>> {
        self.select(err, Traversal::default())
    }

    /// Returns the matched node under the given options.
    fn query_with<'e>(&self, err: &'e DynError, options: &[TraversalOption]) -> Option<Node<'e>> {
        self.select(err, Traversal::from_options(options))
    }

    /// Returns true if the selector matches under the default traversal.
    fn is_in(&self, err: &DynError) -> bool {
        self.query(err).is_some()
    }

    /// Returns true if the selector matches under the given options.
    fn is_in_with(&self, err: &DynError, options: &[TraversalOption]) -> bool {
        self.query_with(err, options).is_some()
    }

    /// Moves the selector behind an `Arc`.
    fn shared(self) -> SharedSelector
    where
        Self: Sized + 'static,
    {
        Arc::new(self)
    }
}

impl<S: Selector + ?Sized> Selector for Arc<S> {
    fn select<'e>(&self, err: &'e DynError, traversal: Traversal) -> Option<Node<'e>> {
        (**self).select(err, traversal)
    }
}

impl<S: Selector + ?Sized> Selector for &S {
    fn select<'e>(&self, err: &'e DynError, traversal: Traversal) -> Option<Node<'e>> {
        (**self).select(err, traversal)
    }
}

/// Adapts a closure with full control over traversal into a [`Selector`].
pub struct SelectorFn<F> {
    f: F,
}

impl<F> SelectorFn<F>
where
    F: for<'e> Fn(&'e DynError, Traversal) -> Option<Node<'e>> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for SelectorFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectorFn").finish_non_exhaustive()
    }
}

impl<F> Selector for SelectorFn<F>
where
    F: for<'e> Fn(&'e DynError, Traversal) -> Option<Node<'e>> + Send + Sync,
{
    fn select<'e>(&self, err: &'e DynError, traversal: Traversal) -> Option<Node<'e>> {
        (self.f)(err, traversal)
    }
}

/// Finds the first node of the chain accepted by `pred`, after lens and
/// depth.
pub(crate) fn scan_causes<'e, P>(err: &'e DynError, traversal: Traversal, pred: P) -> Option<Node<'e>>
where
    P: Fn(Node<'e>) -> bool,
{
    traversal
        .apply(walk_bounded(err, traversal.ceiling()))
        .find(|node| pred(*node))
}

/// Finds the first classified node accepted by `pred`.
///
/// Lens and depth count classified nodes only. The scan stops after the
/// first node whose class shadows, whether or not it matched.
pub(crate) fn scan_classes<'e, P>(
    err: &'e DynError,
    traversal: Traversal,
    pred: P,
) -> Option<Node<'e>>
where
    P: Fn(&Classified) -> bool,
{
    let classified = walk_bounded(err, traversal.ceiling())
        .filter_map(|node| node.downcast_ref::<Classified>().map(|c| (node, c)));

    for (node, c) in traversal.apply(classified) {
        if pred(c) {
            return Some(node);
        }
        if c.class().is_shadow() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Class;
    use crate::lift::Lifter;
    use crate::wrap;

    #[test]
    fn test_selector_fn() {
        let always = SelectorFn::new(|err, _| Some(err as Node<'_>));
        let err = wrap::new("x");
        assert!(always.is_in(&err));
    }

    #[test]
    fn test_shared_and_borrowed_selectors() {
        let class = Class::named("db");
        let err = class.error("down");

        fn check<S: Selector>(selector: S, err: &DynError) -> bool {
            selector.is_in(err)
        }

        let shared = class.clone().shared();
        assert!(shared.is_in(&err));
        assert!(check(&class, &err));
        assert!(check(shared, &err));
    }

    #[test]
    fn test_scan_classes_shadow_is_inclusive() {
        let hidden = Class::named("hidden");
        let shadow = Class::named_shadow("shadow");
        let err = shadow.lift(hidden.error("leaf"));

        assert!(scan_classes(&*err, Traversal::default(), |c| c.class().matches(&shadow)).is_some());
        assert!(scan_classes(&*err, Traversal::default(), |c| c.class().matches(&hidden)).is_none());
        assert!(scan_classes(&*err, Traversal::new().with_lens(1), |c| c
            .class()
            .matches(&hidden))
        .is_some());
    }

    #[test]
    fn test_scan_causes_counts_every_node() {
        let err = wrap::wrap(wrap::new("leaf"), "ctx");
        let leaf = scan_causes(&*err, Traversal::new().with_lens(2), |_| true);
        assert!(leaf.is_some_and(|n| n.is::<wrap::Fundamental>()));
    }
}
