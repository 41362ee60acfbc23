//! Composing classes.
//!
//! Anything that is both a [`Lifter`] and a [`Selector`] is a class-like
//! value ([`Classify`]). [`bind`] composes two of them into one that lifts
//! through both and matches only when both match, so a single wrap site can
//! tag an error with several classes while each constituent keeps working
//! as its own selector.
//!
//! ```
//! use causeway::bind::bind;
//! use causeway::{Class, Lifter, Selector};
//!
//! let db = Class::named("database");
//! let conflict = bind(db.clone(), Class::named_shadow("conflict"));
//!
//! let err = conflict.error("duplicate key");
//! assert!(db.is_in(&err));
//! assert!(conflict.is_in(&err));
//!
//! let err = db.error("timeout");
//! assert!(db.is_in(&err));
//! assert!(!conflict.is_in(&err));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::chain::{DynError, Node, SharedError};
use crate::lift::Lifter;
use crate::selector::{Selector, SharedSelector};
use crate::traversal::Traversal;

/// A value that can both lift errors and select them.
pub trait Classify: Lifter + Selector {}

impl<T: Lifter + Selector + ?Sized> Classify for T {}

/// A class-like value behind shared ownership.
pub type SharedClass = Arc<dyn Classify>;

/// Two class-like values composed into one.
#[derive(Clone)]
pub struct Bound {
    outer: SharedClass,
    inner: SharedClass,
}

/// Composes `f` and `g`.
///
/// Lifting applies `g` first and `f` on top, so `g`'s annotation sits
/// innermost. The result matches when both `f` and `g` match; both are
/// always evaluated.
pub fn bind<F, G>(f: F, g: G) -> Bound
where
    F: Classify + 'static,
    G: Classify + 'static,
{
    Bound {
        outer: Arc::new(f),
        inner: Arc::new(g),
    }
}

/// Left fold of [`bind`] over `gs`, starting from `f`.
///
/// An empty `gs` returns `f` unchanged.
pub fn binds<F, I>(f: F, gs: I) -> SharedClass
where
    F: Classify + 'static,
    I: IntoIterator<Item = SharedClass>,
{
    gs.into_iter()
        .fold(Arc::new(f) as SharedClass, |acc, g| -> SharedClass {
            Arc::new(bind(acc, g))
        })
}

impl Bound {
    /// The outer (last applied) component.
    pub fn outer(&self) -> &SharedClass {
        &self.outer
    }

    /// The inner (first applied) component.
    pub fn inner(&self) -> &SharedClass {
        &self.inner
    }
}

impl fmt::Debug for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bound").finish_non_exhaustive()
    }
}

impl Lifter for Bound {
    fn lift(&self, err: SharedError) -> SharedError {
        self.outer.lift(self.inner.lift(err))
    }
}

impl Selector for Bound {
    fn select<'e>(&self, err: &'e DynError, traversal: Traversal) -> Option<Node<'e>> {
        let outer = self.outer.select(err, traversal).is_some();
        let inner = self.inner.select(err, traversal).is_some();
        (outer && inner).then_some(err as Node<'e>)
    }
}

/// A class-like value assembled from an arbitrary lifter and selector.
#[derive(Clone)]
pub struct Composite {
    lifter: Arc<dyn Lifter>,
    selector: SharedSelector,
}

/// Builds a class-like value from its two halves.
///
/// ```
/// use causeway::bind::to_class;
/// use causeway::lift::LiftFn;
/// use causeway::selector::grep;
/// use causeway::{wrap, Lifter, Selector};
///
/// let retry = to_class(
///     LiftFn::new(|err| wrap::with_message(err, "retry later")),
///     grep("retry later"),
/// );
/// assert!(retry.is_in(&retry.error("upstream busy")));
/// ```
pub fn to_class<L, S>(lifter: L, selector: S) -> Composite
where
    L: Lifter + 'static,
    S: Selector + 'static,
{
    Composite {
        lifter: Arc::new(lifter),
        selector: selector.shared(),
    }
}

impl Composite {
    /// Splits back into the lifter and selector halves.
    pub fn into_parts(self) -> (Arc<dyn Lifter>, SharedSelector) {
        (self.lifter, self.selector)
    }
}

impl fmt::Debug for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composite").finish_non_exhaustive()
    }
}

impl Lifter for Composite {
    fn lift(&self, err: SharedError) -> SharedError {
        self.lifter.lift(err)
    }
}

impl Selector for Composite {
    fn select<'e>(&self, err: &'e DynError, traversal: Traversal) -> Option<Node<'e>> {
        self.selector.select(err, traversal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::walk;
    use crate::class::{Class, Classified};
    use crate::wrap;

    fn classes_in(err: &DynError) -> Vec<String> {
        walk(err)
            .filter_map(|node| node.downcast_ref::<Classified>())
            .map(|c| c.class().name().unwrap_or("?").to_string())
            .collect()
    }

    #[test]
    fn test_bind_lifts_inner_first() {
        let composite = bind(Class::named("outer"), Class::named("inner"));
        let err = composite.error("boom");
        assert_eq!(classes_in(&*err), vec!["outer", "inner"]);
        assert_eq!(err.to_string(), "outer{ inner{ boom } }");
    }

    #[test]
    fn test_bind_lift_opt_none() {
        let composite = bind(Class::named("a"), Class::named("b"));
        assert!(composite.lift_opt(None).is_none());
    }

    #[test]
    fn test_bind_requires_both() {
        let a = Class::named("a");
        let b = Class::named("b");
        let ab = bind(a.clone(), b.clone());

        assert!(ab.is_in(&ab.error("x")));
        assert!(!ab.is_in(&a.error("x")));
        assert!(!ab.is_in(&b.error("x")));
        assert!(ab.is_in(&a.lift(b.error("x"))));
    }

    #[test]
    fn test_binds_folds_left() {
        let a = Class::named("a");
        let b = Class::named("b");
        let c = Class::named("c");
        let abc = binds(
            a.clone(),
            [
                Arc::new(b.clone()) as SharedClass,
                Arc::new(c.clone()) as SharedClass,
            ],
        );

        let err = abc.error("boom");
        assert_eq!(classes_in(&*err), vec!["a", "b", "c"]);
        assert!(abc.is_in(&err));
        assert!(a.is_in(&err));
        assert!(b.is_in(&err));
        assert!(c.is_in(&err));
        assert!(!abc.is_in(&a.lift(b.error("boom"))));
    }

    #[test]
    fn test_binds_empty_is_identity() {
        let a = Class::named("a");
        let only = binds(a.clone(), Vec::new());
        let err = only.error("boom");
        assert_eq!(classes_in(&*err), vec!["a"]);
        assert!(a.is_in(&err));
    }

    #[test]
    fn test_composite_into_parts() {
        let class = Class::named("db");
        let composite = to_class(class.clone(), class.clone());
        let (lifter, selector) = composite.into_parts();
        let err = lifter.lift(wrap::new("down"));
        assert!(selector.is_in(&err));
    }
}
