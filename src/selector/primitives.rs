//! Primitive selectors.

use std::error::Error as StdError;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{scan_causes, scan_classes, Selector};
use crate::chain::{DynError, Node, SharedError};
use crate::class::Classified;
use crate::traversal::Traversal;

/// Applies a predicate to the root error only.
pub struct Root<F> {
    f: F,
}

/// Matches when `f` accepts the error as given. No traversal happens.
pub fn root<F>(f: F) -> Root<F>
where
    F: Fn(Node<'_>) -> bool + Send + Sync,
{
    Root { f }
}

impl<F> Selector for Root<F>
where
    F: Fn(Node<'_>) -> bool + Send + Sync,
{
    fn select<'e>(&self, err: &'e DynError, _traversal: Traversal) -> Option<Node<'e>> {
        let node: Node<'e> = err;
        (self.f)(node).then_some(node)
    }
}

/// Applies a predicate to every node of the chain.
pub struct Causes<F> {
    f: F,
    bound: Traversal,
}

/// Matches the first node of the chain accepted by `f`.
pub fn causes<F>(f: F) -> Causes<F>
where
    F: Fn(Node<'_>) -> bool + Send + Sync,
{
    Causes {
        f,
        bound: Traversal::default(),
    }
}

impl<F> Causes<F> {
    /// Binds a traversal policy; call-time options still override it.
    pub fn traversal(mut self, traversal: Traversal) -> Self {
        self.bound = traversal;
        self
    }
}

impl<F> Selector for Causes<F>
where
    F: Fn(Node<'_>) -> bool + Send + Sync,
{
    fn select<'e>(&self, err: &'e DynError, traversal: Traversal) -> Option<Node<'e>> {
        scan_causes(err, self.bound.overlay(traversal), |node| (self.f)(node))
    }
}

/// Applies a predicate to every classified node of the chain.
pub struct Classes<F> {
    f: F,
    bound: Traversal,
}

/// Matches the first classified node accepted by `f`.
///
/// Shadowing is respected; use a lens to look past a shadowing class.
pub fn classes<F>(f: F) -> Classes<F>
where
    F: Fn(&Classified) -> bool + Send + Sync,
{
    Classes {
        f,
        bound: Traversal::default(),
    }
}

impl<F> Classes<F> {
    /// Binds a traversal policy; call-time options still override it.
    pub fn traversal(mut self, traversal: Traversal) -> Self {
        self.bound = traversal;
        self
    }
}

impl<F> Selector for Classes<F>
where
    F: Fn(&Classified) -> bool + Send + Sync,
{
    fn select<'e>(&self, err: &'e DynError, traversal: Traversal) -> Option<Node<'e>> {
        scan_classes(err, self.bound.overlay(traversal), &self.f)
    }
}

/// Matches one specific error value anywhere in the chain.
pub struct Sentinel {
    target: SharedError,
    bound: Traversal,
}

/// Matches when `target` itself, by reference, occurs in the chain.
///
/// ```
/// use causeway::selector::{error, Selector};
/// use causeway::wrap;
///
/// let not_found = wrap::new("not found");
/// let err = wrap::wrap(not_found.clone(), "loading user");
///
/// assert!(error(not_found).is_in(&err));
/// assert!(!error(wrap::new("not found")).is_in(&err));
/// ```
pub fn error(target: SharedError) -> Sentinel {
    Sentinel {
        target,
        bound: Traversal::default(),
    }
}

impl Sentinel {
    /// Binds a traversal policy; call-time options still override it.
    pub fn traversal(mut self, traversal: Traversal) -> Self {
        self.bound = traversal;
        self
    }

    pub fn target(&self) -> &SharedError {
        &self.target
    }
}

impl fmt::Debug for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sentinel")
            .field("target", &self.target.to_string())
            .field("bound", &self.bound)
            .finish()
    }
}

impl Selector for Sentinel {
    fn select<'e>(&self, err: &'e DynError, traversal: Traversal) -> Option<Node<'e>> {
        let target = Arc::as_ptr(&self.target) as *const ();
        scan_causes(err, self.bound.overlay(traversal), |node| {
            node as *const dyn StdError as *const () == target
        })
    }
}

/// Matches a node whose concrete type is `T`.
pub struct TypeOf<T> {
    bound: Traversal,
    _marker: PhantomData<fn() -> T>,
}

/// Matches the first node of the chain whose concrete type is `T`.
pub fn type_of<T: StdError + 'static>() -> TypeOf<T> {
    TypeOf {
        bound: Traversal::default(),
        _marker: PhantomData,
    }
}

impl<T> TypeOf<T> {
    /// Binds a traversal policy; call-time options still override it.
    pub fn traversal(mut self, traversal: Traversal) -> Self {
        self.bound = traversal;
        self
    }
}

impl<T> fmt::Debug for TypeOf<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeOf")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: StdError + 'static> Selector for TypeOf<T> {
    fn select<'e>(&self, err: &'e DynError, traversal: Traversal) -> Option<Node<'e>> {
        scan_causes(err, self.bound.overlay(traversal), |node| node.is::<T>())
    }
}

/// Matches on the root error's rendered message.
#[derive(Debug, Clone)]
pub struct Grep {
    needle: String,
}

/// Matches when `needle` is a substring of the root error's `Display`
/// output. No traversal happens, but wrappers in this crate render their
/// causes, so the message usually covers the whole chain.
pub fn grep(needle: impl Into<String>) -> Grep {
    Grep {
        needle: needle.into(),
    }
}

impl Selector for Grep {
    fn select<'e>(&self, err: &'e DynError, _traversal: Traversal) -> Option<Node<'e>> {
        let node: Node<'e> = err;
        node.to_string().contains(&self.needle).then_some(node)
    }
}
