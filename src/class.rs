//! Error classes: categorical markers attached to errors.
//!
//! A [`Class`] is either anonymous, matching only itself, or named, matching
//! any class with the same name no matter where it was constructed. A class
//! may also *shadow*: once an error has been lifted into a shadowing class,
//! default queries stop looking at classes deeper in the chain. A lens large
//! enough to skip past the shadowing node makes them visible again.
//!
//! Lifting an error into a class wraps it in a [`Classified`] node; see
//! [`Lifter`](crate::lift::Lifter) for the lifting surface and
//! [`Selector`](crate::selector::Selector) for querying.

use std::error::Error as StdError;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::chain::{DynError, Node, SharedError};
use crate::lift::Lifter;
use crate::selector::{scan_classes, Selector};
use crate::traversal::Traversal;

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity token issued to every class at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u64);

impl ClassId {
    fn next() -> Self {
        Self(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug)]
struct ClassInner {
    id: ClassId,
    name: Option<String>,
    shadow: bool,
}

/// A marker used to annotate errors and to find them again.
///
/// Cloning a class is cheap and yields the same class.
///
/// ```
/// use causeway::{Class, Lifter, Selector};
///
/// let database = Class::named("database");
/// let err = database.error("connection refused");
///
/// assert!(database.is_in(&err));
/// assert!(Class::named("database").is_in(&err));
/// assert!(!Class::anonymous().is_in(&err));
/// ```
#[derive(Debug, Clone)]
pub struct Class {
    inner: Arc<ClassInner>,
}

impl Class {
    fn build(name: Option<String>, shadow: bool) -> Self {
        Self {
            inner: Arc::new(ClassInner {
                id: ClassId::next(),
                name,
                shadow,
            }),
        }
    }

    /// Creates an anonymous class, matching only itself and its clones.
    pub fn anonymous() -> Self {
        Self::build(None, false)
    }

    /// Creates a named class, matching every named class with that name.
    pub fn named(name: impl Into<String>) -> Self {
        Self::build(Some(name.into()), false)
    }

    /// Creates an anonymous class that hides deeper classes from queries.
    pub fn anonymous_shadow() -> Self {
        Self::build(None, true)
    }

    /// Creates a named class that hides deeper classes from queries.
    ///
    /// Useful to segment internal and external errors at a crate boundary.
    pub fn named_shadow(name: impl Into<String>) -> Self {
        Self::build(Some(name.into()), true)
    }

    pub fn id(&self) -> ClassId {
        self.inner.id
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    pub fn is_named(&self) -> bool {
        self.inner.name.is_some()
    }

    pub fn is_shadow(&self) -> bool {
        self.inner.shadow
    }

    /// Returns true if `other` denotes the same annotation as `self`.
    pub fn matches(&self, other: &Class) -> bool {
        if self.inner.id == other.inner.id {
            return true;
        }
        match (&self.inner.name, &other.inner.name) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl Lifter for Class {
    fn lift(&self, err: SharedError) -> SharedError {
        Arc::new(Classified {
            class: self.clone(),
            source: err,
        })
    }
}

impl Selector for Class {
    fn select<'e>(&self, err: &'e DynError, traversal: Traversal) -> Option<Node<'e>> {
        scan_classes(err, traversal, |node| node.class().matches(self))
    }
}

/// An error annotated with a [`Class`].
///
/// Its `source()` is exactly the error that was lifted.
#[derive(Debug)]
pub struct Classified {
    class: Class,
    source: SharedError,
}

impl Classified {
    pub fn class(&self) -> &Class {
        &self.class
    }

    /// The error this annotation wraps.
    pub fn inner(&self) -> &SharedError {
        &self.source
    }
}

impl fmt::Display for Classified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class.name() {
            Some(name) => {
                let marker = if self.class.is_shadow() { "#" } else { "" };
                write!(f, "{}{}{{ {} }}", name, marker, self.source)
            }
            None => fmt::Display::fmt(&self.source, f),
        }
    }
}

impl StdError for Classified {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.source)
    }
}
