//! Selector combinators.
//!
//! Every combinator forwards the call-time traversal to its children and,
//! except for [`Call`], [`Once`] and [`Masked`] which pass their child's
//! result through, returns the root error on a match.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, Once as Latch, PoisonError};

use super::{Selector, SharedSelector};
use crate::chain::{DynError, Node};
use crate::traversal::Traversal;

fn evaluate_all(selectors: &[SharedSelector], err: &DynError, traversal: Traversal) -> Vec<bool> {
    selectors
        .iter()
        .map(|s| s.select(err, traversal).is_some())
        .collect()
}

/// Evaluates every selector on its own rayon task and folds the results.
///
/// The scope is a barrier: the fold is returned only once every task has
/// finished, even when an early result already decides it.
fn fan_out(
    selectors: &[SharedSelector],
    err: &DynError,
    traversal: Traversal,
    identity: bool,
    fold: fn(bool, bool) -> bool,
) -> bool {
    tracing::trace!(tasks = selectors.len(), "evaluating selectors concurrently");

    let accum = Mutex::new(identity);
    rayon::scope(|scope| {
        for selector in selectors {
            let accum = &accum;
            scope.spawn(move |_| {
                let hit = selector.select(err, traversal).is_some();
                let mut guard = accum.lock().unwrap_or_else(PoisonError::into_inner);
                *guard = fold(*guard, hit);
            });
        }
    });
    accum.into_inner().unwrap_or_else(PoisonError::into_inner)
}

/// Matches when every child matches.
#[derive(Clone)]
pub struct And {
    selectors: Vec<SharedSelector>,
}

/// Conjunction of `selectors`. Every child is evaluated, so side effects
/// of wrapped [`call`]s happen regardless of earlier results. An empty
/// conjunction matches.
pub fn and<I>(selectors: I) -> And
where
    I: IntoIterator<Item = SharedSelector>,
{
    And {
        selectors: selectors.into_iter().collect(),
    }
}

impl Selector for And {
    fn select<'e>(&self, err: &'e DynError, traversal: Traversal) -> Option<Node<'e>> {
        let matched = evaluate_all(&self.selectors, err, traversal)
            .into_iter()
            .fold(true, |acc, hit| acc && hit);
        matched.then_some(err as Node<'e>)
    }
}

/// Matches when any child matches.
#[derive(Clone)]
pub struct Or {
    selectors: Vec<SharedSelector>,
}

/// Disjunction of `selectors`. Every child is evaluated. An empty
/// disjunction never matches.
pub fn or<I>(selectors: I) -> Or
where
    I: IntoIterator<Item = SharedSelector>,
{
    Or {
        selectors: selectors.into_iter().collect(),
    }
}

impl Selector for Or {
    fn select<'e>(&self, err: &'e DynError, traversal: Traversal) -> Option<Node<'e>> {
        let matched = evaluate_all(&self.selectors, err, traversal)
            .into_iter()
            .fold(false, |acc, hit| acc || hit);
        matched.then_some(err as Node<'e>)
    }
}

/// [`And`] with children evaluated concurrently.
#[derive(Clone)]
pub struct AndC {
    selectors: Vec<SharedSelector>,
}

/// Like [`and`], evaluating children concurrently on the rayon pool.
pub fn and_c<I>(selectors: I) -> AndC
where
    I: IntoIterator<Item = SharedSelector>,
{
    AndC {
        selectors: selectors.into_iter().collect(),
    }
}

impl Selector for AndC {
    fn select<'e>(&self, err: &'e DynError, traversal: Traversal) -> Option<Node<'e>> {
        fan_out(&self.selectors, err, traversal, true, |acc, hit| acc && hit)
            .then_some(err as Node<'e>)
    }
}

/// [`Or`] with children evaluated concurrently.
#[derive(Clone)]
pub struct OrC {
    selectors: Vec<SharedSelector>,
}

/// Like [`or`], evaluating children concurrently on the rayon pool.
pub fn or_c<I>(selectors: I) -> OrC
where
    I: IntoIterator<Item = SharedSelector>,
{
    OrC {
        selectors: selectors.into_iter().collect(),
    }
}

impl Selector for OrC {
    fn select<'e>(&self, err: &'e DynError, traversal: Traversal) -> Option<Node<'e>> {
        fan_out(&self.selectors, err, traversal, false, |acc, hit| acc || hit)
            .then_some(err as Node<'e>)
    }
}

/// Inverts its child.
pub struct Not<S> {
    selector: S,
}

/// Matches exactly when `selector` does not.
pub fn not<S: Selector>(selector: S) -> Not<S> {
    Not { selector }
}

impl<S: Selector> Selector for Not<S> {
    fn select<'e>(&self, err: &'e DynError, traversal: Traversal) -> Option<Node<'e>> {
        match self.selector.select(err, traversal) {
            Some(_) => None,
            None => Some(err as Node<'e>),
        }
    }
}

/// Runs a callback whenever its child matches.
pub struct Call<F, S> {
    f: F,
    selector: S,
}

/// Invokes `f` with the matched node every time `selector` matches.
///
/// Useful for handling a condition the same way everywhere, e.g. logging.
pub fn call<F, S>(f: F, selector: S) -> Call<F, S>
where
    F: Fn(Node<'_>) + Send + Sync,
    S: Selector,
{
    Call { f, selector }
}

impl<F, S> Selector for Call<F, S>
where
    F: Fn(Node<'_>) + Send + Sync,
    S: Selector,
{
    fn select<'e>(&self, err: &'e DynError, traversal: Traversal) -> Option<Node<'e>> {
        let matched = self.selector.select(err, traversal);
        if let Some(node) = matched {
            (self.f)(node);
        }
        matched
    }
}

/// Runs a callback the first time its child matches.
pub struct Once<F, S> {
    f: F,
    selector: S,
    latch: Latch,
}

/// Like [`call`], but `f` runs at most once over the lifetime of the
/// returned selector, however many times and from however many threads it
/// matches.
///
/// An evaluation that matches while `f` is running on another thread waits
/// for it to finish, so every match observes `f` completed. A panic in `f`
/// reaches the evaluation that ran it and still counts as its one run.
pub fn once<F, S>(f: F, selector: S) -> Once<F, S>
where
    F: Fn(Node<'_>) + Send + Sync,
    S: Selector,
{
    Once {
        f,
        selector,
        latch: Latch::new(),
    }
}

impl<F, S> Once<F, S> {
    /// Returns true once the callback has run.
    pub fn has_fired(&self) -> bool {
        self.latch.is_completed()
    }
}

impl<F, S> Selector for Once<F, S>
where
    F: Fn(Node<'_>) + Send + Sync,
    S: Selector,
{
    fn select<'e>(&self, err: &'e DynError, traversal: Traversal) -> Option<Node<'e>> {
        let matched = self.selector.select(err, traversal);
        if let Some(node) = matched {
            let mut panicked = None;
            self.latch.call_once(|| {
                tracing::debug!("once selector matched, running callback");
                // the latch completes even if f unwinds
                if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| (self.f)(node))) {
                    panicked = Some(payload);
                }
            });
            if let Some(payload) = panicked {
                panic::resume_unwind(payload);
            }
        }
        matched
    }
}

/// A selector with every other capability hidden.
#[derive(Clone)]
pub struct Masked {
    selector: SharedSelector,
}

/// Exposes `selector` as a plain selector only.
///
/// Handy for exporting a class for querying while keeping its lifting
/// surface private.
pub fn mask<S: Selector + 'static>(selector: S) -> Masked {
    Masked {
        selector: selector.shared(),
    }
}

impl fmt::Debug for Masked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Masked").finish_non_exhaustive()
    }
}

impl Selector for Masked {
    fn select<'e>(&self, err: &'e DynError, traversal: Traversal) -> Option<Node<'e>> {
        self.selector.select(err, traversal)
    }
}
