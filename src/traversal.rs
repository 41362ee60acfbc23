//! Traversal policy shared by every chain-walking selector.
//!
//! Two cutoffs are applied, in order, to a sequence of nodes:
//!
//! 1. **Lens** `k` drops the first `k` nodes. When `k` reaches past the end,
//!    the deepest node is kept instead, so a non-empty sequence never becomes
//!    empty.
//! 2. **Depth** `d` keeps at most `d + 1` of the remaining nodes. Depth counts
//!    hops beyond the first kept node; `0` means unbounded.
//!
//! Independently of both, a walk never visits more than `ceiling` nodes.

use crate::chain::DEFAULT_CEILING;

/// A single traversal setting, as passed at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOption {
    /// Skip the first `k` nodes.
    Lens(usize),
    /// Consider at most `d` hops beyond the first kept node (`0` = unbounded).
    Depth(usize),
    /// Visit at most `n` nodes of the underlying chain.
    Ceiling(usize),
}

/// Traversal policy.
///
/// Each field is either given or left unset; unset fields read as their
/// defaults (no lens, unbounded depth, [`DEFAULT_CEILING`]). Only given
/// fields take part in [`overlay`](Traversal::overlay), so an explicit
/// `Depth(0)` at a call site still lifts a depth bound at construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Traversal {
    lens: Option<usize>,
    depth: Option<usize>,
    ceiling: Option<usize>,
}

impl Traversal {
    /// Creates the identity policy with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of leading nodes to skip.
    pub fn lens(&self) -> usize {
        self.lens.unwrap_or(0)
    }

    /// Maximum hops past the first kept node; `0` disables the cutoff.
    pub fn depth(&self) -> usize {
        self.depth.unwrap_or(0)
    }

    /// Hard cap on nodes walked.
    pub fn ceiling(&self) -> usize {
        self.ceiling.unwrap_or(DEFAULT_CEILING)
    }

    /// Set the lens.
    pub fn with_lens(mut self, lens: usize) -> Self {
        self.lens = Some(lens);
        self
    }

    /// Set the depth.
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Set the ceiling.
    pub fn with_ceiling(mut self, ceiling: usize) -> Self {
        self.ceiling = Some(ceiling);
        self
    }

    /// Applies one option to this policy.
    pub fn with_option(self, option: TraversalOption) -> Self {
        match option {
            TraversalOption::Lens(k) => self.with_lens(k),
            TraversalOption::Depth(d) => self.with_depth(d),
            TraversalOption::Ceiling(n) => self.with_ceiling(n),
        }
    }

    /// Resolves a list of options; later options for the same field win.
    pub fn from_options(options: &[TraversalOption]) -> Self {
        options.iter().copied().collect()
    }

    /// Layers a call-time policy over this one.
    ///
    /// Every field given in `call` replaces the corresponding field of
    /// `self`, even when it carries the default value.
    pub fn overlay(self, call: Traversal) -> Self {
        Self {
            lens: call.lens.or(self.lens),
            depth: call.depth.or(self.depth),
            ceiling: call.ceiling.or(self.ceiling),
        }
    }

    /// Returns true if this policy leaves a sequence untouched.
    pub fn is_identity(&self) -> bool {
        self.lens() == 0 && self.depth() == 0
    }

    /// Applies lens and depth to `nodes` lazily.
    pub fn apply<I: Iterator>(&self, nodes: I) -> Cutoff<I> {
        let depth = self.depth();
        Cutoff {
            inner: nodes,
            skip: self.lens(),
            fallback: None,
            started: false,
            done: false,
            budget: if depth == 0 {
                None
            } else {
                Some(depth.saturating_add(1))
            },
        }
    }
}

impl FromIterator<TraversalOption> for Traversal {
    fn from_iter<T: IntoIterator<Item = TraversalOption>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Traversal::default(), Traversal::with_option)
    }
}

impl From<TraversalOption> for Traversal {
    fn from(option: TraversalOption) -> Self {
        Traversal::default().with_option(option)
    }
}

/// Iterator adapter produced by [`Traversal::apply`].
pub struct Cutoff<I: Iterator> {
    inner: I,
    skip: usize,
    fallback: Option<I::Item>,
    started: bool,
    done: bool,
    budget: Option<usize>,
}

impl<I: Iterator> Iterator for Cutoff<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.budget == Some(0) {
            return None;
        }

        let item = if self.started {
            let item = self.inner.next();
            self.done = item.is_none();
            item
        } else {
            self.started = true;
            let mut exhausted = false;
            while self.skip > 0 {
                self.skip -= 1;
                match self.inner.next() {
                    Some(node) => self.fallback = Some(node),
                    None => {
                        exhausted = true;
                        break;
                    }
                }
            }
            let first = if exhausted { None } else { self.inner.next() };
            if first.is_none() {
                // lens reached past the end: fall back to the deepest node
                self.done = true;
                self.fallback.take()
            } else {
                first
            }
        };
        self.fallback = None;

        if item.is_some() {
            if let Some(budget) = self.budget.as_mut() {
                *budget -= 1;
            }
        }
        item
    }
}
