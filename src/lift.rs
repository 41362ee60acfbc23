//! Lifting errors into a class.
//!
//! [`Lifter::lift`] is the only required method; every convenience
//! constructor builds a plain error with the matching [`wrap`] primitive and
//! lifts the result.
//!
//! Absence propagates: lifting `None` yields `None`, and lifting an `Ok`
//! result leaves it untouched.

use std::fmt;
use std::sync::Arc;

use crate::chain::SharedError;
use crate::wrap;

/// Something that can lift an error into another scope.
pub trait Lifter: Send + Sync {
    /// Lifts `err`.
    fn lift(&self, err: SharedError) -> SharedError;

    /// Lifts `err` if present.
    fn lift_opt(&self, err: Option<SharedError>) -> Option<SharedError> {
        err.map(|err| self.lift(err))
    }

    /// New leaf error, lifted.
    fn error(&self, msg: impl fmt::Display) -> SharedError
    where
        Self: Sized,
    {
        self.lift(wrap::new(msg))
    }

    /// New leaf error from format arguments, lifted.
    fn errorf(&self, args: fmt::Arguments<'_>) -> SharedError
    where
        Self: Sized,
    {
        self.lift(wrap::errorf(args))
    }

    fn with_stack(&self, err: SharedError) -> SharedError
    where
        Self: Sized,
    {
        self.lift(wrap::with_stack(err))
    }

    fn with_message(&self, err: SharedError, msg: impl fmt::Display) -> SharedError
    where
        Self: Sized,
    {
        self.lift(wrap::with_message(err, msg))
    }

    fn wrap(&self, err: SharedError, msg: impl fmt::Display) -> SharedError
    where
        Self: Sized,
    {
        self.lift(wrap::wrap(err, msg))
    }

    fn wrapf(&self, err: SharedError, args: fmt::Arguments<'_>) -> SharedError
    where
        Self: Sized,
    {
        self.lift(wrap::wrapf(err, args))
    }
}

impl<L: Lifter + ?Sized> Lifter for Arc<L> {
    fn lift(&self, err: SharedError) -> SharedError {
        (**self).lift(err)
    }
}

impl<L: Lifter + ?Sized> Lifter for &L {
    fn lift(&self, err: SharedError) -> SharedError {
        (**self).lift(err)
    }
}

/// Adapts a closure into a [`Lifter`].
///
/// ```
/// use causeway::lift::{LiftFn, Lifter};
/// use causeway::wrap;
///
/// let context = LiftFn::new(|err| wrap::with_message(err, "while syncing"));
/// let err = context.error("timeout");
/// assert_eq!(err.to_string(), "while syncing: timeout");
/// ```
#[derive(Clone)]
pub struct LiftFn<F> {
    f: F,
}

impl<F> LiftFn<F>
where
    F: Fn(SharedError) -> SharedError + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> fmt::Debug for LiftFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiftFn").finish_non_exhaustive()
    }
}

impl<F> Lifter for LiftFn<F>
where
    F: Fn(SharedError) -> SharedError + Send + Sync,
{
    fn lift(&self, err: SharedError) -> SharedError {
        (self.f)(err)
    }
}

/// Lifting the error side of a `Result`.
pub trait LiftResult<T> {
    /// Lifts the error with `lifter`; `Ok` passes through unchanged.
    fn lift_err<L: Lifter + ?Sized>(self, lifter: &L) -> Result<T, SharedError>;
}

impl<T> LiftResult<T> for Result<T, SharedError> {
    fn lift_err<L: Lifter + ?Sized>(self, lifter: &L) -> Result<T, SharedError> {
        self.map_err(|err| lifter.lift(err))
    }
}
