//! Plain error primitives used to build chains.
//!
//! These are the building blocks the [`Lifter`](crate::lift::Lifter)
//! convenience constructors start from: a leaf carrying a message, a node
//! prefixing a message to its cause, and a node recording a backtrace.
//! Each wrapper owns its cause as a [`SharedError`] and reports it from
//! `source()`.

use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::chain::SharedError;

/// A leaf error with a message and the backtrace of its creation site.
pub struct Fundamental {
    msg: String,
    backtrace: Backtrace,
}

impl Fundamental {
    /// The error message.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// Backtrace captured when the error was built.
    ///
    /// Capture honours `RUST_BACKTRACE`/`RUST_LIB_BACKTRACE`.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Debug for Fundamental {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fundamental")
            .field("msg", &self.msg)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Fundamental {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg)
    }
}

impl StdError for Fundamental {}

/// Prefixes a message to its cause: `"{msg}: {cause}"`.
#[derive(Debug)]
pub struct WithMessage {
    msg: String,
    cause: SharedError,
}

impl WithMessage {
    /// The annotation message.
    pub fn message(&self) -> &str {
        &self.msg
    }

    /// The wrapped error.
    pub fn cause(&self) -> &SharedError {
        &self.cause
    }
}

impl fmt::Display for WithMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.msg, self.cause)
    }
}

impl StdError for WithMessage {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.cause)
    }
}

/// Records a backtrace on top of its cause. Displays as the cause.
pub struct WithStack {
    cause: SharedError,
    backtrace: Backtrace,
}

impl WithStack {
    /// The wrapped error.
    pub fn cause(&self) -> &SharedError {
        &self.cause
    }

    /// Backtrace captured when the cause was wrapped.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }
}

impl fmt::Debug for WithStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WithStack")
            .field("cause", &self.cause)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for WithStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.cause, f)
    }
}

impl StdError for WithStack {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(&*self.cause)
    }
}

/// Builds a leaf error from `msg`.
pub fn new(msg: impl fmt::Display) -> SharedError {
    Arc::new(Fundamental {
        msg: msg.to_string(),
        backtrace: Backtrace::capture(),
    })
}

/// Builds a leaf error from format arguments.
///
/// ```
/// let err = causeway::wrap::errorf(format_args!("row {} missing", 7));
/// assert_eq!(err.to_string(), "row 7 missing");
/// ```
pub fn errorf(args: fmt::Arguments<'_>) -> SharedError {
    new(args)
}

/// Wraps `err` with a backtrace of the current call site.
pub fn with_stack(err: SharedError) -> SharedError {
    Arc::new(WithStack {
        cause: err,
        backtrace: Backtrace::capture(),
    })
}

/// Wraps `err` with a message prefix.
pub fn with_message(err: SharedError, msg: impl fmt::Display) -> SharedError {
    Arc::new(WithMessage {
        msg: msg.to_string(),
        cause: err,
    })
}

/// Wraps `err` with a message and a backtrace (two nodes).
pub fn wrap(err: SharedError, msg: impl fmt::Display) -> SharedError {
    with_stack(with_message(err, msg))
}

/// Like [`wrap`], with a formatted message.
pub fn wrapf(err: SharedError, args: fmt::Arguments<'_>) -> SharedError {
    wrap(err, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::walk;

    #[test]
    fn test_new_display() {
        let err = new("boom");
        assert_eq!(err.to_string(), "boom");
        assert!(err.source().is_none());
        assert!(err.is::<Fundamental>());
    }

    #[test]
    fn test_with_message_display_and_source() {
        let err = with_message(new("disk full"), "saving index");
        assert_eq!(err.to_string(), "saving index: disk full");
        assert!(err.source().is_some_and(|s| s.is::<Fundamental>()));
    }

    #[test]
    fn test_with_stack_is_transparent() {
        let err = with_stack(new("boom"));
        assert_eq!(err.to_string(), "boom");
        assert!(err.is::<WithStack>());
        assert_eq!(walk(&*err).count(), 2);
    }

    #[test]
    fn test_wrap_adds_two_nodes() {
        let err = wrap(new("boom"), "loading");
        assert_eq!(err.to_string(), "loading: boom");

        let nodes: Vec<_> = walk(&*err).collect();
        assert_eq!(nodes.len(), 3);
        assert!(nodes[0].is::<WithStack>());
        assert!(nodes[1].is::<WithMessage>());
        assert!(nodes[2].is::<Fundamental>());
    }

    #[test]
    fn test_wrapf_formats() {
        let err = wrapf(new("boom"), format_args!("step {}", 3));
        assert_eq!(err.to_string(), "step 3: boom");
    }

    #[test]
    fn test_wrap_preserves_cause_identity() {
        let cause = new("sentinel");
        let err = with_message(cause.clone(), "outer");
        let node = err.source().expect("wrapped error has a source");
        assert_eq!(
            node as *const dyn StdError as *const (),
            Arc::as_ptr(&cause) as *const ()
        );
    }
}
