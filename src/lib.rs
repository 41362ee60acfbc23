//! Causeway - error classes and composable selectors over cause chains.
//!
//! Errors are annotated with [`Class`]es as they propagate, and later
//! inspected with [`Selector`]s that walk the `source()` chain:
//!
//! ```
//! use causeway::selector::{and, grep};
//! use causeway::{wrap, Class, Lifter, Selector};
//!
//! let database = Class::named("database");
//! let err = wrap::wrap(database.error("connection reset"), "loading orders");
//!
//! assert!(database.is_in(&err));
//! assert!(and([database.shared(), grep("reset").shared()]).is_in(&err));
//! ```
//!
//! - [`wrap`] builds plain errors and annotates them with context.
//! - [`class`] and [`bind`] tag errors with classes.
//! - [`selector`] queries chains; [`traversal`] controls how far.
//! - [`settings`] and [`logging`] are for applications embedding the crate.

pub mod bind;
pub mod chain;
pub mod class;
pub mod lift;
pub mod logging;
pub mod selector;
pub mod settings;
pub mod traversal;
pub mod wrap;

pub use bind::{bind, binds, to_class, Bound, Classify, Composite, SharedClass};
pub use chain::{share, DynError, Node, SharedError, DEFAULT_CEILING};
pub use class::{Class, ClassId, Classified};
pub use lift::{LiftFn, LiftResult, Lifter};
pub use selector::{Selector, SelectorFn, SharedSelector};
pub use settings::{Settings, SettingsError};
pub use traversal::{Traversal, TraversalOption};
