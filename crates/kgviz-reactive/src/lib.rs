//! kgviz Reactive Core
//!
//! Status-tracked asynchronous pipelines for UI-facing data sources.
//!
//! # Core Concepts
//!
//! - [`Status`]: `Loading` / `Ready` / `Failed` snapshot of an async source
//! - [`with_status`]: wraps a fallible stream into a stream of snapshots
//! - [`SharedValue`]: a shared cell whose read-modify-write cycles are serialized
//! - [`on_context`]: re-dispatches every notification through an [`ExecutionContext`]
//! - [`first_value`]: awaits the first item of a stream and stops observing it
//! - [`with_deadline`]: races a future against a timer
//!
//! # Example
//!
//! ```rust
//! use futures::{executor::block_on, stream, StreamExt};
//! use kgviz_reactive::{Status, StatusExt};
//!
//! let source = stream::iter(vec![Ok::<_, String>(1), Ok(2)]);
//! let snapshots: Vec<Status<i32, String>> = block_on(source.with_status().collect());
//!
//! assert!(snapshots[0].is_loading());
//! assert_eq!(snapshots[2].value(), Some(&2));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod context;
mod deadline;
mod error;
mod first;
mod shared;
mod status;

// Re-exports
pub use context::{
    on_context, ContextExt, ExecutionContext, InlineContext, Notification, OnContext,
    TokioContext, Work, DEFAULT_DISPATCH_WINDOW,
};
pub use deadline::{with_deadline, with_deadline_cancel};
pub use error::{DeadlineError, FirstValueError, UpdateError};
pub use first::first_value;
pub use shared::{SharedValue, UpdateHandle};
pub use status::{with_status, Status, StatusExt, WithStatus};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for status pipelines
    pub use crate::{
        first_value, on_context, with_deadline, with_status, ContextExt, ExecutionContext,
        SharedValue, Status, StatusExt,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
