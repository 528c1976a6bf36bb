//! Request middleware.
//!
//! [`Trace`] gives every request a trace id shared by logs, the `trace-id`
//! response header, and error bodies.

pub mod trace;

pub use trace::Trace;
