//! Inbound adapters translating external traffic into domain port calls.
//!
//! [`http`] carries the REST API and multipart uploads; [`ws`] carries the
//! live new-product channel. Framework types stop at this boundary.

pub mod http;
pub mod ws;
