//! Campus marketplace backend.
//!
//! Hexagonal layout: `domain` holds the model, ports, and services;
//! `inbound` adapts HTTP and WebSocket traffic onto driving ports;
//! `outbound` implements driven ports over PostgreSQL, the filesystem, JWTs,
//! and an in-process broadcast hub.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
