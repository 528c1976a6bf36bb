//! Domain-level error types.
//!
//! Services fail with [`Error`]: a stable [`ErrorCode`], a caller-facing
//! message, and for rejected submissions the list of offending fields.
//! Adapters decide how each code is rendered.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{FieldViolation, TraceId};

/// Message carried by every rejected listing submission.
pub const VALIDATION_FAILED_MESSAGE: &str = "Validation failed";

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[non_exhaustive]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// Authentication failed or is missing.
    Unauthorized,
    /// Authenticated but not the owner of the resource.
    Forbidden,
    /// The listing or image does not exist.
    NotFound,
    /// The listing is not in a state that permits the change.
    Conflict,
    /// A backing store is temporarily unreachable.
    ServiceUnavailable,
    /// Anything else. Never carries internal detail to callers.
    InternalError,
}

impl ErrorCode {
    /// Message used when a caller-facing message would otherwise be blank.
    pub const fn fallback_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "Invalid request",
            Self::Unauthorized => "Authorization required",
            Self::Forbidden => "Not authorized",
            Self::NotFound => "Not found",
            Self::Conflict => "Conflict",
            Self::ServiceUnavailable => "Service unavailable",
            Self::InternalError => "Server error",
        }
    }
}

/// Failure raised by domain services.
///
/// The message is never blank: constructors substitute
/// [`ErrorCode::fallback_message`] for empty input. The active [`TraceId`]
/// is captured at construction.
///
/// # Examples
/// ```
/// use campus_trade::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("Product not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert!(err.violations().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    violations: Vec<FieldViolation>,
    trace_id: Option<TraceId>,
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.fallback_message().to_owned()
        } else {
            message
        };
        Self {
            code,
            message,
            violations: Vec::new(),
            trace_id: TraceId::current(),
        }
    }

    /// A rejected submission listing every offending field.
    pub fn validation(violations: Vec<FieldViolation>) -> Self {
        Self {
            violations,
            ..Self::new(ErrorCode::InvalidRequest, VALIDATION_FAILED_MESSAGE)
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Field-level violations; empty unless built by [`Error::validation`].
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Correlation identifier captured when the error was raised.
    pub fn trace_id(&self) -> Option<TraceId> {
        self.trace_id
    }

    /// Replace the captured trace identifier.
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.violations.len() {
            0 => write!(f, "{}", self.message),
            n => write!(f, "{} ({n} fields)", self.message),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests;
