//! Tests for domain error construction.

use super::*;
use rstest::rstest;
use uuid::Uuid;

fn violation(field: &str) -> FieldViolation {
    FieldViolation {
        field: field.to_owned(),
        message: format!("{field} is invalid"),
        value: None,
    }
}

#[rstest]
#[case(Error::invalid_request("x"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("x"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("x"), ErrorCode::Forbidden)]
#[case(Error::not_found("x"), ErrorCode::NotFound)]
#[case(Error::conflict("x"), ErrorCode::Conflict)]
#[case(Error::service_unavailable("x"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("x"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
    assert!(error.violations().is_empty());
}

#[rstest]
#[case(ErrorCode::NotFound, "Not found")]
#[case(ErrorCode::InternalError, "Server error")]
fn blank_messages_fall_back(#[case] code: ErrorCode, #[case] expected: &str) {
    assert_eq!(Error::new(code, "  ").message(), expected);
}

#[rstest]
fn validation_keeps_every_violation() {
    let err = Error::validation(vec![violation("title"), violation("price")]);

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), VALIDATION_FAILED_MESSAGE);
    let fields: Vec<&str> = err.violations().iter().map(|v| v.field.as_str()).collect();
    assert_eq!(fields, ["title", "price"]);
    assert_eq!(err.to_string(), "Validation failed (2 fields)");
}

#[rstest]
fn trace_id_is_none_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn new_captures_trace_id_in_scope() {
    let trace_id = TraceId::from_uuid(Uuid::nil());
    let error = TraceId::scope(trace_id, async { Error::conflict("sold") }).await;
    assert_eq!(error.trace_id(), Some(trace_id));
}
