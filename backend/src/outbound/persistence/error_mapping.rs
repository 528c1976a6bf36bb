//! Shared pool and Diesel error translation for repository adapters.

use tracing::debug;

use crate::domain::ports::{ListingRepositoryError, SellerDirectoryError};

use super::pool::PoolError;

/// Repository errors that distinguish connectivity from query failures.
pub(crate) trait StoreFailure: Sized {
    fn connection_failure(message: String) -> Self;
    fn query_failure(message: String) -> Self;
}

impl StoreFailure for ListingRepositoryError {
    fn connection_failure(message: String) -> Self {
        Self::connection(message)
    }

    fn query_failure(message: String) -> Self {
        Self::query(message)
    }
}

impl StoreFailure for SellerDirectoryError {
    fn connection_failure(message: String) -> Self {
        Self::connection(message)
    }

    fn query_failure(message: String) -> Self {
        Self::query(message)
    }
}

pub(crate) fn map_pool_error<E: StoreFailure>(error: PoolError) -> E {
    E::connection_failure(error.into_message())
}

/// Translate a Diesel error. Driver details go to the debug log only.
pub(crate) fn map_diesel_error<E: StoreFailure>(error: diesel::result::Error) -> E {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            E::connection_failure("database connection error".to_owned())
        }
        DieselError::NotFound => E::query_failure("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => E::query_failure("database query error".to_owned()),
        DieselError::DeserializationError(_) => {
            E::query_failure("stored row could not be decoded".to_owned())
        }
        _ => E::query_failure("database error".to_owned()),
    }
}
