//! Caller-visible error kinds (§7). Store errors are classified by
//! inspecting the Postgres `SQLSTATE`; everything uncategorized becomes
//! `Internal` and wraps the underlying cause.

/// Errors the [`crate::store`] layer can return from a composite operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("user not found")]
    UserNotFound,
    #[error("segment already exists")]
    SegmentAlreadyExists,
    #[error("segment not found")]
    SegmentNotFound,
    #[error("segment already assigned")]
    SegmentAlreadyAssigned,
    #[error("segment not assigned")]
    SegmentNotAssigned,
    #[error("internal store error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Postgres `SQLSTATE` for a unique-constraint violation.
pub const PG_UNIQUE_VIOLATION: &str = "23505";
/// Postgres `SQLSTATE` for a foreign-key violation.
pub const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// Classifies a raw `sqlx::Error` from an insert into `user_segments` into
/// the store's domain errors, per §4.4's error taxonomy. Falls back to
/// `on_other` (typically `StoreError::Internal`) for anything else.
pub fn classify_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        match db_err.code().as_deref() {
            Some(PG_UNIQUE_VIOLATION) => return StoreError::SegmentAlreadyAssigned,
            Some(PG_FOREIGN_KEY_VIOLATION) => return StoreError::UserNotFound,
            _ => {}
        }
    }
    StoreError::Internal(err.into())
}

/// Classifies a raw `sqlx::Error` from inserting a user row.
pub fn classify_create_user_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION) {
            return StoreError::UserAlreadyExists;
        }
    }
    StoreError::Internal(err.into())
}

/// Errors the [`crate::service`] layer can return, a superset of
/// [`StoreError`] plus validation-only kinds that never touch the store.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("data for update and delete cannot be empty at the same time")]
    EmptyData,
    #[error("attempt to add and remove the same segment")]
    IncorrectData,
    #[error("incorrect date, history for dates before {0} is not available")]
    IncorrectYear(i32),
    #[error("incorrect date, history for a month that has not yet come")]
    IncorrectMonth,
    #[error("data lifetime for the link has expired, create a new one")]
    ExpiredData,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<segment_core::MonthKeyError> for ServiceError {
    fn from(err: segment_core::MonthKeyError) -> Self {
        match err {
            segment_core::MonthKeyError::IncorrectYear => {
                ServiceError::IncorrectYear(segment_core::model::EARLIEST_YEAR)
            }
            segment_core::MonthKeyError::IncorrectMonth => ServiceError::IncorrectMonth,
        }
    }
}
