use sea_orm::{DbErr, SqlErr};

/// Whether a database error is a unique-constraint violation.
///
/// Used by create-if-absent writes that rely on a unique index as the
/// backstop against concurrent inserts.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
