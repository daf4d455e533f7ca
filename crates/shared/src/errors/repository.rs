use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Sqlx(SqlxError),

    #[error("Not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invariant violated: {0}")]
    Invariant(String),
}

impl From<SqlxError> for RepositoryError {
    fn from(error: SqlxError) -> Self {
        match &error {
            SqlxError::RowNotFound => RepositoryError::NotFound,
            SqlxError::Database(db) if db.is_unique_violation() || db.is_check_violation() => {
                RepositoryError::Conflict(db.message().to_string())
            }
            _ => RepositoryError::Sqlx(error),
        }
    }
}
