// sqlx::Error -> AppError mapping

use swipedeck_core::error::AppError;

/// Convert sqlx::Error to AppError::Storage with the SQLite result code kept
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => match db_err.code() {
            // SQLite result codes: https://www.sqlite.org/rescode.html
            Some(code) => match code.as_ref() {
                "5" => AppError::Storage(format!(
                    "Database locked (SQLITE_BUSY): {}",
                    db_err.message()
                )),
                "13" => AppError::Storage(format!("Database full: {}", db_err.message())),
                code_str => AppError::Storage(format!(
                    "Database error [{}]: {}",
                    code_str,
                    db_err.message()
                )),
            },
            None => AppError::Storage(format!("Database error: {}", db_err.message())),
        },
        sqlx::Error::ColumnNotFound(col) => AppError::Storage(format!("Column not found: {}", col)),
        sqlx::Error::PoolTimedOut => AppError::Storage("Connection pool timed out".to_string()),
        // Connection, pool, protocol errors
        _ => AppError::Storage(err.to_string()),
    }
}
