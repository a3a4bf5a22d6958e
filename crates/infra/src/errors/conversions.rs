//! Conversions from external infrastructure errors into domain errors.

use anistream_common::cache::CacheError;
use anistream_domain::AniStreamError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub AniStreamError);

impl From<InfraError> for AniStreamError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<AniStreamError> for InfraError {
    fn from(value: AniStreamError) -> Self {
        InfraError(value)
    }
}

impl std::fmt::Display for InfraError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for InfraError {}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoAniStreamError {
    fn into_anistream(self) -> AniStreamError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → AniStreamError */
/* -------------------------------------------------------------------------- */

fn describe_sql(err: SqlError) -> String {
    use rusqlite::ffi::ErrorCode;
    use rusqlite::Error as RE;

    match err {
        RE::SqliteFailure(err, maybe_message) => {
            let message = maybe_message.unwrap_or_default();
            match err.code {
                ErrorCode::DatabaseBusy => "database is busy".into(),
                ErrorCode::DatabaseLocked => "database is locked".into(),
                ErrorCode::DiskFull => "quota exceeded: disk full".into(),
                ErrorCode::ReadOnly => "database is read-only".into(),
                ErrorCode::CannotOpen => format!("unable to open database: {message}"),
                ErrorCode::NotADatabase => "file is not a database".into(),
                _ => format!(
                    "sqlite failure {:?} (code {}): {}",
                    err.code, err.extended_code, message
                ),
            }
        }
        RE::FromSqlConversionFailure(_, _, cause) => {
            format!("failed to convert sqlite value: {cause}")
        }
        RE::InvalidColumnType(_, _, ty) => format!("invalid column type: {ty}"),
        RE::Utf8Error(_) => "invalid UTF-8 returned from sqlite".into(),
        RE::InvalidPath(path) => format!("invalid database path: {}", path.to_string_lossy()),
        other => other.to_string(),
    }
}

impl IntoAniStreamError for SqlError {
    fn into_anistream(self) -> AniStreamError {
        match self {
            SqlError::QueryReturnedNoRows => {
                AniStreamError::NotFound("no rows returned by query".into())
            }
            other => AniStreamError::Storage(describe_sql(other)),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_anistream())
    }
}

/// Cache-side view of a SQLite failure inside `operation`
pub(crate) fn sql_to_cache(operation: &str, err: SqlError) -> CacheError {
    CacheError::storage(operation, describe_sql(err))
}

/* -------------------------------------------------------------------------- */
/* CacheError → AniStreamError */
/* -------------------------------------------------------------------------- */

impl IntoAniStreamError for CacheError {
    fn into_anistream(self) -> AniStreamError {
        match self {
            CacheError::Common(err) => AniStreamError::Config(err.to_string()),
            err @ CacheError::Serialization { .. } => AniStreamError::Internal(err.to_string()),
            other => AniStreamError::Storage(other.to_string()),
        }
    }
}

impl From<CacheError> for InfraError {
    fn from(value: CacheError) -> Self {
        InfraError(value.into_anistream())
    }
}
