//! Conversions from external infrastructure errors into domain errors.

use opspulse_domain::OpsPulseError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can
/// be converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub OpsPulseError);

impl From<InfraError> for OpsPulseError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<OpsPulseError> for InfraError {
    fn from(value: OpsPulseError) -> Self {
        InfraError(value)
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        let kind = if value.is_timeout() {
            "http request timed out"
        } else if value.is_connect() {
            "http connection failed"
        } else if value.is_decode() {
            "http response body could not be decoded"
        } else {
            "http request failed"
        };
        InfraError(OpsPulseError::Network(format!("{kind}: {value}")))
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        match value {
            SqlError::QueryReturnedNoRows => {
                InfraError(OpsPulseError::NotFound("no rows returned by query".into()))
            }
            SqlError::InvalidColumnType(_, _, ty) => {
                InfraError(OpsPulseError::Source(format!("invalid column type: {ty}")))
            }
            SqlError::InvalidPath(path) => InfraError(OpsPulseError::Source(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            ))),
            other => InfraError(OpsPulseError::Source(other.to_string())),
        }
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(OpsPulseError::Source(format!("invalid JSON payload: {value}")))
    }
}

impl From<tokio::task::JoinError> for InfraError {
    fn from(value: tokio::task::JoinError) -> Self {
        InfraError(OpsPulseError::Internal(format!("blocking task failed: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_no_rows_becomes_not_found() {
        let err: InfraError = SqlError::QueryReturnedNoRows.into();
        assert!(matches!(err.0, OpsPulseError::NotFound(_)));
    }

    #[test]
    fn json_errors_become_source_errors() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: InfraError = parse_err.into();
        assert!(matches!(err.0, OpsPulseError::Source(_)));
    }
}
