//! Conversions from external infrastructure errors into domain errors.

use lectern_domain::LecternError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub LecternError);

impl From<InfraError> for LecternError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<LecternError> for InfraError {
    fn from(value: LecternError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoLecternError {
    fn into_lectern(self) -> LecternError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → LecternError */
/* -------------------------------------------------------------------------- */

impl IntoLecternError for SqlError {
    fn into_lectern(self) -> LecternError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        LecternError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        LecternError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067) => {
                        LecternError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::ConstraintViolation, 787) => {
                        LecternError::Database("foreign key constraint violation".into())
                    }
                    _ => LecternError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => LecternError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                LecternError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                LecternError::Database(format!("invalid column type: {ty}"))
            }
            RE::Utf8Error(_) => LecternError::Database("invalid UTF-8 returned from sqlite".into()),
            RE::InvalidQuery => LecternError::Database("invalid SQL query".into()),
            other => LecternError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_lectern())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → LecternError */
/* -------------------------------------------------------------------------- */

impl IntoLecternError for r2d2::Error {
    fn into_lectern(self) -> LecternError {
        LecternError::Database(format!("connection pool error: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_lectern())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → LecternError */
/* -------------------------------------------------------------------------- */

impl IntoLecternError for HttpError {
    fn into_lectern(self) -> LecternError {
        if self.is_timeout() {
            return LecternError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return LecternError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                404 => LecternError::NotFound(message),
                429 => LecternError::Network(message),
                400..=499 => LecternError::InvalidInput(message),
                _ => LecternError::Network(message),
            };
        }

        LecternError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_lectern())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use reqwest::{Client, StatusCode};
    use rusqlite::ffi::{Error as FfiError, ErrorCode};
    use rusqlite::Error as SqlError;
    use tokio::runtime::Runtime;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn sqlite_busy_maps_to_database_error() {
        let err = SqlError::SqliteFailure(
            FfiError { code: ErrorCode::DatabaseBusy, extended_code: 5 },
            Some("database is locked".into()),
        );

        let mapped: LecternError = InfraError::from(err).into();
        match mapped {
            LecternError::Database(msg) => {
                assert!(msg.contains("busy") || msg.contains("locked"));
            }
            other => panic!("expected database error, got {:?}", other),
        }
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        let mapped: LecternError = InfraError::from(SqlError::QueryReturnedNoRows).into();
        assert!(matches!(mapped, LecternError::NotFound(_)));
    }

    #[test]
    fn http_status_404_maps_to_not_found() {
        Runtime::new().unwrap().block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(StatusCode::NOT_FOUND))
                .mount(&server)
                .await;

            let client = Client::builder().no_proxy().build().unwrap();
            let error =
                client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

            let mapped: LecternError = InfraError::from(error).into();
            match mapped {
                LecternError::NotFound(msg) => assert!(msg.contains("404")),
                other => panic!("expected not found, got {:?}", other),
            }
        });
    }

    #[test]
    fn http_status_500_maps_to_network_error() {
        Runtime::new().unwrap().block_on(async {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(StatusCode::INTERNAL_SERVER_ERROR))
                .mount(&server)
                .await;

            let client = Client::builder().no_proxy().build().unwrap();
            let error =
                client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

            let mapped: LecternError = InfraError::from(error).into();
            match mapped {
                LecternError::Network(msg) => assert!(msg.contains("500")),
                other => panic!("expected network error, got {:?}", other),
            }
        });
    }
}
