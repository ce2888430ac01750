use crate::error::ErrorKind;
use crate::model::enums::ResourceType;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use diesel::QueryResult;
use serde::Serialize;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub enum ApiError {
    #[error("{0} already exists")]
    AlreadyExists(ResourceType),
    FailedConnection(#[from] diesel::r2d2::PoolError),
    FailedQuery(#[from] diesel::result::Error),
    FormRejection(#[from] axum::extract::rejection::FormRejection),
    #[error("{0} not found")]
    NotFound(ResourceType),
    Password(#[from] argon2::password_hash::Error),
    PathRejection(#[from] axum::extract::rejection::PathRejection),
    QueryRejection(#[from] axum::extract::rejection::QueryRejection),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        type QueryError = diesel::result::Error;

        let query_error_status_code = |err: &QueryError| match err {
            QueryError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match self {
            Self::FormRejection(err) => err.status(),
            Self::QueryRejection(err) => err.status(),
            // Ids that don't parse can't name an existing resource
            Self::PathRejection(_) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) => StatusCode::CONFLICT,
            Self::Password(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::FailedConnection(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::FailedQuery(err) => query_error_status_code(err),
        }
    }

    fn category(&self) -> &'static str {
        match self {
            Self::AlreadyExists(_) => "Already Exists",
            Self::FailedConnection(_) => "Failed Connection",
            Self::FailedQuery(_) => "Failed Query",
            Self::FormRejection(_) => "Form Rejection",
            Self::NotFound(_) => "Resource Not Found",
            Self::Password(_) => "Password Error",
            Self::PathRejection(_) => "Path Rejection",
            Self::QueryRejection(_) => "Query Rejection",
        }
    }

    fn response(&self) -> ErrorResponse {
        ErrorResponse {
            name: self.kind(),
            title: self.category(),
            description: self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}: {self}", self.kind());
        } else {
            tracing::debug!("{}: {self}", self.kind());
        }
        (status, Json(self.response())).into_response()
    }
}

pub fn map_unique_violation<T>(result: QueryResult<T>, resource: ResourceType) -> ApiResult<T> {
    use diesel::result::DatabaseErrorKind;
    use diesel::result::Error as DieselError;

    match result {
        Ok(value) => Ok(value),
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => Err(ApiError::AlreadyExists(resource)),
        Err(err) => Err(err.into()),
    }
}

/// Represents a response if an error occured.
#[derive(Serialize)]
struct ErrorResponse {
    title: &'static str,
    name: &'static str,
    description: String,
}
