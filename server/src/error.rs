use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures surfaced by HTTP handlers.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("internal consistency error: {0}")]
    OutOfRange(String),

    #[error("{0}")]
    Computation(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::OutOfRange(_) => "out_of_range",
            AppError::Computation(_) => "computation",
        }
    }
}

impl From<filmrec_core::Error> for AppError {
    fn from(err: filmrec_core::Error) -> Self {
        use filmrec_core::Error;
        match err {
            Error::NotFound(msg) => AppError::NotFound(msg),
            Error::InvalidInput(msg) => AppError::InvalidInput(msg),
            e @ Error::OutOfRange { .. } => AppError::OutOfRange(e.to_string()),
            Error::Computation(msg) => AppError::Computation(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::OutOfRange(msg) => {
                tracing::error!(error = %msg, "catalog/index invariant violated");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Computation(msg) => {
                tracing::error!(error = %msg, "recommendation computation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_core_errors() {
        let e: AppError = filmrec_core::Error::OutOfRange { position: 9, len: 3 }.into();
        assert_eq!(e.kind(), "out_of_range");
        assert_eq!(e.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let e: AppError = filmrec_core::Error::InvalidInput("Mes inválido".into()).into();
        assert_eq!(e.to_string(), "Mes inválido");
        assert_eq!(e.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
