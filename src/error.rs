use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{models::ErrorBody, validation::ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    BadRequest(String),

    #[error("movie not found")]
    NotFound,

    #[error(transparent)]
    Database(sea_orm::DbErr),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            // The row vanished between lookup and write.
            sea_orm::DbErr::RecordNotUpdated => Self::NotFound,
            err => Self::Database(err),
        }
    }
}

impl From<jiff::Error> for AppError {
    fn from(err: jiff::Error) -> Self {
        Self::Internal(anyhow::Error::new(err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let erro = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, axum::Json(ErrorBody { erro })).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, ErrorBody) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_errors_carry_their_reason() {
        let (status, body) = body_of(ValidationError::YearOutOfRange.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.erro, "year must be between 1900 and 2025");
    }

    #[tokio::test]
    async fn store_faults_are_not_leaked() {
        let err = AppError::from(sea_orm::DbErr::Custom("disk I/O error at /var/db".into()));
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.erro, "internal server error");
    }

    #[tokio::test]
    async fn missing_rows_map_to_not_found() {
        let (status, body) = body_of(sea_orm::DbErr::RecordNotUpdated.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.erro, "movie not found");
    }
}
