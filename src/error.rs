use std::{borrow::Cow, io};

use axum::{
    Json,
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::storage::is_prepared_statement_error;

pub type Result<T> = core::result::Result<T, Error>;

/// 面向客户端的错误，消息会原样返回给调用方。
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(Cow<'static, str>),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("object storage responded {status}: {message}")]
    Storage { status: u16, message: String },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Password(#[from] bcrypt::BcryptError),

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Json(#[from] JsonRejection),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
}

const POOLER_HINT: &str =
    "Database connection error. Please verify you are using SESSION mode pooler (not Transaction mode).";
const POOLER_DETAILS: &str =
    "Use the session mode connection string of your pooler, or add ?pgbouncer=true to DATABASE_URL";

fn body(status: StatusCode, error: &str) -> Response {
    (status, Json(json!({ "error": error }))).into_response()
}

fn internal(e: &dyn std::fmt::Display, what: &'static str) -> Response {
    tracing::error!(%e, "{what}");
    body(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Api(api_error) => {
                let status = match &api_error {
                    ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
                    ApiError::Unauthorized | ApiError::InvalidCredentials => {
                        StatusCode::UNAUTHORIZED
                    }
                    ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
                    ApiError::NotFound(_) => StatusCode::NOT_FOUND,
                    ApiError::Conflict(_) => StatusCode::CONFLICT,
                };
                body(status, &api_error.to_string())
            }
            Error::Sqlx(sqlx::Error::RowNotFound) => body(StatusCode::NOT_FOUND, "Not found"),
            Error::Sqlx(e) if is_prepared_statement_error(&e) => {
                tracing::error!(%e, "prepared statement conflict survived retries");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": POOLER_HINT, "details": POOLER_DETAILS })),
                )
                    .into_response()
            }
            Error::Sqlx(e) => internal(&e, "sqlx error"),
            Error::Storage { status, message } => {
                tracing::error!(status, %message, "object storage error");
                body(StatusCode::BAD_GATEWAY, "Bad Gateway")
            }
            Error::Reqwest(e) => {
                tracing::error!(%e, "object storage unreachable");
                body(StatusCode::BAD_GATEWAY, "Bad Gateway")
            }
            Error::Token(_) => body(StatusCode::UNAUTHORIZED, "Unauthorized"),
            Error::Multipart(e) => body(e.status(), &e.body_text()),
            Error::Json(e) => body(e.status(), &e.body_text()),
            Error::Io(e) => internal(&e, "file io error"),
            Error::Password(e) => internal(&e, "password hashing error"),
            Error::Join(e) => internal(&e, "blocking task failed"),
            Error::Config(e) => internal(&e, "configuration error"),
            Error::Toml(e) => internal(&e, "configuration error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn json_of(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn api_errors_map_to_status_and_message() {
        let resp = Error::from(ApiError::bad_request("Missing required fields")).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_of(resp).await["error"], "Missing required fields");

        let resp = Error::from(ApiError::Conflict("Email already in use")).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = Error::from(ApiError::Unauthorized).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_of(resp).await["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn row_not_found_is_404() {
        let resp = Error::from(sqlx::Error::RowNotFound).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn prepared_statement_error_carries_pooler_hint() {
        let err = sqlx::Error::Protocol("prepared statement \"sqlx_s_1\" already exists".into());
        let resp = Error::from(err).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_of(resp).await;
        assert!(json["error"].as_str().unwrap().contains("SESSION mode"));
        assert!(json["details"].is_string());
    }

    #[tokio::test]
    async fn other_sqlx_errors_hide_details() {
        let resp = Error::from(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_of(resp).await["error"], "Internal Server Error");
    }
}
