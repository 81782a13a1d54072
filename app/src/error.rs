use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use err_derive::Error;
use log::*;
use serde::Serialize;

use infra::ids::{Entity, Id};

/// Everything a request can fail with. Each variant maps onto one HTTP
/// status; the message is what the client gets to see.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(display = "{}", _0)]
    NotFound(String),
    #[error(display = "{}", _0)]
    Invalid(String),
    #[error(display = "{}", _0)]
    Conflict(String),
    #[error(display = "{}", _0)]
    MethodNotAllowed(String),
    #[error(display = "storage failure: {}", _0)]
    Storage(anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ApiError {
    pub fn not_found<T: Entity>(id: &Id<T>) -> Self {
        ApiError::NotFound(format!("{} does not exist: {}", T::NAME, id))
    }

    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        ApiError::Invalid(msg.into())
    }

    pub fn conflict<S: Into<String>>(msg: S) -> Self {
        ApiError::Conflict(msg.into())
    }

    pub fn message(&self) -> String {
        match self {
            ApiError::Storage(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Storage(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Invalid(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {:?}", self);
        } else {
            debug!("Rejecting request ({}): {}", status, self);
        }
        let message = self.message();
        HttpResponse::build(status).json(ErrorBody { error: &message })
    }
}
