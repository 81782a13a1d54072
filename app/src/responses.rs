use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder};
use serde::Serialize;

use crate::error::ApiError;
use crate::payload::Envelope;

/// Wraps `T` as `{"data": T}`.
pub struct DataResponse<T> {
    status: StatusCode,
    data: T,
}

impl<T> DataResponse<T> {
    pub fn of(data: T) -> Self {
        let status = StatusCode::OK;
        DataResponse { status, data }
    }

    pub fn created(data: T) -> Self {
        let status = StatusCode::CREATED;
        DataResponse { status, data }
    }
}

impl<T: Serialize> Responder for DataResponse<T> {
    type Body = BoxBody;

    fn respond_to(self, _: &HttpRequest) -> HttpResponse<Self::Body> {
        let DataResponse { status, data } = self;
        HttpResponse::build(status).json(Envelope::of(data))
    }
}

pub fn no_content() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

pub async fn method_not_allowed(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    Err(ApiError::MethodNotAllowed(format!(
        "{} not allowed for {}",
        req.method(),
        req.path()
    )))
}

pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound(format!("Path not found: {}", req.path())))
}
