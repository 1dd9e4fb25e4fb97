use crate::utils::error::PricingError;
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use serde_json::json;

impl ResponseError for PricingError {
    fn status_code(&self) -> StatusCode {
        match self {
            PricingError::ValidationError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            PricingError::ValidationError { field, message } => {
                json!({ "detail": message, "field": field })
            }
            other => json!({ "detail": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Body parse failures (bad JSON, missing fields, wrong types) become 422.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let status = match &err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            StatusCode::PAYLOAD_TOO_LARGE
        }
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    let detail = err.to_string();
    tracing::warn!("Rejected body on {}: {}", req.path(), detail);

    let response = HttpResponse::build(status).json(json!({ "detail": detail }));
    InternalError::from_response(err, response).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PricingError::validation("mileage", "must be non-zero").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            PricingError::model("missing artifact").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
