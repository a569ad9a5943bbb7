use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroom_core::DomainError;
use stockroom_infra::ServiceError;

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    let code = err.code();
    match err {
        ServiceError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, code, msg),
        ServiceError::InvariantViolation(msg) => json_error(StatusCode::UNPROCESSABLE_ENTITY, code, msg),
        ServiceError::Conflict(msg) => json_error(StatusCode::CONFLICT, code, msg),
        ServiceError::NotFound => json_error(StatusCode::NOT_FOUND, code, "not found"),
        ServiceError::InvalidCredentials => json_error(StatusCode::UNAUTHORIZED, code, "invalid credentials"),
        ServiceError::Forbidden(msg) => json_error(StatusCode::FORBIDDEN, code, msg),
        e @ (ServiceError::Store(_) | ServiceError::Report(_) | ServiceError::Internal(_)) => {
            tracing::error!(error = %e, code, "request failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, code, e.to_string())
        }
    }
}

/// Input that failed to parse before reaching the service (ids, dates, scopes).
pub fn bad_request(err: DomainError) -> axum::response::Response {
    let code = match err {
        DomainError::InvalidId(_) => "invalid_id",
        _ => "validation_error",
    };
    json_error(StatusCode::BAD_REQUEST, code, err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
