use axum::http::StatusCode;

use crate::api::rest::problem::{Problem, ProblemResponse};
use crate::domain::error::DomainError;

pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.catalog.local/{code}"))
        .with_code(code)
        .with_instance(instance);

    let problem = match tracing::Span::current().id() {
        Some(id) => problem.with_trace_id(id.into_u64().to_string()),
        None => problem,
    };

    ProblemResponse(problem)
}

/// 400 for request-shape problems found before the service is called.
pub fn bad_request(field: &str, message: impl Into<String>, instance: &str) -> ProblemResponse {
    map_domain_error(&DomainError::validation(field, message), instance)
}

/// Map a domain error to an RFC 9457 response. Internal details are logged,
/// never returned.
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::NotFound { entity } => from_parts(
            StatusCode::NOT_FOUND,
            "CATALOG_NOT_FOUND",
            "Not found",
            format!("{entity} not found"),
            instance,
        ),
        DomainError::Conflict { .. } => {
            tracing::debug!(error = %e, "conflict");
            from_parts(
                StatusCode::CONFLICT,
                "CATALOG_CONFLICT",
                "Conflict",
                "The request conflicts with existing data",
                instance,
            )
        }
        DomainError::Unauthorized => from_parts(
            StatusCode::UNAUTHORIZED,
            "CATALOG_UNAUTHORIZED",
            "Unauthorized",
            "Missing or invalid credentials",
            instance,
        ),
        DomainError::Validation { field, message } => from_parts(
            StatusCode::BAD_REQUEST,
            "CATALOG_VALIDATION",
            "Validation error",
            format!("{field}: {message}"),
            instance,
        ),
        DomainError::Timeout { operation } => {
            tracing::warn!(operation, "request timed out");
            from_parts(
                StatusCode::GATEWAY_TIMEOUT,
                "CATALOG_TIMEOUT",
                "Timeout",
                "The operation did not finish in time",
                instance,
            )
        }
        DomainError::Unknown { .. } => {
            tracing::error!(error = ?e, "internal error");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "CATALOG_INTERNAL",
                "Internal error",
                "An internal error occurred",
                instance,
            )
        }
    }
}
