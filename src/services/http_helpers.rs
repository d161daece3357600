use reqwest::{Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};

use crate::{errors::AppError, models::dto::ApiErrorBody};

/// Value of the `Authorization` header for a bearer token
pub fn bearer_header(token: &SecretString) -> String {
    format!("Bearer {}", token.expose_secret())
}

/// Whether a status means the credentials were rejected
pub fn is_auth_status(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// Converts a non-2xx response into an error, using the body's `detail` or
/// `message` verbatim when present
pub async fn error_from_response(response: Response) -> AppError {
    let status = response.status();
    let body = response.json::<ApiErrorBody>().await.unwrap_or_default();
    error_from_parts(status, body)
}

pub fn error_from_parts(status: StatusCode, body: ApiErrorBody) -> AppError {
    let message = body.into_message().unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    });

    if is_auth_status(status) {
        AppError::AuthenticationFailure(message)
    } else {
        AppError::request_failure(status, message)
    }
}
