//! Gateway error types.
//!
//! Statement failures never surface here; they are contained inside the
//! response payload by the executors. The only transport-level failure the
//! gateway produces is an authentication rejection, plus a 500 if the blocking
//! pool refuses the work.

use actix_web::http::header;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Why the credential gate rejected a request.
///
/// Every variant is answered with the same uniform 401 so a caller cannot
/// distinguish an unknown user from a wrong password.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header is missing")]
    MissingAuthorization,

    #[error("authorization header is malformed: {0}")]
    MalformedAuthorization(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("credential lookup failed: {0}")]
    Lookup(String),

    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Handler-level error, mapped onto the transport.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("authentication failed")]
    Unauthorized(#[from] AuthError),

    #[error("blocking task was canceled")]
    Canceled,
}

impl From<actix_web::error::BlockingError> for GatewayError {
    fn from(_: actix_web::error::BlockingError) -> Self {
        GatewayError::Canceled
    }
}

impl ResponseError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Canceled => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            // Uniform rejection with a Basic challenge and no detail.
            GatewayError::Unauthorized(_) => HttpResponse::Unauthorized()
                .insert_header((header::WWW_AUTHENTICATE, "Basic realm=\"gateway\""))
                .finish(),
            GatewayError::Canceled => HttpResponse::InternalServerError().finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_auth_failure_maps_to_401() {
        for err in [
            AuthError::MissingAuthorization,
            AuthError::MalformedAuthorization("bad".into()),
            AuthError::InvalidCredentials,
            AuthError::Lookup("no such table".into()),
            AuthError::Hashing("cost".into()),
        ] {
            let gateway: GatewayError = err.into();
            assert_eq!(gateway.status_code(), StatusCode::UNAUTHORIZED);
            let response = gateway.error_response();
            assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
        }
    }
}
