use crate::auth::jwt::JwtService;
use crate::auth::models::UserContext;
use crate::error::HttpAppError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tubely_core::AppError;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: JwtService,
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub async fn auth_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = match request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
    {
        Some(h) => h,
        None => {
            return HttpAppError(AppError::Unauthenticated(
                "Missing authorization header".to_string(),
            ))
            .into_response();
        }
    };

    let token = match bearer_token(auth_header) {
        Some(token) => token,
        None => {
            return HttpAppError(AppError::Unauthenticated(
                "Invalid authorization header format".to_string(),
            ))
            .into_response();
        }
    };

    match auth_state.jwt.validate(token) {
        Ok(user_id) => {
            tracing::debug!(user_id = %user_id, "Request authenticated");
            request.extensions_mut().insert(UserContext { user_id });
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Token validation failed");
            HttpAppError(AppError::Unauthenticated("Couldn't validate JWT".to_string()))
                .into_response()
        }
    }
}
