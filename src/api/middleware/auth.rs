//! Session authentication middleware.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::api::extractors::client_ip;
use crate::api::AppState;
use crate::config::{BEARER_TOKEN_PREFIX, SESSION_COOKIE};
use crate::domain::{Actor, User, UserRole};
use crate::errors::AppError;

/// Authenticated user resolved from the session token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub session_id: String,
    pub ip_address: Option<String>,
}

impl CurrentUser {
    pub fn from_user(user: User, session_id: String, ip_address: Option<String>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            name: user.name,
            role: user.role,
            session_id,
            ip_address,
        }
    }

    /// Check if user has admin role.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Identity handed to the services
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role, self.ip_address.clone())
    }
}

/// Session cookie first, then `Authorization: Bearer`.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .map(str::to_string)
}

/// Resolves the session and injects [`CurrentUser`] into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(request.headers()).ok_or(AppError::Unauthorized)?;

    let (user, claims) = state.services.auth().authenticate(&token).await?;
    let ip_address = client_ip(
        request.headers(),
        request.extensions(),
        state.config.trust_proxy,
    );

    let current_user = CurrentUser::from_user(user, claims.sid, ip_address);
    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

/// Require admin role, returns Forbidden error if not admin.
pub fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
