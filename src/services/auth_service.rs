//! Authentication service - Session login, logout and token verification.
//!
//! A session is a signed token carrying the session id (`sid`) plus a Redis
//! record under that id. Deleting the record revokes the token even before
//! it expires.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::access::record_activity;
use crate::config::Config;
use crate::domain::{
    ActivityAction, ActivityEntity, Actor, NewActivity, Password, Session, User,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{TokenStore, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    /// Session id
    pub sid: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: String,
    /// Seconds until the session expires
    pub expires_in: i64,
    pub user: User,
}

/// Authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verify credentials and open a session
    async fn login(
        &self,
        username: String,
        password: String,
        ip_address: Option<String>,
    ) -> AppResult<LoginResult>;

    /// Close the given session
    async fn logout(&self, actor: &Actor, session_id: &str) -> AppResult<()>;

    /// Resolve a token to its active user and claims
    async fn authenticate(&self, token: &str) -> AppResult<(User, Claims)>;
}

/// Sign a session token for `user`
fn generate_token(user: &User, session_id: &str, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.session_ttl_hours);

    let claims = Claims {
        sub: user.id,
        sid: session_id.to_string(),
        role: user.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?)
}

/// Check signature and expiry only
fn verify_token(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    tokens: Arc<dyn TokenStore>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, tokens: Arc<dyn TokenStore>, config: Config) -> Self {
        Self {
            uow,
            tokens,
            config,
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn login(
        &self,
        username: String,
        password: String,
        ip_address: Option<String>,
    ) -> AppResult<LoginResult> {
        let user = self.uow.users().find_by_username(username.trim()).await?;

        // Same hashing work whether or not the user exists
        let stored = user.as_ref().map(|u| u.password_hash.as_str());
        if !Password::verify_or_dummy(stored, &password) {
            tracing::info!(username = %username, "Failed login attempt");
            return Err(AppError::InvalidCredentials);
        }
        let user = user.ok_or(AppError::InvalidCredentials)?;

        let session = Session::new(user.id, ip_address.clone());
        let token = generate_token(&user, &session.id, &self.config)?;
        self.tokens
            .put_session(session, self.config.session_ttl_seconds() as u64)
            .await?;

        let actor = Actor::new(user.id, user.role, ip_address);
        record_activity(
            self.uow.as_ref(),
            NewActivity::by(&actor, ActivityAction::Login, ActivityEntity::User).entity_id(user.id),
        )
        .await;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginResult {
            token,
            expires_in: self.config.session_ttl_seconds(),
            user,
        })
    }

    async fn logout(&self, actor: &Actor, session_id: &str) -> AppResult<()> {
        self.tokens.remove_session(session_id).await?;

        record_activity(
            self.uow.as_ref(),
            NewActivity::by(actor, ActivityAction::Logout, ActivityEntity::User)
                .entity_id(actor.user_id),
        )
        .await;

        tracing::info!(user_id = %actor.user_id, "User logged out");
        Ok(())
    }

    async fn authenticate(&self, token: &str) -> AppResult<(User, Claims)> {
        let claims = verify_token(token, &self.config)?;

        let session = self
            .tokens
            .get_session(&claims.sid)
            .await?
            .ok_or(AppError::Unauthorized)?;
        if session.user_id != claims.sub {
            return Err(AppError::Unauthorized);
        }

        // Deleted users lose access immediately
        let user = self
            .uow
            .users()
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok((user, claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: String::new(),
            name: "Ana".to_string(),
            role: UserRole::Manager,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_token_round_trip() {
        let config = Config::for_tests();
        let user = user();
        let token = generate_token(&user, "sid-1", &config).unwrap();

        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.sid, "sid-1");
        assert_eq!(claims.role, "manager");
        assert_eq!(claims.exp - claims.iat, config.session_ttl_seconds());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let config = Config::for_tests();
        let token = generate_token(&user(), "sid-1", &config).unwrap();
        let tampered = format!("{}x", token);
        assert!(verify_token(&tampered, &config).is_err());
    }
}
