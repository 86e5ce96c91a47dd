//! Redis cache implementation.
//!
//! Holds login sessions, pending password-reveal codes and rate limit
//! counters. Services depend on the [`TokenStore`] trait rather than on
//! Redis directly.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError, Script};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::config::{
    Config, CACHE_PREFIX_RATE_LIMIT, CACHE_PREFIX_REVEAL_ATTEMPTS, CACHE_PREFIX_REVEAL_CODE,
    CACHE_PREFIX_SESSION,
};
use crate::domain::{RevealCode, Session};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Short-lived state keyed by session or by (user, certificate).
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn put_session(&self, session: Session, ttl_seconds: u64) -> AppResult<()>;

    async fn get_session(&self, session_id: &str) -> AppResult<Option<Session>>;

    async fn remove_session(&self, session_id: &str) -> AppResult<()>;

    /// Store a fresh code, replacing any pending one and its guess count
    async fn put_code(
        &self,
        user_id: Uuid,
        certificate_id: Uuid,
        code: RevealCode,
        ttl_seconds: u64,
    ) -> AppResult<()>;

    /// Count one guess against the pending code and return its ordinal.
    /// Concurrent callers always observe distinct values.
    async fn register_attempt(
        &self,
        user_id: Uuid,
        certificate_id: Uuid,
        ttl_seconds: u64,
    ) -> AppResult<u32>;

    async fn get_code(&self, user_id: Uuid, certificate_id: Uuid) -> AppResult<Option<RevealCode>>;

    async fn remove_code(&self, user_id: Uuid, certificate_id: Uuid) -> AppResult<()>;
}

/// Fixed-window request counter.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Returns (current_count, is_allowed)
    async fn hit(&self, identifier: &str, max_requests: u64, window_seconds: u64)
        -> AppResult<(u64, bool)>;
}

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");

        Ok(Self { connection })
    }

    // =========================================================================
    // Generic Cache Operations
    // =========================================================================

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await?;

        value
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    AppError::internal(format!("Cache deserialization error: {}", e))
                })
            })
            .transpose()
    }

    /// Set a value with a custom TTL (in seconds).
    pub async fn set_with_ttl<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let json = to_json(value)?;

        conn.set_ex::<_, _, ()>(key, json, ttl_seconds).await?;

        Ok(())
    }

    pub async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    /// Round-trip check used by the health endpoint.
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    // =========================================================================
    // Rate Limiting Operations
    // =========================================================================

    /// Count a request against a fixed window.
    /// Returns (current_count, is_allowed).
    pub async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier);
        let mut conn = self.connection.clone();

        let count: u64 = conn.incr(&key, 1u64).await?;
        if count == 1 {
            // First request opens the window
            let _: () = conn.expire(&key, window_seconds as i64).await?;
        }

        Ok((count, count <= max_requests))
    }
}

#[async_trait]
impl RateLimiter for Cache {
    async fn hit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        self.check_rate_limit(identifier, max_requests, window_seconds)
            .await
    }
}

fn session_key(session_id: &str) -> String {
    format!("{}{}", CACHE_PREFIX_SESSION, session_id)
}

fn code_key(user_id: Uuid, certificate_id: Uuid) -> String {
    format!("{}{}:{}", CACHE_PREFIX_REVEAL_CODE, user_id, certificate_id)
}

fn attempts_key(user_id: Uuid, certificate_id: Uuid) -> String {
    format!("{}{}:{}", CACHE_PREFIX_REVEAL_ATTEMPTS, user_id, certificate_id)
}

/// INCR and arm the expiry in one server-side step.
const COUNT_ATTEMPT_SCRIPT: &str = r#"
local n = redis.call('INCR', KEYS[1])
if n == 1 then
    redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return n
"#;

#[async_trait]
impl TokenStore for Cache {
    async fn put_session(&self, session: Session, ttl_seconds: u64) -> AppResult<()> {
        self.set_with_ttl(&session_key(&session.id), &session, ttl_seconds)
            .await
    }

    async fn get_session(&self, session_id: &str) -> AppResult<Option<Session>> {
        self.get(&session_key(session_id)).await
    }

    async fn remove_session(&self, session_id: &str) -> AppResult<()> {
        self.delete(&session_key(session_id)).await
    }

    async fn put_code(
        &self,
        user_id: Uuid,
        certificate_id: Uuid,
        code: RevealCode,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let json = to_json(&code)?;

        let _: () = redis::pipe()
            .atomic()
            .set_ex(code_key(user_id, certificate_id), json, ttl_seconds)
            .ignore()
            .del(attempts_key(user_id, certificate_id))
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(())
    }

    async fn register_attempt(
        &self,
        user_id: Uuid,
        certificate_id: Uuid,
        ttl_seconds: u64,
    ) -> AppResult<u32> {
        let mut conn = self.connection.clone();
        let script = Script::new(COUNT_ATTEMPT_SCRIPT);

        let count: u32 = script
            .key(attempts_key(user_id, certificate_id))
            .arg(ttl_seconds)
            .invoke_async(&mut conn)
            .await?;

        Ok(count)
    }

    async fn get_code(&self, user_id: Uuid, certificate_id: Uuid) -> AppResult<Option<RevealCode>> {
        self.get(&code_key(user_id, certificate_id)).await
    }

    async fn remove_code(&self, user_id: Uuid, certificate_id: Uuid) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let keys = [
            code_key(user_id, certificate_id),
            attempts_key(user_id, certificate_id),
        ];
        let _: () = conn.del(&keys[..]).await?;
        Ok(())
    }
}

fn to_json<T: Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string(value)
        .map_err(|e| AppError::internal(format!("Cache serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(session_key("abc"), "session:abc");

        let user = Uuid::nil();
        let cert = Uuid::nil();
        assert_eq!(
            code_key(user, cert),
            format!("reveal_code:{}:{}", Uuid::nil(), Uuid::nil())
        );
    }

    #[test]
    fn test_codes_are_scoped_per_certificate() {
        let user = Uuid::new_v4();
        assert_ne!(code_key(user, Uuid::new_v4()), code_key(user, Uuid::new_v4()));
    }

    #[test]
    fn test_attempt_counter_is_separate_from_code() {
        let user = Uuid::new_v4();
        let cert = Uuid::new_v4();
        assert_ne!(attempts_key(user, cert), code_key(user, cert));
        assert!(attempts_key(user, cert).starts_with("reveal_attempts:"));
    }
}
