//! Short-lived server-side state kept in Redis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Login session referenced by the session token's `sid` claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub ip_address: Option<String>,
}

impl Session {
    pub fn new(user_id: Uuid, ip_address: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            user_id,
            created_at: Utc::now(),
            ip_address,
        }
    }
}

/// Pending confirmation code for revealing one certificate password
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealCode {
    pub code: String,
    pub issued_at: DateTime<Utc>,
}

impl RevealCode {
    pub fn new(code: String) -> Self {
        Self {
            code,
            issued_at: Utc::now(),
        }
    }

    /// Constant-time comparison of the submitted code.
    pub fn matches(&self, submitted: &str) -> bool {
        let expected = self.code.as_bytes();
        let given = submitted.trim().as_bytes();
        if expected.len() != given.len() {
            return false;
        }
        expected
            .iter()
            .zip(given)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_matches() {
        let code = RevealCode::new("042917".to_string());
        assert!(code.matches("042917"));
        assert!(code.matches(" 042917 "));
        assert!(!code.matches("042918"));
        assert!(!code.matches("42917"));
    }

    #[test]
    fn test_session_ids_are_unique() {
        let user = Uuid::new_v4();
        assert_ne!(Session::new(user, None).id, Session::new(user, None).id);
    }
}
