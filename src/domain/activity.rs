//! Activity log (audit trail) types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::Actor;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Create,
    Update,
    Delete,
    Login,
    Logout,
    ViewPassword,
    Upload,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Create => "create",
            ActivityAction::Update => "update",
            ActivityAction::Delete => "delete",
            ActivityAction::Login => "login",
            ActivityAction::Logout => "logout",
            ActivityAction::ViewPassword => "view_password",
            ActivityAction::Upload => "upload",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "create" => Some(ActivityAction::Create),
            "update" => Some(ActivityAction::Update),
            "delete" => Some(ActivityAction::Delete),
            "login" => Some(ActivityAction::Login),
            "logout" => Some(ActivityAction::Logout),
            "view_password" => Some(ActivityAction::ViewPassword),
            "upload" => Some(ActivityAction::Upload),
            _ => None,
        }
    }
}

/// Which kind of record it happened to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityEntity {
    User,
    Company,
    Certificate,
    CertificateSystem,
    Permission,
}

impl ActivityEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityEntity::User => "user",
            ActivityEntity::Company => "company",
            ActivityEntity::Certificate => "certificate",
            ActivityEntity::CertificateSystem => "certificate_system",
            ActivityEntity::Permission => "permission",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(ActivityEntity::User),
            "company" => Some(ActivityEntity::Company),
            "certificate" => Some(ActivityEntity::Certificate),
            "certificate_system" => Some(ActivityEntity::CertificateSystem),
            "permission" => Some(ActivityEntity::Permission),
            _ => None,
        }
    }
}

/// Stored audit entry
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActivityLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: ActivityAction,
    pub entity: ActivityEntity,
    pub entity_id: Option<Uuid>,
    #[schema(value_type = Object)]
    pub details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
    pub ip_address: Option<String>,
}

/// Audit entry to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub user_id: Option<Uuid>,
    pub action: ActivityAction,
    pub entity: ActivityEntity,
    pub entity_id: Option<Uuid>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
}

impl NewActivity {
    /// Entry attributed to `actor`.
    pub fn by(actor: &Actor, action: ActivityAction, entity: ActivityEntity) -> Self {
        Self {
            user_id: Some(actor.user_id),
            action,
            entity,
            entity_id: None,
            details: None,
            ip_address: actor.ip_address.clone(),
        }
    }

    pub fn entity_id(mut self, id: Uuid) -> Self {
        self.entity_id = Some(id);
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Activity listing filter
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub user_id: Option<Uuid>,
    pub action: Option<ActivityAction>,
    pub entity: Option<ActivityEntity>,
}
