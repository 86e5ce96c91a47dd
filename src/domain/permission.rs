//! Per-company access control flags.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::UserRole;

/// Kind of access requested on a company and its certificates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionKind {
    View,
    Edit,
    Delete,
    ViewPassword,
}

/// Permission flags granted to a user on one company
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserPermission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_view_password: bool,
}

impl UserPermission {
    pub fn allows(&self, kind: PermissionKind) -> bool {
        match kind {
            PermissionKind::View => self.can_view,
            PermissionKind::Edit => self.can_edit,
            PermissionKind::Delete => self.can_delete,
            PermissionKind::ViewPassword => self.can_view_password,
        }
    }
}

/// Flags to store for a (user, company) pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PermissionGrant {
    #[serde(default)]
    pub can_view: bool,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub can_delete: bool,
    #[serde(default)]
    pub can_view_password: bool,
}

/// Flag lookup: admins pass, everyone else needs the flag on the row.
pub fn is_permitted(
    role: UserRole,
    permission: Option<&UserPermission>,
    kind: PermissionKind,
) -> bool {
    role.is_admin() || permission.is_some_and(|p| p.allows(kind))
}
