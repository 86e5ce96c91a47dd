//! User service - Account administration and password changes.
//!
//! Role gating for admin-only endpoints happens in the handlers; this
//! service enforces the self-or-admin rules.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::access::record_activity;
use crate::domain::{
    ActivityAction, ActivityEntity, Actor, NewActivity, NewUser, Password, User, UserChanges,
    UserRole,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Data for a new account
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
}

/// User service trait for dependency injection.
///
/// By default, operations exclude soft-deleted users.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    async fn list_users(&self) -> AppResult<Vec<User>>;

    async fn list_deleted_users(&self) -> AppResult<Vec<User>>;

    /// Self or admin
    async fn get_user(&self, actor: &Actor, id: Uuid) -> AppResult<User>;

    async fn create_user(&self, actor: &Actor, input: CreateUser) -> AppResult<User>;

    /// Self or admin; only admins may change roles
    async fn update_user(&self, actor: &Actor, id: Uuid, changes: UserChanges) -> AppResult<User>;

    /// Soft delete; an account cannot delete itself
    async fn delete_user(&self, actor: &Actor, id: Uuid) -> AppResult<()>;

    async fn restore_user(&self, actor: &Actor, id: Uuid) -> AppResult<User>;

    /// Self (with current password) or admin
    async fn change_password(
        &self,
        actor: &Actor,
        id: Uuid,
        current_password: Option<String>,
        new_password: String,
    ) -> AppResult<()>;
}

fn ensure_self_or_admin(actor: &Actor, id: Uuid) -> AppResult<()> {
    if actor.is_admin() || actor.user_id == id {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn ensure_email_free(&self, email: &str, owner: Option<Uuid>) -> AppResult<()> {
        match self.uow.users().find_by_email_with_deleted(email).await? {
            Some(existing) if Some(existing.id) != owner => Err(AppError::conflict("Email")),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.uow.users().list().await
    }

    async fn list_deleted_users(&self) -> AppResult<Vec<User>> {
        self.uow.users().list_deleted().await
    }

    async fn get_user(&self, actor: &Actor, id: Uuid) -> AppResult<User> {
        ensure_self_or_admin(actor, id)?;
        self.uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn create_user(&self, actor: &Actor, input: CreateUser) -> AppResult<User> {
        // Soft-deleted accounts keep their username and email reserved
        if self
            .uow
            .users()
            .find_by_username_with_deleted(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("Username"));
        }
        self.ensure_email_free(&input.email, None).await?;

        let password_hash = Password::new(&input.password)?.into_string();
        let user = self
            .uow
            .users()
            .create(NewUser {
                username: input.username,
                email: input.email,
                password_hash,
                name: input.name,
                role: input.role,
            })
            .await?;

        record_activity(
            self.uow.as_ref(),
            NewActivity::by(actor, ActivityAction::Create, ActivityEntity::User)
                .entity_id(user.id)
                .details(json!({ "username": user.username, "role": user.role })),
        )
        .await;

        Ok(user)
    }

    async fn update_user(&self, actor: &Actor, id: Uuid, changes: UserChanges) -> AppResult<User> {
        ensure_self_or_admin(actor, id)?;
        if changes.role.is_some() && !actor.is_admin() {
            return Err(AppError::Forbidden);
        }
        if let Some(email) = &changes.email {
            self.ensure_email_free(email, Some(id)).await?;
        }

        let user = self.uow.users().update(id, changes).await?;

        record_activity(
            self.uow.as_ref(),
            NewActivity::by(actor, ActivityAction::Update, ActivityEntity::User).entity_id(id),
        )
        .await;

        Ok(user)
    }

    async fn delete_user(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        if actor.user_id == id {
            return Err(AppError::validation("You cannot delete your own account"));
        }

        self.uow.users().delete(id).await?;

        record_activity(
            self.uow.as_ref(),
            NewActivity::by(actor, ActivityAction::Delete, ActivityEntity::User).entity_id(id),
        )
        .await;

        Ok(())
    }

    async fn restore_user(&self, actor: &Actor, id: Uuid) -> AppResult<User> {
        let user = self.uow.users().restore(id).await?;

        record_activity(
            self.uow.as_ref(),
            NewActivity::by(actor, ActivityAction::Update, ActivityEntity::User)
                .entity_id(id)
                .details(json!({ "restored": true })),
        )
        .await;

        Ok(user)
    }

    async fn change_password(
        &self,
        actor: &Actor,
        id: Uuid,
        current_password: Option<String>,
        new_password: String,
    ) -> AppResult<()> {
        ensure_self_or_admin(actor, id)?;

        let user = self
            .uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        // Admins resetting someone else's password skip the current-password check
        if actor.user_id == id {
            let current = current_password
                .ok_or_else(|| AppError::validation("Current password is required"))?;
            if !Password::from_hash(user.password_hash).verify(&current) {
                return Err(AppError::InvalidCredentials);
            }
        }

        let password_hash = Password::new(&new_password)?.into_string();
        self.uow.users().set_password(id, password_hash).await?;

        record_activity(
            self.uow.as_ref(),
            NewActivity::by(actor, ActivityAction::Update, ActivityEntity::User)
                .entity_id(id)
                .details(json!({ "field": "password" })),
        )
        .await;

        tracing::info!(user_id = %id, changed_by = %actor.user_id, "Password changed");
        Ok(())
    }
}
