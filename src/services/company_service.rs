//! Company service.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::access::{ensure_company_permission, record_activity, visible_companies};
use crate::domain::{
    normalize_tax_id, ActivityAction, ActivityEntity, Actor, Company, CompanyChanges,
    NewActivity, NewCompany, PermissionGrant, PermissionKind,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{FileStore, UnitOfWork};
use crate::with_transaction;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CompanyService: Send + Sync {
    /// Admins see every company, others those they may view
    async fn list(&self, actor: &Actor) -> AppResult<Vec<Company>>;

    async fn get(&self, actor: &Actor, id: Uuid) -> AppResult<Company>;

    /// Admins and managers only
    async fn create(&self, actor: &Actor, name: String, identifier: String) -> AppResult<Company>;

    async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        name: Option<String>,
        identifier: Option<String>,
    ) -> AppResult<Company>;

    /// Removes the company with its certificates, systems and permissions
    async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()>;
}

pub struct CompanyManager<U: UnitOfWork> {
    uow: Arc<U>,
    files: Arc<dyn FileStore>,
}

impl<U: UnitOfWork> CompanyManager<U> {
    pub fn new(uow: Arc<U>, files: Arc<dyn FileStore>) -> Self {
        Self { uow, files }
    }

    async fn find(&self, id: Uuid) -> AppResult<Company> {
        self.uow
            .companies()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Normalize the tax ID and make sure no other company holds it.
    async fn unique_identifier(&self, raw: &str, owner: Option<Uuid>) -> AppResult<String> {
        let (identifier, _) = normalize_tax_id(raw)?;
        match self.uow.companies().find_by_identifier(&identifier).await? {
            Some(existing) if Some(existing.id) != owner => Err(AppError::conflict("Company")),
            _ => Ok(identifier),
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> CompanyService for CompanyManager<U> {
    async fn list(&self, actor: &Actor) -> AppResult<Vec<Company>> {
        let visible = visible_companies(self.uow.as_ref(), actor).await?;
        self.uow.companies().list(visible).await
    }

    async fn get(&self, actor: &Actor, id: Uuid) -> AppResult<Company> {
        let company = self.find(id).await?;
        ensure_company_permission(self.uow.as_ref(), actor, id, PermissionKind::View).await?;
        Ok(company)
    }

    async fn create(&self, actor: &Actor, name: String, identifier: String) -> AppResult<Company> {
        if !actor.role.can_register_companies() {
            return Err(AppError::Forbidden);
        }

        let identifier = self.unique_identifier(&identifier, None).await?;
        let company = self
            .uow
            .companies()
            .create(NewCompany { name, identifier })
            .await?;

        // Managers keep full control over what they register
        if !actor.is_admin() {
            let grant = PermissionGrant {
                can_view: true,
                can_edit: true,
                can_delete: true,
                can_view_password: true,
            };
            self.uow
                .permissions()
                .upsert(actor.user_id, company.id, grant)
                .await?;
        }

        record_activity(
            self.uow.as_ref(),
            NewActivity::by(actor, ActivityAction::Create, ActivityEntity::Company)
                .entity_id(company.id)
                .details(json!({ "name": company.name, "identifier": company.identifier })),
        )
        .await;

        Ok(company)
    }

    async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        name: Option<String>,
        identifier: Option<String>,
    ) -> AppResult<Company> {
        self.find(id).await?;
        ensure_company_permission(self.uow.as_ref(), actor, id, PermissionKind::Edit).await?;

        let identifier = match identifier {
            Some(raw) => Some(self.unique_identifier(&raw, Some(id)).await?),
            None => None,
        };

        let company = self
            .uow
            .companies()
            .update(id, CompanyChanges { name, identifier })
            .await?;

        record_activity(
            self.uow.as_ref(),
            NewActivity::by(actor, ActivityAction::Update, ActivityEntity::Company).entity_id(id),
        )
        .await;

        Ok(company)
    }

    async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        let company = self.find(id).await?;
        ensure_company_permission(self.uow.as_ref(), actor, id, PermissionKind::Delete).await?;

        let stored_files = self.uow.certificates().file_paths_for_company(id).await?;
        let entry = NewActivity::by(actor, ActivityAction::Delete, ActivityEntity::Company)
            .entity_id(id)
            .details(json!({ "name": company.name, "identifier": company.identifier }));

        with_transaction!(self.uow, |ctx| ctx.companies().delete(id).await)?;
        record_activity(self.uow.as_ref(), entry).await;

        // Rows are gone; stray files are only worth a warning
        for key in stored_files {
            if let Err(e) = self.files.remove(&key).await {
                tracing::warn!(error = %e, file = %key, "Failed to remove certificate file");
            }
        }

        tracing::info!(company_id = %id, "Company deleted");
        Ok(())
    }
}
