//! Systems linked to a certificate.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::access::{ensure_company_permission, record_activity};
use crate::domain::{
    ActivityAction, ActivityEntity, Actor, Certificate, CertificateSystem,
    CertificateSystemChanges, NewActivity, NewCertificateSystem, PermissionKind,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SystemService: Send + Sync {
    async fn list(&self, actor: &Actor, certificate_id: Uuid) -> AppResult<Vec<CertificateSystem>>;

    async fn create(
        &self,
        actor: &Actor,
        certificate_id: Uuid,
        name: String,
        url: Option<String>,
        description: Option<String>,
    ) -> AppResult<CertificateSystem>;

    async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: CertificateSystemChanges,
    ) -> AppResult<CertificateSystem>;

    async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()>;
}

pub struct SystemManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> SystemManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn certificate(
        &self,
        actor: &Actor,
        certificate_id: Uuid,
        kind: PermissionKind,
    ) -> AppResult<Certificate> {
        let certificate = self
            .uow
            .certificates()
            .find_by_id(certificate_id)
            .await?
            .ok_or(AppError::NotFound)?;
        ensure_company_permission(self.uow.as_ref(), actor, certificate.company_id, kind).await?;
        Ok(certificate)
    }

    /// Load a system and require edit rights on its certificate's company.
    async fn editable(&self, actor: &Actor, id: Uuid) -> AppResult<CertificateSystem> {
        let system = self
            .uow
            .systems()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.certificate(actor, system.certificate_id, PermissionKind::Edit)
            .await?;
        Ok(system)
    }
}

#[async_trait]
impl<U: UnitOfWork> SystemService for SystemManager<U> {
    async fn list(&self, actor: &Actor, certificate_id: Uuid) -> AppResult<Vec<CertificateSystem>> {
        self.certificate(actor, certificate_id, PermissionKind::View)
            .await?;
        self.uow.systems().list_for_certificate(certificate_id).await
    }

    async fn create(
        &self,
        actor: &Actor,
        certificate_id: Uuid,
        name: String,
        url: Option<String>,
        description: Option<String>,
    ) -> AppResult<CertificateSystem> {
        self.certificate(actor, certificate_id, PermissionKind::Edit)
            .await?;

        let system = self
            .uow
            .systems()
            .create(NewCertificateSystem {
                certificate_id,
                name,
                url,
                description,
            })
            .await?;

        record_activity(
            self.uow.as_ref(),
            NewActivity::by(actor, ActivityAction::Create, ActivityEntity::CertificateSystem)
                .entity_id(system.id)
                .details(json!({ "name": system.name, "certificate_id": certificate_id })),
        )
        .await;

        Ok(system)
    }

    async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: CertificateSystemChanges,
    ) -> AppResult<CertificateSystem> {
        self.editable(actor, id).await?;
        let system = self.uow.systems().update(id, changes).await?;

        record_activity(
            self.uow.as_ref(),
            NewActivity::by(actor, ActivityAction::Update, ActivityEntity::CertificateSystem)
                .entity_id(id),
        )
        .await;

        Ok(system)
    }

    async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        let system = self.editable(actor, id).await?;
        self.uow.systems().delete(id).await?;

        record_activity(
            self.uow.as_ref(),
            NewActivity::by(actor, ActivityAction::Delete, ActivityEntity::CertificateSystem)
                .entity_id(id)
                .details(json!({ "name": system.name, "certificate_id": system.certificate_id })),
        )
        .await;

        Ok(())
    }
}
