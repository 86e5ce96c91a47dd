//! Certificate system repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::certificate_system::{self, ActiveModel, Entity as SystemEntity};
use crate::domain::{CertificateSystem, CertificateSystemChanges, NewCertificateSystem};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SystemRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<CertificateSystem>>;

    async fn list_for_certificate(&self, certificate_id: Uuid) -> AppResult<Vec<CertificateSystem>>;

    async fn create(&self, system: NewCertificateSystem) -> AppResult<CertificateSystem>;

    async fn update(
        &self,
        id: Uuid,
        changes: CertificateSystemChanges,
    ) -> AppResult<CertificateSystem>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

pub struct SystemStore {
    db: DatabaseConnection,
}

impl SystemStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SystemRepository for SystemStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<CertificateSystem>> {
        let result = SystemEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(CertificateSystem::from))
    }

    async fn list_for_certificate(&self, certificate_id: Uuid) -> AppResult<Vec<CertificateSystem>> {
        let models = SystemEntity::find()
            .filter(certificate_system::Column::CertificateId.eq(certificate_id))
            .order_by_asc(certificate_system::Column::Name)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(CertificateSystem::from).collect())
    }

    async fn create(&self, system: NewCertificateSystem) -> AppResult<CertificateSystem> {
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            certificate_id: Set(system.certificate_id),
            name: Set(system.name),
            url: Set(system.url),
            description: Set(system.description),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&self.db)
        .await?;

        Ok(CertificateSystem::from(model))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: CertificateSystemChanges,
    ) -> AppResult<CertificateSystem> {
        let system = SystemEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = system.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(url) = changes.url {
            active.url = Set(Some(url));
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }

        let model = active.update(&self.db).await?;
        Ok(CertificateSystem::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = SystemEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
