//! Certificate repository.
//!
//! Status filters are translated to expiration-date ranges so they can be
//! evaluated by the database alongside pagination.

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

use super::entities::certificate::{self, ActiveModel, Entity as CertificateEntity};
use crate::domain::{Certificate, CertificateChanges, CertificateFilter, NewCertificate};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CertificateRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Certificate>>;

    /// Filtered page ordered by expiration date, plus the total match count
    async fn list(
        &self,
        filter: CertificateFilter,
        today: NaiveDate,
        page: PaginationParams,
    ) -> AppResult<(Vec<Certificate>, u64)>;

    /// Every certificate in the visible companies (`None` = all)
    async fn list_all(&self, visible: Option<Vec<Uuid>>) -> AppResult<Vec<Certificate>>;

    /// Certificates expiring on or before `date`, soonest first
    async fn list_expiring_until(&self, date: NaiveDate) -> AppResult<Vec<Certificate>>;

    /// Stored file paths of a company's certificates
    async fn file_paths_for_company(&self, company_id: Uuid) -> AppResult<Vec<String>>;

    async fn create(&self, certificate: NewCertificate) -> AppResult<Certificate>;

    async fn update(&self, id: Uuid, changes: CertificateChanges) -> AppResult<Certificate>;

    async fn set_file_path(&self, id: Uuid, file_path: Option<String>) -> AppResult<Certificate>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

pub struct CertificateStore {
    db: DatabaseConnection,
}

impl CertificateStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> AppResult<certificate::Model> {
        CertificateEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}

/// Build the filtered select shared by `list` and its count.
fn filtered_query(filter: CertificateFilter, today: NaiveDate) -> Select<CertificateEntity> {
    let mut query = CertificateEntity::find();

    if let Some(ids) = filter.visible_companies {
        query = query.filter(certificate::Column::CompanyId.is_in(ids));
    }
    if let Some(company_id) = filter.company_id {
        query = query.filter(certificate::Column::CompanyId.eq(company_id));
    }
    if let Some(cert_type) = filter.cert_type {
        query = query.filter(certificate::Column::CertType.eq(cert_type.as_str()));
    }
    if let Some(status) = filter.status {
        let (from, until) = status.expiration_range(today);
        if let Some(from) = from {
            query = query.filter(certificate::Column::ExpirationDate.gte(from));
        }
        if let Some(until) = until {
            query = query.filter(certificate::Column::ExpirationDate.lte(until));
        }
    }
    if let Some(search) = filter.search.map(|s| s.trim().to_lowercase()) {
        if !search.is_empty() {
            let pattern = format!("%{}%", search);
            let lower = |column: certificate::Column| {
                Expr::expr(Func::lower(Expr::col(column))).like(pattern.clone())
            };
            query = query.filter(
                Condition::any()
                    .add(lower(certificate::Column::Name))
                    .add(lower(certificate::Column::Entity))
                    .add(lower(certificate::Column::Identifier)),
            );
        }
    }

    query
}

#[async_trait]
impl CertificateRepository for CertificateStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Certificate>> {
        let result = CertificateEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Certificate::from))
    }

    async fn list(
        &self,
        filter: CertificateFilter,
        today: NaiveDate,
        page: PaginationParams,
    ) -> AppResult<(Vec<Certificate>, u64)> {
        let query = filtered_query(filter, today);
        let total = query.clone().count(&self.db).await?;

        let models = query
            .order_by_asc(certificate::Column::ExpirationDate)
            .order_by_asc(certificate::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((models.into_iter().map(Certificate::from).collect(), total))
    }

    async fn list_all(&self, visible: Option<Vec<Uuid>>) -> AppResult<Vec<Certificate>> {
        let filter = CertificateFilter {
            visible_companies: visible,
            ..Default::default()
        };
        let models = filtered_query(filter, crate::domain::today())
            .order_by_asc(certificate::Column::ExpirationDate)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Certificate::from).collect())
    }

    async fn list_expiring_until(&self, date: NaiveDate) -> AppResult<Vec<Certificate>> {
        let models = CertificateEntity::find()
            .filter(certificate::Column::ExpirationDate.lte(date))
            .order_by_asc(certificate::Column::ExpirationDate)
            .order_by_asc(certificate::Column::Name)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Certificate::from).collect())
    }

    async fn file_paths_for_company(&self, company_id: Uuid) -> AppResult<Vec<String>> {
        let paths: Vec<Option<String>> = CertificateEntity::find()
            .select_only()
            .column(certificate::Column::FilePath)
            .filter(certificate::Column::CompanyId.eq(company_id))
            .filter(certificate::Column::FilePath.is_not_null())
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(paths.into_iter().flatten().collect())
    }

    async fn create(&self, new_certificate: NewCertificate) -> AppResult<Certificate> {
        let now = chrono::Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(new_certificate.company_id),
            name: Set(new_certificate.name),
            entity: Set(new_certificate.entity),
            identifier: Set(new_certificate.identifier),
            cert_type: Set(new_certificate.cert_type.as_str().to_string()),
            issued_date: Set(new_certificate.issued_date),
            expiration_date: Set(new_certificate.expiration_date),
            password: Set(new_certificate.encrypted_password),
            file_path: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        Ok(Certificate::from(model))
    }

    async fn update(&self, id: Uuid, changes: CertificateChanges) -> AppResult<Certificate> {
        let mut active: ActiveModel = self.find_model(id).await?.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(entity) = changes.entity {
            active.entity = Set(entity);
        }
        if let Some(identifier) = changes.identifier {
            active.identifier = Set(identifier);
        }
        if let Some(cert_type) = changes.cert_type {
            active.cert_type = Set(cert_type.as_str().to_string());
        }
        if let Some(issued_date) = changes.issued_date {
            active.issued_date = Set(issued_date);
        }
        if let Some(expiration_date) = changes.expiration_date {
            active.expiration_date = Set(expiration_date);
        }
        if let Some(password) = changes.encrypted_password {
            active.password = Set(password);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Certificate::from(model))
    }

    async fn set_file_path(&self, id: Uuid, file_path: Option<String>) -> AppResult<Certificate> {
        let mut active: ActiveModel = self.find_model(id).await?.into();
        active.file_path = Set(file_path);
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Certificate::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = CertificateEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
