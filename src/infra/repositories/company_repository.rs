//! Company repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select, Set,
};
use uuid::Uuid;

use super::entities::company::{self, ActiveModel, Entity as CompanyEntity};
use crate::domain::{Company, CompanyChanges, NewCompany};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Company repository trait.
///
/// `visible` restricts results to the given company IDs; `None` means all.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Company>>;

    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<Company>>;

    async fn list(&self, visible: Option<Vec<Uuid>>) -> AppResult<Vec<Company>>;

    async fn count(&self, visible: Option<Vec<Uuid>>) -> AppResult<u64>;

    async fn create(&self, company: NewCompany) -> AppResult<Company>;

    async fn update(&self, id: Uuid, changes: CompanyChanges) -> AppResult<Company>;
}

pub struct CompanyStore {
    db: DatabaseConnection,
}

impl CompanyStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn visible_query(visible: Option<Vec<Uuid>>) -> Select<CompanyEntity> {
        let query = CompanyEntity::find();
        match visible {
            Some(ids) => query.filter(company::Column::Id.is_in(ids)),
            None => query,
        }
    }
}

#[async_trait]
impl CompanyRepository for CompanyStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Company>> {
        let result = CompanyEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Company::from))
    }

    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<Company>> {
        let result = CompanyEntity::find()
            .filter(company::Column::Identifier.eq(identifier))
            .one(&self.db)
            .await?;
        Ok(result.map(Company::from))
    }

    async fn list(&self, visible: Option<Vec<Uuid>>) -> AppResult<Vec<Company>> {
        let models = Self::visible_query(visible)
            .order_by_asc(company::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Company::from).collect())
    }

    async fn count(&self, visible: Option<Vec<Uuid>>) -> AppResult<u64> {
        Ok(Self::visible_query(visible).count(&self.db).await?)
    }

    async fn create(&self, new_company: NewCompany) -> AppResult<Company> {
        let now = chrono::Utc::now();
        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_company.name),
            identifier: Set(new_company.identifier),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        Ok(Company::from(model))
    }

    async fn update(&self, id: Uuid, changes: CompanyChanges) -> AppResult<Company> {
        let company = CompanyEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = company.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(identifier) = changes.identifier {
            active.identifier = Set(identifier);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Company::from(model))
    }
}
