//! Activity log queries.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{ActivityFilter, ActivityLog};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ActivityService: Send + Sync {
    /// Newest entries first
    async fn list(
        &self,
        filter: ActivityFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<ActivityLog>>;
}

pub struct ActivityReader<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ActivityReader<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> ActivityService for ActivityReader<U> {
    async fn list(
        &self,
        filter: ActivityFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<ActivityLog>> {
        let (entries, total) = self.uow.activities().list(filter, page.clone()).await?;
        Ok(Paginated::new(entries, page.page, page.limit(), total))
    }
}
