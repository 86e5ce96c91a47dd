//! Dashboard statistics.

use async_trait::async_trait;
use std::sync::Arc;

use super::access::visible_companies;
use super::container::parallel;
use crate::domain::{today, Actor, DashboardStats};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DashboardService: Send + Sync {
    /// Aggregates over the companies the actor can see
    async fn stats(&self, actor: &Actor) -> AppResult<DashboardStats>;
}

pub struct DashboardReader<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> DashboardReader<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> DashboardService for DashboardReader<U> {
    async fn stats(&self, actor: &Actor) -> AppResult<DashboardStats> {
        let visible = visible_companies(self.uow.as_ref(), actor).await?;

        let companies = self.uow.companies();
        let certificates = self.uow.certificates();
        let (total_companies, certificates) = parallel::join2(
            companies.count(visible.clone()),
            certificates.list_all(visible),
        )
        .await?;

        Ok(DashboardStats::compute(total_companies, certificates, today()))
    }
}
