//! Expiration digests.
//!
//! Collects certificates that expired or expire within a window, groups
//! them by company and queues one email per recipient. A recipient is any
//! user with view rights on at least one affected company, plus every
//! admin (who sees everything).

use async_trait::async_trait;
use chrono::Duration;
use futures::future::try_join_all;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{today, Certificate, CertificateStatus, Company, User, UserRole};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;
use crate::jobs::{EmailJob, EmailQueue};
use crate::utils::format::format_date;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Outcome of one digest run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DigestSummary {
    pub certificates: usize,
    pub companies: usize,
    pub emails_queued: usize,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Queue digests for certificates expiring within `days` or already expired
    async fn send_expiry_digest(&self, days: i64) -> AppResult<DigestSummary>;
}

pub struct ExpiryNotifier<U: UnitOfWork> {
    uow: Arc<U>,
    emails: Arc<dyn EmailQueue>,
}

impl<U: UnitOfWork> ExpiryNotifier<U> {
    pub fn new(uow: Arc<U>, emails: Arc<dyn EmailQueue>) -> Self {
        Self { uow, emails }
    }

    /// Users allowed to see `company_id`.
    async fn viewers(&self, company_id: Uuid) -> AppResult<Vec<Uuid>> {
        Ok(self
            .uow
            .permissions()
            .list_for_company(company_id)
            .await?
            .into_iter()
            .filter(|p| p.can_view)
            .map(|p| p.user_id)
            .collect())
    }
}

/// Digest body for one user.
fn render_digest(
    user: &User,
    sections: &[(&Company, &Vec<Certificate>)],
    today: chrono::NaiveDate,
) -> String {
    let mut body = format!(
        "Olá {},\n\nOs seguintes certificados precisam de atenção:\n",
        user.name
    );
    for (company, certificates) in sections {
        let _ = write!(body, "\n{} ({})\n", company.name, company.identifier);
        for certificate in certificates.iter() {
            let status = certificate.status_on(today);
            let days = certificate.days_remaining_on(today);
            let when = if status == CertificateStatus::Expired {
                format!("vencido há {} dia(s)", -days)
            } else {
                format!("vence em {} dia(s)", days)
            };
            let _ = writeln!(
                body,
                "  - {} [{}] {} ({})",
                certificate.name,
                certificate.cert_type.as_str(),
                format_date(certificate.expiration_date),
                when
            );
        }
    }
    body.push_str("\nCertificadoGuardian\n");
    body
}

#[async_trait]
impl<U: UnitOfWork> NotificationService for ExpiryNotifier<U> {
    async fn send_expiry_digest(&self, days: i64) -> AppResult<DigestSummary> {
        let today = today();
        let until = today + Duration::days(days.max(0));
        let certificates = self.uow.certificates().list_expiring_until(until).await?;
        if certificates.is_empty() {
            tracing::info!(days, "No certificates need attention");
            return Ok(DigestSummary::default());
        }
        let total = certificates.len();

        let mut by_company: BTreeMap<Uuid, Vec<Certificate>> = BTreeMap::new();
        for certificate in certificates {
            by_company
                .entry(certificate.company_id)
                .or_default()
                .push(certificate);
        }

        let mut companies: HashMap<Uuid, Company> = HashMap::new();
        for company in self
            .uow
            .companies()
            .list(Some(by_company.keys().copied().collect()))
            .await?
        {
            companies.insert(company.id, company);
        }

        let admins: Vec<Uuid> = self
            .uow
            .users()
            .list_by_role(UserRole::Admin)
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();

        // recipient -> companies in the digest
        let mut recipients: BTreeMap<Uuid, Vec<Uuid>> = BTreeMap::new();
        let company_ids: Vec<Uuid> = by_company.keys().copied().collect();
        let viewers = try_join_all(company_ids.iter().map(|id| self.viewers(*id))).await?;
        for (company_id, mut users) in company_ids.into_iter().zip(viewers) {
            users.extend(admins.iter().copied());
            users.sort();
            users.dedup();
            for user_id in users {
                recipients.entry(user_id).or_default().push(company_id);
            }
        }

        let mut queued = 0;
        for (user_id, company_ids) in recipients {
            let Some(user) = self.uow.users().find_by_id(user_id).await? else {
                continue;
            };
            let sections: Vec<(&Company, &Vec<Certificate>)> = company_ids
                .iter()
                .filter_map(|id| Some((companies.get(id)?, by_company.get(id)?)))
                .collect();
            if sections.is_empty() {
                continue;
            }

            let job = EmailJob::new(
                user.email.clone(),
                "Certificados próximos do vencimento - CertificadoGuardian",
                render_digest(&user, &sections, today),
            );
            match self.emails.enqueue(job).await {
                Ok(()) => queued += 1,
                Err(e) => tracing::warn!(error = %e, user_id = %user_id, "Failed to queue digest"),
            }
        }

        let summary = DigestSummary {
            certificates: total,
            companies: by_company.len(),
            emails_queued: queued,
        };
        tracing::info!(
            certificates = summary.certificates,
            companies = summary.companies,
            emails = summary.emails_queued,
            "Expiry digest queued"
        );
        Ok(summary)
    }
}
