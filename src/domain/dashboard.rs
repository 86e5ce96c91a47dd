//! Dashboard aggregates over visible certificates.

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::certificate::{Certificate, CertificateResponse, CertificateType};
use super::status::CertificateStatus;
use crate::config::DASHBOARD_UPCOMING_LIMIT;

/// Certificate counts per derived status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct StatusCounts {
    pub valid: u64,
    pub expiring: u64,
    pub critical: u64,
    pub expired: u64,
}

/// Certificate counts per type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct TypeCounts {
    pub a1: u64,
    pub a3: u64,
}

/// Dashboard statistics
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_companies: u64,
    pub total_certificates: u64,
    pub by_status: StatusCounts,
    pub by_type: TypeCounts,
    /// Nearest non-expired expirations, soonest first
    pub upcoming: Vec<CertificateResponse>,
}

impl DashboardStats {
    pub fn compute(total_companies: u64, certificates: Vec<Certificate>, today: NaiveDate) -> Self {
        let mut by_status = StatusCounts::default();
        let mut by_type = TypeCounts::default();

        for certificate in &certificates {
            match certificate.status_on(today) {
                CertificateStatus::Valid => by_status.valid += 1,
                CertificateStatus::Expiring => by_status.expiring += 1,
                CertificateStatus::Critical => by_status.critical += 1,
                CertificateStatus::Expired => by_status.expired += 1,
            }
            match certificate.cert_type {
                CertificateType::A1 => by_type.a1 += 1,
                CertificateType::A3 => by_type.a3 += 1,
            }
        }

        let total_certificates = certificates.len() as u64;

        let mut upcoming: Vec<Certificate> = certificates
            .into_iter()
            .filter(|c| c.expiration_date >= today)
            .collect();
        upcoming.sort_by_key(|c| (c.expiration_date, c.name.clone()));
        upcoming.truncate(DASHBOARD_UPCOMING_LIMIT);

        Self {
            total_companies,
            total_certificates,
            by_status,
            by_type,
            upcoming: upcoming
                .into_iter()
                .map(|c| CertificateResponse::from_certificate(c, today))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn cert(name: &str, cert_type: CertificateType, expiration: NaiveDate) -> Certificate {
        Certificate {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: name.to_string(),
            entity: "AC Valid".to_string(),
            identifier: name.to_string(),
            cert_type,
            issued_date: expiration - Duration::days(365),
            expiration_date: expiration,
            encrypted_password: None,
            file_path: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_counts_and_upcoming() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let day = |n: i64| today + Duration::days(n);
        let certificates = vec![
            cert("old", CertificateType::A1, day(-5)),
            cert("today", CertificateType::A3, day(0)),
            cert("soon", CertificateType::A1, day(10)),
            cert("later", CertificateType::A1, day(200)),
        ];

        let stats = DashboardStats::compute(2, certificates, today);

        assert_eq!(stats.total_companies, 2);
        assert_eq!(stats.total_certificates, 4);
        assert_eq!(
            stats.by_status,
            StatusCounts {
                valid: 1,
                expiring: 1,
                critical: 1,
                expired: 1
            }
        );
        assert_eq!(stats.by_type, TypeCounts { a1: 3, a3: 1 });

        let names: Vec<_> = stats.upcoming.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["today", "soon", "later"]);
    }

    #[test]
    fn test_upcoming_is_capped() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let certificates = (0..25)
            .map(|n| cert(&format!("c{n:02}"), CertificateType::A1, today + Duration::days(n)))
            .collect();

        let stats = DashboardStats::compute(1, certificates, today);
        assert_eq!(stats.upcoming.len(), DASHBOARD_UPCOMING_LIMIT);
        assert_eq!(stats.upcoming[0].name, "c00");
    }

    #[test]
    fn test_empty() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let stats = DashboardStats::compute(0, vec![], today);
        assert_eq!(stats.total_certificates, 0);
        assert!(stats.upcoming.is_empty());
    }
}
