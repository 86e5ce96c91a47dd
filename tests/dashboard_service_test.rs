//! Dashboard statistics over the companies a user can see.

mod common;

use chrono::Duration;
use mockall::predicate::eq;
use uuid::Uuid;

use certificado_guardian::domain::{today, UserRole};
use certificado_guardian::services::{DashboardReader, DashboardService};

use common::{actor, certificate, MockRepos};

#[tokio::test]
async fn test_dashboard_counts_visible_certificates() {
    let company_id = Uuid::new_v4();
    let today = today();

    let mut repos = MockRepos::default();
    repos
        .permissions
        .expect_viewable_company_ids()
        .returning(move |_| Ok(vec![company_id]));
    repos
        .companies
        .expect_count()
        .with(eq(Some(vec![company_id])))
        .returning(|_| Ok(1));
    repos
        .certificates
        .expect_list_all()
        .with(eq(Some(vec![company_id])))
        .returning(move |_| {
            Ok(vec![
                certificate(Uuid::new_v4(), company_id, today - Duration::days(1)),
                certificate(Uuid::new_v4(), company_id, today + Duration::days(2)),
                certificate(Uuid::new_v4(), company_id, today + Duration::days(20)),
                certificate(Uuid::new_v4(), company_id, today + Duration::days(200)),
            ])
        });

    let stats = DashboardReader::new(repos.into_uow())
        .stats(&actor(UserRole::User))
        .await
        .unwrap();

    assert_eq!(stats.total_companies, 1);
    assert_eq!(stats.total_certificates, 4);
    assert_eq!(stats.by_status.expired, 1);
    assert_eq!(stats.by_status.critical, 1);
    assert_eq!(stats.by_status.expiring, 1);
    assert_eq!(stats.by_status.valid, 1);
    assert_eq!(stats.by_type.a1, 4);
    // Expired certificates are not "upcoming"
    assert_eq!(stats.upcoming.len(), 3);
}

#[tokio::test]
async fn test_admin_dashboard_spans_all_companies() {
    let mut repos = MockRepos::default();
    repos.permissions.expect_viewable_company_ids().never();
    repos
        .companies
        .expect_count()
        .with(eq(None))
        .returning(|_| Ok(3));
    repos
        .certificates
        .expect_list_all()
        .with(eq(None))
        .returning(|_| Ok(vec![]));

    let stats = DashboardReader::new(repos.into_uow())
        .stats(&actor(UserRole::Admin))
        .await
        .unwrap();

    assert_eq!(stats.total_companies, 3);
    assert_eq!(stats.total_certificates, 0);
    assert!(stats.upcoming.is_empty());
}
