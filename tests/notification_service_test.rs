//! Expiration digests queued by `jobs notify`.

mod common;

use std::sync::Arc;

use chrono::Duration;
use mockall::predicate::eq;
use uuid::Uuid;

use certificado_guardian::domain::{today, UserRole};
use certificado_guardian::jobs::MockEmailQueue;
use certificado_guardian::services::{ExpiryNotifier, NotificationService};

use common::{certificate, company, permission, user, MockRepos};

#[tokio::test]
async fn test_digest_reaches_viewers_and_admins_once() {
    let company_id = Uuid::new_v4();
    let viewer = user(UserRole::User);
    let blind = user(UserRole::User);
    let admin = user(UserRole::Admin);
    let (viewer_id, blind_id, admin_id) = (viewer.id, blind.id, admin.id);
    let today = today();

    let mut repos = MockRepos::default();
    repos
        .certificates
        .expect_list_expiring_until()
        .with(eq(today + Duration::days(30)))
        .returning(move |_| {
            Ok(vec![
                certificate(Uuid::new_v4(), company_id, today - Duration::days(2)),
                certificate(Uuid::new_v4(), company_id, today + Duration::days(5)),
            ])
        });
    repos
        .companies
        .expect_list()
        .returning(move |_| Ok(vec![company(company_id)]));
    let admin_clone = admin.clone();
    repos
        .users
        .expect_list_by_role()
        .with(eq(UserRole::Admin))
        .returning(move |_| Ok(vec![admin_clone.clone()]));
    repos
        .permissions
        .expect_list_for_company()
        .returning(move |company_id| {
            Ok(vec![
                permission(viewer_id, company_id, true, false, false, false),
                permission(blind_id, company_id, false, true, false, false),
                // Admins may also hold explicit rows
                permission(admin_id, company_id, true, true, true, true),
            ])
        });
    repos.users.expect_find_by_id().returning(move |id| {
        Ok([viewer.clone(), admin.clone()]
            .into_iter()
            .find(|u| u.id == id))
    });

    let mut emails = MockEmailQueue::new();
    emails
        .expect_enqueue()
        .withf(|job| job.body.contains("Padaria Pão Quente Ltda"))
        .times(2)
        .returning(|_| Ok(()));

    let summary = ExpiryNotifier::new(repos.into_uow(), Arc::new(emails))
        .send_expiry_digest(30)
        .await
        .unwrap();

    assert_eq!(summary.certificates, 2);
    assert_eq!(summary.companies, 1);
    assert_eq!(summary.emails_queued, 2);
}

#[tokio::test]
async fn test_digest_with_nothing_expiring() {
    let mut repos = MockRepos::default();
    repos
        .certificates
        .expect_list_expiring_until()
        .returning(|_| Ok(vec![]));

    let mut emails = MockEmailQueue::new();
    emails.expect_enqueue().never();

    let summary = ExpiryNotifier::new(repos.into_uow(), Arc::new(emails))
        .send_expiry_digest(30)
        .await
        .unwrap();

    assert_eq!(summary.emails_queued, 0);
}
