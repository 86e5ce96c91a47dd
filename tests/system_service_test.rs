//! Systems linked to certificates: view and edit gating.

mod common;

use chrono::{Duration, Utc};
use uuid::Uuid;

use certificado_guardian::domain::{
    today, ActivityAction, ActivityEntity, CertificateSystem, CertificateSystemChanges, UserRole,
};
use certificado_guardian::errors::AppError;
use certificado_guardian::services::{SystemManager, SystemService};

use common::{actor, certificate, permission, MockRepos};

fn system(id: Uuid, certificate_id: Uuid) -> CertificateSystem {
    CertificateSystem {
        id,
        certificate_id,
        name: "eSocial".to_string(),
        url: Some("https://login.esocial.gov.br".to_string()),
        description: None,
        created_at: Utc::now(),
    }
}

/// Certificates resolve; the caller holds the given view/edit flags.
fn repos_with_flags(can_view: bool, can_edit: bool) -> MockRepos {
    let company_id = Uuid::new_v4();
    let mut repos = MockRepos::default();
    repos
        .certificates
        .expect_find_by_id()
        .returning(move |id| Ok(Some(certificate(id, company_id, today() + Duration::days(60)))));
    repos
        .permissions
        .expect_find()
        .returning(move |user_id, company_id| {
            Ok(Some(permission(
                user_id, company_id, can_view, can_edit, false, false,
            )))
        });
    repos
}

#[tokio::test]
async fn test_list_requires_view() {
    let mut repos = repos_with_flags(false, false);
    repos.systems.expect_list_for_certificate().never();

    let result = SystemManager::new(repos.into_uow())
        .list(&actor(UserRole::User), Uuid::new_v4())
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Forbidden));
}

#[tokio::test]
async fn test_list_with_view() {
    let mut repos = repos_with_flags(true, false);
    repos
        .systems
        .expect_list_for_certificate()
        .returning(|certificate_id| Ok(vec![system(Uuid::new_v4(), certificate_id)]));

    let systems = SystemManager::new(repos.into_uow())
        .list(&actor(UserRole::User), Uuid::new_v4())
        .await
        .unwrap();

    assert_eq!(systems.len(), 1);
}

#[tokio::test]
async fn test_create_requires_edit() {
    let mut repos = repos_with_flags(true, false);
    repos.systems.expect_create().never();

    let result = SystemManager::new(repos.into_uow())
        .create(
            &actor(UserRole::User),
            Uuid::new_v4(),
            "eSocial".to_string(),
            None,
            None,
        )
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Forbidden));
}

#[tokio::test]
async fn test_create_logs_system_entity() {
    let certificate_id = Uuid::new_v4();
    let mut repos = repos_with_flags(true, true);
    repos
        .systems
        .expect_create()
        .withf(move |new_system| {
            new_system.certificate_id == certificate_id && new_system.name == "NF-e"
        })
        .times(1)
        .returning(|new_system| {
            let mut created = system(Uuid::new_v4(), new_system.certificate_id);
            created.name = new_system.name;
            Ok(created)
        });
    repos
        .activities
        .expect_insert()
        .withf(|entry| {
            entry.action == ActivityAction::Create
                && entry.entity == ActivityEntity::CertificateSystem
        })
        .times(1)
        .returning(|entry| Ok(common::activity_log(entry)));

    let created = SystemManager::new(repos.into_uow())
        .create(
            &actor(UserRole::User),
            certificate_id,
            "NF-e".to_string(),
            None,
            Some("Emissão de notas".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(created.name, "NF-e");
}

#[tokio::test]
async fn test_update_missing_system() {
    let mut repos = MockRepos::default();
    repos.systems.expect_find_by_id().returning(|_| Ok(None));
    repos.systems.expect_update().never();

    let result = SystemManager::new(repos.into_uow())
        .update(
            &actor(UserRole::Admin),
            Uuid::new_v4(),
            CertificateSystemChanges {
                name: Some("SPED".to_string()),
                url: None,
                description: None,
            },
        )
        .await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn test_delete_requires_edit_on_owning_certificate() {
    let mut repos = repos_with_flags(true, false);
    repos
        .systems
        .expect_find_by_id()
        .returning(|id| Ok(Some(system(id, Uuid::new_v4()))));
    repos.systems.expect_delete().never();

    let result = SystemManager::new(repos.into_uow())
        .delete(&actor(UserRole::User), Uuid::new_v4())
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Forbidden));
}
