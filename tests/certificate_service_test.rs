//! Certificate CRUD, listing visibility, password sealing and file handling.

mod common;

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use certificado_guardian::config::MAX_UPLOAD_BYTES;
use certificado_guardian::domain::{
    today, ActivityAction, CertificateFilter, CertificateType, UserRole,
};
use certificado_guardian::errors::AppError;
use certificado_guardian::infra::{MockFileStore, SecretCipher};
use certificado_guardian::services::{
    CertificateInput, CertificateManager, CertificateService, CertificateUpdate,
};
use certificado_guardian::types::PaginationParams;

use common::{actor, certificate, company, permission, MockRepos, TestUnitOfWork};

const KEY: [u8; 32] = [9u8; 32];

fn manager(repos: MockRepos, files: MockFileStore) -> CertificateManager<TestUnitOfWork> {
    CertificateManager::new(repos.into_uow(), Arc::new(files), SecretCipher::new(&KEY))
}

fn input(company_id: Uuid, issued: NaiveDate, expiration: NaiveDate) -> CertificateInput {
    CertificateInput {
        company_id,
        name: "e-CNPJ Matriz".to_string(),
        entity: "AC SERASA RFB v5".to_string(),
        identifier: "11222333000181".to_string(),
        cert_type: CertificateType::A1,
        issued_date: issued,
        expiration_date: expiration,
        password: Some("senha-do-pfx".to_string()),
    }
}

/// Every certificate id resolves, optionally with a stored file.
fn repos_with_certificate(file_path: Option<&'static str>) -> MockRepos {
    let company_id = Uuid::new_v4();
    let mut repos = MockRepos::default();
    repos.certificates.expect_find_by_id().returning(move |id| {
        let mut found = certificate(id, company_id, today() + Duration::days(90));
        found.file_path = file_path.map(str::to_string);
        Ok(Some(found))
    });
    repos
}

// =============================================================================
// Create / update
// =============================================================================

#[tokio::test]
async fn test_create_requires_edit_permission() {
    let mut repos = MockRepos::default();
    repos
        .companies
        .expect_find_by_id()
        .returning(|id| Ok(Some(company(id))));
    repos
        .permissions
        .expect_find()
        .returning(|user_id, company_id| {
            Ok(Some(permission(user_id, company_id, true, false, false, false)))
        });
    repos.certificates.expect_create().never();

    let result = manager(repos, MockFileStore::new())
        .create(
            &actor(UserRole::User),
            input(Uuid::new_v4(), today(), today() + Duration::days(365)),
        )
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Forbidden));
}

#[tokio::test]
async fn test_create_rejects_issued_after_expiration() {
    let mut repos = MockRepos::default();
    repos
        .companies
        .expect_find_by_id()
        .returning(|id| Ok(Some(company(id))));
    repos.certificates.expect_create().never();

    let result = manager(repos, MockFileStore::new())
        .create(
            &actor(UserRole::Admin),
            input(Uuid::new_v4(), today(), today() - Duration::days(1)),
        )
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn test_create_seals_password() {
    let mut repos = MockRepos::default();
    repos
        .companies
        .expect_find_by_id()
        .returning(|id| Ok(Some(company(id))));
    repos
        .certificates
        .expect_create()
        .withf(|new_certificate| {
            new_certificate
                .encrypted_password
                .as_deref()
                .map(|sealed| {
                    sealed != "senha-do-pfx"
                        && SecretCipher::new(&KEY).decrypt(sealed).unwrap() == "senha-do-pfx"
                })
                .unwrap_or(false)
        })
        .times(1)
        .returning(|new_certificate| {
            let mut created = certificate(
                Uuid::new_v4(),
                new_certificate.company_id,
                new_certificate.expiration_date,
            );
            created.encrypted_password = new_certificate.encrypted_password;
            Ok(created)
        });
    repos
        .activities
        .expect_insert()
        .withf(|entry| entry.action == ActivityAction::Create)
        .times(1)
        .returning(|entry| Ok(common::activity_log(entry)));

    let created = manager(repos, MockFileStore::new())
        .create(
            &actor(UserRole::Admin),
            input(Uuid::new_v4(), today(), today() + Duration::days(365)),
        )
        .await
        .unwrap();

    assert!(created.has_password);
    assert_eq!(created.days_remaining, 365);
}

#[tokio::test]
async fn test_update_can_remove_password() {
    let mut repos = repos_with_certificate(None);
    repos
        .certificates
        .expect_update()
        .withf(|_, changes| changes.encrypted_password == Some(None))
        .times(1)
        .returning(|id, _| Ok(certificate(id, Uuid::new_v4(), today() + Duration::days(10))));
    repos
        .activities
        .expect_insert()
        .withf(|entry| {
            entry
                .details
                .as_ref()
                .and_then(|d| d.get("password_changed"))
                .and_then(|v| v.as_bool())
                == Some(true)
        })
        .times(1)
        .returning(|entry| Ok(common::activity_log(entry)));

    let updated = manager(repos, MockFileStore::new())
        .update(
            &actor(UserRole::Admin),
            Uuid::new_v4(),
            CertificateUpdate {
                remove_password: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(!updated.has_password);
}

#[tokio::test]
async fn test_update_checks_dates_against_stored_values() {
    let mut repos = repos_with_certificate(None);
    repos.certificates.expect_update().never();

    // Stored issue date is a year before expiration
    let result = manager(repos, MockFileStore::new())
        .update(
            &actor(UserRole::Admin),
            Uuid::new_v4(),
            CertificateUpdate {
                expiration_date: Some(today() - Duration::days(400)),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_company_filter_is_limited_to_visible_companies() {
    let visible = Uuid::new_v4();
    let requested = Uuid::new_v4();

    let mut repos = MockRepos::default();
    repos
        .permissions
        .expect_viewable_company_ids()
        .returning(move |_| Ok(vec![visible]));
    repos
        .certificates
        .expect_list()
        .withf(move |filter, _, _| {
            filter.company_id == Some(requested)
                && filter.visible_companies == Some(vec![visible])
        })
        .times(1)
        .returning(|_, _, _| Ok((vec![], 0)));

    let filter = CertificateFilter {
        company_id: Some(requested),
        // Caller-supplied visibility is ignored
        visible_companies: None,
        ..Default::default()
    };
    let page = manager(repos, MockFileStore::new())
        .list(&actor(UserRole::User), filter, PaginationParams::default())
        .await
        .unwrap();

    assert!(page.data.is_empty());
    assert_eq!(page.meta.total, 0);
}

#[tokio::test]
async fn test_admin_listing_is_unrestricted() {
    let company_id = Uuid::new_v4();
    let mut repos = MockRepos::default();
    repos.permissions.expect_viewable_company_ids().never();
    repos
        .certificates
        .expect_list()
        .withf(|filter, _, _| filter.visible_companies.is_none())
        .returning(move |_, _, _| {
            Ok((
                vec![certificate(Uuid::new_v4(), company_id, today() + Duration::days(2))],
                1,
            ))
        });

    let page = manager(repos, MockFileStore::new())
        .list(
            &actor(UserRole::Admin),
            CertificateFilter::default(),
            PaginationParams::new(1, 20),
        )
        .await
        .unwrap();

    assert_eq!(page.meta.total, 1);
    assert_eq!(page.data[0].days_remaining, 2);
}

// =============================================================================
// Files
// =============================================================================

#[tokio::test]
async fn test_upload_rejects_unsupported_extension() {
    let repos = repos_with_certificate(None);
    let mut files = MockFileStore::new();
    files.expect_save().never();

    let result = manager(repos, files)
        .upload_file(
            &actor(UserRole::Admin),
            Uuid::new_v4(),
            "notes.txt".to_string(),
            vec![1, 2, 3],
        )
        .await;

    assert!(matches!(result.unwrap_err(), AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_upload_over_limit_is_too_large() {
    let repos = repos_with_certificate(None);
    let mut files = MockFileStore::new();
    files.expect_save().never();

    let result = manager(repos, files)
        .upload_file(
            &actor(UserRole::Admin),
            Uuid::new_v4(),
            "empresa.pfx".to_string(),
            vec![0u8; MAX_UPLOAD_BYTES + 1],
        )
        .await;

    assert!(matches!(
        result.unwrap_err(),
        AppError::PayloadTooLarge(limit) if limit == MAX_UPLOAD_BYTES
    ));
}

#[tokio::test]
async fn test_upload_requires_edit_permission() {
    let mut repos = repos_with_certificate(None);
    repos
        .permissions
        .expect_find()
        .returning(|user_id, company_id| {
            Ok(Some(permission(user_id, company_id, true, false, false, false)))
        });
    let mut files = MockFileStore::new();
    files.expect_save().never();

    let result = manager(repos, files)
        .upload_file(
            &actor(UserRole::User),
            Uuid::new_v4(),
            "empresa.pfx".to_string(),
            vec![1, 2, 3],
        )
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Forbidden));
}

#[tokio::test]
async fn test_upload_replaces_previous_file() {
    let mut repos = repos_with_certificate(Some("old.pfx"));
    repos
        .certificates
        .expect_set_file_path()
        .withf(|_, path| path.as_deref() == Some("new.p12"))
        .times(1)
        .returning(|id, path| {
            let mut updated = certificate(id, Uuid::new_v4(), today() + Duration::days(90));
            updated.file_path = path;
            Ok(updated)
        });
    repos.allow_activity();

    let mut files = MockFileStore::new();
    files
        .expect_save()
        .withf(|_, extension, bytes| extension == "p12" && bytes.len() == 3)
        .times(1)
        .returning(|_, _, _| Ok("new.p12".to_string()));
    files
        .expect_remove()
        .withf(|key| key == "old.pfx")
        .times(1)
        .returning(|_| Ok(()));

    let updated = manager(repos, files)
        .upload_file(
            &actor(UserRole::Admin),
            Uuid::new_v4(),
            "Empresa.P12".to_string(),
            vec![1, 2, 3],
        )
        .await
        .unwrap();

    assert!(updated.has_file);
}

#[tokio::test]
async fn test_download_without_file_is_not_found() {
    let repos = repos_with_certificate(None);
    let mut files = MockFileStore::new();
    files.expect_read().never();

    let result = manager(repos, files)
        .download_file(&actor(UserRole::Admin), Uuid::new_v4())
        .await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn test_download_names_file_after_certificate() {
    let repos = repos_with_certificate(Some("stored-key.pfx"));
    let mut files = MockFileStore::new();
    files
        .expect_read()
        .withf(|key| key == "stored-key.pfx")
        .returning(|_| Ok(vec![42]));

    let file = manager(repos, files)
        .download_file(&actor(UserRole::Admin), Uuid::new_v4())
        .await
        .unwrap();

    assert_eq!(file.file_name, "e-CNPJ.pfx");
    assert_eq!(file.bytes, vec![42]);
}
