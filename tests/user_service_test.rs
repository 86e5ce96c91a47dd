//! User service unit tests.

mod common;

use mockall::predicate::eq;
use uuid::Uuid;

use certificado_guardian::domain::{Password, UserChanges, UserRole};
use certificado_guardian::errors::AppError;
use certificado_guardian::services::{CreateUser, UserManager, UserService};

use common::{actor, user, MockRepos};

#[tokio::test]
async fn test_get_own_profile() {
    let me = actor(UserRole::User);
    let my_id = me.user_id;

    let mut repos = MockRepos::default();
    repos
        .users
        .expect_find_by_id()
        .with(eq(my_id))
        .returning(|id| {
            let mut found = user(UserRole::User);
            found.id = id;
            Ok(Some(found))
        });

    let service = UserManager::new(repos.into_uow());
    let result = service.get_user(&me, my_id).await;

    assert_eq!(result.unwrap().id, my_id);
}

#[tokio::test]
async fn test_get_other_profile_forbidden() {
    let service = UserManager::new(MockRepos::default().into_uow());
    let result = service
        .get_user(&actor(UserRole::Manager), Uuid::new_v4())
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Forbidden));
}

#[tokio::test]
async fn test_admin_get_user_not_found() {
    let mut repos = MockRepos::default();
    repos.users.expect_find_by_id().returning(|_| Ok(None));

    let service = UserManager::new(repos.into_uow());
    let result = service
        .get_user(&actor(UserRole::Admin), Uuid::new_v4())
        .await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound));
}

#[tokio::test]
async fn test_list_users_success() {
    let mut repos = MockRepos::default();
    repos
        .users
        .expect_list()
        .returning(|| Ok(vec![user(UserRole::User), user(UserRole::Admin)]));

    let service = UserManager::new(repos.into_uow());
    let result = service.list_users().await;

    assert_eq!(result.unwrap().len(), 2);
}

#[tokio::test]
async fn test_create_user_rejects_reserved_username() {
    let mut repos = MockRepos::default();
    repos
        .users
        .expect_find_by_username_with_deleted()
        .returning(|_| {
            let mut deleted = user(UserRole::User);
            deleted.deleted_at = Some(chrono::Utc::now());
            Ok(Some(deleted))
        });
    repos.users.expect_create().never();

    let service = UserManager::new(repos.into_uow());
    let result = service
        .create_user(
            &actor(UserRole::Admin),
            CreateUser {
                username: "maria".to_string(),
                email: "maria@example.com".to_string(),
                password: "SenhaForte123".to_string(),
                name: "Maria".to_string(),
                role: UserRole::User,
            },
        )
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Conflict(_)));
}

#[tokio::test]
async fn test_create_user_hashes_password() {
    let mut repos = MockRepos::default();
    repos
        .users
        .expect_find_by_username_with_deleted()
        .returning(|_| Ok(None));
    repos
        .users
        .expect_find_by_email_with_deleted()
        .returning(|_| Ok(None));
    repos
        .users
        .expect_create()
        .withf(|new_user| {
            new_user.password_hash != "SenhaForte123"
                && Password::from_hash(new_user.password_hash.clone()).verify("SenhaForte123")
        })
        .returning(|new_user| {
            let mut created = user(new_user.role);
            created.username = new_user.username;
            created.email = new_user.email;
            Ok(created)
        });
    repos.allow_activity();

    let service = UserManager::new(repos.into_uow());
    let created = service
        .create_user(
            &actor(UserRole::Admin),
            CreateUser {
                username: "joao".to_string(),
                email: "joao@example.com".to_string(),
                password: "SenhaForte123".to_string(),
                name: "João".to_string(),
                role: UserRole::Manager,
            },
        )
        .await
        .unwrap();

    assert_eq!(created.username, "joao");
    assert_eq!(created.role, UserRole::Manager);
}

#[tokio::test]
async fn test_non_admin_cannot_change_own_role() {
    let me = actor(UserRole::User);
    let service = UserManager::new(MockRepos::default().into_uow());

    let result = service
        .update_user(
            &me,
            me.user_id,
            UserChanges {
                role: Some(UserRole::Admin),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result.unwrap_err(), AppError::Forbidden));
}

#[tokio::test]
async fn test_cannot_delete_self() {
    let me = actor(UserRole::Admin);
    let service = UserManager::new(MockRepos::default().into_uow());

    let result = service.delete_user(&me, me.user_id).await;

    assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
}

#[tokio::test]
async fn test_delete_user_records_activity() {
    let mut repos = MockRepos::default();
    repos.users.expect_delete().times(1).returning(|_| Ok(()));
    repos
        .activities
        .expect_insert()
        .times(1)
        .returning(|entry| Ok(common::activity_log(entry)));

    let service = UserManager::new(repos.into_uow());
    let result = service
        .delete_user(&actor(UserRole::Admin), Uuid::new_v4())
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_restore_user_success() {
    let user_id = Uuid::new_v4();

    let mut repos = MockRepos::default();
    repos.users.expect_restore().returning(|id| {
        let mut restored = user(UserRole::User);
        restored.id = id;
        Ok(restored)
    });
    repos.allow_activity();

    let service = UserManager::new(repos.into_uow());
    let result = service
        .restore_user(&actor(UserRole::Admin), user_id)
        .await;

    assert_eq!(result.unwrap().id, user_id);
}

#[tokio::test]
async fn test_change_own_password_requires_current() {
    let me = actor(UserRole::User);

    let mut repos = MockRepos::default();
    repos.users.expect_find_by_id().returning(|id| {
        let mut found = user(UserRole::User);
        found.id = id;
        found.password_hash = Password::new("SenhaAntiga123").unwrap().into_string();
        Ok(Some(found))
    });
    repos.users.expect_set_password().never();

    let service = UserManager::new(repos.into_uow());

    let missing = service
        .change_password(&me, me.user_id, None, "SenhaNova123".to_string())
        .await;
    assert!(matches!(missing.unwrap_err(), AppError::Validation(_)));

    let wrong = service
        .change_password(
            &me,
            me.user_id,
            Some("errada".to_string()),
            "SenhaNova123".to_string(),
        )
        .await;
    assert!(matches!(wrong.unwrap_err(), AppError::InvalidCredentials));
}

#[tokio::test]
async fn test_admin_resets_password_without_current() {
    let target = Uuid::new_v4();

    let mut repos = MockRepos::default();
    repos.users.expect_find_by_id().returning(|id| {
        let mut found = user(UserRole::User);
        found.id = id;
        Ok(Some(found))
    });
    repos
        .users
        .expect_set_password()
        .with(eq(target), mockall::predicate::always())
        .times(1)
        .returning(|_, _| Ok(()));
    repos.allow_activity();

    let service = UserManager::new(repos.into_uow());
    let result = service
        .change_password(
            &actor(UserRole::Admin),
            target,
            None,
            "SenhaNova123".to_string(),
        )
        .await;

    assert!(result.is_ok());
}
