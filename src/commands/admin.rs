//! Admin command - Bootstrap administrator accounts.
//!
//! The HTTP API only lets admins create users, so the first one comes from
//! here:
//!
//! ```bash
//! ADMIN_PASSWORD=... certificado-guardian admin create \
//!     --username admin --email admin@empresa.com.br --name "Administrador"
//! ```

use crate::cli::args::{AdminAction, AdminArgs};
use crate::config::Config;
use crate::domain::{NewUser, Password, User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, Persistence, UnitOfWork};

/// Execute the admin command
pub async fn execute(args: AdminArgs, config: Config) -> AppResult<()> {
    match args.action {
        AdminAction::Create {
            username,
            email,
            name,
            password,
        } => {
            let db = Database::connect(&config)
                .await
                .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
            let uow = Persistence::new(db.get_connection());

            let user = create_admin(
                &uow,
                NewAdmin {
                    username,
                    email,
                    name,
                    password,
                },
            )
            .await?;

            tracing::info!(user_id = %user.id, username = %user.username, "Administrator created");
            println!("Administrator '{}' created ({})", user.username, user.id);
            Ok(())
        }
    }
}

/// Administrator account details
pub struct NewAdmin {
    pub username: String,
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Create an admin, rejecting names or emails held by any account,
/// deleted ones included.
pub async fn create_admin<U: UnitOfWork>(uow: &U, admin: NewAdmin) -> AppResult<User> {
    let username = admin.username.trim().to_string();
    let email = admin.email.trim().to_string();
    if username.is_empty() || email.is_empty() || admin.name.trim().is_empty() {
        return Err(AppError::validation("Username, email and name are required"));
    }

    let users = uow.users();
    if users
        .find_by_username_with_deleted(&username)
        .await?
        .is_some()
    {
        return Err(AppError::conflict("Username"));
    }
    if users.find_by_email_with_deleted(&email).await?.is_some() {
        return Err(AppError::conflict("Email"));
    }

    let password_hash = Password::new(&admin.password)?.into_string();
    users
        .create(NewUser {
            username,
            email,
            password_hash,
            name: admin.name.trim().to_string(),
            role: UserRole::Admin,
        })
        .await
}
