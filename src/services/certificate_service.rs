//! Certificate service - CRUD, listing filters and file handling.
//!
//! Passwords are sealed with [`SecretCipher`] before they reach the
//! repository and never leave this service in responses.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::access::{ensure_company_permission, record_activity, visible_companies};
use crate::config::{ALLOWED_CERTIFICATE_EXTENSIONS, MAX_UPLOAD_BYTES};
use crate::domain::{
    today, ActivityAction, ActivityEntity, Actor, Certificate, CertificateChanges,
    CertificateFilter, CertificateResponse, CertificateType, NewActivity, NewCertificate,
    PermissionKind,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{FileStore, SecretCipher, UnitOfWork};
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Fields of a new certificate
#[derive(Debug, Clone)]
pub struct CertificateInput {
    pub company_id: Uuid,
    pub name: String,
    pub entity: String,
    pub identifier: String,
    pub cert_type: CertificateType,
    pub issued_date: NaiveDate,
    pub expiration_date: NaiveDate,
    /// Plain password, encrypted before storage
    pub password: Option<String>,
}

/// Partial certificate update
#[derive(Debug, Clone, Default)]
pub struct CertificateUpdate {
    pub name: Option<String>,
    pub entity: Option<String>,
    pub identifier: Option<String>,
    pub cert_type: Option<CertificateType>,
    pub issued_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    /// New plain password
    pub password: Option<String>,
    /// Drop the stored password (ignored when `password` is set)
    pub remove_password: bool,
}

/// A stored certificate file ready for download
#[derive(Debug, Clone)]
pub struct CertificateFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CertificateService: Send + Sync {
    /// `filter.visible_companies` is replaced by the actor's visibility
    async fn list(
        &self,
        actor: &Actor,
        filter: CertificateFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<CertificateResponse>>;

    async fn get(&self, actor: &Actor, id: Uuid) -> AppResult<CertificateResponse>;

    async fn create(&self, actor: &Actor, input: CertificateInput)
        -> AppResult<CertificateResponse>;

    async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: CertificateUpdate,
    ) -> AppResult<CertificateResponse>;

    async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()>;

    async fn upload_file(
        &self,
        actor: &Actor,
        id: Uuid,
        file_name: String,
        bytes: Vec<u8>,
    ) -> AppResult<CertificateResponse>;

    async fn download_file(&self, actor: &Actor, id: Uuid) -> AppResult<CertificateFile>;
}

/// Lowercased extension if it is an accepted certificate format.
fn certificate_extension(file_name: &str) -> AppResult<String> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| ALLOWED_CERTIFICATE_EXTENSIONS.contains(&e.as_str()))
        .ok_or_else(|| {
            AppError::bad_request(format!(
                "Unsupported file type, expected one of: {}",
                ALLOWED_CERTIFICATE_EXTENSIONS.join(", ")
            ))
        })?;
    Ok(extension)
}

fn ensure_date_order(issued: NaiveDate, expiration: NaiveDate) -> AppResult<()> {
    if issued > expiration {
        return Err(AppError::validation(
            "Issued date must not be after the expiration date",
        ));
    }
    Ok(())
}

pub struct CertificateManager<U: UnitOfWork> {
    uow: Arc<U>,
    files: Arc<dyn FileStore>,
    cipher: SecretCipher,
}

impl<U: UnitOfWork> CertificateManager<U> {
    pub fn new(uow: Arc<U>, files: Arc<dyn FileStore>, cipher: SecretCipher) -> Self {
        Self { uow, files, cipher }
    }

    /// Load a certificate and check `kind` on its company.
    async fn authorized(
        &self,
        actor: &Actor,
        id: Uuid,
        kind: PermissionKind,
    ) -> AppResult<Certificate> {
        let certificate = self
            .uow
            .certificates()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;
        ensure_company_permission(self.uow.as_ref(), actor, certificate.company_id, kind).await?;
        Ok(certificate)
    }

    fn seal(&self, password: Option<String>) -> AppResult<Option<String>> {
        password
            .filter(|p| !p.is_empty())
            .map(|p| self.cipher.encrypt(&p))
            .transpose()
    }
}

#[async_trait]
impl<U: UnitOfWork> CertificateService for CertificateManager<U> {
    async fn list(
        &self,
        actor: &Actor,
        mut filter: CertificateFilter,
        page: PaginationParams,
    ) -> AppResult<Paginated<CertificateResponse>> {
        filter.visible_companies = visible_companies(self.uow.as_ref(), actor).await?;

        let today = today();
        let (certificates, total) = self
            .uow
            .certificates()
            .list(filter, today, page.clone())
            .await?;

        let data = certificates
            .into_iter()
            .map(|c| CertificateResponse::from_certificate(c, today))
            .collect();
        Ok(Paginated::new(data, page.page, page.limit(), total))
    }

    async fn get(&self, actor: &Actor, id: Uuid) -> AppResult<CertificateResponse> {
        let certificate = self.authorized(actor, id, PermissionKind::View).await?;
        Ok(CertificateResponse::from_certificate(certificate, today()))
    }

    async fn create(
        &self,
        actor: &Actor,
        input: CertificateInput,
    ) -> AppResult<CertificateResponse> {
        self.uow
            .companies()
            .find_by_id(input.company_id)
            .await?
            .ok_or(AppError::NotFound)?;
        ensure_company_permission(
            self.uow.as_ref(),
            actor,
            input.company_id,
            PermissionKind::Edit,
        )
        .await?;
        ensure_date_order(input.issued_date, input.expiration_date)?;

        let certificate = self
            .uow
            .certificates()
            .create(NewCertificate {
                company_id: input.company_id,
                name: input.name,
                entity: input.entity,
                identifier: input.identifier,
                cert_type: input.cert_type,
                issued_date: input.issued_date,
                expiration_date: input.expiration_date,
                encrypted_password: self.seal(input.password)?,
            })
            .await?;

        record_activity(
            self.uow.as_ref(),
            NewActivity::by(actor, ActivityAction::Create, ActivityEntity::Certificate)
                .entity_id(certificate.id)
                .details(json!({
                    "name": certificate.name,
                    "company_id": certificate.company_id,
                    "expiration_date": certificate.expiration_date,
                })),
        )
        .await;

        Ok(CertificateResponse::from_certificate(certificate, today()))
    }

    async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        changes: CertificateUpdate,
    ) -> AppResult<CertificateResponse> {
        let current = self.authorized(actor, id, PermissionKind::Edit).await?;
        ensure_date_order(
            changes.issued_date.unwrap_or(current.issued_date),
            changes.expiration_date.unwrap_or(current.expiration_date),
        )?;

        let password_changed = changes.password.is_some() || changes.remove_password;
        let encrypted_password = match (changes.password, changes.remove_password) {
            (Some(password), _) => Some(self.seal(Some(password))?),
            (None, true) => Some(None),
            (None, false) => None,
        };

        let certificate = self
            .uow
            .certificates()
            .update(
                id,
                CertificateChanges {
                    name: changes.name,
                    entity: changes.entity,
                    identifier: changes.identifier,
                    cert_type: changes.cert_type,
                    issued_date: changes.issued_date,
                    expiration_date: changes.expiration_date,
                    encrypted_password,
                },
            )
            .await?;

        record_activity(
            self.uow.as_ref(),
            NewActivity::by(actor, ActivityAction::Update, ActivityEntity::Certificate)
                .entity_id(id)
                .details(json!({ "password_changed": password_changed })),
        )
        .await;

        Ok(CertificateResponse::from_certificate(certificate, today()))
    }

    async fn delete(&self, actor: &Actor, id: Uuid) -> AppResult<()> {
        let certificate = self.authorized(actor, id, PermissionKind::Delete).await?;

        self.uow.certificates().delete(id).await?;

        if let Some(key) = &certificate.file_path {
            if let Err(e) = self.files.remove(key).await {
                tracing::warn!(error = %e, file = %key, "Failed to remove certificate file");
            }
        }

        record_activity(
            self.uow.as_ref(),
            NewActivity::by(actor, ActivityAction::Delete, ActivityEntity::Certificate)
                .entity_id(id)
                .details(json!({ "name": certificate.name, "company_id": certificate.company_id })),
        )
        .await;

        Ok(())
    }

    async fn upload_file(
        &self,
        actor: &Actor,
        id: Uuid,
        file_name: String,
        bytes: Vec<u8>,
    ) -> AppResult<CertificateResponse> {
        let current = self.authorized(actor, id, PermissionKind::Edit).await?;

        let extension = certificate_extension(&file_name)?;
        if bytes.is_empty() {
            return Err(AppError::bad_request("Uploaded file is empty"));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::PayloadTooLarge(MAX_UPLOAD_BYTES));
        }

        let size = bytes.len();
        let key = self.files.save(id, &extension, bytes).await?;
        let certificate = self
            .uow
            .certificates()
            .set_file_path(id, Some(key))
            .await?;

        // Replace, don't accumulate
        if let Some(old) = current.file_path {
            if let Err(e) = self.files.remove(&old).await {
                tracing::warn!(error = %e, file = %old, "Failed to remove replaced file");
            }
        }

        record_activity(
            self.uow.as_ref(),
            NewActivity::by(actor, ActivityAction::Upload, ActivityEntity::Certificate)
                .entity_id(id)
                .details(json!({ "file_name": file_name, "size": size })),
        )
        .await;

        Ok(CertificateResponse::from_certificate(certificate, today()))
    }

    async fn download_file(&self, actor: &Actor, id: Uuid) -> AppResult<CertificateFile> {
        let certificate = self.authorized(actor, id, PermissionKind::View).await?;
        let key = certificate.file_path.ok_or(AppError::NotFound)?;

        let bytes = self.files.read(&key).await?;
        let extension = std::path::Path::new(&key)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");

        Ok(CertificateFile {
            file_name: format!("{}.{}", certificate.name, extension),
            bytes,
        })
    }
}
