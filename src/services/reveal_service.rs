//! Password reveal with emailed one-time confirmation codes.
//!
//! A code is bound to one (user, certificate) pair, lives for a few
//! minutes, tolerates a bounded number of wrong guesses and is consumed by
//! the first correct one.

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::access::{ensure_company_permission, record_activity};
use crate::config::{REVEAL_CODE_DIGITS, REVEAL_CODE_MAX_ATTEMPTS, REVEAL_CODE_TTL_SECONDS};
use crate::domain::{
    ActivityAction, ActivityEntity, Actor, Certificate, NewActivity, PermissionKind, RevealCode,
};
use crate::errors::{AppError, AppResult};
use crate::infra::{SecretCipher, TokenStore, UnitOfWork};
use crate::jobs::{EmailJob, EmailQueue};
use crate::utils::format::format_datetime;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Confirmation code was issued
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CodeIssued {
    /// Where the code was sent
    #[schema(example = "ana@example.com")]
    pub sent_to: String,
    /// Seconds the code stays valid
    #[schema(example = 300)]
    pub expires_in: u64,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RevealService: Send + Sync {
    /// Issue a code and email it to the requesting user
    async fn request_code(&self, actor: &Actor, certificate_id: Uuid) -> AppResult<CodeIssued>;

    /// Check the code and return the decrypted password
    async fn reveal(&self, actor: &Actor, certificate_id: Uuid, code: String) -> AppResult<String>;
}

/// Random zero-padded numeric code.
fn generate_code() -> String {
    let upper = 10u32.pow(REVEAL_CODE_DIGITS);
    let value = rand::thread_rng().gen_range(0..upper);
    format!("{:0width$}", value, width = REVEAL_CODE_DIGITS as usize)
}

pub struct PasswordRevealer<U: UnitOfWork> {
    uow: Arc<U>,
    tokens: Arc<dyn TokenStore>,
    emails: Arc<dyn EmailQueue>,
    cipher: SecretCipher,
}

impl<U: UnitOfWork> PasswordRevealer<U> {
    pub fn new(
        uow: Arc<U>,
        tokens: Arc<dyn TokenStore>,
        emails: Arc<dyn EmailQueue>,
        cipher: SecretCipher,
    ) -> Self {
        Self {
            uow,
            tokens,
            emails,
            cipher,
        }
    }

    /// Certificate with a stored password the actor may reveal.
    async fn revealable(&self, actor: &Actor, certificate_id: Uuid) -> AppResult<Certificate> {
        let certificate = self
            .uow
            .certificates()
            .find_by_id(certificate_id)
            .await?
            .ok_or(AppError::NotFound)?;
        ensure_company_permission(
            self.uow.as_ref(),
            actor,
            certificate.company_id,
            PermissionKind::ViewPassword,
        )
        .await?;

        if certificate.encrypted_password.is_none() {
            return Err(AppError::bad_request("Certificate has no stored password"));
        }
        Ok(certificate)
    }
}

#[async_trait]
impl<U: UnitOfWork> RevealService for PasswordRevealer<U> {
    async fn request_code(&self, actor: &Actor, certificate_id: Uuid) -> AppResult<CodeIssued> {
        let certificate = self.revealable(actor, certificate_id).await?;
        let user = self
            .uow
            .users()
            .find_by_id(actor.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let code = generate_code();
        self.tokens
            .put_code(
                actor.user_id,
                certificate_id,
                RevealCode::new(code.clone()),
                REVEAL_CODE_TTL_SECONDS,
            )
            .await?;

        let body = format!(
            "Olá {},\n\nSeu código para visualizar a senha do certificado \"{}\" é: {}\n\n\
             Solicitado em {}. O código expira em {} minutos. \
             Se você não solicitou, ignore esta mensagem.",
            user.name,
            certificate.name,
            code,
            format_datetime(Utc::now()),
            REVEAL_CODE_TTL_SECONDS / 60
        );
        self.emails
            .enqueue(EmailJob::new(
                user.email.clone(),
                "Código de confirmação - CertificadoGuardian",
                body,
            ))
            .await?;

        tracing::info!(
            user_id = %actor.user_id,
            certificate_id = %certificate_id,
            "Reveal code issued"
        );

        Ok(CodeIssued {
            sent_to: user.email,
            expires_in: REVEAL_CODE_TTL_SECONDS,
        })
    }

    async fn reveal(&self, actor: &Actor, certificate_id: Uuid, code: String) -> AppResult<String> {
        let certificate = self.revealable(actor, certificate_id).await?;

        let pending = self
            .tokens
            .get_code(actor.user_id, certificate_id)
            .await?
            .ok_or(AppError::InvalidCode)?;

        // Counted before comparing so parallel guesses each consume one attempt
        let attempt = self
            .tokens
            .register_attempt(actor.user_id, certificate_id, REVEAL_CODE_TTL_SECONDS)
            .await?;
        if attempt > REVEAL_CODE_MAX_ATTEMPTS {
            self.tokens.remove_code(actor.user_id, certificate_id).await?;
            return Err(AppError::TooManyAttempts);
        }

        if !pending.matches(&code) {
            tracing::warn!(
                user_id = %actor.user_id,
                certificate_id = %certificate_id,
                attempt,
                "Wrong reveal code"
            );
            if attempt >= REVEAL_CODE_MAX_ATTEMPTS {
                self.tokens.remove_code(actor.user_id, certificate_id).await?;
                return Err(AppError::TooManyAttempts);
            }
            return Err(AppError::InvalidCode);
        }

        // One code, one reveal
        self.tokens.remove_code(actor.user_id, certificate_id).await?;

        let sealed = certificate
            .encrypted_password
            .as_deref()
            .ok_or_else(|| AppError::bad_request("Certificate has no stored password"))?;
        let password = self.cipher.decrypt(sealed)?;

        record_activity(
            self.uow.as_ref(),
            NewActivity::by(actor, ActivityAction::ViewPassword, ActivityEntity::Certificate)
                .entity_id(certificate_id),
        )
        .await;

        Ok(password)
    }
}
