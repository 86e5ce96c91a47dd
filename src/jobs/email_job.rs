//! Email background job.
//!
//! Without `SMTP_HOST` the message is written to the log instead of sent.

use serde::{Deserialize, Serialize};
use std::env;

use crate::errors::AppError;

/// Email job payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailJob {
    pub to: String,
    pub subject: String,
    /// Plain text body
    pub body: String,
}

impl EmailJob {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

struct EmailConfig {
    smtp_host: Option<String>,
    smtp_from: String,
}

impl EmailConfig {
    fn from_env() -> Self {
        Self {
            smtp_host: env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()),
            smtp_from: env::var("SMTP_FROM")
                .unwrap_or_else(|_| "certificados@localhost".to_string()),
        }
    }
}

/// Processes queued email jobs
pub async fn email_job_handler(job: EmailJob) -> Result<(), AppError> {
    let config = EmailConfig::from_env();

    tracing::info!(
        to = %job.to,
        from = %config.smtp_from,
        subject = %job.subject,
        "Processing email job"
    );

    match config.smtp_host {
        None => {
            tracing::warn!("SMTP not configured - logging email instead of sending");
            tracing::info!(
                "=== EMAIL (not sent) ===\nFrom: {}\nTo: {}\nSubject: {}\n\n{}\n========================",
                config.smtp_from,
                job.to,
                job.subject,
                job.body
            );
        }
        Some(host) => {
            // TODO: deliver through an SMTP transport once one is added to the stack
            tracing::warn!(smtp_host = %host, to = %job.to, "No SMTP transport available, email dropped");
        }
    }

    Ok(())
}
