//! Systems that consume a certificate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A system (ERP, tax portal, bank integration) using a certificate
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CertificateSystem {
    pub id: Uuid,
    pub certificate_id: Uuid,
    #[schema(example = "eSocial")]
    pub name: String,
    #[schema(example = "https://login.esocial.gov.br")]
    pub url: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCertificateSystem {
    pub certificate_id: Uuid,
    pub name: String,
    pub url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CertificateSystemChanges {
    pub name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}
