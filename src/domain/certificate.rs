//! Certificate domain entity and related types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::status::{certificate_status, days_remaining, CertificateStatus};

/// Certificate storage type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CertificateType {
    /// Software certificate (file based)
    A1,
    /// Hardware certificate (token or smart card)
    A3,
}

impl CertificateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateType::A1 => "A1",
            CertificateType::A3 => "A3",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "A1" => Some(CertificateType::A1),
            "A3" => Some(CertificateType::A3),
            _ => None,
        }
    }
}

impl std::fmt::Display for CertificateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Certificate domain entity
#[derive(Debug, Clone)]
pub struct Certificate {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    /// Issuing certification authority
    pub entity: String,
    /// Serial number or subject identifier
    pub identifier: String,
    pub cert_type: CertificateType,
    pub issued_date: NaiveDate,
    pub expiration_date: NaiveDate,
    /// AES-GCM sealed password (`nonce:ciphertext`, base64)
    pub encrypted_password: Option<String>,
    /// Stored file path relative to the upload directory
    pub file_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Certificate {
    pub fn status_on(&self, today: NaiveDate) -> CertificateStatus {
        certificate_status(today, self.expiration_date)
    }

    pub fn days_remaining_on(&self, today: NaiveDate) -> i64 {
        days_remaining(today, self.expiration_date)
    }
}

/// Data required to persist a new certificate
#[derive(Debug, Clone)]
pub struct NewCertificate {
    pub company_id: Uuid,
    pub name: String,
    pub entity: String,
    pub identifier: String,
    pub cert_type: CertificateType,
    pub issued_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub encrypted_password: Option<String>,
}

/// Partial certificate update.
///
/// `encrypted_password`: `None` keeps the stored value, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct CertificateChanges {
    pub name: Option<String>,
    pub entity: Option<String>,
    pub identifier: Option<String>,
    pub cert_type: Option<CertificateType>,
    pub issued_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub encrypted_password: Option<Option<String>>,
}

/// Certificate listing filter
#[derive(Debug, Clone, Default)]
pub struct CertificateFilter {
    /// Companies the caller may see (`None` = all)
    pub visible_companies: Option<Vec<Uuid>>,
    pub company_id: Option<Uuid>,
    pub cert_type: Option<CertificateType>,
    pub status: Option<CertificateStatus>,
    /// Case-insensitive match on name, entity or identifier
    pub search: Option<String>,
}

/// Certificate response with derived status (never includes the password)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CertificateResponse {
    pub id: Uuid,
    pub company_id: Uuid,
    #[schema(example = "e-CNPJ Matriz")]
    pub name: String,
    #[schema(example = "AC SERASA RFB v5")]
    pub entity: String,
    pub identifier: String,
    #[serde(rename = "type")]
    pub cert_type: CertificateType,
    pub issued_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub status: CertificateStatus,
    pub days_remaining: i64,
    pub has_password: bool,
    pub has_file: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CertificateResponse {
    pub fn from_certificate(certificate: Certificate, today: NaiveDate) -> Self {
        Self {
            status: certificate.status_on(today),
            days_remaining: certificate.days_remaining_on(today),
            has_password: certificate.encrypted_password.is_some(),
            has_file: certificate.file_path.is_some(),
            id: certificate.id,
            company_id: certificate.company_id,
            name: certificate.name,
            entity: certificate.entity,
            identifier: certificate.identifier,
            cert_type: certificate.cert_type,
            issued_date: certificate.issued_date,
            expiration_date: certificate.expiration_date,
            created_at: certificate.created_at,
            updated_at: certificate.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(expiration: NaiveDate) -> Certificate {
        Certificate {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "e-CNPJ".to_string(),
            entity: "AC Certisign".to_string(),
            identifier: "1234ABCD".to_string(),
            cert_type: CertificateType::A1,
            issued_date: expiration - chrono::Duration::days(365),
            expiration_date: expiration,
            encrypted_password: Some("sealed".to_string()),
            file_path: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_type_parse_is_case_insensitive() {
        assert_eq!(CertificateType::parse("a1"), Some(CertificateType::A1));
        assert_eq!(CertificateType::parse("A3"), Some(CertificateType::A3));
        assert_eq!(CertificateType::parse("A2"), None);
    }

    #[test]
    fn test_response_derives_status_and_hides_password() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let cert = sample(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
        let response = CertificateResponse::from_certificate(cert, today);

        assert_eq!(response.status, CertificateStatus::Critical);
        assert_eq!(response.days_remaining, 2);
        assert!(response.has_password);
        assert!(!response.has_file);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "A1");
        assert!(json.get("encrypted_password").is_none());
    }
}
