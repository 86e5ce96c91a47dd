//! Certificate status derivation.
//!
//! Status is never persisted: it is computed from the expiration date
//! relative to a reference day.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::{CRITICAL_THRESHOLD_DAYS, EXPIRING_THRESHOLD_DAYS};

/// Derived certificate status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    Valid,
    Expiring,
    Critical,
    Expired,
}

impl CertificateStatus {
    pub const ALL: [CertificateStatus; 4] = [
        CertificateStatus::Valid,
        CertificateStatus::Expiring,
        CertificateStatus::Critical,
        CertificateStatus::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateStatus::Valid => "valid",
            CertificateStatus::Expiring => "expiring",
            CertificateStatus::Critical => "critical",
            CertificateStatus::Expired => "expired",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "valid" => Some(CertificateStatus::Valid),
            "expiring" => Some(CertificateStatus::Expiring),
            "critical" => Some(CertificateStatus::Critical),
            "expired" => Some(CertificateStatus::Expired),
            _ => None,
        }
    }

    /// Inclusive range of expiration dates that map to this status on `today`.
    ///
    /// `None` on either side means unbounded. Used to push status filters
    /// down to the database.
    pub fn expiration_range(&self, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
        let day = |offset: i64| today + Duration::days(offset);
        match self {
            CertificateStatus::Expired => (None, Some(day(-1))),
            CertificateStatus::Critical => (Some(today), Some(day(CRITICAL_THRESHOLD_DAYS))),
            CertificateStatus::Expiring => (
                Some(day(CRITICAL_THRESHOLD_DAYS + 1)),
                Some(day(EXPIRING_THRESHOLD_DAYS)),
            ),
            CertificateStatus::Valid => (Some(day(EXPIRING_THRESHOLD_DAYS + 1)), None),
        }
    }
}

impl std::fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole days from `today` until `expiration` (negative once past).
pub fn days_remaining(today: NaiveDate, expiration: NaiveDate) -> i64 {
    (expiration - today).num_days()
}

/// Current calendar day in the server's local time zone.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Compute the status of a certificate expiring on `expiration`.
pub fn certificate_status(today: NaiveDate, expiration: NaiveDate) -> CertificateStatus {
    let days = days_remaining(today, expiration);
    if days < 0 {
        CertificateStatus::Expired
    } else if days <= CRITICAL_THRESHOLD_DAYS {
        CertificateStatus::Critical
    } else if days <= EXPIRING_THRESHOLD_DAYS {
        CertificateStatus::Expiring
    } else {
        CertificateStatus::Valid
    }
}
