//! Company domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Company owning certificates
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Company {
    pub id: Uuid,
    #[schema(example = "Padaria Pão Quente Ltda")]
    pub name: String,
    /// Tax identifier (CNPJ or CPF), digits only
    #[schema(example = "11222333000181")]
    pub identifier: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to persist a new company
#[derive(Debug, Clone)]
pub struct NewCompany {
    pub name: String,
    pub identifier: String,
}

/// Partial company update
#[derive(Debug, Clone, Default)]
pub struct CompanyChanges {
    pub name: Option<String>,
    pub identifier: Option<String>,
}
