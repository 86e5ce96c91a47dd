//! CertificadoGuardian - digital certificate inventory.
//!
//! Tracks A1/A3 certificates per company, warns before they expire, and
//! keeps certificate passwords encrypted behind an emailed confirmation code.
//!
//! # Architecture Layers
//!
//! - **cli** / **commands**: `serve`, `migrate`, `jobs`, `admin`
//! - **config**: Environment configuration and constants
//! - **domain**: Entities, status derivation, permission rules
//! - **services**: Use cases behind traits
//! - **infra**: Postgres, Redis, encryption, file storage
//! - **jobs**: apalis email queue
//! - **api**: Axum handlers, middleware, routes and OpenAPI
//! - **types** / **utils**: Pagination, responses, date formatting
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! certificado-guardian migrate up
//! certificado-guardian admin create --username admin --email admin@empresa.com.br --name Admin
//! certificado-guardian serve
//! certificado-guardian jobs work
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod services;
pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{CertificateStatus, Password, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
