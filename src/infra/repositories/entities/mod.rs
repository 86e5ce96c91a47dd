//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod activity_log;
pub mod certificate;
pub mod certificate_system;
pub mod company;
pub mod user;
pub mod user_permission;
