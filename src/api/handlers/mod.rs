//! HTTP request handlers.

pub mod auth_handler;
pub mod certificate_handler;
pub mod company_handler;
pub mod dashboard_handler;
pub mod log_handler;
pub mod permission_handler;
pub mod system_handler;
pub mod user_handler;

pub use auth_handler::{auth_routes, session_routes};
pub use certificate_handler::certificate_routes;
pub use company_handler::company_routes;
pub use dashboard_handler::dashboard_routes;
pub use log_handler::log_routes;
pub use permission_handler::permission_routes;
pub use system_handler::{certificate_system_routes, system_routes};
pub use user_handler::user_routes;
