//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{HealthCheck, RateLimiter};
use crate::services::ServiceContainer;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<dyn ServiceContainer>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub health: Arc<dyn HealthCheck>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        services: Arc<dyn ServiceContainer>,
        rate_limiter: Arc<dyn RateLimiter>,
        health: Arc<dyn HealthCheck>,
        config: Config,
    ) -> Self {
        Self {
            services,
            rate_limiter,
            health,
            config: Arc::new(config),
        }
    }
}
