//! Background jobs.
//!
//! Emails (password reveal codes, expiration digests) are queued in
//! PostgreSQL through apalis and delivered by `jobs work`.

mod email_job;
mod queue;

pub use email_job::{email_job_handler, EmailJob};
pub use queue::{connect_job_pool, EmailQueue, PostgresEmailQueue};

#[cfg(any(test, feature = "test-utils"))]
pub use queue::MockEmailQueue;
