//! Jobs command - Background job management.
//!
//! ```bash
//! # Deliver queued emails (reveal codes, digests)
//! certificado-guardian jobs work
//!
//! # Queue counts / drop failed jobs
//! certificado-guardian jobs list
//! certificado-guardian jobs clear
//!
//! # Queue expiration digests, usually from cron
//! certificado-guardian jobs notify --days 15
//! ```

use std::sync::Arc;

use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::cli::args::{JobsAction, JobsArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, Persistence};
use crate::jobs::{connect_job_pool, PostgresEmailQueue};
use crate::services::{ExpiryNotifier, NotificationService};

/// Execute the jobs command
pub async fn execute(args: JobsArgs, config: Config) -> AppResult<()> {
    match args.action {
        JobsAction::Work => run_worker(&config).await,
        JobsAction::List => list_jobs(&config).await,
        JobsAction::Clear => clear_failed_jobs(&config).await,
        JobsAction::Notify { days } => notify(&config, days).await,
    }
}

/// Start the email worker until Ctrl+C.
async fn run_worker(config: &Config) -> AppResult<()> {
    use apalis::prelude::*;

    use crate::jobs::email_job_handler;

    tracing::info!("Connecting to database for job worker...");
    let queue = PostgresEmailQueue::new(connect_job_pool(&config.database_url).await?);

    tracing::info!("Job worker started. Press Ctrl+C to stop.");

    let worker = WorkerBuilder::new("email-worker")
        .backend(queue.storage())
        .build_fn(email_job_handler);

    let monitor = Monitor::new().register(worker);

    tokio::select! {
        result = monitor.run() => {
            if let Err(e) = result {
                tracing::error!("Worker error: {}", e);
                return Err(AppError::internal(format!("Worker failed: {}", e)));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping worker...");
        }
    }

    tracing::info!("Job worker stopped.");
    Ok(())
}

/// Queue one digest email per recipient.
async fn notify(config: &Config, days: i64) -> AppResult<()> {
    if days < 0 {
        return Err(AppError::bad_request("--days must not be negative"));
    }

    let db = connect(config).await?;
    let queue = PostgresEmailQueue::new(connect_job_pool(&config.database_url).await?);
    let notifier = ExpiryNotifier::new(
        Arc::new(Persistence::new(db.get_connection())),
        Arc::new(queue),
    );

    let summary = notifier.send_expiry_digest(days).await?;
    tracing::info!(
        days,
        certificates = summary.certificates,
        companies = summary.companies,
        emails = summary.emails_queued,
        "Expiration digest queued"
    );

    println!("\n=== Expiration Digest ===");
    println!("Window:        {} day(s)", days);
    println!("Certificates:  {}", summary.certificates);
    println!("Companies:     {}", summary.companies);
    println!("Emails queued: {}", summary.emails_queued);
    println!("=========================\n");

    Ok(())
}

/// Show queue counts per status.
async fn list_jobs(config: &Config) -> AppResult<()> {
    let db = connect(config).await?;
    let conn = db.connection();

    if !queue_initialized(conn).await? {
        println!("\n=== Job Queue Status ===");
        println!("Job queue not initialized.");
        println!("Run 'jobs work' first to create the queue tables.");
        println!("========================\n");
        return Ok(());
    }

    let rows = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT status::text as status, COUNT(*)::bigint as count FROM apalis.jobs GROUP BY status",
        ))
        .await?;

    let (mut pending, mut running, mut failed, mut done) = (0i64, 0i64, 0i64, 0i64);
    for row in rows {
        if let (Ok(status), Ok(count)) = (
            row.try_get::<String>("", "status"),
            row.try_get::<i64>("", "count"),
        ) {
            match status.as_str() {
                "Pending" => pending = count,
                "Running" => running = count,
                "Failed" => failed = count,
                "Done" => done = count,
                _ => {}
            }
        }
    }

    println!("\n=== Job Queue Status ===");
    println!("Pending:  {}", pending);
    println!("Running:  {}", running);
    println!("Failed:   {}", failed);
    println!("Done:     {}", done);
    println!("========================\n");

    Ok(())
}

/// Delete failed jobs.
async fn clear_failed_jobs(config: &Config) -> AppResult<()> {
    let db = connect(config).await?;
    let conn = db.connection();

    if !queue_initialized(conn).await? {
        println!("Job queue not initialized. Nothing to clear.");
        return Ok(());
    }

    let result = conn
        .execute(Statement::from_string(
            DatabaseBackend::Postgres,
            "DELETE FROM apalis.jobs WHERE status = 'Failed'",
        ))
        .await?;

    println!(
        "Cleared {} failed job(s) from the queue.",
        result.rows_affected()
    );
    Ok(())
}

async fn connect(config: &Config) -> AppResult<Database> {
    tracing::info!("Connecting to database...");
    Database::connect_without_migrations(config)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect to database: {}", e)))
}

/// Whether apalis has created its schema yet
async fn queue_initialized(conn: &DatabaseConnection) -> AppResult<bool> {
    let row = conn
        .query_one(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM information_schema.schemata WHERE schema_name = 'apalis') as exists",
        ))
        .await?;

    Ok(row
        .and_then(|r| r.try_get::<bool>("", "exists").ok())
        .unwrap_or(false))
}
