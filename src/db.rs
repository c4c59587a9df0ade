use crate::config::AppConfig;
use crate::errors::ServiceError;
use anyhow::Context;
use metrics::{counter, gauge, histogram};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Retries of a transiently failing operation before giving up
const MAX_TRANSIENT_ATTEMPTS: u32 = 3;

/// Base delay between retry attempts; grows linearly per attempt
const TRANSIENT_RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// Configuration for database connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Idle timeout duration
    pub idle_timeout: Duration,
    /// Acquire connection timeout
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(8),
        }
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
        }
    }
}

/// Establishes a connection pool to the database
pub async fn establish_connection(database_url: &str) -> Result<DbPool, ServiceError> {
    let config = DbConfig {
        url: database_url.to_string(),
        ..Default::default()
    };

    establish_connection_with_config(&config).await
}

/// Establishes a connection pool to the database with custom configuration
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, ServiceError> {
    debug!("Configuring database connection with: {:?}", config);

    let mut opt = ConnectOptions::new(config.url.clone());

    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(true);

    gauge!("stockroom_db.max_connections", config.max_connections as f64);

    info!(
        "Connecting to database with max_connections={}",
        config.max_connections
    );

    let db_pool = Database::connect(opt)
        .await
        .map_err(ServiceError::DatabaseError)
        .context("Database connection establishment failed")?;

    info!("Database connection pool established successfully");

    Ok(db_pool)
}

/// Establish DB pool using AppConfig tuning
pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    let db_cfg: DbConfig = cfg.into();
    establish_connection_with_config(&db_cfg).await
}

/// Runs database migrations using the embedded migrator
pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    info!("Running database migrations");
    let start = std::time::Instant::now();

    let result = crate::migrator::Migrator::up(pool, None)
        .await
        .map_err(ServiceError::DatabaseError);

    let elapsed = start.elapsed();
    match &result {
        Ok(_) => info!(
            "Database migrations completed successfully in {:?}",
            elapsed
        ),
        Err(e) => error!("Database migrations failed after {:?}: {}", elapsed, e),
    }

    result
}

/// Checks if the database connection is active
pub async fn check_connection(pool: &DbPool) -> Result<(), ServiceError> {
    debug!("Checking database connection");
    let start = std::time::Instant::now();

    let result = pool.ping().await.map_err(ServiceError::DatabaseError);

    let elapsed = start.elapsed();
    match &result {
        Ok(_) => {
            debug!("Database connection check successful in {:?}", elapsed);
            gauge!(
                "stockroom_db.connection_latency",
                elapsed.as_millis() as f64
            );
        }
        Err(e) => {
            error!(
                "Database connection check failed after {:?}: {}",
                elapsed, e
            );
            counter!("stockroom_db.connection_failures", 1);
        }
    }

    result
}

/// Closes the database connection pool
pub async fn close_pool(pool: DbPool) -> Result<(), ServiceError> {
    info!("Closing database connection pool");

    pool.close().await.map_err(ServiceError::DatabaseError)
}

/// True for errors worth retrying: the connection itself failed, not the
/// statement.
fn is_transient(err: &DbErr) -> bool {
    matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(_))
}

/// True when the statement lost to a unique index, on either backend.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    )
}

/// Runs `f` with bounded retry on connection-class errors.
///
/// Non-transient errors surface immediately as `DatabaseError`; a still
/// failing dependency after the last attempt surfaces as
/// `ServiceUnavailable`.
pub async fn with_transient_retry<F, Fut, T>(operation: &str, mut f: F) -> Result<T, ServiceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let start = std::time::Instant::now();
    let mut attempt: u32 = 1;

    loop {
        match f().await {
            Ok(value) => {
                histogram!(
                    "stockroom_db.operation.duration",
                    start.elapsed(),
                    "operation" => operation.to_string()
                );
                return Ok(value);
            }
            Err(err) if is_transient(&err) && attempt < MAX_TRANSIENT_ATTEMPTS => {
                warn!(
                    operation = %operation,
                    attempt,
                    error = %err,
                    "Transient database error; retrying"
                );
                counter!("stockroom_db.retry", 1, "operation" => operation.to_string());
                tokio::time::sleep(TRANSIENT_RETRY_BACKOFF * attempt).await;
                attempt += 1;
            }
            Err(err) if is_transient(&err) => {
                error!(
                    operation = %operation,
                    attempts = attempt,
                    error = %err,
                    "Database unavailable after retries"
                );
                counter!("stockroom_db.operation.error", 1, "operation" => operation.to_string());
                return Err(ServiceError::ServiceUnavailable(format!(
                    "database unavailable during {}",
                    operation
                )));
            }
            Err(err) => {
                error!(operation = %operation, error = %err, "Database operation failed");
                counter!("stockroom_db.operation.error", 1, "operation" => operation.to_string());
                return Err(ServiceError::db_error(err));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::RuntimeErr;

    #[tokio::test]
    async fn transient_retry_surfaces_unavailable_after_attempts() {
        let mut calls = 0u32;
        let result: Result<(), ServiceError> = with_transient_retry("test_op", || {
            calls += 1;
            async { Err(DbErr::Conn(RuntimeErr::Internal("refused".into()))) }
        })
        .await;

        assert_eq!(calls, MAX_TRANSIENT_ATTEMPTS);
        assert!(matches!(result, Err(ServiceError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn non_transient_errors_do_not_retry() {
        let mut calls = 0u32;
        let result: Result<(), ServiceError> = with_transient_retry("test_op", || {
            calls += 1;
            async { Err(DbErr::Custom("bad statement".into())) }
        })
        .await;

        assert_eq!(calls, 1);
        assert!(matches!(result, Err(ServiceError::DatabaseError(_))));
    }

    #[tokio::test]
    async fn success_passes_through() {
        let result = with_transient_retry("test_op", || async { Ok::<_, DbErr>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
