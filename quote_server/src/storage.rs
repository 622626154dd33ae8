//! Persistence of fetched quotes.
//!
//! `QuoteStore` is the seam the request handler writes through. The production
//! implementation, [`MySqlStore`], keeps one `sqlx` MySQL pool for the lifetime
//! of the process and creates the `quotes` table on first use if it is missing.
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use quote_common::{Quote, QuoteError, Result};
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::{Executor, MySql};
use tokio::time::{Instant, timeout, timeout_at};

/// How long startup waits for the table to be created before serving anyway.
const STARTUP_SCHEMA_BUDGET: Duration = Duration::from_secs(1);

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS quotes (
    id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT PRIMARY KEY,
    code LONGTEXT NOT NULL,
    codein LONGTEXT NOT NULL,
    name LONGTEXT NOT NULL,
    high LONGTEXT NOT NULL,
    low LONGTEXT NOT NULL,
    var_bid LONGTEXT NOT NULL,
    pct_change LONGTEXT NOT NULL,
    bid LONGTEXT NOT NULL,
    ask LONGTEXT NOT NULL,
    `timestamp` LONGTEXT NOT NULL,
    create_date LONGTEXT NOT NULL
)
"#;

const INSERT_QUOTE: &str = r#"
INSERT INTO quotes (
    code, codein, name, high, low, var_bid, pct_change, bid, ask, `timestamp`, create_date
)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

/// Write side of quote storage.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Insert `quote` and return the identifier storage assigned to it.
    ///
    /// Implementations must give up once `deadline` has passed.
    async fn insert(&self, quote: &Quote, deadline: Instant) -> Result<u64>;
}

/// MySQL-backed store sharing one connection pool across requests.
pub struct MySqlStore {
    pool: MySqlPool,
    schema_ready: AtomicBool,
}

impl MySqlStore {
    /// Create the pool and try to create the table.
    ///
    /// The pool connects lazily and the startup schema attempt is bounded by
    /// `STARTUP_SCHEMA_BUDGET`, so an unreachable database neither stops nor
    /// stalls startup; the schema is then created by the first insert.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Some(Duration::from_secs(600)))
            .connect_lazy(database_url)
            .map_err(storage_error)?;

        let store = Self {
            pool,
            schema_ready: AtomicBool::new(false),
        };
        match timeout(STARTUP_SCHEMA_BUDGET, store.ensure_schema()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Could not create quotes table at startup: {}", e),
            Err(_) => warn!(
                "Creating quotes table took over {}ms, deferring to first insert",
                STARTUP_SCHEMA_BUDGET.as_millis()
            ),
        }
        Ok(store)
    }

    /// Create the `quotes` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        create_table(&self.pool).await?;
        self.schema_ready.store(true, Ordering::Release);
        info!("quotes table ready");
        Ok(())
    }

    /// Release every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl QuoteStore for MySqlStore {
    async fn insert(&self, quote: &Quote, deadline: Instant) -> Result<u64> {
        if Instant::now() >= deadline {
            warn!("Database deadline expired before acquiring a connection");
            return Err(QuoteError::Timeout("database deadline exceeded".into()));
        }

        let mut conn = timeout_at(deadline, self.pool.acquire())
            .await
            .map_err(|_| QuoteError::Timeout("database connection deadline exceeded".into()))?
            .map_err(storage_error)?;

        if !self.schema_ready.load(Ordering::Acquire) {
            timeout_at(deadline, create_table(&mut *conn))
                .await
                .map_err(|_| QuoteError::Timeout("database schema deadline exceeded".into()))??;
            self.schema_ready.store(true, Ordering::Release);
        }

        if Instant::now() >= deadline {
            warn!("Database deadline expired before insert");
            return Err(QuoteError::Timeout("database deadline exceeded".into()));
        }

        let query = sqlx::query(INSERT_QUOTE)
            .bind(&quote.code)
            .bind(&quote.codein)
            .bind(&quote.name)
            .bind(&quote.high)
            .bind(&quote.low)
            .bind(&quote.var_bid)
            .bind(&quote.pct_change)
            .bind(&quote.bid)
            .bind(&quote.ask)
            .bind(&quote.timestamp)
            .bind(&quote.create_date);

        let done = timeout_at(deadline, query.execute(&mut *conn))
            .await
            .map_err(|_| QuoteError::Timeout("database insert deadline exceeded".into()))?
            .map_err(storage_error)?;

        Ok(done.last_insert_id())
    }
}

async fn create_table<'e, E>(executor: E) -> Result<()>
where
    E: Executor<'e, Database = MySql>,
{
    executor.execute(CREATE_TABLE).await.map_err(storage_error)?;
    Ok(())
}

fn storage_error(e: sqlx::Error) -> QuoteError {
    QuoteError::Storage(e.to_string())
}
