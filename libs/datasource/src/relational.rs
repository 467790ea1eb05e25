//! Relational store: a SeaORM connection pool over sqlx.

use runtime::RelationalConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

use crate::env::{expand_env_vars, redact_credentials_in_dsn};
use crate::error::DataError;
use crate::hook::{shutdown_hook, ShutdownHook};

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    MySql,
    Sqlite,
}

impl DbEngine {
    /// Detect engine by DSN scheme. Credentials in the tail are not inspected.
    pub fn detect(dsn: &str) -> Result<Self, DataError> {
        let s = dsn.trim_start();
        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(Self::Postgres)
        } else if s.starts_with("mysql://") || s.starts_with("mariadb://") {
            Ok(Self::MySql)
        } else if s.starts_with("sqlite:") {
            Ok(Self::Sqlite)
        } else {
            Err(DataError::UnknownDsn(redact_credentials_in_dsn(dsn)))
        }
    }

    /// Map a configured driver name to an engine.
    pub fn from_driver(driver: &str) -> Result<Self, DataError> {
        match driver.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            other => Err(DataError::InvalidSetting {
                key: "data.relational.driver",
                reason: format!("unsupported driver '{other}'"),
            }),
        }
    }
}

/// Live relational handle. Cloning shares the underlying pool.
#[derive(Clone, Debug)]
pub struct DbHandle {
    engine: DbEngine,
    sea: DatabaseConnection,
    dsn: String,
}

impl DbHandle {
    /// Wrap an already-open connection (tests, tools).
    pub fn from_connection(engine: DbEngine, sea: DatabaseConnection) -> Self {
        Self {
            engine,
            sea,
            dsn: String::new(),
        }
    }

    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    pub fn sea(&self) -> &DatabaseConnection {
        &self.sea
    }

    /// Owned connection for repositories; it shares this handle's pool.
    pub fn sea_conn(&self) -> DatabaseConnection {
        self.sea.clone()
    }

    /// DSN with the password masked.
    pub fn redacted_dsn(&self) -> &str {
        &self.dsn
    }
}

/// Open the relational pool described by `cfg`, relative sqlite paths resolve against `home_dir`.
#[instrument(name = "datasource.relational.connect", skip_all, fields(driver = %cfg.driver))]
pub async fn connect_relational(
    cfg: &RelationalConfig,
    home_dir: &Path,
) -> Result<(DbHandle, ShutdownHook), DataError> {
    if cfg.driver.trim().is_empty() {
        return Err(DataError::MissingSetting("data.relational.driver"));
    }
    if cfg.source.trim().is_empty() {
        return Err(DataError::MissingSetting("data.relational.source"));
    }

    let mut dsn = expand_env_vars(cfg.source.trim())?;
    let engine = DbEngine::detect(&dsn)?;
    let configured = DbEngine::from_driver(&cfg.driver)?;
    if configured != engine {
        return Err(DataError::InvalidSetting {
            key: "data.relational.driver",
            reason: format!("driver is {configured:?} but the source is a {engine:?} DSN"),
        });
    }

    let in_memory = engine == DbEngine::Sqlite && is_sqlite_memory(&dsn);
    if engine == DbEngine::Sqlite && !in_memory {
        dsn = absolutize_sqlite_dsn(&dsn, home_dir)?;
    }

    let mut opts = ConnectOptions::new(dsn.clone());
    opts.acquire_timeout(Duration::from_secs(5))
        // statement logging goes through `log` and is bridged into `tracing`
        .sqlx_logging(true);
    // Every connection to an in-memory sqlite database is its own database.
    let max_conns = if in_memory { 1 } else { cfg.max_conns.unwrap_or(10) };
    opts.max_connections(max_conns);

    let sea = Database::connect(opts).await?;
    sea.ping().await?;

    let redacted = redact_credentials_in_dsn(&dsn);
    info!(engine = ?engine, dsn = %redacted, max_conns, "relational store connected");

    let closing = sea.clone();
    let hook = shutdown_hook(move || async move {
        if let Err(e) = closing.close().await {
            tracing::warn!(error = %e, "relational pool did not close cleanly");
        }
    });

    Ok((
        DbHandle {
            engine,
            sea,
            dsn: redacted,
        },
        hook,
    ))
}

fn is_sqlite_memory(dsn: &str) -> bool {
    let lower = dsn.to_ascii_lowercase();
    lower.starts_with("sqlite::memory:") || lower.starts_with("sqlite://:memory:")
}

/// Expand a file sqlite DSN into an absolute-path DSN using `base_dir`, creating parent dirs.
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path) -> Result<String, DataError> {
    let invalid = |reason: &str| DataError::InvalidSetting {
        key: "data.relational.source",
        reason: reason.to_string(),
    };

    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| invalid("sqlite file DSNs must start with sqlite://"))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(invalid("empty sqlite path"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }
    if let Some(dir) = p.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    if let Some(q) = query {
        out.push('?');
        out.push_str(q);
    }
    Ok(out)
}
