//! Cache: a multiplexed, auto-reconnecting Redis connection.

use redis::aio::ConnectionManager;
use runtime::CacheConfig;
use tracing::{debug, info, instrument};

use crate::env::expand_env_vars;
use crate::error::DataError;
use crate::hook::{shutdown_hook, ShutdownHook};

/// Open and ping the cache.
///
/// `ConnectionManager` has no explicit close. The socket is released when the
/// last clone is dropped, which for the handle held by `Data` means when `Data`
/// itself is dropped. The returned hook only marks the cache as closed.
#[instrument(name = "datasource.cache.connect", skip_all, fields(addr = %cfg.addr))]
pub async fn connect_cache(cfg: &CacheConfig) -> Result<(ConnectionManager, ShutdownHook), DataError> {
    let url = cache_url(cfg)?;

    let client = redis::Client::open(url.as_str())?;
    let manager = ConnectionManager::new(client).await?;
    ping(&manager).await?;

    info!(network = %network_of(cfg), "cache connected");

    let hook = shutdown_hook(|| async {
        debug!("cache connection is released when the data handle is dropped");
    });
    Ok((manager, hook))
}

pub(crate) async fn ping(manager: &ConnectionManager) -> Result<(), DataError> {
    let mut conn = manager.clone();
    let _: String = redis::cmd("PING").query_async(&mut conn).await?;
    Ok(())
}

fn network_of(cfg: &CacheConfig) -> &str {
    match cfg.network.trim() {
        "" => "tcp",
        other => other,
    }
}

/// Build the client URL from `addr`, `network` and the optional password.
fn cache_url(cfg: &CacheConfig) -> Result<url::Url, DataError> {
    let addr = cfg.addr.trim();
    if addr.is_empty() {
        return Err(DataError::MissingSetting("data.cache.addr"));
    }

    let raw = match network_of(cfg) {
        "tcp" if addr.contains("://") => addr.to_string(),
        "tcp" => format!("redis://{addr}"),
        "unix" => format!("redis+unix://{addr}"),
        other => {
            return Err(DataError::InvalidSetting {
                key: "data.cache.network",
                reason: format!("unsupported network '{other}', expected tcp or unix"),
            })
        }
    };
    let mut url = url::Url::parse(&raw).map_err(|e| DataError::InvalidSetting {
        key: "data.cache.addr",
        reason: e.to_string(),
    })?;

    if let Some(password) = cfg.password.as_deref().filter(|p| !p.is_empty()) {
        let password = expand_env_vars(password)?;
        if url.scheme() == "redis+unix" {
            url.query_pairs_mut().append_pair("pass", &password);
        } else if url.set_password(Some(&password)).is_err() {
            return Err(DataError::InvalidSetting {
                key: "data.cache.password",
                reason: "address does not accept credentials".to_string(),
            });
        }
    }
    Ok(url)
}
