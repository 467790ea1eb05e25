//! Document store: a MongoDB client bound to one database.

use mongodb::{
    bson::doc,
    event::{command::CommandEvent, EventHandler},
    options::{ClientOptions, Credential},
    Client, Database,
};
use runtime::DocumentConfig;
use tracing::{debug, info, instrument, trace, warn};

use crate::env::{expand_env_vars, redact_credentials_in_dsn};
use crate::error::DataError;
use crate::hook::{shutdown_hook, ShutdownHook};

pub const DEFAULT_DOCUMENT_URI: &str = "mongodb://localhost:27017";

#[instrument(name = "datasource.document.connect", skip_all, fields(database = %cfg.database))]
pub async fn connect_document(cfg: &DocumentConfig) -> Result<(Database, ShutdownHook), DataError> {
    if cfg.database.trim().is_empty() {
        return Err(DataError::MissingSetting("data.document.database"));
    }

    let uri = match cfg.uri.trim() {
        "" => {
            warn!(uri = DEFAULT_DOCUMENT_URI, "document store uri is empty, using default");
            DEFAULT_DOCUMENT_URI.to_string()
        }
        uri => expand_env_vars(uri)?,
    };

    let mut options = ClientOptions::parse(&uri).await?;
    if let Some(username) = cfg.username.as_deref().filter(|u| !u.is_empty()) {
        let mut credential = Credential::default();
        credential.username = Some(username.to_string());
        credential.password = cfg.password.as_deref().map(expand_env_vars).transpose()?;
        options.credential = Some(credential);
    }
    if options.app_name.is_none() {
        options.app_name = Some("layout".to_string());
    }
    options.command_event_handler = Some(EventHandler::callback(log_command_event));

    let client = Client::with_options(options)?;
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await?;

    info!(uri = %redact_credentials_in_dsn(&uri), "document store connected");

    let database = client.database(cfg.database.trim());
    let hook = shutdown_hook(move || async move {
        client.shutdown().await;
    });
    Ok((database, hook))
}

fn log_command_event(event: CommandEvent) {
    match event {
        CommandEvent::Started(e) => {
            trace!(command = %e.command_name, request_id = e.request_id, "mongo command started")
        }
        CommandEvent::Succeeded(e) => debug!(
            command = %e.command_name,
            request_id = e.request_id,
            duration_ms = e.duration.as_millis() as u64,
            "mongo command succeeded"
        ),
        CommandEvent::Failed(e) => warn!(
            command = %e.command_name,
            request_id = e.request_id,
            error = %e.failure,
            "mongo command failed"
        ),
        _ => {}
    }
}
