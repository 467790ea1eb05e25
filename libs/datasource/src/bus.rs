//! Message bus: a NATS client with an optional JetStream context.

use async_nats::{connection::State, jetstream, Client, ConnectOptions};
use runtime::BusConfig;
use std::time::Duration;
use svckit::{DomainEvent, EventPublisher};
use tokio_util::task::TaskTracker;
use tracing::{debug, info, instrument, warn};

use crate::env::expand_env_vars;
use crate::error::DataError;
use crate::hook::{shutdown_hook, ShutdownHook};

pub const DEFAULT_CLIENT_NAME: &str = "layout";
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Live bus handle.
#[derive(Clone, Debug)]
pub struct Bus {
    client: Client,
    jetstream: Option<jetstream::Context>,
    in_flight: TaskTracker,
}

impl Bus {
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Present only when requested in config and the server has JetStream enabled.
    pub fn jetstream(&self) -> Option<&jetstream::Context> {
        self.jetstream.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.client.connection_state() == State::Connected
    }
}

#[instrument(name = "datasource.bus.connect", skip_all, fields(addr = %cfg.addr))]
pub async fn connect_bus(cfg: &BusConfig) -> Result<(Bus, ShutdownHook), DataError> {
    let addr = cfg.addr.trim();
    if addr.is_empty() {
        return Err(DataError::MissingSetting("data.bus.addr"));
    }
    let name = match cfg.name.trim() {
        "" => DEFAULT_CLIENT_NAME,
        name => name,
    };

    let mut options = ConnectOptions::new()
        .name(name)
        .max_reconnects(None::<usize>)
        .reconnect_delay_callback(|_attempts| RECONNECT_DELAY)
        .event_callback(|event| async move {
            debug!(%event, "bus connection event");
        });
    if let (Some(user), Some(password)) = (cfg.username.as_deref(), cfg.password.as_deref()) {
        options = options.user_and_password(user.to_string(), expand_env_vars(password)?);
    }

    let client = options
        .connect(addr)
        .await
        .map_err(|e| DataError::Bus(e.to_string()))?;
    // round-trip to the server before reporting success
    client
        .flush()
        .await
        .map_err(|e| DataError::Bus(e.to_string()))?;

    let jetstream = if cfg.jetstream {
        let context = jetstream::new(client.clone());
        match context.query_account().await {
            Ok(_) => Some(context),
            Err(e) => {
                warn!(error = %e, "JetStream requested but unavailable, continuing without it");
                None
            }
        }
    } else {
        None
    };

    info!(name, jetstream = jetstream.is_some(), "bus connected");

    let in_flight = TaskTracker::new();
    let draining = client.clone();
    let settling = in_flight.clone();
    let hook = shutdown_hook(move || async move {
        settle(&settling).await;
        if let Err(e) = draining.drain().await {
            warn!(error = %e, "bus drain failed");
        }
    });
    Ok((
        Bus {
            client,
            jetstream,
            in_flight,
        },
        hook,
    ))
}

/// Refuse new publishes and wait for the ones already started.
async fn settle(in_flight: &TaskTracker) {
    in_flight.close();
    if !in_flight.is_empty() {
        debug!(pending = in_flight.len(), "waiting for in-flight publishes");
    }
    in_flight.wait().await;
}

/// Publishes domain events as JSON on the event's own subject.
///
/// Publishing does not block the caller. Publishes started before the bus
/// shuts down are awaited by the shutdown hook; later ones are dropped with a
/// warning.
#[derive(Clone)]
pub struct BusPublisher {
    client: Client,
    in_flight: TaskTracker,
}

impl BusPublisher {
    pub fn new(bus: &Bus) -> Self {
        Self {
            client: bus.client.clone(),
            in_flight: bus.in_flight.clone(),
        }
    }
}

impl<E: DomainEvent> EventPublisher<E> for BusPublisher {
    fn publish(&self, event: &E) {
        let subject = event.subject();
        if self.in_flight.is_closed() {
            warn!(%subject, "bus is shut down, event dropped");
            return;
        }
        let payload = match serde_json::to_vec(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(%subject, error = %e, "event could not be serialized");
                return;
            }
        };

        let client = self.client.clone();
        self.in_flight.spawn(async move {
            if let Err(e) = client.publish(subject.clone(), payload.into()).await {
                warn!(%subject, error = %e, "event publish failed");
            }
        });
    }
}
