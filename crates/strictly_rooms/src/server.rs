//! WebSocket server wiring: router, per-connection tasks and background timers.

use crate::config::ServerConfig;
use crate::hub::{ConnectionId, Hub, HubSettings};
use crate::protocol::{ClientMessage, ServerMessage};
use crate::random::RandomSource;
use crate::scheduler::{GraceTimer, TokioScheduler};
use axum::{
    Json, Router,
    body::Body,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::Request,
    response::Response,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tracing::{debug, info, instrument, warn};

/// The hub behind the lock every connection task shares.
pub type SharedHub = Arc<Mutex<Hub>>;

/// Locks the hub. A panic in another holder does not make the rooms unusable.
pub fn lock(hub: &Mutex<Hub>) -> MutexGuard<'_, Hub> {
    hub.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Builds a hub with tokio timers, returning the channel its timers fire into.
#[instrument(skip(rng))]
pub fn shared_hub(
    settings: HubSettings,
    rng: Box<dyn RandomSource>,
) -> (SharedHub, mpsc::UnboundedReceiver<GraceTimer>) {
    let (scheduler, fired) = TokioScheduler::new();
    let hub = Hub::new(rng, Box::new(scheduler), settings);
    (Arc::new(Mutex::new(hub)), fired)
}

/// Feeds fired grace timers into the hub until the scheduler goes away.
#[instrument(skip_all)]
pub fn spawn_grace_drain(
    hub: SharedHub,
    mut fired: mpsc::UnboundedReceiver<GraceTimer>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(timer) = fired.recv().await {
            lock(&hub).expire_grace(timer);
        }
        debug!("Grace timer channel closed");
    })
}

/// Sweeps idle rooms every `period` for as long as the task lives.
#[instrument(skip(hub))]
pub fn spawn_sweeper(hub: SharedHub, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval(period);
        ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticks.tick().await;
        loop {
            ticks.tick().await;
            let evicted = lock(&hub).sweep(Instant::now());
            if evicted > 0 {
                info!(evicted, "Inactivity sweep");
            }
        }
    })
}

/// Router with the WebSocket endpoint and a health check.
#[instrument(skip(hub))]
pub fn router(hub: SharedHub) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().map_request(|req: Request<Body>| {
            debug!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(hub)
}

/// Runs the server until Ctrl+C.
#[instrument(skip(config, rng), fields(host = %config.host(), port = config.port()))]
pub async fn serve(config: ServerConfig, rng: Box<dyn RandomSource>) -> anyhow::Result<()> {
    let (hub, fired) = shared_hub(config.hub_settings(), rng);
    let grace = spawn_grace_drain(hub.clone(), fired);
    let sweeper = spawn_sweeper(hub.clone(), config.sweep_interval());

    let app = router(hub);
    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port())).await?;
    info!("✅ Server ready at ws://{}/ws", listener.local_addr()?);

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    sweeper.abort();
    grace.abort();
    info!("Server stopped");
    result?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => warn!(error = %e, "Failed to listen for Ctrl+C"),
    }
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    rooms: usize,
    connections: usize,
}

async fn health(State(hub): State<SharedHub>) -> Json<Health> {
    let hub = lock(&hub);
    Json(Health {
        status: "ok",
        rooms: hub.room_count(),
        connections: hub.connection_count(),
    })
}

async fn ws_handler(ws: WebSocketUpgrade, State(hub): State<SharedHub>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

/// Parses one text frame and hands it to the hub. Malformed frames are dropped.
pub fn dispatch_text(hub: &Mutex<Hub>, conn: ConnectionId, text: &str) {
    if let Some(msg) = ClientMessage::parse(text) {
        lock(hub).handle(conn, msg, Instant::now());
    }
}

/// Drives one WebSocket: a writer task drains the outbound channel while
/// this task reads frames until the peer goes away.
#[instrument(skip_all)]
async fn handle_socket(socket: WebSocket, hub: SharedHub) {
    let (outbound, mut queued) = mpsc::unbounded_channel::<ServerMessage>();
    let conn = lock(&hub).connect(outbound);
    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(msg) = queued.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "Failed to encode outbound message");
                    continue;
                }
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => dispatch_text(&hub, conn, text.as_str()),
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(conn = %conn, error = %e, "WebSocket read failed");
                break;
            }
        }
    }

    lock(&hub).disconnect(conn);
    writer.abort();
}
