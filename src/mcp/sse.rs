//! Server-Sent-Events connection registry
//!
//! Tracks open `GET /mcp` streams and drives their keep-alive pings. Each
//! entry owns the abort handle of its ping task, so removing an entry stops
//! the pings at once.

use std::{
    pin::Pin,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    task::{Context, Poll},
    time::Duration,
};

use chrono::Utc;
use dashmap::DashMap;
use futures_util::Stream;
use serde_json::{json, Value};
use tokio::{
    sync::mpsc,
    task::AbortHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, info};

use crate::domain::listings::now_utc;

const STREAM_BUFFER: usize = 16;

#[derive(Debug)]
struct ConnectionEntry {
    keep_alive: AbortHandle,
}

#[derive(Debug, Clone)]
pub struct ConnectionRegistry {
    connections: Arc<DashMap<String, ConnectionEntry>>,
    sequence: Arc<AtomicU64>,
    ping_interval: Duration,
}

impl ConnectionRegistry {
    pub fn new(ping_interval: Duration) -> Self {
        Self {
            connections: Arc::new(DashMap::new()),
            sequence: Arc::new(AtomicU64::new(0)),
            ping_interval,
        }
    }

    /// Opens a new stream. The `connection` event is queued before the
    /// keep-alive task is spawned, so it always arrives first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn connect(&self) -> ConnectionStream {
        let id = self.next_id();
        let (sender, receiver) = mpsc::channel(STREAM_BUFFER);

        // fresh channel with spare capacity, cannot fail
        let _ = sender.try_send(json!({
            "type": "connection",
            "status": "connected",
            "connectionId": id,
            "timestamp": now_utc(),
        }));

        let keep_alive = tokio::spawn(keep_alive(
            self.clone(),
            id.clone(),
            sender,
            self.ping_interval,
        ))
        .abort_handle();

        self.connections
            .insert(id.clone(), ConnectionEntry { keep_alive });
        info!(connection_id = %id, active = self.len(), "sse client connected");

        ConnectionStream {
            id,
            registry: self.clone(),
            receiver,
        }
    }

    /// Removes a connection and cancels its keep-alive task. Returns whether
    /// the connection was still registered.
    pub fn disconnect(&self, id: &str) -> bool {
        match self.connections.remove(id) {
            Some((_, entry)) => {
                entry.keep_alive.abort();
                info!(connection_id = %id, active = self.len(), "sse client disconnected");
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.connections.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    fn next_id(&self) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("conn-{}-{}", Utc::now().timestamp_millis(), sequence)
    }
}

async fn keep_alive(
    registry: ConnectionRegistry,
    id: String,
    sender: mpsc::Sender<Value>,
    period: Duration,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        if !registry.contains(&id) {
            break;
        }

        let ping = json!({ "type": "ping", "timestamp": now_utc() });
        if sender.send(ping).await.is_err() {
            debug!(connection_id = %id, "sse stream closed before ping");
            registry.disconnect(&id);
            break;
        }
    }
}

/// Event stream for a single connection. Dropping it (the client went away)
/// unregisters the connection.
#[derive(Debug)]
pub struct ConnectionStream {
    id: String,
    registry: ConnectionRegistry,
    receiver: mpsc::Receiver<Value>,
}

impl ConnectionStream {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Stream for ConnectionStream {
    type Item = Value;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for ConnectionStream {
    fn drop(&mut self) {
        self.registry.disconnect(&self.id);
    }
}
