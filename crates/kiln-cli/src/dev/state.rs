//! Shared state for the development server.
//!
//! Tracks the browsers connected to the reload stream. The state is also the
//! pipeline's [`ReloadSink`]: a task that finishes writing calls
//! [`ReloadSink::reload`] and every connected browser receives the event.

use kiln_pipeline::{Reload, ReloadSink};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Events buffered per client before further events are dropped for it.
const CLIENT_BUFFER: usize = 100;

/// Client connection tracker for Server-Sent Events.
pub type ClientRegistry = Arc<RwLock<HashMap<usize, mpsc::Sender<String>>>>;

/// Shared development server state.
#[derive(Default)]
pub struct DevServerState {
    /// Connected SSE clients
    clients: ClientRegistry,

    /// Next client ID
    next_client_id: AtomicUsize,
}

impl DevServerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new SSE client.
    ///
    /// Returns the client ID and the receiver its events arrive on.
    pub fn register_client(&self) -> (usize, mpsc::Receiver<String>) {
        let id = self.next_client_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(CLIENT_BUFFER);
        self.clients.write().insert(id, tx);
        (id, rx)
    }

    /// Unregister an SSE client.
    pub fn unregister_client(&self, id: usize) {
        self.clients.write().remove(&id);
    }

    /// Get number of connected clients.
    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    /// Send `reload` to every connected client.
    ///
    /// Never waits: a client whose buffer is full misses this event, and a
    /// client whose stream has closed is removed.
    pub fn broadcast(&self, reload: &Reload) {
        let json = match serde_json::to_string(reload) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to encode reload event: {}", e);
                return;
            }
        };

        let clients = self.clients.read().clone();
        let mut closed = Vec::new();

        for (id, tx) in clients {
            match tx.try_send(json.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::debug!("Client {} is behind, dropping reload event", id);
                }
                Err(TrySendError::Closed(_)) => closed.push(id),
            }
        }

        for id in closed {
            tracing::debug!("Client {} disconnected", id);
            self.unregister_client(id);
        }
    }
}

impl ReloadSink for DevServerState {
    fn reload(&self, reload: Reload) {
        tracing::debug!(?reload, clients = self.client_count(), "Broadcasting reload");
        self.broadcast(&reload);
    }
}

/// Shared state handle for passing around the application.
pub type SharedState = Arc<DevServerState>;
