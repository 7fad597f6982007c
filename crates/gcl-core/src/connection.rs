//! A live connection to a gcl backend process.
//!
//! # Construction
//!
//! [`Connection::make`] runs a strictly ordered pipeline and stops at the
//! first failure:
//!
//! 1. Resolve the executable path (configured value or OS search)
//! 2. Validate it with the `--help` probe
//! 3. Persist it to the configuration store
//! 4. Spawn the process with no arguments
//! 5. Wire its output through a [`FrameDecoder`] into a fresh [`EventBus`]
//!
//! # Requests
//!
//! The wire carries no request ids, so a response is simply the next value the
//! backend emits after a request is written. [`Connection::send`] therefore
//! allows one outstanding request at a time; concurrent callers queue.
//!
//! A request that times out still owes a response. The next message the
//! backend emits is then routed to persistent listeners only, so later
//! requests stay paired with their own responses.

use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::bus::{EventBus, ListenerId};
use crate::error::{ConnectionError, ConnectionResult, ProcessError};
use crate::ports::{ChannelEvent, ConfigStore, ConnectionPorts, ProcessChannel, SpawnedProcess};
use crate::resolver::PathResolver;
use crate::wire::FrameDecoder;

/// What the bus carries: a decoded message or a failure.
pub type Delivery = Result<Value, ConnectionError>;

/// Options applied to a connection once it is established.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Upper bound on how long [`Connection::send`] waits for a response.
    /// `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl ConnectOptions {
    /// Set the request deadline.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

/// An established connection. Dropping it tears the process down.
pub struct Connection {
    path: String,
    channel: Arc<dyn ProcessChannel>,
    bus: Arc<EventBus<Delivery>>,
    closed: Arc<AtomicBool>,
    owed: Arc<StdMutex<usize>>,
    pump: JoinHandle<()>,
    request_lock: Mutex<()>,
    request_timeout: Option<Duration>,
}

impl Connection {
    /// Resolve, validate, persist, spawn and wire a new connection.
    pub async fn make(
        store: &dyn ConfigStore,
        ports: &ConnectionPorts,
        options: ConnectOptions,
    ) -> ConnectionResult<Self> {
        let resolver = PathResolver::new(Arc::clone(&ports.search), Arc::clone(&ports.probe));
        let path = resolver.resolve(store).await?;
        let spawned = ports.spawner.spawn(&path, &[]).await?;
        info!(path = %path, "Connected to gcl");
        Ok(Self::from_process(path, spawned, options))
    }

    /// Wire an already spawned process into a connection.
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_process(path: String, spawned: SpawnedProcess, options: ConnectOptions) -> Self {
        let SpawnedProcess { channel, events } = spawned;
        let bus = Arc::new(EventBus::new());
        let closed = Arc::new(AtomicBool::new(false));
        let owed = Arc::new(StdMutex::new(0));
        let pump = tokio::spawn(pump_events(
            events,
            Arc::clone(&bus),
            Arc::clone(&closed),
            Arc::clone(&owed),
        ));

        Self {
            path,
            channel,
            bus,
            closed,
            owed,
            pump,
            request_lock: Mutex::new(()),
            request_timeout: options.request_timeout,
        }
    }

    /// The validated executable path this connection runs.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Live check of the underlying process.
    pub fn is_connected(&self) -> bool {
        self.channel.is_connected()
    }

    /// Ask the process to shut down.
    pub fn disconnect(&self) {
        debug!(path = %self.path, "Disconnecting from gcl");
        self.channel.disconnect();
    }

    /// Write a raw request and wait for the next message from the backend.
    pub async fn send(&self, request: impl AsRef<[u8]>) -> ConnectionResult<Value> {
        let request = request.as_ref();
        let _outstanding = self.request_lock.lock().await;

        // Subscribe before writing so a fast response cannot be missed.
        let (listener, mut response) = self.bus.once();
        if self.closed.load(Ordering::SeqCst) {
            self.bus.off(listener);
            return Err(ProcessError::NotConnected.into());
        }
        if let Err(e) = self.channel.send(request) {
            self.bus.off(listener);
            return Err(e.into());
        }
        debug!(bytes = request.len(), "Request written, awaiting response");

        let received = match self.request_timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut response).await {
                Ok(received) => received,
                Err(_) => {
                    if self.abandon(listener) {
                        warn!(timeout_ms = limit.as_millis(), "Request timed out");
                        return Err(ProcessError::Timeout(limit).into());
                    }
                    // The response was delivered just as the deadline passed
                    response.await
                }
            },
            None => response.await,
        };
        received.unwrap_or_else(|_| Err(ProcessError::NotConnected.into()))
    }

    /// Give up on a pending response. Returns `false` if it was already delivered.
    fn abandon(&self, listener: ListenerId) -> bool {
        let mut owed = self.owed.lock().unwrap_or_else(PoisonError::into_inner);
        if self.bus.off(listener) {
            *owed += 1;
            true
        } else {
            false
        }
    }

    /// Serialize `request` as JSON and [`send`](Self::send) it.
    pub async fn send_json<T: Serialize + ?Sized>(&self, request: &T) -> ConnectionResult<Value> {
        let bytes = serde_json::to_vec(request)
            .map_err(|e| ProcessError::WriteFailed(format!("cannot encode request: {e}")))?;
        self.send(bytes).await
    }

    /// Observe every message and error, including unsolicited output.
    pub fn on_message<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Delivery) + Send + Sync + 'static,
    {
        self.bus.on(listener)
    }

    /// Remove a listener registered with [`on_message`](Self::on_message).
    pub fn off(&self, id: ListenerId) -> bool {
        self.bus.off(id)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.channel.disconnect();
        self.pump.abort();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("path", &self.path)
            .field("connected", &self.channel.is_connected())
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

/// Drain channel events through a decoder into the bus until the stream ends.
async fn pump_events(
    mut events: mpsc::UnboundedReceiver<ChannelEvent>,
    bus: Arc<EventBus<Delivery>>,
    closed: Arc<AtomicBool>,
    owed: Arc<StdMutex<usize>>,
) {
    let mut decoder = FrameDecoder::new();
    while let Some(event) = events.recv().await {
        match event {
            ChannelEvent::Output(chunk) => {
                for message in decoder.feed(&chunk) {
                    // Held across the emit so a timing-out send sees a consistent count
                    let mut owed = owed.lock().unwrap_or_else(PoisonError::into_inner);
                    if *owed > 0 {
                        *owed -= 1;
                        debug!(still_owed = *owed, "Late response to an abandoned request");
                        bus.emit_persistent(&Ok(message));
                    } else {
                        bus.emit(Ok(message));
                    }
                }
            }
            ChannelEvent::Error(e) => {
                debug!(error = %e, "Process error from gcl");
                bus.emit(Err(e.into()));
            }
        }
    }

    if decoder.has_pending() {
        warn!(bytes = decoder.pending().len(), "gcl output ended mid-message");
    }
    debug!("gcl event stream closed");
    closed.store(true, Ordering::SeqCst);
    bus.emit(Err(ProcessError::NotConnected.into()));
}
