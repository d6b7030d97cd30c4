//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`pollroom_app::Runtime`] orchestration code runs in both production and
//! simulation.
//!
//! Input is scripted through a [`SimInput`] handle; what the driver observed
//! (renders, opened URLs, invariant snapshots) is read back through a
//! [`SimObserver`].

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use pollroom_app::{App, AppEvent, Driver, KeyInput};
use pollroom_client::{MemoryReadPositions, ReadPositionStore};
use tokio::sync::mpsc;

use crate::invariants::{ClientSnapshot, InvariantRegistry, SystemSnapshot};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// State shared between the driver and its observer.
#[derive(Debug, Default)]
struct Observed {
    renders: usize,
    opened: Vec<String>,
    last: Option<ClientSnapshot>,
}

/// Simulation driver for deterministic testing.
///
/// Implements [`Driver`] so the production [`pollroom_app::Runtime`] runs
/// against scripted input and virtual time.
pub struct SimDriver {
    events: mpsc::UnboundedReceiver<AppEvent>,
    observed: Arc<Mutex<Observed>>,
    invariants: Option<InvariantRegistry>,
    positions: Option<MemoryReadPositions>,
    refuse_urls: bool,
}

/// Handle for scripting input into a [`SimDriver`].
#[derive(Clone)]
pub struct SimInput {
    events: mpsc::UnboundedSender<AppEvent>,
}

/// Read-only view of what a [`SimDriver`] observed.
#[derive(Clone)]
pub struct SimObserver {
    observed: Arc<Mutex<Observed>>,
}

impl SimDriver {
    /// Create a driver with its input handle.
    pub fn new() -> (Self, SimInput) {
        let (tx, rx) = mpsc::unbounded_channel();
        let driver = Self {
            events: rx,
            observed: Arc::new(Mutex::new(Observed::default())),
            invariants: None,
            positions: None,
            refuse_urls: false,
        };
        (driver, SimInput { events: tx })
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// Track the read positions persisted in `positions`.
    #[must_use]
    pub fn with_positions(mut self, positions: MemoryReadPositions) -> Self {
        self.positions = Some(positions);
        self
    }

    /// Fail every `open_url` call.
    #[must_use]
    pub fn refusing_urls(mut self) -> Self {
        self.refuse_urls = true;
        self
    }

    /// Observer sharing this driver's observations.
    pub fn observer(&self) -> SimObserver {
        SimObserver { observed: Arc::clone(&self.observed) }
    }

    fn observed(&self) -> MutexGuard<'_, Observed> {
        self.observed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot `app`, extending the read history of the previous snapshot.
    fn snapshot(&self, app: &App) -> ClientSnapshot {
        let mut snapshot = ClientSnapshot::from_app(app);
        if let Some(previous) = &self.observed().last {
            snapshot.read_history = previous.read_history.clone();
        }

        let persisted = match (&self.positions, snapshot.active_channel) {
            (Some(positions), Some(channel_id)) => {
                positions.load(channel_id).ok().flatten().map(|id| (channel_id, id))
            },
            _ => None,
        };
        if let Some((channel_id, message_id)) = persisted {
            snapshot.record_read(channel_id, message_id);
        }
        snapshot
    }
}

impl SimInput {
    /// Inject an `AppEvent`.
    pub fn send(&self, event: AppEvent) {
        // The runtime may already be gone; nothing left to drive then.
        let _ = self.events.send(event);
    }

    /// Inject a key press.
    pub fn key(&self, key: KeyInput) {
        self.send(AppEvent::Key(key));
    }

    /// Type `line` and press Enter.
    pub fn submit(&self, line: &str) {
        self.type_text(line);
        self.key(KeyInput::Enter);
    }

    /// Type `text` without submitting.
    pub fn type_text(&self, text: &str) {
        for c in text.chars() {
            self.key(KeyInput::Char(c));
        }
    }

    /// Stop the runtime.
    pub fn shutdown(&self) {
        self.send(AppEvent::Shutdown);
    }
}

impl SimObserver {
    fn observed(&self) -> MutexGuard<'_, Observed> {
        self.observed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of renders so far.
    pub fn renders(&self) -> usize {
        self.observed().renders
    }

    /// URLs handed to the external viewer.
    pub fn opened_urls(&self) -> Vec<String> {
        self.observed().opened.clone()
    }

    /// Snapshot taken at the last render.
    pub fn last_snapshot(&self) -> Option<ClientSnapshot> {
        self.observed().last.clone()
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = tokio::time::Instant;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        Ok(Some(self.events.recv().await.unwrap_or(AppEvent::Shutdown)))
    }

    fn now(&self) -> Self::Instant {
        tokio::time::Instant::now()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        let snapshot = self.snapshot(app);
        if let Some(registry) = &self.invariants {
            let renders = self.observed().renders;
            let state = SystemSnapshot::single(snapshot.clone());
            registry.assert_all(&state, &format!("at render {renders}"));
        }

        let mut observed = self.observed();
        observed.renders += 1;
        observed.last = Some(snapshot);
        Ok(())
    }

    fn open_url(&mut self, url: &str) -> Result<(), Self::Error> {
        if self.refuse_urls {
            return Err(SimDriverError(format!("no viewer for {url}")));
        }
        self.observed().opened.push(url.to_string());
        Ok(())
    }

    fn stop(&mut self) {
        self.events.close();
    }
}
