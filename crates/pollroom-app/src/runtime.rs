//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Bridge`]: Sync engine bridge to Client
//! - [`Driver`]: Platform-specific input and rendering
//! - [`ChatService`]: Requests to the collaborator service
//!
//! Everything runs on one task. Requests execute concurrently as futures
//! polled by the loop itself, so a slow poll never blocks input and results
//! are applied one at a time in completion order.

use std::time::Duration;

use futures::{
    FutureExt, StreamExt,
    future::BoxFuture,
    stream::FuturesUnordered,
};
use pollroom_client::{
    ChatService, ClientIdentity, ReadPositionStore, RequestId, Response, ServiceError, SyncConfig,
};

use crate::{App, AppAction, AppEvent, Bridge, Driver, attachment};

type Completion = (RequestId, Result<Response, ServiceError>);

/// Generic runtime that orchestrates App, Bridge, Driver and service.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `S`: Collaborator service
/// - `P`: Read-position store
pub struct Runtime<D, S, P>
where
    D: Driver,
    S: ChatService,
    P: ReadPositionStore,
{
    driver: D,
    service: S,
    app: App,
    bridge: Bridge<P, D::Instant>,
    in_flight: FuturesUnordered<BoxFuture<'static, Completion>>,
    initial_channel: Option<String>,
}

impl<D, S, P> Runtime<D, S, P>
where
    D: Driver,
    S: ChatService,
    P: ReadPositionStore,
{
    /// Create a new runtime.
    pub fn new(
        driver: D,
        service: S,
        identity: ClientIdentity,
        config: SyncConfig,
        positions: P,
    ) -> Self {
        let app = App::new(identity.name.clone());
        let bridge = Bridge::new(identity, config, positions);
        Self {
            driver,
            service,
            app,
            bridge,
            in_flight: FuturesUnordered::new(),
            initial_channel: None,
        }
    }

    /// Join `channel_name` right after start.
    #[must_use]
    pub fn with_initial_channel(mut self, channel_name: impl Into<String>) -> Self {
        self.initial_channel = Some(channel_name.into());
        self
    }

    /// Run the main event loop until the App quits.
    ///
    /// Each cycle waits for whichever comes first:
    /// 1. An input event from the driver
    /// 2. A completed request
    /// 3. The next poll or typing deadline of the client
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(&mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        let events = self.bridge.start(self.driver.now());
        let mut should_quit = self.process_bridge_events(events).await?;

        if let Some(channel_name) = self.initial_channel.take() {
            should_quit |= self.process_actions(vec![AppAction::Join { channel_name }]).await?;
        }

        while !should_quit {
            should_quit = self.process_cycle().await?;
        }

        tracing::info!(in_flight = self.in_flight.len(), "runtime stopped");
        self.driver.stop();
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        let wait = self.until_deadline();

        tokio::select! {
            event = self.driver.poll_event() => {
                match event? {
                    Some(event) => {
                        let actions = self.app.handle(event);
                        self.process_actions(actions).await
                    },
                    None => Ok(false),
                }
            },
            Some((id, result)) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                let events = self.bridge.handle_response(id, result, self.driver.now());
                self.process_bridge_events(events).await
            },
            () = sleep_for(wait) => {
                let events = self.bridge.handle_tick(self.driver.now());
                self.process_bridge_events(events).await
            },
        }
    }

    /// Process actions returned by the App.
    ///
    /// Renders at most once per call. Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;
        let mut needs_render = false;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                let events = match action {
                    AppAction::Render => {
                        needs_render = true;
                        continue;
                    },
                    AppAction::Quit => return Ok(true),
                    AppAction::OpenUrl { url } => match self.driver.open_url(&url) {
                        Ok(()) => continue,
                        Err(e) => {
                            tracing::warn!(%url, error = %e, "failed to open url");
                            vec![AppEvent::Error { message: format!("cannot open {url}: {e}") }]
                        },
                    },
                    AppAction::SendAttachment { kind, path } => {
                        match attachment::load(kind, &path).await {
                            Ok(body) => {
                                let now = self.driver.now();
                                self.bridge.process_app_action(AppAction::Send { body }, now)
                            },
                            Err(e) => {
                                tracing::warn!(path = %path.display(), error = %e, "attachment rejected");
                                vec![AppEvent::Error { message: e.to_string() }]
                            },
                        }
                    },

                    // Sync operations go through the bridge
                    action => {
                        let now = self.driver.now();
                        self.bridge.process_app_action(action, now)
                    },
                };

                for event in events {
                    pending_actions.extend(self.app.handle(event));
                }
            }
            self.dispatch_outgoing();
        }

        if needs_render {
            self.driver.render(&self.app)?;
        }
        Ok(false)
    }

    /// Process events from Bridge back to App.
    async fn process_bridge_events(&mut self, events: Vec<AppEvent>) -> Result<bool, D::Error> {
        self.dispatch_outgoing();

        let mut actions = Vec::new();
        for event in events {
            actions.extend(self.app.handle(event));
        }
        self.process_actions(actions).await
    }

    /// Start every request the client queued.
    fn dispatch_outgoing(&mut self) {
        for (id, request) in self.bridge.take_outgoing() {
            tracing::trace!(id, request = request.name(), "dispatching request");
            let service = self.service.clone();
            self.in_flight.push(async move { (id, service.call(request).await) }.boxed());
        }
    }

    fn until_deadline(&self) -> Option<Duration> {
        let deadline = self.bridge.next_deadline()?;
        let now = self.driver.now();
        Some(if deadline > now { deadline - now } else { Duration::ZERO })
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a reference to the Bridge
    pub fn bridge(&self) -> &Bridge<P, D::Instant> {
        &self.bridge
    }

    /// Get a reference to the Driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Requests currently executing.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

async fn sleep_for(wait: Option<Duration>) {
    match wait {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending().await,
    }
}
