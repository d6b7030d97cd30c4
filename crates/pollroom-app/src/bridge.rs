//! Client-to-Application translation layer.
//!
//! The [`Bridge`] wraps the sans-IO [`pollroom_client::Client`] and adapts it
//! to the application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts [`crate::AppAction`]s into [`ClientEvent`]s.
//! - Accumulates outgoing requests to be executed by the runtime.
//! - Converts [`ClientAction`]s back into [`crate::AppEvent`]s to update the
//!   UI, reading the decoded timeline from the client once per batch.
//! - Passes time through generically so the same code runs with real and
//!   virtual clocks.

use pollroom_client::{
    Client, ClientAction, ClientError, ClientEvent, ClientIdentity, Notice, ReadPositionStore,
    Request, RequestId, Response, ServiceError, SyncConfig,
};
use pollroom_core::Timestamp;

use crate::{AppAction, AppEvent};

/// Bridge between App and the sync engine.
///
/// Generic over the read-position store and the instant type to support both
/// production and simulation.
pub struct Bridge<P: ReadPositionStore, I: Timestamp> {
    client: Client<P, I>,
    outgoing: Vec<(RequestId, Request)>,
}

impl<P: ReadPositionStore, I: Timestamp> Bridge<P, I> {
    /// Create a Bridge around a fresh client.
    pub fn new(identity: ClientIdentity, config: SyncConfig, positions: P) -> Self {
        Self { client: Client::new(identity, config, positions), outgoing: Vec::new() }
    }

    /// Underlying client, for inspection.
    pub fn client(&self) -> &Client<P, I> {
        &self.client
    }

    /// Start polling. The view receives the initial channel list right away.
    pub fn start(&mut self, now: I) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Start { now });
        let mut events =
            vec![AppEvent::Channels { channels: self.client.directory().channels().to_vec() }];
        events.extend(self.handle_client_result(result));
        events
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction, now: I) -> Vec<AppEvent> {
        let event = match action {
            AppAction::Join { channel_name } => ClientEvent::Join { channel_name },
            AppAction::CreateChannel { name, members } => {
                ClientEvent::CreateChannel { name, members }
            },
            AppAction::DeleteChannel { channel_id } => ClientEvent::DeleteChannel { channel_id },
            AppAction::SelectChannel { channel_id } => {
                ClientEvent::SelectChannel { channel_id, now }
            },
            AppAction::Send { body } => ClientEvent::Submit { body },
            AppAction::DeleteMessage { message_id } => ClientEvent::DeleteMessage { message_id },
            AppAction::StartMeeting { url } => ClientEvent::StartMeeting { url },
            AppAction::InputChanged => ClientEvent::InputChanged { now },
            AppAction::Scrolled { distance_from_bottom } => {
                ClientEvent::Scrolled { distance_from_bottom }
            },
            AppAction::JumpToLatest => ClientEvent::JumpToLatest,
            AppAction::Render
            | AppAction::Quit
            | AppAction::SendAttachment { .. }
            | AppAction::OpenUrl { .. } => return vec![],
        };
        let result = self.client.handle(event);
        self.handle_client_result(result)
    }

    /// Feed back the outcome of a request.
    pub fn handle_response(
        &mut self,
        id: RequestId,
        result: Result<Response, ServiceError>,
        now: I,
    ) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Response { id, result, now });
        self.handle_client_result(result)
    }

    /// Process a time tick.
    pub fn handle_tick(&mut self, now: I) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Tick { now });
        self.handle_client_result(result)
    }

    /// Earliest instant at which a tick has work to do.
    pub fn next_deadline(&self) -> Option<I> {
        self.client.next_deadline()
    }

    /// Take pending outgoing requests.
    pub fn take_outgoing(&mut self) -> Vec<(RequestId, Request)> {
        std::mem::take(&mut self.outgoing)
    }

    fn handle_client_result(
        &mut self,
        result: Result<Vec<ClientAction>, ClientError>,
    ) -> Vec<AppEvent> {
        match result {
            Ok(actions) => self.process_client_actions(actions),
            Err(e @ ClientError::NotPermitted { .. }) => {
                vec![AppEvent::Notice(Notice::Alert(e.to_string()))]
            },
            Err(e) => vec![AppEvent::Error { message: e.to_string() }],
        }
    }

    fn process_client_actions(&mut self, actions: Vec<ClientAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();
        let mut timeline_sent = false;

        for action in actions {
            match action {
                ClientAction::Send { id, request } => {
                    self.outgoing.push((id, request));
                },
                // The snapshot already reflects the whole batch.
                ClientAction::TimelineChanged => {
                    if !timeline_sent {
                        timeline_sent = true;
                        events.push(AppEvent::Timeline(self.client.timeline()));
                    }
                },
                ClientAction::UnreadChanged { count } => {
                    events.push(AppEvent::Unread { count });
                },
                ClientAction::ScrollToBottom => {
                    events.push(AppEvent::ScrollToBottom);
                },
                ClientAction::ScrollToMessage { message_id } => {
                    events.push(AppEvent::ScrollToMessage { message_id });
                },
                ClientAction::TypingChanged { names } => {
                    events.push(AppEvent::Typing { names });
                },
                ClientAction::PresenceChanged(snapshot) => {
                    events.push(AppEvent::Presence(snapshot));
                },
                ClientAction::ChannelsChanged => {
                    let channels = self.client.directory().channels().to_vec();
                    events.push(AppEvent::Channels { channels });
                },
                ClientAction::ChannelActivated { channel_id } => {
                    let name = self
                        .client
                        .directory()
                        .get(channel_id)
                        .map_or_else(|| format!("#{channel_id}"), |c| c.name.clone());
                    events.push(AppEvent::ChannelActivated { channel_id, name });
                },
                ClientAction::Notice(notice) => {
                    events.push(AppEvent::Notice(notice));
                },
            }
        }

        events
    }
}
