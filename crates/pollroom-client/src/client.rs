//! Client state machine.
//!
//! The `Client` owns everything the user sees for the active channel and
//! reconciles it with poll results that may arrive late, out of order, or for
//! a channel that is no longer active.

use std::collections::HashMap;

use pollroom_core::{
    Body, Channel, ChannelId, GENERAL_CHANNEL_ID, MediaError, Message, MessageId, PresenceSnapshot,
    Timestamp,
};

use crate::{
    Acceptance, AnchorDecision, ChannelDirectory, ClientAction, ClientError, ClientEvent, Divider,
    FirstFetch, MessageStore, Notice, PollKind, PresenceTracker, ReadPositionStore, ReadTracker,
    Request, RequestId, RequestTag, Response, ScrollAnchor, ServiceError, SyncConfig, SyncLoop,
    TypingDebouncer,
};

/// Client identity.
///
/// Pollroom sessions are anonymous until a display name is known. Without
/// one the client sends no typing signals and can only delete messages in
/// channels it administers.
#[derive(Debug, Clone, Default)]
pub struct ClientIdentity {
    /// Display name used as message author.
    pub name: Option<String>,
}

impl ClientIdentity {
    /// Identity with a known display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()) }
    }

    /// Anonymous identity.
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// A message prepared for presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    /// Message as returned by the service.
    pub message: Message,
    /// Decoded body.
    pub body: Body,
    /// Authored by the local user.
    pub is_own: bool,
}

/// Visible messages of the active channel plus the unread divider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    /// Messages, ascending by id.
    pub entries: Vec<TimelineEntry>,
    /// Unread divider, if anything is unread.
    pub divider: Option<Divider>,
}

/// What an in-flight request was for.
#[derive(Debug, Clone)]
enum Pending {
    Poll(PollKind),
    Join,
    CreateChannel { name: String },
    DeleteChannel { channel_id: ChannelId },
    Post { channel_id: ChannelId },
    DeleteMessage { channel_id: ChannelId, message_id: MessageId },
    Typing,
    StartMeeting { channel_id: ChannelId, url: String },
}

#[derive(Debug, Clone)]
struct InFlight {
    tag: RequestTag,
    pending: Pending,
}

/// Polling chat client.
///
/// Generic over the read-position store and the instant type so that tests
/// and the simulation harness can substitute memory storage and virtual time.
pub struct Client<S: ReadPositionStore, I: Timestamp = std::time::Instant> {
    identity: ClientIdentity,
    positions: S,
    sync: SyncLoop<I>,
    directory: ChannelDirectory,
    store: MessageStore,
    read: ReadTracker,
    anchor: ScrollAnchor,
    typing: TypingDebouncer<I>,
    presence: PresenceTracker,
    in_flight: HashMap<RequestId, InFlight>,
}

impl<S: ReadPositionStore, I: Timestamp> Client<S, I> {
    /// Create an idle client. Nothing happens until [`ClientEvent::Start`].
    pub fn new(identity: ClientIdentity, config: SyncConfig, positions: S) -> Self {
        Self {
            identity,
            positions,
            sync: SyncLoop::new(config),
            directory: ChannelDirectory::new(),
            store: MessageStore::new(),
            read: ReadTracker::default(),
            anchor: ScrollAnchor::new(config.anchor_threshold),
            typing: TypingDebouncer::new(config.typing_quiet_period),
            presence: PresenceTracker::new(),
            in_flight: HashMap::new(),
        }
    }

    /// Local display name, if known.
    pub fn name(&self) -> Option<&str> {
        self.identity.name.as_deref()
    }

    /// Active channel.
    pub fn active_channel(&self) -> Option<ChannelId> {
        self.sync.active()
    }

    /// Joined channels.
    pub fn directory(&self) -> &ChannelDirectory {
        &self.directory
    }

    /// Visible messages of the active channel.
    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    /// Messages counted as unread.
    pub fn unread_count(&self) -> usize {
        self.read.unread_count()
    }

    /// Current read position of the active channel.
    pub fn last_read(&self) -> Option<MessageId> {
        self.read.last_read()
    }

    /// Whether the viewer is anchored to the newest message.
    pub fn is_at_bottom(&self) -> bool {
        self.anchor.is_at_bottom()
    }

    /// Distance from the bottom still classified as at the bottom.
    pub fn anchor_threshold(&self) -> u32 {
        self.anchor.threshold()
    }

    /// Other people typing in the active channel.
    pub fn typing(&self) -> &[String] {
        self.presence.typing()
    }

    /// Presence of the active channel.
    pub fn presence(&self) -> &PresenceSnapshot {
        self.presence.snapshot()
    }

    /// Number of requests awaiting a response.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Earliest instant at which a [`ClientEvent::Tick`] has work to do.
    pub fn next_deadline(&self) -> Option<I> {
        match (self.sync.next_deadline(), self.typing.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Visible messages decoded for presentation.
    pub fn timeline(&self) -> Timeline {
        let own = self.name();
        let entries = self
            .store
            .messages()
            .iter()
            .map(|message| TimelineEntry {
                body: Body::decode(&message.body),
                is_own: own == Some(message.author.as_str()),
                message: message.clone(),
            })
            .collect();

        Timeline { entries, divider: self.read.divider(&self.store) }
    }

    /// Process an event and return resulting actions.
    ///
    /// # Errors
    ///
    /// Rejected user intents (unknown channel, missing permission, invalid
    /// payload). Nothing has been sent when an error is returned.
    pub fn handle(&mut self, event: ClientEvent<I>) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::Start { now } => Ok(self.handle_start(now)),
            ClientEvent::Tick { now } => Ok(self.handle_tick(now)),
            ClientEvent::Join { channel_name } => self.handle_join(channel_name),
            ClientEvent::SelectChannel { channel_id, now } => {
                self.handle_select_channel(channel_id, now)
            },
            ClientEvent::CreateChannel { name, members } => {
                self.handle_create_channel(name, members)
            },
            ClientEvent::DeleteChannel { channel_id } => self.handle_delete_channel(channel_id),
            ClientEvent::InputChanged { now } => Ok(self.handle_input_changed(now)),
            ClientEvent::Submit { body } => self.handle_submit(body),
            ClientEvent::DeleteMessage { message_id } => self.handle_delete_message(message_id),
            ClientEvent::StartMeeting { url } => self.handle_start_meeting(&url),
            ClientEvent::Scrolled { distance_from_bottom } => {
                Ok(self.handle_scrolled(distance_from_bottom))
            },
            ClientEvent::JumpToLatest => Ok(self.handle_jump_to_latest()),
            ClientEvent::Response { id, result, now } => Ok(self.handle_response(id, result, now)),
        }
    }

    fn handle_start(&mut self, now: I) -> Vec<ClientAction> {
        tracing::info!(name = ?self.identity.name, "client started");
        self.sync.start(now);
        self.activate(GENERAL_CHANNEL_ID, now)
    }

    fn handle_tick(&mut self, now: I) -> Vec<ClientAction> {
        let mut actions = self.poll_due(now);
        if let Some(signal) = self.typing.poll(now) {
            actions.push(self.send_typing(signal.channel_id, signal.is_typing));
        }
        actions
    }

    fn handle_join(&mut self, channel_name: String) -> Result<Vec<ClientAction>, ClientError> {
        let channel_name = channel_name.trim().to_string();
        if channel_name.is_empty() {
            return Err(ClientError::EmptyChannelName);
        }
        Ok(vec![self.send(Request::Join { channel_name }, Pending::Join)])
    }

    fn handle_select_channel(
        &mut self,
        channel_id: ChannelId,
        now: I,
    ) -> Result<Vec<ClientAction>, ClientError> {
        if !self.directory.contains(channel_id) {
            return Err(ClientError::UnknownChannel { channel_id });
        }
        if self.active_channel() == Some(channel_id) {
            return Ok(Vec::new());
        }
        Ok(self.activate(channel_id, now))
    }

    fn handle_create_channel(
        &mut self,
        name: String,
        members: Vec<String>,
    ) -> Result<Vec<ClientAction>, ClientError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ClientError::EmptyChannelName);
        }
        let pending = Pending::CreateChannel { name: name.clone() };
        Ok(vec![self.send(Request::CreateChannel { name, members }, pending)])
    }

    fn handle_delete_channel(
        &mut self,
        channel_id: ChannelId,
    ) -> Result<Vec<ClientAction>, ClientError> {
        if !self.directory.contains(channel_id) {
            return Err(ClientError::UnknownChannel { channel_id });
        }
        if !self.directory.can_delete(channel_id) {
            return Err(ClientError::NotPermitted { action: "delete this channel" });
        }
        Ok(vec![
            self.send(Request::DeleteChannel { channel_id }, Pending::DeleteChannel { channel_id }),
        ])
    }

    fn handle_input_changed(&mut self, now: I) -> Vec<ClientAction> {
        let Some(channel_id) = self.active_channel() else {
            return Vec::new();
        };
        if self.identity.name.is_none() {
            return Vec::new();
        }

        self.typing
            .keystroke(channel_id, now)
            .into_iter()
            .map(|signal| self.send_typing(signal.channel_id, signal.is_typing))
            .collect()
    }

    fn handle_submit(&mut self, body: Body) -> Result<Vec<ClientAction>, ClientError> {
        let channel_id = self.active_channel().ok_or(ClientError::NoActiveChannel)?;
        if let Body::Text(text) = &body {
            if text.trim().is_empty() {
                return Err(MediaError::EmptyText.into());
            }
        }

        let mut actions = self.flush_typing();
        actions.push(self.send(
            Request::PostMessage { channel_id, body: body.encode() },
            Pending::Post { channel_id },
        ));
        Ok(actions)
    }

    fn handle_delete_message(
        &mut self,
        message_id: MessageId,
    ) -> Result<Vec<ClientAction>, ClientError> {
        let channel_id = self.active_channel().ok_or(ClientError::NoActiveChannel)?;
        let message =
            self.store.get(message_id).ok_or(ClientError::UnknownMessage { message_id })?;

        let is_author = self.name() == Some(message.author.as_str());
        if !is_author && !self.directory.is_admin(channel_id) {
            return Err(ClientError::NotPermitted { action: "delete this message" });
        }

        self.store.begin_delete(message_id);
        tracing::debug!(channel_id, message_id, "message removed pending delete");

        Ok(vec![
            self.send(
                Request::DeleteMessage { channel_id, message_id },
                Pending::DeleteMessage { channel_id, message_id },
            ),
            ClientAction::TimelineChanged,
        ])
    }

    fn handle_start_meeting(&mut self, url: &str) -> Result<Vec<ClientAction>, ClientError> {
        let channel_id = self.active_channel().ok_or(ClientError::NoActiveChannel)?;
        let url = Body::meeting_start(url)?.payload().to_string();

        Ok(vec![self.send(
            Request::StartMeeting { channel_id, url: url.clone() },
            Pending::StartMeeting { channel_id, url },
        )])
    }

    fn handle_scrolled(&mut self, distance_from_bottom: u32) -> Vec<ClientAction> {
        if self.anchor.observe(distance_from_bottom) {
            self.read_to_newest()
        } else {
            Vec::new()
        }
    }

    fn handle_jump_to_latest(&mut self) -> Vec<ClientAction> {
        self.anchor.pin();
        let mut actions = vec![ClientAction::ScrollToBottom];
        actions.extend(self.read_to_newest());
        actions
    }

    fn handle_response(
        &mut self,
        id: RequestId,
        result: Result<Response, ServiceError>,
        now: I,
    ) -> Vec<ClientAction> {
        let Some(InFlight { tag, pending }) = self.in_flight.remove(&id) else {
            tracing::debug!(id, "response for unknown request");
            return Vec::new();
        };

        match pending {
            Pending::Poll(kind) => self.on_poll(kind, tag, result, now),
            Pending::Join => self.on_join(result, now),
            Pending::CreateChannel { name } => self.on_channel_created(name, result, now),
            Pending::DeleteChannel { channel_id } => {
                self.on_channel_deleted(channel_id, result, now)
            },
            Pending::Post { channel_id } => self.on_posted(channel_id, result, now),
            Pending::DeleteMessage { channel_id, message_id } => {
                self.on_message_deleted(channel_id, message_id, result)
            },
            Pending::Typing => {
                if let Err(e) = result {
                    tracing::debug!(error = %e, "typing signal failed");
                }
                Vec::new()
            },
            Pending::StartMeeting { channel_id, url } => {
                self.on_meeting_started(channel_id, url, result, now)
            },
        }
    }

    fn on_poll(
        &mut self,
        kind: PollKind,
        tag: RequestTag,
        result: Result<Response, ServiceError>,
        now: I,
    ) -> Vec<ClientAction> {
        let response = match result {
            Ok(response) => response,
            Err(e) if kind.is_channel_scoped() && tag.channel_id != self.active_channel() => {
                tracing::debug!(?kind, error = %e, "poll for previous channel failed");
                return Vec::new();
            },
            Err(e) => {
                tracing::warn!(?kind, error = %e, "poll failed");
                return vec![ClientAction::Notice(Notice::Banner(format!(
                    "Could not refresh {}: {e}",
                    poll_subject(kind)
                )))];
            },
        };

        if let Acceptance::Stale { reason } = self.sync.accept(kind, tag) {
            tracing::debug!(?kind, id = tag.id, ?reason, "discarding stale poll result");
            return Vec::new();
        }

        match (kind, response) {
            (PollKind::Messages, Response::Messages(page)) => {
                let mut actions = Vec::new();
                if self.presence.apply_typing(page.typing, self.identity.name.as_deref()) {
                    actions
                        .push(ClientAction::TypingChanged { names: self.presence.typing().to_vec() });
                }
                actions.extend(self.apply_messages(page.messages));
                actions
            },
            (PollKind::Presence, Response::Presence(snapshot)) => {
                if self.presence.apply(snapshot) {
                    vec![ClientAction::PresenceChanged(self.presence.snapshot().clone())]
                } else {
                    Vec::new()
                }
            },
            (PollKind::Channels, Response::Channels(channels)) => {
                self.apply_channels(channels, now)
            },
            (kind, other) => {
                tracing::warn!(?kind, response = ?other, "mismatched poll response");
                Vec::new()
            },
        }
    }

    fn apply_messages(&mut self, page: Vec<Message>) -> Vec<ClientAction> {
        let Some(channel_id) = self.active_channel() else {
            return Vec::new();
        };
        let outcome = self.store.merge(page);
        let mut actions = Vec::new();

        if self.read.is_first_fetch() {
            let (opening, advanced) = self.read.first_fetch(&self.store);
            if let Some(id) = advanced {
                self.persist(channel_id, id);
            }
            actions.push(ClientAction::TimelineChanged);
            match opening {
                FirstFetch::CaughtUp => {
                    self.anchor.pin();
                    actions.push(ClientAction::ScrollToBottom);
                },
                FirstFetch::OpenAtDivider { after, unread } => {
                    self.anchor.release();
                    // The jump comes last; the view reports where it landed.
                    actions.push(ClientAction::UnreadChanged { count: unread });
                    actions.push(ClientAction::ScrollToMessage { message_id: after });
                },
            }
            return actions;
        }

        let fresh = self.read.observe(&self.store, &outcome.added);
        if outcome.changed {
            actions.push(ClientAction::TimelineChanged);
        }
        if fresh == 0 {
            return actions;
        }

        let newest_is_own = self
            .store
            .newest()
            .is_some_and(|m| self.identity.name.as_deref() == Some(m.author.as_str()));

        match self.anchor.decide(newest_is_own) {
            AnchorDecision::Advance => {
                actions.push(ClientAction::ScrollToBottom);
                actions.extend(self.read_to_newest());
            },
            AnchorDecision::Hold => {
                self.read.add_unread(fresh);
                actions.push(ClientAction::UnreadChanged { count: self.read.unread_count() });
            },
        }
        actions
    }

    fn apply_channels(&mut self, channels: Vec<Channel>, now: I) -> Vec<ClientAction> {
        let before = self.directory.active();
        let changed = self.directory.replace(channels);
        let mut actions = Vec::new();
        if changed {
            actions.push(ClientAction::ChannelsChanged);
        }

        // Active channel vanished from the list; the directory fell back.
        if before != self.directory.active() {
            if let Some(channel_id) = self.directory.active() {
                tracing::info!(channel_id, "active channel no longer listed");
                actions.push(ClientAction::Notice(Notice::Banner(
                    "Channel is no longer available".to_string(),
                )));
                actions.extend(self.activate(channel_id, now));
            }
        }
        actions
    }

    fn on_join(&mut self, result: Result<Response, ServiceError>, now: I) -> Vec<ClientAction> {
        match result {
            Ok(Response::Joined { channel_id, name }) => {
                tracing::info!(channel_id, %name, "joined channel");
                self.directory.upsert(Channel { id: channel_id, name, is_admin: false });
                self.sync.invalidate(PollKind::Channels, now);
                let mut actions = vec![ClientAction::ChannelsChanged];
                actions.extend(self.activate(channel_id, now));
                actions
            },
            Ok(other) => self.failed("join channel", unexpected(other, "Joined")),
            Err(e) => self.failed("join channel", e),
        }
    }

    fn on_channel_created(
        &mut self,
        name: String,
        result: Result<Response, ServiceError>,
        now: I,
    ) -> Vec<ClientAction> {
        match result {
            Ok(Response::ChannelCreated { channel_id }) => {
                tracing::info!(channel_id, %name, "created channel");
                self.directory.upsert(Channel { id: channel_id, name, is_admin: true });
                self.sync.invalidate(PollKind::Channels, now);
                let mut actions = vec![ClientAction::ChannelsChanged];
                actions.extend(self.activate(channel_id, now));
                actions
            },
            Ok(other) => self.failed("create channel", unexpected(other, "ChannelCreated")),
            Err(e) => self.failed("create channel", e),
        }
    }

    fn on_channel_deleted(
        &mut self,
        channel_id: ChannelId,
        result: Result<Response, ServiceError>,
        now: I,
    ) -> Vec<ClientAction> {
        if let Err(e) = result {
            return self.failed("delete channel", e);
        }

        tracing::info!(channel_id, "deleted channel");
        if let Err(e) = self.positions.forget(channel_id) {
            tracing::warn!(channel_id, error = %e, "failed to forget read position");
        }

        let was_active = self.directory.remove(channel_id);
        self.sync.invalidate(PollKind::Channels, now);
        let mut actions = vec![ClientAction::ChannelsChanged];
        if was_active {
            actions.extend(self.activate(GENERAL_CHANNEL_ID, now));
        }
        actions
    }

    fn on_posted(
        &mut self,
        channel_id: ChannelId,
        result: Result<Response, ServiceError>,
        now: I,
    ) -> Vec<ClientAction> {
        if let Err(e) = result {
            return self.failed("send message", e);
        }
        // Fetch right away so the message shows up without waiting a tick.
        if self.active_channel() == Some(channel_id) {
            self.sync.invalidate(PollKind::Messages, now);
            return self.poll_due(now);
        }
        Vec::new()
    }

    fn on_message_deleted(
        &mut self,
        channel_id: ChannelId,
        message_id: MessageId,
        result: Result<Response, ServiceError>,
    ) -> Vec<ClientAction> {
        let same_view = self.store.channel_id() == Some(channel_id);
        match result {
            Ok(_) => {
                if same_view {
                    self.store.confirm_delete(message_id);
                }
                Vec::new()
            },
            Err(e) => {
                let mut actions = Vec::new();
                if same_view && self.store.rollback_delete(message_id) {
                    tracing::debug!(channel_id, message_id, "restored message after failed delete");
                    actions.push(ClientAction::TimelineChanged);
                }
                actions.extend(self.failed("delete message", e));
                actions
            },
        }
    }

    fn on_meeting_started(
        &mut self,
        channel_id: ChannelId,
        url: String,
        result: Result<Response, ServiceError>,
        now: I,
    ) -> Vec<ClientAction> {
        if let Err(e) = result {
            return self.failed("start meeting", e);
        }

        tracing::info!(channel_id, %url, "meeting started");
        let announce = Body::MeetingStart(url).encode();
        let mut actions = vec![
            self.send(Request::PostMessage { channel_id, body: announce }, Pending::Post { channel_id }),
        ];
        if self.active_channel() == Some(channel_id) {
            self.sync.invalidate(PollKind::Presence, now);
            actions.extend(self.poll_due(now));
        }
        actions
    }

    /// Switch to `channel_id` and poll it immediately.
    fn activate(&mut self, channel_id: ChannelId, now: I) -> Vec<ClientAction> {
        let mut actions = self.flush_typing();

        self.directory.select(channel_id);
        self.sync.activate(channel_id, now);
        self.reset_view(channel_id);
        tracing::info!(channel_id, last_read = ?self.read.last_read(), "channel activated");

        actions.extend([
            ClientAction::ChannelActivated { channel_id },
            ClientAction::TimelineChanged,
            ClientAction::UnreadChanged { count: 0 },
            ClientAction::TypingChanged { names: Vec::new() },
            ClientAction::PresenceChanged(PresenceSnapshot::default()),
        ]);
        actions.extend(self.poll_due(now));
        actions
    }

    fn reset_view(&mut self, channel_id: ChannelId) {
        self.store.reset(channel_id);
        self.presence.clear();
        self.anchor.pin();

        let persisted = self.positions.load(channel_id).unwrap_or_else(|e| {
            tracing::warn!(channel_id, error = %e, "failed to load read position");
            None
        });
        self.read = ReadTracker::activate(persisted);
    }

    fn poll_due(&mut self, now: I) -> Vec<ClientAction> {
        let active = self.active_channel();
        let mut actions = Vec::new();
        for kind in self.sync.due(now) {
            let request = match (kind, active) {
                (PollKind::Messages, Some(channel_id)) => Request::ListMessages { channel_id },
                (PollKind::Presence, Some(channel_id)) => Request::GetPresence { channel_id },
                (PollKind::Channels, _) => Request::ListChannels,
                (_, None) => continue,
            };
            actions.push(self.send(request, Pending::Poll(kind)));
        }
        actions
    }

    fn read_to_newest(&mut self) -> Vec<ClientAction> {
        let had_unread = self.read.unread_count() > 0;
        let had_divider = self.read.divider(&self.store).is_some();

        if let Some(id) = self.read.mark_read(self.store.newest_id()) {
            if let Some(channel_id) = self.active_channel() {
                self.persist(channel_id, id);
            }
        }

        let mut actions = Vec::new();
        if had_unread {
            actions.push(ClientAction::UnreadChanged { count: 0 });
        }
        if had_divider {
            actions.push(ClientAction::TimelineChanged);
        }
        actions
    }

    fn persist(&mut self, channel_id: ChannelId, message_id: MessageId) {
        match self.positions.store(channel_id, message_id) {
            Ok(true) => tracing::debug!(channel_id, message_id, "read position advanced"),
            Ok(false) => {},
            Err(e) => tracing::warn!(channel_id, error = %e, "failed to persist read position"),
        }
    }

    fn flush_typing(&mut self) -> Vec<ClientAction> {
        match self.typing.flush() {
            Some(signal) => vec![self.send_typing(signal.channel_id, signal.is_typing)],
            None => Vec::new(),
        }
    }

    fn send_typing(&mut self, channel_id: ChannelId, is_typing: bool) -> ClientAction {
        self.send(Request::SetTyping { channel_id, is_typing }, Pending::Typing)
    }

    fn send(&mut self, request: Request, pending: Pending) -> ClientAction {
        let tag = self.sync.next_tag(request.channel_id());
        tracing::trace!(id = tag.id, request = request.name(), "sending request");
        self.in_flight.insert(tag.id, InFlight { tag, pending });
        ClientAction::Send { id: tag.id, request }
    }

    fn failed(&self, what: &str, error: ServiceError) -> Vec<ClientAction> {
        tracing::warn!(error = %error, "failed to {what}");
        let text = format!("Could not {what}: {error}");
        let notice = if error.is_authorization() { Notice::Alert(text) } else { Notice::Banner(text) };
        vec![ClientAction::Notice(notice)]
    }
}

fn unexpected(response: Response, expected: &'static str) -> ServiceError {
    tracing::warn!(?response, expected, "mismatched response");
    ServiceError::UnexpectedResponse { expected }
}

fn poll_subject(kind: PollKind) -> &'static str {
    match kind {
        PollKind::Messages => "messages",
        PollKind::Presence => "presence",
        PollKind::Channels => "channels",
    }
}
