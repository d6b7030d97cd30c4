//! In-process collaborator service.
//!
//! `SimService` implements [`ChatService`] over shared in-memory state so that
//! several clients, and the test itself, see the same channels and messages.
//! Each clone acts for one user; [`SimService::for_user`] derives a service
//! for another user over the same state.
//!
//! Latency and failures come from a seeded `ChaCha8Rng`. With jitter larger
//! than the poll interval, responses complete out of issue order, which is
//! exactly what the client's stale-result rejection has to cope with.

#![allow(clippy::disallowed_types, reason = "Synchronous locking operations only")]

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use pollroom_client::{ChatService, Request, Response, ServiceError};
use pollroom_core::{
    Channel, ChannelId, GENERAL_CHANNEL_ID, GENERAL_CHANNEL_NAME, Meeting, Message, MessageId,
    MessagePage, PresenceSnapshot,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Messages returned per `ListMessages`, newest first.
pub const PAGE_SIZE: usize = 50;

/// Timing and fault injection settings.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// RNG seed.
    pub seed: u64,
    /// Fixed delay before every response.
    pub latency: Duration,
    /// Additional uniformly random delay, up to this much.
    pub jitter: Duration,
    /// Probability that a request fails with a network error.
    pub failure_rate: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { seed: 0, latency: Duration::from_millis(50), jitter: Duration::ZERO, failure_rate: 0.0 }
    }
}

#[derive(Debug)]
struct SimChannel {
    name: String,
    admins: BTreeSet<String>,
    members: BTreeSet<String>,
    messages: Vec<Message>,
    typing: BTreeSet<String>,
    online: BTreeSet<String>,
    meeting: Option<Meeting>,
}

impl SimChannel {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            admins: BTreeSet::new(),
            members: BTreeSet::new(),
            messages: Vec::new(),
            typing: BTreeSet::new(),
            online: BTreeSet::new(),
            meeting: None,
        }
    }
}

#[derive(Debug)]
struct World {
    config: SimConfig,
    rng: ChaCha8Rng,
    channels: BTreeMap<ChannelId, SimChannel>,
    next_channel_id: ChannelId,
    next_message_id: MessageId,
    session_valid: bool,
    log: Vec<(String, Request)>,
}

/// Simulated collaborator service acting for one user.
#[derive(Clone)]
pub struct SimService {
    world: Arc<Mutex<World>>,
    user: String,
}

impl SimService {
    /// Fresh world containing only the general channel.
    pub fn new(user: impl Into<String>, config: SimConfig) -> Self {
        let mut channels = BTreeMap::new();
        channels.insert(GENERAL_CHANNEL_ID, SimChannel::new(GENERAL_CHANNEL_NAME));
        let world = World {
            config,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            channels,
            next_channel_id: GENERAL_CHANNEL_ID + 1,
            next_message_id: 1,
            session_valid: true,
            log: Vec::new(),
        };
        Self { world: Arc::new(Mutex::new(world)), user: user.into() }
    }

    /// Service for another user over the same world.
    pub fn for_user(&self, user: impl Into<String>) -> Self {
        Self { world: Arc::clone(&self.world), user: user.into() }
    }

    /// User this service acts for.
    pub fn user(&self) -> &str {
        &self.user
    }

    fn world(&self) -> MutexGuard<'_, World> {
        self.world.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Post `body` directly, bypassing latency and faults.
    pub fn post(&self, channel_id: ChannelId, body: &str) -> Option<MessageId> {
        let mut world = self.world();
        world.post(channel_id, &self.user, body)
    }

    /// Set or clear this user's typing flag directly.
    pub fn set_typing(&self, channel_id: ChannelId, is_typing: bool) {
        let mut world = self.world();
        if let Some(channel) = world.channels.get_mut(&channel_id) {
            if is_typing {
                channel.typing.insert(self.user.clone());
            } else {
                channel.typing.remove(&self.user);
            }
        }
    }

    /// Start a meeting directly.
    pub fn start_meeting(&self, channel_id: ChannelId, url: &str) {
        let mut world = self.world();
        if let Some(channel) = world.channels.get_mut(&channel_id) {
            channel.meeting = Some(Meeting { url: url.to_string(), started_by: self.user.clone() });
        }
    }

    /// Delete a message directly.
    pub fn remove_message(&self, channel_id: ChannelId, message_id: MessageId) {
        let mut world = self.world();
        if let Some(channel) = world.channels.get_mut(&channel_id) {
            channel.messages.retain(|m| m.id != message_id);
        }
    }

    /// Invalidate the session; every later call is unauthorized.
    pub fn revoke_session(&self) {
        self.world().session_valid = false;
    }

    /// Change the failure probability.
    pub fn set_failure_rate(&self, rate: f64) {
        self.world().config.failure_rate = rate;
    }

    /// All messages of a channel, ascending.
    pub fn messages(&self, channel_id: ChannelId) -> Vec<Message> {
        self.world().channels.get(&channel_id).map(|c| c.messages.clone()).unwrap_or_default()
    }

    /// Channel id by name.
    pub fn channel_id(&self, name: &str) -> Option<ChannelId> {
        self.world().find(name)
    }

    /// Requests received so far, with the acting user.
    pub fn requests(&self) -> Vec<(String, Request)> {
        self.world().log.clone()
    }

    /// Typing flags this user sent, in order.
    pub fn typing_signals(&self) -> Vec<bool> {
        self.world()
            .log
            .iter()
            .filter(|(user, _)| *user == self.user)
            .filter_map(|(_, r)| match r {
                Request::SetTyping { is_typing, .. } => Some(*is_typing),
                _ => None,
            })
            .collect()
    }

    fn delay_and_fault(&self) -> (Duration, bool) {
        let mut world = self.world();
        let config = world.config;
        let jitter = if config.jitter.is_zero() {
            Duration::ZERO
        } else {
            let max = u64::try_from(config.jitter.as_millis()).unwrap_or(u64::MAX);
            Duration::from_millis(world.rng.gen_range(0..=max))
        };
        let fail = config.failure_rate > 0.0 && world.rng.gen_bool(config.failure_rate.min(1.0));
        (config.latency + jitter, fail)
    }
}

impl ChatService for SimService {
    async fn call(&self, request: Request) -> Result<Response, ServiceError> {
        let (delay, fail) = self.delay_and_fault();
        tokio::time::sleep(delay).await;

        if fail {
            tracing::debug!(user = %self.user, request = request.name(), "injected failure");
            return Err(ServiceError::Network("injected failure".to_string()));
        }
        self.world().handle(&self.user, request)
    }
}

impl World {
    fn find(&self, name: &str) -> Option<ChannelId> {
        self.channels.iter().find(|(_, c)| c.name == name).map(|(id, _)| *id)
    }

    fn channel(&mut self, channel_id: ChannelId) -> Result<&mut SimChannel, ServiceError> {
        self.channels
            .get_mut(&channel_id)
            .ok_or_else(|| ServiceError::Rejected { message: format!("no channel {channel_id}") })
    }

    fn post(&mut self, channel_id: ChannelId, author: &str, body: &str) -> Option<MessageId> {
        let id = self.next_message_id;
        let channel = self.channels.get_mut(&channel_id)?;
        channel.messages.push(Message {
            id,
            channel_id,
            author: author.to_string(),
            body: body.to_string(),
            timestamp: format!("2024-01-01T00:{:02}:{:02}", (id / 60) % 60, id % 60),
        });
        self.next_message_id += 1;
        Some(id)
    }

    fn handle(&mut self, user: &str, request: Request) -> Result<Response, ServiceError> {
        self.log.push((user.to_string(), request.clone()));
        if !self.session_valid {
            return Err(ServiceError::Unauthorized { message: "Invalid session".to_string() });
        }

        match request {
            Request::Join { channel_name } => {
                let channel_id = match self.find(&channel_name) {
                    Some(id) => id,
                    None => {
                        let id = self.next_channel_id;
                        self.next_channel_id += 1;
                        self.channels.insert(id, SimChannel::new(channel_name.clone()));
                        id
                    },
                };
                self.channel(channel_id)?.members.insert(user.to_string());
                Ok(Response::Joined { channel_id, name: channel_name })
            },
            Request::ListChannels => {
                let channels = self
                    .channels
                    .iter()
                    .filter(|(id, c)| **id == GENERAL_CHANNEL_ID || c.members.contains(user))
                    .map(|(id, c)| Channel {
                        id: *id,
                        name: c.name.clone(),
                        is_admin: c.admins.contains(user),
                    })
                    .collect();
                Ok(Response::Channels(channels))
            },
            Request::CreateChannel { name, members } => {
                let id = self.next_channel_id;
                self.next_channel_id += 1;
                let mut channel = SimChannel::new(name);
                channel.admins.insert(user.to_string());
                channel.members.insert(user.to_string());
                channel.members.extend(members);
                self.channels.insert(id, channel);
                Ok(Response::ChannelCreated { channel_id: id })
            },
            Request::DeleteChannel { channel_id } => {
                if channel_id == GENERAL_CHANNEL_ID {
                    return Err(ServiceError::Rejected {
                        message: "General cannot be deleted".to_string(),
                    });
                }
                if !self.channel(channel_id)?.admins.contains(user) {
                    return Err(ServiceError::Unauthorized { message: "Access denied".to_string() });
                }
                self.channels.remove(&channel_id);
                Ok(Response::Ack)
            },
            Request::ListMessages { channel_id } => {
                let channel = self.channel(channel_id)?;
                channel.online.insert(user.to_string());
                let messages = channel.messages.iter().rev().take(PAGE_SIZE).cloned().collect();
                let typing = channel.typing.iter().cloned().collect();
                Ok(Response::Messages(MessagePage { messages, typing }))
            },
            Request::PostMessage { channel_id, body } => {
                self.channel(channel_id)?;
                self.post(channel_id, user, &body);
                Ok(Response::Ack)
            },
            Request::DeleteMessage { channel_id, message_id } => {
                let channel = self.channel(channel_id)?;
                let Some(at) = channel.messages.iter().position(|m| m.id == message_id) else {
                    return Err(ServiceError::Rejected { message: "Message not found".to_string() });
                };
                if channel.messages[at].author != user && !channel.admins.contains(user) {
                    return Err(ServiceError::Unauthorized { message: "Access denied".to_string() });
                }
                channel.messages.remove(at);
                Ok(Response::Ack)
            },
            Request::SetTyping { channel_id, is_typing } => {
                let channel = self.channel(channel_id)?;
                if is_typing {
                    channel.typing.insert(user.to_string());
                } else {
                    channel.typing.remove(user);
                }
                Ok(Response::Ack)
            },
            Request::GetPresence { channel_id } => {
                let channel = self.channel(channel_id)?;
                channel.online.insert(user.to_string());
                Ok(Response::Presence(PresenceSnapshot {
                    online: channel.online.clone(),
                    meeting: channel.meeting.clone(),
                }))
            },
            Request::StartMeeting { channel_id, url } => {
                let channel = self.channel(channel_id)?;
                channel.meeting = Some(Meeting { url, started_by: user.to_string() });
                Ok(Response::Ack)
            },
        }
    }
}
