//! Fuzz target for the Client state machine
//!
//! Drives a client with arbitrary user intents, ticks and responses to its
//! own requests (answered in any order, with any payload or error). The
//! client must never panic, the timeline must stay ordered and scoped to
//! the active channel, and persisted read positions must never decrease.

#![no_main]

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pollroom_client::{
    Body, Channel, Client, ClientAction, ClientEvent, ClientIdentity, MemoryReadPositions,
    ReadPositionStore, Request, RequestId, Response, ServiceError, SyncConfig,
};
use pollroom_core::{Message, MessagePage, PresenceSnapshot};

#[derive(Debug, Arbitrary)]
enum Op {
    Tick(u16),
    Respond { pick: u8, reply: Reply },
    Scrolled(u8),
    JumpToLatest,
    InputChanged,
    Submit(u8),
    Delete(u8),
    Select(u8),
    Join(u8),
}

#[derive(Debug, Arbitrary)]
enum Reply {
    Page { ids: Vec<u8>, author_self: bool },
    Channels(Vec<u8>),
    Ack,
    Joined(u8),
    Presence,
    Unauthorized,
    Network,
}

fn reply(request: &Request, reply: Reply) -> Result<Response, ServiceError> {
    let channel_id = request.channel_id().unwrap_or(1);
    match reply {
        Reply::Page { ids, author_self } => Ok(Response::Messages(MessagePage {
            messages: ids
                .into_iter()
                .map(|id| Message {
                    id: u64::from(id),
                    channel_id,
                    author: if author_self { "ana" } else { "bo" }.to_string(),
                    body: format!("m{id}"),
                    timestamp: String::new(),
                })
                .collect(),
            typing: vec!["ana".to_string(), "bo".to_string()],
        })),
        Reply::Channels(ids) => Ok(Response::Channels(
            ids.into_iter()
                .map(|id| Channel { id: u64::from(id % 4) + 1, name: format!("c{id}"), is_admin: id % 2 == 0 })
                .collect(),
        )),
        Reply::Ack => Ok(Response::Ack),
        Reply::Joined(id) => Ok(Response::Joined { channel_id: u64::from(id % 4) + 1, name: format!("c{id}") }),
        Reply::Presence => Ok(Response::Presence(PresenceSnapshot::default())),
        Reply::Unauthorized => Err(ServiceError::Unauthorized { message: "Access denied".into() }),
        Reply::Network => Err(ServiceError::Network("fuzz".into())),
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let positions = MemoryReadPositions::new();
    let mut client: Client<MemoryReadPositions, Instant> =
        Client::new(ClientIdentity::named("ana"), SyncConfig::default(), positions.clone());

    let mut now = Instant::now();
    let mut pending: Vec<(RequestId, Request)> = Vec::new();
    let mut read: HashMap<u64, u64> = HashMap::new();

    let collect = |result: Result<Vec<ClientAction>, _>, pending: &mut Vec<(RequestId, Request)>| {
        for action in result.unwrap_or_default() {
            if let ClientAction::Send { id, request } = action {
                pending.push((id, request));
            }
        }
    };

    collect(client.handle(ClientEvent::Start { now }), &mut pending);

    for op in ops {
        let event = match op {
            Op::Tick(ms) => {
                now += Duration::from_millis(u64::from(ms));
                ClientEvent::Tick { now }
            },
            Op::Respond { pick, reply: r } => {
                if pending.is_empty() {
                    continue;
                }
                let (id, request) = pending.remove(usize::from(pick) % pending.len());
                ClientEvent::Response { id, result: reply(&request, r), now }
            },
            Op::Scrolled(d) => ClientEvent::Scrolled { distance_from_bottom: u32::from(d) },
            Op::JumpToLatest => ClientEvent::JumpToLatest,
            Op::InputChanged => ClientEvent::InputChanged { now },
            Op::Submit(n) => ClientEvent::Submit { body: Body::Text(format!("hello {n}")) },
            Op::Delete(id) => ClientEvent::DeleteMessage { message_id: u64::from(id) },
            Op::Select(id) => ClientEvent::SelectChannel { channel_id: u64::from(id % 4) + 1, now },
            Op::Join(id) => ClientEvent::Join { channel_name: format!("c{id}") },
        };
        collect(client.handle(event), &mut pending);

        let timeline = client.timeline();
        assert!(timeline.entries.windows(2).all(|w| w[0].message.id < w[1].message.id));
        assert!(timeline
            .entries
            .iter()
            .all(|e| Some(e.message.channel_id) == client.active_channel()));

        if let Some(channel) = client.active_channel() {
            if let Ok(Some(position)) = positions.load(channel) {
                let previous = read.insert(channel, position).unwrap_or(0);
                assert!(position >= previous, "read position moved back");
            }
        }
    }
});
