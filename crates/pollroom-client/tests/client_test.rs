//! Client state machine tests.
//!
//! Each test drives a `Client` by hand: it reads the `Send` actions, plays the
//! collaborator service by feeding back `Response` events, and checks the
//! resulting view state.

use std::time::{Duration, Instant};

use pollroom_client::{
    Body, BodyKind, Channel, ChannelId, Client, ClientAction, ClientError, ClientEvent,
    ClientIdentity, Divider, MemoryReadPositions, Message, MessageId, Notice, ReadPositionStore,
    Request, RequestId, Response, ServiceError, SyncConfig,
};
use pollroom_core::{MessagePage, PresenceSnapshot};

type TestClient = Client<MemoryReadPositions, Instant>;

struct Fixture {
    client: TestClient,
    positions: MemoryReadPositions,
    t0: Instant,
}

impl Fixture {
    fn new(name: Option<&str>) -> Self {
        Self::with_positions(name, MemoryReadPositions::new())
    }

    fn with_positions(name: Option<&str>, positions: MemoryReadPositions) -> Self {
        let identity = ClientIdentity { name: name.map(str::to_string) };
        let client = Client::new(identity, SyncConfig::default(), positions.clone());
        Self { client, positions, t0: Instant::now() }
    }

    fn at(&self, ms: u64) -> Instant {
        self.t0 + Duration::from_millis(ms)
    }

    fn handle(&mut self, event: ClientEvent<Instant>) -> Vec<ClientAction> {
        self.client.handle(event).unwrap()
    }

    /// Start the client and answer the first poll of the general channel.
    fn start_with(&mut self, messages: Vec<Message>) -> Vec<ClientAction> {
        let actions = self.handle(ClientEvent::Start { now: self.t0 });
        let id = find(&actions, |r| matches!(r, Request::ListMessages { .. }));
        self.messages(id, messages, self.t0)
    }

    fn respond(&mut self, id: RequestId, result: Result<Response, ServiceError>, now: Instant) -> Vec<ClientAction> {
        self.handle(ClientEvent::Response { id, result, now })
    }

    fn messages(&mut self, id: RequestId, messages: Vec<Message>, now: Instant) -> Vec<ClientAction> {
        self.respond(id, Ok(Response::Messages(MessagePage { messages, typing: Vec::new() })), now)
    }

    /// Tick to `ms` and answer the message poll it issues.
    fn poll_messages(&mut self, ms: u64, messages: Vec<Message>) -> Vec<ClientAction> {
        let now = self.at(ms);
        let actions = self.handle(ClientEvent::Tick { now });
        let id = find(&actions, |r| matches!(r, Request::ListMessages { .. }));
        self.messages(id, messages, now)
    }
}

fn msg(id: MessageId, author: &str, body: &str) -> Message {
    Message { id, channel_id: 1, author: author.into(), body: body.into(), timestamp: String::new() }
}

fn range(ids: std::ops::RangeInclusive<MessageId>) -> Vec<Message> {
    ids.rev().map(|id| msg(id, "bo", "hi")).collect()
}

fn requests(actions: &[ClientAction]) -> Vec<(RequestId, Request)> {
    actions
        .iter()
        .filter_map(|a| match a {
            ClientAction::Send { id, request } => Some((*id, request.clone())),
            _ => None,
        })
        .collect()
}

fn find(actions: &[ClientAction], pred: impl Fn(&Request) -> bool) -> RequestId {
    requests(actions)
        .into_iter()
        .find(|(_, r)| pred(r))
        .map(|(id, _)| id)
        .expect("request not sent")
}

fn visible(client: &TestClient) -> Vec<MessageId> {
    client.store().messages().iter().map(|m| m.id).collect()
}

#[test]
fn start_polls_general_and_directory() {
    let mut f = Fixture::new(Some("me"));
    let actions = f.handle(ClientEvent::Start { now: f.t0 });

    let sent: Vec<Request> = requests(&actions).into_iter().map(|(_, r)| r).collect();
    assert!(sent.contains(&Request::ListMessages { channel_id: 1 }));
    assert!(sent.contains(&Request::GetPresence { channel_id: 1 }));
    assert!(sent.contains(&Request::ListChannels));
    assert_eq!(f.client.active_channel(), Some(1));
}

#[test]
fn first_fetch_without_position_reads_newest() {
    let mut f = Fixture::new(Some("me"));
    let actions = f.start_with(range(1..=3));

    assert!(actions.contains(&ClientAction::ScrollToBottom));
    assert_eq!(visible(&f.client), vec![1, 2, 3]);
    assert_eq!(f.client.unread_count(), 0);
    assert_eq!(f.positions.load(1).unwrap(), Some(3));
    assert_eq!(f.client.timeline().divider, None);
}

#[test]
fn first_fetch_opens_at_persisted_divider() {
    let positions = MemoryReadPositions::with_positions([(1, 5)]);
    let mut f = Fixture::with_positions(Some("me"), positions);
    let actions = f.start_with(range(1..=8));

    assert!(actions.contains(&ClientAction::ScrollToMessage { message_id: 5 }));
    assert!(actions.contains(&ClientAction::UnreadChanged { count: 3 }));
    assert!(!f.client.is_at_bottom());
    assert_eq!(f.client.timeline().divider, Some(Divider::After(5)));

    let actions = f.handle(ClientEvent::JumpToLatest);
    assert!(actions.contains(&ClientAction::ScrollToBottom));
    assert_eq!(f.client.unread_count(), 0);
    assert_eq!(f.positions.load(1).unwrap(), Some(8));
    assert_eq!(f.client.timeline().divider, None);
}

#[test]
fn divider_landing_at_bottom_reads_the_tail() {
    let positions = MemoryReadPositions::with_positions([(1, 5)]);
    let mut f = Fixture::with_positions(Some("me"), positions);
    f.start_with(range(1..=8));
    assert!(!f.client.is_at_bottom());

    // The view could not move the divider to the top: everything fits.
    let actions = f.handle(ClientEvent::Scrolled { distance_from_bottom: 0 });
    assert!(actions.contains(&ClientAction::UnreadChanged { count: 0 }));
    assert!(actions.contains(&ClientAction::TimelineChanged));
    assert!(f.client.is_at_bottom());
    assert_eq!(f.positions.load(1).unwrap(), Some(8));
}

#[test]
fn evicted_position_falls_back_to_newest() {
    let positions = MemoryReadPositions::with_positions([(1, 2)]);
    let mut f = Fixture::with_positions(Some("me"), positions);
    f.start_with(range(10..=20));

    assert_eq!(f.client.unread_count(), 0);
    assert_eq!(f.positions.load(1).unwrap(), Some(20));
}

#[test]
fn new_ids_while_scrolled_up_count_exactly() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(range(1..=10));
    f.handle(ClientEvent::Scrolled { distance_from_bottom: 500 });

    let actions = f.poll_messages(2000, range(1..=12));

    assert!(actions.contains(&ClientAction::UnreadChanged { count: 2 }));
    assert!(!actions.contains(&ClientAction::ScrollToBottom));
    assert_eq!(f.client.unread_count(), 2);
    assert_eq!(f.client.last_read(), Some(10));
    assert_eq!(f.client.timeline().divider, Some(Divider::After(10)));
}

#[test]
fn unread_accumulates_and_never_decrements_on_poll() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(range(1..=10));
    f.handle(ClientEvent::Scrolled { distance_from_bottom: 500 });

    f.poll_messages(2000, range(1..=12));
    f.poll_messages(4000, range(1..=13));
    // A shorter page does not reduce the count.
    f.poll_messages(6000, range(5..=13));

    assert_eq!(f.client.unread_count(), 3);
}

#[test]
fn at_bottom_batch_stays_anchored() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(range(1..=10));

    let actions = f.poll_messages(2000, range(1..=12));

    assert!(actions.contains(&ClientAction::ScrollToBottom));
    assert_eq!(f.client.unread_count(), 0);
    assert!(f.client.is_at_bottom());
    assert_eq!(f.positions.load(1).unwrap(), Some(12));
}

#[test]
fn own_message_always_advances() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(range(1..=10));
    f.handle(ClientEvent::Scrolled { distance_from_bottom: 500 });

    let mut page = range(1..=10);
    page.push(msg(11, "me", "mine"));
    let actions = f.poll_messages(2000, page);

    assert!(actions.contains(&ClientAction::ScrollToBottom));
    assert!(f.client.is_at_bottom());
    assert_eq!(f.client.unread_count(), 0);
    assert_eq!(f.client.last_read(), Some(11));
}

#[test]
fn scrolling_back_to_bottom_reads_everything() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(range(1..=10));
    f.handle(ClientEvent::Scrolled { distance_from_bottom: 500 });
    f.poll_messages(2000, range(1..=12));

    let actions = f.handle(ClientEvent::Scrolled { distance_from_bottom: 3 });

    assert!(actions.contains(&ClientAction::UnreadChanged { count: 0 }));
    assert_eq!(f.client.last_read(), Some(12));
}

#[test]
fn mixed_media_batch_while_scrolled_up() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(Vec::new());
    f.handle(ClientEvent::Scrolled { distance_from_bottom: 500 });

    f.poll_messages(2000, vec![
        msg(3, "bo", "[VOICE]data:audio/webm;base64,AAAA"),
        msg(2, "bo", "[IMAGE]data:image/png;base64,AAAA"),
        msg(1, "bo", "hi"),
    ]);

    assert_eq!(f.client.unread_count(), 3);
    let timeline = f.client.timeline();
    assert_eq!(timeline.divider, Some(Divider::BeforeFirst));
    assert_eq!(timeline.entries[0].body, Body::Text("hi".into()));
    assert_eq!(timeline.entries[1].body.kind(), BodyKind::Image);
    assert_eq!(timeline.entries[2].body.kind(), BodyKind::Voice);
}

#[test]
fn response_for_previous_channel_is_discarded() {
    let mut f = Fixture::new(Some("me"));
    let actions = f.handle(ClientEvent::Start { now: f.t0 });
    let old = find(&actions, |r| matches!(r, Request::ListMessages { .. }));
    let list = find(&actions, |r| matches!(r, Request::ListChannels));

    let channels = vec![Channel::general(), Channel { id: 5, name: "ops".into(), is_admin: false }];
    f.respond(list, Ok(Response::Channels(channels)), f.t0);
    f.handle(ClientEvent::SelectChannel { channel_id: 5, now: f.at(10) });

    let actions = f.messages(old, range(1..=3), f.at(20));

    assert!(actions.is_empty());
    assert!(f.client.store().is_empty());
    assert_eq!(f.client.store().channel_id(), Some(5));
}

#[test]
fn older_overlapping_poll_is_superseded() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(range(1..=3));

    let first = f.handle(ClientEvent::Tick { now: f.at(2000) });
    let first = find(&first, |r| matches!(r, Request::ListMessages { .. }));
    let second = f.handle(ClientEvent::Tick { now: f.at(4000) });
    let second = find(&second, |r| matches!(r, Request::ListMessages { .. }));

    f.messages(second, range(1..=5), f.at(4100));
    let actions = f.messages(first, range(1..=4), f.at(4200));

    assert!(actions.is_empty());
    assert_eq!(visible(&f.client), vec![1, 2, 3, 4, 5]);
}

#[test]
fn failed_poll_shows_banner_and_next_tick_retries() {
    let mut f = Fixture::new(Some("me"));
    let actions = f.handle(ClientEvent::Start { now: f.t0 });
    let id = find(&actions, |r| matches!(r, Request::ListMessages { .. }));

    let actions = f.respond(id, Err(ServiceError::Network("timeout".into())), f.t0);
    assert!(matches!(actions.as_slice(), [ClientAction::Notice(Notice::Banner(_))]));

    let actions = f.handle(ClientEvent::Tick { now: f.at(2000) });
    assert!(requests(&actions).iter().any(|(_, r)| *r == Request::ListMessages { channel_id: 1 }));
}

#[test]
fn own_delete_is_immediate() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(vec![msg(1, "bo", "a"), msg(2, "me", "b")]);

    let actions = f.handle(ClientEvent::DeleteMessage { message_id: 2 });

    assert_eq!(visible(&f.client), vec![1]);
    assert!(requests(&actions)
        .iter()
        .any(|(_, r)| *r == Request::DeleteMessage { channel_id: 1, message_id: 2 }));

    // Still hidden while the request is outstanding.
    f.poll_messages(2000, vec![msg(1, "bo", "a"), msg(2, "me", "b")]);
    assert_eq!(visible(&f.client), vec![1]);
}

#[test]
fn failed_delete_restores_message_with_alert() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(vec![msg(1, "me", "a"), msg(2, "me", "b"), msg(3, "bo", "c")]);

    let actions = f.handle(ClientEvent::DeleteMessage { message_id: 2 });
    let id = find(&actions, |r| matches!(r, Request::DeleteMessage { .. }));

    let denied = ServiceError::Unauthorized { message: "not yours".into() };
    let actions = f.respond(id, Err(denied), f.at(100));

    assert_eq!(visible(&f.client), vec![1, 2, 3]);
    assert!(actions.contains(&ClientAction::TimelineChanged));
    assert!(actions.iter().any(|a| matches!(a, ClientAction::Notice(Notice::Alert(_)))));
}

#[test]
fn delete_of_others_message_requires_admin() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(vec![msg(1, "bo", "a")]);

    let err = f.client.handle(ClientEvent::DeleteMessage { message_id: 1 }).unwrap_err();
    assert!(matches!(err, ClientError::NotPermitted { .. }));
    assert_eq!(visible(&f.client), vec![1]);
}

#[test]
fn admin_may_delete_any_message() {
    let mut f = Fixture::new(Some("me"));
    let actions = f.handle(ClientEvent::Start { now: f.t0 });
    let list = find(&actions, |r| matches!(r, Request::ListChannels));
    let poll = find(&actions, |r| matches!(r, Request::ListMessages { .. }));
    f.respond(list, Ok(Response::Channels(vec![Channel { id: 1, name: "General".into(), is_admin: true }])), f.t0);
    f.messages(poll, vec![msg(1, "bo", "a")], f.t0);

    assert!(f.client.handle(ClientEvent::DeleteMessage { message_id: 1 }).is_ok());
    assert!(f.client.store().is_empty());
}

#[test]
fn submit_flushes_typing_then_posts() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(Vec::new());

    let actions = f.handle(ClientEvent::InputChanged { now: f.at(10) });
    assert_eq!(requests(&actions)[0].1, Request::SetTyping { channel_id: 1, is_typing: true });

    let actions = f.handle(ClientEvent::Submit { body: Body::text("hello").unwrap() });
    let sent: Vec<Request> = requests(&actions).into_iter().map(|(_, r)| r).collect();
    assert_eq!(sent, vec![
        Request::SetTyping { channel_id: 1, is_typing: false },
        Request::PostMessage { channel_id: 1, body: "hello".into() },
    ]);

    // Timer was cancelled: no second "false".
    let later = f.handle(ClientEvent::Tick { now: f.at(5000) });
    assert!(!requests(&later).iter().any(|(_, r)| matches!(r, Request::SetTyping { .. })));
}

#[test]
fn typing_burst_sends_one_false() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(Vec::new());

    let mut on = 0;
    let mut off = Vec::new();
    for ms in (0..=2000).step_by(500) {
        let actions = f.handle(ClientEvent::InputChanged { now: f.at(ms) });
        on += requests(&actions)
            .iter()
            .filter(|(_, r)| matches!(r, Request::SetTyping { is_typing: true, .. }))
            .count();
    }
    for ms in (2100..=6000).step_by(100) {
        let actions = f.handle(ClientEvent::Tick { now: f.at(ms) });
        if requests(&actions).iter().any(|(_, r)| matches!(r, Request::SetTyping { is_typing: false, .. })) {
            off.push(ms);
        }
    }

    assert_eq!(on, 5);
    assert_eq!(off, vec![5000]);
}

#[test]
fn channel_switch_flushes_typing() {
    let mut f = Fixture::new(Some("me"));
    let actions = f.handle(ClientEvent::Start { now: f.t0 });
    let list = find(&actions, |r| matches!(r, Request::ListChannels));
    let channels = vec![Channel::general(), Channel { id: 5, name: "ops".into(), is_admin: false }];
    f.respond(list, Ok(Response::Channels(channels)), f.t0);

    f.handle(ClientEvent::InputChanged { now: f.at(10) });
    let actions = f.handle(ClientEvent::SelectChannel { channel_id: 5, now: f.at(20) });

    assert_eq!(requests(&actions)[0].1, Request::SetTyping { channel_id: 1, is_typing: false });
}

#[test]
fn anonymous_session_sends_no_typing() {
    let mut f = Fixture::new(None);
    f.start_with(Vec::new());

    let actions = f.handle(ClientEvent::InputChanged { now: f.at(10) });
    assert!(actions.is_empty());
}

#[test]
fn typing_set_excludes_self() {
    let mut f = Fixture::new(Some("me"));
    let actions = f.handle(ClientEvent::Start { now: f.t0 });
    let id = find(&actions, |r| matches!(r, Request::ListMessages { .. }));

    let page = MessagePage { messages: Vec::new(), typing: vec!["me".into(), "bo".into()] };
    let actions = f.respond(id, Ok(Response::Messages(page)), f.t0);

    assert!(actions.contains(&ClientAction::TypingChanged { names: vec!["bo".into()] }));
    assert_eq!(f.client.typing(), ["bo"]);
}

#[test]
fn empty_text_is_rejected_locally() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(Vec::new());

    let err = f.client.handle(ClientEvent::Submit { body: Body::Text("  ".into()) }).unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[test]
fn meeting_announced_after_start_succeeds() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(Vec::new());

    let actions = f.handle(ClientEvent::StartMeeting { url: "https://meet.example/r".into() });
    let id = find(&actions, |r| matches!(r, Request::StartMeeting { .. }));

    let actions = f.respond(id, Ok(Response::Ack), f.at(50));
    assert!(requests(&actions).iter().any(|(_, r)| *r
        == Request::PostMessage { channel_id: 1, body: "[MEETING]https://meet.example/r".into() }));
    assert!(requests(&actions).iter().any(|(_, r)| *r == Request::GetPresence { channel_id: 1 }));
}

#[test]
fn meeting_url_must_be_http() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(Vec::new());

    let err = f.client.handle(ClientEvent::StartMeeting { url: "ftp://x".into() }).unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[test]
fn presence_poll_updates_snapshot() {
    let mut f = Fixture::new(Some("me"));
    let actions = f.handle(ClientEvent::Start { now: f.t0 });
    let id = find(&actions, |r| matches!(r, Request::GetPresence { .. }));

    let snapshot = PresenceSnapshot { online: ["bo".to_string()].into_iter().collect(), meeting: None };
    let actions = f.respond(id, Ok(Response::Presence(snapshot.clone())), f.t0);

    assert!(actions.contains(&ClientAction::PresenceChanged(snapshot.clone())));
    assert_eq!(f.client.presence(), &snapshot);
}

#[test]
fn join_activates_channel() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(Vec::new());

    let actions = f.handle(ClientEvent::Join { channel_name: " ops ".into() });
    let id = find(&actions, |r| *r == Request::Join { channel_name: "ops".into() });

    let actions = f.respond(id, Ok(Response::Joined { channel_id: 7, name: "ops".into() }), f.at(10));

    assert_eq!(f.client.active_channel(), Some(7));
    assert!(actions.contains(&ClientAction::ChannelActivated { channel_id: 7 }));
    assert!(requests(&actions).iter().any(|(_, r)| *r == Request::ListMessages { channel_id: 7 }));
    assert!(requests(&actions).iter().any(|(_, r)| *r == Request::ListChannels));
}

#[test]
fn deleting_active_channel_returns_to_general() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(Vec::new());

    let actions = f.handle(ClientEvent::CreateChannel { name: "ops".into(), members: vec!["bo".into()] });
    let id = find(&actions, |r| matches!(r, Request::CreateChannel { .. }));
    f.respond(id, Ok(Response::ChannelCreated { channel_id: 9 }), f.at(10));
    assert_eq!(f.client.active_channel(), Some(9));

    let actions = f.handle(ClientEvent::DeleteChannel { channel_id: 9 });
    let id = find(&actions, |r| *r == Request::DeleteChannel { channel_id: 9 });
    let actions = f.respond(id, Ok(Response::Ack), f.at(20));

    assert_eq!(f.client.active_channel(), Some(1));
    assert!(actions.contains(&ClientAction::ChannelActivated { channel_id: 1 }));
    assert!(!f.client.directory().contains(9));
}

#[test]
fn general_cannot_be_deleted() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(Vec::new());

    let err = f.client.handle(ClientEvent::DeleteChannel { channel_id: 1 }).unwrap_err();
    assert!(matches!(err, ClientError::NotPermitted { .. }));
}

#[test]
fn select_unknown_channel_fails() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(Vec::new());

    let err = f.client.handle(ClientEvent::SelectChannel { channel_id: 42, now: f.t0 }).unwrap_err();
    assert_eq!(err, ClientError::UnknownChannel { channel_id: 42 });
}

#[test]
fn post_triggers_immediate_refresh() {
    let mut f = Fixture::new(Some("me"));
    f.start_with(Vec::new());

    let actions = f.handle(ClientEvent::Submit { body: Body::text("hi").unwrap() });
    let id = find(&actions, |r| matches!(r, Request::PostMessage { .. }));
    let actions = f.respond(id, Ok(Response::Ack), f.at(100));

    assert!(requests(&actions).iter().any(|(_, r)| *r == Request::ListMessages { channel_id: 1 }));
}

#[test]
fn read_position_never_decreases() {
    let positions = MemoryReadPositions::with_positions([(1, 50)]);
    let mut f = Fixture::with_positions(Some("me"), positions);
    f.start_with(range(1..=10));

    f.handle(ClientEvent::JumpToLatest);
    f.handle(ClientEvent::Scrolled { distance_from_bottom: 0 });

    assert_eq!(f.positions.load(1).unwrap(), Some(50));
    let channel: ChannelId = 1;
    assert_eq!(f.client.last_read(), f.positions.load(channel).unwrap());
}
