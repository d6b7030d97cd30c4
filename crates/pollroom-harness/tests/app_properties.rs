//! Property-based tests for the App state machine.
//!
//! Random key presses, resizes and timeline updates are fed into a bare
//! [`App`]; the invariant registry is checked after every step, and every
//! move the sync engine did not ask for must be reported back to it.

use pollroom_app::{App, AppAction, AppEvent, KeyInput, TimelineRow};
use pollroom_client::{Divider, Timeline, TimelineEntry};
use pollroom_core::{Body, Channel, GENERAL_CHANNEL_ID, Message, MessageId};
use pollroom_harness::{ClientSnapshot, InvariantRegistry, SystemSnapshot};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Step {
    Key(KeyInput),
    Resize(u16, u16),
    Timeline { ids: Vec<MessageId>, divider_at: Option<usize> },
    ScrollToBottom,
    ScrollToMessage(MessageId),
}

fn entry(id: MessageId) -> TimelineEntry {
    TimelineEntry {
        message: Message {
            id,
            channel_id: GENERAL_CHANNEL_ID,
            author: "bo".into(),
            body: format!("m{id}"),
            timestamp: String::new(),
        },
        body: Body::Text(format!("m{id}")),
        is_own: false,
    }
}

fn timeline(ids: &[MessageId], divider_at: Option<usize>) -> Timeline {
    let divider = divider_at.and_then(|at| ids.get(at)).map(|id| Divider::After(*id));
    Timeline { entries: ids.iter().copied().map(entry).collect(), divider }
}

fn general_app() -> App {
    let mut app = App::new(Some("ana".into()));
    app.handle(AppEvent::Channels { channels: vec![Channel::general()] });
    app.handle(AppEvent::ChannelActivated {
        channel_id: GENERAL_CHANNEL_ID,
        name: "General".into(),
    });
    app
}

fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        any::<char>().prop_map(KeyInput::Char),
        Just(KeyInput::Backspace),
        Just(KeyInput::Delete),
        Just(KeyInput::Left),
        Just(KeyInput::Right),
        Just(KeyInput::Home),
        Just(KeyInput::Up),
        Just(KeyInput::Down),
        Just(KeyInput::PageUp),
        Just(KeyInput::PageDown),
        Just(KeyInput::End),
        Just(KeyInput::Tab),
    ]
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => key_strategy().prop_map(Step::Key),
        1 => (1u16..200, 1u16..80).prop_map(|(c, r)| Step::Resize(c, r)),
        2 => (prop::collection::btree_set(1u64..500, 0..80), prop::option::of(0usize..80))
            .prop_map(|(ids, divider_at)| Step::Timeline { ids: ids.into_iter().collect(), divider_at }),
        1 => Just(Step::ScrollToBottom),
        1 => (1u64..500).prop_map(Step::ScrollToMessage),
    ]
}

fn apply(app: &mut App, step: Step) -> Vec<AppAction> {
    let event = match step {
        Step::Key(key) => AppEvent::Key(key),
        Step::Resize(cols, rows) => AppEvent::Resize(cols, rows),
        Step::Timeline { ids, divider_at } => AppEvent::Timeline(timeline(&ids, divider_at)),
        Step::ScrollToBottom => AppEvent::ScrollToBottom,
        Step::ScrollToMessage(id) => AppEvent::ScrollToMessage { message_id: id },
    };
    app.handle(event)
}

/// Message on the top row of the viewport, if that row is a message.
fn top_message(app: &App) -> Option<MessageId> {
    let rows = app.view().rows();
    let top = rows.len().checked_sub(app.scroll_offset() + app.viewport_rows())?;
    match rows.get(top)? {
        TimelineRow::Entry(entry) => Some(entry.message.id),
        TimelineRow::Divider => None,
    }
}

proptest! {
    #[test]
    fn random_steps_preserve_invariants(steps in prop::collection::vec(step_strategy(), 1..120)) {
        let registry = InvariantRegistry::standard();
        let mut app = general_app();

        for step in steps {
            apply(&mut app, step);
            let snapshot = SystemSnapshot::single(ClientSnapshot::from_app(&app));
            if let Err(violations) = registry.check_all(&snapshot) {
                let messages: Vec<String> = violations.iter().map(ToString::to_string).collect();
                return Err(TestCaseError::fail(messages.join("; ")));
            }
            prop_assert!(app.input().cursor() <= app.input().buffer().chars().count());
        }
    }

    #[test]
    fn every_unrequested_move_down_is_reported(
        steps in prop::collection::vec(step_strategy(), 1..120),
    ) {
        let mut app = general_app();

        for step in steps {
            let pinned = matches!(step, Step::Key(KeyInput::End) | Step::ScrollToBottom);
            let before = app.scroll_offset();
            let actions = apply(&mut app, step);

            let reported: Vec<usize> = actions
                .iter()
                .filter_map(|a| match a {
                    AppAction::Scrolled { distance_from_bottom } => {
                        usize::try_from(*distance_from_bottom).ok()
                    },
                    _ => None,
                })
                .collect();
            for distance in &reported {
                prop_assert_eq!(*distance, app.scroll_offset());
            }
            if !pinned && app.scroll_offset() < before {
                prop_assert_eq!(reported.len(), 1);
            }
        }
    }

    #[test]
    fn appending_below_keeps_reading_position(
        initial in 20u64..60,
        scroll_up in 1usize..10,
        appended in 1u64..30,
    ) {
        let mut app = general_app();
        app.handle(AppEvent::Resize(80, 16));
        let ids: Vec<MessageId> = (1..=initial).collect();
        app.handle(AppEvent::Timeline(timeline(&ids, None)));

        for _ in 0..scroll_up {
            app.handle(AppEvent::Key(KeyInput::Up));
        }
        prop_assert_eq!(app.scroll_offset(), scroll_up);
        let reading = top_message(&app);
        prop_assert!(reading.is_some());

        let ids: Vec<MessageId> = (1..=initial + appended).collect();
        app.handle(AppEvent::Timeline(timeline(&ids, None)));

        prop_assert_eq!(top_message(&app), reading);
        prop_assert_eq!(app.scroll_offset(), scroll_up + usize::try_from(appended).unwrap());
    }

    #[test]
    fn scroll_to_message_shows_it(count in 1u64..80, rows in 8u16..40, pick in any::<prop::sample::Index>()) {
        let mut app = general_app();
        app.handle(AppEvent::Resize(80, rows));
        let ids: Vec<MessageId> = (1..=count).collect();
        let divider_at = pick.index(ids.len());
        app.handle(AppEvent::Timeline(timeline(&ids, Some(divider_at))));

        let target = ids[divider_at];
        app.handle(AppEvent::ScrollToMessage { message_id: target });

        let all = app.view().rows();
        let bottom = all.len() - app.scroll_offset();
        let top = bottom.saturating_sub(app.viewport_rows());
        let visible: Vec<MessageId> = all[top..bottom]
            .iter()
            .filter_map(|row| match row {
                TimelineRow::Entry(e) => Some(e.message.id),
                TimelineRow::Divider => None,
            })
            .collect();
        prop_assert!(visible.contains(&target));
    }
}
