//! Fuzz target for MessageStore
//!
//! Random pages (duplicates, foreign channels, any order) interleaved with
//! delete begin/confirm/rollback and channel resets. After every step the
//! visible list must be strictly ascending, belong to one channel and never
//! show a message whose delete is pending or confirmed.

#![no_main]

use std::collections::BTreeSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pollroom_client::MessageStore;
use pollroom_core::Message;

#[derive(Debug, Arbitrary)]
enum Op {
    Merge(Vec<(u8, u8)>),
    BeginDelete(u8),
    ConfirmDelete(u8),
    RollbackDelete(u8),
    Reset(u8),
}

fn message(id: u8, channel: u8) -> Message {
    Message {
        id: u64::from(id),
        channel_id: u64::from(channel % 3),
        author: "fuzz".to_string(),
        body: String::new(),
        timestamp: String::new(),
    }
}

fuzz_target!(|ops: Vec<Op>| {
    let mut store = MessageStore::new();
    let mut hidden = BTreeSet::new();

    for op in ops {
        match op {
            Op::Merge(page) => {
                store.merge(page.into_iter().map(|(id, ch)| message(id, ch)).collect());
            },
            Op::BeginDelete(id) => {
                if store.begin_delete(u64::from(id)).is_some() {
                    hidden.insert(u64::from(id));
                }
            },
            Op::ConfirmDelete(id) => {
                store.confirm_delete(u64::from(id));
            },
            Op::RollbackDelete(id) => {
                if store.rollback_delete(u64::from(id)) {
                    hidden.remove(&u64::from(id));
                }
            },
            Op::Reset(channel) => {
                store.reset(u64::from(channel % 3) + 1);
                hidden.clear();
            },
        }

        let messages = store.messages();
        assert!(messages.windows(2).all(|w| w[0].id < w[1].id), "not ascending");
        assert!(messages.iter().all(|m| Some(m.channel_id) == store.channel_id()));
        assert!(messages.iter().all(|m| !hidden.contains(&m.id)), "deleted message visible");
    }
});
