//! Pollroom core
//!
//! Data model shared by every layer of the Pollroom client: channel and
//! message types as the collaborator service returns them, plus the media
//! tag codec that carries images, voice clips, watch links and meeting
//! announcements inside a plain-text message body.
//!
//! Nothing in this crate performs I/O.
//!
//! # Components
//!
//! - [`Body`]: tagged message payload with an exact wire round-trip
//! - [`Channel`], [`Message`], [`PresenceSnapshot`]: service data model
//! - [`MediaError`]: producer-side validation failures
//! - [`Timestamp`]: instant bound used by the time-driven state machines

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod body;
mod error;
mod model;
mod time;

pub use body::{Body, BodyKind, MAX_ATTACHMENT_BYTES, sanitize_markup};
pub use error::MediaError;
pub use model::{
    Channel, ChannelId, GENERAL_CHANNEL_ID, GENERAL_CHANNEL_NAME, Meeting, Message, MessageId,
    MessagePage, PresenceSnapshot,
};
pub use time::Timestamp;
