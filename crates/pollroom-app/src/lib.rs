//! Application layer for Pollroom
//!
//! Pure state machines and generic runtime for the chat UI, enabling
//! deterministic simulation testing with the same code that runs in
//! production.
//!
//! # Components
//!
//! - [`App`]: UI state machine (input buffer, scrolling, notices, commands)
//! - [`Bridge`]: Client bridge (translates App actions to Client events)
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod action;
mod app;
pub mod attachment;
mod bridge;
mod command;
mod driver;
mod event;
mod input;
mod runtime;
mod state;

pub use action::{AppAction, AttachmentKind};
pub use app::{App, CHROME_ROWS};
pub use attachment::AttachmentError;
pub use bridge::Bridge;
pub use command::{Command, parse as parse_command};
pub use driver::Driver;
pub use event::AppEvent;
pub use input::{InputState, KeyInput};
pub use runtime::Runtime;
pub use state::{ChatView, TimelineRow};
