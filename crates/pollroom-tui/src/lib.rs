//! Terminal UI for Pollroom
//!
//! A thin shell over [`pollroom_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`pollroom_app::Runtime`].
//!
//! This crate only handles terminal input, rendering and launching the
//! external viewer for meeting links.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod terminal;
pub mod ui;

pub use pollroom_app::{App, AppAction, AppEvent, Bridge, Driver, KeyInput, Runtime};
pub use terminal::{TerminalDriver, TerminalError};
