//! Transport module - the page message channel.
//!
//! Provides:
//! - [`page_channel`] - in-process channel pair with same-origin delivery
//! - JSON-lines stdio forwarding for running a bridge as a child of the
//!   injector process

mod port;
mod stdio;

pub use port::{page_channel, InjectorLink, PagePort, PageSide, PostedMessage};
pub use stdio::{forward_lines, forward_stdin_lines, write_envelopes};
