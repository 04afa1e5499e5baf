//! Handler module - inbound dispatch and change echoing.
//!
//! Provides:
//! - [`Handler`] - routes envelopes to the bound element and posts replies
//! - [`ElementBinding`] - what an element must offer to be bound
//! - [`Silencer`] - suppresses change echoes during programmatic writes

mod base;
mod element;
mod silence;

pub use base::Handler;
pub use element::{BoxFuture, ElementBinding};
pub use silence::{ChangeCallback, SilenceGuard, Silencer};
