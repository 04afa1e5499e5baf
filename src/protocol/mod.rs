//! Protocol module - envelopes and the fixed message vocabulary.
//!
//! This module describes what travels over the page message channel:
//! - `{type, uuid, payload}` envelopes in both directions
//! - the inbound kinds (`getValue`, `setValue`) and outbound kinds
//!   (`value`, `change`, `ready`)
//! - the update options bag passed along with `setValue`

mod envelope;
mod kind;
mod options;

pub use envelope::{decode_envelope, encode_envelope, InboundEnvelope, OutboundEnvelope};
pub use kind::{MessageKind, OutboundKind};
pub use options::UpdateOptions;
