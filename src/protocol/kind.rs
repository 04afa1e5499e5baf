//! The fixed message vocabulary.
//!
//! Inbound kinds are resolved through a static table instead of building
//! method names at runtime. A kind missing from the table is not an error:
//! newer injectors may send kinds an older page script does not know.

/// Message kinds the page handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Read the element value; answered with [`OutboundKind::Value`].
    GetValue,
    /// Write the element value. No direct answer.
    SetValue,
}

/// Wire name → kind.
const INBOUND_KINDS: &[(&str, MessageKind)] = &[
    ("getValue", MessageKind::GetValue),
    ("setValue", MessageKind::SetValue),
];

impl MessageKind {
    /// Look up a kind by its wire name. Matching is exact.
    pub fn from_wire(name: &str) -> Option<Self> {
        INBOUND_KINDS
            .iter()
            .find(|(wire, _)| *wire == name)
            .map(|(_, kind)| *kind)
    }

    /// Wire name of this kind.
    pub fn as_wire(self) -> &'static str {
        match self {
            MessageKind::GetValue => "getValue",
            MessageKind::SetValue => "setValue",
        }
    }
}

/// Message kinds the page sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutboundKind {
    /// Current element value, `{ text }`.
    Value,
    /// Element changed, injector should re-fetch. Empty payload.
    Change,
    /// Handler is set up, `{ extension? }`.
    Ready,
}

impl OutboundKind {
    /// Wire name of this kind.
    pub fn as_wire(self) -> &'static str {
        match self {
            OutboundKind::Value => "value",
            OutboundKind::Change => "change",
            OutboundKind::Ready => "ready",
        }
    }
}
