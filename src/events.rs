//! Events delivered by the network layer.
//!
//! Events are serialized as adjacently tagged JSON so a network transport can
//! hand them over as-is:
//!
//! ```rust
//! use frochat::events::{EventKind, InboundEvent};
//!
//! let event = InboundEvent::from_json(r#"{"type":"say","data":{"eid":"p1","msg":"hi"}}"#).unwrap();
//! assert_eq!(event.kind(), EventKind::Say);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The kinds of network events a chatbox subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Say,
    Join,
    Leave,
}

impl EventKind {
    pub const ALL: [Self; 3] = [Self::Say, Self::Join, Self::Leave];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Say => "say",
            Self::Join => "join",
            Self::Leave => "leave",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inbound presence or chat event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum InboundEvent {
    /// An entity said something.
    Say {
        /// Speaking entity.
        eid: String,
        /// Raw, untrusted message text.
        msg: String,
    },
    /// Someone joined. The entity may not be registered yet.
    Join {
        eid: String,
        /// Raw, untrusted nickname.
        nick: String,
    },
    /// An entity left the world.
    Leave {
        eid: String,
        /// Raw, untrusted reason text.
        reason: String,
    },
}

impl InboundEvent {
    pub fn say(eid: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Say {
            eid: eid.into(),
            msg: msg.into(),
        }
    }

    pub fn join(eid: impl Into<String>, nick: impl Into<String>) -> Self {
        Self::Join {
            eid: eid.into(),
            nick: nick.into(),
        }
    }

    pub fn leave(eid: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Leave {
            eid: eid.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Say { .. } => EventKind::Say,
            Self::Join { .. } => EventKind::Join,
            Self::Leave { .. } => EventKind::Leave,
        }
    }

    /// Entity the event refers to.
    #[must_use]
    pub fn eid(&self) -> &str {
        match self {
            Self::Say { eid, .. } | Self::Join { eid, .. } | Self::Leave { eid, .. } => eid,
        }
    }

    /// Decode an event from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatboxError;

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(InboundEvent::leave("e7", "timeout")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "leave", "data": {"eid": "e7", "reason": "timeout"}})
        );
    }

    #[test]
    fn test_decode_join() {
        let event =
            InboundEvent::from_json(r#"{"type":"join","data":{"eid":"e1","nick":"bob"}}"#)
                .unwrap();
        assert_eq!(event, InboundEvent::join("e1", "bob"));
        assert_eq!(event.kind(), EventKind::Join);
        assert_eq!(event.eid(), "e1");
    }

    #[test]
    fn test_decode_rejects_unknown_kind() {
        let err = InboundEvent::from_json(r#"{"type":"whisper","data":{}}"#).unwrap_err();
        assert!(matches!(err, ChatboxError::Decode(_)));
    }

    #[test]
    fn test_kind_names() {
        let names: Vec<String> = EventKind::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["say", "join", "leave"]);
    }
}
