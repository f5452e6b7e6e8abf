//! # Identifier Newtypes
//!
//! Newtype wrappers for every identifier that crosses the client boundary.
//! Server-assigned identifiers are opaque strings: the client never parses
//! them, it only carries them back on subsequent calls.
//!
//! Identifiers serialize transparently, so `SessionId("abc")` is the JSON
//! string `"abc"` on the wire.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix for message ids generated locally before the server echoes them.
pub const PROVISIONAL_USER_PREFIX: &str = "temp-";

/// Prefix for assistant message ids built from a send-message response.
pub const PROVISIONAL_ASSISTANT_PREFIX: &str = "temp-assistant-";

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier string.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Wrap a raw identifier, treating blank input as absent.
            pub fn parse(raw: &str) -> Option<Self> {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(Self(trimmed.to_string()))
                }
            }

            /// Borrow the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier is the empty string.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

opaque_id!(
    /// Server-assigned conversation session identifier. Immutable after creation.
    SessionId
);

opaque_id!(
    /// Stable user identifier supplied by the identity provider.
    UserId
);

opaque_id!(
    /// Conversation message identifier.
    ///
    /// User messages carry a locally generated provisional id until the
    /// server history replaces them; assistant messages carry either a
    /// server id or a provisional id built from a send response.
    MessageId
);

opaque_id!(
    /// Unique, stable identifier of a checklist line.
    RecommendationId
);

opaque_id!(
    /// Identifier of a stored document record.
    DocumentId
);

opaque_id!(
    /// Stable key matching an uploaded file to its checklist line
    /// (e.g. `matricula_imovel_1`).
    DocumentKey
);

impl MessageId {
    /// Generate a provisional id for an optimistic user message.
    pub fn provisional_user() -> Self {
        Self(format!("{PROVISIONAL_USER_PREFIX}{}", Uuid::new_v4()))
    }

    /// Generate a provisional id for an assistant message built locally.
    pub fn provisional_assistant() -> Self {
        Self(format!("{PROVISIONAL_ASSISTANT_PREFIX}{}", Uuid::new_v4()))
    }

    /// Whether this id was generated locally rather than by the server.
    pub fn is_provisional(&self) -> bool {
        self.0.starts_with(PROVISIONAL_USER_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_transparently() {
        let id = SessionId::new("3f2a");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"3f2a\"");
        let back: SessionId = serde_json::from_str("\"3f2a\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn parse_treats_blank_as_absent() {
        assert!(RecommendationId::parse("").is_none());
        assert!(RecommendationId::parse("   ").is_none());
        assert_eq!(
            RecommendationId::parse(" rec_1 ").unwrap().as_str(),
            "rec_1"
        );
    }

    #[test]
    fn provisional_ids_are_prefixed_and_unique() {
        let a = MessageId::provisional_user();
        let b = MessageId::provisional_user();
        assert!(a.as_str().starts_with("temp-"));
        assert!(a.is_provisional());
        assert_ne!(a, b);

        let asst = MessageId::provisional_assistant();
        assert!(asst.as_str().starts_with("temp-assistant-"));
    }

    #[test]
    fn server_ids_are_not_provisional() {
        assert!(!MessageId::new("9b1c0e2a").is_provisional());
    }

    #[test]
    fn display_is_raw_value() {
        assert_eq!(DocumentKey::new("rg").to_string(), "rg");
    }
}
