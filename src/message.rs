use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message in a conversation, containing a role, text content, and the
/// time it was produced.
///
/// Messages are immutable once appended to a conversation. Each message has
/// a role (typically "user", "assistant", or "system"), text content, and a
/// UTC timestamp assigned at construction.
///
/// # Examples
///
/// ```
/// use docchat::message::Message;
///
/// let user_msg = Message::user("What does the document say about caching?");
/// let assistant_msg = Message::assistant("It caches chunks for 24 hours.");
/// let system_msg = Message::system("You answer questions about one document.");
///
/// assert!(user_msg.has_role(Message::USER));
/// assert!(user_msg.timestamp <= assistant_msg.timestamp);
/// ```
///
/// # Serialization
///
/// Messages serialize to the persistence shape `{role, content, timestamp}`
/// with an RFC3339 timestamp:
/// ```
/// use docchat::message::Message;
///
/// let msg = Message::user("test");
/// let json = serde_json::to_string(&msg).unwrap();
/// let parsed: Message = serde_json::from_str(&json).unwrap();
/// assert_eq!(msg, parsed);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message sender (e.g., "user", "assistant", "system").
    ///
    /// Use the constants on [`Message`] for standardized values.
    pub role: String,
    /// The text content of the message.
    pub content: String,
    /// When the message was produced (UTC).
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// User input message role.
    pub const USER: &'static str = "user";
    /// AI assistant response message role.
    pub const ASSISTANT: &'static str = "assistant";
    /// System prompt or instruction message role.
    pub const SYSTEM: &'static str = "system";

    /// Creates a new message with the specified role and content, stamped
    /// with the current time.
    #[must_use]
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a user message with the specified content.
    #[must_use]
    pub fn user(content: &str) -> Self {
        Self::new(Self::USER, content)
    }

    /// Creates an assistant message with the specified content.
    #[must_use]
    pub fn assistant(content: &str) -> Self {
        Self::new(Self::ASSISTANT, content)
    }

    /// Creates a system message with the specified content.
    #[must_use]
    pub fn system(content: &str) -> Self {
        Self::new(Self::SYSTEM, content)
    }

    /// Returns true if this message has the specified role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}
