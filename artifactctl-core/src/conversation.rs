use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sender {
    User,
    Assistant,
    #[default]
    Unknown,
}

impl Sender {
    pub fn from_export_value(value: &Value) -> Sender {
        value
            .as_str()
            .map(|s| match s {
                "assistant" => Sender::Assistant,
                "human" | "user" => Sender::User,
                _ => Sender::Unknown,
            })
            .unwrap_or(Sender::Unknown)
    }
}

/// One fragment of a structured message body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentBlock {
    pub text: Option<String>,
}

/// The historical shapes a message body has been delivered in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MessageBody {
    /// `content` as a bare string
    Plain(String),
    /// `content` as an ordered list of blocks
    Blocks(Vec<ContentBlock>),
    /// the old top-level `text` field
    Legacy(String),
    #[default]
    Empty,
}

impl MessageBody {
    fn from_export(content: &Value, text: &Value) -> MessageBody {
        match content {
            Value::String(s) => return MessageBody::Plain(s.clone()),
            Value::Array(items) => {
                let blocks = items
                    .iter()
                    .map(|item| ContentBlock {
                        text: item.get("text").and_then(|t| t.as_str()).map(str::to_owned),
                    })
                    .collect();
                return MessageBody::Blocks(blocks);
            }
            _ => {}
        }

        match text {
            Value::String(s) => MessageBody::Legacy(s.clone()),
            _ => MessageBody::Empty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawMessage")]
pub struct Message {
    pub sender: Sender,
    pub body: MessageBody,
}

impl Message {
    pub fn new(sender: Sender, body: MessageBody) -> Self {
        Self { sender, body }
    }

    pub fn is_assistant(&self) -> bool {
        self.sender == Sender::Assistant
    }
}

/// Wire shape of a message. Bodies are kept as raw JSON so that an
/// unexpected type degrades to "no text" instead of a decode error.
#[derive(Deserialize)]
struct RawMessage {
    #[serde(default)]
    sender: Value,
    #[serde(default)]
    role: Value,
    #[serde(default)]
    content: Value,
    #[serde(default)]
    text: Value,
}

impl From<RawMessage> for Message {
    fn from(raw: RawMessage) -> Self {
        // Anthropic exports use "sender", older dumps "role"
        let sender = if raw.sender.is_null() {
            Sender::from_export_value(&raw.role)
        } else {
            Sender::from_export_value(&raw.sender)
        };
        Self {
            sender,
            body: MessageBody::from_export(&raw.content, &raw.text),
        }
    }
}

/// Collapse any message body shape into the plain text the tag parser reads.
///
/// Fragments are concatenated in order with no separator. A message with no
/// textual content yields an empty string.
pub fn normalize(message: &Message) -> String {
    match &message.body {
        MessageBody::Plain(text) | MessageBody::Legacy(text) => text.clone(),
        MessageBody::Blocks(blocks) => blocks
            .iter()
            .filter_map(|block| block.text.as_deref())
            .collect(),
        MessageBody::Empty => String::new(),
    }
}

/// One entry of the conversation index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    #[serde(alias = "uuid")]
    pub id: String,
    #[serde(default, alias = "name", alias = "title")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversationFull {
    #[serde(alias = "uuid")]
    pub id: String,
    #[serde(default, alias = "name", alias = "title")]
    pub display_name: Option<String>,
    /// `None` when the payload carried no message list at all
    #[serde(default, alias = "chat_messages")]
    pub messages: Option<Vec<Message>>,
}

impl ConversationFull {
    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
        }
    }
}

/// Label used in progress output; falls back to the id for unnamed chats.
pub fn progress_label(summary: &ConversationSummary) -> String {
    match summary.display_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => summary.id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TAGGED: &str =
        "Here:\n<antArtifact title=\"a.py\" language=\"python\">print(1)</antArtifact>";

    #[test]
    fn plain_block_and_legacy_bodies_normalize_alike() {
        let plain: Message = serde_json::from_value(json!({
            "sender": "assistant",
            "content": TAGGED,
        }))
        .unwrap();
        let blocks: Message = serde_json::from_value(json!({
            "sender": "assistant",
            "content": [
                {"type": "text", "text": "Here:\n<antArtifact title=\"a.py\" "},
                {"type": "tool_use", "name": "noop"},
                {"type": "text", "text": "language=\"python\">print(1)</antArtifact>"}
            ],
            "text": "ignored when blocks are present",
        }))
        .unwrap();
        let legacy: Message = serde_json::from_value(json!({
            "sender": "assistant",
            "text": TAGGED,
        }))
        .unwrap();

        assert!(matches!(plain.body, MessageBody::Plain(_)));
        assert!(matches!(blocks.body, MessageBody::Blocks(_)));
        assert!(matches!(legacy.body, MessageBody::Legacy(_)));
        assert_eq!(normalize(&plain), TAGGED);
        assert_eq!(normalize(&blocks), TAGGED);
        assert_eq!(normalize(&legacy), TAGGED);
    }

    #[test]
    fn odd_body_shapes_become_empty_text() {
        let msg: Message = serde_json::from_value(json!({
            "sender": "assistant",
            "content": 42,
            "text": {"nested": true},
            "extra": "ignored",
        }))
        .unwrap();
        assert_eq!(msg.body, MessageBody::Empty);
        assert_eq!(normalize(&msg), "");

        let bare: Message = serde_json::from_value(json!({})).unwrap();
        assert_eq!(bare.sender, Sender::Unknown);
        assert_eq!(normalize(&bare), "");
    }

    #[test]
    fn sender_aliases() {
        let human: Message =
            serde_json::from_value(json!({"sender": "human", "text": "hi"})).unwrap();
        let user: Message = serde_json::from_value(json!({"role": "user", "text": "hi"})).unwrap();
        let bot: Message = serde_json::from_value(json!({"sender": "assistant"})).unwrap();
        assert_eq!(human.sender, Sender::User);
        assert_eq!(user.sender, Sender::User);
        assert!(bot.is_assistant());
    }

    #[test]
    fn conversation_accepts_anthropic_field_names() {
        let conv: ConversationFull = serde_json::from_value(json!({
            "uuid": "c-1",
            "name": "Refactor",
            "chat_messages": [{"sender": "human", "text": "go"}],
            "created_at": "2025-01-14T12:00:00Z",
        }))
        .unwrap();
        assert_eq!(conv.id, "c-1");
        assert_eq!(conv.display_name.as_deref(), Some("Refactor"));
        assert_eq!(conv.messages.as_ref().map(Vec::len), Some(1));

        let bare: ConversationFull = serde_json::from_value(json!({"uuid": "c-2"})).unwrap();
        assert!(bare.messages.is_none());
        assert_eq!(progress_label(&bare.summary()), "c-2");
    }
}
