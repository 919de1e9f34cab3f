use serde::{Deserialize, Serialize};

use super::content::Content;
use super::tool::ToolCall;

/// A single transcript entry, provider-agnostic.
///
/// Serialized with a `role` tag so transcripts can be stored as-is in a
/// checkpoint and replayed to any chat provider later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// Instructions prepended once per conversation
    System { content: Content },

    /// Shopper turn
    #[serde(rename = "user")]
    Human { content: Content },

    /// Assistant turn, either text, tool calls or both
    #[serde(rename = "assistant")]
    AI {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<Content>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },
}

impl Message {
    pub fn system(content: impl Into<Content>) -> Self {
        Self::System {
            content: content.into(),
        }
    }

    pub fn human(content: impl Into<Content>) -> Self {
        Self::Human {
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<Content>) -> Self {
        Self::AI {
            content: Some(content.into()),
            tool_calls: None,
        }
    }

    pub fn ai_with_tools(tool_calls: Vec<ToolCall>) -> Self {
        Self::AI {
            content: None,
            tool_calls: Some(tool_calls),
        }
    }

    pub fn role(&self) -> &str {
        match self {
            Self::System { .. } => "system",
            Self::Human { .. } => "user",
            Self::AI { .. } => "assistant",
        }
    }

    /// Plain text of the message, if it carries any
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::System { content } | Self::Human { content } => Some(content.as_text()),
            Self::AI { content, .. } => content.as_ref().map(Content::as_text),
        }
    }
}
