use serde::{Deserialize, Serialize};

use crate::types::{FinishReason, ToolCall, Usage};

/// One unit of an assistant turn, in emission order:
/// any number of `TextDelta`, at most one `ToolCall`, then exactly one `Finish`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamEvent {
    #[serde(rename_all = "camelCase")]
    TextDelta { text_delta: String },
    ToolCall(ToolCall),
    #[serde(rename_all = "camelCase")]
    Finish {
        finish_reason: FinishReason,
        usage: Usage,
    },
}

impl StreamEvent {
    pub fn text(fragment: impl Into<String>) -> Self {
        Self::TextDelta {
            text_delta: fragment.into(),
        }
    }

    pub fn is_finish(&self) -> bool {
        matches!(self, Self::Finish { .. })
    }
}
