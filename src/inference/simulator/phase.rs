use std::time::Duration;

use crate::types::{Message, Role};

/// Step of the canned conversation, derived from how many tool results the
/// history already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No tool results yet: write the entry file.
    Bootstrap,
    /// One tool result: write the component file.
    Scaffold,
    /// Two tool results: edit the component file.
    Enhance,
    /// Three or more: wrap up without a tool call.
    Summarize,
}

impl Phase {
    pub fn from_tool_count(count: usize) -> Self {
        match count {
            0 => Self::Bootstrap,
            1 => Self::Scaffold,
            2 => Self::Enhance,
            _ => Self::Summarize,
        }
    }

    /// Delay after each streamed character.
    pub fn char_pause(&self) -> Duration {
        match self {
            Self::Bootstrap => Duration::from_millis(15),
            Self::Scaffold | Self::Enhance => Duration::from_millis(25),
            Self::Summarize => Duration::from_millis(30),
        }
    }
}

pub fn tool_message_count(history: &[Message]) -> usize {
    history.iter().filter(|m| m.role == Role::Tool).count()
}

/// Phase for the next assistant turn. Looks only at message roles.
pub fn classify(history: &[Message]) -> Phase {
    Phase::from_tool_count(tool_message_count(history))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_with_tools(n: usize) -> Vec<Message> {
        let mut history = vec![Message::user("build me a card")];
        for i in 0..n {
            history.push(Message::assistant("working"));
            history.push(Message::tool_result(format!("call_{i}"), "str_replace_editor", "ok", false));
        }
        history
    }

    #[test]
    fn phase_by_tool_count() {
        assert_eq!(classify(&[]), Phase::Bootstrap);
        assert_eq!(classify(&history_with_tools(0)), Phase::Bootstrap);
        assert_eq!(classify(&history_with_tools(1)), Phase::Scaffold);
        assert_eq!(classify(&history_with_tools(2)), Phase::Enhance);
        assert_eq!(classify(&history_with_tools(3)), Phase::Summarize);
    }

    #[test]
    fn phase_saturates() {
        assert_eq!(classify(&history_with_tools(4)), Phase::Summarize);
        assert_eq!(classify(&history_with_tools(12)), Phase::Summarize);
    }

    #[test]
    fn classify_is_pure() {
        let history = history_with_tools(2);
        assert_eq!(classify(&history), classify(&history));
    }

    #[test]
    fn other_roles_do_not_count() {
        let history = vec![
            Message::system("be brief"),
            Message::user("tool tool tool"),
            Message::assistant("tool"),
            Message::user("form"),
        ];
        assert_eq!(classify(&history), Phase::Bootstrap);
    }
}
