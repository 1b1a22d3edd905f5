use crate::types::{Message, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Form,
    Card,
    Counter,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Form => "form",
            Self::Card => "card",
            Self::Counter => "counter",
        }
    }

    pub fn component_name(&self) -> &'static str {
        match self {
            Self::Form => "ContactForm",
            Self::Card => "Card",
            Self::Counter => "Counter",
        }
    }
}

/// What the simulated turn builds, picked from the latest user request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentSpec {
    pub kind: ComponentKind,
    pub name: &'static str,
}

impl ComponentSpec {
    /// Case-insensitive keyword match; "form" wins over "card", anything
    /// else is a counter.
    pub fn from_prompt(prompt: &str) -> Self {
        let lower = prompt.to_lowercase();
        let kind = if lower.contains("form") {
            ComponentKind::Form
        } else if lower.contains("card") {
            ComponentKind::Card
        } else {
            ComponentKind::Counter
        };
        Self {
            kind,
            name: kind.component_name(),
        }
    }

    pub fn path(&self) -> String {
        format!("/components/{}.jsx", self.name)
    }
}

/// Text of the most recent user message, or empty if there is none.
pub fn extract_user_prompt(history: &[Message]) -> String {
    history
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(Message::text)
        .unwrap_or_default()
}
