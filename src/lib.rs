pub mod config;
pub mod error;
pub mod events;
pub mod inference;
pub mod stream;
pub mod tools;
pub mod types;

pub use config::{build_provider, ProviderConfig};
pub use error::InferenceError;
pub use events::StreamEvent;
pub use inference::simulator::{ComponentKind, ComponentSpec, Phase};
pub use inference::{AnthropicProvider, InferenceProvider, SimulatedProvider};
pub use stream::EventStream;
pub use tools::{EditorCommand, FileManagerCommand, FileOperation};
pub use types::{
    ContentPart, FinishReason, InferenceRequest, InferenceResponse, Message, MessageContent, Role,
    ToolCall, Usage,
};
