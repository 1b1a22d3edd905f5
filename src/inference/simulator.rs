//! Offline stand-in for a real generation backend.
//!
//! Plays a fixed four-step script (entry file, component, edit, summary)
//! chosen from the conversation itself, so it needs no state between calls.

pub mod phase;
pub mod prompt;
pub mod script;
pub mod templates;

use async_trait::async_trait;
use tracing::debug;

use super::InferenceProvider;
use crate::error::InferenceError;
use crate::stream::{spawn_paced, EventStream, ResponseBuilder};
use crate::types::{InferenceRequest, InferenceResponse, Message, Usage};

pub use phase::{classify, tool_message_count, Phase};
pub use prompt::{extract_user_prompt, ComponentKind, ComponentSpec};
pub use script::{play, Script, ENTRY_PATH};

pub const SIMULATOR_MODEL_ID: &str = "mock-claude-sonnet-4-0";

/// Usage reported by `generate`. Not the sum of the per-turn figures the
/// stream reports.
pub const AGGREGATE_USAGE: Usage = Usage::new(100, 200);

/// Deterministic provider used when no backend credential is configured.
pub struct SimulatedProvider {
    model_id: String,
}

impl SimulatedProvider {
    pub fn new() -> Self {
        Self {
            model_id: SIMULATOR_MODEL_ID.into(),
        }
    }

    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    fn turn(messages: &[Message]) -> Script {
        let phase = classify(messages);
        let spec = ComponentSpec::from_prompt(&extract_user_prompt(messages));
        debug!(
            ?phase,
            component = spec.name,
            tool_messages = tool_message_count(messages),
            "simulated turn"
        );
        play(phase, &spec)
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceProvider for SimulatedProvider {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        let mut builder = ResponseBuilder::default();
        for paced in Self::turn(&request.messages) {
            builder.push(paced?.event);
        }
        let mut response = builder.build()?;
        response.usage = AGGREGATE_USAGE;
        Ok(response)
    }

    async fn stream(&self, request: InferenceRequest) -> Result<EventStream, InferenceError> {
        Ok(spawn_paced(Self::turn(&request.messages)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::StreamEvent;
    use crate::tools::{EditorCommand, FileOperation};
    use crate::types::FinishReason;
    use futures::StreamExt;
    use std::time::Duration;
    use tokio::time::Instant;

    fn request(messages: Vec<Message>) -> InferenceRequest {
        InferenceRequest::new(messages)
    }

    fn with_tool_results(prompt: &str, n: usize) -> Vec<Message> {
        let mut history = vec![Message::user(prompt)];
        for i in 0..n {
            history.push(Message::assistant(""));
            history.push(Message::tool_result(format!("call_{i}"), "str_replace_editor", "ok", false));
        }
        history
    }

    #[tokio::test]
    async fn simple_counter_scenario() {
        let provider = SimulatedProvider::new();
        let mut history = vec![Message::user("build me a simple counter")];

        let first = provider.generate(request(history.clone())).await.unwrap();
        assert_eq!(first.finish_reason, FinishReason::ToolCalls);
        assert_eq!(first.tool_calls.len(), 1);
        let FileOperation::Editor(EditorCommand::Create { path, file_text }) =
            first.tool_calls[0].operation().unwrap()
        else {
            panic!("expected create");
        };
        assert_eq!(path, "/App.jsx");
        assert!(file_text.contains("<Counter />"));

        history.push(Message::assistant_with_tool_calls(first.text, &first.tool_calls));
        history.push(Message::tool_result("call_3", "str_replace_editor", "File created", false));

        let second = provider.generate(request(history)).await.unwrap();
        assert_eq!(
            second.tool_calls[0].operation().unwrap(),
            FileOperation::create(
                "/components/Counter.jsx",
                templates::component(ComponentKind::Counter).body
            )
        );
    }

    #[tokio::test]
    async fn generate_reports_fixed_usage() {
        let provider = SimulatedProvider::new();
        for n in 0..5 {
            let resp = provider.generate(request(with_tool_results("card", n))).await.unwrap();
            assert_eq!(resp.usage, Usage::new(100, 200));
        }
    }

    #[tokio::test]
    async fn empty_history_is_bootstrap() {
        let resp = SimulatedProvider::new().generate(request(vec![])).await.unwrap();
        assert_eq!(resp.finish_reason, FinishReason::ToolCalls);
        assert_eq!(resp.tool_calls[0].id, "call_3");
        assert!(resp.text.starts_with("This is a static response."));
    }

    #[tokio::test]
    async fn summarize_stops_without_tool_calls() {
        let resp = SimulatedProvider::new()
            .generate(request(with_tool_results("form", 3)))
            .await
            .unwrap();
        assert!(resp.tool_calls.is_empty());
        assert_eq!(resp.finish_reason, FinishReason::Stop);
        assert!(resp.text.contains("ContactForm.jsx"));
    }

    #[tokio::test(start_paused = true)]
    async fn stream_matches_generate() {
        let provider = SimulatedProvider::new();
        for n in 0..4 {
            let history = with_tool_results("a pricing card", n);
            let blocking = provider.generate(request(history.clone())).await.unwrap();
            let streamed = provider
                .stream(request(history))
                .await
                .unwrap()
                .collect_response()
                .await
                .unwrap();
            assert_eq!(streamed.text, blocking.text);
            assert_eq!(streamed.tool_calls, blocking.tool_calls);
            assert_eq!(streamed.finish_reason, blocking.finish_reason);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stream_preserves_character_timing() {
        let provider = SimulatedProvider::new();
        let mut stream = provider.stream(request(with_tool_results("card", 1))).await.unwrap();

        let mut arrivals = Vec::new();
        while let Some(event) = stream.next().await {
            if let StreamEvent::TextDelta { .. } = event.unwrap() {
                arrivals.push(Instant::now());
            }
        }
        assert_eq!(arrivals.len(), "I'll create a Card component for you.".len());
        for pair in arrivals.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(25));
        }
    }

    #[tokio::test]
    async fn concurrent_calls_do_not_interfere() {
        let provider = std::sync::Arc::new(SimulatedProvider::new());
        let a = {
            let p = provider.clone();
            tokio::spawn(async move { p.generate(request(with_tool_results("form", 1))).await })
        };
        let b = {
            let p = provider.clone();
            tokio::spawn(async move { p.generate(request(with_tool_results("card", 2))).await })
        };
        let a = a.await.unwrap().unwrap();
        let b = b.await.unwrap().unwrap();
        assert!(a.tool_calls[0].arguments.contains("/components/ContactForm.jsx"));
        assert!(b.tool_calls[0].arguments.contains("str_replace"));
        assert!(b.tool_calls[0].arguments.contains("/components/Card.jsx"));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_a_live_stream_ends_its_producer() {
        let metrics = tokio::runtime::Handle::current().metrics();
        let mut stream = SimulatedProvider::new()
            .stream(request(vec![Message::user("a counter")]))
            .await
            .unwrap();
        assert_eq!(metrics.num_alive_tasks(), 1);

        assert!(matches!(
            stream.next().await,
            Some(Ok(StreamEvent::TextDelta { .. }))
        ));
        drop(stream);
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(metrics.num_alive_tasks(), 0);
    }

    #[tokio::test]
    async fn model_id_can_be_overridden() {
        let provider = SimulatedProvider::new().with_model_id("mock-small");
        assert_eq!(provider.model_id(), "mock-small");
        assert_eq!(SimulatedProvider::default().model_id(), SIMULATOR_MODEL_ID);

        let resp = provider.generate(request(vec![Message::user("a form")])).await.unwrap();
        assert_eq!(resp.usage, AGGREGATE_USAGE);
    }
}
