use std::collections::HashMap;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::InferenceProvider;
use crate::error::InferenceError;
use crate::events::StreamEvent;
use crate::stream::{EventResult, EventStream};
use crate::types::{
    ContentPart, FinishReason, InferenceRequest, InferenceResponse, Message, MessageContent, Role,
    ToolCall, Usage,
};

pub const DEFAULT_MODEL: &str = "claude-haiku-4-5";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Claude API client via Anthropic's messages endpoint.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_key)
    }

    pub fn with_client(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn body(&self, request: InferenceRequest, stream: bool) -> Value {
        let (system, messages) = convert_messages(request.system, &request.messages);
        let mut body = json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "messages": messages,
        });
        if let Some(system) = system {
            body["system"] = Value::String(system);
        }
        if !request.tools.is_empty() {
            body["tools"] = Value::Array(request.tools);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }
        if stream {
            body["stream"] = Value::Bool(true);
        }
        body
    }

    async fn send(&self, body: &Value) -> Result<reqwest::Response, InferenceError> {
        let resp = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body = resp
                .text()
                .await
                .map_err(|e| InferenceError::Request(e.to_string()))?;
            return Err(InferenceError::ApiError { status, body });
        }
        Ok(resp)
    }
}

#[async_trait]
impl InferenceProvider for AnthropicProvider {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        let body = self.body(request, false);
        debug!(model = %self.model, "anthropic generate");
        let text = self
            .send(&body)
            .await?
            .text()
            .await
            .map_err(|e| InferenceError::Request(e.to_string()))?;

        let parsed: Value =
            serde_json::from_str(&text).map_err(|e| InferenceError::Parse(e.to_string()))?;
        parse_response(&parsed)
    }

    async fn stream(&self, request: InferenceRequest) -> Result<EventStream, InferenceError> {
        let body = self.body(request, true);
        debug!(model = %self.model, "anthropic stream");
        let resp = self.send(&body).await?;

        let (tx, rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        tokio::spawn(forward(resp.bytes_stream(), tx, cancel.clone()));
        Ok(EventStream::from_channel(rx, cancel))
    }
}

/// Split system text out and map our history onto Anthropic message shapes.
/// Tool results travel as `user` messages with `tool_result` blocks.
fn convert_messages(system: Option<String>, messages: &[Message]) -> (Option<String>, Vec<Value>) {
    let mut system_parts: Vec<String> = system.into_iter().collect();
    let mut out = Vec::new();

    for msg in messages {
        let role = match msg.role {
            Role::System => {
                system_parts.push(msg.text());
                continue;
            }
            Role::User | Role::Tool => "user",
            Role::Assistant => "assistant",
        };
        out.push(json!({ "role": role, "content": content_blocks(&msg.content) }));
    }

    let system = (!system_parts.is_empty()).then(|| system_parts.join("\n\n"));
    (system, out)
}

fn content_blocks(content: &MessageContent) -> Value {
    let parts = match content {
        MessageContent::Text(text) => return Value::String(text.clone()),
        MessageContent::Parts(parts) => parts,
    };
    parts
        .iter()
        .map(|part| match part {
            ContentPart::Text { text } => json!({ "type": "text", "text": text }),
            ContentPart::ToolCall {
                tool_call_id,
                tool_name,
                args,
            } => json!({
                "type": "tool_use",
                "id": tool_call_id,
                "name": tool_name,
                "input": args,
            }),
            ContentPart::ToolResult {
                tool_call_id,
                result,
                is_error,
                ..
            } => json!({
                "type": "tool_result",
                "tool_use_id": tool_call_id,
                "content": match result {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                },
                "is_error": is_error,
            }),
        })
        .collect()
}

fn map_stop_reason(reason: &str) -> Result<FinishReason, InferenceError> {
    match reason {
        "end_turn" | "stop_sequence" => Ok(FinishReason::Stop),
        "tool_use" => Ok(FinishReason::ToolCalls),
        "max_tokens" => Ok(FinishReason::Length),
        other => Err(InferenceError::Parse(format!("unknown stop_reason: {other}"))),
    }
}

fn parse_response(parsed: &Value) -> Result<InferenceResponse, InferenceError> {
    let finish_reason = map_stop_reason(parsed["stop_reason"].as_str().unwrap_or("unknown"))?;

    let mut text = String::new();
    let mut tool_calls = Vec::new();
    for block in parsed["content"].as_array().into_iter().flatten() {
        match block["type"].as_str() {
            Some("text") => text.push_str(block["text"].as_str().unwrap_or("")),
            Some("tool_use") => {
                let (Some(id), Some(name)) = (block["id"].as_str(), block["name"].as_str()) else {
                    continue;
                };
                tool_calls.push(ToolCall {
                    id: id.to_string(),
                    name: name.to_string(),
                    arguments: block["input"].to_string(),
                });
            }
            _ => {}
        }
    }

    let usage = Usage {
        prompt_tokens: parsed["usage"]["input_tokens"].as_u64().unwrap_or(0) as u32,
        completion_tokens: parsed["usage"]["output_tokens"].as_u64().unwrap_or(0) as u32,
    };

    Ok(InferenceResponse {
        text,
        tool_calls,
        finish_reason,
        usage,
    })
}

/// Read the SSE body and forward translated events until `message_stop`.
async fn forward<S, B, E>(bytes: S, tx: mpsc::Sender<EventResult>, cancel: CancellationToken)
where
    S: Stream<Item = Result<B, E>> + Send,
    B: AsRef<[u8]> + Send,
    E: std::fmt::Display + Send,
{
    let mut events = Box::pin(bytes.eventsource());
    let mut state = StreamState::default();

    loop {
        let sse = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("anthropic stream cancelled");
                return;
            }
            sse = events.next() => sse,
        };
        let sse = match sse {
            Some(Ok(sse)) => sse,
            Some(Err(e)) => {
                let _ = tx.send(Err(InferenceError::Request(e.to_string()))).await;
                return;
            }
            None => return,
        };
        trace!(event = %sse.event, "anthropic sse");

        match state.apply(&sse.data) {
            Ok(Some(event)) => {
                let finished = event.is_finish();
                if tx.send(Ok(event)).await.is_err() || finished {
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => {
                let _ = tx.send(Err(e)).await;
                return;
            }
        }
    }
}

#[derive(Debug)]
struct PendingTool {
    id: String,
    name: String,
    input_json: String,
}

/// Accumulates streamed tool input and usage across SSE events.
#[derive(Debug, Default)]
struct StreamState {
    tools: HashMap<u64, PendingTool>,
    finish_reason: Option<FinishReason>,
    usage: Usage,
}

impl StreamState {
    fn apply(&mut self, data: &str) -> Result<Option<StreamEvent>, InferenceError> {
        let event: Value =
            serde_json::from_str(data).map_err(|e| InferenceError::Parse(e.to_string()))?;
        let index = event["index"].as_u64().unwrap_or(0);

        match event["type"].as_str().unwrap_or("") {
            "message_start" => {
                self.usage.prompt_tokens =
                    event["message"]["usage"]["input_tokens"].as_u64().unwrap_or(0) as u32;
            }
            "content_block_start" => {
                let block = &event["content_block"];
                if block["type"] == "tool_use" {
                    self.tools.insert(
                        index,
                        PendingTool {
                            id: block["id"].as_str().unwrap_or_default().to_string(),
                            name: block["name"].as_str().unwrap_or_default().to_string(),
                            input_json: String::new(),
                        },
                    );
                }
            }
            "content_block_delta" => {
                let delta = &event["delta"];
                match delta["type"].as_str() {
                    Some("text_delta") => {
                        let text = delta["text"].as_str().unwrap_or_default();
                        return Ok(Some(StreamEvent::text(text)));
                    }
                    Some("input_json_delta") => {
                        if let Some(tool) = self.tools.get_mut(&index) {
                            tool.input_json
                                .push_str(delta["partial_json"].as_str().unwrap_or_default());
                        }
                    }
                    _ => {}
                }
            }
            "content_block_stop" => {
                if let Some(tool) = self.tools.remove(&index) {
                    let arguments = if tool.input_json.is_empty() {
                        "{}".to_string()
                    } else {
                        tool.input_json
                    };
                    return Ok(Some(StreamEvent::ToolCall(ToolCall {
                        id: tool.id,
                        name: tool.name,
                        arguments,
                    })));
                }
            }
            "message_delta" => {
                if let Some(reason) = event["delta"]["stop_reason"].as_str() {
                    self.finish_reason = Some(map_stop_reason(reason)?);
                }
                if let Some(output) = event["usage"]["output_tokens"].as_u64() {
                    self.usage.completion_tokens = output as u32;
                }
            }
            "message_stop" => {
                return Ok(Some(StreamEvent::Finish {
                    finish_reason: self.finish_reason.unwrap_or(FinishReason::Stop),
                    usage: self.usage,
                }));
            }
            "error" => {
                return Err(InferenceError::ApiError {
                    status: 200,
                    body: event["error"].to_string(),
                });
            }
            _ => {}
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_history() {
        let call = ToolCall {
            id: "toolu_1".into(),
            name: "str_replace_editor".into(),
            arguments: r#"{"command":"view","path":"/App.jsx"}"#.into(),
        };
        let history = vec![
            Message::system("use tailwind"),
            Message::user("build a card"),
            Message::assistant_with_tool_calls("looking", &[call]),
            Message::tool_result("toolu_1", "str_replace_editor", "file body", false),
        ];
        let (system, messages) = convert_messages(Some("base".into()), &history);

        assert_eq!(system.as_deref(), Some("base\n\nuse tailwind"));
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], json!({ "role": "user", "content": "build a card" }));
        assert_eq!(messages[1]["content"][1]["type"], "tool_use");
        assert_eq!(messages[1]["content"][1]["input"]["path"], "/App.jsx");
        assert_eq!(messages[2]["role"], "user");
        assert_eq!(messages[2]["content"][0]["tool_use_id"], "toolu_1");
        assert_eq!(messages[2]["content"][0]["content"], "file body");
    }

    #[test]
    fn body_uses_configured_model() {
        let provider = AnthropicProvider::new("key");
        let body = provider.body(InferenceRequest::new(vec![Message::user("hi")]), true);
        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["stream"], true);
        assert!(body.get("system").is_none());
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn request_system_prompt_leads_system_text() {
        let provider = AnthropicProvider::new("key");
        let request = InferenceRequest::new(vec![Message::system("use tailwind"), Message::user("hi")])
            .with_system("base");
        let body = provider.body(request, false);
        assert_eq!(body["system"], "base\n\nuse tailwind");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn parses_blocking_response() {
        let parsed = json!({
            "stop_reason": "tool_use",
            "content": [
                { "type": "text", "text": "Creating it." },
                { "type": "tool_use", "id": "toolu_1", "name": "str_replace_editor",
                  "input": { "command": "create", "path": "/App.jsx", "file_text": "x" } }
            ],
            "usage": { "input_tokens": 12, "output_tokens": 34 }
        });
        let resp = parse_response(&parsed).unwrap();
        assert_eq!(resp.text, "Creating it.");
        assert_eq!(resp.finish_reason, FinishReason::ToolCalls);
        assert_eq!(resp.usage, Usage::new(12, 34));
        assert_eq!(resp.tool_calls[0].status_label(), "Created /App.jsx");
    }

    #[test]
    fn unknown_stop_reason_is_parse_error() {
        let parsed = json!({ "stop_reason": "refusal", "content": [] });
        assert!(matches!(parse_response(&parsed), Err(InferenceError::Parse(_))));
    }

    fn replay(chunks: Vec<&'static str>) -> EventStream {
        let bytes = futures::stream::iter(chunks.into_iter().map(Ok::<_, std::io::Error>));
        let (tx, rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        tokio::spawn(forward(bytes, tx, cancel.clone()));
        EventStream::from_channel(rx, cancel)
    }

    #[tokio::test]
    async fn sse_body_with_mixed_line_endings_reaches_finish() {
        let resp = replay(vec![
            "event: message_start\r\ndata: {\"type\":\"message_start\",",
            "\"message\":{\"usage\":{\"input_tokens\":3}}}\r\n\r\n",
            "event: ping\ndata: {\"type\":\"ping\"}\n\n",
            "event: content_block_delta\rdata: {\"type\":\"content_block_delta\",\"index\":0,",
            "\"delta\":{\"type\":\"text_delta\",\"text\":\"Hi\"}}\r\r",
            "event: message_delta\ndata: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\"},\"usage\":{\"output_tokens\":2}}\n\n",
            "event: message_stop\rdata: {\"type\":\"message_stop\"}\r\r",
            "event: ping\ndata: {\"type\":\"ping\"}\n\n",
        ])
        .collect_response()
        .await
        .unwrap();

        assert_eq!(resp.text, "Hi");
        assert_eq!(resp.finish_reason, FinishReason::Stop);
        assert_eq!(resp.usage, Usage::new(3, 2));
    }

    #[tokio::test]
    async fn sse_body_cut_short_is_aborted() {
        let mut stream = replay(vec![
            "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hi\"}}\n\n",
        ]);
        assert_eq!(stream.next().await.unwrap().unwrap(), StreamEvent::text("Hi"));
        assert!(matches!(stream.next().await, Some(Err(InferenceError::StreamAborted))));
    }

    #[tokio::test]
    async fn transport_error_becomes_request_error() {
        let bytes = futures::stream::iter(vec![
            Ok(b"data: {\"type\":\"ping\"}\n\n".to_vec()),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ]);
        let (tx, rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        tokio::spawn(forward(bytes, tx, cancel.clone()));
        let err = EventStream::from_channel(rx, cancel)
            .collect_response()
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::Request(msg) if msg.contains("reset")));
    }

    #[test]
    fn stream_state_builds_turn() {
        let frames = [
            r#"{"type":"message_start","message":{"usage":{"input_tokens":10}}}"#,
            r#"{"type":"content_block_start","index":0,"content_block":{"type":"text","text":""}}"#,
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hi"}}"#,
            r#"{"type":"content_block_stop","index":0}"#,
            r#"{"type":"content_block_start","index":1,"content_block":{"type":"tool_use","id":"toolu_9","name":"file_manager","input":{}}}"#,
            r#"{"type":"content_block_delta","index":1,"delta":{"type":"input_json_delta","partial_json":"{\"command\":\"delete\","}}"#,
            r#"{"type":"content_block_delta","index":1,"delta":{"type":"input_json_delta","partial_json":"\"path\":\"/a.jsx\"}"}}"#,
            r#"{"type":"content_block_stop","index":1}"#,
            r#"{"type":"message_delta","delta":{"stop_reason":"tool_use"},"usage":{"output_tokens":7}}"#,
            r#"{"type":"message_stop"}"#,
        ];
        let mut state = StreamState::default();
        let events: Vec<StreamEvent> = frames
            .iter()
            .filter_map(|f| state.apply(f).unwrap())
            .collect();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0], StreamEvent::text("Hi"));
        let StreamEvent::ToolCall(call) = &events[1] else {
            panic!("expected tool call");
        };
        assert_eq!(call.status_label(), "Deleted /a.jsx");
        assert_eq!(
            events[2],
            StreamEvent::Finish {
                finish_reason: FinishReason::ToolCalls,
                usage: Usage::new(10, 7),
            }
        );
    }

    #[test]
    fn stream_error_event_is_terminal_error() {
        let mut state = StreamState::default();
        let err = state
            .apply(r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#)
            .unwrap_err();
        assert!(matches!(err, InferenceError::ApiError { .. }));
    }
}
