use std::time::Duration;

use super::phase::Phase;
use super::prompt::ComponentSpec;
use super::templates;
use crate::error::InferenceError;
use crate::events::StreamEvent;
use crate::stream::Paced;
use crate::tools::FileOperation;
use crate::types::{FinishReason, Usage};

pub const ENTRY_PATH: &str = "/App.jsx";

const BOOTSTRAP_NOTICE: &str = "This is a static response. You can place an Anthropic API key in the .env file to use the Anthropic API for component generation. Let me create an App.jsx file to display the component.";
const ENHANCE_TEXT: &str = "Now let me enhance the component with better styling.";

const TOOL_TURN_USAGE: Usage = Usage::new(50, 30);
const SUMMARY_USAGE: Usage = Usage::new(50, 50);

/// Lazy event sequence for one simulated turn: the text one character at a
/// time, then the tool call if any, then the finish event.
#[derive(Debug)]
pub struct Script {
    text: String,
    pos: usize,
    pause: Duration,
    tool_call: Option<(&'static str, FileOperation)>,
    finish: Option<StreamEvent>,
}

impl Script {
    fn new(
        text: String,
        pause: Duration,
        tool_call: Option<(&'static str, FileOperation)>,
        finish_reason: FinishReason,
        usage: Usage,
    ) -> Self {
        Self {
            text,
            pos: 0,
            pause,
            tool_call,
            finish: Some(StreamEvent::Finish {
                finish_reason,
                usage,
            }),
        }
    }
}

impl Iterator for Script {
    type Item = Result<Paced, InferenceError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(ch) = self.text[self.pos..].chars().next() {
            self.pos += ch.len_utf8();
            return Some(Ok(Paced {
                event: StreamEvent::text(ch),
                pause: self.pause,
            }));
        }

        if let Some((id, op)) = self.tool_call.take() {
            return Some(op.to_tool_call(id).map(|call| Paced {
                event: StreamEvent::ToolCall(call),
                pause: Duration::ZERO,
            }));
        }

        self.finish.take().map(|event| {
            Ok(Paced {
                event,
                pause: Duration::ZERO,
            })
        })
    }
}

/// The fixed script for `phase`.
pub fn play(phase: Phase, spec: &ComponentSpec) -> Script {
    let pause = phase.char_pause();
    match phase {
        Phase::Bootstrap => Script::new(
            BOOTSTRAP_NOTICE.to_string(),
            pause,
            Some((
                "call_3",
                FileOperation::create(ENTRY_PATH, templates::entry_file(spec)),
            )),
            FinishReason::ToolCalls,
            TOOL_TURN_USAGE,
        ),
        Phase::Scaffold => Script::new(
            format!("I'll create a {} component for you.", spec.name),
            pause,
            Some((
                "call_1",
                FileOperation::create(spec.path(), templates::component(spec.kind).body),
            )),
            FinishReason::ToolCalls,
            TOOL_TURN_USAGE,
        ),
        Phase::Enhance => {
            let template = templates::component(spec.kind);
            Script::new(
                ENHANCE_TEXT.to_string(),
                pause,
                Some((
                    "call_2",
                    FileOperation::str_replace(spec.path(), template.edit_old, template.edit_new),
                )),
                FinishReason::ToolCalls,
                TOOL_TURN_USAGE,
            )
        }
        Phase::Summarize => Script::new(
            summary(spec),
            pause,
            None,
            FinishReason::Stop,
            SUMMARY_USAGE,
        ),
    }
}

fn summary(spec: &ComponentSpec) -> String {
    format!(
        "Perfect! I've created:\n\n\
         1. **{name}.jsx** - A fully-featured {kind} component\n\
         2. **App.jsx** - The main app file that displays the component\n\n\
         The component is now ready to use. You can see the preview on the right side of the screen.",
        name = spec.name,
        kind = spec.kind.as_str(),
    )
}
