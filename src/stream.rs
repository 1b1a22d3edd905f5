use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, warn};

use crate::error::InferenceError;
use crate::events::StreamEvent;
use crate::types::{FinishReason, InferenceResponse, ToolCall, Usage};

pub type EventResult = Result<StreamEvent, InferenceError>;

const CHANNEL_CAPACITY: usize = 16;

/// Push-style stream of turn events.
///
/// Terminates after the `Finish` event. If the producer stops without one,
/// the last item is `Err(InferenceError::StreamAborted)`. Dropping the stream
/// cancels the producer.
pub struct EventStream {
    inner: Pin<Box<dyn Stream<Item = EventResult> + Send>>,
    finished: bool,
    done: bool,
    _guard: Option<DropGuard>,
}

impl EventStream {
    pub fn new(inner: impl Stream<Item = EventResult> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(inner),
            finished: false,
            done: false,
            _guard: None,
        }
    }

    pub(crate) fn from_channel(rx: mpsc::Receiver<EventResult>, cancel: CancellationToken) -> Self {
        Self {
            inner: Box::pin(ReceiverStream::new(rx)),
            finished: false,
            done: false,
            _guard: Some(cancel.drop_guard()),
        }
    }

    /// Drain the stream into an aggregate response, keeping the usage
    /// reported by the `Finish` event.
    pub async fn collect_response(self) -> Result<InferenceResponse, InferenceError> {
        self.collect_response_with(|_| {}).await
    }

    /// Like `collect_response`, showing each event to `observe` as it arrives.
    pub async fn collect_response_with<F>(
        mut self,
        mut observe: F,
    ) -> Result<InferenceResponse, InferenceError>
    where
        F: FnMut(&StreamEvent),
    {
        let mut builder = ResponseBuilder::default();
        while let Some(item) = self.next().await {
            let event = item?;
            observe(&event);
            builder.push(event);
        }
        builder.build()
    }
}

impl Stream for EventStream {
    type Item = EventResult;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done || this.finished {
            return Poll::Ready(None);
        }
        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(event))) => {
                this.finished = event.is_finish();
                Poll::Ready(Some(Ok(event)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.done = true;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.done = true;
                Poll::Ready(Some(Err(InferenceError::StreamAborted)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// An event plus the pause that follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct Paced {
    pub event: StreamEvent,
    pub pause: Duration,
}

/// Spawn a producer that forwards `events` with their pauses.
pub(crate) fn spawn_paced<I>(events: I) -> EventStream
where
    I: Iterator<Item = Result<Paced, InferenceError>> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let cancel = CancellationToken::new();
    tokio::spawn(pump(events, tx, cancel.clone()));
    EventStream::from_channel(rx, cancel)
}

/// Forward events until exhausted, cancelled, or the receiver is gone.
pub(crate) async fn pump<I>(events: I, tx: mpsc::Sender<EventResult>, cancel: CancellationToken)
where
    I: Iterator<Item = Result<Paced, InferenceError>>,
{
    for item in events {
        let paced = match item {
            Ok(paced) => paced,
            Err(e) => {
                warn!(error = %e, "event production failed");
                let _ = tx.send(Err(e)).await;
                return;
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("stream cancelled");
                return;
            }
            sent = tx.send(Ok(paced.event)) => {
                if sent.is_err() {
                    debug!("stream consumer gone");
                    return;
                }
            }
        }

        if paced.pause.is_zero() {
            continue;
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("stream cancelled");
                return;
            }
            _ = tx.closed() => {
                debug!("stream consumer gone");
                return;
            }
            _ = tokio::time::sleep(paced.pause) => {}
        }
    }
}

/// Folds turn events into an `InferenceResponse`.
#[derive(Debug, Default)]
pub(crate) struct ResponseBuilder {
    text: String,
    tool_calls: Vec<ToolCall>,
    finish: Option<(FinishReason, Usage)>,
}

impl ResponseBuilder {
    pub fn push(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::TextDelta { text_delta } => self.text.push_str(&text_delta),
            StreamEvent::ToolCall(call) => self.tool_calls.push(call),
            StreamEvent::Finish {
                finish_reason,
                usage,
            } => self.finish = Some((finish_reason, usage)),
        }
    }

    pub fn build(self) -> Result<InferenceResponse, InferenceError> {
        let (finish_reason, usage) = self.finish.ok_or(InferenceError::StreamAborted)?;
        Ok(InferenceResponse {
            text: self.text,
            tool_calls: self.tool_calls,
            finish_reason,
            usage,
        })
    }
}
