pub mod anthropic;
pub mod simulator;

use async_trait::async_trait;

use crate::error::InferenceError;
use crate::stream::EventStream;
use crate::types::{InferenceRequest, InferenceResponse};

/// Generation backend contract. No state, no history management:
/// the full conversation comes in with every request.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    fn model_id(&self) -> &str;

    /// Run a turn to completion and return the aggregate.
    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError>;

    /// Run a turn, delivering events as they are produced.
    async fn stream(&self, request: InferenceRequest) -> Result<EventStream, InferenceError>;
}

/// Blanket impl so `Box<dyn InferenceProvider>` can be used wherever a provider is expected.
#[async_trait]
impl InferenceProvider for Box<dyn InferenceProvider> {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    async fn generate(&self, request: InferenceRequest) -> Result<InferenceResponse, InferenceError> {
        (**self).generate(request).await
    }

    async fn stream(&self, request: InferenceRequest) -> Result<EventStream, InferenceError> {
        (**self).stream(request).await
    }
}

pub use anthropic::AnthropicProvider;
pub use simulator::SimulatedProvider;
