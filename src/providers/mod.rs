//! Chat-completion transports

use async_trait::async_trait;

pub mod openai;

// Re-export for convenience
pub use openai::{
  ChatMessage, ChatRequest, ChatResponse, Choice, OpenAiTransport
, ResponseMessage
};

/// One request/response round trip to a chat-completion service.
///
/// `CompletionClient` only talks to the service through this trait, so tests
/// can swap in a transport that never touches the network.
#[async_trait]
pub trait ChatTransport: Send + Sync
{   async fn send(
      &self
    , request: &ChatRequest
    , api_key: &str
    ) -> Result<ChatResponse, crate::error::Error>;
}
