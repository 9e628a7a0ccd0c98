//! Single-call completion adapter

use std::sync::Arc;
use log::{debug, error, info};

use crate::config::CompletionConfig;
use crate::providers::{ChatMessage, ChatRequest, ChatTransport, OpenAiTransport};
use crate::request::CompletionResult;

/// Sends one system + user message pair and returns the reply text.
///
/// Every failure (missing key, bad temperature, network, HTTP status,
/// undecodable body, empty `choices`) comes back as a
/// `CompletionResult::Failure` whose message starts with `"Error: "`.
/// Nothing is retried.
#[derive(Clone)]
pub struct CompletionClient
{   transport: Arc<dyn ChatTransport>
}

impl CompletionClient
{   pub fn new(transport: Arc<dyn ChatTransport>) -> Self
    {   CompletionClient { transport }
    }

    /// Client backed by the OpenAI HTTP transport
    pub fn openai(api_base: Option<String>) -> Self
    {   CompletionClient::new(Arc::new(OpenAiTransport::new(api_base)))
    }

    /// Like `try_complete`, with errors folded into the result
    pub async fn complete(
      &self
    , config: &CompletionConfig
    , system_message: &str
    , user_message: &str
    ) -> CompletionResult
    {   let result = self
          .try_complete(config, system_message, user_message)
          .await;
        if let Err(e) = &result
        {   error!("Completion failed: {}", e);
        }
        CompletionResult::from(result)
    }

    pub async fn try_complete(
      &self
    , config: &CompletionConfig
    , system_message: &str
    , user_message: &str
    ) -> Result<String, crate::error::Error>
    {   config.validate()?;
        let api_key = config.credential()
          .ok_or(crate::error::Error::MissingApiKey)?;

        let request = ChatRequest
        {   model: config.model.as_str().to_string()
          , messages: vec![
              ChatMessage::system(system_message)
            , ChatMessage::user(user_message)
            ]
          , max_tokens: config.max_tokens
          , temperature: Some(config.temperature)
        };

        info!(
          "Requesting completion from {} (temperature {})",
          request.model, config.temperature
        );
        let response = self.transport.send(&request, api_key).await?;

        let choice = response.choices.into_iter().next()
          .ok_or_else(|| {
            error!("No choices in response");
            crate::error::Error::NoChoicesInResponse
          })?;
        debug!("finish_reason: {:?}", choice.finish_reason);

        let content = choice.message.content
          .ok_or_else(|| {
            crate::error::Error::ParseError(
              "first choice has no message content".to_string()
            )
          })?;
        Ok(content.trim().to_string())
    }
}
