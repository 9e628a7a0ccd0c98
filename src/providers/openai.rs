use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use log::{debug, trace, error};

pub const OPENAI_API_BASE: &str
  = "https://api.openai.com/v1";

// ===== Message Types =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

impl ChatMessage
{   pub fn system(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "system".to_string()
          , content: content.into()
        }
    }

    pub fn user(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "user".to_string()
          , content: content.into()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse
{   pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ResponseMessage
  , #[serde(default)]
    pub finish_reason: Option<String>
}

/// Assistant message; `content` is null for refusals and tool calls
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage
{   #[serde(default)]
    pub role: Option<String>
  , #[serde(default)]
    pub content: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorBody
{   error: ApiErrorDetail
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorDetail
{   message: String
}

/// Pull the `error.message` out of an OpenAI error body, if it has one
fn describe_error_body(body: &str) -> String
{   serde_json::from_str::<ApiErrorBody>(body)
      .map(|b| b.error.message)
      .unwrap_or_else(|_| {
        if body.trim().is_empty()
        {   "Unknown error".to_string()
        } else
        {   body.trim().to_string()
        }
      })
}

// ===== Transport =====

/// OpenAI chat-completions over reqwest
#[derive(Debug, Clone)]
pub struct OpenAiTransport
{   api_base: String
  , http_client: reqwest::Client
}

impl Default for OpenAiTransport
{   fn default() -> Self
    {   OpenAiTransport::new(None)
    }
}

impl OpenAiTransport
{   /// `api_base` defaults to the public OpenAI endpoint
    pub fn new(api_base: Option<String>) -> Self
    {   let api_base = api_base
          .unwrap_or_else(|| OPENAI_API_BASE.to_string())
          .trim_end_matches('/')
          .to_string();
        debug!("Creating OpenAiTransport for {}", api_base);
        OpenAiTransport
        {   api_base
          , http_client: reqwest::Client::new()
        }
    }

    pub fn api_base(&self) -> &str
    {   &self.api_base
    }
}

#[async_trait]
impl super::ChatTransport for OpenAiTransport
{   async fn send(
      &self
    , request: &ChatRequest
    , api_key: &str
    ) -> Result<ChatResponse, crate::error::Error>
    {   trace!("OpenAI request: {:?}", request);

        let response = self.http_client
          .post(format!("{}/chat/completions", self.api_base))
          .bearer_auth(api_key)
          .json(request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            crate::error::Error::HttpError(e.to_string())
          })?;

        let status = response.status();
        trace!("OpenAI response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_default();
            let description = describe_error_body(&error_text);
            error!("OpenAI API error ({}): {}", status, description);
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS
            {   return Err(crate::error::Error::RateLimitExceeded);
            }
            return Err(crate::error::Error::ApiError(
              format!("{} {}", status.as_u16(), description)
            ));
        }

        response.json::<ChatResponse>().await.map_err(|e| {
          error!("Parse error: {}", e);
          crate::error::Error::ParseError(e.to_string())
        })
    }
}
