pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod template;
pub mod completion;
pub mod flow;
pub mod export;
pub mod samples;
pub mod client;
use serde::{Deserialize, Serialize};

pub use client::EnhancerBackend;
pub use completion::CompletionClient;
pub use config::{CompletionConfig, EnhancerConfig};
pub use error::Error;
pub use flow::{FlowOutcome, FlowState, PromptFlow};
pub use request::{CompletionResult, EnhancedPrompt, PromptRequest};

/*

prompt-enhancer: turn a few form fields into a structured prompt,
send it to a chat-completion service, show what comes back.

  form fields ──> template::build_prompt ──> EnhancedPrompt
                                                  │
  CompletionConfig (key, model, temperature) ─────┤
                                                  v
                       completion::CompletionClient ──> CompletionResult
                                  │
                      providers::ChatTransport (OpenAI over reqwest)

flow::PromptFlow runs one submission through that pipeline, and
client::EnhancerBackend owns a flow on a background task so that
submissions from a UI are handled strictly one after another.

*/

/// ENHANCER API INTERFACE:

// ===== Submit =====

pub type SubmitReply = Result<flow::FlowOutcome, crate::error::Error>;
pub type SubmitReplySender
  = tokio::sync::mpsc::UnboundedSender<SubmitReply>;

pub struct SubmitArgs
{   pub request: request::PromptRequest
  , pub reply: SubmitReplySender
}

// ===== SetApiKey =====

pub type SetApiKeyReply = Result<(), crate::error::Error>;
pub type SetApiKeyReplySender
  = tokio::sync::mpsc::UnboundedSender<SetApiKeyReply>;

pub struct SetApiKeyArgs
{   pub key: String
  , pub reply: SetApiKeyReplySender
}

// ===== GetModelList =====

pub type GetModelListReply
  = Result<Vec<crate::ChatModel>, crate::error::Error>;
pub type GetModelListReplySender
  = tokio::sync::mpsc::UnboundedSender<GetModelListReply>;

pub struct GetModelListArgs
{   pub reply: GetModelListReplySender
}

// ===== KillProcess =====

pub type KillProcessReply = Result<(), crate::error::Error>;
pub type KillProcessReplySender
  = tokio::sync::mpsc::UnboundedSender<KillProcessReply>;

pub struct KillProcessArgs
{   pub reply: KillProcessReplySender
}

// ===== EnhancerHand (sender side) =====

pub struct EnhancerHand
{   pub submit_tx
      : tokio::sync::mpsc::UnboundedSender<SubmitArgs>
  , pub set_api_key_tx
      : tokio::sync::mpsc::UnboundedSender<SetApiKeyArgs>
  , pub get_model_list_tx
      : tokio::sync::mpsc::UnboundedSender<GetModelListArgs>
  , pub kill_process_tx
      : tokio::sync::mpsc::UnboundedSender<KillProcessArgs>
}

// ===== EnhancerFoot (receiver side) =====

pub struct EnhancerFoot
{   pub submit_rx
      : tokio::sync::mpsc::UnboundedReceiver<SubmitArgs>
  , pub set_api_key_rx
      : tokio::sync::mpsc::UnboundedReceiver<SetApiKeyArgs>
  , pub get_model_list_rx
      : tokio::sync::mpsc::UnboundedReceiver<GetModelListArgs>
  , pub kill_process_rx
      : tokio::sync::mpsc::UnboundedReceiver<KillProcessArgs>
}

/// ENHANCER STRUCTURES:

/// Chat models the enhancer can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub enum ChatModel
{   /// OpenAI GPT-4o
    #[serde(rename = "gpt-4o")]
    Gpt4o
  , /// OpenAI GPT-4o mini
    #[serde(rename = "gpt-4o-mini")]
    Gpt4oMini
  , /// OpenAI GPT-3.5 Turbo
    #[default]
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo
}

impl ChatModel
{   pub const ALL: [ChatModel; 3] = [
      ChatModel::Gpt4o
    , ChatModel::Gpt4oMini
    , ChatModel::Gpt35Turbo
    ];

    /// Model identifier as sent on the wire
    pub fn as_str(&self) -> &'static str
    {   match self
        {   ChatModel::Gpt4o => "gpt-4o"
          , ChatModel::Gpt4oMini => "gpt-4o-mini"
          , ChatModel::Gpt35Turbo => "gpt-3.5-turbo"
        }
    }
}

impl std::fmt::Display for ChatModel
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChatModel
{   type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {   ChatModel::ALL
          .iter()
          .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
          .copied()
          .ok_or_else(|| crate::error::Error::UnknownModel(s.to_string()))
    }
}

/// How elaborate the generated prompt should be, least to most.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub enum Complexity
{   Simple
  , Moderate
  , Complex
  , Advanced
}

impl Complexity
{   pub const ALL: [Complexity; 4] = [
      Complexity::Simple
    , Complexity::Moderate
    , Complexity::Complex
    , Complexity::Advanced
    ];

    pub fn as_str(&self) -> &'static str
    {   match self
        {   Complexity::Simple => "Simple"
          , Complexity::Moderate => "Moderate"
          , Complexity::Complex => "Complex"
          , Complexity::Advanced => "Advanced"
        }
    }
}

impl std::fmt::Display for Complexity
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Complexity
{   type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {   Complexity::ALL
          .iter()
          .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
          .copied()
          .ok_or_else(|| {
            crate::error::Error::UnknownComplexity(s.to_string())
          })
    }
}
