//! Per-submission state machine
//!
//! ```text
//! Idle -> Validating -> Warned -> Idle                (a field is empty)
//! Idle -> Validating -> Blocked -> Idle               (no key / bad temperature)
//! Idle -> Validating -> Building -> Requesting
//!      -> Displaying | DisplayingError -> Idle
//! ```

use log::{debug, warn};

use crate::completion::CompletionClient;
use crate::config::CompletionConfig;
use crate::request::{CompletionResult, EnhancedPrompt, PromptRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState
{   Idle
  , Validating
  , Warned
  , Blocked
  , Building
  , Requesting
  , Displaying
  , DisplayingError
}

/// What the front-end should show after a submission
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome
{   /// Missing input; nothing was built or sent
    Warning(crate::error::Error)
  , /// Missing credential or bad sampling settings; nothing was sent
    Blocked(crate::error::Error)
  , /// The prompt was built and a completion attempted
    Completed
    {   prompt: EnhancedPrompt
      , result: CompletionResult
    }
}

impl FlowOutcome
{   /// Text to show in place of the result
    pub fn display_text(&self) -> String
    {   match self
        {   FlowOutcome::Warning(e) => e.to_string()
          , FlowOutcome::Blocked(e) => e.to_display_string()
          , FlowOutcome::Completed { result, .. } => {
              result.display_text().to_string()
            }
        }
    }

    pub fn prompt(&self) -> Option<&EnhancedPrompt>
    {   match self
        {   FlowOutcome::Completed { prompt, .. } => Some(prompt)
          , _ => None
        }
    }
}

/// Runs submissions one at a time against an explicit config
pub struct PromptFlow
{   client: CompletionClient
  , config: CompletionConfig
  , state: FlowState
  , trail: Vec<FlowState>
}

impl PromptFlow
{   pub fn new(client: CompletionClient, config: CompletionConfig) -> Self
    {   PromptFlow
        {   client
          , config
          , state: FlowState::Idle
          , trail: vec![FlowState::Idle]
        }
    }

    pub fn state(&self) -> FlowState
    {   self.state
    }

    /// States visited by the most recent submission, in order
    pub fn last_transitions(&self) -> &[FlowState]
    {   &self.trail
    }

    pub fn config(&self) -> &CompletionConfig
    {   &self.config
    }

    pub fn set_api_key(&mut self, key: impl Into<String>)
    {   self.config.api_key = Some(key.into());
    }

    fn enter(&mut self, next: FlowState)
    {   debug!("Flow {:?} -> {:?}", self.state, next);
        self.state = next;
        self.trail.push(next);
    }

    /// Validate and build without calling the service
    pub fn build_only(
      &self
    , request: &PromptRequest
    ) -> Result<EnhancedPrompt, crate::error::Error>
    {   request.validate()?;
        Ok(crate::template::build_prompt(request))
    }

    /// Run one submission to completion and return to `Idle`
    pub async fn submit(&mut self, request: &PromptRequest) -> FlowOutcome
    {   self.trail.clear();
        self.trail.push(FlowState::Idle);
        self.enter(FlowState::Validating);

        if let Err(e) = request.validate()
        {   warn!("{}", e);
            self.enter(FlowState::Warned);
            self.enter(FlowState::Idle);
            return FlowOutcome::Warning(e);
        }

        if let Err(e) = self.config.validate()
        {   warn!("Submission blocked: {}", e);
            self.enter(FlowState::Blocked);
            self.enter(FlowState::Idle);
            return FlowOutcome::Blocked(e);
        }

        self.enter(FlowState::Building);
        let prompt = crate::template::build_prompt(request);

        self.enter(FlowState::Requesting);
        let system_message = self.config.system_message
          .clone()
          .unwrap_or_else(|| prompt.system_message().to_string());
        let result = self.client
          .complete(&self.config, &system_message, prompt.text())
          .await;

        if result.is_success()
        {   self.enter(FlowState::Displaying);
        } else
        {   self.enter(FlowState::DisplayingError);
        }
        self.enter(FlowState::Idle);

        FlowOutcome::Completed { prompt, result }
    }
}
