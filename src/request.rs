//! Request-scoped values: form input, built prompt, completion outcome

use serde::{Deserialize, Serialize};

/// Structured form input collected for one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptRequest
{   /// "You are {role}" framing
    RoleTask
    {   role: String
      , context: String
      , task: String
    }
  , /// Ask the model to design a prompt for another model
    PromptDesign
    {   prompt_type: String
      , target_model: String
      , complexity: crate::Complexity
      , details: String
    }
}

impl PromptRequest
{   pub fn role_task(
      role: impl Into<String>
    , context: impl Into<String>
    , task: impl Into<String>
    ) -> Self
    {   PromptRequest::RoleTask
        {   role: role.into()
          , context: context.into()
          , task: task.into()
        }
    }

    pub fn prompt_design(
      prompt_type: impl Into<String>
    , target_model: impl Into<String>
    , complexity: crate::Complexity
    , details: impl Into<String>
    ) -> Self
    {   PromptRequest::PromptDesign
        {   prompt_type: prompt_type.into()
          , target_model: target_model.into()
          , complexity
          , details: details.into()
        }
    }

    /// Required free-text fields as (label, value)
    pub fn required_fields(&self) -> Vec<(&'static str, &str)>
    {   match self
        {   PromptRequest::RoleTask { role, context, task } => vec![
              ("role", role.as_str())
            , ("context", context.as_str())
            , ("task", task.as_str())
            ]
          , PromptRequest::PromptDesign {
              prompt_type, target_model, details, ..
            } => vec![
              ("prompt type", prompt_type.as_str())
            , ("target model", target_model.as_str())
            , ("details", details.as_str())
            ]
        }
    }

    /// Labels of required fields that are empty or whitespace
    pub fn missing_fields(&self) -> Vec<String>
    {   self.required_fields()
          .into_iter()
          .filter(|(_, value)| value.trim().is_empty())
          .map(|(label, _)| label.to_string())
          .collect()
    }

    /// Presence check done before the builder runs
    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   let missing = self.missing_fields();
        if missing.is_empty()
        {   Ok(())
        } else
        {   Err(crate::error::Error::MissingInput(missing))
        }
    }
}

/// Prompt text built from a `PromptRequest`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancedPrompt
{   text: String
  , system_message: String
}

impl EnhancedPrompt
{   pub(crate) fn new(text: String, system_message: String) -> Self
    {   EnhancedPrompt { text, system_message }
    }

    /// The user message
    pub fn text(&self) -> &str
    {   &self.text
    }

    /// Default system message for the form that produced this prompt
    pub fn system_message(&self) -> &str
    {   &self.system_message
    }
}

impl std::fmt::Display for EnhancedPrompt
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.write_str(&self.text)
    }
}

/// Outcome of one completion call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionResult
{   /// Generated text, trimmed
    Success
    {   text: String
    }
  , /// Human-readable message beginning with "Error: "
    Failure
    {   message: String
    }
}

impl CompletionResult
{   pub fn is_success(&self) -> bool
    {   matches!(self, CompletionResult::Success { .. })
    }

    /// Text to show the user, success or not
    pub fn display_text(&self) -> &str
    {   match self
        {   CompletionResult::Success { text } => text
          , CompletionResult::Failure { message } => message
        }
    }

    pub fn into_result(self) -> Result<String, String>
    {   match self
        {   CompletionResult::Success { text } => Ok(text)
          , CompletionResult::Failure { message } => Err(message)
        }
    }
}

impl From<Result<String, crate::error::Error>> for CompletionResult
{   fn from(result: Result<String, crate::error::Error>) -> Self
    {   match result
        {   Ok(text) => CompletionResult::Success { text }
          , Err(e) => CompletionResult::Failure
            {   message: e.to_display_string()
            }
        }
    }
}
