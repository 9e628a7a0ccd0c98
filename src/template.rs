//! Turns a `PromptRequest` into the prompt text sent to the model.
//!
//! Field values are inserted verbatim; nothing is escaped, trimmed or
//! reordered, so the same request always yields the same text.

use crate::request::{EnhancedPrompt, PromptRequest};

pub const ROLE_TASK_SYSTEM_MESSAGE: &str
  = "You are a helpful AI assistant.";

pub const PROMPT_DESIGN_SYSTEM_MESSAGE: &str
  = "You are an expert prompt engineer who writes clear, effective \
     prompts for large language models.";

/// Closing instructions shared by every template
pub const STRUCTURE_INSTRUCTIONS: [&str; 3] = [
  "1. **Clarify assumptions** before answering."
, "2. **Provide a well-structured response** in bullet points or numbered format."
, "3. **Ensure clarity and completeness** in your explanation."
];

/// Build the prompt for `request`
pub fn build_prompt(request: &PromptRequest) -> EnhancedPrompt
{   let body = match request
    {   PromptRequest::RoleTask { role, context, task } => {
          format!(
            "You are {}.\nContext: {}\nTask: {}\n",
            role, context, task
          )
        }
      , PromptRequest::PromptDesign {
          prompt_type, target_model, complexity, details
        } => {
          format!(
            "Write a {} prompt for the model {}.\n\
             Prompt type: {}\n\
             Target model: {}\n\
             Complexity: {}\n\
             Details: {}\n",
            complexity.as_str().to_lowercase(),
            target_model,
            prompt_type,
            target_model,
            complexity,
            details
          )
        }
    };

    let mut text = body;
    text.push_str("\nPlease structure your response as follows:\n");
    for line in STRUCTURE_INSTRUCTIONS
    {   text.push_str(line);
        text.push('\n');
    }

    EnhancedPrompt::new(text, system_message_for(request).to_string())
}

/// Default system message for the form `request` came from
pub fn system_message_for(request: &PromptRequest) -> &'static str
{   match request
    {   PromptRequest::RoleTask { .. } => ROLE_TASK_SYSTEM_MESSAGE
      , PromptRequest::PromptDesign { .. } => PROMPT_DESIGN_SYSTEM_MESSAGE
    }
}
