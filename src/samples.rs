//! Example requests shown to users who don't know what to type

use crate::request::PromptRequest;
use crate::Complexity;

/// A titled example request
#[derive(Debug, Clone)]
pub struct Sample
{   pub title: &'static str
  , pub request: PromptRequest
}

pub fn example_requests() -> Vec<Sample>
{   vec![
      Sample
      {   title: "Lesson explanation"
        , request: PromptRequest::role_task(
            "Teacher"
          , "high school biology"
          , "explain photosynthesis"
          )
      }
    , Sample
      {   title: "Data analysis"
        , request: PromptRequest::role_task(
            "Data Scientist"
          , "quarterly sales figures for a retail chain"
          , "identify the main drivers of revenue decline"
          )
      }
    , Sample
      {   title: "Campaign copy"
        , request: PromptRequest::role_task(
            "Marketer"
          , "launch of a reusable water bottle brand"
          , "draft three taglines for social media"
          )
      }
    , Sample
      {   title: "Code review prompt"
        , request: PromptRequest::prompt_design(
            "Code review"
          , "gpt-4o"
          , Complexity::Complex
          , "review a pull request for security issues and naming"
          )
      }
    , Sample
      {   title: "Summarization prompt"
        , request: PromptRequest::prompt_design(
            "Summarization"
          , "gpt-4o-mini"
          , Complexity::Simple
          , "summarize customer support tickets in two sentences"
          )
      }
    ]
}
