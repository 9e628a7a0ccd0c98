use std::fmt;

/// Custom error type for prompt enhancer operations
/// Implements Clone for sending through channels
#[derive(Debug, Clone, PartialEq)]
pub enum Error
{   /// One or more required form fields are empty
    MissingInput(Vec<String>)
  , /// No API key was supplied for the completion service
    MissingApiKey
  , /// Temperature outside the accepted 0.0..=1.0 range
    InvalidTemperature(f32)
  , /// Unknown model identifier
    UnknownModel(String)
  , /// Unknown complexity level
    UnknownComplexity(String)
  , /// HTTP request error
    HttpError(String)
  , /// API returned an error response
    ApiError(String)
  , /// Failed to parse API response
    ParseError(String)
  , /// No choices in API response
    NoChoicesInResponse
  , /// Rate limit or quota exceeded
    RateLimitExceeded
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// File system error
    Io(String)
  , /// Generic error
    Other(String)
}

impl Error
{   /// Whether the flow should stay interactive after this error
    pub fn is_warning(&self) -> bool
    {   matches!(self, Error::MissingInput(_))
    }

    /// Text shown to the user in place of a completion
    pub fn to_display_string(&self) -> String
    {   format!("Error: {}", self)
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MissingInput(fields) => {
              write!(f,
                "Please fill in all fields before enhancing the prompt (missing: {})",
                fields.join(", ")
              )
            }
          , Error::MissingApiKey => {
              write!(f, "Missing API key for the completion service")
            }
          , Error::InvalidTemperature(t) => {
              write!(f,
                "Temperature must be between 0.0 and 1.0, got {}",
                t
              )
            }
          , Error::UnknownModel(model) => {
              write!(f, "Unknown model: {}", model)
            }
          , Error::UnknownComplexity(level) => {
              write!(f, "Unknown complexity level: {}", level)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::NoChoicesInResponse => {
              write!(f, "API response contained no choices")
            }
          , Error::RateLimitExceeded => {
              write!(f, "API rate limit or quota exceeded")
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Io(msg) => {
              write!(f, "I/O error: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "{}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}

impl From<std::io::Error> for Error
{   fn from(e: std::io::Error) -> Self
    {   Error::Io(e.to_string())
    }
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::InvalidConfiguration(e.to_string())
    }
}
