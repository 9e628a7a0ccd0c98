//! Configuration for the completion call and the front-end

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use log::debug;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_EXPORT_FILE: &str = "ai_prompt.txt";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const API_BASE_ENV: &str = "OPENAI_BASE_URL";

fn default_temperature() -> f32
{   DEFAULT_TEMPERATURE
}

fn default_export_path() -> PathBuf
{   PathBuf::from(DEFAULT_EXPORT_FILE)
}

/// Reject temperatures outside 0.0..=1.0 (NaN included)
pub fn validate_temperature(temperature: f32)
  -> Result<f32, crate::error::Error>
{   if (0.0..=1.0).contains(&temperature)
    {   Ok(temperature)
    } else
    {   Err(crate::error::Error::InvalidTemperature(temperature))
    }
}

/// Everything one completion call needs, passed explicitly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig
{   /// API key; never written back out
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>
  , /// Model to request
    #[serde(default)]
    pub model: crate::ChatModel
  , /// Sampling temperature, 0.0..=1.0
    #[serde(default = "default_temperature")]
    pub temperature: f32
  , /// Overrides the per-form default system message
    #[serde(default)]
    pub system_message: Option<String>
  , /// Max tokens to generate
    #[serde(default)]
    pub max_tokens: Option<usize>
  , /// API base URL (if custom)
    #[serde(default)]
    pub api_base: Option<String>
}

impl Default for CompletionConfig
{   fn default() -> Self
    {   CompletionConfig
        {   api_key: None
          , model: crate::ChatModel::default()
          , temperature: DEFAULT_TEMPERATURE
          , system_message: None
          , max_tokens: None
          , api_base: None
        }
    }
}

impl CompletionConfig
{   pub fn with_api_key(mut self, key: impl Into<String>) -> Self
    {   self.api_key = Some(key.into());
        self
    }

    pub fn with_model(mut self, model: crate::ChatModel) -> Self
    {   self.model = model;
        self
    }

    pub fn with_temperature(
      mut self
    , temperature: f32
    ) -> Result<Self, crate::error::Error>
    {   self.temperature = validate_temperature(temperature)?;
        Ok(self)
    }

    /// The API key, if one is set and not blank
    pub fn credential(&self) -> Option<&str>
    {   self.api_key
          .as_deref()
          .map(str::trim)
          .filter(|k| !k.is_empty())
    }

    /// Checks that must pass before any request leaves the process
    pub fn validate(&self) -> Result<(), crate::error::Error>
    {   if self.credential().is_none()
        {   return Err(crate::error::Error::MissingApiKey);
        }
        validate_temperature(self.temperature)?;
        Ok(())
    }
}

/// Front-end configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancerConfig
{   /// Completion call settings
    #[serde(default)]
    pub completion: CompletionConfig
  , /// Where `--save` writes when no path is given
    #[serde(default = "default_export_path")]
    pub export_path: PathBuf
  , /// Enable detailed logging
    #[serde(default)]
    pub verbose: Option<bool>
}

impl Default for EnhancerConfig
{   fn default() -> Self
    {   EnhancerConfig
        {   completion: CompletionConfig::default()
          , export_path: default_export_path()
          , verbose: None
        }
    }
}

impl EnhancerConfig
{   /// Load a JSON config file
    pub fn load(path: &Path) -> Result<Self, crate::error::Error>
    {   debug!("Loading config from {}", path.display());
        let raw = std::fs::read_to_string(path)
          .map_err(|e| {
            crate::error::Error::InvalidConfiguration(
              format!("{}: {}", path.display(), e)
            )
          })?;
        let config: EnhancerConfig = serde_json::from_str(&raw)?;
        validate_temperature(config.completion.temperature)?;
        Ok(config)
    }

    /// Fill unset values from the process environment
    pub fn apply_env(&mut self)
    {   self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Fill unset values from `lookup`; values already set win
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
      F: Fn(&str) -> Option<String>
    {   if self.completion.credential().is_none()
        {   if let Some(key) = lookup(API_KEY_ENV)
            {   debug!("Using API key from {}", API_KEY_ENV);
                self.completion.api_key = Some(key);
            }
        }
        if self.completion.api_base.is_none()
        {   if let Some(base) = lookup(API_BASE_ENV)
            {   debug!("Using API base from {}", API_BASE_ENV);
                self.completion.api_base = Some(base);
            }
        }
    }
}
