//! Plain-text export of generated prompts and replies

use std::path::{Path, PathBuf};
use log::info;

pub use crate::config::DEFAULT_EXPORT_FILE;

/// Write `text` to `path` (or `ai_prompt.txt` when `None`), replacing any
/// existing file. Returns the path written.
pub fn save_text(
  path: Option<&Path>
, text: &str
) -> Result<PathBuf, crate::error::Error>
{   let path = path
      .map(Path::to_path_buf)
      .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE));
    std::fs::write(&path, text)
      .map_err(|e| {
        crate::error::Error::Io(format!("{}: {}", path.display(), e))
      })?;
    info!("Saved {} bytes to {}", text.len(), path.display());
    Ok(path)
}
