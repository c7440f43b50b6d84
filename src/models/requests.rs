use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utils::validation::{normalize_audio_url, normalize_language, normalize_text_content};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFileCreate {
    pub language: String,
    pub audio_url: String,
    pub text_content: String,
}

impl AudioFileCreate {
    /// Validate every field and return the stored form
    pub fn normalized(self) -> Result<Self> {
        Ok(Self {
            language: normalize_language(&self.language)?,
            audio_url: normalize_audio_url(&self.audio_url)?,
            text_content: normalize_text_content(&self.text_content)?,
        })
    }
}

/// Replacement fields for an existing entry.
///
/// A `language` field in the body is ignored; the path names the entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioFileUpdate {
    pub audio_url: String,
    pub text_content: String,
}

impl AudioFileUpdate {
    pub fn normalized(self) -> Result<Self> {
        Ok(Self {
            audio_url: normalize_audio_url(&self.audio_url)?,
            text_content: normalize_text_content(&self.text_content)?,
        })
    }
}
