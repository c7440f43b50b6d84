use serde::{Deserialize, Serialize};

/// One pre-generated recording in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFile {
    pub id: String,
    pub language: String,
    pub audio_url: String,
    pub text_content: String,
}

impl AudioFile {
    /// Extension of the file behind `audio_url`, if the URL path carries one
    pub fn file_extension(&self) -> Option<&str> {
        let path = self
            .audio_url
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let file_name = path.rsplit('/').next()?;
        let (stem, ext) = file_name.rsplit_once('.')?;

        if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }

        Some(ext)
    }
}
