pub mod memory;
pub mod seed;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AudioFile, AudioFileCreate, AudioFileUpdate};

pub use memory::MemoryCatalog;

/// Storage for the audio entries served to the demo page.
///
/// Language arguments are matched case-insensitively after trimming.
#[async_trait]
pub trait AudioCatalog: Send + Sync {
    /// All entries, in insertion order
    async fn list(&self) -> Result<Vec<AudioFile>>;

    async fn get(&self, language: &str) -> Result<AudioFile>;

    /// Fails with `AlreadyExists` when the language is taken
    async fn create(&self, entry: AudioFileCreate) -> Result<AudioFile>;

    /// Replaces url and transcript, keeping id and language
    async fn update(&self, language: &str, entry: AudioFileUpdate) -> Result<AudioFile>;

    async fn delete(&self, language: &str) -> Result<()>;

    /// Cheap liveness probe for the health endpoint
    async fn ping(&self) -> Result<()>;

    fn backend_name(&self) -> &'static str;
}
