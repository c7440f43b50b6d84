use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;

use super::seed::sample_entries;
use super::AudioCatalog;
use crate::error::{CatalogError, Result};
use crate::models::{AudioFile, AudioFileCreate, AudioFileUpdate};
use crate::utils::validation::{audio_id_for, language_key};

/// Ordered in-memory catalog with an optional JSON snapshot on disk
pub struct MemoryCatalog {
    entries: RwLock<Vec<AudioFile>>,
    snapshot_path: Option<PathBuf>,
}

impl MemoryCatalog {
    pub fn new(entries: Vec<AudioFile>) -> Self {
        Self {
            entries: RwLock::new(dedupe(entries)),
            snapshot_path: None,
        }
    }

    /// Catalog holding the sample english/arabic entries
    pub fn seeded() -> Self {
        Self::new(sample_entries())
    }

    /// Load the snapshot at `path`, or seed and write it when it does not exist yet
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();

        let entries = if fs::try_exists(&path).await? {
            let raw = fs::read(&path).await?;
            let entries: Vec<AudioFile> = serde_json::from_slice(&raw)?;
            tracing::info!(
                path = ?path,
                entries = entries.len(),
                "Loaded catalog snapshot"
            );
            entries
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).await?;
            }
            let entries = sample_entries();
            write_snapshot(&path, &entries).await?;
            tracing::info!(path = ?path, "Created catalog snapshot from sample data");
            entries
        };

        Ok(Self {
            entries: RwLock::new(dedupe(entries)),
            snapshot_path: Some(path),
        })
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    async fn persist(&self, entries: &[AudioFile]) -> Result<()> {
        match &self.snapshot_path {
            Some(path) => write_snapshot(path, entries).await,
            None => Ok(()),
        }
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::seeded()
    }
}

#[async_trait]
impl AudioCatalog for MemoryCatalog {
    async fn list(&self) -> Result<Vec<AudioFile>> {
        Ok(self.entries.read().await.clone())
    }

    async fn get(&self, language: &str) -> Result<AudioFile> {
        let key = language_key(language);
        self.entries
            .read()
            .await
            .iter()
            .find(|entry| entry.language == key)
            .cloned()
            .ok_or(CatalogError::NotFound(key))
    }

    async fn create(&self, entry: AudioFileCreate) -> Result<AudioFile> {
        let entry = entry.normalized()?;
        let mut entries = self.entries.write().await;

        if entries.iter().any(|e| e.language == entry.language) {
            return Err(CatalogError::AlreadyExists(entry.language));
        }

        let created = AudioFile {
            id: audio_id_for(&entry.language),
            language: entry.language,
            audio_url: entry.audio_url,
            text_content: entry.text_content,
        };

        entries.push(created.clone());
        if let Err(e) = self.persist(&entries).await {
            entries.pop();
            return Err(e);
        }

        tracing::debug!(language = %created.language, "Catalog entry created");
        Ok(created)
    }

    async fn update(&self, language: &str, entry: AudioFileUpdate) -> Result<AudioFile> {
        let key = language_key(language);
        let entry = entry.normalized()?;
        let mut entries = self.entries.write().await;

        let index = entries
            .iter()
            .position(|e| e.language == key)
            .ok_or_else(|| CatalogError::NotFound(key.clone()))?;

        let previous = entries[index].clone();
        entries[index].audio_url = entry.audio_url;
        entries[index].text_content = entry.text_content;

        if let Err(e) = self.persist(&entries).await {
            entries[index] = previous;
            return Err(e);
        }

        tracing::debug!(language = %key, "Catalog entry updated");
        Ok(entries[index].clone())
    }

    async fn delete(&self, language: &str) -> Result<()> {
        let key = language_key(language);
        let mut entries = self.entries.write().await;

        let index = entries
            .iter()
            .position(|e| e.language == key)
            .ok_or_else(|| CatalogError::NotFound(key.clone()))?;

        let removed = entries.remove(index);
        if let Err(e) = self.persist(&entries).await {
            entries.insert(index, removed);
            return Err(e);
        }

        tracing::debug!(language = %key, "Catalog entry deleted");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        match fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(CatalogError::Unavailable(format!(
                "{} is not a directory",
                dir.display()
            ))),
            Err(e) => Err(CatalogError::Unavailable(format!(
                "snapshot directory {}: {}",
                dir.display(),
                e
            ))),
        }
    }

    fn backend_name(&self) -> &'static str {
        if self.snapshot_path.is_some() {
            "json-file"
        } else {
            "memory"
        }
    }
}

/// Keep the first entry per language, normalising keys on the way in
fn dedupe(entries: Vec<AudioFile>) -> Vec<AudioFile> {
    let mut kept: Vec<AudioFile> = Vec::with_capacity(entries.len());

    for mut entry in entries {
        entry.language = language_key(&entry.language);
        if kept.iter().any(|e| e.language == entry.language) {
            tracing::warn!(language = %entry.language, "Ignoring duplicate catalog entry");
            continue;
        }
        kept.push(entry);
    }

    kept
}

/// Write via a sibling temp file and rename so readers never see half a file
async fn write_snapshot(path: &Path, entries: &[AudioFile]) -> Result<()> {
    let json = serde_json::to_vec_pretty(entries)?;
    let tmp_path = path.with_extension("json.tmp");

    fs::write(&tmp_path, json).await?;
    fs::rename(&tmp_path, path).await?;

    Ok(())
}
