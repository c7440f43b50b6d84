use std::path::{Path, PathBuf};

use super::api::ApiClient;
use super::error::{ClientError, ClientResult};
use super::output::AudioOutput;
use super::wav::wav_duration_ms;
use crate::config::constants::{DEFAULT_AUDIO_EXTENSION, DEFAULT_LANGUAGE};
use crate::models::AudioFile;

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackState {
    /// Nothing selected yet
    Idle,
    /// Entry for the selected language is being fetched
    Loading,
    /// Entry loaded, not playing
    Ready,
    Playing,
    Paused,
    /// Last fetch failed; holds the message shown to the user
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct DownloadedAudio {
    pub path: PathBuf,
    pub bytes: u64,
    /// Only known for WAV files
    pub duration_ms: Option<f64>,
}

/// The text-to-speech panel: language picker, play/pause button, download link
pub struct TtsPanel<O: AudioOutput> {
    client: ApiClient,
    output: O,
    languages: Vec<String>,
    selected: Option<String>,
    current: Option<AudioFile>,
    state: PlaybackState,
}

impl<O: AudioOutput> TtsPanel<O> {
    pub fn new(client: ApiClient, output: O) -> Self {
        Self {
            client,
            output,
            languages: Vec::new(),
            selected: None,
            current: None,
            state: PlaybackState::Idle,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn selected_language(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn current(&self) -> Option<&AudioFile> {
        self.current.as_ref()
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// `english` when offered, otherwise the first language listed
    pub fn default_language(&self) -> Option<&str> {
        self.languages
            .iter()
            .find(|l| l.as_str() == DEFAULT_LANGUAGE)
            .or_else(|| self.languages.first())
            .map(|l| l.as_str())
    }

    /// Reload the language list and, on first use, select the default language
    pub async fn refresh_languages(&mut self) -> ClientResult<()> {
        let entries = self.client.list_audio().await?;

        let mut languages: Vec<String> = Vec::with_capacity(entries.len());
        for entry in entries {
            if !languages.contains(&entry.language) {
                languages.push(entry.language);
            }
        }
        self.languages = languages;

        tracing::debug!(languages = ?self.languages, "Language list refreshed");

        if self.selected.is_none() {
            if let Some(language) = self.default_language().map(|l| l.to_string()) {
                self.select_language(&language).await?;
            }
        }

        Ok(())
    }

    /// Stop whatever plays, fetch the entry for `language` and load it
    pub async fn select_language(&mut self, language: &str) -> ClientResult<&AudioFile> {
        self.output.stop();
        self.current = None;
        self.selected = Some(language.to_string());
        self.state = PlaybackState::Loading;

        match self.fetch_and_load(language).await {
            Ok(entry) => {
                self.state = PlaybackState::Ready;
                Ok(self.current.insert(entry))
            }
            Err(e) => {
                tracing::warn!(language, error = %e, "Could not load audio");
                self.output.stop();
                self.state = PlaybackState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    async fn fetch_and_load(&mut self, language: &str) -> ClientResult<AudioFile> {
        let entry = self.client.get_audio(language).await?;
        let url = self.client.resolve_audio_url(&entry.audio_url)?;
        self.output.load(url.as_str())?;
        Ok(entry)
    }

    /// The play/pause button
    pub fn toggle_playback(&mut self) -> ClientResult<&PlaybackState> {
        if self.current.is_none() {
            return Err(ClientError::NothingLoaded);
        }

        let next = match self.state {
            PlaybackState::Ready | PlaybackState::Paused => {
                self.output.play()?;
                PlaybackState::Playing
            }
            PlaybackState::Playing => {
                self.output.pause()?;
                PlaybackState::Paused
            }
            _ => return Err(ClientError::NothingLoaded),
        };

        self.state = next;
        Ok(&self.state)
    }

    /// Rewind to the start, keeping the entry loaded
    pub fn stop(&mut self) -> ClientResult<()> {
        let Some(entry) = &self.current else {
            self.output.stop();
            self.state = PlaybackState::Idle;
            return Ok(());
        };

        let url = self.client.resolve_audio_url(&entry.audio_url)?;
        self.output.stop();
        self.output.load(url.as_str())?;
        self.state = PlaybackState::Ready;
        Ok(())
    }

    /// The media element reached the end of the clip
    pub fn playback_finished(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Ready;
        }
    }

    /// Save the current clip into `dir` as `{id}.{ext}`
    pub async fn download(&self, dir: &Path) -> ClientResult<DownloadedAudio> {
        let entry = self.current.as_ref().ok_or(ClientError::NothingLoaded)?;
        let extension = entry
            .file_extension()
            .unwrap_or(DEFAULT_AUDIO_EXTENSION)
            .to_lowercase();

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}.{}", safe_file_stem(&entry.id), extension));

        let bytes = self.client.download(&entry.audio_url, &path).await?;

        let duration_ms = if extension == "wav" {
            wav_duration_ms(&tokio::fs::read(&path).await?)
        } else {
            None
        };

        tracing::info!(
            path = %path.display(),
            bytes,
            duration_ms = ?duration_ms,
            "Audio downloaded"
        );

        Ok(DownloadedAudio {
            path,
            bytes,
            duration_ms,
        })
    }
}

/// Ids come from the server; keep them from escaping the target directory
fn safe_file_stem(id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.is_empty() {
        "audio".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::output::SilentOutput;

    fn panel() -> TtsPanel<SilentOutput> {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        TtsPanel::new(client, SilentOutput::new())
    }

    fn entry() -> AudioFile {
        AudioFile {
            id: "english_audio".to_string(),
            language: "english".to_string(),
            audio_url: "/static/english.wav".to_string(),
            text_content: "Hello".to_string(),
        }
    }

    fn loaded_panel() -> TtsPanel<SilentOutput> {
        let mut panel = panel();
        panel.output.load("http://127.0.0.1:9/static/english.wav").unwrap();
        panel.current = Some(entry());
        panel.selected = Some("english".to_string());
        panel.state = PlaybackState::Ready;
        panel
    }

    #[test]
    fn test_new_panel_is_idle() {
        let panel = panel();
        assert_eq!(panel.state(), &PlaybackState::Idle);
        assert!(panel.current().is_none());
        assert!(panel.default_language().is_none());
    }

    #[test]
    fn test_toggle_without_audio() {
        let mut panel = panel();
        assert!(matches!(
            panel.toggle_playback(),
            Err(ClientError::NothingLoaded)
        ));
    }

    #[test]
    fn test_toggle_cycles_play_pause() {
        let mut panel = loaded_panel();

        assert_eq!(panel.toggle_playback().unwrap(), &PlaybackState::Playing);
        assert!(panel.output().is_playing());

        assert_eq!(panel.toggle_playback().unwrap(), &PlaybackState::Paused);
        assert!(!panel.output().is_playing());

        assert_eq!(panel.toggle_playback().unwrap(), &PlaybackState::Playing);
    }

    #[test]
    fn test_playback_finished_returns_to_ready() {
        let mut panel = loaded_panel();
        panel.toggle_playback().unwrap();

        panel.playback_finished();

        assert_eq!(panel.state(), &PlaybackState::Ready);
    }

    #[test]
    fn test_playback_finished_ignored_when_paused() {
        let mut panel = loaded_panel();
        panel.toggle_playback().unwrap();
        panel.toggle_playback().unwrap();

        panel.playback_finished();

        assert_eq!(panel.state(), &PlaybackState::Paused);
    }

    #[test]
    fn test_stop_rewinds_and_keeps_entry() {
        let mut panel = loaded_panel();
        panel.toggle_playback().unwrap();

        panel.stop().unwrap();

        assert_eq!(panel.state(), &PlaybackState::Ready);
        assert!(!panel.output().is_playing());
        assert_eq!(
            panel.output().source(),
            Some("http://127.0.0.1:9/static/english.wav")
        );
        assert!(panel.current().is_some());
    }

    #[test]
    fn test_default_language_prefers_english() {
        let mut panel = panel();
        panel.languages = vec!["arabic".to_string(), "english".to_string()];
        assert_eq!(panel.default_language(), Some("english"));

        panel.languages = vec!["arabic".to_string(), "french".to_string()];
        assert_eq!(panel.default_language(), Some("arabic"));
    }

    #[tokio::test]
    async fn test_download_without_audio() {
        let panel = panel();
        let dir = tempfile::TempDir::new().unwrap();

        assert!(matches!(
            panel.download(dir.path()).await,
            Err(ClientError::NothingLoaded)
        ));
    }

    #[test]
    fn test_safe_file_stem() {
        assert_eq!(safe_file_stem("english_audio"), "english_audio");
        assert_eq!(safe_file_stem("../../etc/passwd"), "______etc_passwd");
        assert_eq!(safe_file_stem(""), "audio");
    }
}
