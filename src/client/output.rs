use super::error::{ClientError, ClientResult};

/// The media element the panel drives
pub trait AudioOutput {
    /// Point the output at a new source, rewinding to the start
    fn load(&mut self, url: &str) -> ClientResult<()>;

    /// Start, or resume from the paused position
    fn play(&mut self) -> ClientResult<()>;

    fn pause(&mut self) -> ClientResult<()>;

    /// Halt and unload; never fails
    fn stop(&mut self);
}

/// Headless output that only tracks what a real player would be doing
#[derive(Debug, Default)]
pub struct SilentOutput {
    source: Option<String>,
    playing: bool,
}

impl SilentOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}

impl AudioOutput for SilentOutput {
    fn load(&mut self, url: &str) -> ClientResult<()> {
        tracing::debug!(url, "Loading audio source");
        self.source = Some(url.to_string());
        self.playing = false;
        Ok(())
    }

    fn play(&mut self) -> ClientResult<()> {
        let Some(source) = &self.source else {
            return Err(ClientError::Playback("no source loaded".to_string()));
        };
        tracing::debug!(url = %source, "Playback started");
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> ClientResult<()> {
        self.playing = false;
        Ok(())
    }

    fn stop(&mut self) {
        self.playing = false;
        self.source = None;
    }
}
