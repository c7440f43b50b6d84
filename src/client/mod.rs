//! Client side of the demo page: catalog fetches, the playback state
//! machine behind the play/pause button, and downloads.

pub mod api;
pub mod error;
pub mod output;
pub mod panel;
pub mod wav;

pub use api::ApiClient;
pub use error::{ClientError, ClientResult};
pub use output::{AudioOutput, SilentOutput};
pub use panel::{DownloadedAudio, PlaybackState, TtsPanel};
