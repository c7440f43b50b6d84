pub mod audio;
pub mod requests;
pub mod responses;

pub use audio::AudioFile;
pub use requests::{AudioFileCreate, AudioFileUpdate};
pub use responses::{HealthResponse, MessageResponse, StatsResponse};
