use hound::WavReader;
use std::io::Cursor;

/// Duration in milliseconds when `bytes` is a readable WAV file
pub fn wav_duration_ms(bytes: &[u8]) -> Option<f64> {
    let reader = WavReader::new(Cursor::new(bytes)).ok()?;
    let spec = reader.spec();

    if spec.channels == 0 || spec.sample_rate == 0 {
        return None;
    }

    // len() counts samples across all channels
    let frames = reader.len() as f64 / spec.channels as f64;
    Some(frames / spec.sample_rate as f64 * 1000.0)
}
