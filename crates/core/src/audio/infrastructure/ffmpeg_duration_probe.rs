use std::path::Path;

use crate::audio::domain::duration_probe::DurationProbe;
use crate::transcription::domain::speech_recognizer::BoxError;

/// Container timestamps are expressed in microseconds.
const AV_TIME_BASE: f64 = 1_000_000.0;

/// Reads duration from container metadata without decoding samples.
pub struct FfmpegDurationProbe;

impl DurationProbe for FfmpegDurationProbe {
    fn duration(&self, path: &Path) -> Result<f64, BoxError> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;

        let container = ictx.duration();
        if container > 0 {
            return Ok(container as f64 / AV_TIME_BASE);
        }

        // Some containers only carry a per-stream duration
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Audio)
            .ok_or_else(|| format!("no audio stream in {}", path.display()))?;
        let ticks = stream.duration();
        if ticks <= 0 {
            return Err(format!("duration unavailable for {}", path.display()).into());
        }
        Ok(ticks as f64 * f64::from(stream.time_base()))
    }
}
