use std::time::Duration;

use anyhow::{Context, Result};
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use tracing::debug;

/// Practice error cue: a short C5 tone with a decay envelope.
#[derive(Debug, Clone)]
struct ErrorTone {
    sample_rate: u32,
    frame: u64,
}

impl ErrorTone {
    const FREQ_HZ: f32 = 523.25;
    const DURATION_MS: u64 = 250;

    fn new() -> Self {
        Self {
            sample_rate: 48_000,
            frame: 0,
        }
    }

    fn total_frames(&self) -> u64 {
        self.sample_rate as u64 * Self::DURATION_MS / 1_000
    }
}

impl Iterator for ErrorTone {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.frame >= self.total_frames() {
            return None;
        }
        let t = self.frame as f32 / self.sample_rate as f32;
        let progress = self.frame as f32 / self.total_frames() as f32;
        let envelope = (1.0 - progress).max(0.0).powf(1.6);
        let sample =
            (2.0 * std::f32::consts::PI * Self::FREQ_HZ * t).sin() * envelope * 0.35;
        self.frame += 1;
        Some(sample)
    }
}

impl Source for ErrorTone {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.total_frames().saturating_sub(self.frame) as usize)
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_millis(Self::DURATION_MS))
    }
}

/// Audio output held for the whole run; each cue plays on a detached sink.
pub struct Sfx {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl Sfx {
    pub fn new() -> Result<Self> {
        let (stream, handle) =
            OutputStream::try_default().context("no audio output device available")?;
        Ok(Self {
            _stream: stream,
            handle,
        })
    }

    pub fn play_error_tone(&self) {
        let Ok(sink) = Sink::try_new(&self.handle) else {
            return;
        };
        sink.append(ErrorTone::new());
        sink.detach();
        debug!("error tone played");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_tone_has_the_expected_length_and_decays() {
        let tone = ErrorTone::new();
        let samples: Vec<f32> = tone.collect();
        // 250 ms of mono audio at 48 kHz.
        assert_eq!(samples.len(), 12_000);
        assert!(samples.iter().all(|s| s.abs() <= 1.0));

        let head: f32 = samples[..1_000].iter().map(|s| s.abs()).sum();
        let tail: f32 = samples[11_000..].iter().map(|s| s.abs()).sum();
        assert!(head > tail);
    }
}
