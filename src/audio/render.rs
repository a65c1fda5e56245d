//! Offline rendering of the enabled chord.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use super::voice::Voice;
use crate::core::playback::{ATTACK_SECONDS, PLAYBACK_VOLUME, RELEASE_SECONDS};
use crate::utils::helpers::normalize_samples;

pub const EXPORT_SAMPLE_RATE: u32 = 44_100;
/// How long the chord sustains between attack and release in an export.
pub const EXPORT_HOLD_SECONDS: f32 = 2.0;

/// Render the chord through attack, hold and release, normalized to [-1, 1].
pub fn render_chord(frequencies: &[f64], sample_rate: u32, hold_seconds: f32) -> Vec<f32> {
    let rate = sample_rate as f32;
    let release_at = ((ATTACK_SECONDS + hold_seconds) * rate) as usize;
    let total = release_at + (RELEASE_SECONDS * rate).ceil() as usize;

    let mut voices: Vec<Voice> = frequencies
        .iter()
        .map(|&hz| {
            let mut voice = Voice::new(hz as f32);
            voice.volume = PLAYBACK_VOLUME;
            voice.start();
            voice
        })
        .collect();

    let mut samples: Vec<f32> = Vec::with_capacity(total);
    for i in 0..total {
        if i == release_at {
            voices.iter_mut().for_each(Voice::stop);
        }
        samples.push(voices.iter_mut().map(|v| v.next_sample(rate)).sum());
    }

    normalize_samples(&mut samples);
    samples
}

/// Write mono samples as a 16-bit WAV file.
pub fn export_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(value).context("Failed to write sample")?;
    }
    writer.finalize().context("Failed to finalize WAV file")?;

    info!("Exported {} samples to {}", samples.len(), path.display());
    Ok(())
}
