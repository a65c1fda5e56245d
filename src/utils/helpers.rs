/// Normalize a vector of audio samples to the range [-1.0, 1.0]
pub fn normalize_samples(samples: &mut [f32]) {
    if samples.is_empty() {
        return;
    }

    let max_abs = samples
        .iter()
        .fold(0.0f32, |max, &sample| max.max(sample.abs()));

    if max_abs > 0.0 {
        for sample in samples.iter_mut() {
            *sample /= max_abs;
        }
    }
}

/// Format a frequency value with appropriate unit suffix (Hz, kHz)
pub fn format_frequency(freq: f64) -> String {
    if freq >= 1000.0 {
        format!("{:.2} kHz", freq / 1000.0)
    } else {
        format!("{:.2} Hz", freq)
    }
}

/// Format a time value with appropriate unit suffix (ms, s)
pub fn format_time(time_in_seconds: f32) -> String {
    if time_in_seconds >= 1.0 {
        format!("{:.2} s", time_in_seconds)
    } else {
        format!("{:.0} ms", time_in_seconds * 1000.0)
    }
}
