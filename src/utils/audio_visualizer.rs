// Chord waveform preview

use crate::audio::voice::triangle;

pub const DISPLAY_POINTS: usize = 200;
/// Periods of the lowest tone shown in the preview.
pub const DISPLAY_PERIODS: usize = 2;

/// One steady-state window of the summed triangle tones, scaled to [-1, 1].
///
/// The window spans two periods of the lowest frequency. x runs from 0 to 1.
pub fn generate_chord_display(frequencies: &[f64], points: usize) -> Vec<[f32; 2]> {
    let lowest = frequencies.iter().copied().fold(f64::INFINITY, f64::min);
    if frequencies.is_empty() || points == 0 || !lowest.is_finite() || lowest <= 0.0 {
        return (0..points)
            .map(|i| [i as f32 / points.max(1) as f32, 0.0])
            .collect();
    }

    let scale = 1.0 / frequencies.len() as f32;

    (0..points)
        .map(|i| {
            let x = i as f64 / points as f64;
            let value: f32 = frequencies
                .iter()
                .map(|hz| {
                    let cycles = DISPLAY_PERIODS as f64 * hz / lowest;
                    triangle((x * cycles).fract() as f32)
                })
                .sum();
            [x as f32, value * scale]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chord_is_a_flat_line() {
        let points = generate_chord_display(&[], 10);
        assert_eq!(points.len(), 10);
        assert!(points.iter().all(|p| p[1] == 0.0));
    }

    #[test]
    fn single_tone_shows_two_periods() {
        let points = generate_chord_display(&[100.0], 8);
        let ys: Vec<f32> = points.iter().map(|p| p[1]).collect();
        assert_eq!(ys, vec![0.0, 1.0, 0.0, -1.0, 0.0, 1.0, 0.0, -1.0]);
    }

    #[test]
    fn chord_stays_in_range() {
        let points = generate_chord_display(&[261.63, 329.63, 392.0], DISPLAY_POINTS);
        assert!(points.iter().all(|p| (-1.0..=1.0).contains(&p[1])));
    }
}
