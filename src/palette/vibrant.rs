//! Vibrant-style palette: quantized color buckets scored against six lightness/saturation
//! targets.

use std::collections::HashMap;

use image::RgbImage;

use super::PaletteExtractor;
use crate::core::ColorSample;

/// Buckets kept as swatch candidates.
pub const MAX_SWATCHES: usize = 64;
const QUANTIZE_SHIFT: u8 = 3;
const WHITE_THRESHOLD: u8 = 250;

const TARGET_DARK_LUMA: f32 = 0.26;
const MAX_DARK_LUMA: f32 = 0.45;
const MIN_LIGHT_LUMA: f32 = 0.55;
const TARGET_LIGHT_LUMA: f32 = 0.74;
const MIN_NORMAL_LUMA: f32 = 0.3;
const TARGET_NORMAL_LUMA: f32 = 0.5;
const MAX_NORMAL_LUMA: f32 = 0.7;
const TARGET_MUTED_SATURATION: f32 = 0.3;
const MAX_MUTED_SATURATION: f32 = 0.4;
const TARGET_VIBRANT_SATURATION: f32 = 1.0;
const MIN_VIBRANT_SATURATION: f32 = 0.35;

const WEIGHT_SATURATION: f32 = 3.0;
const WEIGHT_LUMA: f32 = 6.5;
const WEIGHT_POPULATION: f32 = 0.5;

/// The six palette slots, in the order they are filled and returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwatchKind {
    Vibrant,
    LightVibrant,
    DarkVibrant,
    Muted,
    LightMuted,
    DarkMuted,
}

impl SwatchKind {
    pub const ALL: [SwatchKind; 6] = [
        SwatchKind::Vibrant,
        SwatchKind::LightVibrant,
        SwatchKind::DarkVibrant,
        SwatchKind::Muted,
        SwatchKind::LightMuted,
        SwatchKind::DarkMuted,
    ];

    fn target(self) -> Target {
        let (min_luma, target_luma, max_luma) = match self {
            SwatchKind::Vibrant | SwatchKind::Muted => {
                (MIN_NORMAL_LUMA, TARGET_NORMAL_LUMA, MAX_NORMAL_LUMA)
            }
            SwatchKind::LightVibrant | SwatchKind::LightMuted => {
                (MIN_LIGHT_LUMA, TARGET_LIGHT_LUMA, 1.0)
            }
            SwatchKind::DarkVibrant | SwatchKind::DarkMuted => (0.0, TARGET_DARK_LUMA, MAX_DARK_LUMA),
        };
        let (min_saturation, target_saturation, max_saturation) = match self {
            SwatchKind::Vibrant | SwatchKind::LightVibrant | SwatchKind::DarkVibrant => {
                (MIN_VIBRANT_SATURATION, TARGET_VIBRANT_SATURATION, 1.0)
            }
            _ => (0.0, TARGET_MUTED_SATURATION, MAX_MUTED_SATURATION),
        };
        Target {
            min_luma,
            target_luma,
            max_luma,
            min_saturation,
            target_saturation,
            max_saturation,
        }
    }
}

struct Target {
    min_luma: f32,
    target_luma: f32,
    max_luma: f32,
    min_saturation: f32,
    target_saturation: f32,
    max_saturation: f32,
}

/// A quantized color with its pixel count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteSwatch {
    pub color: ColorSample,
    pub population: u32,
    pub hsl: [f32; 3],
}

impl PaletteSwatch {
    pub fn new(color: ColorSample, population: u32) -> Self {
        Self {
            color,
            population,
            hsl: rgb_to_hsl(color),
        }
    }
}

pub fn rgb_to_hsl(color: ColorSample) -> [f32; 3] {
    let r = color.r as f32 / 255.0;
    let g = color.g as f32 / 255.0;
    let b = color.b as f32 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return [0.0, 0.0, l];
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    [h / 6.0, s, l]
}

pub fn hsl_to_rgb([h, s, l]: [f32; 3]) -> ColorSample {
    let to_byte = |v: f32| (v * 255.0).round().clamp(0.0, 255.0) as u8;

    if s == 0.0 {
        let v = to_byte(l);
        return ColorSample::new(v, v, v);
    }

    fn hue(p: f32, q: f32, mut t: f32) -> f32 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    ColorSample::new(
        to_byte(hue(p, q, h + 1.0 / 3.0)),
        to_byte(hue(p, q, h)),
        to_byte(hue(p, q, h - 1.0 / 3.0)),
    )
}

/// Group pixels into 5-bit buckets, most populated first.
pub fn quantize(image: &RgbImage, max_swatches: usize) -> Vec<PaletteSwatch> {
    let mut buckets: HashMap<[u8; 3], (u64, u64, u64, u32)> = HashMap::new();

    for pixel in image.pixels() {
        let [r, g, b] = pixel.0;
        if r > WHITE_THRESHOLD && g > WHITE_THRESHOLD && b > WHITE_THRESHOLD {
            continue;
        }
        let key = [r >> QUANTIZE_SHIFT, g >> QUANTIZE_SHIFT, b >> QUANTIZE_SHIFT];
        let bucket = buckets.entry(key).or_insert((0, 0, 0, 0));
        bucket.0 += r as u64;
        bucket.1 += g as u64;
        bucket.2 += b as u64;
        bucket.3 += 1;
    }

    let mut swatches: Vec<(&[u8; 3], PaletteSwatch)> = buckets
        .iter()
        .map(|(key, &(r, g, b, count))| {
            let n = count as u64;
            let color = ColorSample::new((r / n) as u8, (g / n) as u8, (b / n) as u8);
            (key, PaletteSwatch::new(color, count))
        })
        .collect();
    // Key order breaks population ties so the result does not depend on hash order.
    swatches.sort_by(|a, b| b.1.population.cmp(&a.1.population).then(a.0.cmp(b.0)));
    swatches.truncate(max_swatches);
    swatches.into_iter().map(|(_, swatch)| swatch).collect()
}

fn score(swatch: &PaletteSwatch, target: &Target, max_population: u32) -> f32 {
    let [_, saturation, luma] = swatch.hsl;
    let saturation_score = 1.0 - (saturation - target.target_saturation).abs();
    let luma_score = 1.0 - (luma - target.target_luma).abs();
    let population_score = if max_population == 0 {
        0.0
    } else {
        swatch.population as f32 / max_population as f32
    };

    (saturation_score * WEIGHT_SATURATION
        + luma_score * WEIGHT_LUMA
        + population_score * WEIGHT_POPULATION)
        / (WEIGHT_SATURATION + WEIGHT_LUMA + WEIGHT_POPULATION)
}

/// Fill every slot from the candidate swatches. Each swatch is used at most once.
pub fn select(swatches: &[PaletteSwatch]) -> Vec<(SwatchKind, Option<PaletteSwatch>)> {
    let max_population = swatches.iter().map(|s| s.population).max().unwrap_or(0);
    let mut used = vec![false; swatches.len()];

    let mut slots: Vec<(SwatchKind, Option<PaletteSwatch>)> = SwatchKind::ALL
        .iter()
        .map(|&kind| {
            let target = kind.target();
            let mut best: Option<(usize, f32)> = None;
            for (i, swatch) in swatches.iter().enumerate() {
                let [_, saturation, luma] = swatch.hsl;
                if used[i]
                    || saturation < target.min_saturation
                    || saturation > target.max_saturation
                    || luma < target.min_luma
                    || luma > target.max_luma
                {
                    continue;
                }
                let value = score(swatch, &target, max_population);
                if best.map_or(true, |(_, v)| value > v) {
                    best = Some((i, value));
                }
            }
            let chosen = best.map(|(i, _)| {
                used[i] = true;
                swatches[i]
            });
            (kind, chosen)
        })
        .collect();

    fill_missing_vibrant(&mut slots);
    slots
}

/// Derive Vibrant from DarkVibrant or the other way round by moving lightness.
fn fill_missing_vibrant(slots: &mut [(SwatchKind, Option<PaletteSwatch>)]) {
    let find = |slots: &[(SwatchKind, Option<PaletteSwatch>)], kind: SwatchKind| {
        slots.iter().position(|(k, _)| *k == kind)
    };
    let (Some(vibrant), Some(dark)) = (
        find(slots, SwatchKind::Vibrant),
        find(slots, SwatchKind::DarkVibrant),
    ) else {
        return;
    };

    let derive = |from: PaletteSwatch, luma: f32| {
        let [h, s, _] = from.hsl;
        PaletteSwatch::new(hsl_to_rgb([h, s, luma]), 0)
    };
    match (slots[vibrant].1, slots[dark].1) {
        (None, Some(from)) => slots[vibrant].1 = Some(derive(from, TARGET_NORMAL_LUMA)),
        (Some(from), None) => slots[dark].1 = Some(derive(from, TARGET_DARK_LUMA)),
        _ => {}
    }
}

/// Vibrant-style extractor.
#[derive(Debug, Clone, Copy)]
pub struct VibrantExtractor {
    pub max_swatches: usize,
}

impl Default for VibrantExtractor {
    fn default() -> Self {
        Self {
            max_swatches: MAX_SWATCHES,
        }
    }
}

impl PaletteExtractor for VibrantExtractor {
    fn extract(&self, image: &RgbImage) -> Vec<ColorSample> {
        let swatches = quantize(image, self.max_swatches);
        select(&swatches)
            .into_iter()
            .filter_map(|(_, swatch)| swatch.map(|s| s.color))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn image_of(colors: &[([u8; 3], u32)]) -> RgbImage {
        let total: u32 = colors.iter().map(|(_, n)| n).sum();
        let mut pixels = colors
            .iter()
            .flat_map(|&(c, n)| std::iter::repeat(c).take(n as usize));
        RgbImage::from_fn(total, 1, |_, _| Rgb(pixels.next().unwrap_or([255, 255, 255])))
    }

    #[test]
    fn hsl_round_trip_for_primaries() {
        for color in [
            ColorSample::new(255, 0, 0),
            ColorSample::new(0, 128, 255),
            ColorSample::new(40, 40, 40),
        ] {
            assert_eq!(hsl_to_rgb(rgb_to_hsl(color)), color);
        }
        let [_, s, l] = rgb_to_hsl(ColorSample::new(255, 0, 0));
        assert_eq!((s, l), (1.0, 0.5));
    }

    #[test]
    fn white_pixels_are_ignored() {
        let swatches = quantize(&image_of(&[([255, 255, 255], 50), ([200, 10, 10], 5)]), 64);
        assert_eq!(swatches.len(), 1);
        assert_eq!(swatches[0].population, 5);
    }

    #[test]
    fn buckets_are_sorted_by_population() {
        let swatches = quantize(
            &image_of(&[([10, 200, 10], 3), ([200, 10, 10], 7), ([10, 10, 200], 5)]),
            2,
        );
        let colors: Vec<_> = swatches.iter().map(|s| s.color).collect();
        assert_eq!(
            colors,
            vec![ColorSample::new(200, 10, 10), ColorSample::new(10, 10, 200)]
        );
    }

    #[test]
    fn saturated_mid_color_is_vibrant() {
        let swatches = quantize(&image_of(&[([230, 20, 20], 10)]), 64);
        let slots = select(&swatches);
        assert_eq!(slots[0].0, SwatchKind::Vibrant);
        assert_eq!(slots[0].1.map(|s| s.color), Some(ColorSample::new(230, 20, 20)));
        // Dark vibrant is derived from it.
        let dark = slots[2].1.unwrap();
        assert!((dark.hsl[2] - TARGET_DARK_LUMA).abs() < 0.01);
        assert!(slots[3].1.is_none());
    }

    #[test]
    fn extractor_returns_slots_in_order_and_skips_empty_ones() {
        let image = image_of(&[
            ([230, 20, 20], 10),  // vibrant red
            ([120, 100, 100], 8), // muted grey-red
            ([20, 20, 90], 6),    // dark vibrant blue
        ]);
        let samples = VibrantExtractor::default().extract(&image);
        assert_eq!(
            samples,
            vec![
                ColorSample::new(230, 20, 20),
                ColorSample::new(20, 20, 90),
                ColorSample::new(120, 100, 100),
            ]
        );
    }

    #[test]
    fn empty_image_gives_empty_palette() {
        let image = image_of(&[([255, 255, 255], 4)]);
        assert!(VibrantExtractor::default().extract(&image).is_empty());
    }
}
