//! Color harmony analysis in HSL space

use serde::{Deserialize, Serialize};

/// Saturation below which a color counts as neutral (black, white, grey, beige...).
pub const NEUTRAL_SATURATION: f64 = 0.15;

const MONOCHROMATIC_SPAN: f64 = 15.0;
const ANALOGOUS_SPAN: f64 = 60.0;
const HARMONY_TOLERANCE: f64 = 30.0;
const CLOSE_COLOR_DISTANCE: f64 = 0.12;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Hsl {
    /// Hue in degrees, `[0, 360)`.
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    pub const BLACK: Hsl = Hsl { h: 0.0, s: 0.0, l: 0.0 };

    pub fn is_neutral(&self) -> bool {
        self.s < NEUTRAL_SATURATION
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmonyType {
    Monochromatic,
    Analogous,
    Complementary,
    Triadic,
    Neutral,
    Custom,
}

impl HarmonyType {
    /// Base score for the qualitative harmony types. `Custom` is scored continuously
    /// by [`ideal_contrast_score`] instead; the value here is its floor.
    pub fn base_score(&self) -> f64 {
        match self {
            HarmonyType::Monochromatic => 0.95,
            HarmonyType::Analogous => 0.90,
            HarmonyType::Complementary => 0.85,
            HarmonyType::Triadic => 0.80,
            HarmonyType::Neutral => 0.70,
            HarmonyType::Custom => 0.50,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarmonyAnalysis {
    pub harmony: HarmonyType,
    pub score: f64,
}

fn parse_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some((r, g, b))
        }
        3 => {
            let mut channels = hex.chars().map(|c| c.to_digit(16).map(|v| (v * 17) as u8));
            Some((channels.next()??, channels.next()??, channels.next()??))
        }
        _ => None,
    }
}

fn rgb_or_black(color: &str) -> (u8, u8, u8) {
    parse_rgb(color).unwrap_or((0, 0, 0))
}

/// Converts a `#rrggbb` or `#rgb` color to HSL. Anything unparseable maps to black.
pub fn hex_to_hsl(color: &str) -> Hsl {
    let Some((r, g, b)) = parse_rgb(color) else {
        return Hsl::BLACK;
    };

    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if (max - min).abs() < f64::EPSILON {
        return Hsl { h: 0.0, s: 0.0, l };
    }

    let delta = max - min;
    let s = if l > 0.5 { delta / (2.0 - max - min) } else { delta / (max + min) };

    let h = if (max - r).abs() < f64::EPSILON {
        ((g - b) / delta).rem_euclid(6.0)
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    Hsl { h: (h * 60.0).rem_euclid(360.0), s, l }
}

/// Shortest distance between two hues on the color wheel, `[0, 180]`.
pub fn hue_distance(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs() % 360.0;
    diff.min(360.0 - diff)
}

/// Smallest arc of the color wheel covering every hue.
fn circular_span(hues: &[f64]) -> f64 {
    if hues.len() < 2 {
        return 0.0;
    }

    let mut sorted = hues.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let gaps = sorted_gaps(&sorted);
    let largest = gaps.iter().copied().fold(0.0_f64, f64::max);
    360.0 - largest
}

/// Gaps between consecutive sorted hues, including the wrap-around gap.
fn sorted_gaps(sorted: &[f64]) -> Vec<f64> {
    let mut gaps: Vec<f64> = sorted.windows(2).map(|pair| pair[1] - pair[0]).collect();
    if let (Some(first), Some(last)) = (sorted.first(), sorted.last()) {
        gaps.push(first + 360.0 - last);
    }
    gaps
}

/// Weighted perceptual distance in `[0, 1]`: 0.6 hue, 0.2 saturation, 0.2 lightness.
pub fn color_distance(a: Hsl, b: Hsl) -> f64 {
    let hue = hue_distance(a.h, b.h) / 180.0;
    let saturation = (a.s - b.s).abs();
    let lightness = (a.l - b.l).abs();
    (0.6 * hue + 0.2 * saturation + 0.2 * lightness).clamp(0.0, 1.0)
}

/// Average pairwise distance, peaked at a medium contrast of 0.5.
pub fn ideal_contrast_score(colors: &[Hsl]) -> f64 {
    let mut total = 0.0;
    let mut pairs = 0usize;
    for (index, left) in colors.iter().enumerate() {
        for right in &colors[index + 1..] {
            total += color_distance(*left, *right);
            pairs += 1;
        }
    }

    if pairs == 0 {
        return 1.0;
    }

    let normalized = (total / pairs as f64).clamp(0.0, 1.0);
    (1.0 - (normalized - 0.5).abs() * 2.0).clamp(0.0, 1.0)
}

pub fn classify_harmony(colors: &[&str]) -> HarmonyType {
    if colors.is_empty() {
        return HarmonyType::Neutral;
    }

    let first = rgb_or_black(colors[0]);
    if colors.iter().all(|color| rgb_or_black(color) == first) {
        return HarmonyType::Monochromatic;
    }

    let hsl: Vec<Hsl> = colors.iter().map(|color| hex_to_hsl(color)).collect();
    let chromatic: Vec<f64> = hsl.iter().filter(|c| !c.is_neutral()).map(|c| c.h).collect();

    match chromatic.len() {
        0 => return HarmonyType::Neutral,
        // Neutrals go with anything, so a single accent color reads as monochromatic.
        1 => return HarmonyType::Monochromatic,
        _ => {}
    }

    let span = circular_span(&chromatic);
    if span <= MONOCHROMATIC_SPAN {
        return HarmonyType::Monochromatic;
    }
    if span <= ANALOGOUS_SPAN {
        return HarmonyType::Analogous;
    }

    if chromatic.len() == 2
        && (hue_distance(chromatic[0], chromatic[1]) - 180.0).abs() <= HARMONY_TOLERANCE
    {
        return HarmonyType::Complementary;
    }

    if chromatic.len() == 3 {
        let mut sorted = chromatic.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        if sorted_gaps(&sorted).iter().all(|gap| (gap - 120.0).abs() <= HARMONY_TOLERANCE) {
            return HarmonyType::Triadic;
        }
    }

    HarmonyType::Custom
}

pub fn analyze_harmony(colors: &[&str]) -> HarmonyAnalysis {
    let harmony = classify_harmony(colors);
    let score = match harmony {
        HarmonyType::Custom => {
            let hsl: Vec<Hsl> = colors.iter().map(|color| hex_to_hsl(color)).collect();
            HarmonyType::Custom.base_score() + 0.3 * ideal_contrast_score(&hsl)
        }
        other => other.base_score(),
    };

    HarmonyAnalysis { harmony, score }
}

/// How well a single candidate color sits with the colors already in an outfit.
///
/// Neutral candidates and direct matches score high, analogous and complementary
/// relationships slightly lower, anything else low.
pub fn color_match_score(candidate: &str, outfit_colors: &[&str]) -> f64 {
    let candidate_hsl = hex_to_hsl(candidate);
    if candidate_hsl.is_neutral() {
        return 0.9;
    }

    if outfit_colors.is_empty() {
        return 0.5;
    }

    outfit_colors
        .iter()
        .map(|color| {
            let other = hex_to_hsl(color);
            if rgb_or_black(candidate) == rgb_or_black(color)
                || color_distance(candidate_hsl, other) < CLOSE_COLOR_DISTANCE / 2.0
            {
                1.0
            } else if other.is_neutral() {
                0.6
            } else {
                let hue_gap = hue_distance(candidate_hsl.h, other.h);
                if hue_gap <= HARMONY_TOLERANCE {
                    0.8
                } else if (hue_gap - 180.0).abs() <= HARMONY_TOLERANCE {
                    0.75
                } else {
                    0.3
                }
            }
        })
        .fold(0.0_f64, f64::max)
}

/// Same color, or perceptually close enough to read as the same.
pub fn colors_are_close(left: &str, right: &str) -> bool {
    rgb_or_black(left) == rgb_or_black(right)
        || color_distance(hex_to_hsl(left), hex_to_hsl(right)) < CLOSE_COLOR_DISTANCE
}
