use crate::models::Rgb;
use serde::{Deserialize, Serialize};

pub const NEUTRAL: Rgb = Rgb::new(0.5, 0.7, 1.0);
pub const HIGH_CONTRAST_NEUTRAL: Rgb = Rgb::new(0.85, 0.85, 0.85);

const HIGH_CONTRAST_POSITIVE: Rgb = Rgb::new(0.0, 0.45, 0.70);
const HIGH_CONTRAST_NEGATIVE: Rgb = Rgb::new(0.90, 0.38, 0.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    #[default]
    Default,
    HighContrast,
}

impl Palette {
    pub fn color_for(self, value: f64, max_absolute_value: f64) -> Rgb {
        match self {
            Palette::Default => color_for(value, max_absolute_value),
            Palette::HighContrast => high_contrast_color_for(value, max_absolute_value),
        }
    }
}

/// Diverging red/green scale; the sign picks the hue, the magnitude how far it
/// moves away from pale.
pub fn color_for(value: f64, max_absolute_value: f64) -> Rgb {
    if value == 0.0 || !value.is_finite() {
        return NEUTRAL;
    }
    let muted = 0.2 + (1.0 - intensity(value, max_absolute_value)) * 0.6;
    if value > 0.0 {
        Rgb::new(muted, 1.0, muted)
    } else {
        Rgb::new(1.0, muted, muted)
    }
}

/// Blue/orange scale that stays distinguishable under red-green colour blindness.
pub fn high_contrast_color_for(value: f64, max_absolute_value: f64) -> Rgb {
    if value == 0.0 || !value.is_finite() {
        return HIGH_CONTRAST_NEUTRAL;
    }
    let target = if value > 0.0 {
        HIGH_CONTRAST_POSITIVE
    } else {
        HIGH_CONTRAST_NEGATIVE
    };
    let t = 0.35 + intensity(value, max_absolute_value) * 0.65;
    Rgb::new(
        mix(HIGH_CONTRAST_NEUTRAL.r, target.r, t),
        mix(HIGH_CONTRAST_NEUTRAL.g, target.g, t),
        mix(HIGH_CONTRAST_NEUTRAL.b, target.b, t),
    )
}

fn intensity(value: f64, max_absolute_value: f64) -> f64 {
    if max_absolute_value <= 0.0 || !max_absolute_value.is_finite() {
        return 1.0;
    }
    (value.abs() / max_absolute_value).min(1.0)
}

fn mix(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}
