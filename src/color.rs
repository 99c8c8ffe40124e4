use eframe::egui::Color32;
use palette::{IntoColor, Lab, Mix, Srgb};

// ---------------------------------------------------------------------------
// Fixed colours
// ---------------------------------------------------------------------------

pub const PM25_SERIES: Color32 = Color32::from_rgb(0xE0, 0x1B, 0x1B);
pub const PM10_SERIES: Color32 = Color32::from_rgb(0xFF, 0xA5, 0x00);

const BAR_HIGHEST: Color32 = Color32::from_rgb(0xC0, 0x19, 0x19);
const BAR_MIDDLE: Color32 = Color32::from_rgb(0xF4, 0xBB, 0x94);
const BAR_LOWEST: Color32 = Color32::from_rgb(0x78, 0xB2, 0x1F);

/// Colour of a cell with no defined value.
pub const MISSING: Color32 = Color32::from_gray(0x80);

/// Fill colours for a ranked bar chart of `n` bars, highest first: the top
/// bar red, the bottom bar green, everything between neutral.
pub fn ranked_bar_colors(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| match i {
            0 => BAR_HIGHEST,
            i if i + 1 == n => BAR_LOWEST,
            _ => BAR_MIDDLE,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Diverging colour scale for the correlation heatmap
// ---------------------------------------------------------------------------

/// Blue → light grey → red, interpolated in Lab so the midpoint stays
/// neutral.
#[derive(Debug, Clone)]
pub struct Coolwarm {
    cold: Lab,
    neutral: Lab,
    warm: Lab,
}

impl Default for Coolwarm {
    fn default() -> Self {
        let lab = |r: u8, g: u8, b: u8| -> Lab { Srgb::new(r, g, b).into_format::<f32>().into_color() };
        Self {
            cold: lab(59, 76, 192),
            neutral: lab(221, 221, 221),
            warm: lab(180, 4, 38),
        }
    }
}

impl Coolwarm {
    /// Map a value in `[-1, 1]` to a colour. Values outside are clamped;
    /// NaN maps to [`MISSING`].
    pub fn color_for(&self, value: f64) -> Color32 {
        if value.is_nan() {
            return MISSING;
        }
        let t = value.clamp(-1.0, 1.0) as f32;
        let lab = if t < 0.0 {
            self.neutral.mix(self.cold, -t)
        } else {
            self.neutral.mix(self.warm, t)
        };
        let rgb: Srgb = lab.into_color();
        Color32::from_rgb(
            (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
            (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
            (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
        )
    }

    /// Annotation colour readable on top of [`Coolwarm::color_for`].
    pub fn text_color_for(&self, value: f64) -> Color32 {
        if value.is_nan() || value.abs() > 0.6 {
            Color32::WHITE
        } else {
            Color32::BLACK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_bars_highlight_extremes() {
        let colors = ranked_bar_colors(4);
        assert_eq!(colors, vec![BAR_HIGHEST, BAR_MIDDLE, BAR_MIDDLE, BAR_LOWEST]);
        assert_eq!(ranked_bar_colors(1), vec![BAR_HIGHEST]);
        assert!(ranked_bar_colors(0).is_empty());
    }

    #[test]
    fn coolwarm_ends_are_blue_and_red() {
        let cw = Coolwarm::default();
        let cold = cw.color_for(-1.0);
        let warm = cw.color_for(1.0);
        assert!(cold.b() > cold.r());
        assert!(warm.r() > warm.b());
        assert_eq!(cw.color_for(f64::NAN), MISSING);
        assert_eq!(cw.color_for(5.0), warm);
    }

    #[test]
    fn coolwarm_midpoint_is_neutral() {
        let mid = Coolwarm::default().color_for(0.0);
        let spread = mid.r().max(mid.g()).max(mid.b()) - mid.r().min(mid.g()).min(mid.b());
        assert!(spread < 4, "{mid:?}");
    }
}
