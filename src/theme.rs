use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::metrics::StatusTier;

// ---------------------------------------------------------------------------
// Dashboard colors
// ---------------------------------------------------------------------------

/// Gold accent used for headings and the main trace.
pub const ACCENT: Color32 = Color32::from_rgb(0xff, 0xd1, 0x66);

/// Badge / threshold-line color per status tier.
pub fn status_color(tier: StatusTier) -> Color32 {
    match tier {
        StatusTier::Ok => Color32::from_rgb(0x2e, 0xcc, 0x71),
        StatusTier::Warning => Color32::from_rgb(0xff, 0xb7, 0x03),
        StatusTier::Critical => Color32::from_rgb(0xe7, 0x4c, 0x3c),
    }
}

/// Color for a single reading: green below the warning threshold, sliding
/// through amber to red at the critical threshold. Used by the bar chart so
/// each reading carries its own tier at a glance.
pub fn value_color(value: f64, warning: f64, critical: f64) -> Color32 {
    let span = critical - warning;
    let t = if span > 0.0 {
        ((value - warning) / span).clamp(0.0, 1.0)
    } else if value >= critical {
        1.0
    } else {
        0.0
    };

    // Hue 120° (green) down to 0° (red).
    let hsl = Hsl::new(120.0 * (1.0 - t as f32), 0.7, 0.5);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_map_to_distinct_colors() {
        let ok = status_color(StatusTier::Ok);
        let warn = status_color(StatusTier::Warning);
        let crit = status_color(StatusTier::Critical);
        assert_ne!(ok, warn);
        assert_ne!(warn, crit);
    }

    #[test]
    fn gradient_endpoints_are_green_and_red() {
        let low = value_color(0.0, 100.0, 200.0);
        let high = value_color(300.0, 100.0, 200.0);
        assert!(low.g() > low.r());
        assert!(high.r() > high.g());
    }

    #[test]
    fn inverted_thresholds_fall_back_to_a_step() {
        assert_eq!(
            value_color(50.0, 200.0, 100.0),
            value_color(0.0, 100.0, 200.0)
        );
        assert_eq!(
            value_color(150.0, 200.0, 100.0),
            value_color(999.0, 100.0, 200.0)
        );
    }
}
