use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Segment colours
// ---------------------------------------------------------------------------

/// Convert an HSL pick to an egui colour.
fn hsl_color(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Colours for the two fixed feature segments and the position gauge.
///
/// The two series hues sit opposite each other on the wheel so the bone
/// and air bars stay distinguishable where the chart regions meet.
#[derive(Debug, Clone, Copy)]
pub struct SegmentPalette {
    pub bone: Color32,
    pub air: Color32,
    pub gauge: Color32,
}

impl Default for SegmentPalette {
    fn default() -> Self {
        SegmentPalette {
            bone: hsl_color(28.0, 0.75, 0.55),
            air: hsl_color(208.0, 0.75, 0.55),
            gauge: hsl_color(145.0, 0.60, 0.45),
        }
    }
}
