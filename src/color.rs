use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use spotfit::data::model::Temperature;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// `n` colours running from blue (first) to red (last).
///
/// Temperatures are sorted ascending, so cooler spots get cooler hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    match n {
        0 => Vec::new(),
        1 => vec![hsl_to_color32(0.0)],
        _ => (0..n)
            .map(|i| hsl_to_color32(220.0 * (1.0 - i as f32 / (n - 1) as f32)))
            .collect(),
    }
}

fn hsl_to_color32(hue: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, 0.75, 0.5).into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Color mapping: spot temperature → Color32
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<Temperature, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new(temperatures: &BTreeSet<Temperature>) -> Self {
        let mapping = temperatures
            .iter()
            .copied()
            .zip(generate_palette(temperatures.len()))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, temperature: Temperature) -> Color32 {
        self.mapping
            .get(&temperature)
            .copied()
            .unwrap_or(self.default_color)
    }
}
