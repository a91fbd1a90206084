//! Pie-segment encoding of node health.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Node;

/// An opaque sRGB color, written as `#RRGGBB` in config files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn parse_hex(text: &str) -> Result<Self, String> {
        let digits = text.strip_prefix('#').unwrap_or(text);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("expected #RRGGBB color, got {text:?}"));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|error| error.to_string())
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryColor {
    pub name: String,
    pub color: Rgb,
}

impl CategoryColor {
    pub fn new(name: impl Into<String>, color: Rgb) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// Fixed category-to-color table. Category order is the pie stacking order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthPalette {
    /// Value that fills a whole pie. The default of 10 suits hand-written
    /// inputs; element sets exported by the health agent score on 0 to 100
    /// and need `max_scale: 100`.
    pub max_scale: f64,
    pub categories: Vec<CategoryColor>,
}

impl Default for HealthPalette {
    fn default() -> Self {
        Self {
            max_scale: 10.0,
            categories: vec![
                CategoryColor::new("red", Rgb::new(0xE8, 0x74, 0x7C)),
                CategoryColor::new("green", Rgb::new(0x74, 0xE8, 0x83)),
                CategoryColor::new("grey", Rgb::new(0xB4, 0xB4, 0xB4)),
            ],
        }
    }
}

impl HealthPalette {
    pub fn color_of(&self, category: &str) -> Option<Rgb> {
        self.categories
            .iter()
            .find(|entry| entry.name == category)
            .map(|entry| entry.color)
    }

    fn proportion(&self, value: f64) -> f64 {
        if self.max_scale.is_nan() || self.max_scale <= 0.0 || value.is_nan() {
            return 0.0;
        }
        (value / self.max_scale).clamp(0.0, 1.0)
    }
}

/// One pie wedge.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub category: String,
    pub color: Rgb,
    /// Share of the full circle, in `[0, 1]`.
    pub proportion: f64,
}

/// Derives the pie wedges for `node`.
///
/// Wedges follow palette order. Categories the node carries no value for are
/// skipped; categories the palette does not know are ignored.
pub fn compute_segments(node: &Node, palette: &HealthPalette) -> Vec<Segment> {
    palette
        .categories
        .iter()
        .filter_map(|entry| {
            node.health_value(&entry.name).map(|value| Segment {
                category: entry.name.clone(),
                color: entry.color,
                proportion: palette.proportion(value),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(segments: &[Segment]) -> Vec<(&str, f64)> {
        segments
            .iter()
            .map(|segment| (segment.category.as_str(), segment.proportion))
            .collect()
    }

    #[test]
    fn follows_palette_order_not_alphabetical() {
        let node = Node::new("n")
            .with_health("green", 7.0)
            .with_health("grey", 1.0)
            .with_health("red", 3.0);
        let segments = compute_segments(&node, &HealthPalette::default());
        assert_eq!(
            pairs(&segments),
            vec![("red", 0.3), ("green", 0.7), ("grey", 0.1)]
        );
        assert_eq!(segments[0].color, Rgb::new(0xE8, 0x74, 0x7C));
    }

    #[test]
    fn clamps_out_of_range_values() {
        let node = Node::new("n")
            .with_health("red", -4.0)
            .with_health("green", 25.0)
            .with_health("grey", f64::NAN);
        let segments = compute_segments(&node, &HealthPalette::default());
        assert_eq!(
            pairs(&segments),
            vec![("red", 0.0), ("green", 1.0), ("grey", 0.0)]
        );
    }

    #[test]
    fn skips_unknown_and_missing_categories() {
        let node = Node::new("n").with_health("blue", 5.0).with_health("green", 5.0);
        let segments = compute_segments(&node, &HealthPalette::default());
        assert_eq!(pairs(&segments), vec![("green", 0.5)]);
    }

    #[test]
    fn custom_scale_and_palette() {
        let palette = HealthPalette {
            max_scale: 100.0,
            categories: vec![CategoryColor::new("ok", Rgb::new(0, 255, 0))],
        };
        let node = Node::new("n").with_health("ok", 42.0);
        assert_eq!(pairs(&compute_segments(&node, &palette)), vec![("ok", 0.42)]);
    }

    #[test]
    fn agent_percentages_need_a_percent_scale() {
        let node = Node::new("vm")
            .with_health("red", 30.0)
            .with_health("green", 70.0)
            .with_health("grey", 100.0);
        assert_eq!(
            pairs(&compute_segments(&node, &HealthPalette::default())),
            vec![("red", 1.0), ("green", 1.0), ("grey", 1.0)]
        );

        let percent: HealthPalette = serde_json::from_str(r#"{"max_scale": 100}"#).unwrap();
        assert_eq!(percent.categories, HealthPalette::default().categories);
        assert_eq!(
            pairs(&compute_segments(&node, &percent)),
            vec![("red", 0.3), ("green", 0.7), ("grey", 1.0)]
        );
    }

    #[test]
    fn rgb_hex_round_trip_through_serde() {
        let color: Rgb = serde_json::from_str("\"#e8747c\"").unwrap();
        assert_eq!(color, Rgb::new(0xE8, 0x74, 0x7C));
        assert_eq!(serde_json::to_string(&color).unwrap(), "\"#E8747C\"");
        assert!(serde_json::from_str::<Rgb>("\"#12345\"").is_err());
        assert!(Rgb::parse_hex("zzzzzz").is_err());
    }
}
