//! Colormaps and color normalization
//!
//! Sequential maps (viridis, plasma, inferno, magma, gray), the diverging
//! coolwarm map and the classic rainbow `jet` used for matrix heat maps.
//! Any name may carry an `_r` suffix to select the reversed map.

use plotters::style::{RGBAColor, RGBColor};
use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};

/// Colormap used by matrix plots when none is given
pub const DEFAULT_MATRIX_CMAP: &str = "jet";

/// RGBA color with channels in `[0, 1]`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse `#RRGGBB` or `RRGGBB`
    pub fn parse_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#').unwrap_or(text);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .ok()
                .map(|v| f32::from(v) / 255.0)
        };
        Some(Self::opaque(channel(0)?, channel(2)?, channel(4)?))
    }

    /// `#RRGGBB`, alpha dropped
    pub fn hex(&self) -> String {
        let [r, g, b] = self.bytes();
        format!("#{r:02X}{g:02X}{b:02X}")
    }

    /// Blend towards `other`; `t` is clamped to `[0, 1]`
    pub fn mix(&self, other: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let blend = |from: f32, to: f32| from + (to - from) * t;
        Color {
            r: blend(self.r, other.r),
            g: blend(self.g, other.g),
            b: blend(self.b, other.b),
            a: blend(self.a, other.a),
        }
    }

    /// Same color with a new alpha
    pub fn with_alpha(self, a: f32) -> Color {
        Color { a, ..self }
    }

    fn bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    pub fn to_rgb(&self) -> RGBColor {
        let [r, g, b] = self.bytes();
        RGBColor(r, g, b)
    }

    pub fn to_rgba(&self) -> RGBAColor {
        let [r, g, b] = self.bytes();
        RGBAColor(r, g, b, f64::from(self.a.clamp(0.0, 1.0)))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::opaque(0.5, 0.5, 0.5)
    }
}

/// Default line color cycle (tab10)
pub const LINE_CYCLE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Color of the `index`-th line in the default cycle
pub fn cycle_color(index: usize) -> Color {
    Color::parse_hex(LINE_CYCLE[index % LINE_CYCLE.len()]).unwrap_or_default()
}

/// Built-in maps as evenly spaced hex stops
const BUILTIN: [(&str, &[&str]); 6] = [
    (
        "viridis",
        &[
            "#440154", "#482475", "#414487", "#355f8d", "#2a788e", "#21918c", "#22a884",
            "#44bf70", "#7ad151", "#bddf26", "#fde725",
        ],
    ),
    (
        "plasma",
        &[
            "#0d0887", "#4c02a1", "#7e03a8", "#a92395", "#cc4778", "#e56b5d", "#f89441",
            "#fdc328", "#f0f921",
        ],
    ),
    (
        "inferno",
        &[
            "#000004", "#1f0c48", "#550f6d", "#88226a", "#ba3655", "#e35933", "#f98e09",
            "#f9cb35", "#fcffa4",
        ],
    ),
    (
        "magma",
        &[
            "#000004", "#1d1147", "#51127c", "#822681", "#b73779", "#e75263", "#fc8961",
            "#fec287", "#fcfdbf",
        ],
    ),
    (
        "coolwarm",
        &["#3b4cc0", "#8db0fe", "#dddddd", "#f49a7b", "#b40426"],
    ),
    ("gray", &["#000000", "#ffffff"]),
];

/// Jet is not evenly spaced
const JET: [(f32, Color); 6] = [
    (0.0, Color::opaque(0.0, 0.0, 0.5)),
    (0.125, Color::opaque(0.0, 0.0, 1.0)),
    (0.375, Color::opaque(0.0, 1.0, 1.0)),
    (0.625, Color::opaque(1.0, 1.0, 0.0)),
    (0.875, Color::opaque(1.0, 0.0, 0.0)),
    (1.0, Color::opaque(0.5, 0.0, 0.0)),
];

/// Piecewise linear map from `[0, 1]` to colors
#[derive(Clone, Debug)]
pub struct Colormap {
    pub name: String,
    stops: Vec<(f32, Color)>,
}

impl Colormap {
    /// Colors spread evenly over `[0, 1]`
    pub fn evenly_spaced(name: impl Into<String>, colors: &[Color]) -> Self {
        let last = colors.len().saturating_sub(1).max(1) as f32;
        let stops = colors
            .iter()
            .enumerate()
            .map(|(i, &c)| (i as f32 / last, c))
            .collect();
        Self {
            name: name.into(),
            stops,
        }
    }

    /// Colors at explicit, increasing positions
    pub fn with_stops(name: impl Into<String>, stops: Vec<(f32, Color)>) -> Self {
        Self {
            name: name.into(),
            stops,
        }
    }

    /// Look up a built-in map, honouring an `_r` suffix
    pub fn by_name(name: &str) -> PlotResult<Colormap> {
        let requested = name.trim().to_lowercase();
        let (base, flip) = match requested.strip_suffix("_r") {
            Some(base) => (base, true),
            None => (requested.as_str(), false),
        };
        let base = if base == "grey" { "gray" } else { base };

        let stops = if base == "jet" {
            JET.to_vec()
        } else {
            let (_, hexes) = BUILTIN
                .iter()
                .find(|(builtin, _)| *builtin == base)
                .ok_or_else(|| PlotError::UnknownColormap(name.to_string()))?;
            let colors: Vec<Color> = hexes.iter().filter_map(|h| Color::parse_hex(h)).collect();
            Colormap::evenly_spaced(base, &colors).stops
        };
        let cmap = Colormap::with_stops(requested, stops);
        Ok(if flip { cmap.reversed() } else { cmap })
    }

    /// Same colors in the opposite direction
    pub fn reversed(mut self) -> Self {
        self.stops = self
            .stops
            .iter()
            .rev()
            .map(|&(t, c)| (1.0 - t, c))
            .collect();
        self
    }

    /// Color at `t`, clamped to `[0, 1]`
    pub fn sample(&self, t: f32) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let Some(&(first_t, first)) = self.stops.first() else {
            return Color::default();
        };
        if t <= first_t {
            return first;
        }
        let upper = self.stops.partition_point(|(stop, _)| *stop < t);
        match (self.stops.get(upper.wrapping_sub(1)), self.stops.get(upper)) {
            (Some(&(t0, c0)), Some(&(t1, c1))) if t1 > t0 => c0.mix(&c1, (t - t0) / (t1 - t0)),
            (_, Some(&(_, c))) => c,
            _ => self.stops.last().map(|&(_, c)| c).unwrap_or_default(),
        }
    }

    /// `size` evenly spaced samples
    pub fn lut(&self, size: usize) -> Vec<Color> {
        let last = size.saturating_sub(1).max(1) as f32;
        (0..size).map(|i| self.sample(i as f32 / last)).collect()
    }
}

/// Names accepted by [`Colormap::by_name`], without the `_r` variants
pub fn colormap_names() -> Vec<&'static str> {
    let mut names: Vec<&str> = BUILTIN.iter().map(|(name, _)| *name).collect();
    names.push("jet");
    names
}

/// Linear mapping of data values onto `[0, 1]`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorNorm {
    pub vmin: f64,
    pub vmax: f64,
}

impl ColorNorm {
    pub fn new(vmin: f64, vmax: f64) -> Self {
        Self { vmin, vmax }
    }

    /// Range of the finite values, None when there are none
    pub fn from_data<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<Self> {
        values
            .into_iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some(Self::new(v, v)),
                Some(norm) => Some(Self::new(norm.vmin.min(v), norm.vmax.max(v))),
            })
    }

    /// Position of `value`, clipped to `[0, 1]`; a flat range maps to the middle
    pub fn normalize(&self, value: f64) -> f32 {
        if self.vmax > self.vmin {
            (((value - self.vmin) / (self.vmax - self.vmin)) as f32).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        let orange = Color::parse_hex("#FF8000").unwrap();
        assert_eq!(orange.r, 1.0);
        assert!((orange.g - 0.502).abs() < 0.001);
        assert_eq!(orange.hex(), "#FF8000");
        assert_eq!(Color::parse_hex("ff8000"), Some(orange));
        assert_eq!(Color::parse_hex("#FF80"), None);
        assert_eq!(Color::parse_hex("#GG8000"), None);
    }

    #[test]
    fn test_jet_stops() {
        let jet = Colormap::by_name("jet").unwrap();
        assert_eq!(jet.sample(0.0), Color::opaque(0.0, 0.0, 0.5));
        assert_eq!(jet.sample(0.5), Color::opaque(0.5, 1.0, 0.5));
        assert_eq!(jet.sample(1.0), Color::opaque(0.5, 0.0, 0.0));
        assert_eq!(jet.sample(2.0), jet.sample(1.0));
    }

    #[test]
    fn test_names_and_reversal() {
        let gray_r = Colormap::by_name("Gray_r").unwrap();
        assert_eq!(gray_r.name, "gray_r");
        assert_eq!(gray_r.sample(0.0), Color::opaque(1.0, 1.0, 1.0));
        assert_eq!(gray_r.sample(0.25), Colormap::by_name("grey").unwrap().sample(0.75));
        for name in colormap_names() {
            assert!(Colormap::by_name(name).is_ok(), "{name}");
        }
        assert_eq!(
            Colormap::by_name("rainbow").unwrap_err(),
            PlotError::UnknownColormap("rainbow".to_string())
        );
    }

    #[test]
    fn test_lut_spans_map() {
        let viridis = Colormap::by_name("viridis").unwrap();
        let lut = viridis.lut(64);
        assert_eq!(lut.len(), 64);
        assert_eq!(lut[0].hex(), "#440154");
        assert_eq!(lut[63].hex(), "#FDE725");
    }

    #[test]
    fn test_norm() {
        let norm = ColorNorm::from_data(&[3.0, f64::NAN, -1.0, 1.0]).unwrap();
        assert_eq!(norm, ColorNorm::new(-1.0, 3.0));
        assert_eq!(norm.normalize(1.0), 0.5);
        assert_eq!(norm.normalize(10.0), 1.0);
        assert_eq!(ColorNorm::new(2.0, 2.0).normalize(2.0), 0.5);
        assert_eq!(ColorNorm::from_data(&[f64::NAN]), None);
    }

    #[test]
    fn test_cycle_wraps() {
        assert_eq!(cycle_color(0), cycle_color(10));
        assert_eq!(cycle_color(1).hex(), "#FF7F0E");
    }
}
