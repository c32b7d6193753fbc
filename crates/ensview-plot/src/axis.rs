//! Tick placement and tick label formatting

use serde::{Deserialize, Serialize};

/// A tick mark on an axis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TickMark {
    /// Position in data coordinates
    pub value: f64,
    /// Position in normalized coordinates (0.0 to 1.0)
    pub normalized: f64,
    pub is_major: bool,
}

/// "Nice" step for covering `range` with about five intervals
pub fn nice_step(range: f64) -> f64 {
    let rough_step = range / 5.0;
    let magnitude = 10.0_f64.powf(rough_step.abs().log10().floor());
    let residual = rough_step / magnitude;

    if residual <= 1.5 {
        magnitude
    } else if residual <= 3.0 {
        2.0 * magnitude
    } else if residual <= 7.0 {
        5.0 * magnitude
    } else {
        10.0 * magnitude
    }
}

/// Major and minor ticks for a linear axis spanning `min..=max`
pub fn calculate_ticks(min: f64, max: f64, minor_ticks: usize) -> Vec<TickMark> {
    let range = max - min;
    if !(range > 0.0) || !range.is_finite() {
        return vec![];
    }

    let step = nice_step(range);
    let first = (min / step).ceil() as i64;
    let last = (max / step + 0.001).floor() as i64;

    let mut ticks = Vec::new();
    for k in first..=last {
        let value = k as f64 * step;
        ticks.push(TickMark {
            value,
            normalized: ((value - min) / range).clamp(0.0, 1.0),
            is_major: true,
        });
        for i in 1..=minor_ticks {
            let minor = value + step * i as f64 / (minor_ticks + 1) as f64;
            if minor < max {
                ticks.push(TickMark {
                    value: minor,
                    normalized: (minor - min) / range,
                    is_major: false,
                });
            }
        }
    }
    ticks
}

/// Values of the major ticks only
pub fn major_ticks(min: f64, max: f64) -> Vec<f64> {
    calculate_ticks(min, max, 0)
        .into_iter()
        .map(|tick| tick.value)
        .collect()
}

/// One tick at every integer index `0..count`
pub fn index_ticks(count: usize) -> Vec<f64> {
    (0..count).map(|i| i as f64).collect()
}

/// Format a number for a tick label
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value.abs() >= 10000.0 || value.abs() < 0.01 {
        format!("{:.2e}", value)
    } else if value.fract().abs() < 1e-10 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Labels ticks with the entry at the nearest integer position
///
/// Positions that round outside the label list get an empty label.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexFormatter {
    pub labels: Vec<String>,
}

impl IndexFormatter {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    pub fn format(&self, position: f64) -> String {
        let index = (position + 0.5).floor();
        if index < 0.0 || index >= self.labels.len() as f64 {
            return String::new();
        }
        self.labels[index as usize].clone()
    }
}

/// How tick values along one axis become text
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TickLabels {
    /// Numeric labels
    #[default]
    Numeric,
    /// Numeric labels of the absolute value, for axes drawn mirrored
    Magnitude,
    /// Numeric labels counted down from a pivot, for axes drawn upside down
    Mirrored(f64),
    /// Labels looked up by index
    Index(IndexFormatter),
    /// No labels
    Hidden,
}

impl TickLabels {
    pub fn from_labels(labels: Option<&[String]>) -> Self {
        match labels {
            Some(labels) => TickLabels::Index(IndexFormatter::new(labels.to_vec())),
            None => TickLabels::Numeric,
        }
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, TickLabels::Hidden)
    }

    pub fn format(&self, value: f64) -> String {
        match self {
            TickLabels::Numeric => format_number(value),
            TickLabels::Magnitude => format_number(value.abs()),
            TickLabels::Mirrored(pivot) => format_number(pivot - value),
            TickLabels::Index(formatter) => formatter.format(value),
            TickLabels::Hidden => String::new(),
        }
    }
}
