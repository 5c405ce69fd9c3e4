//! Chart-ready figure descriptions
//!
//! A [`Figure`] is a plain data description of a chart: series, reference
//! lines and shaded bands. Display layers render it; here it only needs to
//! serialize to JSON.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Named colors used by the indicator figures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    Blue,
    Red,
    Green,
    Purple,
    Gray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Line,
    Bar,
}

/// Horizontal position of a point
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum XValue {
    Time(DateTime<Utc>),
    Category(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub x: XValue,
    pub y: f64,
}

impl Point {
    pub fn at(timestamp: DateTime<Utc>, y: f64) -> Self {
        Self {
            x: XValue::Time(timestamp),
            y,
        }
    }

    pub fn category(name: impl Into<String>, y: f64) -> Self {
        Self {
            x: XValue::Category(name.into()),
            y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub kind: SeriesKind,
    pub color: Color,
    pub alpha: f32,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub color: Color,
    pub style: LineStyle,
    pub width: f32,
}

/// Shaded region between two curves sharing x positions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Band {
    pub upper: Vec<Point>,
    pub lower: Vec<Point>,
    pub color: Color,
    pub alpha: f32,
}

/// A complete chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Width and height in inches
    pub size: (f32, f32),
    pub series: Vec<Series>,
    pub reference_lines: Vec<ReferenceLine>,
    pub bands: Vec<Band>,
    pub grid_alpha: f32,
    /// Rotation of x tick labels in degrees
    pub x_tick_rotation: f32,
}

impl Figure {
    /// Empty 10×5 figure with a light grid
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            size: (10.0, 5.0),
            series: Vec::new(),
            reference_lines: Vec::new(),
            bands: Vec::new(),
            grid_alpha: 0.3,
            x_tick_rotation: 0.0,
        }
    }

    pub fn labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn rotate_x_ticks(mut self, degrees: f32) -> Self {
        self.x_tick_rotation = degrees;
        self
    }

    pub fn line(self, label: impl Into<String>, color: Color, points: Vec<Point>) -> Self {
        self.add_series(label, SeriesKind::Line, color, 1.0, points)
    }

    pub fn bars(
        self,
        label: impl Into<String>,
        color: Color,
        alpha: f32,
        points: Vec<Point>,
    ) -> Self {
        self.add_series(label, SeriesKind::Bar, color, alpha, points)
    }

    /// Horizontal line at `y`; a labelled line appears in the legend
    pub fn hline(
        mut self,
        y: f64,
        label: Option<&str>,
        color: Color,
        style: LineStyle,
        width: f32,
    ) -> Self {
        self.reference_lines.push(ReferenceLine {
            y,
            label: label.map(str::to_string),
            color,
            style,
            width,
        });
        self
    }

    pub fn fill_between(mut self, upper: Vec<Point>, lower: Vec<Point>, color: Color, alpha: f32) -> Self {
        self.bands.push(Band {
            upper,
            lower,
            color,
            alpha,
        });
        self
    }

    /// Series by legend label
    pub fn series_named(&self, label: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.label == label)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    fn add_series(
        mut self,
        label: impl Into<String>,
        kind: SeriesKind,
        color: Color,
        alpha: f32,
        points: Vec<Point>,
    ) -> Self {
        self.series.push(Series {
            label: label.into(),
            kind,
            color,
            alpha,
            points,
        });
        self
    }
}
