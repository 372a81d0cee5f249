// Chart-ready series handed to the rendering collaborator
use serde::Serialize;

use super::palette::Lookup;
use super::plot::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesKind {
    Line,
    BoxPlot,
    Scatter,
}

/// Five-number summary of one region; `None` when no model reported it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPoint {
    pub x: String,
    pub y: Option<[f64; 5]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeriesData {
    Points(Vec<Point>),
    Boxes(Vec<BoxPoint>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SeriesKind,
    pub data: SeriesData,
}

/// Series plus styling parallel to them, one slot per series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub series: Vec<ChartSeries>,
    pub colors: Vec<Lookup<String>>,
    #[serde(skip)]
    pub dashes: Vec<Lookup<u8>>,
    pub options: serde_json::Value,
}

impl ChartData {
    pub fn series_named(&self, name: &str) -> Option<&ChartSeries> {
        self.series.iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChartPayload {
    Chart(ChartData),
    Placeholder { message: String },
}
