// Plot request and raw series domain models
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::UnsupportedPlotType;

/// Plot types the charting pipeline knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlotType {
    #[serde(rename = "tco3_zm")]
    ZonalMean,
    #[serde(rename = "tco3_return")]
    ReturnRecovery,
}

impl PlotType {
    pub const ALL: [PlotType; 2] = [PlotType::ZonalMean, PlotType::ReturnRecovery];

    pub fn tag(self) -> &'static str {
        match self {
            PlotType::ZonalMean => "tco3_zm",
            PlotType::ReturnRecovery => "tco3_return",
        }
    }
}

impl fmt::Display for PlotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for PlotType {
    type Err = UnsupportedPlotType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlotType::ALL
            .into_iter()
            .find(|pt| pt.tag() == s)
            .ok_or_else(|| UnsupportedPlotType { tag: s.to_string() })
    }
}

/// Which request fields take part in the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyScope {
    /// Latitude band, months, reference model and year plus year range and model list.
    #[default]
    Full,
    /// Latitude band, months, reference model and year only. Requests that differ
    /// only in year range or model list share an entry.
    Reference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotRequest {
    pub plot_type: PlotType,
    pub lat_min: f64,
    pub lat_max: f64,
    pub months: Vec<u8>,
    pub start_year: i32,
    pub end_year: i32,
    pub model_list: Vec<String>,
    pub ref_model: String,
    pub ref_year: i32,
}

impl PlotRequest {
    pub fn months_joined(&self) -> String {
        self.months
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Deterministic memoization key; equal fields always give an equal key.
    pub fn cache_key(&self, scope: KeyScope) -> String {
        // `+ 0.0` folds -0.0 into 0.0
        let mut key = format!(
            "lat_min={}&lat_max={}&months={}&ref_meas={}&ref_year={}",
            self.lat_min + 0.0,
            self.lat_max + 0.0,
            self.months_joined(),
            self.ref_model,
            self.ref_year
        );
        if scope == KeyScope::Full {
            key.push_str(&format!(
                "&begin={}&end={}&models={}",
                self.start_year,
                self.end_year,
                self.model_list
                    .iter()
                    .map(|model| urlencoding::encode(model))
                    .collect::<Vec<_>>()
                    .join(",")
            ));
        }
        key
    }
}

/// Abscissa of a raw sample: a year for time series, a region label for
/// return/recovery estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisValue {
    Number(f64),
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotStyle {
    pub color: String,
    pub linestyle: String,
}

/// One model's series as delivered by the data service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawModelSeries {
    pub model: String,
    pub x: Vec<AxisValue>,
    pub y: Vec<f64>,
    pub plotstyle: PlotStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub x: AxisValue,
    pub y: f64,
}

impl RawModelSeries {
    /// Pairs x and y positionally; surplus values on the longer side are dropped.
    pub fn points(&self) -> Vec<Point> {
        self.x
            .iter()
            .zip(&self.y)
            .map(|(x, y)| Point { x: x.clone(), y: *y })
            .collect()
    }
}
