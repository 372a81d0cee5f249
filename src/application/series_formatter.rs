// Series formatter - Raw model series to chart-ready series and options
use crate::domain::chart::{BoxPoint, ChartData, ChartPayload, ChartSeries, SeriesData, SeriesKind};
use crate::domain::error::StatisticsError;
use crate::domain::model_group::{GroupStoreState, ModelGroup, StatValue};
use crate::domain::palette::{colour_name_to_hex, line_style_to_dash, resolve_colour, Lookup};
use crate::domain::plot::{AxisValue, PlotType, Point, RawModelSeries};
use crate::domain::statistics;
use serde_json::{json, Value};

pub const ANTARCTIC: &str = "Antarctic(Oct)";
pub const SH_MID: &str = "SH mid-lat";
pub const NH_MID: &str = "NH mid-lat";
pub const TROPICS: &str = "Tropics";
pub const ARCTIC: &str = "Arctic(Mar)";
pub const NEAR_GLOBAL: &str = "Near global";
pub const GLOBAL: &str = "Global";
pub const USER_REGION: &str = "User region";

/// Regions of the return/recovery plot, in display order.
pub const REGIONS: [&str; 8] = [
    ANTARCTIC,
    SH_MID,
    NH_MID,
    TROPICS,
    ARCTIC,
    NEAR_GLOBAL,
    GLOBAL,
    USER_REGION,
];

const BOX_SERIES_NAME: &str = "box";
const BOX_COLOUR: &str = "#008FFB";
const LINE_WIDTH: u8 = 2;
const OVERLAY_DASH: u8 = 3;

/// Model kept for display together with the colour it is drawn in.
struct DisplayedModel<'a> {
    raw: &'a RawModelSeries,
    colour: Lookup<String>,
}

/// Formats the series of a plot given by its tag. Unknown tags give a
/// placeholder message instead of a chart.
pub fn format_for_tag(tag: &str, data: &[RawModelSeries], groups: &GroupStoreState) -> ChartPayload {
    match tag.parse::<PlotType>() {
        Ok(plot_type) => ChartPayload::Chart(format_chart(plot_type, data, groups)),
        Err(e) => {
            tracing::warn!("No chart formatting for plot type \"{}\"", e.tag);
            ChartPayload::Placeholder {
                message: format!("A plot for \"{}\" is currently not supported.", e.tag),
            }
        }
    }
}

pub fn format_chart(plot_type: PlotType, data: &[RawModelSeries], groups: &GroupStoreState) -> ChartData {
    let displayed: Vec<DisplayedModel> = data
        .iter()
        .filter_map(|raw| {
            displayed_colour(raw, groups).map(|colour| DisplayedModel { raw, colour })
        })
        .collect();

    let mut chart = match plot_type {
        PlotType::ZonalMean => zonal_mean_series(&displayed, data, groups),
        PlotType::ReturnRecovery => return_recovery_series(&displayed),
    };
    chart.options = chart_options(plot_type, &chart.colors, &chart.dashes);
    chart
}

/// Colour a model is drawn in, or `None` if the groups hide it.
///
/// A model listed by some group is shown only when a visible group lists it as
/// visible; that group's colour override wins over the service colour. Models
/// no group lists keep the service styling.
fn displayed_colour(raw: &RawModelSeries, groups: &GroupStoreState) -> Option<Lookup<String>> {
    let mut listed = false;
    for group in groups.iter() {
        let Some(settings) = group.models.get(&raw.model) else {
            continue;
        };
        listed = true;
        if group.is_visible && settings.is_visible {
            let colour = settings.color.as_deref().unwrap_or(raw.plotstyle.color.as_str());
            return Some(resolve_colour(colour));
        }
    }
    if listed {
        None
    } else {
        Some(resolve_colour(&raw.plotstyle.color))
    }
}

fn zonal_mean_series(
    displayed: &[DisplayedModel],
    data: &[RawModelSeries],
    groups: &GroupStoreState,
) -> ChartData {
    let mut chart = empty_chart();

    for model in displayed {
        chart.series.push(ChartSeries {
            name: model.raw.model.clone(),
            kind: SeriesKind::Line,
            data: SeriesData::Points(model.raw.points()),
        });
        chart.colors.push(model.colour.clone());
        chart.dashes.push(line_style_to_dash(&model.raw.plotstyle.linestyle));
    }

    for group in groups.iter().filter(|g| g.is_visible) {
        for stat in StatValue::ALL {
            if !group.shows_statistic(stat) {
                continue;
            }
            for (label, points) in statistic_overlay(group, stat, data) {
                chart.series.push(ChartSeries {
                    name: format!("{} ({})", group.name, label),
                    kind: SeriesKind::Line,
                    data: SeriesData::Points(points),
                });
                chart.colors.push(colour_name_to_hex(overlay_colour(stat)));
                chart.dashes.push(Lookup::Found(OVERLAY_DASH));
            }
        }
    }

    chart
}

fn overlay_colour(stat: StatValue) -> &'static str {
    match stat {
        StatValue::Mean => "black",
        StatValue::Median => "dimgray",
        StatValue::Derivative => "darkred",
        StatValue::Percentile => "gray",
    }
}

/// Per-year aggregate lines of `stat` over the group's models that include it.
fn statistic_overlay(
    group: &ModelGroup,
    stat: StatValue,
    data: &[RawModelSeries],
) -> Vec<(&'static str, Vec<Point>)> {
    let members: Vec<&RawModelSeries> = data
        .iter()
        .filter(|raw| group.models.get(&raw.model).is_some_and(|m| m.includes(stat)))
        .collect();
    let buckets = bucket_by_year(&members);
    if buckets.is_empty() {
        return Vec::new();
    }

    match stat {
        StatValue::Mean => vec![("mean", aggregate(&buckets, statistics::mean))],
        StatValue::Median => vec![("median", aggregate(&buckets, statistics::median))],
        StatValue::Percentile => vec![
            ("25th percentile", aggregate(&buckets, statistics::q25)),
            ("75th percentile", aggregate(&buckets, statistics::q75)),
        ],
        StatValue::Derivative => {
            vec![("derivative", derivative(&aggregate(&buckets, statistics::mean)))]
        }
    }
}

/// Collects y-values by numeric x, ascending in x.
fn bucket_by_year(members: &[&RawModelSeries]) -> Vec<(f64, Vec<f64>)> {
    let mut buckets: Vec<(f64, Vec<f64>)> = Vec::new();
    for raw in members {
        for (x, y) in raw.x.iter().zip(&raw.y) {
            let AxisValue::Number(x) = x else {
                continue;
            };
            match buckets.iter_mut().find(|(bx, _)| *bx == *x) {
                Some((_, ys)) => ys.push(*y),
                None => buckets.push((*x, vec![*y])),
            }
        }
    }
    buckets.sort_by(|a, b| a.0.total_cmp(&b.0));
    buckets
}

fn aggregate(
    buckets: &[(f64, Vec<f64>)],
    f: fn(&[f64]) -> Result<f64, StatisticsError>,
) -> Vec<Point> {
    buckets
        .iter()
        .filter_map(|(x, ys)| {
            f(ys).ok().map(|y| Point {
                x: AxisValue::Number(*x),
                y,
            })
        })
        .collect()
}

/// Backward difference quotient, placed at the later of each pair of samples.
fn derivative(line: &[Point]) -> Vec<Point> {
    line.windows(2)
        .filter_map(|pair| match (&pair[0].x, &pair[1].x) {
            (AxisValue::Number(x0), AxisValue::Number(x1)) if x1 != x0 => Some(Point {
                x: AxisValue::Number(*x1),
                y: (pair[1].y - pair[0].y) / (x1 - x0),
            }),
            _ => None,
        })
        .collect()
}

fn return_recovery_series(displayed: &[DisplayedModel]) -> ChartData {
    let mut chart = empty_chart();

    let mut by_region: Vec<Vec<f64>> = vec![Vec::new(); REGIONS.len()];
    for model in displayed {
        for point in model.raw.points() {
            let region = match &point.x {
                AxisValue::Label(label) => REGIONS.iter().position(|r| *r == label.as_str()),
                AxisValue::Number(_) => None,
            };
            match region {
                Some(idx) => by_region[idx].push(point.y),
                None => tracing::warn!(
                    "Skipping point {:?} of model {}: not a known region",
                    point.x,
                    model.raw.model
                ),
            }
        }
    }

    let boxes = REGIONS
        .iter()
        .zip(&by_region)
        .map(|(region, values)| BoxPoint {
            x: region.to_string(),
            y: statistics::five_number_summary(values).ok(),
        })
        .collect();

    chart.series.push(ChartSeries {
        name: BOX_SERIES_NAME.to_string(),
        kind: SeriesKind::BoxPlot,
        data: SeriesData::Boxes(boxes),
    });
    chart.colors.push(Lookup::Found(BOX_COLOUR.to_string()));
    chart.dashes.push(Lookup::Found(0));

    for model in displayed {
        chart.series.push(ChartSeries {
            name: model.raw.model.clone(),
            kind: SeriesKind::Scatter,
            data: SeriesData::Points(model.raw.points()),
        });
        chart.colors.push(model.colour.clone());
        chart.dashes.push(Lookup::Found(0));
    }

    chart
}

fn empty_chart() -> ChartData {
    ChartData {
        series: Vec::new(),
        colors: Vec::new(),
        dashes: Vec::new(),
        options: Value::Null,
    }
}

/// Rendering options for the chart collaborator.
pub fn chart_options(plot_type: PlotType, colors: &[Lookup<String>], dashes: &[Lookup<u8>]) -> Value {
    match plot_type {
        PlotType::ZonalMean => {
            let widths = vec![LINE_WIDTH; dashes.len()];
            json!({
                "chart": {
                    "id": plot_type.tag(),
                    "animations": { "enabled": false, "easing": "linear" },
                    "toolbar": { "show": true, "tools": { "download": true } },
                    "zoom": { "enabled": true, "type": "xy" }
                },
                "legend": { "show": true },
                "dataLabels": { "enabled": false },
                "tooltip": { "enabled": true, "shared": false },
                "colors": colors,
                "stroke": {
                    "curve": "smooth",
                    "width": widths,
                    "dashArray": dashes
                },
                "title": {
                    "text": "OCTS Plot",
                    "align": "center",
                    "floating": false,
                    "style": { "fontSize": "30px", "fontWeight": "bold", "color": "#263238" }
                }
            })
        }
        PlotType::ReturnRecovery => {
            // The box series carries no marker of its own.
            let marker_colors: Vec<Value> = std::iter::once(Value::Null)
                .chain(colors.iter().skip(1).map(|c| json!(c)))
                .collect();
            json!({
                "chart": {
                    "id": plot_type.tag(),
                    "type": "boxPlot",
                    "height": 350,
                    "animations": { "enabled": false },
                    "zoom": { "enabled": true, "type": "xy" }
                },
                "colors": colors,
                "title": { "text": "TCO RETURN", "align": "center" },
                "tooltip": { "shared": false, "intersect": true },
                "plotOptions": {
                    "boxPlot": { "colors": { "upper": "#5C4742", "lower": "#A5978B" } }
                },
                "legend": { "show": true },
                "markers": {
                    "size": 5,
                    "colors": marker_colors,
                    "strokeColors": "#fff",
                    "strokeWidth": 0,
                    "fillOpacity": 0.7,
                    "hover": { "size": 10, "sizeOffset": 10 }
                }
            })
        }
    }
}
