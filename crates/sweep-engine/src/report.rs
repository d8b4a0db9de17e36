//! Chart preparation for aggregated sweep results.
//!
//! Rendering is left to whatever plotting frontend consumes [`Chart`]; this
//! module only shapes the series and picks a line style per method.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use sweep_types::{ReportError, SweepResult, SweepValue, ValueSeries};

use crate::experiment_set::ExperimentSet;

pub const RUNTIME_CHART_TITLE: &str = "Runtimes for transitive trust models";
pub const RUNTIME_CHART_YLABEL: &str = "Average Runtime (sec)";

/// Color, dash pattern and marker of one plotted line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineStyle {
    pub color: char,
    pub dash: &'static str,
    pub marker: char,
}

impl LineStyle {
    const fn dashed(color: char, marker: char) -> Self {
        Self {
            color,
            dash: "--",
            marker,
        }
    }
}

impl fmt::Display for LineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.color, self.dash, self.marker)
    }
}

// Weighted aliases are older method names kept so previously saved sweeps still chart.
const LINE_STYLES: &[(&str, LineStyle)] = &[
    ("pagerank", LineStyle::dashed('b', '^')),
    ("pagerank_weighted", LineStyle::dashed('b', '^')),
    ("hitting_pagerank_all", LineStyle::dashed('g', '*')),
    ("hitting_pagerank_top", LineStyle::dashed('g', '^')),
    ("hitting_time_all", LineStyle::dashed('m', '*')),
    ("hitting_time_weighted_all", LineStyle::dashed('m', '*')),
    ("hitting_time_top", LineStyle::dashed('m', '^')),
    ("hitting_time_weighted_top", LineStyle::dashed('m', '^')),
    ("max_flow", LineStyle::dashed('r', 's')),
    ("max_flow_weighted_means", LineStyle::dashed('r', '^')),
    ("shortest_path", LineStyle::dashed('c', 's')),
    ("shortest_path_weighted_means", LineStyle::dashed('c', '^')),
];

/// Line style registered for `method`.
pub fn line_style(method: &str) -> Result<LineStyle, ReportError> {
    LINE_STYLES
        .iter()
        .find(|(name, _)| *name == method)
        .map(|(_, style)| *style)
        .ok_or_else(|| ReportError::UnknownMethod {
            method: method.to_string(),
        })
}

/// One line on a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub style: LineStyle,
    /// Sorted by x.
    pub points: Vec<(SweepValue, f64)>,
}

impl Series {
    fn new(label: &str, values: &ValueSeries) -> Result<Self, ReportError> {
        Ok(Self {
            label: label.to_string(),
            style: line_style(label)?,
            points: values.iter().map(|(x, y)| (*x, *y)).collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub series: Vec<Series>,
}

/// One chart per correlation metric, one line per method.
pub fn score_charts(set: &ExperimentSet) -> SweepResult<Vec<Chart>> {
    let identity = &set.config().identity;
    let results = set.results().ok_or_else(|| ReportError::MissingResults {
        name: identity.name.clone(),
    })?;

    let mut charts = Vec::new();
    for metric in results.metrics() {
        let mut series = Vec::new();
        for (method, values) in results.metric(metric).into_iter().flatten() {
            series.push(Series::new(method, values)?);
        }
        charts.push(Chart {
            title: identity.plot_title.clone(),
            xlabel: identity.plot_xlabel.clone(),
            ylabel: format!("{metric} correlation"),
            series,
        });
    }
    Ok(charts)
}

/// Mean runtime of every method against the independent value.
pub fn runtime_chart(set: &ExperimentSet) -> SweepResult<Chart> {
    let identity = &set.config().identity;
    let runtimes = set.runtimes().ok_or_else(|| ReportError::MissingResults {
        name: identity.name.clone(),
    })?;

    let series = runtimes
        .methods()
        .map(|(method, values)| Series::new(method, values))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Chart {
        title: RUNTIME_CHART_TITLE.to_string(),
        xlabel: identity.plot_xlabel.clone(),
        ylabel: RUNTIME_CHART_YLABEL.to_string(),
        series,
    })
}

/// Plain-text table of a chart: one row per x value, one column per series.
pub fn render_table(chart: &Chart) -> String {
    let xs: BTreeSet<SweepValue> = chart
        .series
        .iter()
        .flat_map(|series| series.points.iter().map(|(x, _)| *x))
        .collect();
    let width = chart
        .series
        .iter()
        .map(|series| series.label.len())
        .max()
        .unwrap_or(0)
        .max(10);

    let mut out = format!("{}\n{} vs {}\n", chart.title, chart.ylabel, chart.xlabel);
    out.push_str(&format!("{:>8}", "x"));
    for series in &chart.series {
        out.push_str(&format!(" {:>width$}", series.label));
    }
    out.push('\n');
    for x in xs {
        out.push_str(&format!("{x:>8}"));
        for series in &chart.series {
            let cell = series
                .points
                .iter()
                .find(|(px, _)| *px == x)
                .map(|(_, y)| format!("{y:.4}"))
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(" {cell:>width$}"));
        }
        out.push('\n');
    }
    out
}
