// NETMETRICS: Aggregate Network-Performance Metrics from Discrete-Event Simulation Traces
// Copyright (C) 2024-2025 Roland Schmid <roschmi@ethz.ch> and Tibor Schneider <sctibor@ethz.ch>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//! Line charts of the aggregated metrics over the swept parameter.
//!
//! Every metric gets its own chart, written as `{metric}_vs_{variant}.png`. Optionally, an
//! interactive version of each chart is written next to it as `.html`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use itertools::{Itertools, MinMaxResult};
use plotly::{
    common::{Marker, MarkerSymbol, Mode, Title},
    layout::Axis,
    Layout, Scatter,
};
use plotters::prelude::*;
use strum::IntoEnumIterator;

use crate::{
    config::Variant,
    table::{ResultTable, Row},
    util::PathBufExt,
};

/// Size of the PNG images, in pixels.
pub const PNG_SIZE: (u32, u32) = (1000, 500);

#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Drawing Error: {0}")]
    Drawing(String),
}

fn drawing_error(e: impl std::fmt::Display) -> PlotError {
    PlotError::Drawing(e.to_string())
}

/// Metric shown on the Y axis of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
pub enum Metric {
    #[strum(serialize = "pdr")]
    Pdr,
    #[strum(serialize = "e2e_delay")]
    E2eDelay,
    #[strum(serialize = "throughput")]
    Throughput,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pdr => "PDR",
            Self::E2eDelay => "End-to-End Delay",
            Self::Throughput => "Throughput",
        }
    }

    pub fn legend(&self) -> &'static str {
        match self {
            Self::Pdr => "PDR",
            Self::E2eDelay => "E2E Delay",
            Self::Throughput => "Throughput",
        }
    }

    pub fn axis_label(&self, variant: Variant) -> String {
        match self {
            Self::Pdr => "PDR".to_string(),
            Self::E2eDelay => "End-to-End Delay (s)".to_string(),
            Self::Throughput => format!("Throughput ({})", variant.throughput_unit()),
        }
    }

    pub fn value(&self, row: &Row) -> f64 {
        match self {
            Self::Pdr => row.pdr,
            Self::E2eDelay => row.e2e_delay,
            Self::Throughput => row.throughput,
        }
    }
}

/// Everything needed to draw one chart, independent of the output format.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub metric: Metric,
    pub variant: Variant,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<(f64, f64)>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl Chart {
    pub fn new(table: &ResultTable, metric: Metric) -> Self {
        let variant = table.variant;
        let points = table
            .rows()
            .iter()
            .map(|row| (row.value as f64, metric.value(row)))
            .collect_vec();
        let x_range = x_range(variant, points.iter().map(|p| p.0));
        let y_range = y_range(variant, metric, points.iter().map(|p| p.1));
        Self {
            metric,
            variant,
            title: format!("{} vs {}", metric.name(), variant.parameter_name()),
            x_label: variant.parameter_name().to_string(),
            y_label: metric.axis_label(variant),
            points,
            x_range,
            y_range,
        }
    }

    /// File name without extension, e.g. `pdr_vs_node_density`.
    pub fn file_stem(&self) -> String {
        format!("{}_vs_{}", self.metric, self.variant)
    }

    /// Draw the chart into a PNG file, replacing any existing file.
    pub fn write_png(&self, path: &Path) -> Result<(), PlotError> {
        let root = BitMapBackend::new(path, PNG_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(drawing_error)?;

        let (x0, x1) = self.x_range;
        let (y0, y1) = self.y_range;
        let mut ctx = ChartBuilder::on(&root)
            .margin(20)
            .set_label_area_size(LabelAreaPosition::Left, 70)
            .set_label_area_size(LabelAreaPosition::Bottom, 50)
            .caption(&self.title, ("sans-serif", 30))
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(drawing_error)?;

        ctx.configure_mesh()
            .axis_desc_style(("sans-serif", 18))
            .x_desc(&self.x_label)
            .y_desc(&self.y_label)
            .draw()
            .map_err(drawing_error)?;

        ctx.draw_series(LineSeries::new(self.points.iter().copied(), &BLUE))
            .map_err(drawing_error)?
            .label(self.metric.legend())
            .legend(|(x, y)| PathElement::new(vec![(x - 10, y), (x + 10, y)], &BLUE));
        ctx.draw_series(
            self.points
                .iter()
                .map(|&p| Circle::new(p, 4, BLUE.filled())),
        )
        .map_err(drawing_error)?;

        ctx.configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(drawing_error)?;

        root.present().map_err(drawing_error)?;
        Ok(())
    }

    /// Build the interactive version of the chart.
    pub fn to_plotly(&self) -> plotly::Plot {
        let (xs, ys): (Vec<f64>, Vec<f64>) = self.points.iter().copied().unzip();
        let trace = Scatter::new(xs, ys)
            .name(self.metric.legend())
            .mode(Mode::LinesMarkers)
            .marker(Marker::new().symbol(MarkerSymbol::Circle).size(8));

        let mut plot = plotly::Plot::new();
        plot.add_trace(trace);
        plot.set_layout(
            Layout::new()
                .title(Title::with_text(self.title.as_str()))
                .show_legend(true)
                .x_axis(
                    Axis::new()
                        .title(Title::with_text(self.x_label.as_str()))
                        .show_grid(true)
                        .range(vec![self.x_range.0, self.x_range.1]),
                )
                .y_axis(
                    Axis::new()
                        .title(Title::with_text(self.y_label.as_str()))
                        .show_grid(true)
                        .range(vec![self.y_range.0, self.y_range.1]),
                ),
        );
        plot
    }

    /// Write the interactive chart as a standalone HTML page.
    pub fn write_html(&self, path: &Path) -> Result<(), PlotError> {
        fs::write(path, self.to_plotly().to_html())?;
        Ok(())
    }
}

/// Range of the X axis. The traffic-load charts always show `[0, 30]`.
pub fn x_range(variant: Variant, xs: impl IntoIterator<Item = f64>) -> (f64, f64) {
    match variant {
        Variant::NodeDensity => fit(xs),
        Variant::TrafficLoad => (0.0, 30.0),
    }
}

/// Range of the Y axis. Some charts use fixed limits, all others are fitted to the data.
pub fn y_range(variant: Variant, metric: Metric, ys: impl IntoIterator<Item = f64>) -> (f64, f64) {
    match (variant, metric) {
        (Variant::NodeDensity, Metric::Pdr) => (0.0, 1.0),
        (Variant::TrafficLoad, Metric::Pdr) => (0.0, 100.0),
        (Variant::TrafficLoad, Metric::E2eDelay) => (5.0, 10.0),
        (Variant::TrafficLoad, Metric::Throughput) => {
            let ys = ys.into_iter().filter(|y| y.is_finite()).collect_vec();
            match ys.iter().copied().reduce(f64::max) {
                Some(max) if max > 0.0 => (0.0, max * 1.1),
                _ => fit(ys),
            }
        }
        (Variant::NodeDensity, _) => fit(ys),
    }
}

/// Fit a range around all finite values, with a margin of 5% on each side.
fn fit(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    match values
        .into_iter()
        .filter(|v| v.is_finite())
        .minmax_by(|a, b| a.total_cmp(b))
    {
        MinMaxResult::NoElements => (0.0, 1.0),
        MinMaxResult::OneElement(v) => pad(v, v),
        MinMaxResult::MinMax(lo, hi) => pad(lo, hi),
    }
}

fn pad(lo: f64, hi: f64) -> (f64, f64) {
    let margin = if hi > lo {
        (hi - lo) * 0.05
    } else {
        (lo.abs() * 0.05).max(0.5)
    };
    (lo - margin, hi + margin)
}

/// Render one chart per metric into `plot_dir`, creating the directory if necessary. Returns the
/// paths of all written files.
pub fn render(
    table: &ResultTable,
    plot_dir: impl AsRef<Path>,
    html: bool,
) -> Result<Vec<PathBuf>, PlotError> {
    let plot_dir = plot_dir.as_ref();
    fs::create_dir_all(plot_dir)?;

    let mut written = Vec::new();
    for metric in Metric::iter() {
        let chart = Chart::new(table, metric);

        let png = plot_dir.then_file(chart.file_stem(), "png");
        log::debug!("Plotting {png:?}");
        chart.write_png(&png)?;
        written.push(png);

        if html {
            let page = plot_dir.then_file(chart.file_stem(), "html");
            log::debug!("Plotting {page:?}");
            chart.write_html(&page)?;
            written.push(page);
        }
    }
    Ok(written)
}
