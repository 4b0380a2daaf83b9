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
//! Table of aggregated metrics, one row per parameter value.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use crate::{
    config::Variant,
    metrics::{mean, RunMetrics},
};

/// Metrics averaged over all successful runs of one parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Row {
    pub value: u32,
    pub pdr: f64,
    pub e2e_delay: f64,
    pub throughput: f64,
}

/// Collects the run metrics of a single parameter value.
#[derive(Debug, Clone, Default)]
pub struct Accumulator {
    pdrs: Vec<f64>,
    e2e_delays: Vec<f64>,
    throughputs: Vec<f64>,
}

impl Accumulator {
    pub fn push(&mut self, metrics: RunMetrics) {
        self.pdrs.push(metrics.pdr);
        self.e2e_delays.push(metrics.e2e_delay);
        self.throughputs.push(metrics.throughput);
    }

    /// Number of runs collected so far.
    pub fn len(&self) -> usize {
        self.pdrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pdrs.is_empty()
    }

    /// Average each metric independently. Returns `None` if no run was collected.
    pub fn into_row(self, value: u32) -> Option<Row> {
        Some(Row {
            value,
            pdr: mean(&self.pdrs)?,
            e2e_delay: mean(&self.e2e_delays)?,
            throughput: mean(&self.throughputs)?,
        })
    }
}

/// Aggregated results of a sweep, in the order of the configured parameter values.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    pub variant: Variant,
    rows: Vec<Row>,
}

impl ResultTable {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            rows: Vec::new(),
        }
    }

    /// Append a row. Rows for a parameter value that is already present are ignored.
    pub fn push(&mut self, row: Row) -> bool {
        if self.rows.iter().any(|r| r.value == row.value) {
            log::warn!(
                "Ignoring duplicate row for {} {}",
                self.variant.parameter_name(),
                row.value
            );
            return false;
        }
        self.rows.push(row);
        true
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, value: u32) -> Option<&Row> {
        self.rows.iter().find(|r| r.value == value)
    }

    /// Parameter values of all rows.
    pub fn values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.value as f64).collect()
    }

    /// Display adapter for a single row, formatted the way it is printed on the console.
    pub fn display_row<'a>(&self, row: &'a Row) -> RowDisplay<'a> {
        RowDisplay {
            variant: self.variant,
            row,
        }
    }
}

/// Prints every row as a block of lines, each block followed by an empty line.
impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.rows
                .iter()
                .map(|row| format!("{}\n", self.display_row(row)))
                .join("")
        )
    }
}

/// Console representation of a [`Row`]. Floats are formatted with [`fmt_float`].
pub struct RowDisplay<'a> {
    variant: Variant,
    row: &'a Row,
}

impl fmt::Display for RowDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Row {
            value,
            pdr,
            e2e_delay,
            throughput,
        } = *self.row;
        writeln!(f, "{}: {value}", self.variant.parameter_name())?;
        writeln!(f, "Average PDR: {}", fmt_float(pdr))?;
        writeln!(f, "Average End-to-End Delay: {} seconds", fmt_float(e2e_delay))?;
        writeln!(
            f,
            "Average Throughput: {} {}",
            fmt_float(throughput / self.variant.console_throughput_divisor()),
            self.variant.throughput_unit()
        )
    }
}

/// Format a float in its shortest round-trip form. Integral values keep their fractional digit
/// (`1.0`). Values below `1e-4` or from `1e16` on use an exponent with an explicit sign and at
/// least two digits (`1e-05`, `2.5e+16`). Non-finite values are `inf`, `-inf` and `nan`.
pub fn fmt_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    let repr = format!("{x:?}");
    let Some((mantissa, exponent)) = repr.split_once('e') else {
        return repr;
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

#[cfg(test)]
mod test {
    use super::*;

    fn metrics(pdr: f64, e2e_delay: f64, throughput: f64) -> RunMetrics {
        RunMetrics {
            pdr,
            e2e_delay,
            throughput,
        }
    }

    #[test]
    fn accumulate() {
        let mut acc = Accumulator::default();
        assert!(acc.is_empty());
        assert_eq!(acc.clone().into_row(10), None);

        acc.push(metrics(1.0, 2.0, 3.0));
        acc.push(metrics(0.5, 4.0, 5.0));
        assert_eq!(acc.len(), 2);
        assert_eq!(
            acc.into_row(10),
            Some(Row {
                value: 10,
                pdr: 0.75,
                e2e_delay: 3.0,
                throughput: 4.0
            })
        );
    }

    #[test]
    fn one_row_per_value() {
        let mut table = ResultTable::new(Variant::NodeDensity);
        let row = Row {
            value: 10,
            pdr: 1.0,
            e2e_delay: 0.0,
            throughput: 0.0,
        };
        assert!(table.push(row));
        assert!(!table.push(Row { pdr: 0.5, ..row }));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(10).unwrap().pdr, 1.0);
    }

    #[test]
    fn node_density_output() {
        let mut table = ResultTable::new(Variant::NodeDensity);
        table.push(Row {
            value: 20,
            pdr: 1.0,
            e2e_delay: 0.25,
            throughput: 2048.0,
        });
        table.push(Row {
            value: 10,
            pdr: 0.5,
            e2e_delay: 2.0,
            throughput: 0.0,
        });
        assert_eq!(
            table.to_string(),
            "Node Density: 20\n\
             Average PDR: 1.0\n\
             Average End-to-End Delay: 0.25 seconds\n\
             Average Throughput: 2048.0 Kbps\n\
             \n\
             Node Density: 10\n\
             Average PDR: 0.5\n\
             Average End-to-End Delay: 2.0 seconds\n\
             Average Throughput: 0.0 Kbps\n\
             \n"
        );
        assert_eq!(table.values(), vec![20.0, 10.0]);
    }

    #[test]
    fn float_format() {
        assert_eq!(fmt_float(1.0), "1.0");
        assert_eq!(fmt_float(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(fmt_float(0.0001), "0.0001");
        assert_eq!(fmt_float(1e-5), "1e-05");
        assert_eq!(fmt_float(-2.5e-7), "-2.5e-07");
        assert_eq!(fmt_float(1e16), "1e+16");
        assert_eq!(fmt_float(1.5e300), "1.5e+300");
        assert_eq!(fmt_float(f64::INFINITY), "inf");
        assert_eq!(fmt_float(f64::NAN), "nan");

        let mut table = ResultTable::new(Variant::NodeDensity);
        table.push(Row {
            value: 10,
            pdr: 1.0,
            e2e_delay: 2e-5,
            throughput: 0.0,
        });
        assert!(table
            .to_string()
            .contains("Average End-to-End Delay: 2e-05 seconds\n"));
    }

    #[test]
    fn traffic_load_output() {
        let mut table = ResultTable::new(Variant::TrafficLoad);
        table.push(Row {
            value: 3,
            pdr: 0.75,
            e2e_delay: 0.5,
            throughput: 8192.0,
        });
        assert_eq!(
            table.to_string(),
            "Traffic Load: 3\n\
             Average PDR: 0.75\n\
             Average End-to-End Delay: 0.5 seconds\n\
             Average Throughput: 8.192 kbps\n\
             \n"
        );
    }
}
