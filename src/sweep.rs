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
//! Iterate over all `(value, seed)` combinations of a sweep and aggregate the per-run metrics.

use std::path::PathBuf;

use crate::{
    config::{SweepConfig, Variant},
    metrics::{self, RunOutcome},
    table::{Accumulator, ResultTable, Row},
    util::PathBufExt,
};

/// A parameter sweep over the traces stored in a results directory.
#[derive(Debug, Clone)]
pub struct Sweep {
    config: SweepConfig,
}

impl Sweep {
    pub fn new(config: SweepConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn variant(&self) -> Variant {
        self.config.variant
    }

    /// Total number of `(value, seed)` combinations.
    pub fn num_runs(&self) -> usize {
        self.config.values.len() * self.config.seeds.len()
    }

    /// Path of the trace written by the simulation for `value` and `seed`.
    pub fn trace_path(&self, value: u32, seed: u32) -> PathBuf {
        self.config
            .results_dir
            .as_path()
            .then(format!("output_{value}_{seed}.tr"))
    }

    /// Evaluate a single run. Returns `None` if its trace file does not exist.
    pub fn run_seed(&self, value: u32, seed: u32) -> Option<RunOutcome> {
        let path = self.trace_path(value, seed);
        if !path.exists() {
            log::debug!("Skipping {path:?} as it does not exist.");
            return None;
        }
        log::debug!("Loading: {path:?}");
        let outcome = metrics::evaluate_file(self.variant(), &path);
        if let Err(e) = &outcome {
            log::warn!("Error parsing {}: {e}", path.display());
        }
        Some(outcome)
    }

    /// Average the metrics of all successful runs for `value`. Returns `None` if no seed produced
    /// a valid run.
    pub fn aggregate(&self, value: u32) -> Option<Row> {
        self.aggregate_with(value, |_| {})
    }

    /// Like [`Sweep::aggregate`], calling `on_seed` after each seed, whether its trace exists or
    /// not.
    pub fn aggregate_with(&self, value: u32, mut on_seed: impl FnMut(u32)) -> Option<Row> {
        let mut acc = Accumulator::default();
        for &seed in &self.config.seeds {
            if let Some(Ok(m)) = self.run_seed(value, seed) {
                log::trace!("{} {value}, seed {seed}: {m}", self.variant());
                acc.push(m);
            }
            on_seed(seed);
        }
        let num_runs = acc.len();
        let row = acc.into_row(value);
        if row.is_none() {
            log::info!(
                "No valid run for {} {value}",
                self.variant().parameter_name()
            );
        } else {
            log::debug!(
                "Aggregated {num_runs} runs for {} {value}",
                self.variant().parameter_name()
            );
        }
        row
    }

    /// Aggregate all parameter values into a table, in the configured order.
    pub fn run(&self) -> ResultTable {
        self.run_with(|_, _| {})
    }

    /// Like [`Sweep::run`], calling `on_run` for every `(value, seed)` combination.
    pub fn run_with(&self, mut on_run: impl FnMut(u32, u32)) -> ResultTable {
        let mut table = ResultTable::new(self.variant());
        for &value in &self.config.values {
            if let Some(row) = self.aggregate_with(value, |seed| on_run(value, seed)) {
                table.push(row);
            }
        }
        table
    }
}

#[cfg(test)]
mod test {
    use std::{fs, path::Path};

    use super::*;

    /// Create an empty, unique directory below the system temp dir.
    fn fixture_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().then(format!(
            "netmetrics_{name}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_trace(dir: &Path, value: u32, seed: u32, contents: &str) {
        fs::write(dir.then(format!("output_{value}_{seed}.tr")), contents).unwrap();
    }

    #[test]
    fn trace_path_naming() {
        let sweep = Sweep::new(SweepConfig::new(Variant::NodeDensity).results_dir("/data"));
        assert_eq!(sweep.trace_path(30, 7), PathBuf::from("/data/output_30_7.tr"));
        assert_eq!(sweep.num_runs(), 100);
    }

    #[test]
    fn node_density_sweep() {
        let dir = fixture_dir("node_density_sweep");
        write_trace(
            &dir,
            10,
            1,
            "t 0.0 length:100 a\nt 1.0 length:200 b\nr 2.0 length:100 a\nr 3.0 length:200 b\n",
        );
        // half delivered
        write_trace(&dir, 10, 2, "t 0.0 a\nt 1.0 b\nr 1.5 a\n");
        // malformed, contributes nothing
        write_trace(&dir, 10, 3, "t 0.0 a\nr\n");
        // every trace of value 20 is missing
        write_trace(&dir, 30, 1, "");

        let sweep = Sweep::new(
            SweepConfig::new(Variant::NodeDensity)
                .results_dir(&dir)
                .values(vec![10, 20, 30])
                .seeds(vec![1, 2, 3, 4]),
        );

        let mut visited = Vec::new();
        let table = sweep.run_with(|value, seed| visited.push((value, seed)));
        assert_eq!(visited.len(), 12);

        assert_eq!(
            table.rows().iter().map(|r| r.value).collect::<Vec<_>>(),
            vec![10, 30]
        );
        let row = table.get(10).unwrap();
        assert_eq!(row.pdr, (1.0 + 0.5) / 2.0);
        assert_eq!(row.e2e_delay, (2.0 + 1.5) / 2.0);
        assert_eq!(row.throughput, (300.0 * 8.0 / (1024.0 * 3.0) + 0.0) / 2.0);

        let row = table.get(30).unwrap();
        assert_eq!((row.pdr, row.e2e_delay, row.throughput), (0.0, 0.0, 0.0));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn traffic_load_skips_unmatched_runs() {
        let dir = fixture_dir("traffic_load_unmatched");
        write_trace(&dir, 1, 1, "t 0.0 a\nt 2.0 b\nr 1.0 a\n");
        write_trace(&dir, 1, 2, "t 0.0 a\nt 2.0 b\nr 1.0 a\nr 3.0 c\n");
        // only unmatched runs
        write_trace(&dir, 2, 1, "r 1.0 a\n");
        // zero sent span
        write_trace(&dir, 3, 1, "t 1.0 a\nr 2.0 a\n");

        let sweep = Sweep::new(
            SweepConfig::new(Variant::TrafficLoad)
                .results_dir(&dir)
                .values(vec![3, 2, 1])
                .seeds(vec![1, 2]),
        );
        let table = sweep.run();

        assert_eq!(table.len(), 1);
        let row = table.get(1).unwrap();
        assert_eq!(row.pdr, 0.5);
        assert_eq!(row.e2e_delay, 1.0);
        assert_eq!(row.throughput, 8192.0 / 2.0);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn rows_follow_value_order() {
        let dir = fixture_dir("value_order");
        for value in [5, 1, 3] {
            write_trace(&dir, value, 1, "t 0.0 a\nr 1.0 a\n");
        }
        let sweep = Sweep::new(
            SweepConfig::new(Variant::NodeDensity)
                .results_dir(&dir)
                .values(vec![5, 1, 3])
                .seeds(vec![1]),
        );
        assert_eq!(sweep.run().values(), vec![5.0, 1.0, 3.0]);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_results_dir() {
        let dir = std::env::temp_dir().then("netmetrics_no_such_results_dir");
        let sweep = Sweep::new(SweepConfig::new(Variant::TrafficLoad).results_dir(dir));
        assert!(sweep.run().is_empty());
        assert_eq!(sweep.run_seed(1, 1).map(|o| o.is_ok()), None);
    }

    #[test]
    fn idempotent() {
        let dir = fixture_dir("idempotent");
        write_trace(&dir, 10, 1, "t 0.1 a\nt 0.2 b\nr 0.35 length:512 a\n");
        write_trace(&dir, 10, 2, "t 0.1 a\nr 0.7 length:1024 a\n");
        let sweep = Sweep::new(
            SweepConfig::new(Variant::NodeDensity)
                .results_dir(&dir)
                .values(vec![10]),
        );
        assert_eq!(sweep.run().to_string(), sweep.run().to_string());

        fs::remove_dir_all(&dir).unwrap();
    }
}
