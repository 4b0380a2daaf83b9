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
//! Configuration of a parameter sweep: which experiment parameter is varied, which values and
//! seeds are evaluated, and where traces are read from and plots are written to.

use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Seeds used by the simulation scripts, `1..=10`.
pub const DEFAULT_SEEDS: std::ops::RangeInclusive<u32> = 1..=10;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot parse the sweep file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("The sweep contains no parameter values")]
    NoValues,
    #[error("The sweep contains no seeds")]
    NoSeeds,
}

/// The experiment parameter that is varied across the sweep.
///
/// Both variants read the same trace format, but compute delay and throughput differently (see
/// [`crate::metrics`]).
#[derive(
    ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Vary the number of nodes in the network.
    #[strum(serialize = "node_density")]
    NodeDensity,
    /// Vary the number of concurrent traffic flows.
    #[strum(serialize = "traffic_load")]
    TrafficLoad,
}

impl Variant {
    /// Human readable name of the parameter, used in the console output and on the plots.
    pub fn parameter_name(&self) -> &'static str {
        match self {
            Self::NodeDensity => "Node Density",
            Self::TrafficLoad => "Traffic Load",
        }
    }

    /// Parameter values the simulations are run with.
    pub fn default_values(&self) -> Vec<u32> {
        match self {
            Self::NodeDensity => (1..=10).map(|i| i * 10).collect(),
            Self::TrafficLoad => (1..=30).collect(),
        }
    }

    /// Directory the simulation script writes its traces to.
    pub fn default_results_dir(&self) -> PathBuf {
        match self {
            Self::NodeDensity => PathBuf::from("./node_density/results"),
            Self::TrafficLoad => PathBuf::from("./traffic_load/results"),
        }
    }

    /// Directory the plots are written to. The node-density plots are stored next to the traces,
    /// the traffic-load plots one level up, beside the `results` directory.
    pub fn default_output_dir(&self, results_dir: &Path) -> PathBuf {
        match self {
            Self::NodeDensity => results_dir.to_path_buf(),
            Self::TrafficLoad => match results_dir.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        }
    }

    /// Whether the results directory must exist before the sweep starts.
    pub fn requires_results_dir(&self) -> bool {
        matches!(self, Self::NodeDensity)
    }

    /// Unit of the throughput as printed and plotted.
    pub fn throughput_unit(&self) -> &'static str {
        match self {
            Self::NodeDensity => "Kbps",
            Self::TrafficLoad => "kbps",
        }
    }

    /// Divisor applied to the throughput before printing it on the console.
    pub fn console_throughput_divisor(&self) -> f64 {
        match self {
            Self::NodeDensity => 1.0,
            Self::TrafficLoad => 1000.0,
        }
    }
}

/// Optional overrides, stored as JSON.
///
/// ```json
/// { "values": [10, 20, 30], "seeds": [1, 2, 3], "results_dir": "./node_density/results" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepFile {
    pub values: Option<Vec<u32>>,
    pub seeds: Option<Vec<u32>>,
    pub results_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl SweepFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let serialized = fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&serialized)?)
    }
}

/// Fully resolved configuration of a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    pub variant: Variant,
    pub results_dir: PathBuf,
    /// `None` selects [`Variant::default_output_dir`].
    pub output_dir: Option<PathBuf>,
    /// Parameter values, in the order the rows of the result table appear.
    pub values: Vec<u32>,
    pub seeds: Vec<u32>,
}

impl SweepConfig {
    /// Configuration used by the simulation scripts for the given variant.
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            results_dir: variant.default_results_dir(),
            output_dir: None,
            values: variant.default_values(),
            seeds: DEFAULT_SEEDS.collect(),
        }
    }

    /// Apply all fields that are set in the sweep file.
    pub fn with_file(mut self, file: SweepFile) -> Self {
        if let Some(values) = file.values {
            self.values = values;
        }
        if let Some(seeds) = file.seeds {
            self.seeds = seeds;
        }
        if let Some(results_dir) = file.results_dir {
            self.results_dir = results_dir;
        }
        if file.output_dir.is_some() {
            self.output_dir = file.output_dir;
        }
        self
    }

    pub fn results_dir(mut self, results_dir: impl Into<PathBuf>) -> Self {
        self.results_dir = results_dir.into();
        self
    }

    pub fn output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(output_dir.into());
        self
    }

    pub fn values(mut self, values: Vec<u32>) -> Self {
        self.values = values;
        self
    }

    pub fn seeds(mut self, seeds: Vec<u32>) -> Self {
        self.seeds = seeds;
        self
    }

    /// Directory the plots are written to.
    pub fn plot_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.variant.default_output_dir(&self.results_dir))
    }

    /// Check that the sweep has something to iterate over.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.values.is_empty() {
            return Err(ConfigError::NoValues);
        }
        if self.seeds.is_empty() {
            return Err(ConfigError::NoSeeds);
        }
        Ok(())
    }
}
