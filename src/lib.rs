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
//! Library for computing packet delivery ratio, end-to-end delay, and throughput from ns-3 trace
//! files, averaged over the seeds of a parameter sweep.

pub mod config;
pub mod metrics;
pub mod plot;
pub mod sweep;
pub mod table;
pub mod trace;
pub mod util;

pub mod prelude {
    pub use super::{
        config::{SweepConfig, Variant},
        metrics::{RunMetrics, RunOutcome, SkipReason},
        sweep::Sweep,
        table::{ResultTable, Row},
        trace::Trace,
    };
}
