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
//! Per-run metrics computed from a single trace.
//!
//! The two variants differ in how they handle receptions without a matching transmission and in
//! how they compute the throughput:
//!
//! | | node density | traffic load |
//! |---|---|---|
//! | unmatched reception | ignored for the delay | the run is skipped |
//! | throughput | received bytes over `[first sent, last received]`, in Kbps | received packets times `8 * 1024` over `[first sent, last sent]` |

use std::{collections::HashMap, path::Path};

use crate::{
    config::Variant,
    trace::{SentRecord, Trace, TraceError},
};

/// Metrics of a single simulation run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunMetrics {
    /// Packet delivery ratio, received over sent packets.
    pub pdr: f64,
    /// Mean end-to-end delay in seconds.
    pub e2e_delay: f64,
    pub throughput: f64,
}

impl std::fmt::Display for RunMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "pdr: {:>7.3}%, delay: {:.6}s, throughput: {:.3}",
            self.pdr * 100.0,
            self.e2e_delay,
            self.throughput
        )
    }
}

/// Reason why a run does not contribute to the aggregated metrics.
#[derive(Debug, thiserror::Error)]
pub enum SkipReason {
    #[error("{0}")]
    Trace(#[from] TraceError),
    #[error("packet {0:?} was received but never sent")]
    UnmatchedReceive(String),
    #[error("the first and the last packet were both sent at {0}s")]
    ZeroSentSpan(f64),
}

/// Outcome of evaluating a single trace.
pub type RunOutcome = Result<RunMetrics, SkipReason>;

/// Read the trace file at `path` and compute its metrics.
pub fn evaluate_file(variant: Variant, path: impl AsRef<Path>) -> RunOutcome {
    let trace = Trace::from_file(path)?;
    evaluate(variant, &trace)
}

/// Compute the metrics of a parsed trace.
pub fn evaluate(variant: Variant, trace: &Trace) -> RunOutcome {
    match variant {
        Variant::NodeDensity => Ok(node_density_metrics(trace)),
        Variant::TrafficLoad => traffic_load_metrics(trace),
    }
}

/// Node-density metrics. Receptions without a matching transmission are left out of the delay,
/// and the throughput is the received volume in Kbps over the time from the first transmission
/// to the last reception.
pub fn node_density_metrics(trace: &Trace) -> RunMetrics {
    let first_sent = first_sent_times(&trace.sent);

    let delays = trace
        .received
        .iter()
        .filter_map(|r| first_sent.get(r.packet_id.as_str()).map(|t| r.time - t))
        .collect::<Vec<_>>();

    // an undefined interval counts as one second
    let duration = match (trace.sent.first(), trace.received.last()) {
        (Some(first), Some(last)) => last.time - first.time,
        _ => 1.0,
    };
    let throughput = if duration > 0.0 {
        (trace.received_bytes() * 8) as f64 / (1024.0 * duration)
    } else {
        0.0
    };

    RunMetrics {
        pdr: delivery_ratio(trace),
        e2e_delay: mean(&delays).unwrap_or(0.0),
        throughput,
    }
}

/// Traffic-load metrics. Every reception must match a transmission, and the throughput counts
/// each received packet as `8 * 1024` units over the span between the first and the last
/// transmission in file order.
pub fn traffic_load_metrics(trace: &Trace) -> RunOutcome {
    let first_sent = first_sent_times(&trace.sent);

    let delays = trace
        .received
        .iter()
        .map(|r| {
            first_sent
                .get(r.packet_id.as_str())
                .map(|t| r.time - t)
                .ok_or_else(|| SkipReason::UnmatchedReceive(r.packet_id.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let throughput = match (trace.sent.first(), trace.sent.last()) {
        (Some(first), Some(last)) => {
            let span = last.time - first.time;
            if span == 0.0 {
                return Err(SkipReason::ZeroSentSpan(first.time));
            }
            (trace.received.len() * 8 * 1024) as f64 / span
        }
        _ => 0.0,
    };

    Ok(RunMetrics {
        pdr: delivery_ratio(trace),
        e2e_delay: mean(&delays).unwrap_or(0.0),
        throughput,
    })
}

/// Received over sent packets, `0` if nothing was sent.
fn delivery_ratio(trace: &Trace) -> f64 {
    if trace.sent.is_empty() {
        0.0
    } else {
        trace.received.len() as f64 / trace.sent.len() as f64
    }
}

/// Time of the first transmission (in file order) of each packet identifier.
fn first_sent_times(sent: &[SentRecord]) -> HashMap<&str, f64> {
    let mut times = HashMap::new();
    for s in sent {
        times.entry(s.packet_id.as_str()).or_insert(s.time);
    }
    times
}

/// Arithmetic mean, summed from left to right. `None` for an empty slice.
pub fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        return None;
    }
    Some(xs.iter().fold(0.0, |acc, x| acc + x) / xs.len() as f64)
}

#[cfg(test)]
mod test {
    use super::*;

    fn example_trace() -> Trace {
        Trace::parse(
            "t 0.0 length:100 a\n\
             t 1.0 length:200 b\n\
             r 2.0 length:100 a\n\
             r 3.0 length:200 b\n",
        )
        .unwrap()
    }

    #[test]
    fn node_density_example() {
        let m = node_density_metrics(&example_trace());
        assert_eq!(m.pdr, 1.0);
        assert_eq!(m.e2e_delay, 2.0);
        assert_eq!(m.throughput, 300.0 * 8.0 / (1024.0 * 3.0));
    }

    #[test]
    fn traffic_load_example() {
        let m = traffic_load_metrics(&example_trace()).unwrap();
        assert_eq!(m.pdr, 1.0);
        assert_eq!(m.e2e_delay, 2.0);
        assert_eq!(m.throughput, (2 * 8 * 1024) as f64 / 1.0);
    }

    #[test]
    fn empty_trace() {
        let trace = Trace::parse("").unwrap();
        assert_eq!(node_density_metrics(&trace), RunMetrics::default());
        assert_eq!(traffic_load_metrics(&trace).unwrap(), RunMetrics::default());
    }

    #[test]
    fn pdr_is_ratio() {
        let trace = Trace::parse("t 0 a\nt 1 b\nt 2 c\nt 3 d\nr 4 a\n").unwrap();
        assert_eq!(node_density_metrics(&trace).pdr, 0.25);
        assert_eq!(traffic_load_metrics(&trace).unwrap().pdr, 0.25);

        // receptions without transmissions
        let trace = Trace::parse("r 4 a\n").unwrap();
        assert_eq!(node_density_metrics(&trace).pdr, 0.0);
    }

    #[test]
    fn unmatched_receive() {
        let trace = Trace::parse("t 0.0 a\nt 1.0 b\nr 2.0 a\nr 4.0 zz\n").unwrap();

        let m = node_density_metrics(&trace);
        assert_eq!(m.pdr, 1.0);
        assert_eq!(m.e2e_delay, 2.0);

        match traffic_load_metrics(&trace) {
            Err(SkipReason::UnmatchedReceive(id)) => assert_eq!(id, "zz"),
            x => panic!("unexpected outcome: {x:?}"),
        }
    }

    #[test]
    fn delay_uses_first_transmission_in_file_order() {
        let trace = Trace::parse("t 5.0 a\nt 1.0 a\nr 6.0 a\n").unwrap();
        assert_eq!(node_density_metrics(&trace).e2e_delay, 1.0);
        assert_eq!(traffic_load_metrics(&trace).unwrap().e2e_delay, 1.0);
    }

    #[test]
    fn node_density_duration_fallback() {
        // nothing received: the duration is one second, and no bytes were received.
        let trace = Trace::parse("t 0.5 a\n").unwrap();
        assert_eq!(node_density_metrics(&trace).throughput, 0.0);

        // received without transmission: duration falls back to one second.
        let trace = Trace::parse("r 4.0 length:128 a\n").unwrap();
        assert_eq!(node_density_metrics(&trace).throughput, 1.0);

        // negative duration
        let trace = Trace::parse("t 5.0 a\nr 4.0 length:128 a\n").unwrap();
        assert_eq!(node_density_metrics(&trace).throughput, 0.0);
    }

    #[test]
    fn traffic_load_ignores_size() {
        let trace = Trace::parse("t 1.0 a\nt 3.0 b\nr 3.5 length:99999 a\n").unwrap();
        assert_eq!(
            traffic_load_metrics(&trace).unwrap().throughput,
            8192.0 / 2.0
        );
    }

    #[test]
    fn traffic_load_uses_file_order_span() {
        let trace = Trace::parse("t 4.0 a\nt 2.0 b\nr 5.0 a\n").unwrap();
        assert_eq!(traffic_load_metrics(&trace).unwrap().throughput, -4096.0);
    }

    #[test]
    fn traffic_load_zero_span() {
        let trace = Trace::parse("t 1.0 a\nr 2.0 a\n").unwrap();
        assert!(matches!(
            traffic_load_metrics(&trace),
            Err(SkipReason::ZeroSentSpan(t)) if t == 1.0
        ));
    }

    #[test]
    fn bad_size_is_zero() {
        let trace = Trace::parse("t 0.0 a\nr 2.0 length:abc a\nr 2.0 length:1024 a\n").unwrap();
        let m = node_density_metrics(&trace);
        assert_eq!(m.pdr, 2.0);
        assert_eq!(m.throughput, 1024.0 * 8.0 / (1024.0 * 2.0));
    }

    #[test]
    fn huge_sizes() {
        let trace = Trace::parse("t 0.0 a\nr 1.0 length:2305843009213693952 a\n").unwrap();
        assert_eq!(
            node_density_metrics(&trace).throughput,
            2f64.powi(64) / 1024.0
        );
    }

    #[test]
    fn evaluate_missing_file() {
        let path = std::env::temp_dir().join("netmetrics_missing_trace.tr");
        assert!(matches!(
            evaluate_file(Variant::NodeDensity, path),
            Err(SkipReason::Trace(TraceError::Io(_)))
        ));
    }

    #[test]
    fn mean_values() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
    }
}
