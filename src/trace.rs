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
//! Module for reading ns-3 ASCII trace files into sent and received packet records.
//!
//! Each line of a trace is one event. Tokens are separated by whitespace:
//!
//! ```text
//! t 1.0042 /NodeList/1/DeviceList/0/... length:1052 ... ns3::UdpHeader (...) Payload (size=1024) 17
//! ```
//!
//! The first token is the event type, the second one the timestamp in seconds, and the last one
//! is used as the packet identifier.

use std::{fs, num::ParseFloatError, path::Path, str::FromStr};

/// Prefix of the token that carries the packet size.
pub const LENGTH_PREFIX: &str = "length:";

#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: missing timestamp")]
    MissingTime { line: usize },
    #[error("line {line}: cannot parse timestamp {token:?}: {source}")]
    InvalidTime {
        line: usize,
        token: String,
        #[source]
        source: ParseFloatError,
    },
}

/// Type of a trace event, given by the first token of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// `t`: the packet was transmitted.
    Sent,
    /// `r`: the packet was received.
    Received,
    /// Any other event (enqueue, dequeue, drop, ...). Those are parsed but never recorded.
    Other,
}

impl EventKind {
    pub fn from_token(token: &str) -> Self {
        match token {
            "t" => Self::Sent,
            "r" => Self::Received,
            _ => Self::Other,
        }
    }
}

/// A single parsed line of a trace file.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceEvent {
    pub kind: EventKind,
    /// Time of the event, in seconds.
    pub time: f64,
    /// Packet size in bytes, `0` if the line carries no (valid) `length:` token.
    pub size: i64,
    pub packet_id: String,
}

impl TraceEvent {
    /// Parse a single line. `line` is the 1-based line number used in error messages. Returns
    /// `Ok(None)` for lines without any token.
    ///
    /// The timestamp is required on every non-empty line, no matter its event type.
    pub fn parse_line(text: &str, line: usize) -> Result<Option<Self>, TraceError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let (Some(kind), Some(packet_id)) = (tokens.first(), tokens.last()) else {
            return Ok(None);
        };
        let time_token = tokens.get(1).ok_or(TraceError::MissingTime { line })?;
        let time = parse_number::<f64>(time_token)
            .map_err(|source| TraceError::InvalidTime {
                line,
                token: time_token.to_string(),
                source,
            })?;

        Ok(Some(Self {
            kind: EventKind::from_token(kind),
            time,
            size: packet_size(&tokens),
            packet_id: packet_id.to_string(),
        }))
    }
}

/// Extract the packet size from the first `length:` token. The value is the text between the
/// first and the second colon. Missing or malformed values yield `0`.
pub fn packet_size(tokens: &[&str]) -> i64 {
    tokens
        .iter()
        .find_map(|token| token.strip_prefix(LENGTH_PREFIX))
        .and_then(|rest| rest.split(':').next())
        .and_then(|value| parse_number(value).ok())
        .unwrap_or(0)
}

/// Parse a decimal number that may group its digits with single underscores (`1_000`). An
/// underscore must sit between two digits.
fn parse_number<T: FromStr>(token: &str) -> Result<T, T::Err> {
    match without_digit_separators(token) {
        Some(plain) => plain.parse(),
        None => token.parse(),
    }
}

/// `token` without its underscores, or `None` if it has none or one is not between two digits.
fn without_digit_separators(token: &str) -> Option<String> {
    if !token.contains('_') {
        return None;
    }
    let bytes = token.as_bytes();
    let is_digit = |i: Option<usize>| {
        i.and_then(|i| bytes.get(i))
            .is_some_and(|b| b.is_ascii_digit())
    };
    let valid = bytes
        .iter()
        .enumerate()
        .filter(|(_, b)| **b == b'_')
        .all(|(i, _)| is_digit(i.checked_sub(1)) && is_digit(Some(i + 1)));
    valid.then(|| token.replace('_', ""))
}

/// Record of a transmitted packet.
#[derive(Debug, Clone, PartialEq)]
pub struct SentRecord {
    pub time: f64,
    pub packet_id: String,
}

/// Record of a received packet.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedRecord {
    pub time: f64,
    pub size: i64,
    pub packet_id: String,
}

/// All sent and received records of a single simulation run, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    pub sent: Vec<SentRecord>,
    pub received: Vec<ReceivedRecord>,
}

impl Trace {
    /// Read and parse an entire trace file. The file is loaded into memory at once.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::parse(&contents)
    }

    /// Parse the contents of a trace file. The first malformed line aborts parsing.
    pub fn parse(contents: &str) -> Result<Self, TraceError> {
        let mut trace = Self::default();
        for (i, text) in contents.lines().enumerate() {
            let Some(event) = TraceEvent::parse_line(text, i + 1)? else {
                continue;
            };
            trace.push(event);
        }
        Ok(trace)
    }

    /// Add an event to the matching list. Events of kind `Other` are dropped.
    pub fn push(&mut self, event: TraceEvent) {
        let TraceEvent {
            kind,
            time,
            size,
            packet_id,
        } = event;
        match kind {
            EventKind::Sent => self.sent.push(SentRecord { time, packet_id }),
            EventKind::Received => self.received.push(ReceivedRecord {
                time,
                size,
                packet_id,
            }),
            EventKind::Other => {}
        }
    }

    /// Sum of the sizes of all received packets, in bytes. Summed as `i128`, so it cannot
    /// overflow for any realistic number of packets.
    pub fn received_bytes(&self) -> i128 {
        self.received.iter().map(|r| r.size as i128).sum()
    }
}
