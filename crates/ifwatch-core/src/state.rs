// ── Display state ──
//
// The one value mutated by input handling and read by every redraw. It is
// owned by the application root and passed by reference; input and
// rendering are serialized on the event-loop task, so no lock is needed.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::error::CoreError;

/// Which counter pair drives the rate columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RateKind {
    /// Octet counters, displayed as bits per second.
    #[default]
    Throughput,
    /// Unicast packet counters, displayed as packets per second.
    Packets,
}

/// Display unit: two independent three-step rings, one per rate kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    #[default]
    Bps,
    Kbps,
    Mbps,
    Pps,
    Kpps,
    Mpps,
}

impl Unit {
    pub const fn kind(self) -> RateKind {
        match self {
            Self::Bps | Self::Kbps | Self::Mbps => RateKind::Throughput,
            Self::Pps | Self::Kpps | Self::Mpps => RateKind::Packets,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Bps => "bps",
            Self::Kbps => "kbps",
            Self::Mbps => "mbps",
            Self::Pps => "pps",
            Self::Kpps => "kpps",
            Self::Mpps => "mpps",
        }
    }

    /// Next scale within the same ring, wrapping.
    const fn next_scale(self) -> Self {
        match self {
            Self::Bps => Self::Kbps,
            Self::Kbps => Self::Mbps,
            Self::Mbps => Self::Bps,
            Self::Pps => Self::Kpps,
            Self::Kpps => Self::Mpps,
            Self::Mpps => Self::Pps,
        }
    }

    /// First member of the given kind's ring.
    const fn first_of(kind: RateKind) -> Self {
        match kind {
            RateKind::Throughput => Self::Bps,
            RateKind::Packets => Self::Pps,
        }
    }

    /// Convert a raw counter rate (bytes/s for throughput units,
    /// packets/s for packet units) into this unit.
    pub const fn convert(self, raw: i64) -> i64 {
        match self {
            Self::Bps => raw * 8,
            Self::Kbps => raw * 8 / 1024,
            Self::Mbps => raw * 8 / 1024 / 1024,
            Self::Pps => raw,
            Self::Kpps => raw / 1000,
            Self::Mpps => raw / 1000 / 1000,
        }
    }
}

impl FromStr for Unit {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bps" => Ok(Self::Bps),
            "kbps" => Ok(Self::Kbps),
            "mbps" => Ok(Self::Mbps),
            "pps" => Ok(Self::Pps),
            "kpps" => Ok(Self::Kpps),
            "mpps" => Ok(Self::Mpps),
            other => Err(CoreError::InvalidUnit(other.to_owned())),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Mutable UI-facing state: active filter, display unit, marked rows,
/// down-interface visibility.
#[derive(Debug)]
pub struct DisplayState {
    filter: Regex,
    filter_expr: String,
    unit: Unit,
    show_down: bool,
    marks: BTreeSet<(String, String)>,
}

impl DisplayState {
    /// Build the initial state from startup configuration. An empty
    /// filter expression compiles to a pattern matching nothing.
    pub fn new(filter_expr: &str, unit: Unit) -> Result<Self, CoreError> {
        Ok(Self {
            filter: compile_filter(filter_expr)?,
            filter_expr: filter_expr.to_owned(),
            unit,
            show_down: true,
            marks: BTreeSet::new(),
        })
    }

    /// Replace the filter pattern. On a compile failure the previous
    /// filter stays in effect and the error is returned to the caller.
    pub fn set_filter(&mut self, expr: &str) -> Result<(), CoreError> {
        self.filter = compile_filter(expr)?;
        self.filter_expr = expr.to_owned();
        Ok(())
    }

    pub fn filter(&self) -> &Regex {
        &self.filter
    }

    /// The filter text as the user typed it.
    pub fn filter_expr(&self) -> &str {
        &self.filter_expr
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn rate_kind(&self) -> RateKind {
        self.unit.kind()
    }

    pub fn show_down(&self) -> bool {
        self.show_down
    }

    pub fn toggle_show_down(&mut self) {
        self.show_down = !self.show_down;
    }

    /// Switch between throughput and packet display. The scale resets to
    /// the new kind's first member.
    pub fn toggle_rate_kind(&mut self) {
        self.unit = match self.unit.kind() {
            RateKind::Throughput => Unit::first_of(RateKind::Packets),
            RateKind::Packets => Unit::first_of(RateKind::Throughput),
        };
    }

    /// Advance the scale within the current kind's ring.
    pub fn cycle_unit_scale(&mut self) {
        self.unit = self.unit.next_scale();
    }

    /// Flag or unflag one interface for visual priority.
    pub fn toggle_mark(&mut self, device: &str, descr: &str) {
        let key = (device.to_owned(), descr.to_owned());
        if !self.marks.remove(&key) {
            self.marks.insert(key);
        }
    }

    pub fn is_marked(&self, device: &str, descr: &str) -> bool {
        self.marks
            .contains(&(device.to_owned(), descr.to_owned()))
    }

    pub fn mark_count(&self) -> usize {
        self.marks.len()
    }
}

/// Nothing given, nothing matches.
fn compile_filter(expr: &str) -> Result<Regex, CoreError> {
    let expr = if expr.is_empty() { "$^" } else { expr };
    Ok(Regex::new(expr)?)
}
