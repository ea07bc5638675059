// ── Engine error types ──
//
// Domain-level failures only; wire errors arrive wrapped, never raw.
// Propagation policy: Connect and SampleDecode are absorbed (logged) at
// the scheduler boundary, Discovery drops the device at startup, and
// InvalidPattern/InvalidUnit are rejected back to the caller with the
// previous state retained.

use ifwatch_snmp::{InterfaceField, SnmpError};
use thiserror::Error;

/// Unified error type for the engine.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A session could not be opened or a walk failed. Per-attempt, never
    /// fatal: the next tick retries.
    #[error("cannot query {device}: {source}")]
    Connect {
        device: String,
        #[source]
        source: SnmpError,
    },

    /// Discovery returned zero interfaces. Fatal for that device only.
    #[error("{device} returned no interfaces at discovery")]
    Discovery { device: String },

    /// One sampled value did not fit its field; the value is dropped and
    /// the refresh continues.
    #[error("sample {field:?}.{index} carried {got} where {expected} was expected")]
    SampleDecode {
        field: InterfaceField,
        index: u32,
        got: &'static str,
        expected: &'static str,
    },

    /// A user-supplied filter failed to compile; the previous filter stays
    /// in effect.
    #[error("invalid filter pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// An unrecognized display unit name.
    #[error("unknown display unit {0:?} (expected bps, kbps, mbps, pps, kpps or mpps)")]
    InvalidUnit(String),
}
