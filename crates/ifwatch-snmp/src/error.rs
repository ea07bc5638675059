// ── Query-layer error types ──
//
// Consumers see where a query attempt failed (resolving, opening the
// session, walking a table) without caring about PDU-level detail.

use thiserror::Error;

/// Errors produced while querying one device.
#[derive(Debug, Error)]
pub enum SnmpError {
    #[error("cannot resolve {host}: {reason}")]
    Resolve { host: String, reason: String },

    #[error("cannot open session to {host}: {source}")]
    Session {
        host: String,
        #[source]
        source: csnmp::SnmpClientError,
    },

    #[error("walk of {table} on {host} failed: {source}")]
    Walk {
        host: String,
        table: &'static str,
        #[source]
        source: csnmp::SnmpClientError,
    },
}
