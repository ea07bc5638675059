// ── Per-device query sessions ──
//
// Sessions are short-lived: every discovery or sampling call opens a fresh
// client and drops it on the way out, so an unreachable device never pins
// a socket between ticks.

use std::net::SocketAddr;
use std::time::Duration;

use csnmp::{ObjectIdentifier, ObjectValue, Snmp2cClient};
use tokio::net::lookup_host;
use tracing::{trace, warn};

use crate::error::SnmpError;
use crate::oid::{self, InterfaceField};

const SNMP_PORT: u16 = 161;

/// A typed value sampled from one interface-table cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleValue {
    Int(i64),
    Text(String),
}

/// One classified interface-table binding: which field, which interface,
/// what value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSample {
    pub field: InterfaceField,
    pub index: u32,
    pub value: SampleValue,
}

/// One queryable device endpoint.
#[derive(Debug, Clone)]
pub struct SnmpTarget {
    host: String,
    addr: SocketAddr,
    community: String,
    timeout: Duration,
}

impl SnmpTarget {
    /// Resolve `host` to an SNMP endpoint. Resolution happens once, up
    /// front, so a DNS outage mid-run cannot take a device offline.
    pub async fn resolve(
        host: &str,
        community: &str,
        timeout: Duration,
    ) -> Result<Self, SnmpError> {
        let mut addrs = lookup_host((host, SNMP_PORT))
            .await
            .map_err(|e| SnmpError::Resolve {
                host: host.to_owned(),
                reason: e.to_string(),
            })?;
        let addr = addrs.next().ok_or_else(|| SnmpError::Resolve {
            host: host.to_owned(),
            reason: "no addresses returned".into(),
        })?;

        Ok(Self {
            host: host.to_owned(),
            addr,
            community: community.to_owned(),
            timeout,
        })
    }

    /// The hostname this target was resolved from.
    pub fn host(&self) -> &str {
        &self.host
    }

    async fn open(&self) -> Result<Snmp2cClient, SnmpError> {
        Snmp2cClient::new(
            self.addr,
            self.community.clone().into_bytes(),
            None,
            Some(self.timeout),
            0,
        )
        .await
        .map_err(|source| SnmpError::Session {
            host: self.host.clone(),
            source,
        })
    }

    /// Walk the ifIndex column and return every interface index, ascending.
    pub async fn discover_indices(&self) -> Result<Vec<u32>, SnmpError> {
        let client = self.open().await?;
        let bindings = client
            .walk(parse_oid(oid::IF_INDEX))
            .await
            .map_err(|source| SnmpError::Walk {
                host: self.host.clone(),
                table: "ifIndex",
                source,
            })?;

        let mut indices: Vec<u32> = bindings
            .values()
            .filter_map(|value| match value {
                ObjectValue::Integer(v) => u32::try_from(*v).ok(),
                _ => None,
            })
            .collect();
        indices.sort_unstable();
        indices.dedup();
        Ok(indices)
    }

    /// Walk ifEntry and ifXEntry and return every classifiable binding.
    ///
    /// The two walks are independent: when one fails the other's samples
    /// are still returned, so a truncated response degrades to "some
    /// columns did not advance this tick" instead of an empty tick. Only
    /// when both walks fail does the call error out.
    pub async fn sample_interfaces(&self) -> Result<Vec<InterfaceSample>, SnmpError> {
        let client = self.open().await?;
        let mut samples = Vec::new();

        let mut first_err = None;
        for (table, root) in [("ifEntry", oid::IF_ENTRY), ("ifXEntry", oid::IF_X_ENTRY)] {
            match client.walk(parse_oid(root)).await {
                Ok(bindings) => {
                    for (bound_oid, value) in &bindings {
                        match classify_binding(bound_oid, value) {
                            Some(sample) => samples.push(sample),
                            None => trace!(host = %self.host, oid = %bound_oid, "skipping binding"),
                        }
                    }
                }
                Err(source) => {
                    warn!(host = %self.host, table, error = %source, "table walk failed");
                    first_err.get_or_insert(SnmpError::Walk {
                        host: self.host.clone(),
                        table,
                        source,
                    });
                }
            }
        }

        match first_err {
            Some(err) if samples.is_empty() => Err(err),
            _ => Ok(samples),
        }
    }
}

fn parse_oid(literal: &str) -> ObjectIdentifier {
    literal.parse().expect("OID literals are well-formed")
}

/// Turn one walked binding into a classified sample, or `None` when the
/// column is uninteresting or the value shape is unusable.
fn classify_binding(bound_oid: &ObjectIdentifier, value: &ObjectValue) -> Option<InterfaceSample> {
    let (field, index) = oid::classify(bound_oid.as_slice())?;
    let value = match value {
        ObjectValue::Integer(v) => SampleValue::Int(i64::from(*v)),
        ObjectValue::Counter32(v) | ObjectValue::Unsigned32(v) | ObjectValue::TimeTicks(v) => {
            SampleValue::Int(i64::from(*v))
        }
        // The display math is i64; a counter beyond i64::MAX saturates
        // rather than going negative.
        ObjectValue::Counter64(v) => SampleValue::Int(i64::try_from(*v).unwrap_or(i64::MAX)),
        ObjectValue::String(bytes) => SampleValue::Text(String::from_utf8_lossy(bytes).into_owned()),
        _ => return None,
    };
    Some(InterfaceSample {
        field,
        index,
        value,
    })
}
