// ifwatch-snmp: SNMPv2c query layer between the wire and the sampling engine.
//
// Walks the IF-MIB interface tables of one device and hands back samples
// already classified by column and interface index. Consumers never see
// OIDs, PDUs, or any other wire-format detail.

pub mod error;
pub mod oid;
pub mod session;

pub use error::SnmpError;
pub use oid::InterfaceField;
pub use session::{InterfaceSample, SampleValue, SnmpTarget};
