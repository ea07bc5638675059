// ── Interface record ──
//
// One network interface's identity, status, and traffic counters. The
// record is allocated at discovery and lives as long as its device;
// individual fields lag until a sample populates them.

use std::fmt;

use chrono::{DateTime, Utc};
use ifwatch_snmp::{InterfaceField, SampleValue};

use crate::counter::Counter;
use crate::error::CoreError;

/// Administrative or operational interface status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IfStatus {
    #[default]
    Unknown,
    Up,
    Down,
}

impl IfStatus {
    /// IF-MIB status codes: 1 is up, 2 is down, everything else
    /// (testing, dormant, notPresent, lowerLayerDown, garbage) is Unknown.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Up,
            2 => Self::Down,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for IfStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "-",
            Self::Up => "up",
            Self::Down => "down",
        })
    }
}

/// One interface: identity plus the fixed set of counters.
#[derive(Debug, Clone, Default)]
pub struct Interface {
    pub index: u32,
    pub descr: String,
    pub alias: String,
    pub speed: i64,
    pub admin_status: IfStatus,
    pub oper_status: IfStatus,
    pub in_octets: Counter,
    pub out_octets: Counter,
    pub in_ucast: Counter,
    pub out_ucast: Counter,
    pub in_discards: Counter,
    pub out_discards: Counter,
    pub in_errors: Counter,
    pub out_errors: Counter,
}

impl Interface {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Apply one classified sample to the matching field.
    ///
    /// A value whose shape does not fit the field is rejected so the
    /// caller can drop it and keep going; the record is left untouched.
    pub fn apply(
        &mut self,
        field: InterfaceField,
        value: &SampleValue,
        at: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        match (field, value) {
            (InterfaceField::Descr, SampleValue::Text(text)) => {
                self.descr = text.clone();
            }
            (InterfaceField::Alias, SampleValue::Text(text)) => {
                self.alias = text.clone();
            }
            (InterfaceField::Speed, SampleValue::Int(v)) => {
                self.speed = *v;
            }
            (InterfaceField::AdminStatus, SampleValue::Int(code)) => {
                self.admin_status = IfStatus::from_code(*code);
            }
            (InterfaceField::OperStatus, SampleValue::Int(code)) => {
                self.oper_status = IfStatus::from_code(*code);
            }
            (InterfaceField::InOctets, SampleValue::Int(v)) => self.in_octets.update(*v, at),
            (InterfaceField::OutOctets, SampleValue::Int(v)) => self.out_octets.update(*v, at),
            (InterfaceField::InUcastPkts, SampleValue::Int(v)) => self.in_ucast.update(*v, at),
            (InterfaceField::OutUcastPkts, SampleValue::Int(v)) => self.out_ucast.update(*v, at),
            (InterfaceField::InDiscards, SampleValue::Int(v)) => self.in_discards.update(*v, at),
            (InterfaceField::OutDiscards, SampleValue::Int(v)) => self.out_discards.update(*v, at),
            (InterfaceField::InErrors, SampleValue::Int(v)) => self.in_errors.update(*v, at),
            (InterfaceField::OutErrors, SampleValue::Int(v)) => self.out_errors.update(*v, at),
            (field, SampleValue::Int(_)) => {
                return Err(CoreError::SampleDecode {
                    field,
                    index: self.index,
                    got: "an integer",
                    expected: "text",
                });
            }
            (field, SampleValue::Text(_)) => {
                return Err(CoreError::SampleDecode {
                    field,
                    index: self.index,
                    got: "text",
                    expected: "an integer",
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).single().expect("valid timestamp")
    }

    #[test]
    fn status_codes_map_without_crashing() {
        assert_eq!(IfStatus::from_code(1), IfStatus::Up);
        assert_eq!(IfStatus::from_code(2), IfStatus::Down);
        assert_eq!(IfStatus::from_code(3), IfStatus::Unknown);
        assert_eq!(IfStatus::from_code(7), IfStatus::Unknown);
        assert_eq!(IfStatus::from_code(-1), IfStatus::Unknown);
    }

    #[test]
    fn applies_identity_and_status_fields() {
        let mut ifr = Interface::new(3);
        ifr.apply(
            InterfaceField::Descr,
            &SampleValue::Text("ge-0/0/3".into()),
            now(),
        )
        .expect("descr applies");
        ifr.apply(
            InterfaceField::Alias,
            &SampleValue::Text("uplink".into()),
            now(),
        )
        .expect("alias applies");
        ifr.apply(InterfaceField::Speed, &SampleValue::Int(1_000_000_000), now())
            .expect("speed applies");
        ifr.apply(InterfaceField::OperStatus, &SampleValue::Int(1), now())
            .expect("status applies");

        assert_eq!(ifr.descr, "ge-0/0/3");
        assert_eq!(ifr.alias, "uplink");
        assert_eq!(ifr.speed, 1_000_000_000);
        assert_eq!(ifr.oper_status, IfStatus::Up);
    }

    #[test]
    fn applies_counters_to_the_named_field_only() {
        let mut ifr = Interface::new(1);
        ifr.apply(InterfaceField::InOctets, &SampleValue::Int(4_000), now())
            .expect("counter applies");
        assert_eq!(ifr.in_octets.last(), 4_000);
        assert_eq!(ifr.out_octets.last(), 0);
    }

    #[test]
    fn mismatched_value_shape_is_rejected() {
        let mut ifr = Interface::new(1);
        let err = ifr
            .apply(InterfaceField::InOctets, &SampleValue::Text("junk".into()), now())
            .expect_err("text cannot feed a counter");
        assert!(matches!(err, CoreError::SampleDecode { .. }));
        // The counter never advanced.
        assert_eq!(ifr.in_octets.last(), 0);

        let err = ifr
            .apply(InterfaceField::Descr, &SampleValue::Int(9), now())
            .expect_err("an integer cannot feed a description");
        assert!(matches!(err, CoreError::SampleDecode { .. }));
        assert_eq!(ifr.descr, "");
    }
}
