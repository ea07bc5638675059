// ── Device model ──
//
// One polled endpoint and its fixed set of interface records. Discovery
// happens once, before polling starts; a device that fails discovery is
// dropped by the caller and never retried. Refreshes run for the rest of
// the process, one in flight at a time, driven by the scheduler.

use std::collections::BTreeMap;
use std::future::Future;

use chrono::Utc;
use ifwatch_snmp::{InterfaceSample, SnmpError, SnmpTarget};
use tracing::debug;

use crate::error::CoreError;
use crate::interface::{IfStatus, Interface};

/// The query collaborator a device samples through.
///
/// The wire protocol stays behind this seam: implementations return
/// already-classified samples, never OIDs or PDUs.
pub trait InterfaceSource: Send + Sync {
    /// Enumerate the interface indices present on the endpoint.
    fn discover_indices(&self) -> impl Future<Output = Result<Vec<u32>, SnmpError>> + Send;

    /// Sample every interface-table value of interest.
    fn sample_interfaces(
        &self,
    ) -> impl Future<Output = Result<Vec<InterfaceSample>, SnmpError>> + Send;
}

impl InterfaceSource for SnmpTarget {
    async fn discover_indices(&self) -> Result<Vec<u32>, SnmpError> {
        SnmpTarget::discover_indices(self).await
    }

    async fn sample_interfaces(&self) -> Result<Vec<InterfaceSample>, SnmpError> {
        SnmpTarget::sample_interfaces(self).await
    }
}

/// One polled network endpoint with its interface records, keyed by
/// interface index in ascending order.
#[derive(Debug)]
pub struct Device<S> {
    name: String,
    source: S,
    interfaces: BTreeMap<u32, Interface>,
}

impl<S: InterfaceSource> Device<S> {
    /// Discover the endpoint's interfaces and allocate one zeroed record
    /// per index. The index set is fixed from here on.
    pub async fn discover(name: impl Into<String>, source: S) -> Result<Self, CoreError> {
        let name = name.into();
        let indices = source
            .discover_indices()
            .await
            .map_err(|source| CoreError::Connect {
                device: name.clone(),
                source,
            })?;
        if indices.is_empty() {
            return Err(CoreError::Discovery { device: name });
        }

        let interfaces = indices
            .into_iter()
            .map(|index| (index, Interface::new(index)))
            .collect();
        Ok(Self {
            name,
            source,
            interfaces,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Re-sample every interface and apply the results.
    ///
    /// All samples of one refresh share a single timestamp, so every
    /// counter of an interface derives its rate over the same window.
    /// Samples for undiscovered indices are ignored (the interface set is
    /// fixed), and samples whose value shape does not fit their field are
    /// dropped; either way the refresh keeps going. A failed walk leaves
    /// already-applied counters standing — "some counters did not advance
    /// this tick" is an accepted degraded state.
    pub async fn refresh(&mut self) -> Result<(), CoreError> {
        let samples = self
            .source
            .sample_interfaces()
            .await
            .map_err(|source| CoreError::Connect {
                device: self.name.clone(),
                source,
            })?;

        let at = Utc::now();
        for InterfaceSample {
            field,
            index,
            value,
        } in samples
        {
            let Some(interface) = self.interfaces.get_mut(&index) else {
                debug!(device = %self.name, index, "sample for undiscovered interface");
                continue;
            };
            if let Err(e) = interface.apply(field, &value, at) {
                debug!(device = %self.name, error = %e, "dropping sample");
            }
        }
        Ok(())
    }

    /// Immutable snapshot of the device for classification and display,
    /// interfaces in ascending index order.
    pub fn view(&self) -> DeviceView {
        DeviceView {
            name: self.name.clone(),
            ports: self.interfaces.values().map(PortView::from).collect(),
        }
    }

    #[cfg(test)]
    pub(crate) fn interface(&self, index: u32) -> Option<&Interface> {
        self.interfaces.get(&index)
    }
}

/// Display-facing snapshot of one interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortView {
    pub index: u32,
    pub descr: String,
    pub alias: String,
    pub speed: i64,
    pub admin_status: IfStatus,
    pub oper_status: IfStatus,
    /// Octet rates, bytes per second.
    pub octets_in_rate: i64,
    pub octets_out_rate: i64,
    /// Unicast packet rates, packets per second.
    pub pkts_in_rate: i64,
    pub pkts_out_rate: i64,
    /// Per-window deltas, not rates.
    pub errors_in: i64,
    pub errors_out: i64,
    pub discards_in: i64,
    pub discards_out: i64,
}

impl From<&Interface> for PortView {
    fn from(ifr: &Interface) -> Self {
        Self {
            index: ifr.index,
            descr: ifr.descr.clone(),
            alias: ifr.alias.clone(),
            speed: ifr.speed,
            admin_status: ifr.admin_status,
            oper_status: ifr.oper_status,
            octets_in_rate: ifr.in_octets.rate(),
            octets_out_rate: ifr.out_octets.rate(),
            pkts_in_rate: ifr.in_ucast.rate(),
            pkts_out_rate: ifr.out_ucast.rate(),
            errors_in: ifr.in_errors.diff(),
            errors_out: ifr.out_errors.diff(),
            discards_in: ifr.in_discards.diff(),
            discards_out: ifr.out_discards.diff(),
        }
    }
}

/// Display-facing snapshot of one device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceView {
    pub name: String,
    pub ports: Vec<PortView>,
}


#[cfg(test)]
mod tests {
    use ifwatch_snmp::InterfaceField;
    use pretty_assertions::assert_eq;

    use super::testing::{StubSource, int_sample, text_sample};
    use super::*;

    #[tokio::test]
    async fn discovery_allocates_zeroed_records_in_index_order() {
        let source = StubSource::with_indices(&[9, 1, 4]);
        let device = Device::discover("r1", source).await.expect("discovers");

        let view = device.view();
        assert_eq!(view.name, "r1");
        let indices: Vec<u32> = view.ports.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 4, 9]);
        assert!(view.ports.iter().all(|p| p.octets_in_rate == 0));
    }

    #[tokio::test]
    async fn failed_discovery_is_a_connect_error() {
        let source = StubSource {
            fail_discovery: true,
            ..StubSource::default()
        };
        let err = Device::discover("r1", source).await.expect_err("refused");
        assert!(matches!(err, CoreError::Connect { .. }));
    }

    #[tokio::test]
    async fn empty_discovery_is_fatal_for_the_device() {
        let source = StubSource::with_indices(&[]);
        let err = Device::discover("r1", source).await.expect_err("no interfaces");
        assert!(matches!(err, CoreError::Discovery { .. }));
    }

    #[tokio::test]
    async fn refresh_dispatches_samples_by_field_and_index() {
        let mut source = StubSource::with_indices(&[1, 2]);
        source.samples = vec![
            text_sample(InterfaceField::Descr, 1, "eth0"),
            text_sample(InterfaceField::Alias, 1, "wan"),
            int_sample(InterfaceField::OperStatus, 1, 1),
            int_sample(InterfaceField::InOctets, 1, 10_000),
            int_sample(InterfaceField::OutOctets, 1, 2_000),
            int_sample(InterfaceField::OperStatus, 2, 2),
            int_sample(InterfaceField::InErrors, 2, 5),
        ];
        let mut device = Device::discover("r1", source).await.expect("discovers");
        device.refresh().await.expect("refreshes");

        let eth0 = device.interface(1).expect("known index");
        assert_eq!(eth0.descr, "eth0");
        assert_eq!(eth0.alias, "wan");
        assert_eq!(eth0.oper_status, IfStatus::Up);
        assert_eq!(eth0.in_octets.last(), 10_000);
        assert_eq!(eth0.out_octets.last(), 2_000);

        let second = device.interface(2).expect("known index");
        assert_eq!(second.oper_status, IfStatus::Down);
        assert_eq!(second.in_errors.last(), 5);
    }

    #[tokio::test]
    async fn samples_for_undiscovered_indices_are_ignored() {
        let mut source = StubSource::with_indices(&[1]);
        source.samples = vec![
            int_sample(InterfaceField::InOctets, 1, 100),
            int_sample(InterfaceField::InOctets, 99, 42),
        ];
        let mut device = Device::discover("r1", source).await.expect("discovers");
        device.refresh().await.expect("refreshes");

        assert_eq!(device.view().ports.len(), 1);
        assert_eq!(device.interface(1).expect("known index").in_octets.last(), 100);
        assert!(device.interface(99).is_none());
    }

    #[tokio::test]
    async fn malformed_sample_is_dropped_and_refresh_continues() {
        let mut source = StubSource::with_indices(&[1]);
        source.samples = vec![
            text_sample(InterfaceField::InOctets, 1, "not a number"),
            int_sample(InterfaceField::OutOctets, 1, 77),
        ];
        let mut device = Device::discover("r1", source).await.expect("discovers");
        device.refresh().await.expect("refresh survives bad samples");

        let ifr = device.interface(1).expect("known index");
        assert_eq!(ifr.in_octets.last(), 0);
        assert_eq!(ifr.out_octets.last(), 77);
    }

    #[tokio::test]
    async fn failed_refresh_reports_connect_and_keeps_records() {
        let source = StubSource {
            indices: vec![1],
            fail_sampling: true,
            ..StubSource::default()
        };
        let mut device = Device::discover("r1", source).await.expect("discovers");
        let err = device.refresh().await.expect_err("unreachable");
        assert!(matches!(err, CoreError::Connect { .. }));
        // The record set never shrinks; the display shows stale zeros.
        assert_eq!(device.view().ports.len(), 1);
    }
}
