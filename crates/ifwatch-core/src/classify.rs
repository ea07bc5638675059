// ── Row classification ──
//
// Partitions every visible interface into marked / filter-matched / other
// for one redraw. Devices are visited in registration order and
// interfaces in ascending index order, so repeated runs over the same
// state produce identical output and the table never jitters.

use crate::device::DeviceView;
use crate::interface::IfStatus;
use crate::state::{DisplayState, RateKind};

/// One display row, rates already converted to the active unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub device: String,
    pub descr: String,
    pub status: IfStatus,
    pub rate_in: i64,
    pub rate_out: i64,
    pub errors_in: i64,
    pub errors_out: i64,
    pub discards_in: i64,
    pub discards_out: i64,
    pub alias: String,
}

/// The three row groups of one redraw, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    pub marked: Vec<Row>,
    pub matched: Vec<Row>,
    pub other: Vec<Row>,
    pub unit_label: &'static str,
}

impl Classified {
    /// All rows in on-screen order: marked, then matched, then other.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.marked
            .iter()
            .chain(self.matched.iter())
            .chain(self.other.iter())
    }

    pub fn len(&self) -> usize {
        self.marked.len() + self.matched.len() + self.other.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition every visible interface of every device. `views` must come
/// in device registration order.
///
/// Marking wins over filter matching, so an interface that is both shows
/// up once, in the marked group.
pub fn classify<'a, I>(views: I, state: &DisplayState) -> Classified
where
    I: IntoIterator<Item = &'a DeviceView>,
{
    let mut out = Classified {
        unit_label: state.unit().label(),
        ..Classified::default()
    };

    for view in views {
        for port in &view.ports {
            if !state.show_down() && port.oper_status == IfStatus::Down {
                continue;
            }

            let (rate_in, rate_out) = match state.rate_kind() {
                RateKind::Throughput => (port.octets_in_rate, port.octets_out_rate),
                RateKind::Packets => (port.pkts_in_rate, port.pkts_out_rate),
            };
            let row = Row {
                device: view.name.clone(),
                descr: port.descr.clone(),
                status: port.oper_status,
                rate_in: state.unit().convert(rate_in),
                rate_out: state.unit().convert(rate_out),
                errors_in: port.errors_in,
                errors_out: port.errors_out,
                discards_in: port.discards_in,
                discards_out: port.discards_out,
                alias: port.alias.clone(),
            };

            if state.is_marked(&view.name, &port.descr) {
                out.marked.push(row);
            } else if state
                .filter()
                .is_match(&format!("{} {}", port.descr, port.alias))
            {
                out.matched.push(row);
            } else {
                out.other.push(row);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::device::PortView;
    use crate::state::Unit;

    use super::*;

    fn port(index: u32, descr: &str, alias: &str, oper: IfStatus) -> PortView {
        PortView {
            index,
            descr: descr.into(),
            alias: alias.into(),
            speed: 0,
            admin_status: IfStatus::Up,
            oper_status: oper,
            octets_in_rate: 1024,
            octets_out_rate: 2048,
            pkts_in_rate: 10,
            pkts_out_rate: 20,
            errors_in: 1,
            errors_out: 2,
            discards_in: 3,
            discards_out: 4,
        }
    }

    fn fleet() -> Vec<DeviceView> {
        vec![
            DeviceView {
                name: "r1".into(),
                ports: vec![
                    port(1, "ge-0/0/1", "uplink", IfStatus::Up),
                    port(2, "ge-0/0/2", "", IfStatus::Down),
                ],
            },
            DeviceView {
                name: "r2".into(),
                ports: vec![
                    port(1, "xe-0/0/0", "core", IfStatus::Up),
                    port(3, "lo0", "", IfStatus::Up),
                ],
            },
        ]
    }

    fn keys(rows: &[Row]) -> Vec<(String, String)> {
        rows.iter()
            .map(|r| (r.device.clone(), r.descr.clone()))
            .collect()
    }

    #[test]
    fn partitions_in_device_then_index_order() {
        let mut state = DisplayState::new("^ge-", Unit::Bps).expect("valid filter");
        state.toggle_mark("r2", "lo0");
        let c = classify(&fleet(), &state);

        assert_eq!(keys(&c.marked), vec![("r2".into(), "lo0".into())]);
        assert_eq!(
            keys(&c.matched),
            vec![
                ("r1".into(), "ge-0/0/1".into()),
                ("r1".into(), "ge-0/0/2".into()),
            ]
        );
        assert_eq!(keys(&c.other), vec![("r2".into(), "xe-0/0/0".into())]);
    }

    #[test]
    fn repeated_classification_is_deterministic() {
        let mut state = DisplayState::new("core", Unit::Kbps).expect("valid filter");
        state.toggle_mark("r1", "ge-0/0/1");
        let views = fleet();
        let first = classify(&views, &state);
        let second = classify(&views, &state);
        assert_eq!(first, second);
    }

    #[test]
    fn marking_wins_over_filter_matching() {
        let mut state = DisplayState::new("uplink", Unit::Bps).expect("valid filter");
        state.toggle_mark("r1", "ge-0/0/1");
        let c = classify(&fleet(), &state);

        // Present exactly once, in the marked group.
        assert_eq!(keys(&c.marked), vec![("r1".into(), "ge-0/0/1".into())]);
        assert!(!c.matched.iter().any(|r| r.descr == "ge-0/0/1"));
        assert_eq!(c.len(), 4);
    }

    #[test]
    fn down_interfaces_are_suppressed_and_reappear() {
        let mut state = DisplayState::new("", Unit::Bps).expect("empty filter");
        state.toggle_show_down();
        let c = classify(&fleet(), &state);
        assert_eq!(c.len(), 3);
        assert!(c.rows().all(|r| r.status != IfStatus::Down));

        state.toggle_show_down();
        let c = classify(&fleet(), &state);
        assert_eq!(c.len(), 4);
        assert!(c.rows().any(|r| r.status == IfStatus::Down));
    }

    #[test]
    fn empty_filter_never_matches_even_blank_interfaces() {
        let state = DisplayState::new("", Unit::Bps).expect("empty filter");
        let views = vec![DeviceView {
            name: "r1".into(),
            ports: vec![port(1, "", "", IfStatus::Up)],
        }];
        let c = classify(&views, &state);
        assert!(c.matched.is_empty());
        assert_eq!(c.other.len(), 1);
    }

    #[test]
    fn filter_sees_description_and_alias() {
        let state = DisplayState::new("core", Unit::Bps).expect("valid filter");
        let c = classify(&fleet(), &state);
        // "core" only appears in r2/xe-0/0/0's alias.
        assert_eq!(keys(&c.matched), vec![("r2".into(), "xe-0/0/0".into())]);
    }

    #[test]
    fn throughput_rows_convert_octet_rates() {
        let state = DisplayState::new("", Unit::Kbps).expect("empty filter");
        let c = classify(&fleet(), &state);
        let row = c.rows().next().expect("at least one row");
        // 1024 B/s -> 8 kbit/s, 2048 B/s -> 16 kbit/s.
        assert_eq!(row.rate_in, 8);
        assert_eq!(row.rate_out, 16);
        assert_eq!(c.unit_label, "kbps");
    }

    #[test]
    fn packet_rows_use_unicast_rates() {
        let mut state = DisplayState::new("", Unit::Bps).expect("empty filter");
        state.toggle_rate_kind();
        let c = classify(&fleet(), &state);
        let row = c.rows().next().expect("at least one row");
        assert_eq!(row.rate_in, 10);
        assert_eq!(row.rate_out, 20);
        assert_eq!(c.unit_label, "pps");
    }

    #[test]
    fn deltas_ride_along_unconverted() {
        let state = DisplayState::new("", Unit::Mbps).expect("empty filter");
        let c = classify(&fleet(), &state);
        let row = c.rows().next().expect("at least one row");
        assert_eq!(
            (row.errors_in, row.errors_out, row.discards_in, row.discards_out),
            (1, 2, 3, 4)
        );
    }
}
