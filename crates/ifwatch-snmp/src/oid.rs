// ── IF-MIB column layout ──
//
// Walked OIDs have the shape  <table entry> . <column> . <ifIndex>.
// Classification works on the numeric sub-identifier slice; no string
// matching against dotted OIDs anywhere.

/// ifIndex column, walked once at discovery: 1.3.6.1.2.1.2.2.1.1
pub(crate) const IF_INDEX: &str = "1.3.6.1.2.1.2.2.1.1";

/// ifEntry: 1.3.6.1.2.1.2.2.1 — status, discard and error columns.
pub(crate) const IF_ENTRY: &str = "1.3.6.1.2.1.2.2.1";
const IF_ENTRY_ARCS: &[u32] = &[1, 3, 6, 1, 2, 1, 2, 2, 1];

/// ifXEntry: 1.3.6.1.2.1.31.1.1.1 — 64-bit HC counters, alias.
pub(crate) const IF_X_ENTRY: &str = "1.3.6.1.2.1.31.1.1.1";
const IF_X_ENTRY_ARCS: &[u32] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1];

/// Semantic meaning of one walked interface-table value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterfaceField {
    Descr,
    Alias,
    Speed,
    AdminStatus,
    OperStatus,
    InOctets,
    OutOctets,
    InUcastPkts,
    OutUcastPkts,
    InDiscards,
    OutDiscards,
    InErrors,
    OutErrors,
}

/// Map an ifEntry column number to its field.
fn if_entry_field(column: u32) -> Option<InterfaceField> {
    match column {
        2 => Some(InterfaceField::Descr),
        5 => Some(InterfaceField::Speed),
        7 => Some(InterfaceField::AdminStatus),
        8 => Some(InterfaceField::OperStatus),
        13 => Some(InterfaceField::InDiscards),
        14 => Some(InterfaceField::InErrors),
        19 => Some(InterfaceField::OutDiscards),
        20 => Some(InterfaceField::OutErrors),
        _ => None,
    }
}

/// Map an ifXEntry column number to its field. Octet and packet rates use
/// the HC (64-bit) columns, as the 32-bit ones wrap within seconds on
/// 10G+ links.
fn if_x_entry_field(column: u32) -> Option<InterfaceField> {
    match column {
        6 => Some(InterfaceField::InOctets),
        7 => Some(InterfaceField::InUcastPkts),
        10 => Some(InterfaceField::OutOctets),
        11 => Some(InterfaceField::OutUcastPkts),
        18 => Some(InterfaceField::Alias),
        _ => None,
    }
}

/// Classify one walked OID into `(field, interface index)`.
///
/// Returns `None` for anything outside the columns of interest — callers
/// skip those bindings.
pub(crate) fn classify(arcs: &[u32]) -> Option<(InterfaceField, u32)> {
    let (base, field_of) = if arcs.starts_with(IF_X_ENTRY_ARCS) {
        (IF_X_ENTRY_ARCS, if_x_entry_field as fn(u32) -> _)
    } else if arcs.starts_with(IF_ENTRY_ARCS) {
        (IF_ENTRY_ARCS, if_entry_field as fn(u32) -> _)
    } else {
        return None;
    };

    // Exactly column + index past the entry base.
    let &[column, index] = &arcs[base.len()..] else {
        return None;
    };
    Some((field_of(column)?, index))
}
