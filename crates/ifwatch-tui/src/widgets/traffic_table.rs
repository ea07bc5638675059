//! The traffic table — marked rows first, then filter matches, then the
//! rest, exactly as the classifier hands them over.

use ifwatch_core::{Classified, Row as TrafficRow};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::text::Text;
use ratatui::widgets::{Cell, Row, Table, TableState};

use crate::theme;
use crate::widgets::num_fmt::fmt_comma;
use crate::widgets::status;

fn right(value: i64) -> Cell<'static> {
    Cell::from(Text::from(fmt_comma(value)).right_aligned())
}

fn data_row(row: &TrafficRow) -> Row<'static> {
    Row::new(vec![
        Cell::from(row.device.clone()),
        Cell::from(row.descr.clone()),
        Cell::from(status::status_span(row.status)),
        right(row.rate_in),
        right(row.rate_out),
        right(row.errors_in),
        right(row.errors_out),
        right(row.discards_in),
        right(row.discards_out),
        Cell::from(row.alias.clone()),
    ])
}

/// Render the classified rows as one table; `selected` is the cursor
/// position within the flattened display order.
pub fn render(frame: &mut Frame, area: Rect, classified: &Classified, selected: usize) {
    let unit = classified.unit_label;
    let header = Row::new(vec![
        Cell::from("Name"),
        Cell::from("I/F"),
        Cell::from("Stat"),
        Cell::from(Text::from(format!("IN[{unit}]")).right_aligned()),
        Cell::from(Text::from(format!("OUT[{unit}]")).right_aligned()),
        Cell::from(Text::from("InErr").right_aligned()),
        Cell::from(Text::from("OutErr").right_aligned()),
        Cell::from(Text::from("InDis").right_aligned()),
        Cell::from(Text::from("OutDis").right_aligned()),
        Cell::from("Description"),
    ])
    .style(theme::table_header());

    let mut rows = Vec::with_capacity(classified.len());
    for row in &classified.marked {
        rows.push(data_row(row).style(theme::row_marked()));
    }
    for row in &classified.matched {
        rows.push(data_row(row).style(theme::row_matched()));
    }
    for row in &classified.other {
        rows.push(data_row(row).style(theme::row_other()));
    }

    let widths = [
        Constraint::Length(14),     // Name
        Constraint::Length(16),     // I/F
        Constraint::Length(7),      // Stat
        Constraint::Min(12),        // IN
        Constraint::Min(12),        // OUT
        Constraint::Length(8),      // InErr
        Constraint::Length(8),      // OutErr
        Constraint::Length(8),      // InDis
        Constraint::Length(8),      // OutDis
        Constraint::Min(10),        // Description (alias)
    ];

    let mut state = TableState::default();
    if !classified.is_empty() {
        state.select(Some(selected.min(classified.len() - 1)));
    }

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .row_highlight_style(theme::row_selected());

    frame.render_stateful_widget(table, area, &mut state);
}
