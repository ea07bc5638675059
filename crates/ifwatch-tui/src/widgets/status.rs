//! Interface status cell — ●/○ with color mapping.

use ifwatch_core::IfStatus;
use ratatui::style::Style;
use ratatui::text::Span;

use crate::theme;

/// Returns a styled `Span` with the status dot and label.
pub fn status_span(status: IfStatus) -> Span<'static> {
    let (text, color) = match status {
        IfStatus::Up => ("● up", theme::HEADER_GREEN),
        IfStatus::Down => ("○ down", theme::ERROR_RED),
        IfStatus::Unknown => ("? -", theme::DIM_GRAY),
    };
    Span::styled(text, Style::default().fg(color))
}
