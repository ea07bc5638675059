//! Palette and semantic styling for the dashboard.

use ratatui::style::{Color, Modifier, Style};

// ── Palette ───────────────────────────────────────────────────────────

pub const HEADER_GREEN: Color = Color::Rgb(80, 200, 120); // #50c878
pub const MARK_AMBER: Color = Color::Rgb(255, 191, 71); // #ffbf47
pub const MATCH_CYAN: Color = Color::Rgb(102, 217, 239); // #66d9ef
pub const ERROR_RED: Color = Color::Rgb(249, 90, 97); // #f95a61
pub const DIM_GRAY: Color = Color::Rgb(110, 118, 129); // #6e7681
pub const TEXT_GRAY: Color = Color::Rgb(201, 209, 217); // #c9d1d9
pub const BG_HIGHLIGHT: Color = Color::Rgb(33, 38, 45); // #21262d

// ── Semantic styles ───────────────────────────────────────────────────

/// Table header row.
pub fn table_header() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(HEADER_GREEN)
        .add_modifier(Modifier::BOLD)
}

/// Operator-marked rows — always surfaced first.
pub fn row_marked() -> Style {
    Style::default().fg(MARK_AMBER).add_modifier(Modifier::BOLD)
}

/// Rows matching the narrow-down pattern.
pub fn row_matched() -> Style {
    Style::default().fg(MATCH_CYAN)
}

/// Everything else.
pub fn row_other() -> Style {
    Style::default().fg(TEXT_GRAY)
}

/// The row under the cursor.
pub fn row_selected() -> Style {
    Style::default().bg(BG_HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Key legend and other secondary text.
pub fn hint() -> Style {
    Style::default().fg(DIM_GRAY)
}

/// The filter prompt while editing.
pub fn filter_active() -> Style {
    Style::default().fg(MATCH_CYAN).add_modifier(Modifier::BOLD)
}

/// Filter rejection notice.
pub fn filter_error() -> Style {
    Style::default().fg(ERROR_RED)
}
