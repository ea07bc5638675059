//! All possible UI actions. Actions are the sole mechanism for state
//! mutation.

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Render,
    Resize(u16, u16),

    // ── Cursor ─────────────────────────────────────────────────────
    CursorUp,
    CursorDown,
    CursorTop,
    CursorBottom,
    PageUp,
    PageDown,

    // ── Display state ──────────────────────────────────────────────
    ToggleShowDown,
    CycleUnitScale,
    ToggleRateKind,
    ToggleMark,

    // ── Filter line ────────────────────────────────────────────────
    OpenFilter,
    CloseFilter,
    ApplyFilter(String),

    // ── Help overlay ───────────────────────────────────────────────
    ToggleHelp,

    // ── From the polling tasks ─────────────────────────────────────
    DeviceUpdated(String),
    LifespanExpired,
}
