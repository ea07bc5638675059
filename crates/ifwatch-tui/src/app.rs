//! Application core — event loop, display state ownership, action
//! dispatch.
//!
//! Input handling and rendering both run on this task, so the display
//! state is single-writer-single-reader by construction and needs no
//! lock. Polling tasks only reach the app through `PollEvent`s, which
//! mark the screen dirty; the render tick folds any burst of them into
//! one draw.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

use ifwatch_core::{Classified, DeviceHandle, DeviceView, DisplayState, PollEvent, classify};

use crate::action::Action;
use crate::event::{Event, EventReader};
use crate::theme;
use crate::tui::Tui;
use crate::widgets::traffic_table;

/// Redraw pacing — plenty for second-granularity rates.
const RENDER_RATE: Duration = Duration::from_millis(200);

const PAGE_STEP: isize = 10;

/// Top-level application state and event loop.
pub struct App {
    /// UI-facing state: filter, unit, marks, down-interface visibility.
    display: DisplayState,
    /// Snapshot handles, in device registration order.
    devices: Vec<DeviceHandle>,
    /// Notifications from the polling tasks and the lifespan guard.
    poll_rx: mpsc::UnboundedReceiver<PollEvent>,
    /// Cursor position within the flattened display-order rows.
    selected: usize,
    filter_editing: bool,
    filter_input: Input,
    filter_error: Option<String>,
    help_visible: bool,
    running: bool,
    /// Something changed since the last draw.
    dirty: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(
        display: DisplayState,
        devices: Vec<DeviceHandle>,
        poll_rx: mpsc::UnboundedReceiver<PollEvent>,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            display,
            devices,
            poll_rx,
            selected: 0,
            filter_editing: false,
            filter_input: Input::default(),
            filter_error: None,
            help_visible: false,
            running: true,
            dirty: true,
            action_tx,
            action_rx,
        }
    }

    /// Run the main event loop. This is the heart of the TUI.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        let mut events = EventReader::new(RENDER_RATE);
        info!("event loop started");

        while self.running {
            // 1. Wait for the next terminal event or poll notification
            let action = tokio::select! {
                maybe_event = events.next() => {
                    let Some(event) = maybe_event else { break };
                    self.map_event(event)
                }
                maybe_poll = self.poll_rx.recv() => {
                    maybe_poll.map(|ev| match ev {
                        PollEvent::Updated { device } => Action::DeviceUpdated(device),
                        PollEvent::LifespanExpired => Action::LifespanExpired,
                    })
                }
            };
            if let Some(action) = action {
                self.action_tx.send(action)?;
            }

            // 2. Drain and process all queued actions
            let mut draw_requested = false;
            while let Ok(action) = self.action_rx.try_recv() {
                if action == Action::Render {
                    draw_requested = true;
                }
                self.process_action(&action);
            }

            // 3. Draw once per render tick, and only if something changed
            if draw_requested && self.dirty {
                tui.draw(|frame| self.render_frame(frame))?;
                self.dirty = false;
            }
        }

        events.stop();
        info!("event loop ended");
        Ok(())
    }

    /// Map a terminal event to an action.
    fn map_event(&mut self, event: Event) -> Option<Action> {
        match event {
            Event::Render => Some(Action::Render),
            Event::Resize(w, h) => Some(Action::Resize(w, h)),
            Event::Key(key) => self.handle_key_event(key),
        }
    }

    /// Map a key press to an action. The filter editor and the help
    /// overlay each capture the keyboard while open.
    fn handle_key_event(&mut self, key: KeyEvent) -> Option<Action> {
        if self.filter_editing {
            return match key.code {
                KeyCode::Enter => Some(Action::ApplyFilter(self.filter_input.value().to_owned())),
                KeyCode::Esc => Some(Action::CloseFilter),
                _ => {
                    let _ = self
                        .filter_input
                        .handle_event(&crossterm::event::Event::Key(key));
                    self.dirty = true;
                    None
                }
            };
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('h' | '?' | 'q') => Some(Action::ToggleHelp),
                _ => None,
            };
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(Action::Quit),
            (_, KeyCode::Char('q')) => Some(Action::Quit),

            (KeyModifiers::CONTROL, KeyCode::Char('d')) => Some(Action::PageDown),
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => Some(Action::PageUp),
            (_, KeyCode::Char('j') | KeyCode::Down) => Some(Action::CursorDown),
            (_, KeyCode::Char('k') | KeyCode::Up) => Some(Action::CursorUp),
            (_, KeyCode::Char('g')) => Some(Action::CursorTop),
            (_, KeyCode::Char('G')) => Some(Action::CursorBottom),

            (_, KeyCode::Char('d')) => Some(Action::ToggleShowDown),
            (_, KeyCode::Char('u')) => Some(Action::CycleUnitScale),
            (_, KeyCode::Char('p')) => Some(Action::ToggleRateKind),
            (_, KeyCode::Char('m')) => Some(Action::ToggleMark),
            (_, KeyCode::Char('/')) => Some(Action::OpenFilter),
            (_, KeyCode::Char('h' | '?')) => Some(Action::ToggleHelp),

            _ => None,
        }
    }

    /// Process a single action — every mutation of UI state lives here.
    fn process_action(&mut self, action: &Action) {
        match action {
            // The lifespan guard firing is equivalent to a user-issued quit.
            Action::Quit | Action::LifespanExpired => {
                self.running = false;
            }

            Action::Render => {}
            Action::Resize(_, _) => self.dirty = true,

            Action::CursorUp => self.move_cursor(-1),
            Action::CursorDown => self.move_cursor(1),
            Action::PageUp => self.move_cursor(-PAGE_STEP),
            Action::PageDown => self.move_cursor(PAGE_STEP),
            Action::CursorTop => {
                self.selected = 0;
                self.dirty = true;
            }
            Action::CursorBottom => {
                self.selected = self.classified().len().saturating_sub(1);
                self.dirty = true;
            }

            Action::ToggleShowDown => {
                self.display.toggle_show_down();
                self.clamp_cursor();
                self.dirty = true;
            }
            Action::CycleUnitScale => {
                self.display.cycle_unit_scale();
                self.dirty = true;
            }
            Action::ToggleRateKind => {
                self.display.toggle_rate_kind();
                self.dirty = true;
            }
            Action::ToggleMark => {
                self.toggle_mark_at_cursor();
                self.dirty = true;
            }

            Action::OpenFilter => {
                self.filter_editing = true;
                self.filter_input = Input::new(self.display.filter_expr().to_owned());
                self.dirty = true;
            }
            Action::CloseFilter => {
                self.filter_editing = false;
                self.dirty = true;
            }
            Action::ApplyFilter(expr) => {
                self.filter_editing = false;
                match self.display.set_filter(expr) {
                    Ok(()) => self.filter_error = None,
                    Err(e) => {
                        // Previous filter stays in effect.
                        warn!(pattern = expr.as_str(), error = %e, "filter rejected");
                        self.filter_error = Some(e.to_string());
                    }
                }
                self.clamp_cursor();
                self.dirty = true;
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
                self.dirty = true;
            }

            Action::DeviceUpdated(device) => {
                debug!(device = device.as_str(), "fresh samples");
                self.dirty = true;
            }
        }
    }

    /// Classify the current snapshots under the current display state.
    fn classified(&self) -> Classified {
        let views: Vec<Arc<DeviceView>> =
            self.devices.iter().map(DeviceHandle::latest).collect();
        classify(views.iter().map(Arc::as_ref), &self.display)
    }

    fn move_cursor(&mut self, delta: isize) {
        let rows = self.classified().len();
        if rows == 0 {
            self.selected = 0;
        } else {
            let current = isize::try_from(self.selected).unwrap_or(isize::MAX);
            let last = isize::try_from(rows - 1).unwrap_or(isize::MAX);
            self.selected = usize::try_from((current + delta).clamp(0, last)).unwrap_or(0);
        }
        self.dirty = true;
    }

    fn clamp_cursor(&mut self) {
        let rows = self.classified().len();
        self.selected = self.selected.min(rows.saturating_sub(1));
    }

    /// Mark or unmark the row under the cursor.
    fn toggle_mark_at_cursor(&mut self) {
        let classified = self.classified();
        let Some(row) = classified.rows().nth(self.selected) else {
            return;
        };
        let (device, descr) = (row.device.clone(), row.descr.clone());
        self.display.toggle_mark(&device, &descr);
        // The row just moved between groups; keep the cursor in range.
        self.clamp_cursor();
    }

    // ── Rendering ─────────────────────────────────────────────────

    fn render_frame(&mut self, frame: &mut Frame) {
        let classified = self.classified();
        self.selected = self.selected.min(classified.len().saturating_sub(1));

        let layout = Layout::vertical([
            Constraint::Min(1),    // traffic table
            Constraint::Length(1), // filter line
            Constraint::Length(1), // status bar
        ])
        .split(frame.area());

        traffic_table::render(frame, layout[0], &classified, self.selected);
        self.render_filter_line(frame, layout[1]);
        self.render_status_bar(frame, layout[2], &classified);

        if self.help_visible {
            render_help_overlay(frame, frame.area());
        }
    }

    fn render_filter_line(&self, frame: &mut Frame, area: Rect) {
        if self.filter_editing {
            let prompt = " filter> ";
            let line = Line::from(vec![
                Span::styled(prompt, theme::filter_active()),
                Span::raw(self.filter_input.value().to_owned()),
            ]);
            frame.render_widget(Paragraph::new(line), area);

            // Put the real cursor at the edit position.
            let x = area.x
                + u16::try_from(prompt.len() + self.filter_input.visual_cursor())
                    .unwrap_or(u16::MAX);
            frame.set_cursor_position(Position::new(x.min(area.right()), area.y));
            return;
        }

        let mut spans = vec![Span::styled(" filter: ", theme::hint())];
        if self.display.filter_expr().is_empty() {
            spans.push(Span::styled("(none)", theme::hint()));
        } else {
            spans.push(Span::styled(
                self.display.filter_expr().to_owned(),
                theme::row_matched(),
            ));
        }
        if let Some(err) = &self.filter_error {
            spans.push(Span::styled(format!("  ✗ {err}"), theme::filter_error()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect, classified: &Classified) {
        let summary = format!(
            " {} devices · {} rows ({} marked, {} matched) · {}",
            self.devices.len(),
            classified.len(),
            classified.marked.len(),
            classified.matched.len(),
            classified.unit_label,
        );
        let line = Line::from(vec![
            Span::styled(summary, theme::hint()),
            Span::styled("  │ h help  / filter  m mark  q quit", theme::hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Render the help overlay centered on screen.
fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = 46u16.min(area.width.saturating_sub(4));
    let height = 16u16.min(area.height.saturating_sub(4));
    let x = (area.width.saturating_sub(width)) / 2;
    let y = (area.height.saturating_sub(height)) / 2;
    let help_area = Rect::new(area.x + x, area.y + y, width, height);

    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Keys ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::row_matched());
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let entry = |keys: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {keys:<10}"), theme::row_matched()),
            Span::styled(what, theme::hint()),
        ])
    };
    let text = vec![
        Line::from(""),
        entry("j/k ↑/↓", "move cursor"),
        entry("Ctrl-d/u", "page down / up"),
        entry("g/G", "top / bottom"),
        entry("m", "mark / unmark interface"),
        entry("/", "narrow down with a regex"),
        entry("u", "cycle unit scale"),
        entry("p", "toggle bps / pps"),
        entry("d", "toggle down interfaces"),
        entry("h ?", "this help"),
        entry("q", "quit"),
        Line::from(""),
        Line::from(Span::styled("      Esc or h to close", theme::hint())),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}
