use {
    crate::{
        dashboard::Dashboard,
        profile::{self, REQUIRED_ATTRIBUTES},
        record::{EditValue, ObservationRecord},
        simulation::SimulationHandle,
        ui::layout::{render_layout, View},
    },
    crossterm::event::{Event, KeyCode, KeyEventKind},
    ratatui::{backend::CrosstermBackend, Terminal},
    std::time::Duration,
};

const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Input as the UI has edited it, ahead of the published snapshot
///
/// Key presses step from here rather than from the snapshot, which lags
/// until the simulation task has applied the queued edits.
pub struct EditDraft {
    input: ObservationRecord,
}

impl EditDraft {
    pub fn new(input: ObservationRecord) -> Self {
        Self { input }
    }

    pub fn input(&self) -> &ObservationRecord {
        &self.input
    }

    /// Step `attribute` one notch and return the edit to send
    pub fn step(&mut self, attribute: &str, direction: i32) -> Option<EditValue> {
        let value = profile::step_value(attribute, self.input.get(attribute), direction)?;
        profile::apply_edit(&mut self.input, attribute, value.clone());
        Some(value)
    }

    pub fn reset(&mut self) {
        self.input = profile::default_profile();
    }
}

/// Runs `restore` when dropped, so every exit path leaves the terminal usable
struct RestoreGuard {
    restore: fn() -> std::io::Result<()>,
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        if let Err(e) = (self.restore)() {
            log::error!("Failed to restore terminal: {}", e);
        }
    }
}

fn restore_terminal() -> std::io::Result<()> {
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    crossterm::terminal::disable_raw_mode()
}

/// Run the TUI event loop
///
/// Keyboard edits go to the simulation task through `handle`; every frame
/// renders the latest published snapshot. Returns when the user quits.
pub async fn run_ui(handle: SimulationHandle, mut dashboard: Dashboard) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = std::io::stdout();
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    crossterm::terminal::enable_raw_mode()?;
    let _restore = RestoreGuard {
        restore: restore_terminal,
    };

    // Alternate screen keeps stderr logs out of the dashboard
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::cursor::Hide
    )?;

    terminal.clear()?;

    let mut selected = 0usize;
    let mut draft = EditDraft::new(handle.snapshot().await.input);

    loop {
        if crossterm::event::poll(REFRESH_INTERVAL)? {
            if let Event::Key(key) = crossterm::event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Up => {
                        selected = (selected + REQUIRED_ATTRIBUTES.len() - 1) % REQUIRED_ATTRIBUTES.len();
                    }
                    KeyCode::Down => {
                        selected = (selected + 1) % REQUIRED_ATTRIBUTES.len();
                    }
                    KeyCode::Left | KeyCode::Right => {
                        let direction = if key.code == KeyCode::Right { 1 } else { -1 };
                        let attribute = REQUIRED_ATTRIBUTES[selected];
                        if let Some(value) = draft.step(attribute, direction) {
                            handle.edit(attribute, value).await;
                        }
                    }
                    KeyCode::Char('g') => dashboard.cycle_group_key(1),
                    KeyCode::Char('G') => dashboard.cycle_group_key(-1),
                    KeyCode::Char('s') => dashboard.cycle_sort_policy(),
                    KeyCode::Char('r') => {
                        draft.reset();
                        handle.reset().await;
                    }
                    _ => {}
                }
            }
        }

        {
            let snapshot = handle.shared_snapshot();
            let state = snapshot.read().await;
            let view = View {
                simulation: &state,
                dashboard: &dashboard,
                selected,
            };
            let area = terminal.size()?;
            terminal.draw(|f| render_layout(f, area, &view))?;
        }
    }

    Ok(())
}
