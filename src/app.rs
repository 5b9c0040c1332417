use crate::backend::BackendClient;
use crate::config::Config;
use crate::ui::conversation::{ConversationManager, manager::ConversationAction};
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

/// Run the chat interface until the user quits.
///
/// The startup history fetch is kicked off before the first draw; its
/// outcome (or silent failure) arrives through the manager's event
/// channel like any other backend completion.
pub async fn run(config: Config) -> Result<()> {
    let backend = BackendClient::new(&config.backend_url);
    let mut manager = ConversationManager::new(backend);
    manager.refresh_history();

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let mut terminal =
        Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")?;

    let result = event_loop(&mut terminal, &mut manager).await;

    // Restore the terminal even when the loop failed
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    manager: &mut ConversationManager,
) -> Result<()> {
    loop {
        manager.process_backend_events();
        terminal
            .draw(|frame| manager.render(frame))
            .context("Failed to draw frame")?;

        if !event::poll(Duration::from_millis(50)).context("Failed to poll terminal events")? {
            continue;
        }

        match event::read().context("Failed to read terminal event")? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                match manager.handle_key(key) {
                    ConversationAction::Exit => return Ok(()),
                    ConversationAction::None => {}
                }
            }
            _ => {}
        }
    }
}
