use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};

use super::render::render_stats;
use crate::constants::UI_EVENT_POLL_MS;
use crate::stats::StatsFeed;

/// Whether stdout is an interactive terminal the dashboard can take over
pub fn is_interactive() -> bool {
    crossterm::tty::IsTty::is_tty(&io::stdout())
}

/// Run the stats dashboard until the user quits.
///
/// Blocking; run it on a blocking thread. The feed is polled every
/// `refresh` and on demand with `r`.
pub fn run_dashboard(feed: StatsFeed, refresh: Duration, model_name: &str) -> Result<()> {
    if !is_interactive() {
        return Err(anyhow::anyhow!("No interactive terminal available for the dashboard"));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let res = run_loop(&mut terminal, &feed, refresh, model_name);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    feed: &StatsFeed,
    refresh: Duration,
    model_name: &str,
) -> Result<()> {
    let mut snapshot = feed.poll();
    let mut last_poll = Instant::now();

    loop {
        terminal.draw(|f| render_stats(f, &snapshot, model_name))?;

        if event::poll(Duration::from_millis(UI_EVENT_POLL_MS))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        KeyCode::Char('r') => {
                            snapshot = feed.poll();
                            last_poll = Instant::now();
                        }
                        _ => {}
                    }
                }
            }
        }

        if last_poll.elapsed() >= refresh {
            snapshot = feed.poll();
            last_poll = Instant::now();
        }
    }
}
