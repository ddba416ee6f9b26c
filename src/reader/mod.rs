//! Terminal reader for the news snapshot.
//!
//! Loads the snapshot once, then shows the filtered and sorted list with a
//! detail dialog. Cards open on Enter or a click. Loads run on a background
//! task so the spinner keeps turning; `r` discards the current view and loads
//! again.

pub mod detail;
pub mod feed;
pub mod loader;
pub mod render;
pub mod state;

use crossterm::{
    ExecutableCommand,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use loader::{LoadError, SnapshotSource, fetch_snapshot};
use ratatui::prelude::*;
use state::{ReaderAction, ReaderState};
use std::error::Error;
use std::io::stdout;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

type LoadResult = (u64, Result<crate::models::NewsSnapshot, LoadError>);

/// Run the reader until the user quits.
pub async fn run_reader(source: SnapshotSource) -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = reader_loop(&mut terminal, source).await;

    disable_raw_mode()?;
    stdout().execute(DisableMouseCapture)?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn spawn_load(source: &SnapshotSource, generation: u64, tx: &mpsc::UnboundedSender<LoadResult>) {
    let source = source.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = fetch_snapshot(&source).await;
        // The receiver is gone only once the reader has exited.
        let _ = tx.send((generation, result));
    });
}

async fn reader_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    source: SnapshotSource,
) -> Result<(), Box<dyn Error>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<LoadResult>();
    let mut state = ReaderState::new();
    info!(%source, "Reader started");
    spawn_load(&source, state.generation, &tx);

    loop {
        while let Ok((generation, result)) = rx.try_recv() {
            debug!(generation, ok = result.is_ok(), "Load finished");
            state.finish_load(generation, result);
        }

        let size = terminal.size()?;
        state.resize(Rect::new(0, 0, size.width, size.height));
        terminal.draw(|f| render::draw(f, &state))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match state.handle_key(key) {
                        ReaderAction::Quit => break,
                        ReaderAction::Reload => {
                            let generation = state.reload();
                            info!(generation, "Reloading");
                            spawn_load(&source, generation, &tx);
                        }
                        ReaderAction::None => {}
                    }
                }
                Event::Mouse(mouse) => state.handle_mouse(mouse),
                _ => {}
            }
        }

        state.tick();
        tokio::task::yield_now().await;
    }

    info!("Reader closed");
    Ok(())
}
