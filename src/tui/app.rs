//! TUI entry point
//!
//! Sets up the terminal and runs the single event loop. Each iteration
//! handles exactly one event: a terminal event, a background task result or
//! a UI tick.

use std::io::{self, Stdout};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use crossterm::{
    cursor::Show,
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::screens::ProcessListScreen;
use super::{App, AppEvent, TaskRunner};
use crate::common::constants::duration::UI_TICK;
use crate::config::AppConfig;
use crate::core::provider::{ProcessProvider, SysinfoProvider};
use crate::error::errors;
use crate::shortcuts::{ShortcutConfig, ShortcutManager};
use crate::storage::SnapshotStore;
use crate::utils::ConfigPaths;

/// Raw mode plus alternate screen, restored on drop.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        let guard = Self;
        enable_raw_mode()
            .map_err(|e| errors::tui_error(format!("failed to enable raw mode: {e}")))?;
        execute!(io::stdout(), EnterAlternateScreen)
            .map_err(|e| errors::tui_error(format!("failed to enter alternate screen: {e}")))?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
    }
}

/// Run the interactive process manager until the user quits.
pub async fn run(paths: &ConfigPaths, config: AppConfig) -> Result<()> {
    let shortcuts =
        ShortcutManager::from_config(ShortcutConfig::load_or_default(&paths.shortcuts_file));
    let store = SnapshotStore::new(&paths.data_dir);
    let provider: Arc<dyn ProcessProvider> = Arc::new(SysinfoProvider::new());

    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();
    let mut runner = TaskRunner::new(
        provider,
        store.clone(),
        paths.config_file.clone(),
        paths.shortcuts_file.clone(),
        tx,
    );
    let mut app = App::new(config, shortcuts);
    match store.load_snapshot() {
        Ok(previous) if !previous.is_empty() => {
            debug!(count = previous.len(), "showing previous snapshot");
            if let Some(list) = app.screen_as_mut::<ProcessListScreen>() {
                list.seed(previous);
            }
        }
        Ok(_) => {}
        Err(err) => warn!(error = %err, "ignoring unreadable snapshot"),
    }

    let guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("failed to create terminal")?;
    terminal.clear()?;

    info!(preset = app.shortcuts().active_preset(), "starting tui");
    let result = event_loop(&mut terminal, &mut app, &mut runner, &mut rx).await;
    runner.shutdown();
    drop(terminal);
    drop(guard);

    if let Some(list) = app.screen_as::<ProcessListScreen>() {
        if !list.snapshot().is_empty() {
            match store.save_snapshot(list.snapshot()) {
                Ok(path) => debug!(path = %path.display(), "snapshot saved"),
                Err(err) => warn!(error = %err, "failed to save snapshot"),
            }
        }
    }
    info!("tui stopped");
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    runner: &mut TaskRunner,
    rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    let size = terminal.size()?;
    app.handle_event(AppEvent::Resize {
        width: size.width,
        height: size.height,
    });
    let tasks = app.start();
    runner.execute_all(tasks);

    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(UI_TICK);

    loop {
        terminal.draw(|frame| app.render(frame))?;

        let event = tokio::select! {
            maybe = events.next() => match maybe {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
                Some(Ok(Event::Resize(width, height))) => Some(AppEvent::Resize { width, height }),
                Some(Ok(_)) => None,
                Some(Err(err)) => return Err(err).context("failed to read terminal event"),
                None => break,
            },
            Some(event) = rx.recv() => Some(event),
            _ = tick.tick() => {
                app.tick();
                None
            }
        };

        if let Some(event) = event {
            let tasks = app.handle_event(event);
            runner.execute_all(tasks);
        }
        if app.should_quit() {
            break;
        }
    }
    Ok(())
}
