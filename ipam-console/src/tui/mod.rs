//! Interactive console
//!
//! Terminal setup, the input thread and the main loop. Rendering lives in
//! [`view`], state and event handling in [`app`].

pub mod app;
pub mod forms;
pub mod view;
pub mod widgets;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use log::{debug, info};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::api::InventoryClient;
use crate::config::Config;
use app::{App, AppEvent};

type Term = Terminal<CrosstermBackend<Stdout>>;

fn setup_terminal() -> io::Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Term) -> io::Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Forward terminal input to the UI loop until the receiver goes away
fn spawn_input_thread(tx: UnboundedSender<AppEvent>) {
    std::thread::spawn(move || {
        loop {
            match event::poll(Duration::from_millis(100)) {
                Ok(false) => {
                    if tx.is_closed() {
                        break;
                    }
                    continue;
                }
                Ok(true) => {}
                Err(e) => {
                    debug!("Input poll failed: {}", e);
                    break;
                }
            }

            let forwarded = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => tx.send(AppEvent::Key(key)),
                Ok(Event::Resize(_, _)) => tx.send(AppEvent::Resize),
                Ok(_) => Ok(()),
                Err(e) => {
                    debug!("Input read failed: {}", e);
                    break;
                }
            };
            if forwarded.is_err() {
                break;
            }
        }
    });
}

/// Run the console until the user quits
pub async fn run(config: Config) -> Result<()> {
    info!("Starting console against {}", config.base_url);

    let (tx, rx) = unbounded_channel();
    let api = Arc::new(InventoryClient::new(config.client_settings()));
    let app = App::new(config, api, tx.clone());

    let mut terminal = setup_terminal().context("Failed to initialise the terminal")?;
    spawn_input_thread(tx);
    let result = run_app(&mut terminal, app, rx).await;
    restore_terminal(&mut terminal).context("Failed to restore the terminal")?;
    result
}

async fn run_app(terminal: &mut Term, mut app: App, mut rx: UnboundedReceiver<AppEvent>) -> Result<()> {
    let tick = app.config.tick();
    let mut ticker = tokio::time::interval(tick);

    loop {
        let size = terminal.size()?;
        app.viewport_height = view::body_height(size.height);

        terminal.draw(|frame| view::ui(frame, &app))?;

        tokio::select! {
            _ = ticker.tick() => app.on_tick(tick),
            maybe_event = rx.recv() => match maybe_event {
                Some(event) => app.handle_event(event),
                None => break,
            },
        }

        if app.should_quit {
            info!("Console closed");
            break;
        }
    }

    Ok(())
}
