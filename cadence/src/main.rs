use anyhow::Result;
use cadence::app::{App, AppMode, DurationField};
use cadence::config;
use cadence::controller::Controller;
use cadence::{ipc, logging, notify, ui};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config()?;
    let log_path = logging::init(&config::data_dir())?;
    info!(log = %log_path.display(), "cadence starting");

    let controller = Controller::new(&config.timer).with_tasks(&config.tasks);

    let socket_path = config.timer.socket_path.clone();
    let server = {
        let controller = controller.clone();
        let path = socket_path.clone();
        tokio::spawn(async move {
            if let Err(e) = ipc::server::start(&path, controller).await {
                error!("IPC server stopped: {}", e);
            }
        })
    };
    let notifier = config
        .timer
        .desktop_notifications
        .then(|| notify::spawn_desktop_notifier(controller.timer().subscribe()));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = App::new(config, controller.clone()).await;
    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    controller.timer().shutdown().await;
    server.abort();
    if let Some(notifier) = notifier {
        notifier.abort();
    }
    let _ = std::fs::remove_file(&socket_path);

    if let Err(err) = res {
        error!("cadence exited with error: {:?}", err);
        eprintln!("Error: {:?}", err);
    }
    info!("cadence stopped");

    Ok(())
}

/// Blocks this worker for at most the poll timeout; the ticker runs elsewhere.
fn next_event(timeout: Duration) -> io::Result<Option<Event>> {
    tokio::task::block_in_place(|| {
        if event::poll(timeout)? {
            event::read().map(Some)
        } else {
            Ok(None)
        }
    })
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        app.refresh().await;
        terminal.draw(|f| ui::draw(f, &app))?;

        let Some(Event::Key(key)) = next_event(Duration::from_millis(100))? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.mode {
            AppMode::Normal => match key.code {
                KeyCode::Char('q') => app.should_quit = true,
                KeyCode::Char(' ') => app.toggle_timer().await,
                KeyCode::Char('s') => app.stop_timer().await,
                KeyCode::Char('r') => app.reset_timer().await,
                KeyCode::Char('n') => app.skip_session().await,
                KeyCode::Char('t') => app.advance_task().await,
                KeyCode::Char('p') => app.mode = AppMode::SelectingPreset,
                KeyCode::Char('?') => app.mode = AppMode::ShowHelp,
                KeyCode::Char('f') => app.adjust(DurationField::Focus, 1).await,
                KeyCode::Char('F') => app.adjust(DurationField::Focus, -1).await,
                KeyCode::Char('b') => app.adjust(DurationField::ShortBreak, 1).await,
                KeyCode::Char('B') => app.adjust(DurationField::ShortBreak, -1).await,
                KeyCode::Char('l') => app.adjust(DurationField::LongBreak, 1).await,
                KeyCode::Char('L') => app.adjust(DurationField::LongBreak, -1).await,
                KeyCode::Char('c') => app.adjust(DurationField::Cycles, 1).await,
                KeyCode::Char('C') => app.adjust(DurationField::Cycles, -1).await,
                _ => {}
            },
            AppMode::SelectingPreset => match key.code {
                KeyCode::Esc => app.mode = AppMode::Normal,
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    let number = c.to_digit(10).unwrap_or(0) as usize;
                    if app.select_preset_by_number(number).await {
                        app.mode = AppMode::Normal;
                    }
                }
                _ => {}
            },
            AppMode::ShowHelp => match key.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    app.mode = AppMode::Normal
                }
                _ => {}
            },
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
