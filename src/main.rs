//! ChatOps console
//!
//! Input routing:
//! - Console commands (start with "/") act locally
//! - Everything else is sent to the gateway over the command channel
//! - F2..F5 send the quick commands
//!
//! EXIT: /quit, /q, /exit or Ctrl+C work from any connection state

use std::io;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{poll, read, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use chatops_console::cli::{self, Args};
use chatops_console::logging;
use chatops_console::session::WebSocketConnector;
use chatops_console::ui::{self, handlers, parse_command, App, AppState, Command, QuickCommand};

/// Poll interval; also bounds reconnect timer latency
const TICK: Duration = Duration::from_millis(100);

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match cli::resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(cli::EXIT_CONFIG_ERROR);
        }
    };
    let role = match config.role() {
        Ok(role) => role,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(cli::EXIT_CONFIG_ERROR);
        }
    };

    let _log_guard = match logging::init(&config.log_dir()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: file logging disabled: {}", e);
            None
        }
    };
    tracing::info!(endpoint = %config.endpoint, role = %role, "starting chatops console");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("chatops-channel")
        .enable_all()
        .build()?;
    let connector = WebSocketConnector::new(runtime.handle().clone());

    let mut app = App::new(Box::new(connector), config.session_settings(), role);
    app.log("ChatOps console ready");
    app.log("Type /connect to open the channel, /help for commands, /quit to exit");
    if args.connect {
        app.session.connect_current();
    }

    let outcome = run_tui(&mut app);

    app.session.disconnect();
    // Let the channel task flush its close frame
    runtime.shutdown_timeout(Duration::from_millis(500));

    if let Err(ref e) = outcome {
        tracing::error!(error = %e, "console exited with error");
        eprintln!("Error: {}", e);
        std::process::exit(cli::EXIT_FAILURE);
    }
    tracing::info!("console exited");
    Ok(())
}

/// Run the terminal loop until quit
fn run_tui(app: &mut App) -> ui::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, app);

    // Cleanup runs even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> ui::Result<()> {
    while app.state() != AppState::Quitting {
        ui::render(terminal, app)?;

        if poll(TICK)? {
            if let Event::Key(key) = read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    break;
                }

                handle_key_event(app, key);

                if app.state() == AppState::Quitting {
                    break;
                }
            }
        }

        // Drain channel events and fire a due reconnect
        app.tick(Instant::now());
    }
    Ok(())
}

/// Handle keyboard input
fn handle_key_event(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) => app.handle_char(c),
        KeyCode::Backspace => app.handle_backspace(),
        KeyCode::Enter => {
            let input = app.take_input();
            let cmd = parse_command(&input);

            // Quit bypasses the session entirely
            if matches!(cmd, Command::Quit) {
                app.log("Exiting...");
                app.quit();
                return;
            }

            app.hide_help();
            handlers::execute_command(app, cmd);
        }
        KeyCode::Esc => {
            if app.state() == AppState::Help {
                app.hide_help();
            } else {
                app.input_buffer.clear();
            }
        }
        KeyCode::F(n) => {
            if let Some(quick) = QuickCommand::from_function_key(n) {
                handlers::execute_quick(app, quick);
            }
        }
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::Home => app.scroll_up(1000),
        KeyCode::End => app.scroll_to_end(),
        _ => {}
    }
}
