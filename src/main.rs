// SPDX-FileCopyrightText: 2026 GSI Helmholtzzentrum f. Schwerionenforschung GmbH, Darmstadt, Germany
// SPDX-License-Identifier: LGPL-3.0-or-later

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::{backend::CrosstermBackend, Terminal};

mod app;
mod client;
mod ecs;
mod scroll;
mod tree_view;
mod ui;

use app::App;
use client::{EcsClient, DEFAULT_QUERY, DEFAULT_TIMEOUT_MS, DEFAULT_URL};
use ui::render_ui;

#[derive(Parser, Debug)]
#[command(name = "ecsi")]
#[command(about = "ECS Inspector - live entity tree, system phases and component browser")]
#[command(version)]
struct Args {
    /// Base URL of the ECS REST endpoint
    #[arg(short, long, default_value = DEFAULT_URL)]
    url: String,

    /// Refresh interval in milliseconds
    #[arg(short, long, default_value = "500")]
    refresh: u64,

    /// HTTP request timeout in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout: u64,

    /// Query expression selecting the listed entities
    #[arg(long, default_value = DEFAULT_QUERY)]
    query: String,

    /// Write log output to this file (the terminal is taken by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        init_logging(path, args.verbose)?;
    }

    let mut client = EcsClient::new(&args.url, &args.query, Duration::from_millis(args.timeout))?;
    info!("Polling {} every {}ms", client.base_url(), args.refresh);

    run_tui(&args, &mut client)
}

fn init_logging(path: &Path, verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => simplelog::LevelFilter::Info,
        1 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };
    let mut cfg = simplelog::ConfigBuilder::new();
    cfg.set_location_level(simplelog::LevelFilter::Off)
        .set_target_level(simplelog::LevelFilter::Off)
        .set_thread_level(simplelog::LevelFilter::Off);

    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    simplelog::WriteLogger::init(level, cfg.build(), file).context("Failed to initialize logger")
}

fn run_tui(args: &Args, client: &mut EcsClient) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(args.refresh);

    // Main loop
    let result = run_event_loop(&mut terminal, &mut app, client);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: &mut EcsClient,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut needs_redraw = true;

    loop {
        // Poll before drawing so the first frame already has data
        if app.needs_refresh() {
            app.refresh(client);
            needs_redraw = true;
        }

        if needs_redraw {
            terminal.draw(|f| render_ui(f, app))?;
            needs_redraw = false;
        }

        // Handle input with timeout
        if event::poll(tick_rate)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    needs_redraw = true;
                    match (key.code, key.modifiers) {
                        // Quit
                        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                            app.should_quit = true;
                        }
                        // Navigation
                        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => app.select_prev(),
                        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => app.select_next(),
                        (KeyCode::PageUp, _) | (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                            app.page_up()
                        }
                        (KeyCode::PageDown, _) | (KeyCode::Char('d'), KeyModifiers::CONTROL) => {
                            app.page_down()
                        }
                        (KeyCode::Home, _) | (KeyCode::Char('g'), _) => app.select_first(),
                        (KeyCode::End, _) | (KeyCode::Char('G'), _) => app.select_last(),
                        (KeyCode::Tab, _) | (KeyCode::Left, _) | (KeyCode::Right, _) => {
                            app.toggle_focus()
                        }
                        (KeyCode::Enter, _) => app.activate(),
                        (KeyCode::Char('f'), _) => app.toggle_anonymous(),
                        (KeyCode::Char('p'), _) => app.toggle_view(),
                        // Manual refresh
                        (KeyCode::Char('r'), _) => app.refresh(client),
                        _ => {}
                    }
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }

        // Check for quit
        if app.should_quit {
            break;
        }
    }

    Ok(())
}
