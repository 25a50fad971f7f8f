mod app;
mod config;
mod dom;
mod error;
mod render;
mod storage;
mod theme;
mod tracker;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Popup};
use config::AppConfig;
use dom::{Document, NodeId};
use render::{Prompt, Renderer, MOUNT_POINT_ID};
use storage::{FileStore, KeyValueStore, MemoryStore};
use theme::Theme;
use tracker::{amount, CalorieTracker, RecordKind, STORAGE_KEY};

#[derive(Parser, Debug)]
#[command(name = "calorie-tracker")]
#[command(version)]
#[command(about = "Track calories gained and burned from the terminal")]
struct Args {
    /// Storage file to use instead of the configured one
    #[arg(long, value_name = "PATH")]
    data_file: Option<PathBuf>,

    /// Print the records and totals, then exit
    #[arg(short, long)]
    list: bool,

    /// Record gained calories, then exit
    #[arg(long, value_name = "AMOUNT", allow_hyphen_values = true)]
    add_gained: Option<String>,

    /// Record burned calories, then exit
    #[arg(long, value_name = "AMOUNT", allow_hyphen_values = true)]
    add_burned: Option<String>,

    /// Change the amount of the record at POSITION (1 = newest), then exit
    #[arg(long, num_args = 2, value_names = ["POSITION", "AMOUNT"], allow_hyphen_values = true)]
    edit: Option<Vec<String>>,

    /// Delete the record at POSITION (1 = newest), then exit
    #[arg(long, value_name = "POSITION")]
    delete: Option<usize>,

    /// Remove every stored record before doing anything else
    #[arg(long)]
    reset: bool,
}

impl Args {
    fn is_cli_only(&self) -> bool {
        self.list
            || self.reset
            || self.add_gained.is_some()
            || self.add_burned.is_some()
            || self.edit.is_some()
            || self.delete.is_some()
    }
}

/// Answers the edit prompt with a value given on the command line
struct ArgPrompt(Option<String>);

impl Prompt for ArgPrompt {
    fn prompt(&mut self, _label: &str, _seed: &str) -> Option<String> {
        self.0.take()
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let interactive = !args.is_cli_only();

    // Initialize logging
    init_logging(interactive);

    let config = AppConfig::load().unwrap_or_default();
    let storage_path = config.storage_path(args.data_file.clone())?;

    match FileStore::open(&storage_path) {
        Ok(store) => {
            tracing::info!("Using storage file {}", store.path().display());
            run(&args, &config, store, None)
        }
        // Like a browser without local storage: keep going, save nothing
        Err(e) if interactive => {
            tracing::warn!("Storage {} unavailable: {}", storage_path.display(), e);
            let notice = format!("Storage {} unavailable, changes will not be saved", storage_path.display());
            run(&args, &config, MemoryStore::new(), Some(notice))
        }
        Err(e) => Err(e.into()),
    }
}

fn run<S: KeyValueStore>(args: &Args, config: &AppConfig, mut store: S, notice: Option<String>) -> Result<()> {
    if args.reset {
        store.remove_item(STORAGE_KEY)?;
        println!("All records removed");
    }

    let mut renderer = Renderer::mount(
        Document::with_mount_point(MOUNT_POINT_ID),
        CalorieTracker::load(store),
    )?;
    renderer.init()?;

    // Handle CLI-only commands
    if let Some(amount) = &args.add_gained {
        add_record(&mut renderer, RecordKind::Gained, amount)?;
    }
    if let Some(amount) = &args.add_burned {
        add_record(&mut renderer, RecordKind::Burned, amount)?;
    }
    if let Some(values) = &args.edit {
        if let [position, amount] = values.as_slice() {
            let position: usize = position.parse()?;
            edit_record(&mut renderer, position, amount)?;
        }
    }
    if let Some(position) = args.delete {
        delete_record(&mut renderer, position)?;
    }
    if args.list {
        print_records(&renderer)?;
    }
    if !args.is_cli_only() {
        // Run TUI
        let theme = Theme::from_palette(&config.palette);
        let mut app = App::new(renderer, theme, Duration::from_secs(config.status_timeout_secs));
        app.notice = notice;
        return run_tui(app);
    }
    Ok(())
}

/// TUI logs go to a file so they stay off the alternate screen
fn init_logging(interactive: bool) {
    let registry = tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::from_default_env());

    let log_file = if interactive {
        AppConfig::data_dir()
            .ok()
            .and_then(|dir| std::fs::File::create(dir.join("calorie-tracker.log")).ok())
    } else {
        None
    };

    match log_file {
        Some(file) => registry
            .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .init(),
        None if interactive => registry.init(),
        None => registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init(),
    }
}

fn add_record<S: KeyValueStore>(renderer: &mut Renderer<S>, kind: RecordKind, amount: &str) -> Result<()> {
    renderer.set_input_value(Some(amount))?;
    if !renderer.submit(kind)? {
        anyhow::bail!("{}", renderer.error_message()?);
    }
    if let Some(record) = renderer.tracker().get(0) {
        println!("Added {}", record.label());
    }
    Ok(())
}

/// Button of class `class` on the record shown at 1-based `position`
fn record_button<S: KeyValueStore>(renderer: &Renderer<S>, class: &str, position: usize) -> Result<NodeId> {
    let buttons = renderer.buttons(class);
    position
        .checked_sub(1)
        .and_then(|i| buttons.get(i).copied())
        .ok_or_else(|| anyhow::anyhow!("No record at position {} ({} stored)", position, buttons.len()))
}

fn edit_record<S: KeyValueStore>(renderer: &mut Renderer<S>, position: usize, amount: &str) -> Result<()> {
    let button = record_button(renderer, "btn-edit", position)?;
    // The form drops bad edits silently; say so on the command line
    if !amount::parse_leading(amount).map(amount::is_valid).unwrap_or(false) {
        anyhow::bail!("Invalid calorie amount '{}', record unchanged", amount);
    }
    renderer.click_with(button, &mut ArgPrompt(Some(amount.to_string())))?;
    if let Some(label) = renderer.list_texts()?.get(position - 1) {
        println!("Updated {}", label);
    }
    Ok(())
}

fn delete_record<S: KeyValueStore>(renderer: &mut Renderer<S>, position: usize) -> Result<()> {
    let button = record_button(renderer, "btn-delete", position)?;
    let label = renderer.list_texts()?.get(position - 1).cloned().unwrap_or_default();
    renderer.click(button)?;
    println!("Deleted {}", label);
    Ok(())
}

fn print_records<S: KeyValueStore>(renderer: &Renderer<S>) -> Result<()> {
    let items = renderer.list_texts()?;
    if items.is_empty() {
        println!("{}", renderer.details_text()?);
        return Ok(());
    }
    for item in items {
        println!("{}", item);
    }
    println!("{}", renderer.summary());
    Ok(())
}

fn run_tui<S: KeyValueStore>(mut app: App<S>) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<S: KeyValueStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<S>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => {
                            // Handle key and catch any errors to prevent crashes
                            if let Err(e) = app.handle_key(key) {
                                tracing::error!("{}", e);
                                app.set_status(format!("Error: {}", e));
                            }
                        }
                    }
                }
            }
        }

        app.tick();
    }
}
