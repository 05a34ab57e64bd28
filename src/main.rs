mod clock;
mod config;
mod domain;
mod error;
mod input;
mod logging;
mod persistence;
mod reactive;
mod store;
mod ticker;
mod ui;
mod view;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clock::{Clock, SystemClock};
use config::Settings;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use domain::{format_timestamp, plan_name, time_sub, Plan, Timelog, PLAN_ID_FMT, TIME_FMT};
use persistence::{encode, timelog_file, FsVault, Vault};
use ratatui::{backend::CrosstermBackend, Terminal};
use reactive::Scope;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use store::{StopOutcome, TimelogStore};
use tracing::{error, info};
use view::{FileView, TimelogView};

#[derive(Parser)]
#[command(name = "timelog")]
#[command(about = "时光日志: start and stop plans, keep a log of where the time went", long_about = None)]
struct Cli {
    /// Timelog file used by the headless commands
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a timelog file in the terminal view (default)
    Open {
        /// Defaults to the standard file name in the current directory
        file: Option<PathBuf>,
    },
    /// Create a new timelog file with the default plans
    New {
        /// Directory to create it in. Defaults to the current directory.
        dir: Option<PathBuf>,
    },
    /// Start a plan
    Start {
        /// Plan id. Defaults to the last plan used.
        #[arg(short, long)]
        plan: Option<String>,
    },
    /// Stop the running plan
    Stop,
    /// Show whether a plan is running
    Status,
    /// List plans
    Plans,
    /// Manage plans
    Plan {
        #[command(subcommand)]
        action: PlanCommand,
    },
    /// Show the most recent records
    Records {
        /// Number of records. Defaults to the configured count.
        #[arg(short, long)]
        last: Option<usize>,
    },
}

#[derive(Subcommand)]
enum PlanCommand {
    /// Add a plan; the id defaults to the current time
    Add {
        name: String,
        #[arg(long)]
        id: Option<String>,
    },
    /// Rename a plan
    Rename { id: String, name: String },
    /// Remove a plan; its records are kept
    Remove { id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(&config::settings_path())?;
    let _log_guard = logging::init(settings.debug, settings.log_dir.as_deref());
    info!(version = env!("CARGO_PKG_VERSION"), "timelog starting");

    match cli.command {
        None => run_tui(&settings, cli.file),
        Some(Commands::Open { file }) => run_tui(&settings, file.or(cli.file)),
        Some(Commands::New { dir }) => {
            let dir = match dir {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            let path = create_timelog(&FsVault, &dir, &settings)?;
            println!("Created timelog: {}", path.display());
            Ok(())
        }
        Some(command) => {
            let path = resolve_file(&settings, cli.file)?;
            let mut store = TimelogStore::open(&Scope::new(), FsVault, &path, Rc::new(SystemClock))
                .with_context(|| format!("Failed to open {}", path.display()))?;
            run_command(&mut store, command, &settings)
        }
    }
}

/// File named on the command line, else the default file in the current directory
fn resolve_file(settings: &Settings, file: Option<PathBuf>) -> Result<PathBuf> {
    match file {
        Some(file) => Ok(file),
        None => Ok(timelog_file(&std::env::current_dir()?, &settings.file_name, &settings.file_ext)),
    }
}

/// Create `<dir>/<file_name>.<file_ext>` holding the default plans.
/// An existing file is never overwritten.
fn create_timelog<V: Vault>(vault: &V, dir: &Path, settings: &Settings) -> Result<PathBuf> {
    let path = timelog_file(dir, &settings.file_name, &settings.file_ext);
    let content = encode(&Timelog::default())?;
    vault.create(&path, &content)?;
    info!(path = %path.display(), "timelog created");
    Ok(path)
}

fn run_command<V: Vault>(store: &mut TimelogStore<V>, command: Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::Start { plan } => {
            let plans = store.plans().peek();
            let id = match plan {
                Some(id) => id,
                None => store
                    .records()
                    .peek()
                    .last()
                    .map(|r| r.id.clone())
                    .filter(|id| plans.iter().any(|p| p.id == *id))
                    .or_else(|| plans.first().map(|p| p.id.clone()))
                    .context("No plans defined, add one with `timelog plan add`")?,
            };
            if !plans.iter().any(|p| p.id == id) {
                anyhow::bail!("No plan with id {}", id);
            }
            store.start_plan(&id)?;
            println!("Started {} ({})", plan_name(&plans, &id), id);
        }
        Commands::Stop => match store.stop_plan()? {
            StopOutcome::Stopped => {
                let records = store.records().peek();
                if let Some(last) = records.last() {
                    println!(
                        "Stopped {} after {}",
                        plan_name(&store.plans().peek(), &last.id),
                        time_sub(&last.start, &last.stop, TIME_FMT)
                    );
                }
            }
            StopOutcome::TooShort => println!("Less than a second, still running"),
            StopOutcome::NotRunning => println!("Nothing is running"),
        },
        Commands::Status => {
            let records = store.records().peek();
            match records.last().filter(|r| r.is_open()) {
                Some(open) => {
                    let now = format_timestamp(store.now());
                    println!(
                        "{}: {} for {}",
                        store.state().name(),
                        plan_name(&store.plans().peek(), &open.id),
                        time_sub(&open.start, &now, TIME_FMT)
                    );
                }
                None => println!("{}", store.state().name()),
            }
        }
        Commands::Plans => {
            for plan in store.plans().peek() {
                println!("{}\t{}", plan.id, plan.name);
            }
        }
        Commands::Plan { action } => match action {
            PlanCommand::Add { name, id } => {
                let id = id.unwrap_or_else(|| store.now().format(PLAN_ID_FMT).to_string());
                store.create_plan(Plan::new(id.clone(), name.clone()))?;
                println!("Added plan {} ({})", name, id);
            }
            PlanCommand::Rename { id, name } => {
                store.rename_plan(&id, &name)?;
                println!("Renamed plan {} to {}", id, name);
            }
            PlanCommand::Remove { id } => {
                let plan = store.delete_plan(&id)?;
                println!("Removed plan {} ({})", plan.name, plan.id);
            }
        },
        Commands::Records { last } => {
            let limit = last.unwrap_or(settings.recent_records);
            let plans = store.plans().peek();
            let records = store.records().peek();
            for row in view::recent_rows(&plans, &records, limit) {
                println!("{}\t{}\t{}\t{}", row.plan, row.duration, row.start, row.stop);
            }
        }
        Commands::Open { .. } | Commands::New { .. } => {}
    }
    Ok(())
}

fn run_tui(settings: &Settings, file: Option<PathBuf>) -> Result<()> {
    let path = resolve_file(settings, file)?;
    if !path.exists() {
        anyhow::bail!(
            "{} does not exist, create it with `timelog new`",
            path.display()
        );
    }

    let clock: Rc<dyn Clock> = Rc::new(SystemClock);
    let mut view = TimelogView::new(settings.clone(), FsVault, clock);
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    if !view.can_accept_extension(extension) {
        anyhow::bail!("{} is not a .{} file", path.display(), settings.file_ext);
    }
    view.on_load_file(&path)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run view
    let result = run_app(&mut terminal, &mut view);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    view.on_close();

    if let Err(err) = result {
        error!("view exited with error: {}", err);
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, view: &mut TimelogView) -> Result<()> {
    let clock = SystemClock;

    loop {
        terminal.draw(|f| ui::render(f, view))?;

        // Handle events with timeout for ticking
        if event::poll(ticker::until_next_second(clock.now()))? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press && input::handle_key(view, key)? {
                    return Ok(());
                }
            }
        }

        view.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
        let cli = Cli::parse_from(["timelog", "--file", "a.timelog", "records", "--last", "3"]);
        assert_eq!(cli.file, Some(PathBuf::from("a.timelog")));
        assert!(matches!(cli.command, Some(Commands::Records { last: Some(3) })));
    }

    #[test]
    fn test_new_refuses_existing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let settings = Settings::default();

        let path = create_timelog(&FsVault, temp_dir.path(), &settings).unwrap();
        assert_eq!(path, temp_dir.path().join("时光日志.timelog"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(persistence::decode("", &content).unwrap(), Timelog::default());

        std::fs::write(&path, "keep me").unwrap();
        let err = create_timelog(&FsVault, temp_dir.path(), &settings).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[test]
    fn test_headless_commands() {
        let temp_dir = tempfile::tempdir().unwrap();
        let settings = Settings::default();
        let path = create_timelog(&FsVault, temp_dir.path(), &settings).unwrap();
        let clock = clock::ManualClock::at("2024-03-01 09:00:00");
        let mut store = TimelogStore::open(&Scope::new(), FsVault, &path, Rc::new(clock.clone())).unwrap();

        run_command(&mut store, Commands::Start { plan: Some("002".to_string()) }, &settings).unwrap();
        assert!(store.is_open());
        clock.advance_secs(30);
        run_command(&mut store, Commands::Stop, &settings).unwrap();
        assert!(!store.is_open());

        let unknown = Commands::Start { plan: Some("nope".to_string()) };
        assert!(run_command(&mut store, unknown, &settings).is_err());

        let add = Commands::Plan {
            action: PlanCommand::Add { name: "读书".to_string(), id: None },
        };
        run_command(&mut store, add, &settings).unwrap();
        assert_eq!(store.plans().peek()[3].id, "20240301090030");

        // Defaults to the last plan used
        run_command(&mut store, Commands::Start { plan: None }, &settings).unwrap();
        assert_eq!(store.records().peek()[1].id, "002");
    }
}
