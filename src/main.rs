use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use slamcheck::{
    app::{App, Flow, DEFAULT_DISPLAY},
    app_dirs::AppDirs,
    config::FileConfigStore,
    estimator::{Estimator, DEFAULT_RESOLUTION_MS, MIN_RESOLUTION_MS, TICK_MS},
    runtime::{CrosstermEventSource, FixedTicker, Runner},
};
use std::{
    error::Error,
    fs::{self, File},
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};

/// stun slam timing tester: how likely would your inputs have landed on adjacent ticks?
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Records your attack, axe and mace inputs and estimates the chance that they would have landed a stun slam, averaged over every possible alignment of the 20 TPS game clock."
)]
pub struct Cli {
    /// keybind file to load and save (defaults to the platform config dir)
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// phase sampling step in milliseconds
    #[clap(short = 'r', long, default_value_t = DEFAULT_RESOLUTION_MS, value_parser = parse_resolution)]
    resolution: f64,

    /// how long the timeline of a finished attempt stays visible, in milliseconds
    #[clap(short = 'd', long, default_value_t = DEFAULT_DISPLAY.as_millis() as u64)]
    display_ms: u64,

    /// ignore saved keybinds and capture new ones
    #[clap(long)]
    rebind: bool,

    /// write a debug log (-v) or trace log (-vv) to the state dir
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_resolution(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    Estimator::new(value)
        .map(|e| e.resolution_ms())
        .ok_or_else(|| format!("must be between {MIN_RESOLUTION_MS} and {TICK_MS}"))
}

fn init_logging(verbose: u8) -> Result<(), Box<dyn Error>> {
    use env_logger::{Builder, Target};
    use log::LevelFilter;
    use std::io::Write;

    // the TUI owns stdout/stderr, so logs only go to a file and only on request
    let level = match verbose {
        0 => return Ok(()),
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let Some(path) = AppDirs::log_path() else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::options().create(true).append(true).open(&path)?;

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(file)))
        .try_init()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging(cli.verbose)?;
    log::info!("slamcheck v{}", env!("CARGO_PKG_VERSION"));

    let estimator = Estimator::new(cli.resolution).ok_or("invalid resolution")?;
    let store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    log::debug!("keybinds at {}", store.path().display());

    let mut app = App::new(
        Box::new(store),
        estimator,
        Duration::from_millis(cli.display_ms),
        cli.rebind,
        Instant::now(),
    );

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen,
    )?;
    terminal.show_cursor()?;

    result?;

    println!("\nExiting.");
    if let Some(summary) = app.session.summary() {
        println!("{summary}");
    }

    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let mut runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        if app.handle(runner.step()) == Flow::Quit {
            break;
        }
    }

    Ok(())
}
