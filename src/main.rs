use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, EnvFilter};

use checkwatch::data::timing::{format_std, parse_duration};
use checkwatch::{
    cancel_pair, events, report, App, CheckSource, FileSource, GitHubSource, Observation, Phase,
    Runtime, Scheduler, Settings, TerminalPresenter, Theme,
};
use checkwatch_adapters::github::{identity, GitHubAdapter};
use checkwatch_types::PullRequestRef;

/// Owner and repository used for fixtures when no repository is known.
const LOCAL_OWNER: &str = "local";
const LOCAL_REPO: &str = "fixture";

#[derive(Parser, Debug)]
#[command(name = "checkwatch", version)]
#[command(about = "Watch the CI checks of a GitHub pull request until they finish")]
struct Args {
    /// Pull request number (detected with `gh pr view` when omitted)
    pr: Option<u64>,

    /// Repository as owner/name (detected from the origin remote when omitted)
    #[arg(long)]
    repo: Option<String>,

    /// Base polling interval (e.g. "5s", "1m"); overrides the config file
    #[arg(short, long, value_parser = parse_duration)]
    interval: Option<Duration>,

    /// Path to a config file
    #[arg(short, long, env = "CHECKWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Replay checks from a JSON fixture instead of the GitHub API
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Fetch once, print a plain report and exit
    #[arg(long)]
    once: bool,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let interactive = !args.once && io::stdout().is_terminal();

    if let Err(e) = init_logging(args.log_file.as_deref(), interactive) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(args, interactive) {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Install the tracing subscriber.
///
/// The TUI owns stdout and stderr while it runs, so interactive logs only go
/// to an explicit log file.
fn init_logging(log_file: Option<&std::path::Path>, interactive: bool) -> Result<()> {
    let filter =
        EnvFilter::try_from_env("CHECKWATCH_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, ansi) = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None if interactive => (BoxMakeWriter::new(io::sink), false),
        None => (BoxMakeWriter::new(io::stderr), io::stderr().is_terminal()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install logger: {}", e))
}

fn run(args: Args, interactive: bool) -> Result<i32> {
    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(interval) = args.interval {
        settings = settings.with_refresh_interval(interval)?;
    }

    let rt = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let (pr, source) = rt.block_on(build_source(&args))?;
    info!(
        %pr,
        interval = %format_std(settings.refresh_interval),
        "resolved pull request"
    );

    let scheduler = Scheduler::new(settings.refresh_interval);

    if !interactive {
        let mut observation = Observation::new(pr, Utc::now());
        rt.block_on(report::fetch_once(source.as_ref(), &scheduler, &mut observation))?;
        print!("{}", report::render(&observation, Utc::now()));
        return Ok(report::exit_code(&observation));
    }

    let theme = Theme::auto_detect().status_colors(settings.colors);
    let mut app = App::new(
        Observation::new(pr, Utc::now()),
        source.description(),
        theme,
    );
    let runtime =
        Runtime::new(source, scheduler).with_redraw_interval(settings.redraw_interval);

    let outcome = rt.block_on(run_tui(&runtime, &mut app))?;

    if outcome.phase == Phase::Failed {
        anyhow::bail!(
            "{}",
            app.observation.error().unwrap_or("failed to fetch pull request")
        );
    }
    print!("{}", report::render(&app.observation, Utc::now()));
    Ok(outcome.exit_code)
}

/// Resolve the pull request and build the source that serves it.
async fn build_source(args: &Args) -> Result<(PullRequestRef, Arc<dyn CheckSource>)> {
    if let Some(path) = &args.file {
        let source = FileSource::new(path);
        let (owner, repo) = match &args.repo {
            Some(repo) => identity::parse_repo_arg(repo)?,
            None => (LOCAL_OWNER.to_string(), LOCAL_REPO.to_string()),
        };
        let number = match args.pr {
            Some(number) => number,
            // The fixture knows its own number
            None => {
                source
                    .fetch_metadata(&PullRequestRef::new(&owner, &repo, 0))
                    .await?
                    .number
            }
        };
        return Ok((PullRequestRef::new(owner, repo, number), Arc::new(source)));
    }

    let (owner, repo) = match &args.repo {
        Some(repo) => identity::parse_repo_arg(repo)?,
        None => identity::detect_owner_repo()?,
    };
    let number = match args.pr {
        Some(number) => number,
        None => identity::detect_pr_number()?,
    };
    let pr = PullRequestRef::new(owner, repo, number);

    let adapter = GitHubAdapter::builder()
        .token(identity::resolve_token()?)
        .build()?;
    let source = GitHubSource::new(adapter, &pr);
    Ok((pr, Arc::new(source)))
}

/// Leave raw mode and the alternate screen. Safe to call more than once.
fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Run the interactive UI until the watch ends, restoring the terminal after.
async fn run_tui(runtime: &Runtime, app: &mut App) -> Result<checkwatch::Outcome> {
    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        restore_terminal();
        original_hook(panic);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut presenter = TerminalPresenter::enter(io::stdout(), restore_terminal)?;

    let (tx, rx) = mpsc::channel(32);
    let reader = events::spawn_input_reader(tx);
    let (_cancel, token) = cancel_pair();

    let result = runtime.run(app, &mut presenter, Some(rx), token).await;

    // Restore terminal
    restore_terminal();
    presenter.terminal_mut().show_cursor()?;

    // The receiver is gone, so the reader stops within one poll
    let _ = reader.join();

    result
}
