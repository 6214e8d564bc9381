//! The event loop that drives a [`Scheduler`] against a [`CheckSource`].
//!
//! One task owns the [`App`] and is the only code that mutates the
//! observation. Fetches run as spawned tasks and report back over an mpsc
//! channel; the poll timer is a single re-armed [`Sleep`]. Cancellation
//! arrives on a watch channel and is always checked first.
//!
//! ```text
//!             ┌────────── ScheduleTick ───────────┐
//!             ▼                                    │
//!   Sleep ──Tick──▶ Scheduler::handle ──Commands──▶ Runtime
//!                        ▲                         │ FetchSnapshot
//!   mpsc ◀── spawned fetch task ◀──────────────────┘
//! ```

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use crossterm::event::Event as TermEvent;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant, MissedTickBehavior, Sleep};
use tracing::{debug, info};

use checkwatch_types::PullRequestRef;

use crate::app::App;
use crate::events::{handle_key_event, KeyAction};
use crate::scheduler::{Command, Event, Phase, Scheduler};
use crate::source::CheckSource;

/// How often the display refreshes while waiting, so elapsed times tick.
pub const REDRAW_INTERVAL: Duration = Duration::from_secs(1);

const EVENT_BUFFER: usize = 16;

/// Renders the application state. Called after every event and on every
/// redraw tick.
pub trait Presenter {
    fn present(&mut self, app: &mut App) -> Result<()>;
}

/// A presenter that draws nothing.
#[derive(Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _app: &mut App) -> Result<()> {
        Ok(())
    }
}

/// Requests cancellation of a running [`Runtime`].
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<watch::Sender<bool>>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

/// Receiving side of a [`CancelHandle`].
#[derive(Debug)]
pub struct CancelToken(watch::Receiver<bool>);

impl CancelToken {
    /// Resolves once cancellation is requested. Never resolves if every
    /// handle is dropped without cancelling.
    async fn cancelled(&mut self) {
        loop {
            if *self.0.borrow_and_update() {
                return;
            }
            if self.0.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Create a linked cancel handle and token.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(Arc::new(tx)), CancelToken(rx))
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub phase: Phase,
    pub exit_code: i32,
}

/// The poll timer. Disarmed until the scheduler asks for a tick.
struct Timer {
    sleep: Pin<Box<Sleep>>,
    armed: bool,
}

impl Timer {
    fn new() -> Self {
        Self {
            sleep: Box::pin(time::sleep(Duration::ZERO)),
            armed: false,
        }
    }

    fn arm(&mut self, after: Duration) {
        self.sleep.as_mut().reset(Instant::now() + after);
        self.armed = true;
    }

    async fn fired(&mut self) {
        self.sleep.as_mut().await;
        self.armed = false;
    }
}

pub struct Runtime {
    source: Arc<dyn CheckSource>,
    scheduler: Scheduler,
    redraw_interval: Duration,
}

impl Runtime {
    pub fn new(source: Arc<dyn CheckSource>, scheduler: Scheduler) -> Self {
        Self {
            source,
            scheduler,
            redraw_interval: REDRAW_INTERVAL,
        }
    }

    pub fn with_redraw_interval(mut self, interval: Duration) -> Self {
        self.redraw_interval = interval;
        self
    }

    /// Run until the observation reaches a terminal phase.
    ///
    /// `input` carries terminal events; quit keys become a cancel and
    /// everything else just triggers a redraw. Presenter errors abort the run.
    pub async fn run(
        &self,
        app: &mut App,
        presenter: &mut dyn Presenter,
        mut input: Option<mpsc::Receiver<TermEvent>>,
        mut cancel: CancelToken,
    ) -> Result<Outcome> {
        let pr = app.observation.pull_request().clone();
        let (tx, mut rx) = mpsc::channel::<Event>(EVENT_BUFFER);
        let mut timer = Timer::new();
        let mut redraw = time::interval(self.redraw_interval);
        redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(%pr, source = %self.source.description(), "watching checks");
        let mut stopped = self.execute(self.scheduler.start(), &pr, &tx, &mut timer);
        presenter.present(app)?;

        while !stopped {
            let event = tokio::select! {
                biased;

                _ = cancel.cancelled() => Event::Cancel,

                Some(term_event) = next_input(&mut input) => {
                    match term_event {
                        TermEvent::Key(key) => match handle_key_event(app, key) {
                            KeyAction::Cancel => Event::Cancel,
                            KeyAction::None => {
                                presenter.present(app)?;
                                continue;
                            }
                        },
                        _ => {
                            presenter.present(app)?;
                            continue;
                        }
                    }
                }

                Some(event) = rx.recv() => event,

                _ = timer.fired(), if timer.armed => Event::Tick,

                _ = redraw.tick() => {
                    presenter.present(app)?;
                    continue;
                }
            };

            let commands = self.scheduler.handle(&mut app.observation, event, Utc::now());
            stopped = self.execute(commands, &pr, &tx, &mut timer);
            presenter.present(app)?;
        }

        let outcome = Outcome {
            phase: app.observation.phase(),
            exit_code: app.observation.exit_code(),
        };
        info!(phase = ?outcome.phase, exit_code = outcome.exit_code, "stopped");
        Ok(outcome)
    }

    /// Carry out commands. Returns true on `Stop`.
    fn execute(
        &self,
        commands: Vec<Command>,
        pr: &PullRequestRef,
        tx: &mpsc::Sender<Event>,
        timer: &mut Timer,
    ) -> bool {
        let mut stop = false;
        for command in commands {
            match command {
                Command::FetchMetadata => {
                    let source = Arc::clone(&self.source);
                    let tx = tx.clone();
                    let pr = pr.clone();
                    tokio::spawn(async move {
                        let result = source
                            .fetch_metadata(&pr)
                            .await
                            .map_err(|e| format!("{:#}", e));
                        // The loop may have stopped already
                        let _ = tx.send(Event::Metadata(result)).await;
                    });
                }
                Command::FetchSnapshot => {
                    let source = Arc::clone(&self.source);
                    let tx = tx.clone();
                    let pr = pr.clone();
                    tokio::spawn(async move {
                        let result = source
                            .fetch_snapshot(&pr)
                            .await
                            .map_err(|e| format!("{:#}", e));
                        let _ = tx.send(Event::Checks(result)).await;
                    });
                }
                Command::ScheduleTick(after) => {
                    debug!(after_ms = after.as_millis() as u64, "next tick scheduled");
                    timer.arm(after);
                }
                Command::Stop => stop = true,
            }
        }
        stop
    }
}

/// Next terminal event, or never if there is no input or it has closed.
async fn next_input(input: &mut Option<mpsc::Receiver<TermEvent>>) -> Option<TermEvent> {
    match input {
        Some(rx) => match rx.recv().await {
            Some(event) => Some(event),
            None => {
                *input = None;
                std::future::pending().await
            }
        },
        None => std::future::pending().await,
    }
}
