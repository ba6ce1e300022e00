use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event as CtEvent, KeyEvent, KeyEventKind, MouseButton, MouseEventKind,
};

/// Polling cadence of the attempt state machine
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Unified event type consumed by the app runner.
/// Inputs carry the instant they were read from the terminal.
#[derive(Clone, Debug)]
pub enum SlamEvent {
    Key(KeyEvent, Instant),
    Mouse(MouseButton, Instant),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, mouse, resize)
pub trait SlamEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<SlamEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<SlamEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let evt = match event::read() {
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    Some(SlamEvent::Key(key, Instant::now()))
                }
                Ok(CtEvent::Mouse(m)) => match m.kind {
                    MouseEventKind::Down(button) => Some(SlamEvent::Mouse(button, Instant::now())),
                    _ => None,
                },
                Ok(CtEvent::Resize(_, _)) => Some(SlamEvent::Resize),
                Ok(_) => None,
                Err(e) => {
                    log::error!("terminal input failed: {e}");
                    break;
                }
            };

            if let Some(evt) = evt {
                if tx.send(evt).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SlamEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<SlamEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for FixedTicker {
    fn default() -> Self {
        Self::new(POLL_INTERVAL)
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<SlamEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<SlamEvent>) -> Self {
        Self { rx }
    }
}

impl SlamEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<SlamEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time.
///
/// Ticks follow a fixed deadline schedule, so a burst of input never
/// delays the next poll.
pub struct Runner<E: SlamEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Instant,
}

impl<E: SlamEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Instant::now() + ticker.interval();
        Self {
            event_source,
            ticker,
            next_tick,
        }
    }

    /// Blocks until the next event or the next tick deadline, whichever comes first
    pub fn step(&mut self) -> SlamEvent {
        let now = Instant::now();
        if now >= self.next_tick {
            return self.tick(now);
        }

        match self.event_source.recv_timeout(self.next_tick - now) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => self.tick(Instant::now()),
            Err(RecvTimeoutError::Disconnected) => {
                // no producer left; keep the cadence anyway
                std::thread::sleep(self.next_tick.saturating_duration_since(Instant::now()));
                self.tick(Instant::now())
            }
        }
    }

    fn tick(&mut self, now: Instant) -> SlamEvent {
        self.next_tick += self.ticker.interval();
        // skip missed deadlines instead of bursting ticks
        if self.next_tick <= now {
            self.next_tick = now + self.ticker.interval();
        }
        SlamEvent::Tick
    }
}
