use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::reconciler::SubmissionOutcome;
use crate::session::SessionId;

/// Everything the event loop reacts to, serialized through one channel.
#[derive(Clone, Debug)]
pub enum AssessmentEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    Submission {
        session_id: SessionId,
        outcome: SubmissionOutcome,
    },
}

pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AssessmentEvent, RecvTimeoutError>;

    /// Handle for producers outside the terminal, such as the reconciler.
    fn sender(&self) -> Sender<AssessmentEvent>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<AssessmentEvent>,
    rx: Receiver<AssessmentEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => input_tx.send(AssessmentEvent::Key(key)),
                Ok(CtEvent::Resize(_, _)) => input_tx.send(AssessmentEvent::Resize),
                Ok(_) => Ok(()),
                Err(_) => break,
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { tx, rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AssessmentEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<AssessmentEvent> {
        self.tx.clone()
    }
}

/// Channel-backed source for tests
pub struct TestEventSource {
    tx: Sender<AssessmentEvent>,
    rx: Receiver<AssessmentEvent>,
}

impl TestEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl Default for TestEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AssessmentEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    fn sender(&self) -> Sender<AssessmentEvent> {
        self.tx.clone()
    }
}

pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Advances the application one event at a time
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to one tick interval; yields Tick on timeout.
    pub fn step(&self) -> AssessmentEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                AssessmentEvent::Tick
            }
        }
    }

    pub fn sender(&self) -> Sender<AssessmentEvent> {
        self.event_source.sender()
    }
}

/// Told by the state machine when the countdown should run.
pub trait Scheduler: Send + Sync {
    fn start(&self);
    fn stop(&self);
}

/// Converts wall-clock time into whole countdown seconds.
///
/// Callbacks may arrive late or be coalesced, so the number of seconds owed
/// is computed from the delta since the last one handed out; the fractional
/// remainder carries over.
#[derive(Debug)]
pub struct TickClock {
    period: Duration,
    anchor: Mutex<Option<Instant>>,
}

impl TickClock {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            anchor: Mutex::new(None),
        }
    }

    pub fn per_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    pub fn start_at(&self, now: Instant) {
        *self.lock() = Some(now);
    }

    /// Whole periods elapsed since the last call, zero while stopped.
    pub fn elapsed_ticks(&self, now: Instant) -> u32 {
        let mut anchor = self.lock();
        let Some(since) = *anchor else {
            return 0;
        };
        if self.period.is_zero() {
            return 0;
        }

        let elapsed = now.saturating_duration_since(since);
        let ticks = (elapsed.as_nanos() / self.period.as_nanos()) as u32;
        if ticks > 0 {
            *anchor = Some(since + self.period * ticks);
        }
        ticks
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Instant>> {
        self.anchor.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Scheduler for TickClock {
    fn start(&self) {
        self.start_at(Instant::now());
    }

    fn stop(&self) {
        *self.lock() = None;
    }
}
