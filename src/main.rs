mod ui;

use std::{
    error::Error,
    fs::OpenOptions,
    io::{self, stdin},
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use assessr::{
    app_dirs::AppDirs,
    assessment::{Assessment, KeyInput, Transition},
    collaborators::{CandidateId, ReferenceTest, TestFetch},
    config::{Config, ConfigStore, FileConfigStore},
    local::{CsvGradingLedger, FileTestSource, LocalSessionGate},
    logging,
    reconciler::ResultReconciler,
    results::{ResultLog, ResultRow},
    runtime::{AssessmentEvent, CrosstermEventSource, FixedTicker, Runner, TickClock},
    session::{Phase, SessionId},
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{info, warn};

const TICK_RATE_MS: u64 = 100;

/// timed typing assessment with live wpm, accuracy and result submission
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// link (id) of the test to fetch from the tests directory
    #[clap(short = 't', long = "test")]
    test_link: Option<String>,

    /// custom reference text to type instead of a fetched test
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// candidate identity the result is recorded under
    #[clap(short = 'c', long)]
    candidate: Option<String>,

    /// number of seconds to run the test; must be one the test offers
    #[clap(short = 'd', long)]
    duration: Option<u32>,

    /// directory holding `<link>.json` test definitions
    #[clap(long)]
    tests_dir: Option<PathBuf>,

    /// csv file the local grading service records submissions in
    #[clap(long)]
    ledger: Option<PathBuf>,
}

pub struct App {
    pub assessment: Assessment,
    pub clock: Arc<TickClock>,
    pub duration_options: Vec<u32>,
    pub duration_secs: u32,
    pub banner: Option<String>,
    result_log: Option<ResultLog>,
    logged_session: Option<SessionId>,
}

impl App {
    fn cycle_duration(&mut self, forward: bool) {
        if self.duration_options.is_empty() {
            return;
        }
        let len = self.duration_options.len();
        let idx = self
            .duration_options
            .iter()
            .position(|d| *d == self.duration_secs)
            .unwrap_or(0);
        let next = if forward { (idx + 1) % len } else { (idx + len - 1) % len };
        self.duration_secs = self.duration_options[next];
    }

    fn start(&mut self) {
        match self.assessment.start(self.duration_secs) {
            Ok(_) => self.banner = None,
            Err(err) => {
                warn!(error = %err, code = err.error_code(), "could not start");
                self.banner = Some(err.to_string());
            }
        }
    }

    fn restart(&mut self) {
        self.preserve_result();
        self.assessment.restart();
    }

    /// Write the completed result to the local log, once per session.
    fn preserve_result(&mut self) {
        let Some(row) = ResultRow::from_assessment(&self.assessment) else {
            return;
        };
        let session_id = self.assessment.session_id();
        if session_id.is_none() || self.logged_session == session_id {
            return;
        }
        if let Some(log) = &self.result_log {
            match log.append(&row) {
                Ok(()) => self.logged_session = session_id,
                Err(err) => warn!(error = %err, "could not preserve result locally"),
            }
        }
    }

    fn catch_up(&mut self) {
        let ticks = self.clock.elapsed_ticks(Instant::now());
        self.assessment.on_elapsed(ticks);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging();

    let config = FileConfigStore::new().load();
    let test = match resolve_test(&cli, &config) {
        Ok(test) => test,
        Err(msg) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, msg).exit();
        }
    };

    let duration_options = if test.duration_options.is_empty() {
        config.duration_options.clone()
    } else {
        test.duration_options.clone()
    };
    let duration_secs = cli
        .duration
        .or_else(|| duration_options.first().copied())
        .unwrap_or(config.default_duration_secs);

    let ledger_path = cli
        .ledger
        .clone()
        .or_else(AppDirs::ledger_path)
        .unwrap_or_else(|| PathBuf::from("assessr_submissions.csv"));

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let reconciler = ResultReconciler::new(
        Arc::new(CsvGradingLedger::new(ledger_path)),
        config.retry_policy(),
        runner.sender(),
    );
    let clock = Arc::new(TickClock::per_second());

    let mut assessment = Assessment::new(
        clock.clone(),
        Box::new(reconciler),
        Box::new(LocalSessionGate),
    );
    assessment.load(test)?;
    assessment.set_candidate(cli.candidate.as_deref().and_then(CandidateId::parse));

    let mut app = App {
        assessment,
        clock,
        duration_options,
        duration_secs,
        banner: None,
        result_log: AppDirs::results_path().map(ResultLog::new),
        logged_session: None,
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.preserve_result();
    outcome
}

fn init_logging() {
    let file = AppDirs::log_path().and_then(|path| {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok()?;
        }
        OpenOptions::new().create(true).append(true).open(path).ok()
    });
    if let Some(file) = file {
        logging::init_with_writer(Mutex::new(file));
    }
}

fn resolve_test(cli: &Cli, config: &Config) -> Result<ReferenceTest, String> {
    if let Some(prompt) = &cli.prompt {
        let test = ReferenceTest {
            test_id: "custom".to_string(),
            reference_text: prompt.clone(),
            duration_options: config.duration_options.clone(),
            instructions: "Type the text as accurately as you can.".to_string(),
            closed: false,
        };
        test.validate().map_err(|e| e.to_string())?;
        return Ok(test);
    }

    let Some(link) = &cli.test_link else {
        return Err("either --test <link> or --prompt <text> is required".to_string());
    };
    let dir = cli
        .tests_dir
        .clone()
        .or_else(|| config.tests_dir.clone())
        .unwrap_or_else(|| PathBuf::from("assessments"));
    FileTestSource::new(dir)
        .fetch(link)
        .map_err(|e| e.to_string())
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<CrosstermEventSource, FixedTicker>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    loop {
        if !on_event(app, runner.step()) {
            info!("quit requested");
            break;
        }
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
    }

    Ok(())
}

/// Settle owed countdown seconds, then apply `event`. Keys buffered while
/// the process was stalled must not land after the time has run out.
///
/// Returns false when the user asked to quit.
fn on_event(app: &mut App, event: AssessmentEvent) -> bool {
    app.catch_up();

    match event {
        AssessmentEvent::Tick | AssessmentEvent::Resize => true,
        AssessmentEvent::Submission {
            session_id,
            outcome,
        } => {
            if app.assessment.on_submission(session_id, outcome) {
                app.preserve_result();
            }
            true
        }
        AssessmentEvent::Key(key) => handle_key(app, key),
    }
}

/// Returns false when the user asked to quit.
fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.code == KeyCode::Esc
        || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
    {
        return false;
    }

    match (app.assessment.phase(), key.code) {
        (_, KeyCode::Tab) => app.restart(),
        (Phase::Idle, KeyCode::Enter) => app.start(),
        (Phase::Idle, KeyCode::Left) => app.cycle_duration(false),
        (Phase::Idle, KeyCode::Right) => app.cycle_duration(true),
        (Phase::Running, KeyCode::Backspace) => {
            app.assessment.on_key(KeyInput::Backspace);
        }
        (Phase::Running, KeyCode::Char(c)) => {
            if app.assessment.on_key(KeyInput::Char(c)) == Transition::Completed {
                info!("reference finished");
            }
        }
        _ => {}
    }
    true
}
