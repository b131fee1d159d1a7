use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::collaborators::{CandidateId, ReferenceTest, SessionStartNotifier, TestFetch};
use crate::diff::{self, CharacterComparison};
use crate::error::{AssessError, AssessResult};
use crate::metrics::Metrics;
use crate::reconciler::{SubmissionOutcome, SubmissionRecord, SubmissionSink, SubmissionStatus};
use crate::runtime::Scheduler;
use crate::session::{AssessmentSession, Phase, SessionId};

/// A single keystroke, as opposed to a whole replacement text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Backspace,
}

/// What an event did to the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Ignored,
    Updated,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum CompletionTrigger {
    #[strum(serialize = "reference finished")]
    TextFinished,
    #[strum(serialize = "time expired")]
    TimeExpired,
}

/// Owns one assessment attempt from start to reconciliation.
///
/// Every transition takes `&mut self`, so the owner serializes them; the
/// binary does so by feeding a single event channel through one loop.
pub struct Assessment {
    test: Option<ReferenceTest>,
    reference: Option<Arc<str>>,
    candidate: Option<CandidateId>,
    phase: Phase,
    session: Option<AssessmentSession>,
    final_metrics: Option<Metrics>,
    completed_by: Option<CompletionTrigger>,
    submission_status: Option<SubmissionStatus>,
    submission_message: Option<String>,
    scheduler: Arc<dyn Scheduler>,
    sink: Box<dyn SubmissionSink>,
    notifier: Box<dyn SessionStartNotifier>,
}

impl Assessment {
    pub fn new(
        scheduler: Arc<dyn Scheduler>,
        sink: Box<dyn SubmissionSink>,
        notifier: Box<dyn SessionStartNotifier>,
    ) -> Self {
        Self {
            test: None,
            reference: None,
            candidate: None,
            phase: Phase::Idle,
            session: None,
            final_metrics: None,
            completed_by: None,
            submission_status: None,
            submission_message: None,
            scheduler,
            sink,
            notifier,
        }
    }

    /// Install the test to be taken. Only allowed while idle.
    pub fn load(&mut self, test: ReferenceTest) -> AssessResult<()> {
        if self.phase != Phase::Idle {
            return Err(self.invalid("load"));
        }
        test.validate()?;
        info!(test_id = %test.test_id, chars = test.reference_text.chars().count(), "test loaded");
        self.reference = Some(Arc::from(test.reference_text.as_str()));
        self.test = Some(test);
        Ok(())
    }

    pub fn load_from(&mut self, source: &dyn TestFetch, link: &str) -> AssessResult<()> {
        let test = source.fetch(link)?;
        self.load(test)
    }

    pub fn set_candidate(&mut self, candidate: Option<CandidateId>) {
        self.candidate = candidate;
    }

    pub fn start(&mut self, duration_seconds: u32) -> AssessResult<SessionId> {
        if self.phase != Phase::Idle {
            return Err(self.invalid("start"));
        }
        let (test, reference) = match (&self.test, &self.reference) {
            (Some(test), Some(reference)) => (test, Arc::clone(reference)),
            _ => return Err(AssessError::NotReady),
        };
        let candidate = self.candidate.clone().ok_or(AssessError::MissingCandidate)?;
        if !test.allows_duration(duration_seconds) {
            return Err(AssessError::Validation(format!(
                "duration {duration_seconds}s is not offered by test `{}`",
                test.test_id
            )));
        }

        self.notifier
            .notify_start(&candidate, &test.test_id, duration_seconds)?;

        let mut session =
            AssessmentSession::new(candidate, test.test_id.clone(), reference, duration_seconds);
        session.timer.start()?;
        session.started_at = Some(Utc::now());
        let id = session.id;

        info!(
            session_id = %id,
            candidate = %session.candidate_id,
            test_id = %session.test_id,
            duration_seconds,
            "assessment started"
        );

        self.session = Some(session);
        self.final_metrics = None;
        self.completed_by = None;
        self.submission_status = None;
        self.submission_message = None;
        self.phase = Phase::Running;
        self.scheduler.start();

        Ok(id)
    }

    /// Replace the typed text wholesale.
    pub fn on_input(&mut self, typed: impl Into<Arc<str>>) -> Transition {
        self.apply_input(typed.into(), false)
    }

    pub fn on_key(&mut self, key: KeyInput) -> Transition {
        let phase = self.phase;
        let Some(session) = self.running_session() else {
            debug!(phase = %phase, ?key, "key ignored");
            return Transition::Ignored;
        };

        match key {
            KeyInput::Char(c) => {
                let mut typed = String::with_capacity(session.typed_text.len() + c.len_utf8());
                typed.push_str(&session.typed_text);
                typed.push(c);
                self.apply_input(Arc::from(typed), false)
            }
            KeyInput::Backspace => {
                let mut typed = session.typed_text.to_string();
                typed.pop();
                self.apply_input(Arc::from(typed), true)
            }
        }
    }

    pub fn on_tick(&mut self) -> Transition {
        self.on_elapsed(1)
    }

    /// Apply `ticks` whole seconds, as computed by a catching-up clock.
    pub fn on_elapsed(&mut self, ticks: u32) -> Transition {
        if ticks == 0 {
            return Transition::Ignored;
        }
        let phase = self.phase;
        let Some(session) = self.running_session_mut() else {
            debug!(phase = %phase, ticks, "tick ignored");
            return Transition::Ignored;
        };

        if session.timer.tick_many(ticks) {
            self.complete(CompletionTrigger::TimeExpired);
            Transition::Completed
        } else {
            Transition::Updated
        }
    }

    /// Abandon the current attempt, keeping the loaded test and candidate.
    pub fn restart(&mut self) {
        if self.phase == Phase::Idle {
            debug!("restart while idle");
            return;
        }
        self.scheduler.stop();
        if let Some(session) = self.session.take() {
            info!(session_id = %session.id, phase = %self.phase, "session discarded");
        }
        self.final_metrics = None;
        self.completed_by = None;
        self.submission_status = None;
        self.submission_message = None;
        self.phase = Phase::Idle;
    }

    /// Record the reconciler's verdict. Outcomes for any session other than
    /// the current completed one are dropped. Returns whether it was applied.
    pub fn on_submission(&mut self, session_id: SessionId, outcome: SubmissionOutcome) -> bool {
        let current = self.session.as_ref().map(|s| s.id);
        if self.phase != Phase::Completed
            || current != Some(session_id)
            || self.submission_status != Some(SubmissionStatus::Pending)
        {
            debug!(session_id = %session_id, "stale submission outcome dropped");
            return false;
        }

        let status = outcome.status();
        self.submission_message = match outcome {
            SubmissionOutcome::Succeeded { warnings } if warnings.is_empty() => None,
            SubmissionOutcome::Succeeded { warnings } => Some(warnings.join("; ")),
            SubmissionOutcome::Failed { reason } => Some(reason),
        };
        self.submission_status = Some(status);
        info!(session_id = %session_id, status = %status, "submission reconciled");
        true
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn test(&self) -> Option<&ReferenceTest> {
        self.test.as_ref()
    }

    pub fn session(&self) -> Option<&AssessmentSession> {
        self.session.as_ref()
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn reference_text(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn typed_text(&self) -> &str {
        self.session.as_ref().map_or("", |s| &s.typed_text)
    }

    /// Per-position comparison for rendering. Before a start, everything is
    /// still ahead of the cursor.
    pub fn comparisons(&self) -> Vec<CharacterComparison> {
        match (&self.session, &self.reference) {
            (Some(session), _) => session.comparisons(),
            (None, Some(reference)) => diff::compare(reference, ""),
            (None, None) => Vec::new(),
        }
    }

    /// Frozen once completed, live while running.
    pub fn metrics(&self) -> Metrics {
        match (&self.final_metrics, &self.session) {
            (Some(metrics), _) => *metrics,
            (None, Some(session)) => session.metrics(),
            (None, None) => Metrics::default(),
        }
    }

    pub fn final_metrics(&self) -> Option<Metrics> {
        self.final_metrics
    }

    pub fn remaining_seconds(&self) -> Option<u32> {
        self.session.as_ref().map(|s| s.remaining_seconds())
    }

    pub fn backspace_count(&self) -> u32 {
        self.session.as_ref().map_or(0, |s| s.backspace_count)
    }

    pub fn completed_by(&self) -> Option<CompletionTrigger> {
        self.completed_by
    }

    pub fn submission_status(&self) -> Option<SubmissionStatus> {
        self.submission_status
    }

    /// Failure reason or grading warnings from the last reconciliation.
    pub fn submission_message(&self) -> Option<&str> {
        self.submission_message.as_deref()
    }

    fn apply_input(&mut self, typed: Arc<str>, backspace_key: bool) -> Transition {
        let phase = self.phase;
        let Some(session) = self.running_session_mut() else {
            debug!(phase = %phase, "input ignored");
            return Transition::Ignored;
        };

        let shorter = typed.chars().count() < session.typed_len();
        if backspace_key || shorter {
            session.backspace_count = session.backspace_count.saturating_add(1);
        }
        session.typed_text = typed;

        if session.is_fully_typed() {
            self.complete(CompletionTrigger::TextFinished);
            Transition::Completed
        } else {
            Transition::Updated
        }
    }

    fn complete(&mut self, trigger: CompletionTrigger) {
        let Some(session) = self.session.as_ref().filter(|_| self.phase == Phase::Running) else {
            return;
        };

        self.scheduler.stop();
        let metrics = session.metrics();
        let record = SubmissionRecord {
            session_id: session.id,
            candidate_id: session.candidate_id.clone(),
            test_id: session.test_id.clone(),
            metrics,
            backspace_count: session.backspace_count,
            time_taken_seconds: session.elapsed_seconds(),
            duration_seconds: session.duration_seconds(),
            completed_at: Utc::now(),
        };

        info!(
            session_id = %session.id,
            trigger = %trigger,
            wpm = metrics.wpm,
            accuracy = metrics.accuracy_percent,
            errors = metrics.error_count,
            "assessment completed"
        );

        self.phase = Phase::Completed;
        self.final_metrics = Some(metrics);
        self.completed_by = Some(trigger);
        self.submission_status = Some(SubmissionStatus::Pending);
        self.submission_message = None;
        self.sink.dispatch(record);
    }

    fn running_session(&self) -> Option<&AssessmentSession> {
        self.session.as_ref().filter(|_| self.phase == Phase::Running)
    }

    fn running_session_mut(&mut self) -> Option<&mut AssessmentSession> {
        if self.phase != Phase::Running {
            return None;
        }
        self.session.as_mut()
    }

    fn invalid(&self, operation: &'static str) -> AssessError {
        warn!(operation, phase = %self.phase, "operation invalid for phase");
        AssessError::invalid_state(operation, self.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FlagScheduler {
        running: AtomicBool,
    }

    impl Scheduler for FlagScheduler {
        fn start(&self) {
            self.running.store(true, Ordering::SeqCst);
        }
        fn stop(&self) {
            self.running.store(false, Ordering::SeqCst);
        }
    }

    #[derive(Clone, Default)]
    struct CollectingSink(Arc<Mutex<Vec<SubmissionRecord>>>);

    impl SubmissionSink for CollectingSink {
        fn dispatch(&mut self, record: SubmissionRecord) {
            self.0.lock().unwrap().push(record);
        }
    }

    struct AllowAll;

    impl SessionStartNotifier for AllowAll {
        fn notify_start(&self, _: &CandidateId, _: &str, _: u32) -> AssessResult<()> {
            Ok(())
        }
    }

    struct Offline;

    impl SessionStartNotifier for Offline {
        fn notify_start(&self, _: &CandidateId, _: &str, _: u32) -> AssessResult<()> {
            Err(AssessError::Network("unreachable".into()))
        }
    }

    struct Harness {
        assessment: Assessment,
        scheduler: Arc<FlagScheduler>,
        sink: CollectingSink,
    }

    impl Harness {
        fn dispatched(&self) -> Vec<SubmissionRecord> {
            self.sink.0.lock().unwrap().clone()
        }

        fn ticking(&self) -> bool {
            self.scheduler.running.load(Ordering::SeqCst)
        }
    }

    fn reference_test(text: &str) -> ReferenceTest {
        ReferenceTest {
            test_id: "typing-1".into(),
            reference_text: text.into(),
            duration_options: vec![60, 120],
            instructions: String::new(),
            closed: false,
        }
    }

    fn harness(text: &str) -> Harness {
        let scheduler = Arc::new(FlagScheduler::default());
        let sink = CollectingSink::default();
        let mut assessment = Assessment::new(
            scheduler.clone(),
            Box::new(sink.clone()),
            Box::new(AllowAll),
        );
        assessment.load(reference_test(text)).unwrap();
        assessment.set_candidate(CandidateId::parse("cand-7"));
        Harness {
            assessment,
            scheduler,
            sink,
        }
    }

    #[test]
    fn start_moves_to_running_and_starts_ticking() {
        let mut h = harness("cat");
        assert_eq!(h.assessment.phase(), Phase::Idle);
        h.assessment.start(60).unwrap();

        assert_eq!(h.assessment.phase(), Phase::Running);
        assert_eq!(h.assessment.remaining_seconds(), Some(60));
        assert_eq!(h.assessment.typed_text(), "");
        assert!(h.ticking());
    }

    #[test]
    fn start_without_test_is_not_ready() {
        let mut assessment = Assessment::new(
            Arc::new(FlagScheduler::default()),
            Box::new(CollectingSink::default()),
            Box::new(AllowAll),
        );
        assessment.set_candidate(CandidateId::parse("cand"));
        assert_matches!(assessment.start(60), Err(AssessError::NotReady));
    }

    #[test]
    fn start_without_candidate_fails() {
        let mut h = harness("cat");
        h.assessment.set_candidate(None);
        assert_matches!(h.assessment.start(60), Err(AssessError::MissingCandidate));
        assert_eq!(h.assessment.phase(), Phase::Idle);
    }

    #[test]
    fn start_rejects_durations_the_test_does_not_offer() {
        let mut h = harness("cat");
        assert_matches!(h.assessment.start(45), Err(AssessError::Validation(_)));
        assert!(h.assessment.start(120).is_ok());
    }

    #[test]
    fn start_twice_is_invalid_state() {
        let mut h = harness("cat");
        h.assessment.start(60).unwrap();
        assert_matches!(
            h.assessment.start(60),
            Err(AssessError::InvalidState {
                operation: "start",
                phase: Phase::Running
            })
        );
    }

    #[test]
    fn failed_start_notification_keeps_idle() {
        let mut assessment = Assessment::new(
            Arc::new(FlagScheduler::default()),
            Box::new(CollectingSink::default()),
            Box::new(Offline),
        );
        assessment.load(reference_test("cat")).unwrap();
        assessment.set_candidate(CandidateId::parse("cand"));
        assert_matches!(assessment.start(60), Err(AssessError::Network(_)));
        assert_eq!(assessment.phase(), Phase::Idle);
    }

    #[test]
    fn empty_reference_cannot_be_loaded() {
        let mut h = harness("cat");
        assert_matches!(
            h.assessment.load(reference_test("")),
            Err(AssessError::Validation(_))
        );
    }

    #[test]
    fn finishing_the_text_completes_early() {
        let mut h = harness("cat");
        h.assessment.start(60).unwrap();

        assert_eq!(h.assessment.on_input("c"), Transition::Updated);
        assert_eq!(h.assessment.on_input("ca"), Transition::Updated);
        assert_eq!(h.assessment.on_input("cat"), Transition::Completed);

        assert_eq!(h.assessment.phase(), Phase::Completed);
        assert_eq!(h.assessment.remaining_seconds(), Some(60));
        assert_eq!(
            h.assessment.completed_by(),
            Some(CompletionTrigger::TextFinished)
        );
        assert!(!h.ticking());
    }

    #[test]
    fn time_expiry_completes_with_partial_text() {
        let reference = "a".repeat(100);
        let mut h = harness(&reference);
        h.assessment.start(60).unwrap();
        h.assessment.on_input("a".repeat(50));

        for _ in 0..59 {
            assert_eq!(h.assessment.on_tick(), Transition::Updated);
        }
        assert_eq!(h.assessment.on_tick(), Transition::Completed);

        let metrics = h.assessment.metrics();
        assert_eq!(h.assessment.phase(), Phase::Completed);
        assert_eq!(metrics.accuracy_percent, 100);
        assert_eq!(metrics.wpm, 10);
        assert_eq!(
            h.assessment.completed_by(),
            Some(CompletionTrigger::TimeExpired)
        );
    }

    #[test]
    fn coalesced_ticks_complete_once() {
        let mut h = harness("hello world");
        h.assessment.start(60).unwrap();
        assert_eq!(h.assessment.on_elapsed(90), Transition::Completed);
        assert_eq!(h.assessment.remaining_seconds(), Some(0));
        assert_eq!(h.dispatched().len(), 1);
    }

    #[test]
    fn completion_is_terminal() {
        let mut h = harness("cat");
        h.assessment.start(60).unwrap();
        h.assessment.on_tick();
        h.assessment.on_input("cat");

        assert_eq!(h.assessment.on_input("catx"), Transition::Ignored);
        assert_eq!(h.assessment.on_key(KeyInput::Backspace), Transition::Ignored);
        assert_eq!(h.assessment.on_tick(), Transition::Ignored);
        assert_eq!(h.assessment.typed_text(), "cat");
        assert_eq!(h.assessment.remaining_seconds(), Some(59));
        assert_eq!(h.assessment.backspace_count(), 0);
    }

    #[test]
    fn input_before_start_is_ignored() {
        let mut h = harness("cat");
        assert_eq!(h.assessment.on_input("c"), Transition::Ignored);
        assert_eq!(h.assessment.on_key(KeyInput::Char('c')), Transition::Ignored);
        assert_eq!(h.assessment.on_tick(), Transition::Ignored);
    }

    #[test]
    fn reconciler_invoked_exactly_once_with_full_payload() {
        let mut h = harness("ab");
        h.assessment.start(60).unwrap();
        h.assessment.on_elapsed(6);
        h.assessment.on_key(KeyInput::Char('x'));
        h.assessment.on_key(KeyInput::Backspace);
        h.assessment.on_key(KeyInput::Char('a'));
        h.assessment.on_key(KeyInput::Char('b'));
        h.assessment.on_tick();

        let records = h.dispatched();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(Some(record.session_id), h.assessment.session_id());
        assert_eq!(record.candidate_id.as_str(), "cand-7");
        assert_eq!(record.test_id, "typing-1");
        assert_eq!(record.backspace_count, 1);
        assert_eq!(record.time_taken_seconds, 6);
        assert_eq!(record.duration_seconds, 60);
        assert_eq!(record.metrics.correct_character_count, 2);
        // 2 chars / 5 per word over 6s = 4 wpm
        assert_eq!(record.metrics.wpm, 4);
        assert_eq!(
            h.assessment.submission_status(),
            Some(SubmissionStatus::Pending)
        );
    }

    #[test]
    fn backspace_count_never_decreases() {
        let mut h = harness("hello world");
        h.assessment.start(60).unwrap();

        let mut last = 0;
        for input in ["h", "hx", "h", "he", "hel", "he", "h", "he", "hel"] {
            h.assessment.on_input(input);
            let count = h.assessment.backspace_count();
            assert!(count >= last);
            last = count;
        }
        assert_eq!(last, 3);
    }

    #[test]
    fn backspace_key_counts_even_on_empty_text() {
        let mut h = harness("cat");
        h.assessment.start(60).unwrap();
        h.assessment.on_key(KeyInput::Backspace);
        assert_eq!(h.assessment.backspace_count(), 1);
        assert_eq!(h.assessment.typed_text(), "");
    }

    #[test]
    fn restart_discards_history() {
        let mut h = harness("hello");
        let first = h.assessment.start(60).unwrap();
        h.assessment.on_input("hx");
        h.assessment.on_input("h");
        h.assessment.on_tick();
        assert_eq!(h.assessment.backspace_count(), 1);

        h.assessment.restart();
        assert_eq!(h.assessment.phase(), Phase::Idle);
        assert!(!h.ticking());
        assert!(h.assessment.session().is_none());

        let second = h.assessment.start(60).unwrap();
        assert_ne!(first, second);
        assert_eq!(h.assessment.backspace_count(), 0);
        assert_eq!(h.assessment.typed_text(), "");
        assert_eq!(h.assessment.remaining_seconds(), Some(60));
        assert!(h.dispatched().is_empty());
    }

    #[test]
    fn restart_after_completion_clears_results() {
        let mut h = harness("ab");
        h.assessment.start(60).unwrap();
        h.assessment.on_input("ab");
        assert!(h.assessment.final_metrics().is_some());

        h.assessment.restart();
        assert_eq!(h.assessment.phase(), Phase::Idle);
        assert!(h.assessment.final_metrics().is_none());
        assert!(h.assessment.submission_status().is_none());
        assert_eq!(h.assessment.metrics(), Metrics::default());
    }

    #[test]
    fn submission_outcome_updates_status() {
        let mut h = harness("ab");
        let id = h.assessment.start(60).unwrap();
        h.assessment.on_input("ab");

        assert!(h.assessment.on_submission(
            id,
            SubmissionOutcome::Failed {
                reason: "503".into()
            }
        ));
        assert_eq!(
            h.assessment.submission_status(),
            Some(SubmissionStatus::Failed)
        );
        assert_eq!(h.assessment.submission_message(), Some("503"));
        // the score is still there
        assert_eq!(h.assessment.phase(), Phase::Completed);
        assert_eq!(h.assessment.metrics().correct_character_count, 2);
    }

    #[test]
    fn late_outcome_for_superseded_session_is_dropped() {
        let mut h = harness("ab");
        let old = h.assessment.start(60).unwrap();
        h.assessment.on_input("ab");
        h.assessment.restart();
        let new = h.assessment.start(60).unwrap();
        h.assessment.on_input("ab");

        let applied = h.assessment.on_submission(
            old,
            SubmissionOutcome::Succeeded { warnings: vec![] },
        );
        assert!(!applied);
        assert_eq!(
            h.assessment.submission_status(),
            Some(SubmissionStatus::Pending)
        );

        assert!(h
            .assessment
            .on_submission(new, SubmissionOutcome::Succeeded { warnings: vec![] }));
        assert_eq!(
            h.assessment.submission_status(),
            Some(SubmissionStatus::Succeeded)
        );
    }

    #[test]
    fn second_outcome_for_same_session_is_dropped() {
        let mut h = harness("ab");
        let id = h.assessment.start(60).unwrap();
        h.assessment.on_input("ab");
        assert!(h
            .assessment
            .on_submission(id, SubmissionOutcome::Succeeded { warnings: vec![] }));
        assert!(!h.assessment.on_submission(
            id,
            SubmissionOutcome::Failed {
                reason: "late".into()
            }
        ));
        assert_eq!(
            h.assessment.submission_status(),
            Some(SubmissionStatus::Succeeded)
        );
    }

    #[test]
    fn comparisons_track_the_cursor() {
        let mut h = harness("abc");
        assert_eq!(
            h.assessment.comparisons(),
            vec![
                CharacterComparison::Current,
                CharacterComparison::Pending,
                CharacterComparison::Pending
            ]
        );
        h.assessment.start(60).unwrap();
        h.assessment.on_key(KeyInput::Char('a'));
        h.assessment.on_key(KeyInput::Char('x'));
        assert_eq!(
            h.assessment.comparisons(),
            vec![
                CharacterComparison::Correct,
                CharacterComparison::Incorrect,
                CharacterComparison::Current
            ]
        );
    }

    #[test]
    fn frozen_metrics_match_recomputation() {
        let mut h = harness("abcd");
        h.assessment.start(60).unwrap();
        h.assessment.on_elapsed(3);
        h.assessment.on_input("abxd");
        let frozen = h.assessment.final_metrics().unwrap();
        let recomputed = h.assessment.session().unwrap().metrics();
        assert_eq!(frozen, recomputed);
    }

    #[test]
    fn load_while_running_is_invalid() {
        let mut h = harness("cat");
        h.assessment.start(60).unwrap();
        assert_matches!(
            h.assessment.load(reference_test("dog")),
            Err(AssessError::InvalidState {
                operation: "load",
                ..
            })
        );
    }
}
