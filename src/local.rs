//! Filesystem-backed stand-ins for the remote services, so the binary can
//! run an assessment end to end without a backend.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::collaborators::{
    CandidateId, GradingService, ReferenceTest, SessionStartNotifier, SubmissionAck, TestFetch,
};
use crate::error::{AssessError, AssessResult};
use crate::reconciler::SubmissionRecord;

/// Reads `<dir>/<link>.json` as a [`ReferenceTest`].
#[derive(Debug, Clone)]
pub struct FileTestSource {
    dir: PathBuf,
}

impl FileTestSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl TestFetch for FileTestSource {
    fn fetch(&self, link: &str) -> AssessResult<ReferenceTest> {
        let valid_link = !link.is_empty()
            && link
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid_link {
            return Err(AssessError::NotFound(format!("invalid test link `{link}`")));
        }

        let path = self.dir.join(format!("{link}.json"));
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(AssessError::NotFound(format!("no test behind link `{link}`")))
            }
            Err(err) => return Err(err.into()),
        };

        let test: ReferenceTest = serde_json::from_slice(&bytes)?;
        if test.closed {
            return Err(AssessError::NotFound(format!("test `{}` is closed", test.test_id)));
        }
        debug!(link, test_id = %test.test_id, "test fetched");
        Ok(test)
    }
}

/// Authorizes every start and logs it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSessionGate;

impl SessionStartNotifier for LocalSessionGate {
    fn notify_start(
        &self,
        candidate: &CandidateId,
        test_id: &str,
        duration_seconds: u32,
    ) -> AssessResult<()> {
        info!(candidate = %candidate, test_id, duration_seconds, "session start acknowledged");
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct LedgerRow {
    session_id: String,
    candidate_id: String,
    test_id: String,
    wpm: u32,
    accuracy: u32,
    correct: u32,
    errors: u32,
    typed: u32,
    backspaces: u32,
    time_taken_secs: u32,
    duration_secs: u32,
    completed_at: String,
}

impl From<&SubmissionRecord> for LedgerRow {
    fn from(r: &SubmissionRecord) -> Self {
        Self {
            session_id: r.session_id.to_string(),
            candidate_id: r.candidate_id.to_string(),
            test_id: r.test_id.clone(),
            wpm: r.metrics.wpm,
            accuracy: r.metrics.accuracy_percent,
            correct: r.metrics.correct_character_count,
            errors: r.metrics.error_count,
            typed: r.metrics.total_typed_character_count,
            backspaces: r.backspace_count,
            time_taken_secs: r.time_taken_seconds,
            duration_secs: r.duration_seconds,
            completed_at: r.completed_at.to_rfc3339(),
        }
    }
}

/// A grading service that records each session at most once in a CSV file.
#[derive(Debug)]
pub struct CsvGradingLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvGradingLedger {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn contains(&self, session_id: &str) -> AssessResult<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        for row in reader.deserialize::<LedgerRow>() {
            if row?.session_id == session_id {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn len(&self) -> AssessResult<usize> {
        if !self.path.exists() {
            return Ok(0);
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        Ok(reader.records().count())
    }

    pub fn is_empty(&self) -> AssessResult<bool> {
        self.len().map(|n| n == 0)
    }
}

impl GradingService for CsvGradingLedger {
    fn submit(&self, record: &SubmissionRecord) -> AssessResult<SubmissionAck> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let row = LedgerRow::from(record);

        if self.contains(&row.session_id)? {
            return Ok(SubmissionAck {
                accepted: true,
                warnings: vec!["duplicate submission ignored".to_string()],
            });
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let needs_header = !self.path.exists();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(&row)?;
        writer.flush()?;

        Ok(SubmissionAck {
            accepted: true,
            warnings: vec![],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metrics;
    use crate::session::SessionId;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use tempfile::tempdir;

    fn write_test(dir: &Path, link: &str, closed: bool) {
        let test = ReferenceTest {
            test_id: format!("id-{link}"),
            reference_text: "the quick brown fox".into(),
            duration_options: vec![60, 120],
            instructions: "type it".into(),
            closed,
        };
        fs::write(dir.join(format!("{link}.json")), serde_json::to_vec(&test).unwrap()).unwrap();
    }

    fn record() -> SubmissionRecord {
        SubmissionRecord {
            session_id: SessionId::new(),
            candidate_id: CandidateId::parse("cand").unwrap(),
            test_id: "t".into(),
            metrics: Metrics {
                wpm: 40,
                accuracy_percent: 95,
                correct_character_count: 190,
                error_count: 10,
                total_typed_character_count: 200,
                backspace_count: 4,
            },
            backspace_count: 4,
            time_taken_seconds: 60,
            duration_seconds: 60,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn fetches_open_test() {
        let dir = tempdir().unwrap();
        write_test(dir.path(), "abc-1", false);
        let test = FileTestSource::new(dir.path()).fetch("abc-1").unwrap();
        assert_eq!(test.test_id, "id-abc-1");
        assert_eq!(test.duration_options, vec![60, 120]);
    }

    #[test]
    fn closed_or_missing_tests_are_not_found() {
        let dir = tempdir().unwrap();
        write_test(dir.path(), "shut", true);
        let source = FileTestSource::new(dir.path());
        assert_matches!(source.fetch("shut"), Err(AssessError::NotFound(_)));
        assert_matches!(source.fetch("absent"), Err(AssessError::NotFound(_)));
        assert_matches!(source.fetch("../etc/passwd"), Err(AssessError::NotFound(_)));
    }

    #[test]
    fn ledger_accepts_each_session_once() {
        let dir = tempdir().unwrap();
        let ledger = CsvGradingLedger::new(dir.path().join("ledger.csv"));
        let rec = record();

        let first = ledger.submit(&rec).unwrap();
        assert!(first.accepted);
        assert!(first.warnings.is_empty());

        let again = ledger.submit(&rec).unwrap();
        assert!(again.accepted);
        assert_eq!(again.warnings, vec!["duplicate submission ignored"]);

        ledger.submit(&record()).unwrap();
        assert_eq!(ledger.len().unwrap(), 2);
        assert!(ledger.contains(&rec.session_id.to_string()).unwrap());
    }
}
