use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

use crate::assessment::Assessment;
use crate::error::AssessResult;

/// One completed attempt as written to the local results log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub date: String,
    pub session_id: String,
    pub candidate: String,
    pub test_id: String,
    pub duration_secs: u32,
    pub elapsed_secs: u32,
    pub wpm: u32,
    pub accuracy: u32,
    pub correct: u32,
    pub errors: u32,
    pub typed: u32,
    pub backspaces: u32,
    pub submission: String,
}

impl ResultRow {
    /// None unless the assessment has completed.
    pub fn from_assessment(assessment: &Assessment) -> Option<Self> {
        let metrics = assessment.final_metrics()?;
        let session = assessment.session()?;
        Some(Self {
            date: Local::now().format("%c").to_string(),
            session_id: session.id.to_string(),
            candidate: session.candidate_id.to_string(),
            test_id: session.test_id.clone(),
            duration_secs: session.duration_seconds(),
            elapsed_secs: session.elapsed_seconds(),
            wpm: metrics.wpm,
            accuracy: metrics.accuracy_percent,
            correct: metrics.correct_character_count,
            errors: metrics.error_count,
            typed: metrics.total_typed_character_count,
            backspaces: metrics.backspace_count,
            submission: assessment
                .submission_status()
                .map_or_else(String::new, |s| s.to_string()),
        })
    }
}

/// Append-only CSV of completed results, kept regardless of whether the
/// grading service took them.
#[derive(Debug, Clone)]
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, row: &ResultRow) -> AssessResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // If the log doesn't exist yet, the writer must emit a header
        let needs_header = !self.path.exists();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(row)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_all(&self) -> AssessResult<Vec<csv::StringRecord>> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn row(session_id: &str, wpm: u32) -> ResultRow {
        ResultRow {
            date: "today".into(),
            session_id: session_id.into(),
            candidate: "cand".into(),
            test_id: "t".into(),
            duration_secs: 60,
            elapsed_secs: 42,
            wpm,
            accuracy: 97,
            correct: 180,
            errors: 5,
            typed: 185,
            backspaces: 3,
            submission: "failed".into(),
        }
    }

    #[test]
    fn header_is_written_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("results.csv");
        let log = ResultLog::new(&path);

        log.append(&row("s1", 51)).unwrap();
        log.append(&row("s2", 64)).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("session_id").count(), 1);

        let rows = log.read_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[1][1], "s2");
        assert_eq!(&rows[1][6], "64");
    }
}
