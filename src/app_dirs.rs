use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join("assessr"))
        } else {
            ProjectDirs::from("", "", "assessr").map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    /// Locally preserved results, one row per completed attempt.
    pub fn results_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("results.csv"))
    }

    /// Ledger of the bundled local grading service.
    pub fn ledger_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("submissions.csv"))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("assessr.log"))
    }
}
