// ============================================================
// Layer 7 — Run Log
// ============================================================
// Appends one human-readable line per epoch to
// `<checkpoint_dir>/log.txt`:
//
//   Epoch:[  1 | 180] LR: 0.1000, Loss(Tr): 1.8123, Loss(Tt): 1.5530, Acc(Tr): 0.3311, Acc(Tt): 0.4402
//
// The file is opened in append mode for every line, so resumed
// runs continue the same log instead of truncating it. Each line
// is mirrored to tracing at info level.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::{error::TrainError, records::EpochRecord};

pub const LOG_FILE: &str = "log.txt";

pub struct RunLog {
    /// `<dir>/log.txt`
    path: PathBuf,
    /// Printed as the denominator of every epoch line
    total_epochs: usize,
}

impl RunLog {
    /// Open the log in `dir`, writing a title line for this run.
    pub fn open(dir: &Path, title: &str, total_epochs: usize) -> Result<Self, TrainError> {
        fs::create_dir_all(dir).map_err(|e| TrainError::io(dir, e))?;
        let log = Self { path: dir.join(LOG_FILE), total_epochs };
        log.append(&format!("==> {title}"))?;
        Ok(log)
    }

    pub fn log_epoch(&self, record: &EpochRecord) -> Result<(), TrainError> {
        let line = record.summary_line(self.total_epochs);
        tracing::info!("{line}");
        self.append(&line)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> Result<(), TrainError> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| TrainError::io(&self.path, e))?;
        writeln!(f, "{line}").map_err(|e| TrainError::io(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::EpochStats;

    fn record(epoch: usize) -> EpochRecord {
        EpochRecord::new(epoch, 0.1, EpochStats::new(2.0, 20.0, 60.0), EpochStats::new(1.9, 25.0, 65.0))
    }

    #[test]
    fn appends_one_line_per_epoch() {
        let tmp = tempfile::tempdir().unwrap();
        let log = RunLog::open(tmp.path(), "resnet32-r100", 3).unwrap();
        log.log_epoch(&record(0)).unwrap();
        log.log_epoch(&record(1)).unwrap();

        let text = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "==> resnet32-r100");
        assert!(lines[1].starts_with("Epoch:[  1 | 3]"));
        assert!(lines[2].starts_with("Epoch:[  2 | 3]"));
    }

    #[test]
    fn reopening_keeps_previous_lines() {
        let tmp = tempfile::tempdir().unwrap();
        RunLog::open(tmp.path(), "run", 2).unwrap().log_epoch(&record(0)).unwrap();
        RunLog::open(tmp.path(), "run (resumed)", 2).unwrap().log_epoch(&record(1)).unwrap();

        let text = fs::read_to_string(tmp.path().join(LOG_FILE)).unwrap();
        assert_eq!(text.lines().count(), 4);
    }
}
