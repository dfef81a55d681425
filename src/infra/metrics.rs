// ============================================================
// Layer 6 — Scalar Logger
// ============================================================
// Records scalar training curves (e.g. "Loss/train") to a CSV
// file so they can be plotted after or during a run.
//
// Output file: <log_dir>/scalars.csv
//
// Example CSV output:
//   tag,step,value
//   Loss/train,0,0.912345
//   Loss/train,1,0.781200
//   ...
//
// Rows are buffered by add_scalar() and appended on flush().
// Re-running into the same directory appends to the same file.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

use crate::domain::traits::ScalarSink;

/// One logged point of a scalar curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarRecord {
    pub tag:   String,
    pub step:  usize,
    pub value: f64,
}

/// CSV-backed `ScalarSink`.
pub struct ScalarLogger {
    csv_path: PathBuf,
    pending:  Vec<ScalarRecord>,
}

impl ScalarLogger {
    /// Create the log directory and write the CSV header if the file is new.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create log dir '{}'", dir.display()))?;

        let csv_path = dir.join("scalars.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "tag,step,value")?;
            tracing::debug!("Created scalar log: '{}'", csv_path.display());
        }

        Ok(Self { csv_path, pending: Vec::new() })
    }
}

impl ScalarSink for ScalarLogger {
    fn add_scalar(&mut self, tag: &str, value: f64, step: usize) -> Result<()> {
        if tag.contains(',') {
            anyhow::bail!("Scalar tag '{tag}' must not contain ','");
        }
        self.pending.push(ScalarRecord { tag: tag.to_string(), step, value });
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open '{}'", self.csv_path.display()))?;

        for r in self.pending.drain(..) {
            writeln!(f, "{},{},{:.6}", r.tag, r.step, r.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_rows(log: &ScalarLogger) -> Vec<ScalarRecord> {
        let text = fs::read_to_string(&log.csv_path).unwrap();
        text.lines()
            .skip(1)
            .filter(|l| !l.trim().is_empty())
            .map(|line| {
                // tags may contain '/', never ','
                let cols: Vec<&str> = line.splitn(3, ',').collect();
                ScalarRecord {
                    tag:   cols[0].to_string(),
                    step:  cols[1].parse().unwrap(),
                    value: cols[2].parse().unwrap(),
                }
            })
            .collect()
    }

    #[test]
    fn test_rows_written_on_flush() {
        let tmp = tempfile::tempdir().unwrap();
        let mut log = ScalarLogger::new(tmp.path()).unwrap();

        log.add_scalar("Loss/train", 0.5, 0).unwrap();
        assert!(read_rows(&log).is_empty());

        log.flush().unwrap();
        let rows = read_rows(&log);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tag, "Loss/train");
        assert_eq!(rows[0].step, 0);
        assert!((rows[0].value - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_reopening_appends() {
        let tmp = tempfile::tempdir().unwrap();
        {
            let mut log = ScalarLogger::new(tmp.path()).unwrap();
            log.add_scalar("Loss/train", 1.0, 0).unwrap();
            log.flush().unwrap();
        }
        let mut log = ScalarLogger::new(tmp.path()).unwrap();
        log.add_scalar("Loss/train", 0.9, 1).unwrap();
        log.flush().unwrap();

        let steps: Vec<usize> = read_rows(&log).iter().map(|r| r.step).collect();
        assert_eq!(steps, vec![0, 1]);
    }

    #[test]
    fn test_comma_in_tag_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let mut log = ScalarLogger::new(tmp.path()).unwrap();
        assert!(log.add_scalar("a,b", 1.0, 0).is_err());
    }
}
