use crate::control_system::phase::{Phase, PhaseChange};
use crate::shared_data::{current_timestamp, StateSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransitionLogError {
    #[error("transition log I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transition log CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One row of the transition log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub timestamp: u64,
    /// Controller clock reading when the new phase started.
    pub at_secs: f64,
    pub from: Phase,
    pub to: Phase,
    pub night_mode: bool,
    pub priority_queue: u32,
    pub non_priority_queue: u32,
}

impl TransitionRecord {
    pub fn new(change: &PhaseChange, snapshot: &StateSnapshot) -> Self {
        Self {
            timestamp: current_timestamp(),
            at_secs: change.at.as_secs_f64(),
            from: change.from,
            to: change.to,
            night_mode: change.night_mode,
            priority_queue: snapshot.queues.priority,
            non_priority_queue: snapshot.queues.non_priority,
        }
    }
}

/// Append-only CSV file of phase transitions.
#[derive(Debug, Clone)]
pub struct TransitionLog {
    path: PathBuf,
}

impl TransitionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record, writing the header only when the file is new or empty.
    pub fn append(&self, record: &TransitionRecord) -> Result<(), TransitionLogError> {
        let io_err = |source| TransitionLogError::Io {
            path: self.path.clone(),
            source,
        };
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(io_err)?;
        let is_empty = file.metadata().map_err(io_err)?.len() == 0;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(is_empty)
            .from_writer(file);
        wtr.serialize(record)?;
        wtr.flush().map_err(io_err)?;
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<TransitionRecord>, TransitionLogError> {
        let file = File::open(&self.path).map_err(|source| TransitionLogError::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut rdr = csv::Reader::from_reader(file);
        let mut records = Vec::new();
        for result in rdr.deserialize() {
            records.push(result?);
        }
        Ok(records)
    }
}

/// Counts over a transition log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionReport {
    pub total: usize,
    pub entries: HashMap<Phase, usize>,
    pub night_mode_transitions: usize,
    pub peak_queues: (u32, u32),
    pub span_secs: f64,
}

impl TransitionReport {
    pub fn from_records(records: &[TransitionRecord]) -> Self {
        let mut report = Self {
            total: records.len(),
            ..Self::default()
        };
        for record in records {
            *report.entries.entry(record.to).or_insert(0) += 1;
            if record.night_mode {
                report.night_mode_transitions += 1;
            }
            report.peak_queues.0 = report.peak_queues.0.max(record.priority_queue);
            report.peak_queues.1 = report.peak_queues.1.max(record.non_priority_queue);
        }
        if let (Some(first), Some(last)) = (records.first(), records.last()) {
            report.span_secs = (last.at_secs - first.at_secs).max(0.0);
        }
        report
    }

    pub fn from_log(log: &TransitionLog) -> Result<Self, TransitionLogError> {
        Ok(Self::from_records(&log.read_all()?))
    }

    pub fn entries_of(&self, phase: Phase) -> usize {
        self.entries.get(&phase).copied().unwrap_or(0)
    }

    pub fn print(&self) {
        println!("Report Summary:");
        println!("Transitions: {} over {:.1} s", self.total, self.span_secs);
        for phase in Phase::ALL {
            println!("  entered {:<18} {} times", phase.to_string(), self.entries_of(phase));
        }
        println!("Night mode transitions: {}", self.night_mode_transitions);
        println!(
            "Peak queues at transitions: priority {}, non-priority {}",
            self.peak_queues.0, self.peak_queues.1
        );
    }
}
