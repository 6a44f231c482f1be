//! Holds the current timetable and serializes generation runs.
//!
//! A run lock is held from start to finish, so two concurrent requests never
//! interleave. The timetable itself sits behind its own lock, taken only to
//! read it or to swap in a new one, so readers are not held up by a solve.
//! The swap happens only after a run succeeds (and, for a file-backed store,
//! after the snapshot is written); any failure leaves the previous timetable
//! in place, in memory and on disk.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::config::SchedulerConfig;
use crate::error::ScheduleError;
use crate::model::FeasibilityEngine;
use crate::pipeline::{ScheduleRun, generate_timetable};
use crate::timetable::{Timetable, TimetableEntryView};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Persist(#[from] anyhow::Error),
}

#[derive(Debug, Default)]
pub struct TimetableStore {
    run: Mutex<()>,
    current: Mutex<Timetable>,
    snapshot: Option<PathBuf>,
}

// Both locks guard data that is only ever replaced whole, so a poisoned lock
// still holds a consistent value.
fn recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TimetableStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// File-backed store. An existing snapshot at `path` is loaded; a missing
    /// one starts empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let current = if path.exists() {
            Timetable::load(&path)?
        } else {
            Timetable::default()
        };
        Ok(Self {
            run: Mutex::new(()),
            current: Mutex::new(current),
            snapshot: Some(path),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Timetable> {
        recover(&self.current)
    }

    pub fn timetable(&self) -> Timetable {
        self.lock().clone()
    }

    pub fn views(&self, catalog: &Catalog) -> Vec<TimetableEntryView> {
        self.lock().flatten(catalog)
    }

    /// Runs the pipeline and, on success, replaces the stored timetable.
    pub fn generate<E: FeasibilityEngine + ?Sized>(
        &self,
        catalog: &Catalog,
        config: &SchedulerConfig,
        engine: &E,
    ) -> Result<ScheduleRun, StoreError> {
        let _run = recover(&self.run);

        let run = match generate_timetable(catalog, config, engine) {
            Ok(run) => run,
            Err(e) => {
                warn!(
                    event = "generate_failed",
                    kind = ?e.kind(),
                    retryable = e.is_retryable(),
                    error = %e,
                    kept_entries = self.lock().len(),
                );
                return Err(e.into());
            }
        };

        if let Some(path) = &self.snapshot {
            run.timetable.save(path)?;
        }
        let mut current = self.lock();
        *current = run.timetable.clone();
        info!(event = "timetable_replaced", entries = current.len());
        Ok(run)
    }
}
