//! Weekly timetable generation for a teaching department.
//!
//! Students with a complete elective pair are split into lecture divisions and
//! lab batches, every division and batch is expanded into the sessions it must
//! attend, and the sessions are placed on (slot, room, instructor) triples by a
//! CP-SAT feasibility model with no student, room or instructor double-booked.
//!
//! ```no_run
//! use timetable_core::{Catalog, CpSatEngine, SchedulerConfig, TimetableStore};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = SchedulerConfig::load("scheduler.toml")?;
//! let catalog = Catalog::default();
//! let store = TimetableStore::open("timetable.bin")?;
//! let run = store.generate(&catalog, &config, &CpSatEngine::new(&config))?;
//! println!("{} classes placed", run.timetable.len());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod model;
pub mod partition;
pub mod pipeline;
pub mod report;
pub mod sessions;
pub mod store;
pub mod timetable;

pub use catalog::{Catalog, ChoiceMap, ElectivePair};
pub use config::{ConfigError, SchedulerConfig};
pub use error::{ConfigurationError, ErrorKind, InvariantViolation, ScheduleError, ScheduleResult};
pub use model::{CpSatEngine, EngineOutcome, FeasibilityEngine};
pub use partition::{Batch, Division, PartitionParams, partition};
pub use pipeline::{PartitionPlan, ScheduleRun, generate_timetable, plan};
pub use report::{ReportError, batch_list, batch_statistics, student_batch};
pub use sessions::{Session, build_sessions};
pub use store::{StoreError, TimetableStore};
pub use timetable::{Timetable, TimetableEntry, TimetableEntryView};
