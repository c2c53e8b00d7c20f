pub mod activity;
pub(crate) mod activity_validation;
pub(crate) mod calculations;
pub mod error;
pub mod graph;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod metadata;
pub mod persistence;
pub mod project;
pub mod schedule;
pub mod table;

pub use activity::{Activity, ActivityId};
pub use error::{CpmError, CycleError, ValidationError};
pub use graph::ActivityGraph;
pub use metadata::ProjectMetadata;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteProjectStore;
pub use persistence::{
    PersistenceError, ProjectStore, export_schedule_to_csv, import_activities_csv,
    load_project_from_csv, load_project_from_json, save_project_to_csv, save_project_to_json,
};
pub use project::Project;
pub use schedule::{
    CpmEngine, ScheduleEntry, ScheduleResult, ScheduleSummary, TimelineBar, compute_batch,
    compute_schedule,
};
