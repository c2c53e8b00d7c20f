use crate::Project;
use crate::error::ValidationError;
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid activities: {0}")]
    Validation(#[from] ValidationError),
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait ProjectStore {
    fn save_project(&self, project: &Project) -> PersistenceResult<()>;
    fn load_project(&self) -> PersistenceResult<Option<Project>>;
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    export_schedule_to_csv, import_activities_csv, load_project_from_csv, load_project_from_json,
    save_project_to_csv, save_project_to_json,
};
