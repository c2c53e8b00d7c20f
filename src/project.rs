use crate::activity::{Activity, ActivityId};
use crate::activity_validation::{validate_activity, validate_activity_collection};
use crate::error::{CpmError, ValidationError};
use crate::metadata::ProjectMetadata;
use crate::schedule::{ScheduleResult, compute_schedule};
use serde::{Deserialize, Serialize};

/// Editable activity list owned by a presentation layer. The engine only ever
/// sees a cloned snapshot of it, so edits never race a running computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    metadata: ProjectMetadata,
    activities: Vec<Activity>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_with_metadata(metadata: ProjectMetadata) -> Self {
        Self {
            metadata,
            activities: Vec::new(),
        }
    }

    /// Rebuilds a project from stored parts, enforcing the full graph contract.
    pub fn from_parts(
        metadata: ProjectMetadata,
        activities: Vec<Activity>,
    ) -> Result<Self, ValidationError> {
        validate_activity_collection(&activities)?;
        Ok(Self {
            metadata,
            activities,
        })
    }

    pub fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    pub fn set_metadata(&mut self, metadata: ProjectMetadata) {
        self.metadata = metadata;
    }

    pub fn set_project_name(&mut self, name: impl Into<String>) {
        self.metadata.project_name = name.into();
    }

    pub fn set_project_description(&mut self, description: impl Into<String>) {
        self.metadata.project_description = description.into();
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn find_activity(&self, id: ActivityId) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    pub fn next_id(&self) -> ActivityId {
        self.activities
            .iter()
            .map(|a| a.id)
            .max()
            .map(|m| m + 1)
            .unwrap_or(1)
    }

    /// Inserts or replaces by id. Activity-local rules are checked here;
    /// references to other activities are checked when the project is computed.
    pub fn upsert_activity(&mut self, activity: Activity) -> Result<(), ValidationError> {
        validate_activity(&activity)?;
        match self.activities.iter_mut().find(|a| a.id == activity.id) {
            Some(existing) => *existing = activity,
            None => self.activities.push(activity),
        }
        Ok(())
    }

    /// Appends a new activity under `next_id()` and returns that id.
    pub fn add_activity(
        &mut self,
        name: impl Into<String>,
        duration: i64,
        dependencies: Vec<ActivityId>,
    ) -> Result<ActivityId, ValidationError> {
        let id = self.next_id();
        self.upsert_activity(Activity::new(id, name, duration).with_dependencies(dependencies))?;
        Ok(id)
    }

    /// Removes the activity and every reference to it. Remaining ids are kept
    /// as they are.
    pub fn delete_activity(&mut self, id: ActivityId) -> bool {
        let before = self.activities.len();
        self.activities.retain(|a| a.id != id);
        if self.activities.len() == before {
            return false;
        }
        for activity in &mut self.activities {
            activity.dependencies.retain(|&dep| dep != id);
        }
        true
    }

    pub fn clear(&mut self) {
        self.activities.clear();
    }

    pub fn snapshot(&self) -> Vec<Activity> {
        self.activities.clone()
    }

    pub fn compute(&self) -> Result<ScheduleResult, CpmError> {
        compute_schedule(self.snapshot())
    }
}
