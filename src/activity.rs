use serde::{Deserialize, Serialize};

/// Opaque activity key. Ids only need to be unique within one graph; they
/// are never assumed to be contiguous.
pub type ActivityId = u32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub name: String,
    pub duration: i64,
    /// Predecessors that must finish before this activity starts.
    #[serde(default)]
    pub dependencies: Vec<ActivityId>,
}

impl Activity {
    pub fn new(id: ActivityId, name: impl Into<String>, duration: i64) -> Self {
        Self {
            id,
            name: name.into(),
            duration,
            dependencies: Vec::new(),
        }
    }

    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = ActivityId>) -> Self {
        self.dependencies = dependencies.into_iter().collect();
        self
    }

    pub fn depends_on(&self, id: ActivityId) -> bool {
        self.dependencies.contains(&id)
    }

    /// Collapses repeated dependency ids, keeping first-occurrence order.
    pub(crate) fn dedup_dependencies(&mut self) {
        let mut seen = Vec::with_capacity(self.dependencies.len());
        self.dependencies.retain(|dep| {
            if seen.contains(dep) {
                false
            } else {
                seen.push(*dep);
                true
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_dependencies_replaces_list() {
        let activity = Activity::new(3, "Pour", 4).with_dependencies([1, 2]);
        assert_eq!(activity.dependencies, vec![1, 2]);
        assert!(activity.depends_on(2));
        assert!(!activity.depends_on(3));
    }

    #[test]
    fn dedup_keeps_first_occurrence_order() {
        let mut activity = Activity::new(9, "Frame", 2).with_dependencies([4, 1, 4, 2, 1]);
        activity.dedup_dependencies();
        assert_eq!(activity.dependencies, vec![4, 1, 2]);
    }

    #[test]
    fn deserializes_without_dependencies_field() {
        let activity: Activity =
            serde_json::from_str(r#"{"id": 1, "name": "Dig", "duration": 3}"#).unwrap();
        assert_eq!(activity, Activity::new(1, "Dig", 3));
    }

    #[test]
    fn rejects_string_typed_duration() {
        let parsed = serde_json::from_str::<Activity>(r#"{"id": 1, "name": "Dig", "duration": "3"}"#);
        assert!(parsed.is_err());
    }
}
