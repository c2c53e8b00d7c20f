use thiserror::Error;

use crate::activity::ActivityId;

/// Malformed activity input, raised while building an `ActivityGraph`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("duplicate id {id}")]
    DuplicateId { id: ActivityId },

    #[error("non-positive duration {duration} for activity {id}")]
    NonPositiveDuration { id: ActivityId, duration: i64 },

    #[error("self dependency on activity {id}")]
    SelfDependency { id: ActivityId },

    #[error("unknown dependency {dependency} referenced by activity {id}")]
    UnknownDependency {
        id: ActivityId,
        dependency: ActivityId,
    },

    /// Summed durations no longer fit in `i64`; no start or finish time
    /// could be represented past this activity.
    #[error("total duration overflows at activity {id}")]
    DurationOverflow { id: ActivityId },
}

impl ValidationError {
    /// The activity the failure was reported against.
    pub fn activity_id(&self) -> ActivityId {
        match self {
            ValidationError::DuplicateId { id }
            | ValidationError::NonPositiveDuration { id, .. }
            | ValidationError::SelfDependency { id }
            | ValidationError::UnknownDependency { id, .. }
            | ValidationError::DurationOverflow { id } => *id,
        }
    }
}

/// The dependency relation is not acyclic.
///
/// `unresolved` lists every activity the topological walk could not reach,
/// in input order. That set contains each cycle plus anything downstream of one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dependency cycle detected among activities {unresolved:?}")]
pub struct CycleError {
    pub unresolved: Vec<ActivityId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpmError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Cycle(#[from] CycleError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_activity() {
        let err = ValidationError::UnknownDependency {
            id: 4,
            dependency: 99,
        };
        assert_eq!(err.to_string(), "unknown dependency 99 referenced by activity 4");
        assert_eq!(err.activity_id(), 4);

        let err = ValidationError::NonPositiveDuration { id: 2, duration: 0 };
        assert!(err.to_string().contains("non-positive duration"));
    }

    #[test]
    fn cpm_error_is_transparent() {
        let err: CpmError = CycleError {
            unresolved: vec![1, 2],
        }
        .into();
        assert_eq!(err.to_string(), "dependency cycle detected among activities [1, 2]");
    }
}
