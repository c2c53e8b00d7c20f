use crate::activity::{Activity, ActivityId};
use crate::error::ValidationError;
use std::collections::HashSet;

/// Rules that can be checked on one activity in isolation.
pub fn validate_activity(activity: &Activity) -> Result<(), ValidationError> {
    if activity.duration < 1 {
        return Err(ValidationError::NonPositiveDuration {
            id: activity.id,
            duration: activity.duration,
        });
    }

    if activity.depends_on(activity.id) {
        return Err(ValidationError::SelfDependency { id: activity.id });
    }

    Ok(())
}

/// Full construction contract: unique ids, per-activity rules, and every
/// dependency resolving to a supplied activity. Errors come back in input
/// order; reference checks run after all ids are known.
///
/// The durations must also sum to at most `i64::MAX`. Every finish time is
/// bounded by that sum, so the passes never overflow.
pub fn validate_activity_collection(activities: &[Activity]) -> Result<(), ValidationError> {
    let mut seen_ids: HashSet<ActivityId> = HashSet::with_capacity(activities.len());
    let mut total_duration: i64 = 0;
    for activity in activities {
        if !seen_ids.insert(activity.id) {
            return Err(ValidationError::DuplicateId { id: activity.id });
        }
        validate_activity(activity)?;
        total_duration = total_duration
            .checked_add(activity.duration)
            .ok_or(ValidationError::DurationOverflow { id: activity.id })?;
    }

    for activity in activities {
        if let Some(&dependency) = activity
            .dependencies
            .iter()
            .find(|dep| !seen_ids.contains(*dep))
        {
            return Err(ValidationError::UnknownDependency {
                id: activity.id,
                dependency,
            });
        }
    }

    Ok(())
}
