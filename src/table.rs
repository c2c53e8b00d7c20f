//! `DataFrame` views of activities and schedules for table and spreadsheet
//! style consumers.

use crate::activity::{Activity, ActivityId};
use crate::schedule::ScheduleResult;
use polars::prelude::*;

fn activity_fields() -> Vec<Field> {
    vec![
        Field::new("id".into(), DataType::UInt32),
        Field::new("name".into(), DataType::String),
        Field::new("duration".into(), DataType::Int64),
        Field::new("dependencies".into(), DataType::List(Box::new(DataType::UInt32))),
    ]
}

fn activities_schema() -> Schema {
    Schema::from_iter(activity_fields())
}

fn schedule_schema() -> Schema {
    let mut fields = activity_fields();
    for name in [
        "earliest_start",
        "earliest_finish",
        "latest_start",
        "latest_finish",
        "slack",
    ] {
        fields.push(Field::new(name.into(), DataType::Int64));
    }
    fields.push(Field::new("is_critical".into(), DataType::Boolean));
    Schema::from_iter(fields)
}

fn series_from_id_lists(name: &'static str, lists: &[&[ActivityId]]) -> Series {
    let inner: Vec<Series> = lists
        .iter()
        .map(|ids| Series::new(PlSmallStr::from_static(""), ids.to_vec()))
        .collect();
    Series::new(PlSmallStr::from_static(name), inner)
}

fn i64_column(name: &'static str, values: Vec<i64>) -> Column {
    Series::new(PlSmallStr::from_static(name), values).into_column()
}

pub fn activities_frame(activities: &[Activity]) -> PolarsResult<DataFrame> {
    if activities.is_empty() {
        return Ok(DataFrame::empty_with_schema(&activities_schema()));
    }

    let ids: Vec<ActivityId> = activities.iter().map(|a| a.id).collect();
    let names: Vec<&str> = activities.iter().map(|a| a.name.as_str()).collect();
    let durations: Vec<i64> = activities.iter().map(|a| a.duration).collect();
    let deps: Vec<&[ActivityId]> = activities.iter().map(|a| a.dependencies.as_slice()).collect();

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("id"), ids).into_column(),
        Series::new(PlSmallStr::from_static("name"), names).into_column(),
        i64_column("duration", durations),
        series_from_id_lists("dependencies", &deps).into_column(),
    ])
}

/// One row per scheduled activity, ordered by id.
pub fn schedule_frame(result: &ScheduleResult) -> PolarsResult<DataFrame> {
    if result.is_empty() {
        return Ok(DataFrame::empty_with_schema(&schedule_schema()));
    }

    let entries: Vec<_> = result.entries().collect();
    let ids: Vec<ActivityId> = entries.iter().map(|e| e.id).collect();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    let deps: Vec<&[ActivityId]> = entries.iter().map(|e| e.dependencies.as_slice()).collect();
    let critical: Vec<bool> = entries.iter().map(|e| e.is_critical).collect();

    DataFrame::new(vec![
        Series::new(PlSmallStr::from_static("id"), ids).into_column(),
        Series::new(PlSmallStr::from_static("name"), names).into_column(),
        i64_column("duration", entries.iter().map(|e| e.duration).collect()),
        series_from_id_lists("dependencies", &deps).into_column(),
        i64_column(
            "earliest_start",
            entries.iter().map(|e| e.earliest_start).collect(),
        ),
        i64_column(
            "earliest_finish",
            entries.iter().map(|e| e.earliest_finish).collect(),
        ),
        i64_column(
            "latest_start",
            entries.iter().map(|e| e.latest_start).collect(),
        ),
        i64_column(
            "latest_finish",
            entries.iter().map(|e| e.latest_finish).collect(),
        ),
        i64_column("slack", entries.iter().map(|e| e.slack).collect()),
        Series::new(PlSmallStr::from_static("is_critical"), critical).into_column(),
    ])
}

/// Reads activities back from a frame with `id`, `name`, `duration` and
/// `dependencies` columns. Null ids or durations are rejected.
pub fn activities_from_frame(df: &DataFrame) -> PolarsResult<Vec<Activity>> {
    let ids = df.column("id")?.u32()?;
    let names = df.column("name")?.str()?;
    let durations = df.column("duration")?.i64()?;
    let deps = df.column("dependencies")?.list()?;

    let mut activities = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let id = ids.get(row_idx).ok_or_else(|| {
            PolarsError::ComputeError(format!("row {row_idx} is missing an id").into())
        })?;
        let duration = durations.get(row_idx).ok_or_else(|| {
            PolarsError::ComputeError(format!("activity {id} is missing a duration").into())
        })?;
        let name = names.get(row_idx).unwrap_or("").to_string();
        let dependencies: Vec<ActivityId> = match deps.get_as_series(row_idx) {
            Some(series) => series.u32()?.into_iter().flatten().collect(),
            None => Vec::new(),
        };
        activities.push(Activity {
            id,
            name,
            duration,
            dependencies,
        });
    }
    Ok(activities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::compute_schedule;

    fn sample() -> Vec<Activity> {
        vec![
            Activity::new(1, "A", 3),
            Activity::new(2, "B", 2).with_dependencies([1]),
            Activity::new(3, "C", 4).with_dependencies([1]),
        ]
    }

    #[test]
    fn activities_frame_reads_back() {
        let df = activities_frame(&sample()).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(activities_from_frame(&df).unwrap(), sample());
    }

    #[test]
    fn schedule_frame_has_timing_columns() {
        let result = compute_schedule(sample()).unwrap();
        let df = schedule_frame(&result).unwrap();
        assert_eq!(df.height(), 3);

        let slack = df.column("slack").unwrap().i64().unwrap();
        assert_eq!(slack.get(1), Some(2));
        let critical = df.column("is_critical").unwrap().bool().unwrap();
        assert_eq!(critical.get(2), Some(true));
    }

    #[test]
    fn empty_inputs_keep_schema() {
        let df = schedule_frame(&ScheduleResult::default()).unwrap();
        assert_eq!(df.height(), 0);
        assert!(df.column("latest_finish").is_ok());
        assert_eq!(activities_frame(&[]).unwrap().width(), 4);
    }
}
