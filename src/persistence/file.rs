use super::{PersistenceError, PersistenceResult};
use crate::activity::{Activity, ActivityId};
use crate::activity_validation::validate_activity_collection;
use crate::schedule::{ScheduleEntry, ScheduleResult};
use crate::{Project, ProjectMetadata};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Serialize, Deserialize)]
struct ProjectSnapshot {
    #[serde(default)]
    metadata: ProjectMetadata,
    activities: Vec<Activity>,
}

impl ProjectSnapshot {
    fn from_project(project: &Project) -> PersistenceResult<Self> {
        validate_activity_collection(project.activities())?;
        Ok(Self {
            metadata: project.metadata().clone(),
            activities: project.snapshot(),
        })
    }

    fn into_project(self) -> PersistenceResult<Project> {
        Ok(Project::from_parts(self.metadata, self.activities)?)
    }
}

pub fn save_project_to_json<P: AsRef<Path>>(project: &Project, path: P) -> PersistenceResult<()> {
    let snapshot = ProjectSnapshot::from_project(project)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_project_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Project> {
    let file = File::open(path)?;
    let snapshot: ProjectSnapshot = serde_json::from_reader(file)?;
    snapshot.into_project()
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ActivityCsvRecord {
    id: ActivityId,
    name: String,
    duration: i64,
    #[serde(default)]
    dependencies: String,
}

impl From<&Activity> for ActivityCsvRecord {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.id,
            name: activity.name.clone(),
            duration: activity.duration,
            dependencies: join_ids(&activity.dependencies),
        }
    }
}

impl ActivityCsvRecord {
    fn into_activity(self) -> PersistenceResult<Activity> {
        let dependencies = split_ids(&self.dependencies)?;
        Ok(Activity::new(self.id, self.name, self.duration).with_dependencies(dependencies))
    }
}

pub fn save_project_to_csv<P: AsRef<Path>>(project: &Project, path: P) -> PersistenceResult<()> {
    validate_activity_collection(project.activities())?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for activity in project.activities() {
        writer.serialize(ActivityCsvRecord::from(activity))?;
    }
    writer.flush()?;
    Ok(())
}

/// Strict counterpart of `save_project_to_csv`. Metadata is not part of the
/// CSV shape, so the loaded project carries default metadata.
pub fn load_project_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Project> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut activities = Vec::new();
    for record in reader.deserialize::<ActivityCsvRecord>() {
        activities.push(record?.into_activity()?);
    }
    Ok(Project::from_parts(ProjectMetadata::default(), activities)?)
}

const NAME_ALIASES: &[&str] = &["nama", "name", "kegiatan", "activity", "task"];
const DURATION_ALIASES: &[&str] = &["durasi", "duration", "waktu", "time"];
const DEPENDENCY_ALIASES: &[&str] = &["dependensi", "dependencies", "predecessor", "prasyarat"];

#[derive(Debug, Default, PartialEq)]
struct ImportColumns {
    id: Option<usize>,
    name: usize,
    duration: usize,
    dependencies: Option<usize>,
}

impl ImportColumns {
    fn detect(headers: &csv::StringRecord) -> PersistenceResult<Self> {
        let mut id = None;
        let mut name = None;
        let mut duration = None;
        let mut dependencies = None;

        for (idx, header) in headers.iter().enumerate() {
            let header = header.trim().to_lowercase();
            let matches = |aliases: &[&str]| aliases.iter().any(|alias| header.contains(alias));
            if header == "id" {
                id = Some(idx);
            } else if name.is_none() && matches(NAME_ALIASES) {
                name = Some(idx);
            } else if duration.is_none() && matches(DURATION_ALIASES) {
                duration = Some(idx);
            } else if dependencies.is_none() && matches(DEPENDENCY_ALIASES) {
                dependencies = Some(idx);
            }
        }

        match (name, duration) {
            (Some(name), Some(duration)) => Ok(Self {
                id,
                name,
                duration,
                dependencies,
            }),
            // Unrecognised headers: fall back to name, duration, dependencies by position.
            (None, _) if headers.len() >= 2 => Ok(Self {
                id: None,
                name: 0,
                duration: 1,
                dependencies: (headers.len() >= 3).then_some(2),
            }),
            _ => Err(PersistenceError::InvalidData(
                "could not detect name/duration columns".into(),
            )),
        }
    }
}

/// Lenient spreadsheet-style import. Column names are matched loosely,
/// rows without a name are skipped and missing ids are assigned in row
/// order. The result is still validated strictly before it is returned.
pub fn import_activities_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Activity>> {
    let file = File::open(path)?;
    import_activities_from_reader(file)
}

fn import_activities_from_reader<R: Read>(source: R) -> PersistenceResult<Vec<Activity>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);
    let columns = ImportColumns::detect(reader.headers()?)?;

    let mut activities = Vec::new();
    for record in reader.records() {
        let record = record?;
        let name = record.get(columns.name).unwrap_or("").trim();
        if name.is_empty() || name.eq_ignore_ascii_case("nan") {
            continue;
        }

        let duration = parse_duration(record.get(columns.duration).unwrap_or(""), name)?;
        let dependencies = match columns.dependencies.and_then(|idx| record.get(idx)) {
            Some(cell) => split_ids(cell)?,
            None => Vec::new(),
        };
        let id = match columns.id {
            Some(idx) => parse_id(record.get(idx).unwrap_or(""))?,
            None => activities.len() as ActivityId + 1,
        };

        activities.push(Activity::new(id, name, duration).with_dependencies(dependencies));
    }

    validate_activity_collection(&activities)?;
    tracing::debug!(activities = activities.len(), "imported activities from csv");
    Ok(activities)
}

/// Integral floats such as `5.0` are truncated; fractional values are refused.
fn parse_duration(cell: &str, name: &str) -> PersistenceResult<i64> {
    let cell = cell.trim();
    if let Ok(value) = cell.parse::<i64>() {
        return Ok(value);
    }
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => Ok(value as i64),
        Ok(_) => Err(PersistenceError::InvalidData(format!(
            "fractional duration '{cell}' for activity '{name}'"
        ))),
        Err(_) => Err(PersistenceError::InvalidData(format!(
            "invalid duration '{cell}' for activity '{name}'"
        ))),
    }
}

fn parse_id(cell: &str) -> PersistenceResult<ActivityId> {
    let cell = cell.trim();
    if let Ok(id) = cell.parse::<ActivityId>() {
        return Ok(id);
    }
    match cell.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 && value >= 0.0 && value <= ActivityId::MAX as f64 => {
            Ok(value as ActivityId)
        }
        _ => Err(PersistenceError::InvalidData(format!(
            "invalid activity id '{cell}'"
        ))),
    }
}

#[derive(Serialize)]
struct ScheduleCsvRecord<'a> {
    id: ActivityId,
    name: &'a str,
    duration: i64,
    dependencies: String,
    earliest_start: i64,
    earliest_finish: i64,
    latest_start: i64,
    latest_finish: i64,
    slack: i64,
    is_critical: bool,
}

impl<'a> From<&'a ScheduleEntry> for ScheduleCsvRecord<'a> {
    fn from(entry: &'a ScheduleEntry) -> Self {
        Self {
            id: entry.id,
            name: &entry.name,
            duration: entry.duration,
            dependencies: join_ids(&entry.dependencies),
            earliest_start: entry.earliest_start,
            earliest_finish: entry.earliest_finish,
            latest_start: entry.latest_start,
            latest_finish: entry.latest_finish,
            slack: entry.slack,
            is_critical: entry.is_critical,
        }
    }
}

pub fn export_schedule_to_csv<P: AsRef<Path>>(
    result: &ScheduleResult,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for entry in result.entries() {
        writer.serialize(ScheduleCsvRecord::from(entry))?;
    }
    writer.flush()?;
    Ok(())
}

fn join_ids(values: &[ActivityId]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn split_ids(input: &str) -> PersistenceResult<Vec<ActivityId>> {
    let input = input.trim();
    if input.is_empty() || input == "-" {
        return Ok(Vec::new());
    }
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_id)
        .collect()
}
