#![cfg(feature = "sqlite")]

use cpm_engine::{
    Activity, PersistenceError, Project, ProjectMetadata, ProjectStore, SqliteProjectStore,
};
use tempfile::NamedTempFile;

#[test]
fn sqlite_store_round_trip_project() {
    let file = NamedTempFile::new().unwrap();
    let store = SqliteProjectStore::new(file.path()).unwrap();

    let metadata = ProjectMetadata {
        project_name: "SQLite Project".into(),
        project_description: "Stored activities".into(),
    };
    let mut project = Project::new_with_metadata(metadata);
    project
        .upsert_activity(Activity::new(30, "Design", 5))
        .expect("insert activity 30");
    project
        .upsert_activity(Activity::new(10, "Build", 10).with_dependencies([30]))
        .expect("insert activity 10");

    store.save_project(&project).expect("save project");

    let loaded = store
        .load_project()
        .expect("load project")
        .expect("project exists");

    assert_eq!(loaded.metadata().project_name, "SQLite Project");
    // Input order survives even though ids are not ascending.
    let ids: Vec<u32> = loaded.activities().iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![30, 10]);
    assert_eq!(loaded.find_activity(10).unwrap().dependencies, vec![30]);
    assert_eq!(loaded.compute().unwrap().project_duration(), 15);
}

#[test]
fn empty_store_has_no_project() {
    let store = SqliteProjectStore::in_memory().unwrap();
    assert!(store.load_project().unwrap().is_none());
}

#[test]
fn saving_again_replaces_previous_rows() {
    let store = SqliteProjectStore::in_memory().unwrap();
    let mut project = Project::new();
    project.add_activity("A", 1, vec![]).unwrap();
    project.add_activity("B", 2, vec![1]).unwrap();
    store.save_project(&project).unwrap();

    project.delete_activity(1);
    store.save_project(&project).unwrap();

    let loaded = store.load_project().unwrap().unwrap();
    assert_eq!(loaded.activities(), &[Activity::new(2, "B", 2)]);
}

#[test]
fn store_refuses_invalid_project() {
    let store = SqliteProjectStore::in_memory().unwrap();
    let mut project = Project::new();
    project
        .upsert_activity(Activity::new(1, "Dangling", 1).with_dependencies([2]))
        .unwrap();
    let err = store.save_project(&project).unwrap_err();
    assert!(matches!(err, PersistenceError::Validation(_)), "{err:?}");
    assert!(store.load_project().unwrap().is_none());
}
