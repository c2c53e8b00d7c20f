use cpm_engine::table::{activities_frame, schedule_frame};
use cpm_engine::{
    Activity, ActivityId, Project, ScheduleResult, export_schedule_to_csv, import_activities_csv,
    load_project_from_csv, load_project_from_json, save_project_to_csv, save_project_to_json,
};
use polars::prelude::{AnyValue, Column, DataFrame};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

fn parse_dep_list(s: &str) -> Result<Vec<ActivityId>, String> {
    if s.trim() == "-" {
        return Ok(Vec::new());
    }
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<ActivityId>().map_err(|_| format!("Invalid dependency id '{p}'")))
        .collect()
}

fn cell_text(col: &Column, row_idx: usize) -> String {
    match col.get(row_idx) {
        Ok(AnyValue::Null) => String::new(),
        Ok(AnyValue::String(s)) => s.to_string(),
        Ok(AnyValue::List(inner)) if col.name().as_str() == "dependencies" => match inner.u32() {
            Ok(ca) => ca
                .into_iter()
                .flatten()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(","),
            Err(_) => String::new(),
        },
        Ok(av) => av.to_string(),
        Err(_) => String::new(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
    let cells: Vec<Vec<String>> = (0..df.height())
        .map(|row_idx| columns.iter().map(|col| cell_text(col, row_idx)).collect())
        .collect();

    // Compute column widths
    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &cells {
        for (ci, s) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(s.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, value) in values.iter().enumerate() {
            line.push(' ');
            line.push_str(value);
            line.push_str(&" ".repeat(widths[ci].saturating_sub(value.len())));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_activities(project: &Project) {
    match activities_frame(project.activities()) {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error: {}", e),
    }
}

fn print_schedule(result: &ScheduleResult) {
    match schedule_frame(result) {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error: {}", e),
    }
    println!("Project duration: {}", result.project_duration());
    println!(
        "Critical path: {}",
        result.critical_activity_names().join(" -> ")
    );
    println!("{}", result.summary().to_cli_summary());
}

const MAX_LISTED_PATHS: usize = 20;

fn print_critical_paths(project: &Project, result: &ScheduleResult) {
    // One extra so truncation can be reported.
    let mut paths = result.critical_paths_up_to(MAX_LISTED_PATHS + 1);
    let truncated = paths.len() > MAX_LISTED_PATHS;
    paths.truncate(MAX_LISTED_PATHS);
    if paths.is_empty() {
        println!("No critical paths.");
        return;
    }
    for (idx, path) in paths.iter().enumerate() {
        let names: Vec<&str> = path
            .iter()
            .filter_map(|id| project.find_activity(*id).map(|a| a.name.as_str()))
            .collect();
        println!("Path {}: {}", idx + 1, names.join(" -> "));
    }
    if truncated {
        println!("(only the first {MAX_LISTED_PATHS} critical paths are listed)");
    }
}

fn print_metadata(project: &Project) {
    let metadata = project.metadata();
    println!("Project name       : {}", metadata.project_name);
    println!("Project description: {}", metadata.project_description);
    println!("Activities         : {}", project.len());
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show current activities\n  add <id> <name> <duration> [deps]  Upsert an activity (deps like 1,2,3)\n  new <name> <duration> [deps]       Append an activity with the next id\n  delete <id>                        Delete an activity and its references\n  clear                              Remove all activities\n  compute                            Run the critical path computation\n  paths                              List critical paths (first 20)\n  meta show                          Show project metadata\n  meta name <text...>                Update project name\n  meta desc <text...>                Update project description\n  save <json|csv> <path>             Persist project to disk\n  load <json|csv> <path>             Load project from disk\n  import <csv_path>                  Import activities from a loosely formatted CSV\n  export <csv_path>                  Compute and write the schedule as CSV\n  quit|exit                          Exit"
    );
}

fn upsert(project: &mut Project, activity: Activity) {
    let id = activity.id;
    match project.upsert_activity(activity) {
        Ok(()) => {
            println!("Activity {id} upserted.");
            print_activities(project);
        }
        Err(e) => println!("Error: {}", e),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut project = Project::new();

    println!("CPM Engine (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print_activities(&project),
            "add" => match (parts.next(), parts.next(), parts.next()) {
                (Some(id_s), Some(name), Some(dur_s)) => {
                    let Ok(id) = id_s.parse::<ActivityId>() else {
                        println!("Invalid id");
                        continue;
                    };
                    let Ok(duration) = dur_s.parse::<i64>() else {
                        println!("Invalid duration");
                        continue;
                    };
                    match parse_dep_list(parts.next().unwrap_or("")) {
                        Ok(deps) => upsert(
                            &mut project,
                            Activity::new(id, name, duration).with_dependencies(deps),
                        ),
                        Err(msg) => println!("{msg}"),
                    }
                }
                _ => println!("Usage: add <id> <name> <duration> [deps_csv]"),
            },
            "new" => match (parts.next(), parts.next()) {
                (Some(name), Some(dur_s)) => {
                    let Ok(duration) = dur_s.parse::<i64>() else {
                        println!("Invalid duration");
                        continue;
                    };
                    match parse_dep_list(parts.next().unwrap_or("")) {
                        Ok(deps) => match project.add_activity(name, duration, deps) {
                            Ok(id) => {
                                println!("Added activity id={id}");
                                print_activities(&project);
                            }
                            Err(e) => println!("Error: {}", e),
                        },
                        Err(msg) => println!("{msg}"),
                    }
                }
                _ => println!("Usage: new <name> <duration> [deps_csv]"),
            },
            "delete" => match parts.next().map(str::parse::<ActivityId>) {
                Some(Ok(id)) => {
                    if project.delete_activity(id) {
                        println!("Deleted activity {id}.");
                        print_activities(&project);
                    } else {
                        println!("Activity {id} not found.");
                    }
                }
                Some(Err(_)) => println!("Invalid id"),
                None => println!("Usage: delete <id>"),
            },
            "clear" => {
                project.clear();
                println!("All activities removed.");
            }
            "compute" => match project.compute() {
                Ok(result) => print_schedule(&result),
                Err(e) => println!("Error: {}", e),
            },
            "paths" => match project.compute() {
                Ok(result) => print_critical_paths(&project, &result),
                Err(e) => println!("Error: {}", e),
            },
            "meta" => {
                let sub = parts.next().unwrap_or("");
                let rest = parts.collect::<Vec<_>>().join(" ");
                match sub {
                    "show" | "" => print_metadata(&project),
                    "name" if !rest.is_empty() => {
                        project.set_project_name(rest);
                        println!("Project name updated.");
                    }
                    "desc" if !rest.is_empty() => {
                        project.set_project_description(rest);
                        println!("Project description updated.");
                    }
                    _ => println!("Usage: meta show | meta name <text> | meta desc <text>"),
                }
            }
            "save" => match (parts.next(), parts.next()) {
                (Some(format), Some(path)) => {
                    let result = match format {
                        "json" => save_project_to_json(&project, path),
                        "csv" => save_project_to_csv(&project, path),
                        _ => {
                            println!("Unknown format '{format}' (use json or csv)");
                            continue;
                        }
                    };
                    match result {
                        Ok(()) => println!("Project saved to {path}"),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                _ => println!("Usage: save <json|csv> <path>"),
            },
            "load" => match (parts.next(), parts.next()) {
                (Some(format), Some(path)) => {
                    let loaded = match format {
                        "json" => load_project_from_json(path),
                        "csv" => load_project_from_csv(path),
                        _ => {
                            println!("Unknown format '{format}' (use json or csv)");
                            continue;
                        }
                    };
                    match loaded {
                        Ok(p) => {
                            project = p;
                            println!("Project loaded from {path}");
                            print_activities(&project);
                        }
                        Err(e) => println!("Error: {}", e),
                    }
                }
                _ => println!("Usage: load <json|csv> <path>"),
            },
            "import" => match parts.next() {
                Some(path) => match import_activities_csv(path) {
                    Ok(activities) => {
                        let count = activities.len();
                        match Project::from_parts(project.metadata().clone(), activities) {
                            Ok(p) => {
                                project = p;
                                println!("Imported {count} activities.");
                                print_activities(&project);
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: import <csv_path>"),
            },
            "export" => match parts.next() {
                Some(path) => match project.compute() {
                    Ok(result) => match export_schedule_to_csv(&result, path) {
                        Ok(()) => println!("Schedule exported to {path}"),
                        Err(e) => println!("Error: {}", e),
                    },
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("Usage: export <csv_path>"),
            },
            _ => println!("Unknown command '{cmd}'. Type 'help' for commands."),
        }
    }
}
