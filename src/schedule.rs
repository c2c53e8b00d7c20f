use crate::activity::{Activity, ActivityId};
use crate::calculations::backward_pass::BackwardPass;
use crate::calculations::forward_pass::ForwardPass;
use crate::error::{CpmError, CycleError};
use crate::graph::ActivityGraph;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: ActivityId,
    pub name: String,
    pub duration: i64,
    pub dependencies: Vec<ActivityId>,
    pub earliest_start: i64,
    pub earliest_finish: i64,
    pub latest_start: i64,
    pub latest_finish: i64,
    pub slack: i64,
    pub is_critical: bool,
}

/// One Gantt row: the ES..EF bar followed by its slack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineBar {
    pub id: ActivityId,
    pub name: String,
    pub start: i64,
    pub finish: i64,
    pub slack: i64,
    pub is_critical: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub activity_count: usize,
    pub critical_count: usize,
    pub project_duration: i64,
    pub critical_path: Vec<ActivityId>,
}

impl ScheduleSummary {
    pub fn to_cli_summary(&self) -> String {
        let path = self
            .critical_path
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join("->");
        format!(
            "activities={} critical={} duration={} path={}",
            self.activity_count, self.critical_count, self.project_duration, path
        )
    }
}

/// Immutable outcome of one engine run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduleResult {
    project_duration: i64,
    entries: BTreeMap<ActivityId, ScheduleEntry>,
    topological_order: Vec<ActivityId>,
}

impl ScheduleResult {
    pub fn project_duration(&self) -> i64 {
        self.project_duration
    }

    pub fn entry(&self, id: ActivityId) -> Option<&ScheduleEntry> {
        self.entries.get(&id)
    }

    /// Entries ordered by id.
    pub fn entries(&self) -> impl Iterator<Item = &ScheduleEntry> + '_ {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The order the forward pass resolved activities in.
    pub fn topological_order(&self) -> &[ActivityId] {
        &self.topological_order
    }

    /// Critical entries ordered by earliest start, then id.
    pub fn critical_activities(&self) -> Vec<&ScheduleEntry> {
        let mut critical: Vec<&ScheduleEntry> =
            self.entries.values().filter(|e| e.is_critical).collect();
        critical.sort_by(|a, b| {
            a.earliest_start
                .cmp(&b.earliest_start)
                .then_with(|| a.id.cmp(&b.id))
        });
        critical
    }

    pub fn critical_activity_names(&self) -> Vec<String> {
        self.critical_activities()
            .into_iter()
            .map(|e| e.name.clone())
            .collect()
    }

    /// Dependency edges (predecessor, successor) with both endpoints critical.
    pub fn critical_edges(&self) -> Vec<(ActivityId, ActivityId)> {
        let mut edges = Vec::new();
        for entry in self.entries.values().filter(|e| e.is_critical) {
            for dep in &entry.dependencies {
                if self.entries.get(dep).is_some_and(|p| p.is_critical) {
                    edges.push((*dep, entry.id));
                }
            }
        }
        edges
    }

    /// Critical successors reachable over tight edges (predecessor EF equals
    /// successor ES), in id order.
    fn tight_successors(&self) -> HashMap<ActivityId, Vec<ActivityId>> {
        let mut tight: HashMap<ActivityId, Vec<ActivityId>> = HashMap::new();
        for entry in self.entries.values().filter(|e| e.is_critical) {
            for dep in &entry.dependencies {
                if let Some(pred) = self.entries.get(dep) {
                    if pred.is_critical && pred.earliest_finish == entry.earliest_start {
                        tight.entry(pred.id).or_default().push(entry.id);
                    }
                }
            }
        }
        tight
    }

    fn critical_sources(&self) -> impl Iterator<Item = &ScheduleEntry> + '_ {
        self.entries
            .values()
            .filter(|e| e.is_critical && e.dependencies.is_empty())
    }

    /// One critical chain in O(V + E): the first critical source, then the
    /// first tight critical successor at each step. A critical activity that
    /// finishes before the project end always has such a successor.
    pub fn critical_path(&self) -> Vec<ActivityId> {
        let Some(source) = self.critical_sources().next() else {
            return Vec::new();
        };
        let tight = self.tight_successors();
        let mut path = vec![source.id];
        let mut current = source.id;
        while let Some(&next) = tight.get(&current).and_then(|succs| succs.first()) {
            path.push(next);
            current = next;
        }
        path
    }

    /// Every source-to-sink chain of critical activities joined by tight
    /// edges. Each chain's durations sum to the project duration. The count
    /// grows combinatorially with parallel critical branches; see
    /// `critical_paths_up_to` for a bounded listing.
    pub fn critical_paths(&self) -> Vec<Vec<ActivityId>> {
        self.critical_paths_up_to(usize::MAX)
    }

    /// The first `limit` critical chains in depth-first order.
    pub fn critical_paths_up_to(&self, limit: usize) -> Vec<Vec<ActivityId>> {
        let tight = self.tight_successors();
        let mut paths = Vec::new();
        for source in self.critical_sources() {
            let mut stack: Vec<Vec<ActivityId>> = vec![vec![source.id]];
            while let Some(path) = stack.pop() {
                if paths.len() >= limit {
                    return paths;
                }
                let Some(&last) = path.last() else { continue };
                match tight.get(&last) {
                    Some(next) if !next.is_empty() => {
                        // Reverse so the first successor is explored first.
                        for &succ in next.iter().rev() {
                            let mut extended = path.clone();
                            extended.push(succ);
                            stack.push(extended);
                        }
                    }
                    _ => {
                        let finishes_project = self
                            .entries
                            .get(&last)
                            .is_some_and(|e| e.earliest_finish == self.project_duration);
                        if finishes_project {
                            paths.push(path);
                        }
                    }
                }
            }
        }
        paths
    }

    /// Gantt rows ordered by id.
    pub fn timeline(&self) -> Vec<TimelineBar> {
        self.entries
            .values()
            .map(|e| TimelineBar {
                id: e.id,
                name: e.name.clone(),
                start: e.earliest_start,
                finish: e.earliest_finish,
                slack: e.slack,
                is_critical: e.is_critical,
            })
            .collect()
    }

    pub fn summary(&self) -> ScheduleSummary {
        let critical_path = self.critical_path();
        ScheduleSummary {
            activity_count: self.entries.len(),
            critical_count: self.entries.values().filter(|e| e.is_critical).count(),
            project_duration: self.project_duration,
            critical_path,
        }
    }
}

/// Runs the forward and backward passes over one graph snapshot.
pub struct CpmEngine<'a> {
    graph: &'a ActivityGraph,
}

impl<'a> CpmEngine<'a> {
    pub fn new(graph: &'a ActivityGraph) -> Self {
        Self { graph }
    }

    pub fn execute(&self) -> Result<ScheduleResult, CycleError> {
        let forward = ForwardPass::new(self.graph).execute()?;
        let late = BackwardPass::new(self.graph, &forward).execute();

        let mut entries = BTreeMap::new();
        for &node_ix in &forward.order {
            let i = node_ix.index();
            let activity = self.graph.node(node_ix);
            let slack = late.late_starts[i] - forward.early_starts[i];
            entries.insert(
                activity.id,
                ScheduleEntry {
                    id: activity.id,
                    name: activity.name.clone(),
                    duration: activity.duration,
                    dependencies: activity.dependencies.clone(),
                    earliest_start: forward.early_starts[i],
                    earliest_finish: forward.early_finishes[i],
                    latest_start: late.late_starts[i],
                    latest_finish: late.late_finishes[i],
                    slack,
                    is_critical: slack == 0,
                },
            );
        }

        let topological_order = forward
            .order
            .iter()
            .map(|&ix| self.graph.node(ix).id)
            .collect();

        tracing::debug!(
            activities = entries.len(),
            project_duration = forward.project_duration,
            "schedule computed"
        );

        Ok(ScheduleResult {
            project_duration: forward.project_duration,
            entries,
            topological_order,
        })
    }
}

/// Validates `activities`, builds a fresh graph and schedules it.
pub fn compute_schedule(activities: Vec<Activity>) -> Result<ScheduleResult, CpmError> {
    let graph = ActivityGraph::build(activities)?;
    Ok(CpmEngine::new(&graph).execute()?)
}

/// Schedules independent snapshots in parallel. Results keep input order.
pub fn compute_batch(snapshots: Vec<Vec<Activity>>) -> Vec<Result<ScheduleResult, CpmError>> {
    snapshots.into_par_iter().map(compute_schedule).collect()
}
