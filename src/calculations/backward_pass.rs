use super::forward_pass::ForwardPassResult;
use crate::graph::ActivityGraph;

/// Late dates indexed by node index.
#[derive(Debug, Clone)]
pub struct BackwardPassResult {
    pub late_starts: Vec<i64>,
    pub late_finishes: Vec<i64>,
}

pub struct BackwardPass<'a> {
    graph: &'a ActivityGraph,
    forward: &'a ForwardPassResult,
}

impl<'a> BackwardPass<'a> {
    pub fn new(graph: &'a ActivityGraph, forward: &'a ForwardPassResult) -> Self {
        Self { graph, forward }
    }

    pub fn execute(&self) -> BackwardPassResult {
        let node_count = self.graph.node_count();
        let project_duration = self.forward.project_duration;
        let mut late_starts: Vec<i64> = vec![project_duration; node_count];
        let mut late_finishes: Vec<i64> = vec![project_duration; node_count];

        // Reverse topological order: every successor is resolved before its predecessors.
        for &node_ix in self.forward.order.iter().rev() {
            let late_finish = if self.graph.is_sink_index(node_ix) {
                project_duration
            } else {
                self.graph
                    .successor_indices(node_ix)
                    .into_iter()
                    .map(|succ_ix| late_starts[succ_ix.index()])
                    .min()
                    .unwrap_or(project_duration)
            };
            let activity = self.graph.node(node_ix);
            let late_start = late_finish - activity.duration;

            late_finishes[node_ix.index()] = late_finish;
            late_starts[node_ix.index()] = late_start;
            tracing::trace!(id = activity.id, late_start, late_finish, "backward pass");
        }

        BackwardPassResult {
            late_starts,
            late_finishes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::Activity;
    use crate::calculations::forward_pass::ForwardPass;

    #[test]
    fn sinks_anchor_at_project_duration() {
        // A(3) -> {B(2), C(4)}: both B and C are sinks.
        let graph = ActivityGraph::build(vec![
            Activity::new(1, "A", 3),
            Activity::new(2, "B", 2).with_dependencies([1]),
            Activity::new(3, "C", 4).with_dependencies([1]),
        ])
        .unwrap();
        let forward = ForwardPass::new(&graph).execute().unwrap();
        let late = BackwardPass::new(&graph, &forward).execute();

        assert_eq!(late.late_finishes, vec![3, 7, 7]);
        assert_eq!(late.late_starts, vec![0, 5, 3]);
    }

    #[test]
    fn interior_activity_takes_min_successor_late_start() {
        let graph = ActivityGraph::build(vec![
            Activity::new(1, "A", 2),
            Activity::new(2, "B", 3).with_dependencies([1]),
            Activity::new(3, "C", 1).with_dependencies([1]),
            Activity::new(4, "D", 2).with_dependencies([2, 3]),
        ])
        .unwrap();
        let forward = ForwardPass::new(&graph).execute().unwrap();
        let late = BackwardPass::new(&graph, &forward).execute();

        assert_eq!(late.late_finishes, vec![2, 5, 5, 7]);
        assert_eq!(late.late_starts, vec![0, 2, 4, 5]);
    }
}
