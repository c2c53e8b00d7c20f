use crate::error::CycleError;
use crate::graph::ActivityGraph;
use petgraph::graph::NodeIndex;

/// Early dates indexed by node index, plus the order they were resolved in.
#[derive(Debug, Clone)]
pub struct ForwardPassResult {
    pub order: Vec<NodeIndex>,
    pub early_starts: Vec<i64>,
    pub early_finishes: Vec<i64>,
    pub project_duration: i64,
}

pub struct ForwardPass<'a> {
    graph: &'a ActivityGraph,
}

impl<'a> ForwardPass<'a> {
    pub fn new(graph: &'a ActivityGraph) -> Self {
        Self { graph }
    }

    /// Kahn's walk with ES/EF computed as each activity is dequeued.
    /// Fails without partial output when some activity is never reached.
    pub fn execute(&self) -> Result<ForwardPassResult, CycleError> {
        let node_count = self.graph.node_count();
        let mut early_starts: Vec<i64> = vec![0; node_count];
        let mut early_finishes: Vec<i64> = vec![0; node_count];

        let order = self.graph.walk_topological(|node_ix| {
            // Sources keep ES = 0; everyone else waits on the latest predecessor.
            let early_start = self
                .graph
                .predecessor_indices(node_ix)
                .into_iter()
                .map(|pred_ix| early_finishes[pred_ix.index()])
                .max()
                .unwrap_or(0);
            let activity = self.graph.node(node_ix);
            let early_finish = early_start + activity.duration;

            early_starts[node_ix.index()] = early_start;
            early_finishes[node_ix.index()] = early_finish;
            tracing::trace!(id = activity.id, early_start, early_finish, "forward pass");
        })?;

        let project_duration = early_finishes.iter().copied().max().unwrap_or(0);

        Ok(ForwardPassResult {
            order,
            early_starts,
            early_finishes,
            project_duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::Activity;

    #[test]
    fn computes_early_dates_across_dag() {
        // 1(2) -> {2(3), 3(1)} -> 4(2)
        let graph = ActivityGraph::build(vec![
            Activity::new(1, "T1", 2),
            Activity::new(2, "T2", 3).with_dependencies([1]),
            Activity::new(3, "T3", 1).with_dependencies([1]),
            Activity::new(4, "T4", 2).with_dependencies([2, 3]),
        ])
        .unwrap();

        let result = ForwardPass::new(&graph).execute().unwrap();

        assert_eq!(result.early_starts, vec![0, 2, 2, 5]);
        assert_eq!(result.early_finishes, vec![2, 5, 3, 7]);
        assert_eq!(result.project_duration, 7);
        assert_eq!(result.order.len(), 4);
    }

    #[test]
    fn queue_order_is_fifo_over_input_order() {
        let graph = ActivityGraph::build(vec![
            Activity::new(30, "C", 1).with_dependencies([10]),
            Activity::new(10, "A", 1),
            Activity::new(20, "B", 1),
        ])
        .unwrap();

        let result = ForwardPass::new(&graph).execute().unwrap();
        let ids: Vec<u32> = result.order.iter().map(|&ix| graph.node(ix).id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn empty_graph_has_zero_duration() {
        let graph = ActivityGraph::build(Vec::new()).unwrap();
        let result = ForwardPass::new(&graph).execute().unwrap();
        assert!(result.order.is_empty());
        assert_eq!(result.project_duration, 0);
    }

    #[test]
    fn cycle_yields_no_result() {
        let graph = ActivityGraph::build(vec![
            Activity::new(1, "A", 1).with_dependencies([2]),
            Activity::new(2, "B", 1).with_dependencies([1]),
        ])
        .unwrap();

        let err = ForwardPass::new(&graph).execute().unwrap_err();
        assert_eq!(err.unresolved, vec![1, 2]);
    }
}
