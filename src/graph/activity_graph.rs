use crate::activity::{Activity, ActivityId};
use crate::activity_validation::validate_activity_collection;
use crate::error::{CycleError, ValidationError};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, VecDeque};

/// Validated, indexed activity set. Edges run predecessor -> successor and
/// node indices follow input order, which fixes tie-breaking everywhere.
#[derive(Debug, Clone)]
pub struct ActivityGraph {
    graph: DiGraph<Activity, ()>,
    id_to_index: HashMap<ActivityId, NodeIndex>,
}

impl ActivityGraph {
    pub fn build(activities: Vec<Activity>) -> Result<Self, ValidationError> {
        validate_activity_collection(&activities)?;

        let edge_hint: usize = activities.iter().map(|a| a.dependencies.len()).sum();
        let mut graph: DiGraph<Activity, ()> = DiGraph::with_capacity(activities.len(), edge_hint);
        let mut id_to_index: HashMap<ActivityId, NodeIndex> =
            HashMap::with_capacity(activities.len());

        // Add nodes first
        for mut activity in activities {
            activity.dedup_dependencies();
            let id = activity.id;
            let node_ix = graph.add_node(activity);
            id_to_index.insert(id, node_ix);
        }

        // Add edges: pred -> activity
        let nodes: Vec<NodeIndex> = graph.node_indices().collect();
        for node_ix in nodes {
            let preds: Vec<NodeIndex> = graph[node_ix]
                .dependencies
                .iter()
                .filter_map(|dep| id_to_index.get(dep).copied())
                .collect();
            for pred_ix in preds {
                graph.add_edge(pred_ix, node_ix, ());
            }
        }

        tracing::debug!(
            activities = graph.node_count(),
            edges = graph.edge_count(),
            "activity graph built"
        );

        Ok(Self { graph, id_to_index })
    }

    pub fn from_slice(activities: &[Activity]) -> Result<Self, ValidationError> {
        Self::build(activities.to_vec())
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: ActivityId) -> bool {
        self.id_to_index.contains_key(&id)
    }

    pub fn activity(&self, id: ActivityId) -> Option<&Activity> {
        self.id_to_index.get(&id).map(|&ix| &self.graph[ix])
    }

    /// Activities in input order.
    pub fn activities(&self) -> impl Iterator<Item = &Activity> + '_ {
        self.graph.node_indices().map(move |ix| &self.graph[ix])
    }

    pub fn predecessors_of(&self, id: ActivityId) -> Vec<ActivityId> {
        self.activity(id)
            .map(|activity| activity.dependencies.clone())
            .unwrap_or_default()
    }

    pub fn successors_of(&self, id: ActivityId) -> Vec<ActivityId> {
        match self.id_to_index.get(&id) {
            Some(&ix) => self
                .successor_indices(ix)
                .into_iter()
                .map(|succ| self.graph[succ].id)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn is_source(&self, id: ActivityId) -> bool {
        self.activity(id)
            .is_some_and(|activity| activity.dependencies.is_empty())
    }

    pub fn is_sink(&self, id: ActivityId) -> bool {
        self.id_to_index
            .get(&id)
            .is_some_and(|&ix| self.is_sink_index(ix))
    }

    /// Activities with no dependencies, in input order.
    pub fn source_activities(&self) -> Vec<ActivityId> {
        self.activities()
            .filter(|activity| activity.dependencies.is_empty())
            .map(|activity| activity.id)
            .collect()
    }

    /// Activities no other activity depends on, in input order.
    pub fn sink_activities(&self) -> Vec<ActivityId> {
        self.graph
            .node_indices()
            .filter(|&ix| self.is_sink_index(ix))
            .map(|ix| self.graph[ix].id)
            .collect()
    }

    /// Re-applies the construction rules to the owned activities.
    pub fn revalidate(&self) -> Result<(), ValidationError> {
        let activities: Vec<Activity> = self.activities().cloned().collect();
        validate_activity_collection(&activities)
    }

    pub fn topological_order(&self) -> Result<Vec<ActivityId>, CycleError> {
        let order = self.walk_topological(|_| {})?;
        Ok(order.into_iter().map(|ix| self.graph[ix].id).collect())
    }

    /// Kahn's algorithm over the whole graph. `visit` sees each node as it is
    /// dequeued, after all of its predecessors have been visited.
    pub(crate) fn walk_topological<F>(&self, mut visit: F) -> Result<Vec<NodeIndex>, CycleError>
    where
        F: FnMut(NodeIndex),
    {
        let node_count = self.graph.node_count();
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|ix| self.graph[ix].dependencies.len())
            .collect();

        let mut queue: VecDeque<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|ix| in_degree[ix.index()] == 0)
            .collect();

        let mut processed: Vec<NodeIndex> = Vec::with_capacity(node_count);
        while let Some(node_ix) = queue.pop_front() {
            visit(node_ix);
            processed.push(node_ix);

            for succ_ix in self.successor_indices(node_ix) {
                let degree = &mut in_degree[succ_ix.index()];
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(succ_ix);
                }
            }
        }

        if processed.len() < node_count {
            let unresolved: Vec<ActivityId> = self
                .graph
                .node_indices()
                .filter(|ix| in_degree[ix.index()] > 0)
                .map(|ix| self.graph[ix].id)
                .collect();
            tracing::warn!(?unresolved, "dependency cycle detected");
            return Err(CycleError { unresolved });
        }

        Ok(processed)
    }

    pub(crate) fn node(&self, ix: NodeIndex) -> &Activity {
        &self.graph[ix]
    }

    pub(crate) fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub(crate) fn predecessor_indices(&self, ix: NodeIndex) -> Vec<NodeIndex> {
        let mut preds: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(ix, Direction::Incoming)
            .collect();
        preds.sort_unstable();
        preds
    }

    /// Successors sorted by node index so iteration follows input order.
    pub(crate) fn successor_indices(&self, ix: NodeIndex) -> Vec<NodeIndex> {
        let mut succs: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(ix, Direction::Outgoing)
            .collect();
        succs.sort_unstable();
        succs
    }

    pub(crate) fn is_sink_index(&self, ix: NodeIndex) -> bool {
        self.graph
            .neighbors_directed(ix, Direction::Outgoing)
            .next()
            .is_none()
    }
}
