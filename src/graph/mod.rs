pub mod activity_graph;

pub use activity_graph::ActivityGraph;
