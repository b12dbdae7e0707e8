pub mod centrality;
pub mod graph;
