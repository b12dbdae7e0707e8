use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEdge {
    pub gene_a: String,
    pub gene_b: String,
    #[serde(default)]
    pub score: Option<f64>,
}

impl InteractionEdge {
    pub fn new(gene_a: impl Into<String>, gene_b: impl Into<String>) -> Self {
        Self {
            gene_a: gene_a.into(),
            gene_b: gene_b.into(),
            score: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// Undirected simple graph over gene identifiers. Edges are stored once as
/// `(min, max)`; vertices and edges iterate in identifier order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionGraph {
    adjacency: BTreeMap<String, BTreeSet<String>>,
    n_edges: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub input_edges: usize,
    pub self_loops: usize,
    pub outside_vertex_set: usize,
    pub below_min_score: usize,
    pub duplicates: usize,
}

impl InteractionGraph {
    pub fn with_vertices<I, S>(vertices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let adjacency = vertices
            .into_iter()
            .map(|v| (v.into(), BTreeSet::new()))
            .collect();
        Self {
            adjacency,
            n_edges: 0,
        }
    }

    /// Returns false for self-loops, unknown endpoints and duplicates.
    pub fn add_edge(&mut self, a: &str, b: &str) -> bool {
        if a == b || !self.adjacency.contains_key(a) || !self.adjacency.contains_key(b) {
            return false;
        }
        let inserted = self
            .adjacency
            .get_mut(a)
            .map(|n| n.insert(b.to_string()))
            .unwrap_or(false);
        if !inserted {
            return false;
        }
        if let Some(n) = self.adjacency.get_mut(b) {
            n.insert(a.to_string());
        }
        self.n_edges += 1;
        true
    }

    pub fn n_vertices(&self) -> usize {
        self.adjacency.len()
    }

    pub fn n_edges(&self) -> usize {
        self.n_edges
    }

    pub fn contains(&self, gene: &str) -> bool {
        self.adjacency.contains_key(gene)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(|k| k.as_str())
    }

    pub fn degree(&self, gene: &str) -> Option<usize> {
        self.adjacency.get(gene).map(|n| n.len())
    }

    pub fn neighbors(&self, gene: &str) -> impl Iterator<Item = &str> {
        self.adjacency
            .get(gene)
            .into_iter()
            .flat_map(|n| n.iter().map(|s| s.as_str()))
    }

    pub fn edges(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::with_capacity(self.n_edges);
        for (a, neighbors) in &self.adjacency {
            for b in neighbors.iter().filter(|b| b.as_str() > a.as_str()) {
                out.push((a.as_str(), b.as_str()));
            }
        }
        out
    }
}

/// Induced subgraph over `genes`: every gene becomes a vertex (isolated ones
/// keep degree 0); an edge survives when both endpoints are in `genes`, it is
/// not a self-loop and its score (when present) reaches `min_score`.
pub fn build_induced(
    genes: &[String],
    edges: &[InteractionEdge],
    min_score: f64,
) -> (InteractionGraph, BuildStats) {
    let vertex_set: HashSet<&str> = genes.iter().map(|g| g.as_str()).collect();
    let mut graph = InteractionGraph::with_vertices(vertex_set.iter().copied());
    let mut stats = BuildStats {
        input_edges: edges.len(),
        ..BuildStats::default()
    };

    for edge in edges {
        let a = edge.gene_a.as_str();
        let b = edge.gene_b.as_str();
        if a == b {
            stats.self_loops += 1;
            continue;
        }
        if !vertex_set.contains(a) || !vertex_set.contains(b) {
            stats.outside_vertex_set += 1;
            continue;
        }
        if let Some(score) = edge.score
            && score < min_score
        {
            stats.below_min_score += 1;
            continue;
        }
        if !graph.add_edge(a, b) {
            stats.duplicates += 1;
        }
    }

    (graph, stats)
}

#[cfg(test)]
#[path = "../../tests/src_inline/network/graph.rs"]
mod tests;
