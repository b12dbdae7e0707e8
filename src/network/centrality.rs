use crate::model::records::CoreGeneScore;
use crate::network::graph::InteractionGraph;

/// Every vertex ranked by degree descending, then identifier ascending.
pub fn rank_by_degree(graph: &InteractionGraph) -> Vec<CoreGeneScore> {
    let n = graph.n_vertices();
    let denom = if n > 1 { (n - 1) as f64 } else { 0.0 };

    let mut pairs: Vec<(&str, usize)> = graph
        .vertices()
        .map(|v| (v, graph.degree(v).unwrap_or(0)))
        .collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    pairs
        .into_iter()
        .enumerate()
        .map(|(i, (gene, degree))| CoreGeneScore {
            gene: gene.to_string(),
            degree,
            centrality: if denom > 0.0 {
                degree as f64 / denom
            } else {
                0.0
            },
            rank: i + 1,
        })
        .collect()
}

/// Top `k` of [`rank_by_degree`]; all vertices when fewer than `k`.
pub fn top_k_core_genes(graph: &InteractionGraph, k: usize) -> Vec<CoreGeneScore> {
    let mut ranked = rank_by_degree(graph);
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
#[path = "../../tests/src_inline/network/centrality.rs"]
mod tests;
