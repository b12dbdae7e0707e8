use thiserror::Error;
use tracing::{info, warn};

use crate::input::InputError;
use crate::input::edges::EdgeProvider;
use crate::model::config::AnalysisConfig;
use crate::model::records::CoreGeneScore;
use crate::network::centrality::rank_by_degree;
use crate::network::graph::{BuildStats, InteractionGraph, build_induced};

#[derive(Debug, Error)]
pub enum Stage4Error {
    #[error("edge provider {provider}: {source}")]
    Edges {
        provider: String,
        #[source]
        source: InputError,
    },
}

#[derive(Debug, Clone)]
pub struct NetworkContext {
    pub graph: InteractionGraph,
    pub build: BuildStats,
    /// All vertices, rank order.
    pub ranking: Vec<CoreGeneScore>,
    /// First `top_k` of `ranking`.
    pub core_genes: Vec<CoreGeneScore>,
}

impl NetworkContext {
    pub fn core_gene_ids(&self) -> Vec<String> {
        self.core_genes.iter().map(|c| c.gene.clone()).collect()
    }
}

pub fn run_stage4(
    genes: &[String],
    provider: &dyn EdgeProvider,
    config: &AnalysisConfig,
) -> Result<NetworkContext, Stage4Error> {
    let edges = provider.edges().map_err(|source| Stage4Error::Edges {
        provider: provider.name(),
        source,
    })?;
    let (graph, build) = build_induced(genes, &edges, config.min_edge_score);
    info!(
        input_edges = build.input_edges,
        outside = build.outside_vertex_set,
        self_loops = build.self_loops,
        below_min_score = build.below_min_score,
        duplicates = build.duplicates,
        "induced interaction subgraph"
    );
    if graph.n_vertices() > 0 && graph.n_edges() == 0 {
        warn!("no interactions among co-DEGs, core genes fall back to identifier order");
    }

    let ranking = rank_by_degree(&graph);
    let core_genes: Vec<CoreGeneScore> = ranking.iter().take(config.top_k).cloned().collect();

    Ok(NetworkContext {
        graph,
        build,
        ranking,
        core_genes,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_network.rs"]
mod tests;
