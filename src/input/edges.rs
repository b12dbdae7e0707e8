use std::path::{Path, PathBuf};

use crate::input::{InputError, record_line, tsv_reader};
use crate::network::graph::InteractionEdge;

/// Source of protein interaction pairs. The pipeline does not care how the
/// pairs were obtained, only that they arrive as gene identifier pairs.
pub trait EdgeProvider {
    fn name(&self) -> String;
    fn edges(&self) -> Result<Vec<InteractionEdge>, InputError>;
}

#[derive(Debug, Clone)]
pub struct TsvEdgeProvider {
    pub path: PathBuf,
}

impl TsvEdgeProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl EdgeProvider for TsvEdgeProvider {
    fn name(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    fn edges(&self) -> Result<Vec<InteractionEdge>, InputError> {
        read_edges(&self.path)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticEdgeProvider {
    pub edges: Vec<InteractionEdge>,
}

impl EdgeProvider for StaticEdgeProvider {
    fn name(&self) -> String {
        "static".to_string()
    }

    fn edges(&self) -> Result<Vec<InteractionEdge>, InputError> {
        Ok(self.edges.clone())
    }
}

const GENE_A_COLUMNS: [&str; 3] = ["gene_a", "preferredname_a", "protein1"];
const GENE_B_COLUMNS: [&str; 3] = ["gene_b", "preferredname_b", "protein2"];

#[derive(Debug, Clone, Copy)]
struct EdgeColumns {
    a: usize,
    b: usize,
    score: Option<usize>,
    /// STRING `combined_score` is given in thousandths.
    score_scale: f64,
}

impl Default for EdgeColumns {
    fn default() -> Self {
        Self {
            a: 0,
            b: 1,
            score: Some(2),
            score_scale: 1.0,
        }
    }
}

fn header_columns(record: &csv::StringRecord) -> Option<EdgeColumns> {
    let names: Vec<String> = record.iter().map(|c| c.trim().to_ascii_lowercase()).collect();
    let a = names.iter().position(|c| GENE_A_COLUMNS.contains(&c.as_str()))?;
    let b = names.iter().position(|c| GENE_B_COLUMNS.contains(&c.as_str()))?;
    let (score, score_scale) = if let Some(idx) = names.iter().position(|c| c == "score") {
        (Some(idx), 1.0)
    } else if let Some(idx) = names.iter().position(|c| c == "combined_score") {
        (Some(idx), 1000.0)
    } else {
        (None, 1.0)
    };
    Some(EdgeColumns {
        a,
        b,
        score,
        score_scale,
    })
}

/// Reads `gene_a <TAB> gene_b [<TAB> score]`. A header row is recognised by
/// its column names; without one the first two columns are the genes and the
/// optional third column is a score in [0, 1].
pub fn read_edges(path: &Path) -> Result<Vec<InteractionEdge>, InputError> {
    let mut reader = tsv_reader(path, false)?;
    let mut columns = EdgeColumns::default();
    let mut edges = Vec::new();

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let line = record_line(&record, i + 1);
        if i == 0
            && let Some(found) = header_columns(&record)
        {
            columns = found;
            continue;
        }

        let a = record.get(columns.a).unwrap_or("").trim();
        let b = record.get(columns.b).unwrap_or("").trim();
        if a.is_empty() || b.is_empty() {
            return Err(InputError::InvalidTsvRow {
                line,
                reason: "edge needs two gene identifiers".to_string(),
            });
        }

        let mut edge = InteractionEdge::new(a, b);
        if let Some(idx) = columns.score
            && let Some(raw) = record.get(idx).map(str::trim)
            && !raw.is_empty()
        {
            let score = raw
                .parse::<f64>()
                .ok()
                .map(|s| s / columns.score_scale)
                .filter(|s| (0.0..=1.0).contains(s))
                .ok_or_else(|| InputError::InvalidValue {
                    line,
                    column: idx + 1,
                    value: raw.to_string(),
                })?;
            edge = edge.with_score(score);
        }
        edges.push(edge);
    }

    Ok(edges)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/edges.rs"]
mod tests;
