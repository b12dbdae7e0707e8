use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Disease,
    Control,
}

impl Group {
    pub fn as_str(&self) -> &'static str {
        match self {
            Group::Disease => "disease",
            Group::Control => "control",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "disease" | "case" => Some(Group::Disease),
            "control" | "normal" => Some(Group::Control),
            _ => None,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputShapeError {
    #[error("matrix has no genes")]
    EmptyGenes,
    #[error("matrix has no samples")]
    EmptySamples,
    #[error("{labels} labels for {samples} samples")]
    LabelCountMismatch { samples: usize, labels: usize },
    #[error("row {gene} has {found} values, expected {expected}")]
    RaggedRow {
        gene: String,
        expected: usize,
        found: usize,
    },
    #[error("duplicate gene identifier {0}")]
    DuplicateGene(String),
    #[error("duplicate sample identifier {0}")]
    DuplicateSample(String),
    #[error("sample {0} has no group label")]
    UnlabeledSample(String),
    #[error("non-finite value for gene {gene} in sample {sample}")]
    NonFinite { gene: String, sample: String },
    #[error("group {group} has {found} samples, at least {required} required")]
    GroupTooSmall {
        group: Group,
        found: usize,
        required: usize,
    },
    #[error("{found} values for a {expected}-cell matrix")]
    ValueCountMismatch { expected: usize, found: usize },
}

/// Gene x sample expression values (already normalised, log scale) with one
/// group label per sample column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StoredMatrix")]
pub struct ExpressionMatrix {
    genes: Vec<String>,
    samples: Vec<String>,
    groups: Vec<Group>,
    /// Row-major, `genes.len() * samples.len()`.
    values: Vec<f64>,
}

/// Serialized form; deserialization goes back through `ExpressionMatrix::new`.
#[derive(Deserialize)]
struct StoredMatrix {
    genes: Vec<String>,
    samples: Vec<String>,
    groups: Vec<Group>,
    values: Vec<f64>,
}

impl TryFrom<StoredMatrix> for ExpressionMatrix {
    type Error = InputShapeError;

    fn try_from(stored: StoredMatrix) -> Result<Self, Self::Error> {
        let width = stored.samples.len();
        if width == 0 {
            return Err(InputShapeError::EmptySamples);
        }
        let expected = stored.genes.len() * width;
        if stored.values.len() != expected {
            return Err(InputShapeError::ValueCountMismatch {
                expected,
                found: stored.values.len(),
            });
        }
        let rows = stored.values.chunks(width).map(<[f64]>::to_vec).collect();
        ExpressionMatrix::new(stored.genes, stored.samples, stored.groups, rows)
    }
}

impl ExpressionMatrix {
    pub fn new(
        genes: Vec<String>,
        samples: Vec<String>,
        groups: Vec<Group>,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, InputShapeError> {
        if genes.is_empty() || rows.is_empty() {
            return Err(InputShapeError::EmptyGenes);
        }
        if samples.is_empty() {
            return Err(InputShapeError::EmptySamples);
        }
        if groups.len() != samples.len() {
            return Err(InputShapeError::LabelCountMismatch {
                samples: samples.len(),
                labels: groups.len(),
            });
        }
        if rows.len() != genes.len() {
            return Err(InputShapeError::RaggedRow {
                gene: "<matrix>".to_string(),
                expected: genes.len(),
                found: rows.len(),
            });
        }

        let mut seen = HashSet::with_capacity(samples.len());
        for s in &samples {
            if !seen.insert(s.as_str()) {
                return Err(InputShapeError::DuplicateSample(s.clone()));
            }
        }

        let mut seen = HashSet::with_capacity(genes.len());
        let mut values = Vec::with_capacity(genes.len() * samples.len());
        for (gene, row) in genes.iter().zip(rows) {
            if !seen.insert(gene.as_str()) {
                return Err(InputShapeError::DuplicateGene(gene.clone()));
            }
            if row.len() != samples.len() {
                return Err(InputShapeError::RaggedRow {
                    gene: gene.clone(),
                    expected: samples.len(),
                    found: row.len(),
                });
            }
            if let Some(col) = row.iter().position(|v| !v.is_finite()) {
                return Err(InputShapeError::NonFinite {
                    gene: gene.clone(),
                    sample: samples[col].clone(),
                });
            }
            values.extend(row);
        }

        Ok(Self {
            genes,
            samples,
            groups,
            values,
        })
    }

    pub fn n_genes(&self) -> usize {
        self.genes.len()
    }

    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }

    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    pub fn samples(&self) -> &[String] {
        &self.samples
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn row(&self, gene_idx: usize) -> &[f64] {
        let n = self.samples.len();
        &self.values[gene_idx * n..(gene_idx + 1) * n]
    }

    pub fn gene_index(&self, gene: &str) -> Option<usize> {
        self.genes.iter().position(|g| g == gene)
    }

    pub fn group_count(&self, group: Group) -> usize {
        self.groups.iter().filter(|g| **g == group).count()
    }

    /// Values of one gene split into (disease, control), in column order.
    pub fn split_row(&self, gene_idx: usize) -> (Vec<f64>, Vec<f64>) {
        let mut disease = Vec::with_capacity(self.group_count(Group::Disease));
        let mut control = Vec::with_capacity(self.group_count(Group::Control));
        for (v, g) in self.row(gene_idx).iter().zip(&self.groups) {
            match g {
                Group::Disease => disease.push(*v),
                Group::Control => control.push(*v),
            }
        }
        (disease, control)
    }

    /// Both groups must be present with at least `min_per_group` samples.
    pub fn require_groups(&self, min_per_group: usize) -> Result<(), InputShapeError> {
        for group in [Group::Disease, Group::Control] {
            let found = self.group_count(group);
            if found < min_per_group {
                return Err(InputShapeError::GroupTooSmall {
                    group,
                    found,
                    required: min_per_group,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/model/expression.rs"]
mod tests;
