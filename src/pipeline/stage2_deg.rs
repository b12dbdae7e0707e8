use rayon::prelude::*;
use thiserror::Error;
use tracing::warn;

use crate::model::config::AnalysisConfig;
use crate::model::expression::{ExpressionMatrix, InputShapeError};
use crate::model::records::{DegRecord, Direction, GeneStat, Regulation};
use crate::stats::fdr::benjamini_hochberg;
use crate::stats::welch::{GeneTest, StatError, welch_test};

#[derive(Debug, Error)]
pub enum Stage2Error {
    #[error("condition {condition}: {source}")]
    Shape {
        condition: String,
        #[source]
        source: InputShapeError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatFailure {
    pub gene: String,
    pub error: StatError,
}

#[derive(Debug, Clone)]
pub struct DegContext {
    pub condition: String,
    /// Every successfully tested gene in matrix row order.
    pub gene_stats: Vec<GeneStat>,
    pub degs: Vec<DegRecord>,
    pub failures: Vec<StatFailure>,
    pub zero_variance: usize,
    /// Tested genes whose log2 fold-change is undefined (NaN).
    pub undefined_fold_change: usize,
}

impl DegContext {
    pub fn n_up(&self) -> usize {
        self.degs.iter().filter(|d| d.direction == Direction::Up).count()
    }

    pub fn n_down(&self) -> usize {
        self.degs.iter().filter(|d| d.direction == Direction::Down).count()
    }
}

pub fn classify(adj_p_value: f64, log2fc: f64, config: &AnalysisConfig) -> Regulation {
    if adj_p_value < config.adj_p_threshold && log2fc.abs() > config.log2fc_threshold {
        if log2fc > 0.0 {
            Regulation::Up
        } else {
            Regulation::Down
        }
    } else {
        Regulation::NotSignificant
    }
}

/// Genes passing both thresholds, in input order.
pub fn select_degs(gene_stats: &[GeneStat], config: &AnalysisConfig) -> Vec<DegRecord> {
    gene_stats
        .iter()
        .filter(|s| classify(s.adj_p_value, s.log2fc, config) != Regulation::NotSignificant)
        .map(|s| DegRecord {
            gene: s.gene.clone(),
            p_value: s.p_value,
            adj_p_value: s.adj_p_value,
            log2fc: s.log2fc,
            direction: Direction::from_log2fc(s.log2fc),
        })
        .collect()
}

fn test_gene(matrix: &ExpressionMatrix, idx: usize, epsilon: f64) -> Result<GeneTest, StatError> {
    let (disease, control) = matrix.split_row(idx);
    welch_test(&disease, &control, epsilon)
}

/// Per-gene Welch tests, BH across every gene with a p-value, then the DEG
/// thresholds. A gene with an undefined fold-change stays in the correction
/// and is never a DEG; only genes without a p-value are left out.
pub fn run_stage2(
    condition: &str,
    matrix: &ExpressionMatrix,
    config: &AnalysisConfig,
) -> Result<DegContext, Stage2Error> {
    matrix
        .require_groups(2)
        .map_err(|source| Stage2Error::Shape {
            condition: condition.to_string(),
            source,
        })?;

    let eps = config.epsilon;
    let tests: Vec<Result<GeneTest, StatError>> = if config.parallel {
        (0..matrix.n_genes())
            .into_par_iter()
            .map(|i| test_gene(matrix, i, eps))
            .collect()
    } else {
        (0..matrix.n_genes())
            .map(|i| test_gene(matrix, i, eps))
            .collect()
    };

    let mut tested: Vec<(usize, GeneTest)> = Vec::with_capacity(tests.len());
    let mut failures = Vec::new();
    for (idx, outcome) in tests.into_iter().enumerate() {
        match outcome {
            Ok(t) => tested.push((idx, t)),
            Err(error) => failures.push(StatFailure {
                gene: matrix.genes()[idx].clone(),
                error,
            }),
        }
    }
    if !failures.is_empty() {
        warn!(
            condition,
            failed = failures.len(),
            first_gene = %failures[0].gene,
            first_error = %failures[0].error,
            "genes excluded from testing"
        );
    }

    let raw: Vec<f64> = tested.iter().map(|(_, t)| t.p_value).collect();
    let adjusted = benjamini_hochberg(&raw);

    let undefined_fold_change = tested.iter().filter(|(_, t)| t.log2fc.is_nan()).count();
    if undefined_fold_change > 0 {
        warn!(
            condition,
            genes = undefined_fold_change,
            "log2 fold-change undefined for non-positive group means"
        );
    }

    let mut zero_variance = 0usize;
    let gene_stats: Vec<GeneStat> = tested
        .iter()
        .zip(adjusted)
        .map(|((idx, t), adj_p_value)| {
            if t.sd_disease == 0.0 && t.sd_control == 0.0 {
                zero_variance += 1;
            }
            GeneStat {
                gene: matrix.genes()[*idx].clone(),
                mean_disease: t.mean_disease,
                mean_control: t.mean_control,
                sd_disease: t.sd_disease,
                sd_control: t.sd_control,
                t_statistic: t.t_statistic,
                df: t.df,
                log2fc: t.log2fc,
                p_value: t.p_value,
                adj_p_value,
                regulation: classify(adj_p_value, t.log2fc, config),
            }
        })
        .collect();

    let degs = select_degs(&gene_stats, config);

    Ok(DegContext {
        condition: condition.to_string(),
        gene_stats,
        degs,
        failures,
        zero_variance,
        undefined_fold_change,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage2_deg.rs"]
mod tests;
