use thiserror::Error;
use tracing::warn;

use crate::model::expression::{ExpressionMatrix, Group};
use crate::model::records::ValidationResult;
use crate::stats::roc::{RocError, roc_curve, youden_optimal};
use crate::stats::welch::welch_t;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("gene {gene} not present in validation cohort")]
    MissingGene { gene: String },
    #[error("gene {gene}: AUC undefined with {disease} disease and {control} control samples")]
    InsufficientGroup {
        gene: String,
        disease: usize,
        control: usize,
    },
    #[error("gene {gene}: {source}")]
    Roc {
        gene: String,
        #[source]
        source: RocError,
    },
}

impl ValidationError {
    pub fn status(&self) -> &'static str {
        match self {
            ValidationError::MissingGene { .. } => "missing_gene",
            ValidationError::InsufficientGroup { .. } => "insufficient_group",
            ValidationError::Roc { .. } => "roc_error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationRow {
    pub cohort: String,
    pub gene: String,
    pub outcome: Result<ValidationResult, ValidationError>,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    pub rows: Vec<ValidationRow>,
}

impl ValidationContext {
    pub fn n_ok(&self) -> usize {
        self.rows.iter().filter(|r| r.outcome.is_ok()).count()
    }
}

/// ROC/AUC of one gene's expression with disease as the positive class.
pub fn validate_gene(
    matrix: &ExpressionMatrix,
    gene: &str,
) -> Result<ValidationResult, ValidationError> {
    let idx = matrix
        .gene_index(gene)
        .ok_or_else(|| ValidationError::MissingGene {
            gene: gene.to_string(),
        })?;
    let disease = matrix.group_count(Group::Disease);
    let control = matrix.group_count(Group::Control);
    if disease == 0 || control == 0 {
        return Err(ValidationError::InsufficientGroup {
            gene: gene.to_string(),
            disease,
            control,
        });
    }

    let scores = matrix.row(idx);
    let labels: Vec<bool> = matrix.groups().iter().map(|g| *g == Group::Disease).collect();
    let curve = roc_curve(scores, &labels).map_err(|source| ValidationError::Roc {
        gene: gene.to_string(),
        source,
    })?;
    let best = youden_optimal(&curve).ok_or_else(|| ValidationError::InsufficientGroup {
        gene: gene.to_string(),
        disease,
        control,
    })?;

    let (d, c) = matrix.split_row(idx);
    let p_value = match welch_t(&d, &c) {
        Ok(w) => w.p_value,
        Err(err) => {
            warn!(gene, error = %err, "no Welch p-value in validation cohort");
            f64::NAN
        }
    };

    Ok(ValidationResult {
        gene: gene.to_string(),
        auc: curve.auc,
        threshold: best.threshold,
        sensitivity: best.sensitivity,
        specificity: best.specificity,
        p_value,
    })
}

/// Validates every core gene in one cohort; failures stay per gene.
pub fn run_stage6(
    cohort: &str,
    matrix: &ExpressionMatrix,
    genes: &[String],
) -> ValidationContext {
    let rows: Vec<ValidationRow> = genes
        .iter()
        .map(|gene| ValidationRow {
            cohort: cohort.to_string(),
            gene: gene.clone(),
            outcome: validate_gene(matrix, gene),
        })
        .collect();
    for row in &rows {
        if let Err(err) = &row.outcome {
            warn!(cohort, gene = %row.gene, error = %err, "core gene not validated");
        }
    }
    ValidationContext { rows }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage6_validate.rs"]
mod tests;
