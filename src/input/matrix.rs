use std::collections::HashSet;
use std::path::Path;

use crate::input::labels::SampleLabels;
use crate::input::{InputError, record_line, tsv_reader};
use crate::model::expression::{ExpressionMatrix, InputShapeError};

/// Parsed expression table before group labels are attached.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMatrix {
    pub genes: Vec<String>,
    pub samples: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

pub fn read_matrix(path: &Path) -> Result<RawMatrix, InputError> {
    let mut reader = tsv_reader(path, false)?;
    let mut records = reader.records();

    let header = match records.next() {
        Some(r) => r?,
        None => {
            return Err(InputError::InvalidTsvRow {
                line: 0,
                reason: "empty matrix file".to_string(),
            });
        }
    };
    let samples: Vec<String> = header.iter().skip(1).map(|s| s.trim().to_string()).collect();
    if samples.is_empty() {
        return Err(InputError::InvalidTsvRow {
            line: 1,
            reason: "header has no sample columns".to_string(),
        });
    }
    let mut seen_samples = HashSet::with_capacity(samples.len());
    for s in &samples {
        if s.is_empty() {
            return Err(InputError::InvalidTsvRow {
                line: 1,
                reason: "empty sample identifier".to_string(),
            });
        }
        if !seen_samples.insert(s.as_str()) {
            return Err(InputError::DuplicateSample(s.clone()));
        }
    }

    let mut genes = Vec::new();
    let mut rows = Vec::new();
    let mut seen_genes: HashSet<String> = HashSet::new();
    for (i, record) in records.enumerate() {
        let record = record?;
        let line = record_line(&record, i + 2);
        let gene = record.get(0).unwrap_or("").trim();
        if gene.is_empty() {
            return Err(InputError::InvalidTsvRow {
                line,
                reason: "empty gene identifier".to_string(),
            });
        }
        if record.len() != samples.len() + 1 {
            return Err(InputError::InvalidTsvRow {
                line,
                reason: format!(
                    "expected {} values, found {}",
                    samples.len(),
                    record.len().saturating_sub(1)
                ),
            });
        }
        if !seen_genes.insert(gene.to_string()) {
            return Err(InputError::DuplicateGene {
                gene: gene.to_string(),
                line,
            });
        }

        let mut row = Vec::with_capacity(samples.len());
        for (col, field) in record.iter().enumerate().skip(1) {
            let value = field.trim();
            let parsed = value.parse::<f64>().map_err(|_| InputError::InvalidValue {
                line,
                column: col + 1,
                value: value.to_string(),
            })?;
            row.push(parsed);
        }
        genes.push(gene.to_string());
        rows.push(row);
    }

    Ok(RawMatrix {
        genes,
        samples,
        rows,
    })
}

/// Attach group labels in matrix column order. Label rows for samples not in
/// the matrix are ignored.
pub fn assemble_matrix(
    raw: RawMatrix,
    labels: &SampleLabels,
) -> Result<ExpressionMatrix, InputShapeError> {
    let mut groups = Vec::with_capacity(raw.samples.len());
    for sample in &raw.samples {
        let group = labels
            .group_of(sample)
            .ok_or_else(|| InputShapeError::UnlabeledSample(sample.clone()))?;
        groups.push(group);
    }
    ExpressionMatrix::new(raw.genes, raw.samples, groups, raw.rows)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/matrix.rs"]
mod tests;
