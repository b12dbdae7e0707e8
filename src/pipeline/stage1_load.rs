use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::input::{InputError, path_display};
use crate::input::labels::read_labels;
use crate::input::matrix::{assemble_matrix, read_matrix};
use crate::input::store::{DatasetStore, StoreError, dataset_key};
use crate::model::expression::{ExpressionMatrix, Group, InputShapeError};

#[derive(Debug, Error)]
pub enum Stage1Error {
    #[error("input error: {0}")]
    Input(#[from] InputError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("dataset {dataset}: {source}")]
    Shape {
        dataset: String,
        #[source]
        source: InputShapeError,
    },
}

/// One expression dataset as handed over by the fetch/normalise collaborator.
#[derive(Debug, Clone)]
pub struct DatasetInput {
    pub name: String,
    pub matrix_path: PathBuf,
    pub labels_path: PathBuf,
}

impl DatasetInput {
    pub fn new(name: &str, matrix_path: &Path, labels_path: &Path) -> Self {
        Self {
            name: name.to_string(),
            matrix_path: matrix_path.to_path_buf(),
            labels_path: labels_path.to_path_buf(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatasetCtx {
    pub name: String,
    pub key: String,
    pub matrix: ExpressionMatrix,
    pub from_store: bool,
    pub n_genes: usize,
    pub n_samples: usize,
    pub n_disease: usize,
    pub n_control: usize,
    /// Label rows naming samples absent from the matrix; unknown on a store hit.
    pub labels_unmatched: Option<usize>,
    pub labels_duplicate_rows: Option<usize>,
}

impl DatasetCtx {
    fn from_matrix(name: &str, key: String, matrix: ExpressionMatrix, from_store: bool) -> Self {
        Self {
            name: name.to_string(),
            key,
            n_genes: matrix.n_genes(),
            n_samples: matrix.n_samples(),
            n_disease: matrix.group_count(Group::Disease),
            n_control: matrix.group_count(Group::Control),
            matrix,
            from_store,
            labels_unmatched: None,
            labels_duplicate_rows: None,
        }
    }
}

/// Reads matrix + labels, checks shape invariants and records the parsed
/// matrix in `store`. A store hit under the same content key skips parsing.
pub fn run_stage1(
    input: &DatasetInput,
    store: &mut dyn DatasetStore,
) -> Result<DatasetCtx, Stage1Error> {
    for path in [&input.matrix_path, &input.labels_path] {
        if !path.is_file() {
            return Err(InputError::MissingFile(path_display(path).to_string()).into());
        }
    }
    let key = dataset_key(&input.name, &[&input.matrix_path, &input.labels_path])?;
    if let Some(matrix) = store.get(&key)? {
        debug!(dataset = %input.name, key = %key, "dataset served from store");
        return Ok(DatasetCtx::from_matrix(&input.name, key, matrix, true));
    }

    let raw = read_matrix(&input.matrix_path)?;
    let labels = read_labels(&input.labels_path)?;
    let unmatched = labels.unmatched(&raw.samples);
    if unmatched > 0 {
        warn!(
            dataset = %input.name,
            unmatched,
            "label rows without a matrix column were ignored"
        );
    }
    let duplicate_rows = labels.duplicate_rows;
    let matrix = assemble_matrix(raw, &labels).map_err(|source| Stage1Error::Shape {
        dataset: input.name.clone(),
        source,
    })?;
    store.put(&key, &matrix)?;

    let mut ctx = DatasetCtx::from_matrix(&input.name, key, matrix, false);
    ctx.labels_unmatched = Some(unmatched);
    ctx.labels_duplicate_rows = Some(duplicate_rows);
    Ok(ctx)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage1_load.rs"]
mod tests;
