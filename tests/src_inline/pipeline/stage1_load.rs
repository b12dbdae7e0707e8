use super::*;
use crate::input::store::{DirStore, MemoryStore};
use tempfile::tempdir;

fn write_dataset(dir: &Path) -> DatasetInput {
    let matrix = dir.join("ad.tsv");
    let labels = dir.join("ad_labels.tsv");
    std::fs::write(
        &matrix,
        "gene\td1\td2\tc1\tc2\nG1\t8\t9\t1\t2\nG2\t1\t1\t1\t1\n",
    )
    .expect("write");
    std::fs::write(
        &labels,
        "sample_id\tgroup\nd1\tdisease\nd2\tdisease\nc1\tcontrol\nc2\tcontrol\nx9\tcontrol\n",
    )
    .expect("write");
    DatasetInput::new("AD", &matrix, &labels)
}

#[test]
fn loads_and_records_counts() {
    let dir = tempdir().expect("tempdir");
    let input = write_dataset(dir.path());
    let mut store = MemoryStore::new();
    let ctx = run_stage1(&input, &mut store).expect("stage1");
    assert!(!ctx.from_store);
    assert_eq!(ctx.n_genes, 2);
    assert_eq!(ctx.n_samples, 4);
    assert_eq!(ctx.n_disease, 2);
    assert_eq!(ctx.n_control, 2);
    assert_eq!(ctx.labels_unmatched, Some(1));
    assert!(ctx.key.starts_with("AD-"));
    assert_eq!(store.len(), 1);
}

#[test]
fn second_load_hits_store() {
    let dir = tempdir().expect("tempdir");
    let input = write_dataset(dir.path());
    let mut store = DirStore::open(&dir.path().join("store")).expect("store");
    let first = run_stage1(&input, &mut store).expect("stage1");
    let second = run_stage1(&input, &mut store).expect("stage1 again");
    assert!(second.from_store);
    assert_eq!(second.key, first.key);
    assert_eq!(second.matrix, first.matrix);
    assert_eq!(second.labels_unmatched, None);
}

#[test]
fn unlabeled_sample_names_dataset() {
    let dir = tempdir().expect("tempdir");
    let input = write_dataset(dir.path());
    std::fs::write(&input.labels_path, "sample_id\tgroup\nd1\tdisease\n").expect("write");
    let mut store = MemoryStore::new();
    match run_stage1(&input, &mut store) {
        Err(Stage1Error::Shape { dataset, source }) => {
            assert_eq!(dataset, "AD");
            assert_eq!(source, InputShapeError::UnlabeledSample("d2".to_string()));
        }
        other => panic!("unexpected {:?}", other.map(|c| c.key)),
    }
    assert!(store.is_empty());
}

#[test]
fn missing_matrix_is_an_input_error() {
    let dir = tempdir().expect("tempdir");
    let input = DatasetInput::new("AD", &dir.path().join("nope.tsv"), &dir.path().join("l.tsv"));
    let mut store = MemoryStore::new();
    assert!(matches!(
        run_stage1(&input, &mut store),
        Err(Stage1Error::Input(InputError::MissingFile(_)))
    ));
}
