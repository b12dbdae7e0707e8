use super::*;

fn ids(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

fn small() -> ExpressionMatrix {
    ExpressionMatrix::new(
        ids(&["G1", "G2"]),
        ids(&["s1", "s2", "s3"]),
        vec![Group::Disease, Group::Control, Group::Disease],
        vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]],
    )
    .expect("matrix")
}

#[test]
fn rows_split_by_group_in_column_order() {
    let m = small();
    assert_eq!(m.n_genes(), 2);
    assert_eq!(m.n_samples(), 3);
    assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
    assert_eq!(m.split_row(0), (vec![1.0, 3.0], vec![2.0]));
    assert_eq!(m.gene_index("G2"), Some(1));
    assert_eq!(m.gene_index("G3"), None);
    assert_eq!(m.group_count(Group::Disease), 2);
}

#[test]
fn group_requirement_reports_smaller_group() {
    let m = small();
    assert!(m.require_groups(1).is_ok());
    assert_eq!(
        m.require_groups(2),
        Err(InputShapeError::GroupTooSmall {
            group: Group::Control,
            found: 1,
            required: 2
        })
    );
}

#[test]
fn shape_violations_are_rejected() {
    let err = ExpressionMatrix::new(
        ids(&["G1"]),
        ids(&["s1", "s2"]),
        vec![Group::Disease],
        vec![vec![1.0, 2.0]],
    )
    .expect_err("label count");
    assert!(matches!(err, InputShapeError::LabelCountMismatch { .. }));

    let err = ExpressionMatrix::new(
        ids(&["G1", "G1"]),
        ids(&["s1"]),
        vec![Group::Disease],
        vec![vec![1.0], vec![2.0]],
    )
    .expect_err("duplicate gene");
    assert_eq!(err, InputShapeError::DuplicateGene("G1".to_string()));

    let err = ExpressionMatrix::new(
        ids(&["G1"]),
        ids(&["s1", "s2"]),
        vec![Group::Disease, Group::Control],
        vec![vec![1.0, f64::NAN]],
    )
    .expect_err("nan");
    assert_eq!(
        err,
        InputShapeError::NonFinite {
            gene: "G1".to_string(),
            sample: "s2".to_string()
        }
    );

    let err = ExpressionMatrix::new(vec![], ids(&["s1"]), vec![Group::Disease], vec![])
        .expect_err("empty");
    assert_eq!(err, InputShapeError::EmptyGenes);
}

#[test]
fn group_labels_parse_synonyms() {
    assert_eq!(Group::parse("Case"), Some(Group::Disease));
    assert_eq!(Group::parse(" normal "), Some(Group::Control));
    assert_eq!(Group::parse("treated"), None);
}

#[test]
fn deserialize_rechecks_shape() {
    let json = serde_json::to_string(&small()).expect("json");
    let back: ExpressionMatrix = serde_json::from_str(&json).expect("parse");
    assert_eq!(back, small());

    let duplicate = json.replace("\"G2\"", "\"G1\"");
    let err = serde_json::from_str::<ExpressionMatrix>(&duplicate).expect_err("duplicate gene");
    assert!(err.to_string().contains("duplicate gene identifier G1"), "{err}");

    let no_samples = r#"{"genes":["G1"],"samples":[],"groups":[],"values":[]}"#;
    assert!(serde_json::from_str::<ExpressionMatrix>(no_samples).is_err());
}
