use super::*;
use crate::model::expression::Group;

fn matrix() -> ExpressionMatrix {
    let groups = vec![
        Group::Disease,
        Group::Disease,
        Group::Disease,
        Group::Control,
        Group::Control,
        Group::Control,
    ];
    ExpressionMatrix::new(
        vec![
            "UP".to_string(),
            "DOWN".to_string(),
            "FLAT".to_string(),
            "NOISE".to_string(),
        ],
        (1..=6).map(|i| format!("s{i}")).collect(),
        groups,
        vec![
            vec![8.0, 9.0, 10.0, 1.0, 2.0, 3.0],
            vec![1.0, 1.5, 2.0, 9.0, 10.0, 11.0],
            vec![5.0, 5.0, 5.0, 5.0, 5.0, 5.0],
            vec![4.0, 6.0, 5.0, 5.0, 4.0, 6.0],
        ],
    )
    .expect("matrix")
}

#[test]
fn selects_up_and_down_genes() {
    let cfg = AnalysisConfig::default();
    let ctx = run_stage2("AD", &matrix(), &cfg).expect("stage2");
    assert_eq!(ctx.gene_stats.len(), 4);
    let degs: Vec<(&str, Direction)> = ctx
        .degs
        .iter()
        .map(|d| (d.gene.as_str(), d.direction))
        .collect();
    assert_eq!(degs, vec![("UP", Direction::Up), ("DOWN", Direction::Down)]);
    assert_eq!(ctx.n_up(), 1);
    assert_eq!(ctx.n_down(), 1);
    assert_eq!(ctx.zero_variance, 1);
    let flat = &ctx.gene_stats[2];
    assert_eq!(flat.p_value, 1.0);
    assert_eq!(flat.regulation, Regulation::NotSignificant);
}

#[test]
fn adjusted_p_is_never_below_raw() {
    let ctx = run_stage2("AD", &matrix(), &AnalysisConfig::default()).expect("stage2");
    for s in &ctx.gene_stats {
        assert!(s.adj_p_value >= s.p_value);
    }
}

#[test]
fn parallel_and_serial_agree() {
    let mut cfg = AnalysisConfig::default();
    let par = run_stage2("AD", &matrix(), &cfg).expect("stage2");
    cfg.parallel = false;
    let ser = run_stage2("AD", &matrix(), &cfg).expect("stage2");
    assert_eq!(par.gene_stats, ser.gene_stats);
}

#[test]
fn tighter_fold_change_drops_genes() {
    let cfg = AnalysisConfig {
        log2fc_threshold: 2.5,
        ..AnalysisConfig::default()
    };
    let ctx = run_stage2("AD", &matrix(), &cfg).expect("stage2");
    let genes: Vec<&str> = ctx.degs.iter().map(|d| d.gene.as_str()).collect();
    assert_eq!(genes, vec!["DOWN"]);
}

#[test]
fn classification_uses_strict_thresholds() {
    let cfg = AnalysisConfig::default();
    assert_eq!(classify(0.01, 0.6, &cfg), Regulation::Up);
    assert_eq!(classify(0.01, -0.6, &cfg), Regulation::Down);
    assert_eq!(classify(0.05, 3.0, &cfg), Regulation::NotSignificant);
    assert_eq!(classify(0.01, 0.5, &cfg), Regulation::NotSignificant);
}

#[test]
fn undefined_fold_change_stays_in_correction_family() {
    let m = ExpressionMatrix::new(
        vec!["OK".to_string(), "NEG".to_string()],
        (1..=6).map(|i| format!("s{i}")).collect(),
        vec![
            Group::Disease,
            Group::Disease,
            Group::Disease,
            Group::Control,
            Group::Control,
            Group::Control,
        ],
        vec![
            vec![8.0, 9.0, 10.0, 1.0, 2.0, 3.0],
            vec![-5.0, 3.0, -4.5, 1.0, 2.0, 3.0],
        ],
    )
    .expect("matrix");
    let ctx = run_stage2("OA", &m, &AnalysisConfig::default()).expect("stage2");
    assert!(ctx.failures.is_empty());
    assert_eq!(ctx.gene_stats.len(), 2);
    assert_eq!(ctx.undefined_fold_change, 1);

    let neg = &ctx.gene_stats[1];
    assert!(neg.log2fc.is_nan());
    assert!(neg.p_value.is_finite());
    assert_eq!(neg.regulation, Regulation::NotSignificant);

    let raw: Vec<f64> = ctx.gene_stats.iter().map(|s| s.p_value).collect();
    let expected = benjamini_hochberg(&raw);
    let adjusted: Vec<f64> = ctx.gene_stats.iter().map(|s| s.adj_p_value).collect();
    assert_eq!(adjusted, expected);
    assert!((ctx.gene_stats[0].adj_p_value - 2.0 * ctx.gene_stats[0].p_value).abs() < 1e-15);

    let genes: Vec<&str> = ctx.degs.iter().map(|d| d.gene.as_str()).collect();
    assert_eq!(genes, vec!["OK"]);
}

#[test]
fn single_sample_group_is_rejected() {
    let m = ExpressionMatrix::new(
        vec!["G".to_string()],
        vec!["a".to_string(), "b".to_string(), "c".to_string()],
        vec![Group::Disease, Group::Control, Group::Control],
        vec![vec![1.0, 2.0, 3.0]],
    )
    .expect("matrix");
    assert!(matches!(
        run_stage2("AD", &m, &AnalysisConfig::default()),
        Err(Stage2Error::Shape { .. })
    ));
}
