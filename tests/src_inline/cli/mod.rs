use super::*;
use clap::Parser;

const REQUIRED: [&str; 13] = [
    "kira-codeg",
    "run",
    "--ad-matrix",
    "ad.tsv",
    "--ad-labels",
    "ad_labels.tsv",
    "--oa-matrix",
    "oa.tsv",
    "--oa-labels",
    "oa_labels.tsv",
    "--edges",
    "string.tsv",
    "--out",
];

fn run_args(extra: &[&str]) -> run::RunArgs {
    let mut argv: Vec<&str> = REQUIRED.to_vec();
    argv.push("out");
    argv.extend_from_slice(extra);
    match Cli::parse_from(argv).command {
        Command::Run(args) => args,
        _ => panic!("expected run command"),
    }
}

#[test]
fn run_defaults() {
    let args = run_args(&[]);
    assert_eq!(args.ad_name, "AD");
    assert_eq!(args.oa_name, "OA");
    assert!(args.terms.is_empty());
    assert!(args.ad_val_matrix.is_none());
    let cfg = args.effective_config().expect("config");
    assert_eq!(cfg, crate::model::config::AnalysisConfig::default());
}

#[test]
fn run_overrides_and_repeated_terms() {
    let args = run_args(&[
        "--adj-p",
        "0.01",
        "--log2fc",
        "1",
        "--top-k",
        "3",
        "--terms",
        "GO_BP=bp.gmt",
        "--terms",
        "KEGG=kegg.gmt",
    ]);
    assert_eq!(args.terms, vec!["GO_BP=bp.gmt", "KEGG=kegg.gmt"]);
    let cfg = args.effective_config().expect("config");
    assert_eq!(cfg.adj_p_threshold, 0.01);
    assert_eq!(cfg.log2fc_threshold, 1.0);
    assert_eq!(cfg.top_k, 3);
}

#[test]
fn invalid_override_is_rejected() {
    let args = run_args(&["--adj-p", "2"]);
    assert!(args.effective_config().is_err());
}

#[test]
fn validation_cohort_needs_both_files() {
    let mut argv: Vec<&str> = REQUIRED.to_vec();
    argv.extend_from_slice(&["out", "--ad-val-matrix", "val.tsv"]);
    assert!(Cli::try_parse_from(argv).is_err());
    let args = run_args(&["--ad-val-matrix", "v.tsv", "--ad-val-labels", "vl.tsv"]);
    assert!(args.ad_val_labels.is_some());
}

#[test]
fn validate_and_config_parse() {
    let cli = Cli::parse_from([
        "kira-codeg",
        "validate",
        "--matrix",
        "m.tsv",
        "--labels",
        "l.tsv",
    ]);
    match cli.command {
        Command::Validate(args) => assert_eq!(args.name, "dataset"),
        _ => panic!("expected validate command"),
    }
    let cli = Cli::parse_from(["kira-codeg", "config"]);
    assert!(matches!(cli.command, Command::Config(_)));
}

#[test]
fn duplicate_term_category_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let gmt = dir.path().join("bp.gmt");
    std::fs::write(&gmt, "GO:1\tx\tA\n").expect("write");
    let source = format!("GO_BP={}", gmt.display());
    let sets = run::load_term_sets(std::slice::from_ref(&source)).expect("terms");
    assert_eq!(sets.len(), 1);
    assert!(run::load_term_sets(&[source.clone(), source]).is_err());
}

#[test]
fn failed_condition_keeps_other_condition_tables() {
    let dir = tempfile::tempdir().expect("tempdir");
    let p = |name: &str| dir.path().join(name);
    std::fs::write(
        p("ad.tsv"),
        "gene\td1\td2\td3\tc1\tc2\tc3\nUP1\t8\t9\t10\t1\t2\t3\nFLAT\t5\t5\t5\t5\t5\t5\n",
    )
    .expect("write");
    std::fs::write(
        p("ad_labels.tsv"),
        "sample_id\tgroup\nd1\tdisease\nd2\tdisease\nd3\tdisease\nc1\tcontrol\nc2\tcontrol\nc3\tcontrol\n",
    )
    .expect("write");
    std::fs::write(p("oa.tsv"), "gene\td1\td2\tc1\nUP1\t8\t9\t1\n").expect("write");
    std::fs::write(
        p("oa_labels.tsv"),
        "sample_id\tgroup\nd1\tdisease\nd2\tdisease\nc1\tcontrol\n",
    )
    .expect("write");
    std::fs::write(p("string.tsv"), "gene_a\tgene_b\nUP1\tFLAT\n").expect("write");

    let out = p("out");
    let path = |name: &str| p(name).display().to_string();
    let argv = vec![
        "kira-codeg".to_string(),
        "run".to_string(),
        "--ad-matrix".to_string(),
        path("ad.tsv"),
        "--ad-labels".to_string(),
        path("ad_labels.tsv"),
        "--oa-matrix".to_string(),
        path("oa.tsv"),
        "--oa-labels".to_string(),
        path("oa_labels.tsv"),
        "--edges".to_string(),
        path("string.tsv"),
        "--out".to_string(),
        out.display().to_string(),
    ];
    let args = match Cli::parse_from(argv).command {
        Command::Run(args) => args,
        _ => panic!("expected run command"),
    };

    let err = run::handle(args).expect_err("second condition has one control");
    assert!(err.to_string().contains("OA"), "{err}");
    assert!(out.join("degs_ad.tsv").is_file());
    assert!(out.join("gene_stats_ad.tsv").is_file());
    assert!(!out.join("degs_oa.tsv").exists());
    assert!(!out.join("summary.json").exists());
}
