use super::*;
use std::collections::BTreeSet;

fn term(id: &str, genes: &[&str]) -> AnnotationTerm {
    AnnotationTerm {
        id: id.to_string(),
        name: format!("{id} name"),
        genes: genes.iter().map(|g| g.to_string()).collect::<BTreeSet<_>>(),
    }
}

fn background() -> Vec<String> {
    (0..100).map(|i| format!("G{i}")).collect()
}

fn terms() -> TermSet {
    TermSet {
        category: AnnotationCategory::Kegg,
        terms: vec![
            term("T_HIT", &["G0", "G1", "G2", "G3", "G50"]),
            term("T_WEAK", &["G0", "G60", "G61", "G62", "G63", "G64"]),
            term("T_NONE", &["G70", "G71"]),
            term("T_OUTSIDE", &["NOT_MEASURED"]),
        ],
        duplicate_terms: 0,
    }
}

fn query() -> Vec<String> {
    vec!["G0", "G1", "G2", "G3", "G4"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[test]
fn overlap_zero_terms_are_tested_but_not_reported() {
    let bg_owned = background();
    let bg: HashSet<&str> = bg_owned.iter().map(|g| g.as_str()).collect();
    let table = enrich_terms(&query(), &bg, &terms(), false);
    assert_eq!(table.tested_terms, 3);
    let ids: Vec<&str> = table.results.iter().map(|r| r.term_id.as_str()).collect();
    assert_eq!(ids, vec!["T_HIT", "T_WEAK"]);
    let hit = &table.results[0];
    assert_eq!(hit.overlap, 4);
    assert_eq!(hit.term_size, 5);
    assert_eq!(hit.query_size, 5);
    assert_eq!(hit.background_size, 100);
    assert!((hit.expected - 0.25).abs() < 1e-12);
    assert_eq!(hit.genes, vec!["G0", "G1", "G2", "G3"]);
    assert!(hit.p_value < 1e-4);
    assert!(hit.adj_p_value >= hit.p_value);
}

#[test]
fn query_genes_outside_background_are_ignored() {
    let bg_owned = background();
    let bg: HashSet<&str> = bg_owned.iter().map(|g| g.as_str()).collect();
    let mut q = query();
    q.push("NOT_MEASURED".to_string());
    let ctx = run_stage5(&q, &bg, &[terms()], &AnalysisConfig::default());
    assert_eq!(ctx.query_size, 5);
    let table = &ctx.tables[&AnnotationCategory::Kegg];
    assert_eq!(table.results[0].query_size, 5);
}

#[test]
fn parallel_matches_serial() {
    let bg_owned = background();
    let bg: HashSet<&str> = bg_owned.iter().map(|g| g.as_str()).collect();
    let a = enrich_terms(&query(), &bg, &terms(), true);
    let b = enrich_terms(&query(), &bg, &terms(), false);
    assert_eq!(a.results, b.results);
}

#[test]
fn empty_query_reports_nothing() {
    let bg_owned = background();
    let bg: HashSet<&str> = bg_owned.iter().map(|g| g.as_str()).collect();
    let ctx = run_stage5(&[], &bg, &[terms()], &AnalysisConfig::default());
    let table = &ctx.tables[&AnnotationCategory::Kegg];
    assert!(table.results.is_empty());
    assert_eq!(table.tested_terms, 3);
}

#[test]
fn equal_adjusted_p_orders_larger_overlap_first() {
    let bg_owned = background();
    let bg: HashSet<&str> = bg_owned.iter().map(|g| g.as_str()).collect();
    // T_A: overlap 1 of 3 (p ~ 0.144); T_B: overlap 2 of 20 (p ~ 0.261).
    // With two tests BH lifts T_A to T_B's value.
    let mut wide: Vec<String> = vec!["G1".to_string(), "G2".to_string()];
    wide.extend((60..78).map(|i| format!("G{i}")));
    let wide_refs: Vec<&str> = wide.iter().map(|g| g.as_str()).collect();
    let set = TermSet {
        category: AnnotationCategory::GoMf,
        terms: vec![term("T_A", &["G0", "G50", "G51"]), term("T_B", &wide_refs)],
        duplicate_terms: 0,
    };
    let table = enrich_terms(&query(), &bg, &set, false);
    let ids: Vec<&str> = table.results.iter().map(|r| r.term_id.as_str()).collect();
    assert_eq!(ids, vec!["T_B", "T_A"]);
    let (b, a) = (&table.results[0], &table.results[1]);
    assert_eq!(a.adj_p_value, b.adj_p_value);
    assert!(a.p_value < b.p_value);
    assert_eq!((b.overlap, a.overlap), (2, 1));
    assert_eq!(b.term_size, 20);
}
