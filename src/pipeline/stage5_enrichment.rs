use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;
use tracing::warn;

use crate::input::terms::{AnnotationCategory, AnnotationTerm, TermSet};
use crate::model::config::AnalysisConfig;
use crate::model::records::EnrichmentResult;
use crate::stats::fdr::benjamini_hochberg;
use crate::stats::hypergeom::{HypergeomError, upper_tail};

#[derive(Debug, Clone, PartialEq)]
pub struct TermFailure {
    pub term_id: String,
    pub error: HypergeomError,
}

#[derive(Debug, Clone)]
pub struct EnrichmentTable {
    pub category: AnnotationCategory,
    /// Terms with at least one background gene; the correction runs over these.
    pub tested_terms: usize,
    /// Overlap > 0 only, by adjusted p ascending then overlap descending.
    pub results: Vec<EnrichmentResult>,
    pub failures: Vec<TermFailure>,
}

#[derive(Debug, Clone, Default)]
pub struct EnrichmentContext {
    pub background_size: usize,
    pub query_size: usize,
    pub tables: BTreeMap<AnnotationCategory, EnrichmentTable>,
}

struct TermTest {
    overlap: usize,
    term_size: usize,
    genes: Vec<String>,
    p_value: Result<f64, HypergeomError>,
}

fn test_term(
    term: &AnnotationTerm,
    query: &HashSet<&str>,
    background: &HashSet<&str>,
) -> TermTest {
    let mut term_size = 0usize;
    let mut genes = Vec::new();
    for g in &term.genes {
        if !background.contains(g.as_str()) {
            continue;
        }
        term_size += 1;
        if query.contains(g.as_str()) {
            genes.push(g.clone());
        }
    }
    let overlap = genes.len();
    let p_value = upper_tail(
        background.len() as u64,
        term_size as u64,
        query.len() as u64,
        overlap as u64,
    );
    TermTest {
        overlap,
        term_size,
        genes,
        p_value,
    }
}

/// Overrepresentation of `query` in each term against `background`. Term
/// sizes and the query are restricted to the background first.
pub fn enrich_terms(
    query: &[String],
    background: &HashSet<&str>,
    terms: &TermSet,
    parallel: bool,
) -> EnrichmentTable {
    let query: HashSet<&str> = query
        .iter()
        .map(|g| g.as_str())
        .filter(|g| background.contains(g))
        .collect();

    let tests: Vec<TermTest> = if parallel {
        terms
            .terms
            .par_iter()
            .map(|t| test_term(t, &query, background))
            .collect()
    } else {
        terms
            .terms
            .iter()
            .map(|t| test_term(t, &query, background))
            .collect()
    };

    let mut tested: Vec<(&AnnotationTerm, TermTest, f64)> = Vec::new();
    let mut failures = Vec::new();
    for (term, test) in terms.terms.iter().zip(tests) {
        if test.term_size == 0 {
            continue;
        }
        match test.p_value {
            Ok(p) => tested.push((term, test, p)),
            Err(error) => failures.push(TermFailure {
                term_id: term.id.clone(),
                error,
            }),
        }
    }

    let raw: Vec<f64> = tested.iter().map(|(_, _, p)| *p).collect();
    let adjusted = benjamini_hochberg(&raw);
    let tested_terms = tested.len();

    let background_size = background.len();
    let query_size = query.len();
    let mut results: Vec<EnrichmentResult> = tested
        .into_iter()
        .zip(adjusted)
        .filter(|((_, test, _), _)| test.overlap > 0)
        .map(|((term, test, p_value), adj_p_value)| EnrichmentResult {
            term_id: term.id.clone(),
            term_name: term.name.clone(),
            overlap: test.overlap,
            term_size: test.term_size,
            query_size,
            background_size,
            expected: test.term_size as f64 * query_size as f64 / background_size as f64,
            p_value,
            adj_p_value,
            genes: test.genes,
        })
        .collect();

    results.sort_by(|a, b| {
        a.adj_p_value
            .total_cmp(&b.adj_p_value)
            .then_with(|| b.overlap.cmp(&a.overlap))
            .then_with(|| a.term_id.cmp(&b.term_id))
    });

    EnrichmentTable {
        category: terms.category,
        tested_terms,
        results,
        failures,
    }
}

pub fn run_stage5(
    query: &[String],
    background: &HashSet<&str>,
    term_sets: &[TermSet],
    config: &AnalysisConfig,
) -> EnrichmentContext {
    let mut ctx = EnrichmentContext {
        background_size: background.len(),
        query_size: query.iter().filter(|g| background.contains(g.as_str())).count(),
        tables: BTreeMap::new(),
    };
    for set in term_sets {
        let table = enrich_terms(query, background, set, config.parallel);
        if !table.failures.is_empty() {
            warn!(
                category = set.category.as_str(),
                failed = table.failures.len(),
                "terms excluded from enrichment"
            );
        }
        ctx.tables.insert(set.category, table);
    }
    ctx
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_enrichment.rs"]
mod tests;
