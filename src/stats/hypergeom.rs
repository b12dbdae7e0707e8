//! Upper-tail hypergeometric test, equivalent to a one-sided Fisher exact
//! test on the 2x2 table (in term / not in term) x (query / not query).

use statrs::function::gamma::ln_gamma;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HypergeomError {
    #[error("term size {term} exceeds population {population}")]
    TermTooLarge { term: u64, population: u64 },
    #[error("query size {query} exceeds population {population}")]
    QueryTooLarge { query: u64, population: u64 },
    #[error("overlap {overlap} exceeds min(term, query) = {max}")]
    OverlapTooLarge { overlap: u64, max: u64 },
    #[error("overlap {overlap} below term + query - population = {min}")]
    OverlapTooSmall { overlap: u64, min: u64 },
}

/// 2x2 contingency counts for one term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContingencyTable {
    pub in_term_query: u64,
    pub in_term_not_query: u64,
    pub not_term_query: u64,
    pub not_term_not_query: u64,
}

impl ContingencyTable {
    pub fn from_counts(
        population: u64,
        term: u64,
        query: u64,
        overlap: u64,
    ) -> Result<Self, HypergeomError> {
        check_counts(population, term, query, overlap)?;
        let min = overlap_floor(population, term, query);
        if overlap < min {
            return Err(HypergeomError::OverlapTooSmall { overlap, min });
        }
        Ok(Self {
            in_term_query: overlap,
            in_term_not_query: term - overlap,
            not_term_query: query - overlap,
            not_term_not_query: population + overlap - term - query,
        })
    }

    pub fn population(&self) -> u64 {
        self.in_term_query
            + self.in_term_not_query
            + self.not_term_query
            + self.not_term_not_query
    }
}

fn check_counts(
    population: u64,
    term: u64,
    query: u64,
    overlap: u64,
) -> Result<(), HypergeomError> {
    if term > population {
        return Err(HypergeomError::TermTooLarge { term, population });
    }
    if query > population {
        return Err(HypergeomError::QueryTooLarge { query, population });
    }
    let max = term.min(query);
    if overlap > max {
        return Err(HypergeomError::OverlapTooLarge { overlap, max });
    }
    Ok(())
}

/// Smallest overlap the population allows.
fn overlap_floor(population: u64, term: u64, query: u64) -> u64 {
    (term + query).saturating_sub(population)
}

pub fn ln_choose(n: u64, k: u64) -> f64 {
    if k > n {
        return f64::NEG_INFINITY;
    }
    ln_gamma(n as f64 + 1.0) - ln_gamma(k as f64 + 1.0) - ln_gamma((n - k) as f64 + 1.0)
}

/// `P(X >= overlap)` for `X ~ Hypergeometric(population, term, query)`.
pub fn upper_tail(
    population: u64,
    term: u64,
    query: u64,
    overlap: u64,
) -> Result<f64, HypergeomError> {
    check_counts(population, term, query, overlap)?;
    if overlap == 0 || overlap <= overlap_floor(population, term, query) {
        return Ok(1.0);
    }
    let max = term.min(query);

    let ln_total = ln_choose(population, query);
    let terms: Vec<f64> = (overlap..=max)
        .map(|x| ln_choose(term, x) + ln_choose(population - term, query - x) - ln_total)
        .collect();
    let peak = terms.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if peak == f64::NEG_INFINITY {
        return Ok(0.0);
    }
    let sum: f64 = terms.iter().map(|t| (t - peak).exp()).sum();
    Ok((peak + sum.ln()).exp().clamp(0.0, 1.0))
}

/// One-sided (greater) Fisher exact p-value of a 2x2 table.
pub fn fisher_greater(table: &ContingencyTable) -> Result<f64, HypergeomError> {
    upper_tail(
        table.population(),
        table.in_term_query + table.in_term_not_query,
        table.in_term_query + table.not_term_query,
        table.in_term_query,
    )
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/hypergeom.rs"]
mod tests;
