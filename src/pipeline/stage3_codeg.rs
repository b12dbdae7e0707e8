use std::collections::BTreeMap;

use crate::model::records::{CoDeg, DegRecord, Direction};
use crate::pipeline::stage2_deg::DegContext;

#[derive(Debug, Clone, Default)]
pub struct CoDegContext {
    /// Same direction in both conditions, sorted by gene.
    pub concordant: Vec<CoDeg>,
    /// Opposite directions, sorted by gene.
    pub discordant: Vec<CoDeg>,
}

impl CoDegContext {
    pub fn concordant_genes(&self) -> Vec<String> {
        self.concordant.iter().map(|c| c.gene.clone()).collect()
    }

    pub fn n_up(&self) -> usize {
        self.concordant
            .iter()
            .filter(|c| c.first.direction == Direction::Up)
            .count()
    }

    pub fn n_down(&self) -> usize {
        self.concordant
            .iter()
            .filter(|c| c.first.direction == Direction::Down)
            .count()
    }
}

/// Genes that are DEGs in both inputs, split by direction agreement.
pub fn intersect_degs(first: &[DegRecord], second: &[DegRecord]) -> CoDegContext {
    let second_by_gene: BTreeMap<&str, &DegRecord> =
        second.iter().map(|d| (d.gene.as_str(), d)).collect();
    let mut first_sorted: Vec<&DegRecord> = first.iter().collect();
    first_sorted.sort_by(|a, b| a.gene.cmp(&b.gene));
    first_sorted.dedup_by(|a, b| a.gene == b.gene);

    let mut out = CoDegContext::default();
    for a in first_sorted {
        let Some(b) = second_by_gene.get(a.gene.as_str()) else {
            continue;
        };
        let co = CoDeg {
            gene: a.gene.clone(),
            first: a.clone(),
            second: (*b).clone(),
        };
        if co.is_concordant() {
            out.concordant.push(co);
        } else {
            out.discordant.push(co);
        }
    }
    out
}

pub fn run_stage3(first: &DegContext, second: &DegContext) -> CoDegContext {
    intersect_degs(&first.degs, &second.degs)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_codeg.rs"]
mod tests;
