use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::input::{InputError, record_line, tsv_reader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AnnotationCategory {
    #[serde(rename = "GO_BP")]
    GoBp,
    #[serde(rename = "GO_MF")]
    GoMf,
    #[serde(rename = "GO_CC")]
    GoCc,
    #[serde(rename = "KEGG")]
    Kegg,
}

impl AnnotationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationCategory::GoBp => "GO_BP",
            AnnotationCategory::GoMf => "GO_MF",
            AnnotationCategory::GoCc => "GO_CC",
            AnnotationCategory::Kegg => "KEGG",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AnnotationCategory::GoBp => "Biological Process",
            AnnotationCategory::GoMf => "Molecular Function",
            AnnotationCategory::GoCc => "Cellular Component",
            AnnotationCategory::Kegg => "KEGG Pathway",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "GO_BP" | "BP" => Some(AnnotationCategory::GoBp),
            "GO_MF" | "MF" => Some(AnnotationCategory::GoMf),
            "GO_CC" | "CC" => Some(AnnotationCategory::GoCc),
            "KEGG" => Some(AnnotationCategory::Kegg),
            _ => None,
        }
    }

    pub fn ordered() -> &'static [AnnotationCategory] {
        &[
            AnnotationCategory::GoBp,
            AnnotationCategory::GoMf,
            AnnotationCategory::GoCc,
            AnnotationCategory::Kegg,
        ]
    }
}

impl fmt::Display for AnnotationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationTerm {
    pub id: String,
    pub name: String,
    pub genes: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermSet {
    pub category: AnnotationCategory,
    pub terms: Vec<AnnotationTerm>,
    pub duplicate_terms: usize,
}

/// `CATEGORY=path` as given on the command line.
pub fn parse_term_source(value: &str) -> Result<(AnnotationCategory, PathBuf), InputError> {
    let (cat, path) = value
        .split_once('=')
        .ok_or_else(|| InputError::UnknownCategory(value.to_string()))?;
    let category =
        AnnotationCategory::parse(cat).ok_or_else(|| InputError::UnknownCategory(cat.to_string()))?;
    Ok((category, PathBuf::from(path.trim())))
}

/// GMT: `term_id <TAB> name <TAB> gene...`. The first definition of a term
/// id wins.
pub fn read_gmt(path: &Path, category: AnnotationCategory) -> Result<TermSet, InputError> {
    let mut reader = tsv_reader(path, false)?;
    let mut seen: HashSet<String> = HashSet::new();
    let mut set = TermSet {
        category,
        terms: Vec::new(),
        duplicate_terms: 0,
    };

    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let line = record_line(&record, i + 1);
        let id = record.get(0).unwrap_or("").trim();
        if id.is_empty() {
            return Err(InputError::InvalidTsvRow {
                line,
                reason: "empty term identifier".to_string(),
            });
        }
        if !seen.insert(id.to_string()) {
            set.duplicate_terms += 1;
            continue;
        }
        let name = record.get(1).map(str::trim).filter(|s| !s.is_empty()).unwrap_or(id);
        let genes: BTreeSet<String> = record
            .iter()
            .skip(2)
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect();
        set.terms.push(AnnotationTerm {
            id: id.to_string(),
            name: name.to_string(),
            genes,
        });
    }

    Ok(set)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/terms.rs"]
mod tests;
