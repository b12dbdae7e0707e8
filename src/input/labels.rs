use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::input::{InputError, record_line, tsv_reader};
use crate::model::expression::Group;

#[derive(Debug, Default, Clone)]
pub struct SampleLabels {
    by_sample: HashMap<String, Group>,
    pub duplicate_rows: usize,
}

impl SampleLabels {
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Group)>,
        S: Into<String>,
    {
        let mut labels = SampleLabels::default();
        for (sample, group) in pairs {
            labels.insert(sample.into(), group);
        }
        labels
    }

    fn insert(&mut self, sample: String, group: Group) {
        if self.by_sample.contains_key(&sample) {
            self.duplicate_rows += 1;
            return;
        }
        self.by_sample.insert(sample, group);
    }

    pub fn group_of(&self, sample: &str) -> Option<Group> {
        self.by_sample.get(sample).copied()
    }

    pub fn len(&self) -> usize {
        self.by_sample.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sample.is_empty()
    }

    /// Labelled samples that do not appear in `samples`.
    pub fn unmatched(&self, samples: &[String]) -> usize {
        let present: HashSet<&str> = samples.iter().map(|s| s.as_str()).collect();
        self.by_sample
            .keys()
            .filter(|k| !present.contains(k.as_str()))
            .count()
    }
}

/// Reads a TSV with `sample_id` and `group` columns. The first row for a
/// sample wins; later rows are counted as duplicates.
pub fn read_labels(path: &Path) -> Result<SampleLabels, InputError> {
    let mut reader = tsv_reader(path, true)?;
    let headers = reader.headers()?.clone();
    let sample_idx = headers
        .iter()
        .position(|c| c.trim() == "sample_id")
        .ok_or_else(|| InputError::MissingLabelColumn("sample_id".to_string()))?;
    let group_idx = headers
        .iter()
        .position(|c| c.trim() == "group")
        .ok_or_else(|| InputError::MissingLabelColumn("group".to_string()))?;

    let mut labels = SampleLabels::default();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let line = record_line(&record, i + 2);
        let sample = record.get(sample_idx).unwrap_or("").trim();
        if sample.is_empty() {
            return Err(InputError::InvalidTsvRow {
                line,
                reason: "missing sample_id".to_string(),
            });
        }
        let raw_group = record.get(group_idx).unwrap_or("");
        let group = Group::parse(raw_group).ok_or_else(|| InputError::UnknownGroup {
            line,
            value: raw_group.to_string(),
        })?;
        labels.insert(sample.to_string(), group);
    }

    Ok(labels)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/labels.rs"]
mod tests;
