use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn from_log2fc(log2fc: f64) -> Self {
        if log2fc > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regulation {
    Up,
    Down,
    NotSignificant,
}

impl Regulation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Regulation::Up => "up",
            Regulation::Down => "down",
            Regulation::NotSignificant => "not_significant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegRecord {
    pub gene: String,
    pub p_value: f64,
    pub adj_p_value: f64,
    pub log2fc: f64,
    pub direction: Direction,
}

/// Every tested gene, significant or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneStat {
    pub gene: String,
    pub mean_disease: f64,
    pub mean_control: f64,
    pub sd_disease: f64,
    pub sd_control: f64,
    pub t_statistic: f64,
    pub df: f64,
    pub log2fc: f64,
    pub p_value: f64,
    pub adj_p_value: f64,
    pub regulation: Regulation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoDeg {
    pub gene: String,
    pub first: DegRecord,
    pub second: DegRecord,
}

impl CoDeg {
    pub fn is_concordant(&self) -> bool {
        self.first.direction == self.second.direction
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreGeneScore {
    pub gene: String,
    pub degree: usize,
    /// Degree normalised by `n - 1`.
    pub centrality: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub term_id: String,
    pub term_name: String,
    pub overlap: usize,
    pub term_size: usize,
    pub query_size: usize,
    pub background_size: usize,
    pub expected: f64,
    pub p_value: f64,
    pub adj_p_value: f64,
    pub genes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub gene: String,
    pub auc: f64,
    pub threshold: f64,
    pub sensitivity: f64,
    pub specificity: f64,
    pub p_value: f64,
}
