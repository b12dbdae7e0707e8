use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RocError {
    #[error("scores length {scores} != labels length {labels}")]
    LengthMismatch { scores: usize, labels: usize },
    #[error("need both classes, got {positives} positives and {negatives} negatives")]
    InsufficientGroup { positives: usize, negatives: usize },
    #[error("non-finite score at index {0}")]
    NonFinite(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocPoint {
    /// Samples with score >= threshold are called positive.
    pub threshold: f64,
    pub fpr: f64,
    pub tpr: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RocCurve {
    pub points: Vec<RocPoint>,
    pub auc: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingPoint {
    pub threshold: f64,
    pub sensitivity: f64,
    pub specificity: f64,
}

fn check_inputs(scores: &[f64], labels: &[bool]) -> Result<(usize, usize), RocError> {
    if scores.len() != labels.len() {
        return Err(RocError::LengthMismatch {
            scores: scores.len(),
            labels: labels.len(),
        });
    }
    if let Some(idx) = scores.iter().position(|s| !s.is_finite()) {
        return Err(RocError::NonFinite(idx));
    }
    let positives = labels.iter().filter(|l| **l).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(RocError::InsufficientGroup {
            positives,
            negatives,
        });
    }
    Ok((positives, negatives))
}

/// ROC over every distinct score used as a threshold, highest first. Tied
/// scores enter the curve together, so the trapezoidal area equals the
/// Mann-Whitney estimate.
pub fn roc_curve(scores: &[f64], labels: &[bool]) -> Result<RocCurve, RocError> {
    let (positives, negatives) = check_inputs(scores, labels)?;

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

    let p = positives as f64;
    let n = negatives as f64;
    let mut points = Vec::with_capacity(scores.len() + 1);
    points.push(RocPoint {
        threshold: f64::INFINITY,
        fpr: 0.0,
        tpr: 0.0,
    });

    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut i = 0usize;
    while i < order.len() {
        let threshold = scores[order[i]];
        while i < order.len() && scores[order[i]] == threshold {
            if labels[order[i]] {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        points.push(RocPoint {
            threshold,
            fpr: fp as f64 / n,
            tpr: tp as f64 / p,
        });
    }

    let auc = points
        .windows(2)
        .map(|w| (w[1].fpr - w[0].fpr) * (w[1].tpr + w[0].tpr) / 2.0)
        .sum::<f64>()
        .clamp(0.0, 1.0);

    Ok(RocCurve { points, auc })
}

/// Rank-sum AUC: `(R_pos - n_pos (n_pos + 1) / 2) / (n_pos n_neg)` with
/// average ranks for ties.
pub fn mann_whitney_auc(scores: &[f64], labels: &[bool]) -> Result<f64, RocError> {
    let (positives, negatives) = check_inputs(scores, labels)?;

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut rank_sum_pos = 0.0;
    let mut i = 0usize;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && scores[order[j + 1]] == scores[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            if labels[idx] {
                rank_sum_pos += avg_rank;
            }
        }
        i = j + 1;
    }

    let p = positives as f64;
    let u = rank_sum_pos - p * (p + 1.0) / 2.0;
    Ok(u / (p * negatives as f64))
}

/// Youden's J maximiser; on ties the higher threshold wins.
pub fn youden_optimal(curve: &RocCurve) -> Option<OperatingPoint> {
    let mut best: Option<(f64, &RocPoint)> = None;
    for point in curve.points.iter().filter(|p| p.threshold.is_finite()) {
        let j = point.tpr - point.fpr;
        match best {
            Some((best_j, _)) if j <= best_j => {}
            _ => best = Some((j, point)),
        }
    }
    best.map(|(_, p)| OperatingPoint {
        threshold: p.threshold,
        sensitivity: p.tpr,
        specificity: 1.0 - p.fpr,
    })
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/roc.rs"]
mod tests;
