//! Benjamini-Hochberg false discovery rate adjustment.

/// Adjusted p-values in input order.
///
/// `p_(i) * m / i` over the ascending order, then a running minimum from the
/// largest rank down, clipped to [0, 1]. Ties keep their input order.
pub fn benjamini_hochberg(p_values: &[f64]) -> Vec<f64> {
    let m = p_values.len();
    if m == 0 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| p_values[a].total_cmp(&p_values[b]));

    let m_f = m as f64;
    let mut adjusted = vec![0.0; m];
    let mut running_min = f64::INFINITY;
    for (pos, &idx) in order.iter().enumerate().rev() {
        let rank = (pos + 1) as f64;
        let adj = p_values[idx] * m_f / rank;
        running_min = running_min.min(adj);
        adjusted[idx] = running_min.clamp(0.0, 1.0);
    }
    adjusted
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/fdr.rs"]
mod tests;
