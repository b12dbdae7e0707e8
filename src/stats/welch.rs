use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

use crate::model::expression::Group;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatError {
    #[error("{group} group has {found} observations, at least 2 required")]
    TooFewObservations { group: Group, found: usize },
    #[error("{group} mean {mean} is not positive after pseudo-count, log2 undefined")]
    NonPositiveMean { group: Group, mean: f64 },
    #[error("distribution error: {0}")]
    Distribution(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneTest {
    pub mean_disease: f64,
    pub mean_control: f64,
    pub sd_disease: f64,
    pub sd_control: f64,
    pub t_statistic: f64,
    pub df: f64,
    pub p_value: f64,
    pub log2fc: f64,
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n - 1 denominator); exactly 0 for a constant slice.
pub fn variance(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    if values.iter().all(|v| *v == values[0]) {
        return 0.0;
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    ss / (values.len() - 1) as f64
}

/// `log2(mean(disease) + eps) - log2(mean(control) + eps)`.
pub fn log2_fold_change(
    mean_disease: f64,
    mean_control: f64,
    epsilon: f64,
) -> Result<f64, StatError> {
    let d = mean_disease + epsilon;
    let c = mean_control + epsilon;
    if !(d > 0.0) {
        return Err(StatError::NonPositiveMean {
            group: Group::Disease,
            mean: mean_disease,
        });
    }
    if !(c > 0.0) {
        return Err(StatError::NonPositiveMean {
            group: Group::Control,
            mean: mean_control,
        });
    }
    Ok(d.log2() - c.log2())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WelchT {
    pub t_statistic: f64,
    pub df: f64,
    pub p_value: f64,
}

/// Two-sided Welch t-test of disease vs control.
///
/// Zero pooled standard error: p = 1 when the group means coincide (constant
/// gene), p = 0 otherwise (perfect separation with no spread).
pub fn welch_t(disease: &[f64], control: &[f64]) -> Result<WelchT, StatError> {
    if disease.len() < 2 {
        return Err(StatError::TooFewObservations {
            group: Group::Disease,
            found: disease.len(),
        });
    }
    if control.len() < 2 {
        return Err(StatError::TooFewObservations {
            group: Group::Control,
            found: control.len(),
        });
    }

    let nd = disease.len() as f64;
    let nc = control.len() as f64;
    let mean_d = mean(disease);
    let mean_c = mean(control);
    let vn_d = variance(disease, mean_d) / nd;
    let vn_c = variance(control, mean_c) / nc;
    let se2 = vn_d + vn_c;

    if se2 == 0.0 {
        // both groups constant; compare the values, not rounded means
        let diff = disease[0] - control[0];
        let df = nd + nc - 2.0;
        return Ok(if diff == 0.0 {
            WelchT {
                t_statistic: 0.0,
                df,
                p_value: 1.0,
            }
        } else {
            WelchT {
                t_statistic: diff.signum() * f64::INFINITY,
                df,
                p_value: 0.0,
            }
        });
    }

    let t = (mean_d - mean_c) / se2.sqrt();
    let df = se2.powi(2) / (vn_d.powi(2) / (nd - 1.0) + vn_c.powi(2) / (nc - 1.0));
    Ok(WelchT {
        t_statistic: t,
        df,
        p_value: t_two_tailed_p(t, df)?,
    })
}

/// Welch test plus group summaries and log2 fold-change for one gene.
///
/// `log2fc` is NaN when a group mean plus `epsilon` is not positive; the
/// p-value is still reported so the gene stays in the correction family.
pub fn welch_test(
    disease: &[f64],
    control: &[f64],
    epsilon: f64,
) -> Result<GeneTest, StatError> {
    let welch = welch_t(disease, control)?;
    let mean_d = mean(disease);
    let mean_c = mean(control);
    let log2fc = log2_fold_change(mean_d, mean_c, epsilon).unwrap_or(f64::NAN);

    Ok(GeneTest {
        mean_disease: mean_d,
        mean_control: mean_c,
        sd_disease: variance(disease, mean_d).sqrt(),
        sd_control: variance(control, mean_c).sqrt(),
        t_statistic: welch.t_statistic,
        df: welch.df,
        p_value: welch.p_value,
        log2fc,
    })
}

fn t_two_tailed_p(t: f64, df: f64) -> Result<f64, StatError> {
    let dist =
        StudentsT::new(0.0, 1.0, df).map_err(|e| StatError::Distribution(e.to_string()))?;
    let p = 2.0 * dist.sf(t.abs());
    Ok(p.clamp(0.0, 1.0))
}

#[cfg(test)]
#[path = "../../tests/src_inline/stats/welch.rs"]
mod tests;
