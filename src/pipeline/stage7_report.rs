use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::input::terms::AnnotationCategory;
use crate::model::config::AnalysisConfig;
use crate::pipeline::stage1_load::DatasetCtx;
use crate::pipeline::stage2_deg::DegContext;
use crate::pipeline::stage3_codeg::CoDegContext;
use crate::pipeline::stage4_network::NetworkContext;
use crate::pipeline::stage5_enrichment::{EnrichmentContext, EnrichmentTable};
use crate::pipeline::stage6_validate::ValidationContext;
use crate::report::json::write_summary;
use crate::report::text::render_report;

#[derive(Debug, Error)]
pub enum Stage7Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct FinalSummary {
    pub tool: ToolSummary,
    pub datasets: Vec<DatasetSummary>,
    pub conditions: Vec<ConditionSummary>,
    pub co_degs: CoDegSummary,
    pub network: NetworkSummary,
    pub enrichment: Vec<EnrichmentSummary>,
    pub validation: Vec<ValidationSummary>,
    pub config: AnalysisConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolSummary {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub name: String,
    pub key: String,
    pub from_store: bool,
    pub n_genes: usize,
    pub n_samples: usize,
    pub n_disease: usize,
    pub n_control: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConditionSummary {
    pub name: String,
    pub genes_tested: usize,
    pub genes_failed: usize,
    pub zero_variance: usize,
    pub undefined_fold_change: usize,
    pub degs_up: usize,
    pub degs_down: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoDegSummary {
    pub concordant_up: usize,
    pub concordant_down: usize,
    pub discordant: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetworkSummary {
    pub vertices: usize,
    pub edges: usize,
    pub core_genes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentSummary {
    pub category: AnnotationCategory,
    pub category_name: String,
    pub tested_terms: usize,
    pub terms_with_overlap: usize,
    pub significant_terms: usize,
    pub top_terms: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    pub cohort: String,
    pub gene: String,
    pub status: String,
    pub auc: Option<f64>,
}

/// Everything the report stage reads; borrowed from the earlier stages.
pub struct ReportInputs<'a> {
    pub datasets: &'a [&'a DatasetCtx],
    pub conditions: [&'a DegContext; 2],
    pub co_degs: &'a CoDegContext,
    pub network: &'a NetworkContext,
    pub enrichment: &'a EnrichmentContext,
    pub validation: &'a [ValidationContext],
    pub config: &'a AnalysisConfig,
}

const TOP_TERMS: usize = 5;

pub fn run_stage7_report(
    inputs: &ReportInputs<'_>,
    out_dir: &Path,
) -> Result<FinalSummary, Stage7Error> {
    std::fs::create_dir_all(out_dir)?;

    for deg in inputs.conditions {
        write_condition_tables(out_dir, deg)?;
    }
    write_co_degs(
        &out_dir.join("co_degs.tsv"),
        inputs.co_degs,
        &inputs.conditions[0].condition,
        &inputs.conditions[1].condition,
    )?;
    write_core_genes(&out_dir.join("core_genes.tsv"), inputs.network)?;
    write_network_edges(&out_dir.join("network_edges.tsv"), inputs.network)?;
    for table in inputs.enrichment.tables.values() {
        let path = out_dir.join(format!("enrichment_{}.tsv", table.category.as_str()));
        write_enrichment(&path, table)?;
    }
    write_validation(&out_dir.join("validation.tsv"), inputs.validation)?;

    let summary = build_summary(inputs);
    write_summary(out_dir, &summary)?;
    std::fs::write(out_dir.join("report.txt"), render_report(&summary))?;
    Ok(summary)
}

/// `degs_`, `gene_stats_` and `stat_failures_` tables of one condition.
pub fn write_condition_tables(out_dir: &Path, deg: &DegContext) -> Result<(), Stage7Error> {
    std::fs::create_dir_all(out_dir)?;
    let slug = file_slug(&deg.condition);
    write_degs(&out_dir.join(format!("degs_{slug}.tsv")), deg)?;
    write_gene_stats(&out_dir.join(format!("gene_stats_{slug}.tsv")), deg)?;
    write_stat_failures(&out_dir.join(format!("stat_failures_{slug}.tsv")), deg)?;
    Ok(())
}

pub fn build_summary(inputs: &ReportInputs<'_>) -> FinalSummary {
    let alpha = inputs.config.report_alpha;
    FinalSummary {
        tool: ToolSummary {
            name: "kira-codeg".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        datasets: inputs
            .datasets
            .iter()
            .map(|d| DatasetSummary {
                name: d.name.clone(),
                key: d.key.clone(),
                from_store: d.from_store,
                n_genes: d.n_genes,
                n_samples: d.n_samples,
                n_disease: d.n_disease,
                n_control: d.n_control,
            })
            .collect(),
        conditions: inputs
            .conditions
            .iter()
            .map(|d| ConditionSummary {
                name: d.condition.clone(),
                genes_tested: d.gene_stats.len(),
                genes_failed: d.failures.len(),
                zero_variance: d.zero_variance,
                undefined_fold_change: d.undefined_fold_change,
                degs_up: d.n_up(),
                degs_down: d.n_down(),
            })
            .collect(),
        co_degs: CoDegSummary {
            concordant_up: inputs.co_degs.n_up(),
            concordant_down: inputs.co_degs.n_down(),
            discordant: inputs.co_degs.discordant.len(),
        },
        network: NetworkSummary {
            vertices: inputs.network.graph.n_vertices(),
            edges: inputs.network.graph.n_edges(),
            core_genes: inputs.network.core_gene_ids(),
        },
        enrichment: inputs
            .enrichment
            .tables
            .values()
            .map(|t| EnrichmentSummary {
                category: t.category,
                category_name: t.category.display_name().to_string(),
                tested_terms: t.tested_terms,
                terms_with_overlap: t.results.len(),
                significant_terms: t.results.iter().filter(|r| r.adj_p_value < alpha).count(),
                top_terms: t
                    .results
                    .iter()
                    .take(TOP_TERMS)
                    .map(|r| r.term_name.clone())
                    .collect(),
            })
            .collect(),
        validation: inputs
            .validation
            .iter()
            .flat_map(|v| v.rows.iter())
            .map(|row| ValidationSummary {
                cohort: row.cohort.clone(),
                gene: row.gene.clone(),
                status: match &row.outcome {
                    Ok(_) => "ok".to_string(),
                    Err(e) => e.status().to_string(),
                },
                auc: row.outcome.as_ref().ok().map(|r| r.auc),
            })
            .collect(),
        config: inputs.config.clone(),
    }
}

fn tsv_writer(path: &Path) -> Result<csv::Writer<BufWriter<File>>, Stage7Error> {
    let file = BufWriter::new(File::create(path)?);
    Ok(csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(file))
}

fn write_row(w: &mut csv::Writer<BufWriter<File>>, fields: &[&str]) -> Result<(), Stage7Error> {
    w.write_record(fields)?;
    Ok(())
}

fn write_degs(path: &Path, deg: &DegContext) -> Result<(), Stage7Error> {
    let mut w = tsv_writer(path)?;
    w.write_record(["gene", "log2fc", "p_value", "adj_p_value", "direction"])?;
    for d in &deg.degs {
        write_row(
            &mut w,
            &[
                d.gene.as_str(),
                &fmt6(d.log2fc),
                &fmt_p(d.p_value),
                &fmt_p(d.adj_p_value),
                d.direction.as_str(),
            ],
        )?;
    }
    w.flush()?;
    Ok(())
}

fn write_gene_stats(path: &Path, deg: &DegContext) -> Result<(), Stage7Error> {
    let mut w = tsv_writer(path)?;
    w.write_record([
        "gene",
        "mean_disease",
        "mean_control",
        "sd_disease",
        "sd_control",
        "t_statistic",
        "df",
        "log2fc",
        "p_value",
        "adj_p_value",
        "regulation",
    ])?;
    for s in &deg.gene_stats {
        write_row(
            &mut w,
            &[
                s.gene.as_str(),
                &fmt6(s.mean_disease),
                &fmt6(s.mean_control),
                &fmt6(s.sd_disease),
                &fmt6(s.sd_control),
                &fmt6(s.t_statistic),
                &fmt6(s.df),
                &fmt6(s.log2fc),
                &fmt_p(s.p_value),
                &fmt_p(s.adj_p_value),
                s.regulation.as_str(),
            ],
        )?;
    }
    w.flush()?;
    Ok(())
}

fn write_stat_failures(path: &Path, deg: &DegContext) -> Result<(), Stage7Error> {
    let mut w = tsv_writer(path)?;
    w.write_record(["gene", "error"])?;
    for f in &deg.failures {
        write_row(&mut w, &[f.gene.as_str(), &f.error.to_string()])?;
    }
    w.flush()?;
    Ok(())
}

fn write_co_degs(
    path: &Path,
    co: &CoDegContext,
    first: &str,
    second: &str,
) -> Result<(), Stage7Error> {
    let first = file_slug(first);
    let second = file_slug(second);
    let mut w = tsv_writer(path)?;
    w.write_record([
        "gene".to_string(),
        "concordant".to_string(),
        format!("direction_{first}"),
        format!("log2fc_{first}"),
        format!("adj_p_{first}"),
        format!("direction_{second}"),
        format!("log2fc_{second}"),
        format!("adj_p_{second}"),
    ])?;
    let mut rows: Vec<_> = co.concordant.iter().chain(co.discordant.iter()).collect();
    rows.sort_by(|a, b| a.gene.cmp(&b.gene));
    for c in rows {
        write_row(
            &mut w,
            &[
                c.gene.as_str(),
                if c.is_concordant() { "true" } else { "false" },
                c.first.direction.as_str(),
                &fmt6(c.first.log2fc),
                &fmt_p(c.first.adj_p_value),
                c.second.direction.as_str(),
                &fmt6(c.second.log2fc),
                &fmt_p(c.second.adj_p_value),
            ],
        )?;
    }
    w.flush()?;
    Ok(())
}

fn write_core_genes(path: &Path, network: &NetworkContext) -> Result<(), Stage7Error> {
    let mut w = tsv_writer(path)?;
    w.write_record(["rank", "gene", "degree", "centrality"])?;
    for c in &network.core_genes {
        w.write_record([
            c.rank.to_string(),
            c.gene.clone(),
            c.degree.to_string(),
            fmt6(c.centrality),
        ])?;
    }
    w.flush()?;
    Ok(())
}

fn write_network_edges(path: &Path, network: &NetworkContext) -> Result<(), Stage7Error> {
    let mut w = tsv_writer(path)?;
    w.write_record(["gene_a", "gene_b"])?;
    for (a, b) in network.graph.edges() {
        w.write_record([a, b])?;
    }
    w.flush()?;
    Ok(())
}

fn write_enrichment(path: &Path, table: &EnrichmentTable) -> Result<(), Stage7Error> {
    let mut w = tsv_writer(path)?;
    w.write_record([
        "term_id",
        "term_name",
        "category",
        "overlap",
        "term_size",
        "query_size",
        "background_size",
        "expected",
        "fold_enrichment",
        "p_value",
        "adj_p_value",
        "genes",
    ])?;
    for r in &table.results {
        w.write_record([
            r.term_id.clone(),
            r.term_name.clone(),
            table.category.display_name().to_string(),
            r.overlap.to_string(),
            r.term_size.to_string(),
            r.query_size.to_string(),
            r.background_size.to_string(),
            fmt6(r.expected),
            fmt6(fold_enrichment(r.overlap, r.expected)),
            fmt_p(r.p_value),
            fmt_p(r.adj_p_value),
            r.genes.join(","),
        ])?;
    }
    w.flush()?;
    Ok(())
}

fn write_validation(path: &Path, validation: &[ValidationContext]) -> Result<(), Stage7Error> {
    let mut w = tsv_writer(path)?;
    w.write_record([
        "cohort",
        "gene",
        "status",
        "auc",
        "threshold",
        "sensitivity",
        "specificity",
        "p_value",
    ])?;
    for row in validation.iter().flat_map(|v| v.rows.iter()) {
        let record = match &row.outcome {
            Ok(r) => [
                row.cohort.clone(),
                row.gene.clone(),
                "ok".to_string(),
                fmt6(r.auc),
                fmt6(r.threshold),
                fmt6(r.sensitivity),
                fmt6(r.specificity),
                fmt_p(r.p_value),
            ],
            Err(e) => [
                row.cohort.clone(),
                row.gene.clone(),
                e.status().to_string(),
                "NA".to_string(),
                "NA".to_string(),
                "NA".to_string(),
                "NA".to_string(),
                "NA".to_string(),
            ],
        };
        w.write_record(&record)?;
    }
    w.flush()?;
    Ok(())
}

fn fold_enrichment(overlap: usize, expected: f64) -> f64 {
    if expected > 0.0 {
        overlap as f64 / expected
    } else {
        f64::NAN
    }
}

pub(crate) fn file_slug(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

fn fmt6(v: f64) -> String {
    if v.is_nan() {
        "NA".to_string()
    } else {
        format!("{:.6}", v)
    }
}

fn fmt_p(v: f64) -> String {
    if v.is_nan() {
        "NA".to_string()
    } else {
        format!("{:.6e}", v)
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage7_report.rs"]
mod tests;
