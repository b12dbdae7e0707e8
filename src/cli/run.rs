use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use tracing::{info, warn};

use crate::input::edges::TsvEdgeProvider;
use crate::input::store::{DatasetStore, DirStore, MemoryStore};
use crate::input::terms::{TermSet, parse_term_source, read_gmt};
use crate::model::config::AnalysisConfig;
use crate::pipeline::stage1_load::{DatasetCtx, DatasetInput, run_stage1};
use crate::pipeline::stage2_deg::{DegContext, run_stage2};
use crate::pipeline::stage3_codeg::run_stage3;
use crate::pipeline::stage4_network::run_stage4;
use crate::pipeline::stage5_enrichment::run_stage5;
use crate::pipeline::stage6_validate::{ValidationContext, run_stage6};
use crate::pipeline::stage7_report::{ReportInputs, run_stage7_report, write_condition_tables};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// First disease expression matrix (TSV, genes x samples)
    #[arg(long)]
    pub(crate) ad_matrix: PathBuf,

    /// First disease sample labels (sample_id, group)
    #[arg(long)]
    pub(crate) ad_labels: PathBuf,

    /// Second disease expression matrix
    #[arg(long)]
    pub(crate) oa_matrix: PathBuf,

    /// Second disease sample labels
    #[arg(long)]
    pub(crate) oa_labels: PathBuf,

    /// Protein interaction edge list (gene_a, gene_b, optional score)
    #[arg(long)]
    pub(crate) edges: PathBuf,

    /// Output directory
    #[arg(long)]
    pub(crate) out: PathBuf,

    /// Annotation terms as CATEGORY=path.gmt (GO_BP, GO_MF, GO_CC, KEGG)
    #[arg(long = "terms")]
    pub(crate) terms: Vec<String>,

    #[arg(long, requires = "ad_val_labels")]
    pub(crate) ad_val_matrix: Option<PathBuf>,

    #[arg(long, requires = "ad_val_matrix")]
    pub(crate) ad_val_labels: Option<PathBuf>,

    #[arg(long, requires = "oa_val_labels")]
    pub(crate) oa_val_matrix: Option<PathBuf>,

    #[arg(long, requires = "oa_val_matrix")]
    pub(crate) oa_val_labels: Option<PathBuf>,

    /// Analysis configuration TOML
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// Adjusted p-value cut-off (overrides config)
    #[arg(long)]
    pub(crate) adj_p: Option<f64>,

    /// Absolute log2 fold-change cut-off (overrides config)
    #[arg(long)]
    pub(crate) log2fc: Option<f64>,

    /// Number of core genes (overrides config)
    #[arg(long)]
    pub(crate) top_k: Option<usize>,

    #[arg(long, default_value = "AD")]
    pub(crate) ad_name: String,

    #[arg(long, default_value = "OA")]
    pub(crate) oa_name: String,

    /// Keep parsed matrices in this directory between runs
    #[arg(long)]
    pub(crate) store_dir: Option<PathBuf>,
}

impl RunArgs {
    pub(crate) fn effective_config(&self) -> anyhow::Result<AnalysisConfig> {
        let mut cfg = match &self.config {
            Some(path) => AnalysisConfig::load(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(v) = self.adj_p {
            cfg.adj_p_threshold = v;
        }
        if let Some(v) = self.log2fc {
            cfg.log2fc_threshold = v;
        }
        if let Some(v) = self.top_k {
            cfg.top_k = v;
        }
        cfg.check()?;
        Ok(cfg)
    }
}

pub fn handle(args: RunArgs) -> anyhow::Result<()> {
    let config = args.effective_config()?;
    std::fs::create_dir_all(&args.out)?;
    let term_sets = load_term_sets(&args.terms)?;

    let mut store: Box<dyn DatasetStore> = match &args.store_dir {
        Some(dir) => Box::new(DirStore::open(dir)?),
        None => Box::new(MemoryStore::new()),
    };

    let start = Instant::now();
    info!(stage = "stage1_load", "starting stage");
    let first = run_stage1(
        &DatasetInput::new(&args.ad_name, &args.ad_matrix, &args.ad_labels),
        store.as_mut(),
    );
    let second = run_stage1(
        &DatasetInput::new(&args.oa_name, &args.oa_matrix, &args.oa_labels),
        store.as_mut(),
    );
    info!(
        stage = "stage1_load",
        elapsed_ms = start.elapsed().as_millis(),
        "finished stage"
    );

    let start = Instant::now();
    info!(stage = "stage2_deg", "starting stage");
    let first = first
        .map_err(anyhow::Error::from)
        .and_then(|ctx| condition_degs(ctx, &config));
    let second = second
        .map_err(anyhow::Error::from)
        .and_then(|ctx| condition_degs(ctx, &config));
    info!(
        stage = "stage2_deg",
        elapsed_ms = start.elapsed().as_millis(),
        "finished stage"
    );
    let ((first, first_deg), (second, second_deg)) = settle_conditions(first, second, &args.out)?;

    let first_val = load_validation(
        &args.ad_name,
        args.ad_val_matrix.as_ref().zip(args.ad_val_labels.as_ref()),
        store.as_mut(),
    )?;
    let second_val = load_validation(
        &args.oa_name,
        args.oa_val_matrix.as_ref().zip(args.oa_val_labels.as_ref()),
        store.as_mut(),
    )?;

    let start = Instant::now();
    info!(stage = "stage3_codeg", "starting stage");
    let co_degs = run_stage3(&first_deg, &second_deg);
    if co_degs.concordant.is_empty() {
        warn!("no concordant co-DEGs, downstream stages run on an empty set");
    }
    info!(
        stage = "stage3_codeg",
        elapsed_ms = start.elapsed().as_millis(),
        up = co_degs.n_up(),
        down = co_degs.n_down(),
        discordant = co_degs.discordant.len(),
        "finished stage"
    );

    let start = Instant::now();
    info!(stage = "stage4_network", "starting stage");
    let provider = TsvEdgeProvider::new(&args.edges);
    let network = run_stage4(&co_degs.concordant_genes(), &provider, &config)?;
    info!(
        stage = "stage4_network",
        elapsed_ms = start.elapsed().as_millis(),
        vertices = network.graph.n_vertices(),
        edges = network.graph.n_edges(),
        core_genes = network.core_genes.len(),
        "finished stage"
    );

    let start = Instant::now();
    info!(stage = "stage5_enrichment", "starting stage");
    let background: HashSet<&str> = first
        .matrix
        .genes()
        .iter()
        .chain(second.matrix.genes().iter())
        .map(|g| g.as_str())
        .collect();
    let enrichment = run_stage5(
        &co_degs.concordant_genes(),
        &background,
        &term_sets,
        &config,
    );
    let enriched: usize = enrichment
        .tables
        .values()
        .map(|t| {
            t.results
                .iter()
                .filter(|r| r.adj_p_value < config.report_alpha)
                .count()
        })
        .sum();
    if !term_sets.is_empty() && enriched == 0 {
        info!("no term passes the report cut-off");
    }
    info!(
        stage = "stage5_enrichment",
        elapsed_ms = start.elapsed().as_millis(),
        categories = enrichment.tables.len(),
        enriched,
        "finished stage"
    );

    let start = Instant::now();
    info!(stage = "stage6_validate", "starting stage");
    let core_ids = network.core_gene_ids();
    let validation: Vec<ValidationContext> = [(&first, &first_val), (&second, &second_val)]
        .into_iter()
        .map(|(training, val)| match val {
            Some(ctx) => run_stage6(&ctx.name, &ctx.matrix, &core_ids),
            None => {
                info!(
                    condition = %training.name,
                    "no validation cohort, reusing training matrix"
                );
                let cohort = format!("{}_training", training.name);
                run_stage6(&cohort, &training.matrix, &core_ids)
            }
        })
        .collect();
    info!(
        stage = "stage6_validate",
        elapsed_ms = start.elapsed().as_millis(),
        validated = validation.iter().map(|v| v.n_ok()).sum::<usize>(),
        "finished stage"
    );

    let start = Instant::now();
    info!(stage = "stage7_report", "starting stage");
    let mut datasets: Vec<&DatasetCtx> = vec![&first, &second];
    datasets.extend(first_val.iter());
    datasets.extend(second_val.iter());
    let inputs = ReportInputs {
        datasets: &datasets,
        conditions: [&first_deg, &second_deg],
        co_degs: &co_degs,
        network: &network,
        enrichment: &enrichment,
        validation: &validation,
        config: &config,
    };
    let _summary = run_stage7_report(&inputs, &args.out)?;
    info!(
        stage = "stage7_report",
        elapsed_ms = start.elapsed().as_millis(),
        "finished stage"
    );
    Ok(())
}

fn condition_degs(
    ctx: DatasetCtx,
    config: &AnalysisConfig,
) -> anyhow::Result<(DatasetCtx, DegContext)> {
    let deg = run_stage2(&ctx.name, &ctx.matrix, config)?;
    if deg.zero_variance > 0 {
        warn!(
            condition = %deg.condition,
            genes = deg.zero_variance,
            "constant genes in both groups"
        );
    }
    info!(
        condition = %deg.condition,
        genes = ctx.n_genes,
        tested = deg.gene_stats.len(),
        up = deg.n_up(),
        down = deg.n_down(),
        "differential expression"
    );
    Ok((ctx, deg))
}

/// Both conditions are needed downstream. When one failed, the other's DEG
/// tables are still written before the error is returned.
pub(crate) fn settle_conditions(
    first: anyhow::Result<(DatasetCtx, DegContext)>,
    second: anyhow::Result<(DatasetCtx, DegContext)>,
    out: &Path,
) -> anyhow::Result<((DatasetCtx, DegContext), (DatasetCtx, DegContext))> {
    match (first, second) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Ok((_, deg)), Err(err)) | (Err(err), Ok((_, deg))) => {
            write_condition_tables(out, &deg)?;
            warn!(
                condition = %deg.condition,
                "other condition failed, only this condition's tables were written"
            );
            Err(err)
        }
        (Err(err), Err(other)) => {
            warn!(error = %other, "both conditions failed");
            Err(err)
        }
    }
}

fn load_validation(
    condition: &str,
    paths: Option<(&PathBuf, &PathBuf)>,
    store: &mut dyn DatasetStore,
) -> anyhow::Result<Option<DatasetCtx>> {
    let Some((matrix, labels)) = paths else {
        return Ok(None);
    };
    let name = format!("{condition}_validation");
    Ok(Some(run_stage1(&DatasetInput::new(&name, matrix, labels), store)?))
}

pub(crate) fn load_term_sets(sources: &[String]) -> anyhow::Result<Vec<TermSet>> {
    let mut sets: Vec<TermSet> = Vec::new();
    for source in sources {
        let (category, path) = parse_term_source(source)?;
        if sets.iter().any(|s| s.category == category) {
            anyhow::bail!("annotation category {} given more than once", category);
        }
        let set = read_gmt(&path, category)?;
        if set.duplicate_terms > 0 {
            warn!(
                category = category.as_str(),
                duplicates = set.duplicate_terms,
                "duplicate term ids ignored"
            );
        }
        sets.push(set);
    }
    Ok(sets)
}
