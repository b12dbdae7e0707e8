use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use tracing::info;

use crate::input::store::MemoryStore;
use crate::pipeline::stage1_load::{DatasetCtx, DatasetInput, run_stage1};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Expression matrix TSV (genes x samples)
    #[arg(long)]
    pub(crate) matrix: PathBuf,

    /// Sample labels TSV (sample_id, group)
    #[arg(long)]
    pub(crate) labels: PathBuf,

    /// Dataset name used in messages
    #[arg(long, default_value = "dataset")]
    pub(crate) name: String,
}

pub fn handle(args: ValidateArgs) -> anyhow::Result<()> {
    let start = Instant::now();
    info!(stage = "stage1_load", "starting stage");
    let input = DatasetInput::new(&args.name, &args.matrix, &args.labels);
    let mut store = MemoryStore::new();
    let ctx = run_stage1(&input, &mut store)?;
    info!(
        stage = "stage1_load",
        elapsed_ms = start.elapsed().as_millis(),
        "finished stage"
    );

    for (k, v) in summary_lines(&ctx) {
        println!("{k}\t{v}");
    }
    Ok(())
}

fn summary_lines(ctx: &DatasetCtx) -> Vec<(&'static str, String)> {
    let mut lines = Vec::new();
    lines.push(("dataset", ctx.name.clone()));
    lines.push(("key", ctx.key.clone()));
    lines.push(("n_genes", ctx.n_genes.to_string()));
    lines.push(("n_samples", ctx.n_samples.to_string()));
    lines.push(("n_disease", ctx.n_disease.to_string()));
    lines.push(("n_control", ctx.n_control.to_string()));
    if let Some(n) = ctx.labels_unmatched {
        lines.push(("labels_unmatched", n.to_string()));
    }
    if let Some(n) = ctx.labels_duplicate_rows {
        lines.push(("labels_duplicate_rows", n.to_string()));
    }
    lines.push((
        "testable",
        (ctx.n_disease >= 2 && ctx.n_control >= 2).to_string(),
    ));
    lines
}
