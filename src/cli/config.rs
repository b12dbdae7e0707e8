use std::path::PathBuf;

use clap::Args;

use crate::model::config::AnalysisConfig;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Show this file merged over the defaults instead of the bare defaults
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
}

pub fn handle(args: ConfigArgs) -> anyhow::Result<()> {
    let cfg = match &args.config {
        Some(path) => AnalysisConfig::load(path)?,
        None => AnalysisConfig::default(),
    };
    print!("{}", cfg.to_toml_string()?);
    Ok(())
}
