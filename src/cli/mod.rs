use clap::{Parser, Subcommand};

mod config;
mod run;
mod validate;

#[derive(Parser, Debug)]
#[command(
    name = "kira-codeg",
    version,
    about = "Shared core genes of two diseases from co-DEGs and PPI degree centrality"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(run::RunArgs),
    Validate(validate::ValidateArgs),
    Config(config::ConfigArgs),
}

impl Cli {
    pub fn dispatch(self) -> anyhow::Result<()> {
        match self.command {
            Command::Run(args) => run::handle(args),
            Command::Validate(args) => validate::handle(args),
            Command::Config(args) => config::handle(args),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/src_inline/cli/mod.rs"]
mod tests;
