//! RCM CLI - Command line tool for browsing radar crop monitoring data.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "rcm-cli",
    version,
    about = "Display SAR parameters and NDVI values for crop monitoring"
)]
struct Cli {
    #[command(subcommand)]
    command: rcm_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    rcm_cmd::run(cli.command)
}
