mod band;
mod cli;
mod config;
mod data;
mod layout;
mod output;
mod painter;
mod process;
mod render;

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

use anyhow::Context;

fn main() -> anyhow::Result<()> {
    let cfg = cli::handle_cli().with_context(|| "Error processing command line arguments")?;
    process::plot_coverage(&cfg)
}
