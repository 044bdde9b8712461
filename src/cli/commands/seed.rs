//! `spokes seed` command - Load the bundled sample articles

use console::style;
use miette::Result;

use crate::cli::helpers::open_catalog;
use crate::cli::GlobalOpts;
use crate::core::seed;

#[derive(clap::Args, Debug)]
pub struct SeedArgs {}

pub fn run(_args: SeedArgs, global: &GlobalOpts) -> Result<()> {
    let mut catalog = open_catalog(global)?;
    let stats = seed::seed(&mut catalog.store)?;

    if !global.quiet {
        println!(
            "{} Seeded {} article(s), {} already present",
            style("✓").green(),
            style(stats.created).cyan(),
            style(stats.skipped).dim()
        );
    }
    Ok(())
}
