//! `spokes serve` command - Run the JSON HTTP API

use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::open_catalog;
use crate::cli::GlobalOpts;
use crate::server;

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Listen address (default from config, 127.0.0.1:5080)
    #[arg(long, short = 'b', env = "SPOKES_BIND")]
    pub bind: Option<String>,
}

pub fn run(args: ServeArgs, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let bind = args.bind.unwrap_or_else(|| catalog.config.bind());

    if !global.quiet {
        eprintln!("Serving {} on http://{}", catalog.project.root().display(), bind);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .into_diagnostic()?;

    runtime
        .block_on(server::serve(catalog.store, &catalog.config, &bind))
        .into_diagnostic()
}
