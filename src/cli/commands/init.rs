//! `spokes init` command - Initialize a new article catalog

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::project::{Project, ProjectError};
use crate::core::seed;
use crate::core::store::ArticleStore;
use crate::core::Config;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Rewrite the config even if .spokes/ already exists (keeps the database)
    #[arg(long)]
    pub force: bool,

    /// Load the bundled sample articles
    #[arg(long)]
    pub seed: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    let project = match project {
        Ok(project) => project,
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Catalog already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reinitialize",
                style("spokes init --force").yellow()
            );
            return Ok(());
        }
        Err(e) => return Err(miette::miette!("{}", e)),
    };

    let config = Config::load_for(Some(&project));
    let db_path = project.database_path(&config);
    let mut store = ArticleStore::open(&db_path)?;

    println!(
        "{} Initialized article catalog at {}",
        style("✓").green(),
        style(project.root().display()).cyan()
    );
    println!("  {} {}", style("config").dim(), project.config_path().display());
    println!("  {} {}", style("database").dim(), db_path.display());

    if args.seed {
        let stats = seed::seed(&mut store)?;
        println!(
            "{} Loaded {} sample article(s)",
            style("✓").green(),
            style(stats.created).cyan()
        );
    }

    println!();
    println!("Next steps:");
    if !args.seed {
        println!("  {} Load sample articles", style("spokes seed").yellow());
    }
    println!("  {} Create an article", style("spokes article new -i").yellow());
    println!("  {} List articles", style("spokes article list").yellow());
    println!("  {} Start the JSON API", style("spokes serve").yellow());
    Ok(())
}
