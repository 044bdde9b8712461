//! `spokes import` command - Import articles from CSV

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::open_catalog;
use crate::cli::GlobalOpts;
use crate::core::import::{csv_template, import_csv, ImportOptions, ImportReport};

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV file to import ("-" for stdin)
    #[arg(required_unless_present = "template")]
    pub file: Option<PathBuf>,

    /// Print a CSV template and exit
    #[arg(long)]
    pub template: bool,

    /// Validate the CSV without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Import the valid rows even when other rows fail (default: write nothing on errors)
    #[arg(long)]
    pub skip_errors: bool,

    /// Update existing articles whose article number matches
    #[arg(long)]
    pub update: bool,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    if args.template {
        print!("{}", csv_template());
        // Hint on stderr so it doesn't interfere with redirected output
        eprintln!();
        eprintln!(
            "Fill in the rows, then run {}",
            style("spokes import <file.csv>").yellow()
        );
        return Ok(());
    }

    let file = args
        .file
        .clone()
        .ok_or_else(|| miette::miette!("CSV file required. Usage: spokes import data.csv"))?;

    let mut catalog = open_catalog(global)?;
    let options = ImportOptions {
        dry_run: args.dry_run,
        skip_errors: args.skip_errors,
        update: args.update,
    };

    if !global.quiet {
        println!(
            "{} Importing articles from {}{}",
            style("→").blue(),
            style(file.display()).yellow(),
            if args.dry_run {
                style(" (dry run)").dim().to_string()
            } else {
                String::new()
            }
        );
    }

    let report = if file.as_os_str() == "-" {
        import_csv(&mut catalog.store, std::io::stdin().lock(), options)?
    } else {
        if !file.exists() {
            return Err(miette::miette!("File not found: {}", file.display()));
        }
        let reader = std::fs::File::open(&file).into_diagnostic()?;
        import_csv(&mut catalog.store, reader, options)?
    };

    print_report(&report, args.dry_run, global.quiet);

    if report.aborted {
        return Err(miette::miette!(
            help = "fix the rows above or pass --skip-errors to import the valid rows",
            "import stopped: {} invalid row(s), nothing was written",
            report.errors.len()
        ));
    }
    Ok(())
}

fn print_report(report: &ImportReport, dry_run: bool, quiet: bool) {
    for row in &report.errors {
        for message in &row.messages {
            eprintln!(
                "{} line {}: {}",
                style("✗").red(),
                style(row.line).cyan(),
                message
            );
        }
    }

    if quiet || report.aborted {
        return;
    }

    let verb = if dry_run { "Would import" } else { "Imported" };
    println!();
    println!(
        "{} {} {} article(s): {} created, {} updated, {} skipped, {} error(s)",
        style("✓").green(),
        verb,
        report.rows_processed,
        style(report.created).green(),
        style(report.updated).yellow(),
        style(report.skipped).dim(),
        style(report.errors.len()).red()
    );
}
