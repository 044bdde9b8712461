//! `spokes article` command - Article management

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{confirm, effective_format, open_catalog};
use crate::cli::table::{render_article, render_page, render_values};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::error::ArticleError;
use crate::core::store::{ArticleQuery, ArticleStore, SortDirection, SortField};
use crate::entities::article::{ArticleInput, ArticlePatch};

#[derive(Subcommand, Debug)]
pub enum ArticleCommands {
    /// List articles with filtering, sorting and paging
    List(ListArgs),

    /// Show an article's details
    Show(ShowArgs),

    /// Create a new article
    New(NewArgs),

    /// Change fields of an existing article
    Edit(EditArgs),

    /// Delete an article
    Delete(DeleteArgs),

    /// List the distinct article categories in use
    Categories,

    /// List the distinct bicycle categories in use
    BicycleCategories,

    /// List the distinct materials in use
    Materials,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by article category (exact)
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Filter by bicycle category; matches articles with any of the given values
    #[arg(long, short = 'b', value_delimiter = ',')]
    pub bicycle_category: Vec<String>,

    /// Filter by material (exact)
    #[arg(long, short = 'm')]
    pub material: Option<String>,

    /// Search article number and name (case-insensitive)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Sort by field (articleNumber, name, articleCategory, material, netWeightG, ...)
    #[arg(long, default_value = "id")]
    pub sort: String,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Page number (1-based)
    #[arg(long, short = 'p')]
    pub page: Option<i64>,

    /// Articles per page (default from config)
    #[arg(long, short = 'n')]
    pub page_size: Option<i64>,

    /// Show only the number of matching articles
    #[arg(long)]
    pub count: bool,
}

impl ListArgs {
    fn to_query(&self) -> ArticleQuery {
        let mut query = ArticleQuery::new()
            .with_article_category(self.category.clone().unwrap_or_default())
            .with_material(self.material.clone().unwrap_or_default())
            .with_search_term(self.search.clone().unwrap_or_default())
            .sorted_by(
                SortField::parse(&self.sort),
                if self.desc {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                },
            );
        for category in &self.bicycle_category {
            query = query.with_bicycle_categories(category);
        }
        query.page = self.page;
        query.page_size = self.page_size;
        query
    }
}

/// Field flags shared by `new` and `edit`
#[derive(clap::Args, Debug, Default)]
pub struct FieldArgs {
    /// Article number/code (unique)
    #[arg(long, short = 'a')]
    pub article_number: Option<String>,

    /// Display name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Article category (Hub, Crank, ...)
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Bicycle categories (repeat or comma-separate)
    #[arg(long, short = 'b', value_delimiter = ',')]
    pub bicycle_category: Vec<String>,

    /// Material
    #[arg(long, short = 'm')]
    pub material: Option<String>,

    /// Length in millimeters
    #[arg(long)]
    pub length: Option<f64>,

    /// Width in millimeters
    #[arg(long)]
    pub width: Option<f64>,

    /// Height in millimeters
    #[arg(long)]
    pub height: Option<f64>,

    /// Net weight in grams
    #[arg(long)]
    pub weight: Option<f64>,
}

impl FieldArgs {
    fn into_patch(self) -> ArticlePatch {
        ArticlePatch {
            article_number: self.article_number,
            name: self.name,
            article_category: self.category,
            bicycle_categories: if self.bicycle_category.is_empty() {
                None
            } else {
                Some(self.bicycle_category)
            },
            material: self.material,
            length_mm: self.length.map(Some),
            width_mm: self.width.map(Some),
            height_mm: self.height.map(Some),
            net_weight_g: self.weight.map(Some),
        }
    }
}

/// Optional measurement that `edit --clear` can remove
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Measure {
    Length,
    Width,
    Height,
    Weight,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[command(flatten)]
    pub fields: FieldArgs,

    /// Interactive mode (prompt for fields)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Article ID
    pub id: i64,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Article ID
    pub id: i64,

    #[command(flatten)]
    pub fields: FieldArgs,

    /// Remove stored measurements (repeat or comma-separate)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub clear: Vec<Measure>,
}

impl EditArgs {
    fn into_patch(self) -> ArticlePatch {
        let mut patch = self.fields.into_patch();
        for measure in self.clear {
            match measure {
                Measure::Length => patch.length_mm = Some(None),
                Measure::Width => patch.width_mm = Some(None),
                Measure::Height => patch.height_mm = Some(None),
                Measure::Weight => patch.net_weight_g = Some(None),
            }
        }
        patch
    }
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Article ID
    pub id: i64,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Run an article subcommand
pub fn run(cmd: ArticleCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ArticleCommands::List(args) => run_list(args, global),
        ArticleCommands::Show(args) => run_show(args, global),
        ArticleCommands::New(args) => run_new(args, global),
        ArticleCommands::Edit(args) => run_edit(args, global),
        ArticleCommands::Delete(args) => run_delete(args, global),
        ArticleCommands::Categories => run_lookup(global, ArticleStore::article_categories),
        ArticleCommands::BicycleCategories => run_lookup(global, ArticleStore::bicycle_categories),
        ArticleCommands::Materials => run_lookup(global, ArticleStore::materials),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let page = catalog.store.list(&args.to_query())?;

    if args.count {
        println!("{}", page.total_count);
        return Ok(());
    }

    let format = effective_format(global, &catalog.config);
    print!("{}", render_page(&page, format)?);
    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let catalog = open_catalog(global)?;
    let article = catalog
        .store
        .get(args.id)?
        .ok_or(ArticleError::NotFound(args.id))?;

    let format = effective_format(global, &catalog.config);
    print!("{}", render_article(&article, format)?);
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut catalog = open_catalog(global)?;

    let input = if args.interactive {
        prompt_article(&catalog.store, args.fields.into_patch())?
    } else {
        args.fields.into_patch().apply(ArticleInput::default())
    };

    let article = catalog.store.create(input)?;

    match effective_format(global, &catalog.config) {
        OutputFormat::Auto | OutputFormat::Tsv | OutputFormat::Csv | OutputFormat::Md => {
            if !global.quiet {
                println!(
                    "{} Created article {} {}",
                    style("✓").green(),
                    style(article.id).cyan(),
                    style(&article.article_number).yellow()
                );
            }
        }
        format => print!("{}", render_article(&article, format)?),
    }
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let id = args.id;
    let patch = args.into_patch();
    if patch.is_empty() {
        return Err(miette::miette!(
            help = "pass at least one field flag, e.g. --name, --weight or --clear weight",
            "nothing to change for article {}",
            id
        ));
    }

    let mut catalog = open_catalog(global)?;
    let current = catalog
        .store
        .get(id)?
        .ok_or(ArticleError::NotFound(id))?;
    let article = catalog.store.update(id, patch.apply(current.to_input()))?;

    match effective_format(global, &catalog.config) {
        OutputFormat::Auto | OutputFormat::Tsv | OutputFormat::Csv | OutputFormat::Md => {
            if !global.quiet {
                println!(
                    "{} Updated article {} {}",
                    style("✓").green(),
                    style(article.id).cyan(),
                    style(&article.article_number).yellow()
                );
            }
        }
        format => print!("{}", render_article(&article, format)?),
    }
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut catalog = open_catalog(global)?;
    let article = catalog
        .store
        .get(args.id)?
        .ok_or(ArticleError::NotFound(args.id))?;

    if !args.yes {
        let prompt = format!(
            "Delete article {} ({})?",
            article.id, article.article_number
        );
        if !confirm(&prompt)? {
            println!("Aborted.");
            return Ok(());
        }
    }

    if !catalog.store.delete(article.id)? {
        return Err(ArticleError::NotFound(article.id).into());
    }

    if !global.quiet {
        println!(
            "{} Deleted article {} {}",
            style("✓").green(),
            style(article.id).cyan(),
            style(&article.article_number).yellow()
        );
    }
    Ok(())
}

fn run_lookup(
    global: &GlobalOpts,
    lookup: fn(&ArticleStore) -> std::result::Result<Vec<String>, ArticleError>,
) -> Result<()> {
    let catalog = open_catalog(global)?;
    let values = lookup(&catalog.store)?;
    let format = effective_format(global, &catalog.config);
    print!("{}", render_values(&values, format)?);
    Ok(())
}

/// Prompt for every field not already given on the command line
fn prompt_article(store: &ArticleStore, given: ArticlePatch) -> Result<ArticleInput> {
    let theme = ColorfulTheme::default();

    println!();
    println!("{} Creating new article", style("◆").cyan());
    println!("{}", style("─".repeat(50)).dim());
    println!();

    let article_number = match given.article_number {
        Some(v) => v,
        None => prompt_text(&theme, "Article number")?,
    };
    let name = match given.name {
        Some(v) => v,
        None => prompt_text(&theme, "Name")?,
    };
    let article_category = match given.article_category {
        Some(v) => v,
        None => prompt_choice(&theme, "Article category", &store.article_categories()?)?,
    };
    let bicycle_categories = match given.bicycle_categories {
        Some(v) => v,
        None => {
            let known = store.bicycle_categories()?;
            if !known.is_empty() {
                println!("  {} {}", style("Known:").dim(), style(known.join(", ")).dim());
            }
            let raw = prompt_text(&theme, "Bicycle categories (comma-separated)")?;
            vec![raw]
        }
    };
    let material = match given.material {
        Some(v) => v,
        None => prompt_choice(&theme, "Material", &store.materials()?)?,
    };

    Ok(ArticleInput {
        article_number,
        name,
        article_category,
        bicycle_categories,
        material,
        length_mm: or_prompt(&theme, given.length_mm.flatten(), "Length (mm)")?,
        width_mm: or_prompt(&theme, given.width_mm.flatten(), "Width (mm)")?,
        height_mm: or_prompt(&theme, given.height_mm.flatten(), "Height (mm)")?,
        net_weight_g: or_prompt(&theme, given.net_weight_g.flatten(), "Net weight (g)")?,
    })
}

fn prompt_text(theme: &ColorfulTheme, label: &str) -> Result<String> {
    Input::with_theme(theme)
        .with_prompt(label)
        .validate_with(|s: &String| {
            if s.trim().is_empty() {
                Err("a value is required")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .into_diagnostic()
}

/// Pick from values already in the catalog, or type a new one
fn prompt_choice(theme: &ColorfulTheme, label: &str, known: &[String]) -> Result<String> {
    if known.is_empty() {
        return prompt_text(theme, label);
    }

    let mut items: Vec<&str> = known.iter().map(String::as_str).collect();
    items.push("(new value)");
    let selection = Select::with_theme(theme)
        .with_prompt(label)
        .items(&items)
        .default(0)
        .interact()
        .into_diagnostic()?;

    if selection < known.len() {
        Ok(known[selection].clone())
    } else {
        prompt_text(theme, label)
    }
}

fn or_prompt(theme: &ColorfulTheme, given: Option<f64>, label: &str) -> Result<Option<f64>> {
    if given.is_some() {
        return Ok(given);
    }
    let raw: String = Input::with_theme(theme)
        .with_prompt(format!("{} (blank to skip)", label))
        .allow_empty(true)
        .validate_with(|s: &String| {
            if s.trim().is_empty() || s.trim().parse::<f64>().is_ok() {
                Ok(())
            } else {
                Err("enter a number or leave blank")
            }
        })
        .interact_text()
        .into_diagnostic()?;

    let raw = raw.trim();
    if raw.is_empty() {
        Ok(None)
    } else {
        raw.parse::<f64>().map(Some).into_diagnostic()
    }
}
