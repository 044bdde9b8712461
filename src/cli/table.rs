//! Rendering of article lists and details for the terminal
//!
//! Every renderer returns a `String` so that commands decide where it goes
//! and tests can inspect it directly.

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::helpers::{escape_csv, format_measure, truncate_str};
use crate::cli::OutputFormat;
use crate::core::store::ArticlePage;
use crate::entities::article::Article;

const LIST_HEADERS: [&str; 8] = [
    "ID",
    "ARTICLE NO",
    "NAME",
    "CATEGORY",
    "BICYCLE",
    "MATERIAL",
    "WEIGHT (g)",
    "L x W x H (mm)",
];

fn dimensions(article: &Article) -> String {
    if article.length_mm.is_none() && article.width_mm.is_none() && article.height_mm.is_none() {
        return "-".to_string();
    }
    format!(
        "{} x {} x {}",
        format_measure(article.length_mm),
        format_measure(article.width_mm),
        format_measure(article.height_mm)
    )
}

fn list_row(article: &Article, max_name: Option<usize>) -> [String; 8] {
    let name = match max_name {
        Some(max) => truncate_str(&article.name, max),
        None => article.name.clone(),
    };
    [
        article.id.to_string(),
        article.article_number.clone(),
        name,
        article.article_category.clone(),
        article.bicycle_categories.join(", "),
        article.material.clone(),
        format_measure(article.net_weight_g),
        dimensions(article),
    ]
}

/// "Showing X to Y of N articles"
pub fn page_footer(page: &ArticlePage) -> String {
    if page.total_count == 0 {
        return "No articles found.".to_string();
    }
    if page.articles.is_empty() {
        return format!(
            "Page {} is past the end ({} page(s), {} articles).",
            page.page, page.total_pages, page.total_count
        );
    }
    format!(
        "Showing {} to {} of {} articles (page {} of {})",
        page.first_index(),
        page.last_index(),
        page.total_count,
        page.page,
        page.total_pages
    )
}

/// Render one page of articles in the requested format
pub fn render_page(page: &ArticlePage, format: OutputFormat) -> Result<String> {
    let out = match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(page).into_diagnostic()?;
            json.push('\n');
            json
        }
        OutputFormat::Yaml => serde_yml::to_string(page).into_diagnostic()?,
        OutputFormat::Id => page
            .articles
            .iter()
            .map(|a| format!("{}\n", a.id))
            .collect(),
        OutputFormat::Csv => {
            let mut out = String::from(
                "id,article_number,name,article_category,bicycle_categories,material,length_mm,width_mm,height_mm,net_weight_g\n",
            );
            for a in &page.articles {
                let optional = |v: Option<f64>| v.map(|n| n.to_string()).unwrap_or_default();
                out.push_str(&format!(
                    "{},{},{},{},{},{},{},{},{},{}\n",
                    a.id,
                    escape_csv(&a.article_number),
                    escape_csv(&a.name),
                    escape_csv(&a.article_category),
                    escape_csv(&a.bicycle_categories_joined()),
                    escape_csv(&a.material),
                    optional(a.length_mm),
                    optional(a.width_mm),
                    optional(a.height_mm),
                    optional(a.net_weight_g),
                ));
            }
            out
        }
        OutputFormat::Tsv => {
            let mut out = LIST_HEADERS.join("\t");
            out.push('\n');
            for a in &page.articles {
                out.push_str(&list_row(a, None).join("\t"));
                out.push('\n');
            }
            out
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(LIST_HEADERS);
            for a in &page.articles {
                builder.push_record(list_row(a, None));
            }
            format!(
                "{}\n\n{}\n",
                builder.build().with(Style::markdown()),
                page_footer(page)
            )
        }
        OutputFormat::Auto => {
            if page.articles.is_empty() {
                return Ok(format!("{}\n", page_footer(page)));
            }
            let mut builder = Builder::default();
            builder.push_record(LIST_HEADERS);
            for a in &page.articles {
                builder.push_record(list_row(a, Some(32)));
            }
            format!(
                "{}\n\n{}\n",
                builder.build().with(Style::sharp()),
                style(page_footer(page)).dim()
            )
        }
    };
    Ok(out)
}

/// Detail view for a single article
pub fn render_article(article: &Article, format: OutputFormat) -> Result<String> {
    let out = match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(article).into_diagnostic()?;
            json.push('\n');
            json
        }
        OutputFormat::Yaml => serde_yml::to_string(article).into_diagnostic()?,
        OutputFormat::Id => format!("{}\n", article.id),
        _ => {
            let rule = style("─".repeat(60)).dim().to_string();
            let mut out = String::new();
            out.push_str(&format!("{}\n", rule));
            out.push_str(&format!("{}: {}\n", style("ID").bold(), style(article.id).cyan()));
            out.push_str(&format!(
                "{}: {}\n",
                style("Article No").bold(),
                style(&article.article_number).cyan()
            ));
            out.push_str(&format!("{}: {}\n", style("Name").bold(), style(&article.name).yellow()));
            out.push_str(&format!("{}\n", rule));
            out.push_str(&format!("{}: {}\n", style("Category").bold(), article.article_category));
            out.push_str(&format!(
                "{}: {}\n",
                style("Bicycle Categories").bold(),
                article.bicycle_categories.join(", ")
            ));
            out.push_str(&format!("{}: {}\n", style("Material").bold(), article.material));
            out.push_str(&format!(
                "{}: {}\n",
                style("Dimensions (mm)").bold(),
                dimensions(article)
            ));
            out.push_str(&format!(
                "{}: {}\n",
                style("Net Weight (g)").bold(),
                format_measure(article.net_weight_g)
            ));
            out.push_str(&format!("{}\n", rule));
            out.push_str(&format!(
                "{}: {} | {}: {}\n",
                style("Created").dim(),
                article.created_date.format("%Y-%m-%d %H:%M"),
                style("Modified").dim(),
                article.last_modified_date.format("%Y-%m-%d %H:%M")
            ));
            out
        }
    };
    Ok(out)
}

/// Render a lookup list (categories, materials)
pub fn render_values(values: &[String], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(values).into_diagnostic()?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Yaml => serde_yml::to_string(&values).into_diagnostic(),
        _ => Ok(values.iter().map(|v| format!("{}\n", v)).collect()),
    }
}
