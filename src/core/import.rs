//! Bulk import of articles from CSV
//!
//! Rows are parsed and validated before anything is written, so a file with
//! bad rows either imports nothing (default) or imports only the good rows
//! (`skip_errors`).

use std::collections::{HashMap, HashSet};
use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::core::error::ArticleError;
use crate::core::store::ArticleStore;
use crate::entities::article::ArticleInput;

/// Column headers in template order
pub const CSV_HEADERS: [&str; 9] = [
    "article_number",
    "name",
    "article_category",
    "bicycle_categories",
    "material",
    "length_mm",
    "width_mm",
    "height_mm",
    "net_weight_g",
];

/// Import behaviour switches
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Validate only, write nothing
    pub dry_run: bool,
    /// Import valid rows even when other rows fail
    pub skip_errors: bool,
    /// Overwrite articles whose number already exists instead of skipping them
    pub update: bool,
}

/// A row that could not be imported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line number in the file (the header is line 1)
    pub line: usize,
    pub messages: Vec<String>,
}

/// Import outcome
#[derive(Debug, Default, Clone)]
pub struct ImportReport {
    pub rows_processed: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
    /// True when errors stopped the import before any row was written
    pub aborted: bool,
}

/// Header template plus one example row
pub fn csv_template() -> String {
    format!(
        "{}\nHUB-003,DT Swiss 350 Hub,Hub,\"Road,Gravel\",Aluminum,100,50,50,240\n",
        CSV_HEADERS.join(",")
    )
}

/// Import articles from CSV data
pub fn import_csv<R: Read>(
    store: &mut ArticleStore,
    reader: R,
    options: ImportOptions,
) -> Result<ImportReport, ArticleError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let header_map = build_header_map(rdr.headers()?);
    let mut report = ImportReport::default();
    let mut valid: Vec<(usize, ArticleInput)> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut last_line = 1;

    for result in rdr.records() {
        report.rows_processed += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let line = e.position().map_or(last_line + 1, |p| p.line() as usize);
                last_line = line;
                report.errors.push(RowError {
                    line,
                    messages: vec![format!("CSV parse error: {}", e)],
                });
                continue;
            }
        };
        // Line the record starts on; quoted fields may span several
        let line = record.position().map_or(last_line + 1, |p| p.line() as usize);
        last_line = line;

        match parse_record(&record, &header_map).and_then(|input| input.validate().map_err(|e| e.messages())) {
            Ok(input) => {
                if seen.insert(input.article_number.clone()) {
                    valid.push((line, input));
                } else {
                    report.errors.push(RowError {
                        line,
                        messages: vec![format!(
                            "Article Number '{}' appears more than once in the file.",
                            input.article_number
                        )],
                    });
                }
            }
            Err(messages) => report.errors.push(RowError { line, messages }),
        }
    }

    if !report.errors.is_empty() && !options.skip_errors {
        report.aborted = true;
        return Ok(report);
    }

    if options.dry_run {
        for (line, input) in valid {
            tally(store, &mut report, line, input, options, false)?;
        }
        return Ok(report);
    }

    store.transaction(|store| {
        for (line, input) in valid {
            tally(store, &mut report, line, input, options, true)?;
        }
        Ok(())
    })?;

    Ok(report)
}

/// Count one valid row, writing it when `write` is set
fn tally(
    store: &mut ArticleStore,
    report: &mut ImportReport,
    line: usize,
    input: ArticleInput,
    options: ImportOptions,
    write: bool,
) -> Result<(), ArticleError> {
    match (store.find_by_article_number(&input.article_number)?, options.update) {
        (Some(_), false) => {
            debug!(line, article_number = %input.article_number, "article exists, skipping");
            report.skipped += 1;
        }
        (Some(article), true) => {
            if write {
                store.update(article.id, input)?;
            }
            report.updated += 1;
        }
        (None, _) => {
            if write {
                store.create(input)?;
            }
            report.created += 1;
        }
    }
    Ok(())
}

fn header_key(header: &str) -> String {
    header
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (header_key(h), i))
        .collect()
}

fn get_field(record: &StringRecord, header_map: &HashMap<String, usize>, field: &str) -> Option<String> {
    header_map
        .get(&header_key(field))
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_record(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<ArticleInput, Vec<String>> {
    let mut errors = Vec::new();
    let mut number = |field: &str, label: &str| -> Option<f64> {
        let raw = get_field(record, header_map, field)?;
        match raw.parse::<f64>() {
            Ok(v) => Some(v),
            Err(_) => {
                errors.push(format!("{} '{}' is not a number.", label, raw));
                None
            }
        }
    };

    let length_mm = number("length_mm", "Length (mm)");
    let width_mm = number("width_mm", "Width (mm)");
    let height_mm = number("height_mm", "Height (mm)");
    let net_weight_g = number("net_weight_g", "Net Weight (g)");

    if !errors.is_empty() {
        return Err(errors);
    }

    let bicycle_categories = get_field(record, header_map, "bicycle_categories")
        .map(|cell| cell.split([',', ';']).map(String::from).collect())
        .unwrap_or_default();

    Ok(ArticleInput {
        article_number: get_field(record, header_map, "article_number").unwrap_or_default(),
        name: get_field(record, header_map, "name").unwrap_or_default(),
        article_category: get_field(record, header_map, "article_category").unwrap_or_default(),
        bicycle_categories,
        material: get_field(record, header_map, "material").unwrap_or_default(),
        length_mm,
        width_mm,
        height_mm,
        net_weight_g,
    })
}
