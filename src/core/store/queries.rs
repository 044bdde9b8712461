//! Article queries and mutations

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::debug;

use super::{ArticlePage, ArticleQuery, ArticleStore, SortField};
use crate::core::error::ArticleError;
use crate::entities::article::{join_categories, split_categories, Article, ArticleInput};

const ARTICLE_COLUMNS: &str = "id, article_number, name, article_category, bicycle_categories, \
     material, length_mm, width_mm, height_mm, net_weight_g, created_date, last_modified_date";

impl ArticleStore {
    /// List one page of articles matching the query
    pub fn list(&self, query: &ArticleQuery) -> Result<ArticlePage, ArticleError> {
        let (page, page_size) = self.paging.resolve(query.page, query.page_size);

        let mut where_sql = String::from(" WHERE 1=1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![];

        if let Some(ref category) = query.article_category {
            where_sql.push_str(" AND article_category = ?");
            params_vec.push(Box::new(category.clone()));
        }

        if !query.bicycle_categories.is_empty() {
            // Delimiter-bounded match so "Road" does not match "Roadster"
            let clauses = vec!["instr(',' || bicycle_categories || ',', ?) > 0"; query.bicycle_categories.len()];
            where_sql.push_str(&format!(" AND ({})", clauses.join(" OR ")));
            for category in &query.bicycle_categories {
                params_vec.push(Box::new(format!(",{},", category)));
            }
        }

        if let Some(ref material) = query.material {
            where_sql.push_str(" AND material = ?");
            params_vec.push(Box::new(material.clone()));
        }

        if let Some(ref term) = query.search_term {
            // Term and columns both fold through SQLite lower() (ASCII only)
            where_sql.push_str(" AND (instr(lower(article_number), lower(?)) > 0 OR instr(lower(name), lower(?)) > 0)");
            params_vec.push(Box::new(term.clone()));
            params_vec.push(Box::new(term.clone()));
        }

        let total_count: i64 = {
            let params_refs: Vec<&dyn rusqlite::ToSql> =
                params_vec.iter().map(|p| p.as_ref()).collect();
            self.conn.query_row(
                &format!("SELECT COUNT(*) FROM articles{}", where_sql),
                params_refs.as_slice(),
                |row| row.get(0),
            )?
        };

        let mut sql = format!(
            "SELECT {} FROM articles{} ORDER BY {} {}",
            ARTICLE_COLUMNS,
            where_sql,
            query.sort.column(),
            query.direction.as_sql()
        );
        if query.sort != SortField::Id {
            sql.push_str(", id ASC");
        }
        sql.push_str(" LIMIT ? OFFSET ?");
        params_vec.push(Box::new(page_size));
        params_vec.push(Box::new((page - 1).saturating_mul(page_size)));

        debug!(%sql, page, page_size, "listing articles");

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();
        let mut stmt = self.conn.prepare(&sql)?;
        let articles = stmt
            .query_map(params_refs.as_slice(), row_to_article)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ArticlePage::new(articles, total_count, page, page_size))
    }

    /// Get a single article by ID
    pub fn get(&self, id: i64) -> Result<Option<Article>, ArticleError> {
        let article = self
            .conn
            .query_row(
                &format!("SELECT {} FROM articles WHERE id = ?1", ARTICLE_COLUMNS),
                params![id],
                row_to_article,
            )
            .optional()?;
        Ok(article)
    }

    /// Look up an article by its (unique) article number
    pub fn find_by_article_number(&self, article_number: &str) -> Result<Option<Article>, ArticleError> {
        let article = self
            .conn
            .query_row(
                &format!("SELECT {} FROM articles WHERE article_number = ?1", ARTICLE_COLUMNS),
                params![article_number.trim()],
                row_to_article,
            )
            .optional()?;
        Ok(article)
    }

    /// Validate and insert a new article
    pub fn create(&mut self, input: ArticleInput) -> Result<Article, ArticleError> {
        let input = input.validate()?;
        let now = timestamp_now();
        let stamp = format_timestamp(&now);

        let inserted = self.conn.execute(
            r#"INSERT INTO articles (article_number, name, article_category, bicycle_categories,
                                     material, length_mm, width_mm, height_mm, net_weight_g,
                                     created_date, last_modified_date)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)"#,
            params![
                input.article_number,
                input.name,
                input.article_category,
                join_categories(&input.bicycle_categories),
                input.material,
                input.length_mm,
                input.width_mm,
                input.height_mm,
                input.net_weight_g,
                stamp,
            ],
        );
        map_unique_violation(inserted, &input.article_number)?;

        let id = self.conn.last_insert_rowid();
        debug!(id, article_number = %input.article_number, "created article");

        Ok(article_from_input(id, input, now, now))
    }

    /// Validate and replace every editable field of an existing article
    pub fn update(&mut self, id: i64, input: ArticleInput) -> Result<Article, ArticleError> {
        let input = input.validate()?;
        let existing = self.get(id)?.ok_or(ArticleError::NotFound(id))?;
        let now = timestamp_now();

        let updated = self.conn.execute(
            r#"UPDATE articles
               SET article_number = ?1, name = ?2, article_category = ?3,
                   bicycle_categories = ?4, material = ?5, length_mm = ?6,
                   width_mm = ?7, height_mm = ?8, net_weight_g = ?9,
                   last_modified_date = ?10
               WHERE id = ?11"#,
            params![
                input.article_number,
                input.name,
                input.article_category,
                join_categories(&input.bicycle_categories),
                input.material,
                input.length_mm,
                input.width_mm,
                input.height_mm,
                input.net_weight_g,
                format_timestamp(&now),
                id,
            ],
        );
        map_unique_violation(updated, &input.article_number)?;

        debug!(id, "updated article");

        Ok(article_from_input(id, input, existing.created_date, now))
    }

    /// Delete an article, returning false when it did not exist
    pub fn delete(&mut self, id: i64) -> Result<bool, ArticleError> {
        let removed = self
            .conn
            .execute("DELETE FROM articles WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    /// Total number of stored articles
    pub fn count(&self) -> Result<usize, ArticleError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM articles", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Distinct article categories, ascending
    pub fn article_categories(&self) -> Result<Vec<String>, ArticleError> {
        self.distinct_values("article_category")
    }

    /// Distinct materials, ascending
    pub fn materials(&self) -> Result<Vec<String>, ArticleError> {
        self.distinct_values("material")
    }

    /// Distinct bicycle categories across all articles, ascending
    pub fn bicycle_categories(&self) -> Result<Vec<String>, ArticleError> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT bicycle_categories FROM articles")?;
        let joined = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let categories: BTreeSet<String> = joined
            .iter()
            .flat_map(|j| split_categories(j))
            .collect();
        Ok(categories.into_iter().collect())
    }

    fn distinct_values(&self, column: &'static str) -> Result<Vec<String>, ArticleError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT DISTINCT {col} FROM articles WHERE {col} <> '' ORDER BY {col} ASC",
            col = column
        ))?;
        let values = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(values)
    }
}

fn row_to_article(row: &Row<'_>) -> rusqlite::Result<Article> {
    Ok(Article {
        id: row.get(0)?,
        article_number: row.get(1)?,
        name: row.get(2)?,
        article_category: row.get(3)?,
        bicycle_categories: split_categories(&row.get::<_, String>(4)?),
        material: row.get(5)?,
        length_mm: row.get(6)?,
        width_mm: row.get(7)?,
        height_mm: row.get(8)?,
        net_weight_g: row.get(9)?,
        created_date: parse_timestamp(10, row.get(10)?)?,
        last_modified_date: parse_timestamp(11, row.get(11)?)?,
    })
}

fn article_from_input(
    id: i64,
    input: ArticleInput,
    created_date: DateTime<Utc>,
    last_modified_date: DateTime<Utc>,
) -> Article {
    Article {
        id,
        article_number: input.article_number,
        name: input.name,
        article_category: input.article_category,
        bicycle_categories: input.bicycle_categories,
        material: input.material,
        length_mm: input.length_mm,
        width_mm: input.width_mm,
        height_mm: input.height_mm,
        net_weight_g: input.net_weight_g,
        created_date,
        last_modified_date,
    }
}

/// Current time truncated to the precision stored in the database
fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 so text ordering matches time ordering
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, s: String) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn map_unique_violation(result: rusqlite::Result<usize>, article_number: &str) -> Result<usize, ArticleError> {
    match result {
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Err(ArticleError::DuplicateArticleNumber(article_number.to_string()))
        }
        other => Ok(other?),
    }
}
