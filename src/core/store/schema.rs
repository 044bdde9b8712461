//! Database schema initialization and migration

use rusqlite::params;
use tracing::info;

use super::{ArticleStore, SCHEMA_VERSION};
use crate::core::error::ArticleError;

/// Version 2 layout: bicycle categories as a comma-joined column
const CREATE_ARTICLES: &str = r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        article_number TEXT NOT NULL,
        name TEXT NOT NULL,
        article_category TEXT NOT NULL,
        bicycle_categories TEXT NOT NULL DEFAULT '',
        material TEXT NOT NULL,
        length_mm REAL,
        width_mm REAL,
        height_mm REAL,
        net_weight_g REAL,
        created_date TEXT NOT NULL,
        last_modified_date TEXT NOT NULL
    );
    CREATE UNIQUE INDEX IF NOT EXISTS idx_articles_article_number ON articles(article_number);
    CREATE INDEX IF NOT EXISTS idx_articles_article_category ON articles(article_category);
    CREATE INDEX IF NOT EXISTS idx_articles_material ON articles(material);
"#;

/// Version 1 stored a single bicycle category per article
const MIGRATE_V1_TO_V2: &str = r#"
    ALTER TABLE articles ADD COLUMN bicycle_categories TEXT NOT NULL DEFAULT '';
    UPDATE articles SET bicycle_categories = TRIM(bicycle_category);
    DROP INDEX IF EXISTS idx_articles_bicycle_category;
    ALTER TABLE articles DROP COLUMN bicycle_category;
    CREATE INDEX IF NOT EXISTS idx_articles_article_category ON articles(article_category);
    CREATE INDEX IF NOT EXISTS idx_articles_material ON articles(material);
"#;

impl ArticleStore {
    /// Bring the database up to [`SCHEMA_VERSION`]
    pub(super) fn migrate(&mut self) -> Result<(), ArticleError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);",
        )?;

        // Version 1 files may predate the version table
        let current = match self.schema_version()? {
            0 if self.has_column("articles", "bicycle_category")? => 1,
            v => v,
        };
        if current == SCHEMA_VERSION {
            return Ok(());
        }
        if current > SCHEMA_VERSION {
            return Err(ArticleError::UnsupportedSchema(current));
        }

        let tx = self.conn.transaction()?;
        match current {
            0 => tx.execute_batch(CREATE_ARTICLES)?,
            _ => {
                info!(from = current, to = SCHEMA_VERSION, "migrating article database");
                tx.execute_batch(MIGRATE_V1_TO_V2)?;
            }
        }
        tx.execute("DELETE FROM schema_version", [])?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;
        tx.commit()?;

        Ok(())
    }

    /// Version recorded in the database, 0 for a fresh file
    pub fn schema_version(&self) -> Result<i32, ArticleError> {
        let version = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )?;
        Ok(version)
    }

    fn has_column(&self, table: &str, column: &str) -> Result<bool, ArticleError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
            params![table, column],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
