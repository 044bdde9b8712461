//! Sample data for new catalogs

use rust_embed::Embed;
use tracing::debug;

use crate::core::error::ArticleError;
use crate::core::store::ArticleStore;
use crate::entities::article::ArticleInput;

#[derive(Embed)]
#[folder = "seed/"]
struct EmbeddedSeed;

const SEED_FILE: &str = "articles.yaml";

/// Outcome of a seed run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedStats {
    pub created: usize,
    pub skipped: usize,
}

/// The bundled sample articles
pub fn sample_articles() -> Result<Vec<ArticleInput>, ArticleError> {
    let file = EmbeddedSeed::get(SEED_FILE).ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::NotFound, "bundled seed file is missing")
    })?;
    serde_yml::from_slice(&file.data).map_err(|e| {
        ArticleError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

/// Insert the sample articles, skipping article numbers that already exist
pub fn seed(store: &mut ArticleStore) -> Result<SeedStats, ArticleError> {
    let mut stats = SeedStats::default();

    for article in sample_articles()? {
        if store.find_by_article_number(&article.article_number)?.is_some() {
            debug!(article_number = %article.article_number, "seed article exists, skipping");
            stats.skipped += 1;
            continue;
        }
        store.create(article)?;
        stats.created += 1;
    }

    Ok(stats)
}
