//! Article entity type - bicycle component parts submitted by suppliers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::error::ArticleError;

/// Maximum length of an article number
pub const MAX_ARTICLE_NUMBER_LEN: usize = 50;
/// Maximum length of an article name
pub const MAX_NAME_LEN: usize = 200;
/// Maximum length of the article category and material columns
pub const MAX_CATEGORY_LEN: usize = 100;
/// Maximum length of the joined bicycle categories column
pub const MAX_BICYCLE_CATEGORIES_LEN: usize = 300;
/// Upper bound for length, width and height in millimeters
pub const MAX_DIMENSION_MM: f64 = 10_000.0;
/// Upper bound for net weight in grams
pub const MAX_NET_WEIGHT_G: f64 = 100_000.0;

/// A stored article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Store-assigned identifier
    pub id: i64,

    /// Article number/code (unique)
    pub article_number: String,

    /// Display name
    pub name: String,

    /// Component kind (Hub, Crank, ...)
    pub article_category: String,

    /// Bicycle types the article fits (Road, Mountain, ...)
    pub bicycle_categories: Vec<String>,

    /// Material used in the article
    pub material: String,

    /// Length in millimeters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_mm: Option<f64>,

    /// Width in millimeters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_mm: Option<f64>,

    /// Height in millimeters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_mm: Option<f64>,

    /// Net weight in grams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_weight_g: Option<f64>,

    pub created_date: DateTime<Utc>,

    pub last_modified_date: DateTime<Utc>,
}

impl Article {
    /// The editable fields of this article, e.g. as the base for a partial edit
    pub fn to_input(&self) -> ArticleInput {
        ArticleInput {
            article_number: self.article_number.clone(),
            name: self.name.clone(),
            article_category: self.article_category.clone(),
            bicycle_categories: self.bicycle_categories.clone(),
            material: self.material.clone(),
            length_mm: self.length_mm,
            width_mm: self.width_mm,
            height_mm: self.height_mm,
            net_weight_g: self.net_weight_g,
        }
    }

    /// Bicycle categories as stored in the database column
    pub fn bicycle_categories_joined(&self) -> String {
        join_categories(&self.bicycle_categories)
    }
}

/// Fields supplied when creating or updating an article
///
/// Missing fields deserialize to empty values so that `validate` can report
/// every problem at once instead of failing on the first absent key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArticleInput {
    pub article_number: String,
    pub name: String,
    pub article_category: String,
    #[serde(alias = "bicycleCategory", deserialize_with = "deserialize_categories")]
    pub bicycle_categories: Vec<String>,
    pub material: String,
    pub length_mm: Option<f64>,
    pub width_mm: Option<f64>,
    pub height_mm: Option<f64>,
    pub net_weight_g: Option<f64>,
}

impl ArticleInput {
    /// Normalize the input and check every field rule
    ///
    /// Strings are trimmed and bicycle categories are split, trimmed and
    /// de-duplicated (first occurrence wins). All violations are collected
    /// into a single [`ArticleError::Validation`].
    pub fn validate(self) -> Result<ArticleInput, ArticleError> {
        let mut errors = Vec::new();

        let article_number = self.article_number.trim().to_string();
        let name = self.name.trim().to_string();
        let article_category = self.article_category.trim().to_string();
        let material = self.material.trim().to_string();
        let bicycle_categories = normalize_categories(&self.bicycle_categories);

        check_text(&mut errors, "Article Number", &article_number, MAX_ARTICLE_NUMBER_LEN);
        check_text(&mut errors, "Name", &name, MAX_NAME_LEN);
        check_text(&mut errors, "Article Category", &article_category, MAX_CATEGORY_LEN);
        check_text(&mut errors, "Material", &material, MAX_CATEGORY_LEN);

        if bicycle_categories.is_empty() {
            errors.push("At least one Bicycle Category is required.".to_string());
        } else if join_categories(&bicycle_categories).chars().count() > MAX_BICYCLE_CATEGORIES_LEN {
            errors.push(format!(
                "Bicycle Categories must be at most {} characters combined.",
                MAX_BICYCLE_CATEGORIES_LEN
            ));
        }

        check_range(&mut errors, "Length (mm)", self.length_mm, MAX_DIMENSION_MM);
        check_range(&mut errors, "Width (mm)", self.width_mm, MAX_DIMENSION_MM);
        check_range(&mut errors, "Height (mm)", self.height_mm, MAX_DIMENSION_MM);
        check_range(&mut errors, "Net Weight (g)", self.net_weight_g, MAX_NET_WEIGHT_G);

        if !errors.is_empty() {
            return Err(ArticleError::Validation(errors));
        }

        Ok(ArticleInput {
            article_number,
            name,
            article_category,
            bicycle_categories,
            material,
            length_mm: self.length_mm,
            width_mm: self.width_mm,
            height_mm: self.height_mm,
            net_weight_g: self.net_weight_g,
        })
    }
}

/// Partial update: only the fields that are `Some` replace the current values
///
/// Measurements are doubly optional: `Some(None)` clears a stored value.
#[derive(Debug, Clone, Default)]
pub struct ArticlePatch {
    pub article_number: Option<String>,
    pub name: Option<String>,
    pub article_category: Option<String>,
    pub bicycle_categories: Option<Vec<String>>,
    pub material: Option<String>,
    pub length_mm: Option<Option<f64>>,
    pub width_mm: Option<Option<f64>>,
    pub height_mm: Option<Option<f64>>,
    pub net_weight_g: Option<Option<f64>>,
}

impl ArticlePatch {
    pub fn is_empty(&self) -> bool {
        self.article_number.is_none()
            && self.name.is_none()
            && self.article_category.is_none()
            && self.bicycle_categories.is_none()
            && self.material.is_none()
            && self.length_mm.is_none()
            && self.width_mm.is_none()
            && self.height_mm.is_none()
            && self.net_weight_g.is_none()
    }

    /// Overlay this patch on top of `base`
    pub fn apply(self, mut base: ArticleInput) -> ArticleInput {
        if let Some(v) = self.article_number {
            base.article_number = v;
        }
        if let Some(v) = self.name {
            base.name = v;
        }
        if let Some(v) = self.article_category {
            base.article_category = v;
        }
        if let Some(v) = self.bicycle_categories {
            base.bicycle_categories = v;
        }
        if let Some(v) = self.material {
            base.material = v;
        }
        if let Some(v) = self.length_mm {
            base.length_mm = v;
        }
        if let Some(v) = self.width_mm {
            base.width_mm = v;
        }
        if let Some(v) = self.height_mm {
            base.height_mm = v;
        }
        if let Some(v) = self.net_weight_g {
            base.net_weight_g = v;
        }
        base
    }
}

/// Join bicycle categories into the comma-separated column format
pub fn join_categories(categories: &[String]) -> String {
    categories.join(",")
}

/// Split the comma-separated column format, trimming and dropping empties
pub fn split_categories(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

/// Flatten, trim and de-duplicate categories, keeping first occurrences
pub fn normalize_categories(categories: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for category in categories.iter().flat_map(|c| split_categories(c)) {
        if !out.contains(&category) {
            out.push(category);
        }
    }
    out
}

fn check_text(errors: &mut Vec<String>, label: &str, value: &str, max_len: usize) {
    if value.is_empty() {
        errors.push(format!("{} is required.", label));
    } else if value.chars().count() > max_len {
        errors.push(format!("{} must be at most {} characters.", label, max_len));
    }
}

fn check_range(errors: &mut Vec<String>, label: &str, value: Option<f64>, max: f64) {
    if let Some(v) = value {
        if !v.is_finite() || v < 0.0 || v > max {
            errors.push(format!("{} must be a number between 0 and {}.", label, max));
        }
    }
}

/// Accept either a JSON list or a single comma-separated string
fn deserialize_categories<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(s)) => split_categories(&s),
        Some(OneOrMany::Many(v)) => v,
        None => Vec::new(),
    })
}
