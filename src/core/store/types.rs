//! Query and result types for article listing

use serde::Serialize;

use crate::entities::article::{split_categories, Article};

/// Default number of articles per page
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Upper bound on articles per page
pub const MAX_PAGE_SIZE: i64 = 100;

/// Fields articles can be sorted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Id,
    ArticleNumber,
    Name,
    ArticleCategory,
    BicycleCategories,
    Material,
    LengthMm,
    WidthMm,
    HeightMm,
    NetWeightG,
    CreatedDate,
    LastModifiedDate,
}

impl SortField {
    /// Parse a sort key case-insensitively; unknown keys sort by ID
    ///
    /// Accepts the camelCase API names (`articleNumber`), kebab-case CLI
    /// names (`article-number`) and snake_case column names.
    pub fn parse(s: &str) -> Self {
        let key: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "articlenumber" => SortField::ArticleNumber,
            "name" => SortField::Name,
            "articlecategory" => SortField::ArticleCategory,
            "bicyclecategories" | "bicyclecategory" => SortField::BicycleCategories,
            "material" => SortField::Material,
            "lengthmm" => SortField::LengthMm,
            "widthmm" => SortField::WidthMm,
            "heightmm" => SortField::HeightMm,
            "netweightg" => SortField::NetWeightG,
            "createddate" => SortField::CreatedDate,
            "lastmodifieddate" => SortField::LastModifiedDate,
            _ => SortField::Id,
        }
    }

    /// Database column backing this sort field
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::ArticleNumber => "article_number",
            SortField::Name => "name",
            SortField::ArticleCategory => "article_category",
            SortField::BicycleCategories => "bicycle_categories",
            SortField::Material => "material",
            SortField::LengthMm => "length_mm",
            SortField::WidthMm => "width_mm",
            SortField::HeightMm => "height_mm",
            SortField::NetWeightG => "net_weight_g",
            SortField::CreatedDate => "created_date",
            SortField::LastModifiedDate => "last_modified_date",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `desc` in any case descends, everything else ascends
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Filter, sort and paging options for listing articles
#[derive(Debug, Clone, Default)]
pub struct ArticleQuery {
    /// Exact article category
    pub article_category: Option<String>,

    /// Match articles carrying any of these bicycle categories
    pub bicycle_categories: Vec<String>,

    /// Exact material
    pub material: Option<String>,

    /// Case-insensitive substring of article number or name
    pub search_term: Option<String>,

    pub sort: SortField,

    pub direction: SortDirection,

    /// Requested 1-based page (clamped to >= 1)
    pub page: Option<i64>,

    /// Requested page size (defaulted and clamped by the store)
    pub page_size: Option<i64>,
}

impl ArticleQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_article_category(mut self, category: impl Into<String>) -> Self {
        self.article_category = non_blank(category.into());
        self
    }

    /// Add bicycle categories from a comma-separated string
    pub fn with_bicycle_categories(mut self, categories: &str) -> Self {
        for category in split_categories(categories) {
            if !self.bicycle_categories.contains(&category) {
                self.bicycle_categories.push(category);
            }
        }
        self
    }

    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = non_blank(material.into());
        self
    }

    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = non_blank(term.into());
        self
    }

    pub fn sorted_by(mut self, sort: SortField, direction: SortDirection) -> Self {
        self.sort = sort;
        self.direction = direction;
        self
    }

    pub fn page(mut self, page: i64, page_size: i64) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }
}

/// Paging bounds applied to every list query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingLimits {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Default for PagingLimits {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl PagingLimits {
    /// Resolve requested page/page size into the effective values
    pub fn resolve(&self, page: Option<i64>, page_size: Option<i64>) -> (i64, i64) {
        let max = self.max_page_size.max(1);
        let page = page.unwrap_or(1).max(1);
        let page_size = match page_size {
            Some(size) if size >= 1 => size.min(max),
            _ => self.default_page_size.clamp(1, max),
        };
        (page, page_size)
    }
}

/// One page of articles plus paging metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl ArticlePage {
    pub fn new(articles: Vec<Article>, total_count: i64, page: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total_count + page_size - 1) / page_size
        } else {
            0
        };
        Self {
            articles,
            total_count,
            page,
            page_size,
            total_pages,
            has_next_page: page < total_pages,
            has_previous_page: page > 1,
        }
    }

    /// 1-based index of the first article on this page (0 when empty)
    pub fn first_index(&self) -> i64 {
        if self.articles.is_empty() {
            0
        } else {
            (self.page - 1) * self.page_size + 1
        }
    }

    /// 1-based index of the last article on this page (0 when empty)
    pub fn last_index(&self) -> i64 {
        if self.articles.is_empty() {
            0
        } else {
            self.first_index() + self.articles.len() as i64 - 1
        }
    }
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
