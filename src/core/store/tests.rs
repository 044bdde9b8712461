use super::*;
use crate::entities::article::ArticleInput;
use rusqlite::params;
use tempfile::tempdir;

fn input(number: &str, name: &str, category: &str, bikes: &[&str], material: &str, weight: Option<f64>) -> ArticleInput {
    ArticleInput {
        article_number: number.to_string(),
        name: name.to_string(),
        article_category: category.to_string(),
        bicycle_categories: bikes.iter().map(|s| s.to_string()).collect(),
        material: material.to_string(),
        length_mm: None,
        width_mm: None,
        height_mm: None,
        net_weight_g: weight,
    }
}

fn populated_store() -> ArticleStore {
    let mut store = ArticleStore::open_in_memory().unwrap();
    store
        .create(input("HUB-001", "Shimano Deore XT Hub", "Hub", &["Mountain"], "Aluminum", Some(450.0)))
        .unwrap();
    store
        .create(input("HUB-002", "Campagnolo Record Hub", "Hub", &["Road"], "Carbon Fiber", Some(280.0)))
        .unwrap();
    store
        .create(input("CRANK-001", "SRAM GX Eagle Crankset", "Crank", &["Mountain", "Gravel"], "Aluminum", None))
        .unwrap();
    store
        .create(input("WHEEL-001", "Roadster Classic Wheel", "Wheel", &["Roadster"], "Steel", Some(1850.0)))
        .unwrap();
    store
}

fn numbers(page: &ArticlePage) -> Vec<&str> {
    page.articles.iter().map(|a| a.article_number.as_str()).collect()
}

#[test]
fn test_fresh_store_is_at_current_schema() {
    let store = ArticleStore::open_in_memory().unwrap();
    assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_open_file_creates_parent_directories() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("nested/dir/articles.db");

    {
        let mut store = ArticleStore::open(&path).unwrap();
        store
            .create(input("HUB-001", "Hub", "Hub", &["Road"], "Aluminum", None))
            .unwrap();
    }

    assert!(path.exists());
    let reopened = ArticleStore::open(&path).unwrap();
    assert_eq!(reopened.count().unwrap(), 1);
}

#[test]
fn test_create_then_get_round_trips() {
    let mut store = ArticleStore::open_in_memory().unwrap();
    let created = store
        .create(input(" HUB-001 ", "Hub", "Hub", &["Road", "Gravel"], "Aluminum", Some(300.5)))
        .unwrap();

    assert!(created.id > 0);
    assert_eq!(created.article_number, "HUB-001");
    assert_eq!(created.created_date, created.last_modified_date);

    let fetched = store.get(created.id).unwrap().unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.bicycle_categories, vec!["Road", "Gravel"]);
}

#[test]
fn test_get_missing_returns_none() {
    let store = ArticleStore::open_in_memory().unwrap();
    assert!(store.get(42).unwrap().is_none());
}

#[test]
fn test_create_rejects_invalid_input() {
    let mut store = ArticleStore::open_in_memory().unwrap();
    let err = store
        .create(input("", "Hub", "Hub", &[], "Aluminum", None))
        .unwrap_err();
    assert!(matches!(err, ArticleError::Validation(ref m) if m.len() == 2));
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_create_rejects_duplicate_article_number() {
    let mut store = populated_store();
    let err = store
        .create(input("HUB-001", "Another", "Hub", &["Road"], "Steel", None))
        .unwrap_err();
    assert!(matches!(err, ArticleError::DuplicateArticleNumber(ref n) if n == "HUB-001"));
}

#[test]
fn test_update_keeps_created_date_and_bumps_modified() {
    let mut store = populated_store();
    let original = store.find_by_article_number("HUB-002").unwrap().unwrap();

    let mut changes = original.to_input();
    changes.name = "Campagnolo Super Record Hub".to_string();
    changes.bicycle_categories = vec!["Road".to_string(), "Gravel".to_string()];
    let updated = store.update(original.id, changes).unwrap();

    assert_eq!(updated.name, "Campagnolo Super Record Hub");
    assert_eq!(updated.created_date, original.created_date);
    assert!(updated.last_modified_date >= original.last_modified_date);
    assert_eq!(store.get(original.id).unwrap().unwrap(), updated);
}

#[test]
fn test_update_missing_is_not_found() {
    let mut store = ArticleStore::open_in_memory().unwrap();
    let err = store
        .update(99, input("HUB-001", "Hub", "Hub", &["Road"], "Aluminum", None))
        .unwrap_err();
    assert!(matches!(err, ArticleError::NotFound(99)));
}

#[test]
fn test_update_to_taken_article_number_is_duplicate() {
    let mut store = populated_store();
    let hub = store.find_by_article_number("HUB-002").unwrap().unwrap();
    let mut changes = hub.to_input();
    changes.article_number = "HUB-001".to_string();

    let err = store.update(hub.id, changes).unwrap_err();
    assert!(matches!(err, ArticleError::DuplicateArticleNumber(_)));
}

#[test]
fn test_delete_reports_existence() {
    let mut store = populated_store();
    let hub = store.find_by_article_number("HUB-001").unwrap().unwrap();

    assert!(store.delete(hub.id).unwrap());
    assert!(!store.delete(hub.id).unwrap());
    assert_eq!(store.count().unwrap(), 3);
}

#[test]
fn test_list_defaults_to_id_order() {
    let store = populated_store();
    let page = store.list(&ArticleQuery::new()).unwrap();

    assert_eq!(numbers(&page), vec!["HUB-001", "HUB-002", "CRANK-001", "WHEEL-001"]);
    assert_eq!(page.total_count, 4);
    assert_eq!(page.page, 1);
    assert_eq!(page.page_size, DEFAULT_PAGE_SIZE);
    assert_eq!(page.total_pages, 1);
    assert!(!page.has_next_page);
    assert!(!page.has_previous_page);
}

#[test]
fn test_list_filters_by_category_and_material() {
    let store = populated_store();

    let hubs = store.list(&ArticleQuery::new().with_article_category("Hub")).unwrap();
    assert_eq!(numbers(&hubs), vec!["HUB-001", "HUB-002"]);

    let aluminum_hubs = store
        .list(&ArticleQuery::new().with_article_category("Hub").with_material("Aluminum"))
        .unwrap();
    assert_eq!(numbers(&aluminum_hubs), vec!["HUB-001"]);

    // Exact match only
    let partial = store.list(&ArticleQuery::new().with_material("Alu")).unwrap();
    assert_eq!(partial.total_count, 0);
}

#[test]
fn test_list_bicycle_categories_match_any_whole_value() {
    let store = populated_store();

    let road = store.list(&ArticleQuery::new().with_bicycle_categories("Road")).unwrap();
    assert_eq!(numbers(&road), vec!["HUB-002"]);

    let either = store
        .list(&ArticleQuery::new().with_bicycle_categories("Road, Gravel"))
        .unwrap();
    assert_eq!(numbers(&either), vec!["HUB-002", "CRANK-001"]);

    let gravel = store.list(&ArticleQuery::new().with_bicycle_categories("Gravel")).unwrap();
    assert_eq!(numbers(&gravel), vec!["CRANK-001"]);
}

#[test]
fn test_list_search_is_case_insensitive_over_number_and_name() {
    let store = populated_store();

    let by_name = store.list(&ArticleQuery::new().with_search_term("SHIMANO")).unwrap();
    assert_eq!(numbers(&by_name), vec!["HUB-001"]);

    let by_number = store.list(&ArticleQuery::new().with_search_term("crank-")).unwrap();
    assert_eq!(numbers(&by_number), vec!["CRANK-001"]);

    let both = store.list(&ArticleQuery::new().with_search_term("hub")).unwrap();
    assert_eq!(both.total_count, 2);
}

#[test]
fn test_search_matches_non_ascii_name_as_typed() {
    let mut store = populated_store();
    store
        .create(input("HUB-900", "ÜBERLEICHT Nabe", "Hub", &["Road"], "Carbon Fiber", None))
        .unwrap();

    let exact = store.list(&ArticleQuery::new().with_search_term("ÜBERLEICHT")).unwrap();
    assert_eq!(numbers(&exact), vec!["HUB-900"]);

    let ascii_folded = store.list(&ArticleQuery::new().with_search_term("Überleicht NABE")).unwrap();
    assert_eq!(numbers(&ascii_folded), vec!["HUB-900"]);
}

#[test]
fn test_list_sorts_with_direction_and_tie_break() {
    let store = populated_store();

    let by_name_desc = store
        .list(&ArticleQuery::new().sorted_by(SortField::Name, SortDirection::Desc))
        .unwrap();
    assert_eq!(
        numbers(&by_name_desc),
        vec!["HUB-001", "CRANK-001", "WHEEL-001", "HUB-002"]
    );

    // Equal categories fall back to id order
    let by_category = store
        .list(&ArticleQuery::new().sorted_by(SortField::ArticleCategory, SortDirection::Asc))
        .unwrap();
    assert_eq!(
        numbers(&by_category),
        vec!["CRANK-001", "HUB-001", "HUB-002", "WHEEL-001"]
    );

    // NULL weights sort first ascending
    let by_weight = store
        .list(&ArticleQuery::new().sorted_by(SortField::NetWeightG, SortDirection::Asc))
        .unwrap();
    assert_eq!(
        numbers(&by_weight),
        vec!["CRANK-001", "HUB-002", "HUB-001", "WHEEL-001"]
    );
}

#[test]
fn test_list_paginates() {
    let store = populated_store();

    let first = store.list(&ArticleQuery::new().page(1, 3)).unwrap();
    assert_eq!(numbers(&first), vec!["HUB-001", "HUB-002", "CRANK-001"]);
    assert_eq!(first.total_pages, 2);
    assert!(first.has_next_page);
    assert!(!first.has_previous_page);

    let second = store.list(&ArticleQuery::new().page(2, 3)).unwrap();
    assert_eq!(numbers(&second), vec!["WHEEL-001"]);
    assert!(!second.has_next_page);
    assert!(second.has_previous_page);
    assert_eq!(second.first_index(), 4);
    assert_eq!(second.last_index(), 4);

    let beyond = store.list(&ArticleQuery::new().page(9, 3)).unwrap();
    assert!(beyond.articles.is_empty());
    assert_eq!(beyond.total_count, 4);
}

#[test]
fn test_list_honours_paging_limits() {
    let store = populated_store().with_paging(PagingLimits {
        default_page_size: 2,
        max_page_size: 3,
    });

    let defaulted = store.list(&ArticleQuery::new()).unwrap();
    assert_eq!(defaulted.page_size, 2);
    assert_eq!(defaulted.articles.len(), 2);

    let clamped = store.list(&ArticleQuery::new().page(0, 50)).unwrap();
    assert_eq!(clamped.page, 1);
    assert_eq!(clamped.page_size, 3);
}

#[test]
fn test_lookups_are_distinct_and_sorted() {
    let store = populated_store();

    assert_eq!(store.article_categories().unwrap(), vec!["Crank", "Hub", "Wheel"]);
    assert_eq!(store.materials().unwrap(), vec!["Aluminum", "Carbon Fiber", "Steel"]);
    assert_eq!(
        store.bicycle_categories().unwrap(),
        vec!["Gravel", "Mountain", "Road", "Roadster"]
    );
}

#[test]
fn test_version_one_database_is_migrated() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("legacy.db");

    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                article_number TEXT NOT NULL,
                name TEXT NOT NULL,
                article_category TEXT NOT NULL,
                bicycle_category TEXT NOT NULL,
                material TEXT NOT NULL,
                length_mm REAL,
                width_mm REAL,
                height_mm REAL,
                net_weight_g REAL,
                created_date TEXT NOT NULL,
                last_modified_date TEXT NOT NULL
            );
            CREATE UNIQUE INDEX idx_articles_article_number ON articles(article_number);
            CREATE INDEX idx_articles_bicycle_category ON articles(bicycle_category);
            "#,
        )
        .unwrap();
        conn.execute(
            "INSERT INTO articles (article_number, name, article_category, bicycle_category, material, created_date, last_modified_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params!["FORK-001", "RockShox Pike", "Fork", " Mountain ", "Aluminum", "2024-12-21T00:00:00.000000Z"],
        )
        .unwrap();
    }

    let store = ArticleStore::open(&path).unwrap();
    assert_eq!(store.schema_version().unwrap(), SCHEMA_VERSION);

    let fork = store.find_by_article_number("FORK-001").unwrap().unwrap();
    assert_eq!(fork.bicycle_categories, vec!["Mountain"]);
    assert_eq!(store.bicycle_categories().unwrap(), vec!["Mountain"]);
}

#[test]
fn test_newer_schema_is_rejected() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("future.db");
    ArticleStore::open(&path).unwrap();

    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute("UPDATE schema_version SET version = ?1", params![SCHEMA_VERSION + 1])
            .unwrap();
    }

    let err = ArticleStore::open(&path).err().unwrap();
    assert!(matches!(err, ArticleError::UnsupportedSchema(v) if v == SCHEMA_VERSION + 1));
}

#[test]
fn test_transaction_rolls_back_on_error() {
    let mut store = populated_store();

    let result: Result<(), ArticleError> = store.transaction(|store| {
        store.create(input("FORK-001", "RockShox Pike", "Fork", &["Mountain"], "Aluminum", None))?;
        store.create(input("HUB-001", "Duplicate Hub", "Hub", &["Road"], "Steel", None))?;
        Ok(())
    });

    assert!(matches!(result, Err(ArticleError::DuplicateArticleNumber(_))));
    assert!(store.find_by_article_number("FORK-001").unwrap().is_none());
    assert_eq!(store.count().unwrap(), 4);
}

#[test]
fn test_transaction_commits_on_success() {
    let mut store = populated_store();

    let created = store
        .transaction(|store| store.create(input("FORK-001", "RockShox Pike", "Fork", &["Mountain"], "Aluminum", None)))
        .unwrap();

    assert_eq!(store.get(created.id).unwrap().unwrap().article_number, "FORK-001");
    assert_eq!(store.count().unwrap(), 5);
}

#[test]
fn test_import_failure_mid_write_leaves_store_untouched() {
    use crate::core::import::{import_csv, ImportOptions};

    let mut store = populated_store();
    store
        .conn
        .execute_batch(
            "CREATE TRIGGER reject_brake BEFORE INSERT ON articles
             WHEN NEW.article_number = 'BRAKE-001'
             BEGIN SELECT RAISE(ABORT, 'brake rejected'); END;",
        )
        .unwrap();

    let data = "article_number,name,article_category,bicycle_categories,material\n\
        FORK-001,RockShox Pike,Fork,Mountain,Aluminum\n\
        BRAKE-001,Magura MT5,Brake,Mountain,Aluminum\n";
    let result = import_csv(&mut store, data.as_bytes(), ImportOptions::default());

    assert!(matches!(result, Err(ArticleError::Database(_))));
    assert!(store.find_by_article_number("FORK-001").unwrap().is_none());
    assert_eq!(store.count().unwrap(), 4);
}
