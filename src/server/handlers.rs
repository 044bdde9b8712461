//! HTTP request handlers for the article API

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::core::error::ArticleError;
use crate::core::store::{ArticlePage, ArticleQuery, ArticleStore, SortDirection, SortField};
use crate::entities::article::{Article, ArticleInput};

use super::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Success,
    Error,
}

/// Wrapper around every API response body
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    #[serde(rename = "type")]
    pub kind: ResponseType,
    pub result: Option<T>,
    pub error_messages: Option<Vec<String>>,
}

impl<T> Envelope<T> {
    pub fn success(result: T) -> Self {
        Self {
            kind: ResponseType::Success,
            result: Some(result),
            error_messages: None,
        }
    }

    pub fn error(messages: Vec<String>) -> Self {
        Self {
            kind: ResponseType::Error,
            result: None,
            error_messages: Some(messages),
        }
    }
}

/// Error response: status code plus the messages for the envelope
#[derive(Debug)]
pub(super) struct ApiError {
    status: StatusCode,
    messages: Vec<String>,
}

impl ApiError {
    pub(super) fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            messages: vec![message.into()],
        }
    }

    fn bad_request(messages: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            messages,
        }
    }
}

impl From<ArticleError> for ApiError {
    fn from(err: ArticleError) -> Self {
        let status = match &err {
            ArticleError::NotFound(_) => StatusCode::NOT_FOUND,
            ArticleError::Validation(_) => StatusCode::BAD_REQUEST,
            ArticleError::DuplicateArticleNumber(_) => StatusCode::CONFLICT,
            ArticleError::UnsupportedSchema(_)
            | ArticleError::Database(_)
            | ArticleError::Csv(_)
            | ArticleError::Io(_) => {
                error!("Internal error: {}", err);
                return Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred.",
                );
            }
        };
        Self {
            status,
            messages: err.messages(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(Envelope::<()>::error(self.messages))).into_response()
    }
}

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

/// Run a store operation on the blocking pool
async fn with_store<T, F>(state: &AppState, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut ArticleStore) -> Result<T, ArticleError> + Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || {
        let mut store = store.lock();
        op(&mut store)
    })
    .await
    .map_err(|e| {
        error!("store task failed: {}", e);
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred.")
    })?
    .map_err(ApiError::from)
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::bad_request(vec![format!("'{}' is not a valid article ID.", raw)]))
}

fn parse_body(body: Result<Json<ArticleInput>, JsonRejection>) -> Result<ArticleInput, ApiError> {
    match body {
        Ok(Json(input)) => Ok(input),
        Err(rejection) => {
            let status = match rejection {
                JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                _ => StatusCode::BAD_REQUEST,
            };
            Err(ApiError::new(status, rejection.body_text()))
        }
    }
}

/// Translate query-string pairs into an [`ArticleQuery`]
///
/// Keys are matched case-insensitively; `bicycleCategory` may repeat or hold
/// a comma-separated list. Unknown keys are ignored.
pub(super) fn parse_list_query(params: Vec<(String, String)>) -> Result<ArticleQuery, ApiError> {
    let mut query = ArticleQuery::new();
    let mut errors = Vec::new();

    for (key, value) in params {
        match key.to_ascii_lowercase().as_str() {
            "articlecategory" => query = query.with_article_category(value),
            "bicyclecategory" | "bicyclecategories" => {
                query = query.with_bicycle_categories(&value)
            }
            "material" => query = query.with_material(value),
            "searchterm" => query = query.with_search_term(value),
            "sortby" => query.sort = SortField::parse(&value),
            "sortdirection" => query.direction = SortDirection::parse(&value),
            "page" => query.page = parse_number("page", &value, &mut errors),
            "pagesize" => query.page_size = parse_number("pageSize", &value, &mut errors),
            other => debug!(key = other, "ignoring unknown query parameter"),
        }
    }

    if errors.is_empty() {
        Ok(query)
    } else {
        Err(ApiError::bad_request(errors))
    }
}

fn parse_number(name: &str, value: &str, errors: &mut Vec<String>) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.push(format!("{} must be a whole number.", name));
            None
        }
    }
}

// -- /api/articles --

pub(super) async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<ArticlePage> {
    let query = parse_list_query(params)?;
    let page = with_store(&state, move |store| store.list(&query)).await?;
    Ok(Json(Envelope::success(page)))
}

pub(super) async fn create_article(
    State(state): State<AppState>,
    body: Result<Json<ArticleInput>, JsonRejection>,
) -> Result<Response, ApiError> {
    let input = parse_body(body)?;
    let article = with_store(&state, move |store| store.create(input)).await?;

    let location = format!("/api/articles/{}", article.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(Envelope::success(article)),
    )
        .into_response())
}

// -- /api/articles/:id --

pub(super) async fn get_article(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Article> {
    let id = parse_id(&raw_id)?;
    let article = with_store(&state, move |store| {
        store.get(id)?.ok_or(ArticleError::NotFound(id))
    })
    .await?;
    Ok(Json(Envelope::success(article)))
}

pub(super) async fn update_article(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: Result<Json<ArticleInput>, JsonRejection>,
) -> ApiResult<Article> {
    let id = parse_id(&raw_id)?;
    let input = parse_body(body)?;
    let article = with_store(&state, move |store| store.update(id, input)).await?;
    Ok(Json(Envelope::success(article)))
}

pub(super) async fn delete_article(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<bool> {
    let id = parse_id(&raw_id)?;
    with_store(&state, move |store| {
        if store.delete(id)? {
            Ok(true)
        } else {
            Err(ArticleError::NotFound(id))
        }
    })
    .await?;
    Ok(Json(Envelope::success(true)))
}

// -- lookups --

pub(super) async fn article_categories(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let values = with_store(&state, |store| store.article_categories()).await?;
    Ok(Json(Envelope::success(values)))
}

pub(super) async fn bicycle_categories(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let values = with_store(&state, |store| store.bicycle_categories()).await?;
    Ok(Json(Envelope::success(values)))
}

pub(super) async fn materials(State(state): State<AppState>) -> ApiResult<Vec<String>> {
    let values = with_store(&state, |store| store.materials()).await?;
    Ok(Json(Envelope::success(values)))
}

// -- misc --

pub(super) async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub(super) async fn no_route() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "No route for this path.")
}

pub(super) async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed for this path.")
}
