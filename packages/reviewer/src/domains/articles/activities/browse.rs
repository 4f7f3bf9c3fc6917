use serde::Serialize;
use tracing::{debug, info};

use crate::common::{compute_window, PageWindow, StoreError};
use crate::domains::articles::filters::{resolve, FilterSelection, FilterValue};
use crate::domains::articles::models::{Article, ArticleQuery, SortKey};
use crate::kernel::BaseArticleStore;

/// One fetched page plus the count it was windowed against.
#[derive(Debug, Clone, Serialize)]
pub struct FetchedPage {
    pub articles: Vec<Article>,
    pub window: PageWindow,
    pub total_count: i64,
}

/// Values available for the filter dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetOptions {
    pub years: Vec<i32>,
    pub editions: Vec<String>,
    pub authors: Vec<String>,
    /// Articles with and without a summary, for the "have summary" choice
    pub with_summary: i64,
    pub without_summary: i64,
}

/// Count, clamp the requested page, then fetch that window.
///
/// The count and the fetch are separate reads. If the collection changes in
/// between, the slice may be shorter or longer than the count implies; that
/// is logged and returned as-is.
pub async fn fetch_page(
    store: &dyn BaseArticleStore,
    query: &ArticleQuery,
    sort: SortKey,
    page_size: i64,
    requested_page: i64,
) -> Result<FetchedPage, StoreError> {
    let total_count = store.count(query).await?;
    let window = compute_window(total_count, page_size, requested_page);

    let articles = store
        .fetch_page(query, sort, window.offset, window.limit)
        .await?;

    let expected = (total_count - window.offset).clamp(0, window.limit);
    if articles.len() as i64 != expected {
        debug!(
            expected,
            fetched = articles.len(),
            total_count,
            page = window.page,
            "Result set changed between count and fetch"
        );
    }

    info!(
        page = window.page,
        total_pages = window.total_pages,
        total_count,
        fetched = articles.len(),
        "Page fetched"
    );

    Ok(FetchedPage {
        articles,
        window,
        total_count,
    })
}

/// Dropdown values given the current selection.
///
/// Years are narrowed by every other filter but not by the year itself, and
/// likewise for editions, so a reviewer can always switch to a sibling value.
/// Summary counts ignore the year as well.
pub async fn facet_options(
    store: &dyn BaseArticleStore,
    selection: &FilterSelection,
) -> Result<FacetOptions, StoreError> {
    let without_year = FilterSelection {
        year: FilterValue::Any,
        ..selection.clone()
    };
    let without_edition = FilterSelection {
        edition: FilterValue::Any,
        ..selection.clone()
    };

    let years = store.distinct_years(&resolve(&without_year)).await?;
    let editions = store.distinct_editions(&resolve(&without_edition)).await?;
    let authors = store.distinct_authors().await?;

    let summary_base = FilterSelection {
        has_summary: FilterValue::Any,
        ..without_year
    };
    let with_summary = store
        .count(&resolve(&summary_base.clone().with_has_summary(true)))
        .await?;
    let without_summary = store
        .count(&resolve(&summary_base.with_has_summary(false)))
        .await?;

    debug!(
        years = years.len(),
        editions = editions.len(),
        authors = authors.len(),
        with_summary,
        without_summary,
        "Facet options loaded"
    );

    Ok(FacetOptions {
        years,
        editions,
        authors,
        with_summary,
        without_summary,
    })
}
