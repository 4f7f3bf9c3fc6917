// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Review and pagination logic lives in domains/articles and uses these traits.
//
// Naming convention: Base* for trait names (e.g., BaseArticleStore)

use async_trait::async_trait;

use crate::common::{ArticleId, StoreError};
use crate::domains::articles::models::{
    Article, ArticleQuery, ArticleReviewStatus, SortKey, SummaryStatus,
};

// =============================================================================
// Article Store Trait (Infrastructure - persistent article collection)
// =============================================================================

/// The persistent article collection.
///
/// Reads take an [`ArticleQuery`] of exact-match clauses. `count` and
/// `fetch_page` are separate reads without a shared snapshot, so callers
/// must tolerate the total drifting between them.
#[async_trait]
pub trait BaseArticleStore: Send + Sync {
    /// Number of articles matching the query
    async fn count(&self, query: &ArticleQuery) -> Result<i64, StoreError>;

    /// Matching articles ordered by `sort`, skipping `offset` and returning at most `limit`
    async fn fetch_page(
        &self,
        query: &ArticleQuery,
        sort: SortKey,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Article>, StoreError>;

    async fn find_by_id(&self, article_id: ArticleId) -> Result<Option<Article>, StoreError>;

    /// Set the summary review status of one article.
    ///
    /// Fails with `NotFound` if the article doesn't exist and `NoSummary` if
    /// it has no summary (or `status` is `none`). Writing the status the
    /// article already has succeeds.
    async fn update_summary_status(
        &self,
        article_id: ArticleId,
        status: SummaryStatus,
    ) -> Result<(), StoreError>;

    /// Set the review status of the original article. Fails with `NotFound`.
    async fn update_article_review_status(
        &self,
        article_id: ArticleId,
        status: ArticleReviewStatus,
    ) -> Result<(), StoreError>;

    /// Set (`Some`) or clear (`None`) the revised title. Fails with `NotFound`.
    async fn update_title(
        &self,
        article_id: ArticleId,
        title: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Replace or clear the summary. `summary_status` follows: clearing sets
    /// `none`, a first summary sets `pending_review`, anything else keeps the
    /// current status. Fails with `NotFound`.
    async fn update_summary(
        &self,
        article_id: ArticleId,
        summary: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Replace the article body. Fails with `NotFound`.
    async fn update_content(&self, article_id: ArticleId, content: &str) -> Result<(), StoreError>;

    /// Distinct years among matching articles, newest first
    async fn distinct_years(&self, query: &ArticleQuery) -> Result<Vec<i32>, StoreError>;

    /// Distinct editions (PDF names) among matching articles
    async fn distinct_editions(&self, query: &ArticleQuery) -> Result<Vec<String>, StoreError>;

    /// Every known author, sorted
    async fn distinct_authors(&self) -> Result<Vec<String>, StoreError>;
}
