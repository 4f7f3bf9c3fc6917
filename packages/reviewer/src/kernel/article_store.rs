//! Postgres-backed article store.
//!
//! Thin adapter: the SQL lives on the `Article` model, this type maps
//! "no row matched" into the store error contract.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::common::{ArticleId, StoreError};
use crate::domains::articles::models::{
    Article, ArticleQuery, ArticleReviewStatus, SortKey, SummaryStatus,
};
use crate::kernel::BaseArticleStore;

#[derive(Clone)]
pub struct PgArticleStore {
    pool: PgPool,
}

impl PgArticleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BaseArticleStore for PgArticleStore {
    async fn count(&self, query: &ArticleQuery) -> Result<i64, StoreError> {
        Ok(Article::count_matching(query, &self.pool).await?)
    }

    async fn fetch_page(
        &self,
        query: &ArticleQuery,
        sort: SortKey,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Article>, StoreError> {
        Ok(Article::find_page(query, sort, offset, limit, &self.pool).await?)
    }

    async fn find_by_id(&self, article_id: ArticleId) -> Result<Option<Article>, StoreError> {
        Ok(Article::find_by_id(article_id, &self.pool).await?)
    }

    async fn update_summary_status(
        &self,
        article_id: ArticleId,
        status: SummaryStatus,
    ) -> Result<(), StoreError> {
        if Article::set_summary_status(article_id, status, &self.pool)
            .await?
            .is_some()
        {
            return Ok(());
        }

        // Nothing matched: tell a vanished article apart from one without a summary
        if Article::exists(article_id, &self.pool).await? {
            debug!(article_id = %article_id, status = %status, "Summary status write refused");
            Err(StoreError::NoSummary { article_id })
        } else {
            Err(StoreError::NotFound { article_id })
        }
    }

    async fn update_article_review_status(
        &self,
        article_id: ArticleId,
        status: ArticleReviewStatus,
    ) -> Result<(), StoreError> {
        match Article::set_article_review_status(article_id, status, &self.pool).await? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound { article_id }),
        }
    }

    async fn update_title(
        &self,
        article_id: ArticleId,
        title: Option<&str>,
    ) -> Result<(), StoreError> {
        match Article::set_current_title(article_id, title, &self.pool).await? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound { article_id }),
        }
    }

    async fn update_summary(
        &self,
        article_id: ArticleId,
        summary: Option<&str>,
    ) -> Result<(), StoreError> {
        match Article::set_content_summary(article_id, summary, &self.pool).await? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound { article_id }),
        }
    }

    async fn update_content(&self, article_id: ArticleId, content: &str) -> Result<(), StoreError> {
        match Article::set_content(article_id, content, &self.pool).await? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound { article_id }),
        }
    }

    async fn distinct_years(&self, query: &ArticleQuery) -> Result<Vec<i32>, StoreError> {
        Ok(Article::distinct_years(query, &self.pool).await?)
    }

    async fn distinct_editions(&self, query: &ArticleQuery) -> Result<Vec<String>, StoreError> {
        Ok(Article::distinct_editions(query, &self.pool).await?)
    }

    async fn distinct_authors(&self) -> Result<Vec<String>, StoreError> {
        Ok(Article::distinct_authors(&self.pool).await?)
    }
}
