// Mock implementations for testing
//
// MockArticleStore keeps articles in memory, evaluates queries with the same
// exact-match semantics as the Postgres store, and records every write so
// tests can assert on what was (or wasn't) persisted.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use super::BaseArticleStore;
use crate::common::{ArticleId, StoreError};
use crate::domains::articles::models::{
    Article, ArticleQuery, ArticleReviewStatus, SortKey, SummaryStatus,
};

/// Failure to inject into the next write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Store unreachable
    Connection,
    /// Behave as if the article had been deleted concurrently
    NotFound,
}

impl MockFailure {
    fn into_error(self, article_id: ArticleId) -> StoreError {
        match self {
            MockFailure::Connection => StoreError::Connection(sqlx::Error::PoolTimedOut),
            MockFailure::NotFound => StoreError::NotFound { article_id },
        }
    }
}

/// A content write that reached the mock store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentEdit {
    Title(ArticleId, Option<String>),
    Summary(ArticleId, Option<String>),
    Content(ArticleId, String),
}

/// Arguments captured from a fetch_page call
#[derive(Debug, Clone, PartialEq)]
pub struct FetchCall {
    pub query: ArticleQuery,
    pub sort: SortKey,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Default)]
pub struct MockArticleStore {
    articles: Arc<Mutex<Vec<Article>>>,
    summary_updates: Arc<Mutex<Vec<(ArticleId, SummaryStatus)>>>,
    article_updates: Arc<Mutex<Vec<(ArticleId, ArticleReviewStatus)>>>,
    content_edits: Arc<Mutex<Vec<ContentEdit>>>,
    count_calls: Arc<Mutex<Vec<ArticleQuery>>>,
    fetch_calls: Arc<Mutex<Vec<FetchCall>>>,
    next_failure: Arc<Mutex<Option<MockFailure>>>,
    count_drift: Arc<Mutex<i64>>,
}

impl MockArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_article(self, article: Article) -> Self {
        self.insert(article);
        self
    }

    pub fn with_articles(self, articles: impl IntoIterator<Item = Article>) -> Self {
        for article in articles {
            self.insert(article);
        }
        self
    }

    /// Make `count` report `delta` more (or fewer) articles than exist,
    /// as if another process inserted or removed rows between reads.
    pub fn with_count_drift(self, delta: i64) -> Self {
        *self.count_drift.lock().unwrap() = delta;
        self
    }

    pub fn insert(&self, article: Article) {
        self.articles.lock().unwrap().push(article);
    }

    /// Remove an article, as a concurrent process might.
    pub fn remove(&self, article_id: ArticleId) -> Option<Article> {
        let mut articles = self.articles.lock().unwrap();
        let position = articles.iter().position(|a| a.id == article_id)?;
        Some(articles.remove(position))
    }

    /// Fail the next update with the given error
    pub fn fail_next_update(&self, failure: MockFailure) {
        *self.next_failure.lock().unwrap() = Some(failure);
    }

    /// Current stored copy of an article
    pub fn stored(&self, article_id: ArticleId) -> Option<Article> {
        self.articles
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == article_id)
            .cloned()
    }

    /// All summary status writes that reached the store, in order
    pub fn summary_updates(&self) -> Vec<(ArticleId, SummaryStatus)> {
        self.summary_updates.lock().unwrap().clone()
    }

    /// All article review status writes that reached the store, in order
    pub fn article_updates(&self) -> Vec<(ArticleId, ArticleReviewStatus)> {
        self.article_updates.lock().unwrap().clone()
    }

    /// All title, summary and content writes that reached the store, in order
    pub fn content_edits(&self) -> Vec<ContentEdit> {
        self.content_edits.lock().unwrap().clone()
    }

    pub fn count_calls(&self) -> Vec<ArticleQuery> {
        self.count_calls.lock().unwrap().clone()
    }

    pub fn fetch_calls(&self) -> Vec<FetchCall> {
        self.fetch_calls.lock().unwrap().clone()
    }

    fn take_failure(&self) -> Option<MockFailure> {
        self.next_failure.lock().unwrap().take()
    }

    /// Record an edit, then apply it unless a failure is pending.
    fn edit(
        &self,
        edit: ContentEdit,
        article_id: ArticleId,
        apply: impl FnOnce(&mut Article),
    ) -> Result<(), StoreError> {
        self.content_edits.lock().unwrap().push(edit);

        if let Some(failure) = self.take_failure() {
            return Err(failure.into_error(article_id));
        }

        let mut articles = self.articles.lock().unwrap();
        let article = articles
            .iter_mut()
            .find(|a| a.id == article_id)
            .ok_or(StoreError::NotFound { article_id })?;
        apply(article);
        Ok(())
    }

    fn matching(&self, query: &ArticleQuery) -> Vec<Article> {
        self.articles
            .lock()
            .unwrap()
            .iter()
            .filter(|a| query.matches(a))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl BaseArticleStore for MockArticleStore {
    async fn count(&self, query: &ArticleQuery) -> Result<i64, StoreError> {
        self.count_calls.lock().unwrap().push(query.clone());
        let drift = *self.count_drift.lock().unwrap();
        Ok((self.matching(query).len() as i64 + drift).max(0))
    }

    async fn fetch_page(
        &self,
        query: &ArticleQuery,
        sort: SortKey,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Article>, StoreError> {
        self.fetch_calls.lock().unwrap().push(FetchCall {
            query: query.clone(),
            sort,
            offset,
            limit,
        });

        let mut matching = self.matching(query);
        matching.sort_by(|a, b| sort.compare(a, b));
        Ok(matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn find_by_id(&self, article_id: ArticleId) -> Result<Option<Article>, StoreError> {
        Ok(self.stored(article_id))
    }

    async fn update_summary_status(
        &self,
        article_id: ArticleId,
        status: SummaryStatus,
    ) -> Result<(), StoreError> {
        self.summary_updates
            .lock()
            .unwrap()
            .push((article_id, status));

        if let Some(failure) = self.take_failure() {
            return Err(failure.into_error(article_id));
        }

        let mut articles = self.articles.lock().unwrap();
        let article = articles
            .iter_mut()
            .find(|a| a.id == article_id)
            .ok_or(StoreError::NotFound { article_id })?;

        if article.content_summary.is_none() || status == SummaryStatus::None {
            return Err(StoreError::NoSummary { article_id });
        }

        article.summary_status = status;
        Ok(())
    }

    async fn update_article_review_status(
        &self,
        article_id: ArticleId,
        status: ArticleReviewStatus,
    ) -> Result<(), StoreError> {
        self.article_updates
            .lock()
            .unwrap()
            .push((article_id, status));

        if let Some(failure) = self.take_failure() {
            return Err(failure.into_error(article_id));
        }

        let mut articles = self.articles.lock().unwrap();
        let article = articles
            .iter_mut()
            .find(|a| a.id == article_id)
            .ok_or(StoreError::NotFound { article_id })?;
        article.article_review_status = status;
        Ok(())
    }

    async fn update_title(
        &self,
        article_id: ArticleId,
        title: Option<&str>,
    ) -> Result<(), StoreError> {
        let title = title.map(str::to_string);
        self.edit(
            ContentEdit::Title(article_id, title.clone()),
            article_id,
            |article| article.current_title = title,
        )
    }

    async fn update_summary(
        &self,
        article_id: ArticleId,
        summary: Option<&str>,
    ) -> Result<(), StoreError> {
        let summary = summary.map(str::to_string);
        self.edit(
            ContentEdit::Summary(article_id, summary.clone()),
            article_id,
            |article| article.replace_summary(summary),
        )
    }

    async fn update_content(&self, article_id: ArticleId, content: &str) -> Result<(), StoreError> {
        self.edit(
            ContentEdit::Content(article_id, content.to_string()),
            article_id,
            |article| article.content = content.to_string(),
        )
    }

    async fn distinct_years(&self, query: &ArticleQuery) -> Result<Vec<i32>, StoreError> {
        let mut years: Vec<i32> = self.matching(query).iter().map(|a| a.year).collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        years.dedup();
        Ok(years)
    }

    async fn distinct_editions(&self, query: &ArticleQuery) -> Result<Vec<String>, StoreError> {
        let mut editions: Vec<String> = self
            .matching(query)
            .into_iter()
            .map(|a| a.pdf_name)
            .collect();
        editions.sort();
        editions.dedup();
        Ok(editions)
    }

    async fn distinct_authors(&self) -> Result<Vec<String>, StoreError> {
        let mut authors: Vec<String> = self
            .articles
            .lock()
            .unwrap()
            .iter()
            .filter_map(|a| a.author.clone())
            .collect();
        authors.sort();
        authors.dedup();
        Ok(authors)
    }
}
