use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use typed_builder::TypedBuilder;

use super::query::{ArticleQuery, SortKey};
use crate::common::ArticleId;

/// Article - one extracted magazine article plus its optional AI summary
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, TypedBuilder)]
pub struct Article {
    #[builder(default)]
    pub id: ArticleId,
    #[builder(setter(into))]
    pub title: String,
    /// Reviewer's revised title; `None` until someone edits it.
    #[builder(default, setter(strip_option, into))]
    pub current_title: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub author: Option<String>,
    pub year: i32,

    // Edition: the source PDF (magazine issue) the article was extracted from
    #[builder(setter(into))]
    pub pdf_name: String,

    // Content
    #[builder(default, setter(into))]
    pub content: String,
    #[builder(default, setter(strip_option, into))]
    pub content_summary: Option<String>,

    // Review state
    #[builder(default = SummaryStatus::for_summary(content_summary.as_deref()))]
    pub summary_status: SummaryStatus,
    #[builder(default)]
    pub article_review_status: ArticleReviewStatus,
    #[builder(default)]
    pub best_byte: bool,

    /// Structured AI review of the summary, produced upstream. Read-only here.
    #[builder(default, setter(strip_option))]
    pub ai_review: Option<serde_json::Value>,

    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
    #[builder(default = Utc::now())]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Enums
// =============================================================================

/// Review status of an article's AI summary.
///
/// `None` exactly when the article has no summary yet.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "summary_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SummaryStatus {
    None,
    PendingReview,
    Accepted,
    Rejected,
}

impl SummaryStatus {
    pub const ALL: [SummaryStatus; 4] = [
        SummaryStatus::None,
        SummaryStatus::PendingReview,
        SummaryStatus::Accepted,
        SummaryStatus::Rejected,
    ];

    /// Initial status for a freshly ingested article.
    pub fn for_summary(summary: Option<&str>) -> Self {
        match summary {
            Some(_) => SummaryStatus::PendingReview,
            None => SummaryStatus::None,
        }
    }
}

impl std::fmt::Display for SummaryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryStatus::None => write!(f, "none"),
            SummaryStatus::PendingReview => write!(f, "pending_review"),
            SummaryStatus::Accepted => write!(f, "accepted"),
            SummaryStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for SummaryStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "no_summary" | "no summary" => Ok(SummaryStatus::None),
            "pending_review" | "pending review" | "pending" => Ok(SummaryStatus::PendingReview),
            "accepted" => Ok(SummaryStatus::Accepted),
            "rejected" => Ok(SummaryStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid summary status: {}", s)),
        }
    }
}

/// Review status of the extracted original article.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    sqlx::Type,
    Default,
)]
#[sqlx(type_name = "article_review_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ArticleReviewStatus {
    #[default]
    PendingReview,
    Accepted,
    Rejected,
}

impl std::fmt::Display for ArticleReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArticleReviewStatus::PendingReview => write!(f, "pending_review"),
            ArticleReviewStatus::Accepted => write!(f, "accepted"),
            ArticleReviewStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for ArticleReviewStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending_review" | "pending review" | "pending" => {
                Ok(ArticleReviewStatus::PendingReview)
            }
            "accepted" => Ok(ArticleReviewStatus::Accepted),
            "rejected" => Ok(ArticleReviewStatus::Rejected),
            _ => Err(anyhow::anyhow!("Invalid article review status: {}", s)),
        }
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Article {
    pub fn has_summary(&self) -> bool {
        self.summary_status != SummaryStatus::None
    }

    /// Title to show: the revised one if set, else the extracted one.
    pub fn display_title(&self) -> &str {
        self.current_title.as_deref().unwrap_or(&self.title)
    }

    /// Replace the summary, keeping `summary_status` consistent with it.
    ///
    /// Clearing the summary resets the status to `none`; a first summary
    /// starts at `pending_review`; editing an existing one keeps its status.
    /// `set_content_summary` applies the same rule in SQL.
    pub fn replace_summary(&mut self, summary: Option<String>) {
        self.summary_status = match (&summary, self.summary_status) {
            (None, _) => SummaryStatus::None,
            (Some(_), SummaryStatus::None) => SummaryStatus::PendingReview,
            (Some(_), status) => status,
        };
        self.content_summary = summary;
    }

    /// Find article by ID
    pub async fn find_by_id(id: ArticleId, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Article>("SELECT * FROM articles WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(id: ArticleId, pool: &PgPool) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM articles WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Count articles matching a query (for pagination)
    pub async fn count_matching(query: &ArticleQuery, pool: &PgPool) -> sqlx::Result<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM articles");
        query.push_where(&mut builder);
        builder.build_query_scalar::<i64>().fetch_one(pool).await
    }

    /// One page of matching articles in a deterministic order
    pub async fn find_page(
        query: &ArticleQuery,
        sort: SortKey,
        offset: i64,
        limit: i64,
        pool: &PgPool,
    ) -> sqlx::Result<Vec<Self>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM articles");
        query.push_where(&mut builder);
        builder.push(" ORDER BY ");
        builder.push(sort.order_by());
        builder.push(" LIMIT ");
        builder.push_bind(limit.max(0));
        builder.push(" OFFSET ");
        builder.push_bind(offset.max(0));

        builder.build_query_as::<Article>().fetch_all(pool).await
    }

    /// Set the summary review status.
    ///
    /// Only touches articles that have a summary, and never sets `none`.
    /// Setting the status the row already has leaves `updated_at` alone.
    /// Returns `None` when no row matched.
    pub async fn set_summary_status(
        id: ArticleId,
        status: SummaryStatus,
        pool: &PgPool,
    ) -> sqlx::Result<Option<ArticleId>> {
        sqlx::query_scalar::<_, ArticleId>(
            r#"
            UPDATE articles
            SET summary_status = $1,
                updated_at = CASE WHEN summary_status = $1 THEN updated_at ELSE NOW() END
            WHERE id = $2
              AND content_summary IS NOT NULL
              AND $1 <> 'none'::summary_status
            RETURNING id
            "#,
        )
        .bind(status)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Set the original article review status. Returns `None` when no row matched.
    pub async fn set_article_review_status(
        id: ArticleId,
        status: ArticleReviewStatus,
        pool: &PgPool,
    ) -> sqlx::Result<Option<ArticleId>> {
        sqlx::query_scalar::<_, ArticleId>(
            r#"
            UPDATE articles
            SET article_review_status = $1,
                updated_at = CASE WHEN article_review_status = $1 THEN updated_at ELSE NOW() END
            WHERE id = $2
            RETURNING id
            "#,
        )
        .bind(status)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Set or clear the revised title. Returns `None` when no row matched.
    pub async fn set_current_title(
        id: ArticleId,
        title: Option<&str>,
        pool: &PgPool,
    ) -> sqlx::Result<Option<ArticleId>> {
        sqlx::query_scalar::<_, ArticleId>(
            r#"
            UPDATE articles
            SET current_title = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Replace or clear the summary, moving `summary_status` with it
    /// (see `replace_summary`). Returns `None` when no row matched.
    pub async fn set_content_summary(
        id: ArticleId,
        summary: Option<&str>,
        pool: &PgPool,
    ) -> sqlx::Result<Option<ArticleId>> {
        sqlx::query_scalar::<_, ArticleId>(
            r#"
            UPDATE articles
            SET content_summary = $1::text,
                summary_status = CASE
                    WHEN $1::text IS NULL THEN 'none'::summary_status
                    WHEN summary_status = 'none' THEN 'pending_review'::summary_status
                    ELSE summary_status
                END,
                updated_at = NOW()
            WHERE id = $2
            RETURNING id
            "#,
        )
        .bind(summary)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Replace the article body. Returns `None` when no row matched.
    pub async fn set_content(
        id: ArticleId,
        content: &str,
        pool: &PgPool,
    ) -> sqlx::Result<Option<ArticleId>> {
        sqlx::query_scalar::<_, ArticleId>(
            r#"
            UPDATE articles
            SET content = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id
            "#,
        )
        .bind(content)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Distinct years among matching articles, newest first
    pub async fn distinct_years(query: &ArticleQuery, pool: &PgPool) -> sqlx::Result<Vec<i32>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT DISTINCT year FROM articles");
        query.push_where(&mut builder);
        builder.push(" ORDER BY year DESC");
        builder.build_query_scalar::<i32>().fetch_all(pool).await
    }

    /// Distinct editions among matching articles
    pub async fn distinct_editions(
        query: &ArticleQuery,
        pool: &PgPool,
    ) -> sqlx::Result<Vec<String>> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT DISTINCT pdf_name FROM articles");
        query.push_where(&mut builder);
        builder.push(" ORDER BY pdf_name");
        builder.build_query_scalar::<String>().fetch_all(pool).await
    }

    pub async fn distinct_authors(pool: &PgPool) -> sqlx::Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT author FROM articles WHERE author IS NOT NULL ORDER BY author",
        )
        .fetch_all(pool)
        .await
    }
}
