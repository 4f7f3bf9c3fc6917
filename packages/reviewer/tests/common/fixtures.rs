//! Test fixtures for creating articles.
//!
//! Articles are normally written by the ingestion pipeline, so inserts
//! live here rather than on the model.

use anyhow::Result;
use reviewer_core::domains::articles::{Article, ArticleReviewStatus, SummaryStatus};
use sqlx::PgPool;
use uuid::Uuid;

/// An edition name no other test uses.
pub fn unique_edition() -> String {
    format!("HFN-test-{}.pdf", Uuid::new_v4())
}

/// Article without a summary
pub fn article(year: i32, edition: &str) -> Article {
    Article::builder()
        .title(format!("Article from {}", year))
        .year(year)
        .pdf_name(edition)
        .content("Extracted article text")
        .build()
}

/// Article with a summary awaiting review
pub fn summarized_article(year: i32, edition: &str) -> Article {
    Article::builder()
        .title(format!("Summarized article from {}", year))
        .author("Kamlesh Patel")
        .year(year)
        .pdf_name(edition)
        .content("Extracted article text")
        .content_summary("A short AI summary")
        .ai_review(serde_json::json!({ "score": 0.8, "issues": [] }))
        .build()
}

pub fn with_summary_status(mut article: Article, status: SummaryStatus) -> Article {
    article.summary_status = status;
    article
}

pub fn with_article_status(mut article: Article, status: ArticleReviewStatus) -> Article {
    article.article_review_status = status;
    article
}

pub async fn insert_article(pool: &PgPool, article: &Article) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO articles (
            id, title, current_title, author, year, pdf_name, content,
            content_summary, summary_status, article_review_status, best_byte,
            ai_review, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(article.id)
    .bind(&article.title)
    .bind(&article.current_title)
    .bind(&article.author)
    .bind(article.year)
    .bind(&article.pdf_name)
    .bind(&article.content)
    .bind(&article.content_summary)
    .bind(article.summary_status)
    .bind(article.article_review_status)
    .bind(article.best_byte)
    .bind(&article.ai_review)
    .bind(article.created_at)
    .bind(article.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn insert_articles(pool: &PgPool, articles: &[Article]) -> Result<()> {
    for article in articles {
        insert_article(pool, article).await?;
    }
    Ok(())
}
