use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};

use super::article::{Article, ArticleReviewStatus, SummaryStatus};

/// Exact-match predicate over article fields.
///
/// Each `Some` field is one clause; clauses are ANDed. The default query
/// has no clauses and matches every article. `authors` is a membership
/// clause and is kept sorted and deduplicated so equal selections produce
/// equal queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArticleQuery {
    pub year: Option<i32>,
    pub summary_status: Option<SummaryStatus>,
    /// Whether a summary exists at all, regardless of its review status
    pub has_summary: Option<bool>,
    pub pdf_name: Option<String>,
    pub authors: Vec<String>,
    pub best_byte: Option<bool>,
    pub article_review_status: Option<ArticleReviewStatus>,
}

impl ArticleQuery {
    /// Query matching every article
    pub fn all() -> Self {
        Self::default()
    }

    pub fn clause_count(&self) -> usize {
        usize::from(self.year.is_some())
            + usize::from(self.summary_status.is_some())
            + usize::from(self.has_summary.is_some())
            + usize::from(self.pdf_name.is_some())
            + usize::from(!self.authors.is_empty())
            + usize::from(self.best_byte.is_some())
            + usize::from(self.article_review_status.is_some())
    }

    pub fn is_unfiltered(&self) -> bool {
        self.clause_count() == 0
    }

    /// Append ` WHERE ...` for the present clauses (nothing when unfiltered).
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        let mut first = true;

        if let Some(year) = self.year {
            next_clause(builder, &mut first);
            builder.push("year = ").push_bind(year);
        }
        if let Some(status) = self.summary_status {
            next_clause(builder, &mut first);
            builder.push("summary_status = ").push_bind(status);
        }
        if let Some(has_summary) = self.has_summary {
            next_clause(builder, &mut first);
            builder.push(if has_summary {
                "content_summary IS NOT NULL"
            } else {
                "content_summary IS NULL"
            });
        }
        if let Some(pdf_name) = &self.pdf_name {
            next_clause(builder, &mut first);
            builder.push("pdf_name = ").push_bind(pdf_name.clone());
        }
        if !self.authors.is_empty() {
            next_clause(builder, &mut first);
            builder
                .push("author = ANY(")
                .push_bind(self.authors.clone())
                .push(")");
        }
        if let Some(best_byte) = self.best_byte {
            next_clause(builder, &mut first);
            builder.push("best_byte = ").push_bind(best_byte);
        }
        if let Some(status) = self.article_review_status {
            next_clause(builder, &mut first);
            builder.push("article_review_status = ").push_bind(status);
        }
    }

    /// In-memory evaluation of the same predicate `push_where` produces.
    pub fn matches(&self, article: &Article) -> bool {
        self.year.map_or(true, |year| article.year == year)
            && self
                .summary_status
                .map_or(true, |status| article.summary_status == status)
            && self
                .has_summary
                .map_or(true, |has| article.content_summary.is_some() == has)
            && self
                .pdf_name
                .as_ref()
                .map_or(true, |pdf_name| &article.pdf_name == pdf_name)
            && (self.authors.is_empty()
                || article
                    .author
                    .as_ref()
                    .is_some_and(|author| self.authors.contains(author)))
            && self
                .best_byte
                .map_or(true, |best_byte| article.best_byte == best_byte)
            && self
                .article_review_status
                .map_or(true, |status| article.article_review_status == status)
    }
}

fn next_clause(builder: &mut QueryBuilder<'_, Postgres>, first: &mut bool) {
    builder.push(if *first { " WHERE " } else { " AND " });
    *first = false;
}

/// Result ordering. Every key ends with the article id so ties never
/// reorder between calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    IdAsc,
    YearAsc,
    YearDesc,
}

impl SortKey {
    pub fn order_by(&self) -> &'static str {
        match self {
            SortKey::IdAsc => "id ASC",
            SortKey::YearAsc => "year ASC, id ASC",
            SortKey::YearDesc => "year DESC, id ASC",
        }
    }

    pub fn compare(&self, a: &Article, b: &Article) -> Ordering {
        let primary = match self {
            SortKey::IdAsc => Ordering::Equal,
            SortKey::YearAsc => a.year.cmp(&b.year),
            SortKey::YearDesc => b.year.cmp(&a.year),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

impl std::str::FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "id" | "id_asc" => Ok(SortKey::IdAsc),
            "year" | "year_asc" => Ok(SortKey::YearAsc),
            "year_desc" | "newest" => Ok(SortKey::YearDesc),
            _ => Err(anyhow::anyhow!("Invalid sort key: {}", s)),
        }
    }
}
