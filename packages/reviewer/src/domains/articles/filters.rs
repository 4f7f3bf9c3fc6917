//! Filter selection and its translation into an [`ArticleQuery`].
//!
//! A presentation layer hands us whatever its dropdowns produced. Sentinel
//! values ("All", "All Years", "any", empty) mean "don't filter on this
//! field"; anything else must map to a concrete field value. Values that
//! don't are logged and treated as "any" for that field only.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::common::ValidationError;
use crate::domains::articles::models::{ArticleQuery, ArticleReviewStatus, SummaryStatus};

/// One filter field: either unconstrained or an exact value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterValue<T> {
    #[default]
    Any,
    Exactly(T),
}

impl<T> FilterValue<T> {
    pub fn is_any(&self) -> bool {
        matches!(self, FilterValue::Any)
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            FilterValue::Any => None,
            FilterValue::Exactly(value) => Some(value),
        }
    }
}

impl<T> From<Option<T>> for FilterValue<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => FilterValue::Exactly(value),
            None => FilterValue::Any,
        }
    }
}

/// The reviewer's current filter choices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub year: FilterValue<i32>,
    pub summary_status: FilterValue<SummaryStatus>,
    pub has_summary: FilterValue<bool>,
    pub edition: FilterValue<String>,
    /// Empty means any author.
    pub authors: BTreeSet<String>,
    pub best_byte: FilterValue<bool>,
    pub article_review_status: FilterValue<ArticleReviewStatus>,
}

impl FilterSelection {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = FilterValue::Exactly(year);
        self
    }

    pub fn with_summary_status(mut self, status: SummaryStatus) -> Self {
        self.summary_status = FilterValue::Exactly(status);
        self
    }

    pub fn with_has_summary(mut self, has_summary: bool) -> Self {
        self.has_summary = FilterValue::Exactly(has_summary);
        self
    }

    pub fn with_edition(mut self, edition: impl Into<String>) -> Self {
        self.edition = FilterValue::Exactly(edition.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.insert(author.into());
        self
    }

    pub fn with_best_byte(mut self, best_byte: bool) -> Self {
        self.best_byte = FilterValue::Exactly(best_byte);
        self
    }

    pub fn with_article_review_status(mut self, status: ArticleReviewStatus) -> Self {
        self.article_review_status = FilterValue::Exactly(status);
        self
    }

    /// Normalize raw presentation-layer values. Never fails.
    pub fn from_raw(raw: &RawFilters) -> Self {
        FilterSelection {
            year: parse_field("year", raw.year.as_deref(), |s| s.parse::<i32>().ok()),
            summary_status: parse_field("summary_status", raw.summary_status.as_deref(), |s| {
                SummaryStatus::from_str(strip_decoration(s)).ok()
            }),
            has_summary: parse_field("has_summary", raw.has_summary.as_deref(), parse_flag),
            edition: parse_field("edition", raw.edition.as_deref(), |s| Some(s.to_string())),
            authors: raw
                .authors
                .iter()
                .map(|author| author.trim())
                .filter(|author| !is_sentinel(author))
                .map(str::to_string)
                .collect(),
            best_byte: parse_field("best_byte", raw.best_byte.as_deref(), parse_flag),
            article_review_status: parse_field(
                "article_review_status",
                raw.article_review_status.as_deref(),
                |s| ArticleReviewStatus::from_str(strip_decoration(s)).ok(),
            ),
        }
    }
}

/// Filter values exactly as a form or command line produced them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFilters {
    pub year: Option<String>,
    pub summary_status: Option<String>,
    pub has_summary: Option<String>,
    pub edition: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    pub best_byte: Option<String>,
    pub article_review_status: Option<String>,
}

/// Translate a selection into a store predicate. Pure.
pub fn resolve(selection: &FilterSelection) -> ArticleQuery {
    ArticleQuery {
        year: selection.year.as_option().copied(),
        summary_status: selection.summary_status.as_option().copied(),
        has_summary: selection.has_summary.as_option().copied(),
        pdf_name: selection.edition.as_option().cloned(),
        // BTreeSet iteration is sorted and unique
        authors: selection.authors.iter().cloned().collect(),
        best_byte: selection.best_byte.as_option().copied(),
        article_review_status: selection.article_review_status.as_option().copied(),
    }
}

// =============================================================================
// Raw value parsing
// =============================================================================

fn is_sentinel(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "all" | "any" | "all years" | "all editions" | "all authors" | "*"
    )
}

/// Dropdown labels may carry an emoji marker ("🟢 Accepted").
fn strip_decoration(value: &str) -> &str {
    value.trim_start_matches(|c: char| !c.is_ascii_alphanumeric())
}

/// Yes/no values, with or without a trailing count ("✅ Yes (12 articles)").
fn parse_flag(value: &str) -> Option<bool> {
    let value = strip_decoration(value);
    let value = value.split_once('(').map_or(value, |(label, _)| label);
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn parse_field<T>(
    field: &'static str,
    raw: Option<&str>,
    parse: impl Fn(&str) -> Option<T>,
) -> FilterValue<T> {
    let Some(raw) = raw else {
        return FilterValue::Any;
    };
    if is_sentinel(raw) {
        return FilterValue::Any;
    }

    match parse(raw.trim()) {
        Some(value) => FilterValue::Exactly(value),
        None => {
            let error = ValidationError {
                field,
                value: raw.to_string(),
            };
            warn!(field, value = %raw, error = %error, "Ignoring filter value");
            FilterValue::Any
        }
    }
}
