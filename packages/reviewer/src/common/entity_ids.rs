//! Typed ID definitions for domain entities.

pub use super::id::Id;

/// Marker type for Article documents.
pub struct Article;

/// Typed ID for Article documents.
pub type ArticleId = Id<Article>;
