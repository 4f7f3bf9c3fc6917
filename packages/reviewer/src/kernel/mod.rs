//! Kernel module - store infrastructure behind trait seams.

pub mod article_store;
pub mod test_dependencies;
pub mod traits;

pub use article_store::PgArticleStore;
pub use test_dependencies::{ContentEdit, FetchCall, MockArticleStore, MockFailure};
pub use traits::*;
