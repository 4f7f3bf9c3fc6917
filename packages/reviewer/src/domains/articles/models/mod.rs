pub mod article;
pub mod query;

pub use article::{Article, ArticleReviewStatus, SummaryStatus};
pub use query::{ArticleQuery, SortKey};
