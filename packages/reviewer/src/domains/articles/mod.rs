//! Articles domain - browsing extracted magazine articles and reviewing their summaries

pub mod activities;
pub mod filters;
pub mod machines;
pub mod models;
pub mod session;

pub use filters::{resolve, FilterSelection, FilterValue, RawFilters};
pub use machines::{
    ConfirmationPolicy, EditField, EditMachine, EditState, ReviewDecision, ReviewError,
    ReviewMachine, ReviewState, ReviewTarget,
};
pub use models::{Article, ArticleQuery, ArticleReviewStatus, SortKey, SummaryStatus};
pub use session::{PageView, ReviewSession};
