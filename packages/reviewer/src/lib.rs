// Heartfulness Article Review - Core
//
// Browse extracted magazine articles by year, edition and review status, page
// through the results, and record accept/reject decisions on their AI
// summaries. The presentation layer drives a `ReviewSession`; storage sits
// behind the `BaseArticleStore` trait.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
