//! Article domain activities - business logic functions over the store

pub mod browse;
pub mod edit;
pub mod review;

pub use browse::{facet_options, fetch_page, FacetOptions, FetchedPage};
pub use edit::persist_edit;
pub use review::persist_decision;
