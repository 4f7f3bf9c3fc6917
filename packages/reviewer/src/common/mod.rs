// Common types and utilities shared across the application

pub mod entity_ids;
pub mod errors;
pub mod id;
pub mod pagination;

pub use entity_ids::*;
pub use errors::{ConfigError, StoreError, ValidationError};
pub use pagination::{compute_window, total_pages, PageState, PageWindow};
