use tracing::{info, warn};

use crate::common::{ArticleId, StoreError};
use crate::domains::articles::machines::{ReviewDecision, ReviewTarget};
use crate::kernel::BaseArticleStore;

/// Write a review decision to the store.
///
/// Errors are returned unchanged; nothing here retries.
pub async fn persist_decision(
    store: &dyn BaseArticleStore,
    article_id: ArticleId,
    target: ReviewTarget,
    decision: ReviewDecision,
) -> Result<(), StoreError> {
    let result = match target {
        ReviewTarget::Summary => {
            store
                .update_summary_status(article_id, decision.summary_status())
                .await
        }
        ReviewTarget::Article => {
            store
                .update_article_review_status(article_id, decision.article_review_status())
                .await
        }
    };

    match &result {
        Ok(()) => info!(
            article_id = %article_id,
            target = %target,
            decision = %decision,
            "Review decision committed"
        ),
        Err(error) => warn!(
            article_id = %article_id,
            target = %target,
            decision = %decision,
            retryable = error.is_retryable(),
            error = %error,
            "Review decision failed"
        ),
    }

    result
}
