use tracing::{info, warn};

use crate::common::{ArticleId, StoreError};
use crate::domains::articles::machines::EditField;
use crate::kernel::BaseArticleStore;

/// Write a confirmed edit. `value` is already normalized; `None` clears
/// the title or summary.
pub async fn persist_edit(
    store: &dyn BaseArticleStore,
    article_id: ArticleId,
    field: EditField,
    value: Option<&str>,
) -> Result<(), StoreError> {
    let result = match field {
        EditField::Title => store.update_title(article_id, value).await,
        EditField::Summary => store.update_summary(article_id, value).await,
        EditField::Content => {
            store
                .update_content(article_id, value.unwrap_or_default())
                .await
        }
    };

    match &result {
        Ok(()) => info!(
            article_id = %article_id,
            field = %field,
            cleared = value.is_none(),
            "Edit saved"
        ),
        Err(error) => warn!(
            article_id = %article_id,
            field = %field,
            retryable = error.is_retryable(),
            error = %error,
            "Edit failed"
        ),
    }

    result
}
