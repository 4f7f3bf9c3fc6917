//! Review session workflow tests
//!
//! Run against the in-memory MockArticleStore, so these need no database.

mod common;

use std::collections::HashSet;

use crate::common::{article, summarized_article};
use reviewer_core::common::{ArticleId, StoreError};
use reviewer_core::domains::articles::{
    ArticleReviewStatus, ConfirmationPolicy, EditField, EditState, FilterSelection, RawFilters,
    ReviewDecision, ReviewError, ReviewSession, ReviewState, ReviewTarget, SummaryStatus,
};
use reviewer_core::kernel::{ContentEdit, MockArticleStore, MockFailure};

const EDITION: &str = "HFN-2022-05.pdf";

fn strict_session(page_size: i64) -> ReviewSession {
    ReviewSession::new(page_size, ConfirmationPolicy::default())
}

fn lenient_session(page_size: i64) -> ReviewSession {
    ReviewSession::new(
        page_size,
        ConfirmationPolicy {
            confirm_accept: false,
        },
    )
}

fn store_with(count: usize) -> MockArticleStore {
    MockArticleStore::new().with_articles((0..count).map(|_| summarized_article(2022, EDITION)))
}

/// Store with one reviewable article, loaded into the session's visible page.
async fn loaded_single(session: &mut ReviewSession) -> (MockArticleStore, ArticleId) {
    let item = summarized_article(2022, EDITION);
    let id = item.id;
    let store = MockArticleStore::new().with_article(item);
    session
        .load_page(&store, FilterSelection::any(), Some(1))
        .await
        .expect("load page");
    (store, id)
}

// ============================================================================
// Browsing
// ============================================================================

#[tokio::test]
async fn year_filter_counts_only_matching_articles() {
    let store = MockArticleStore::new().with_articles([
        article(2021, EDITION),
        article(2022, EDITION),
        article(2022, EDITION),
        article(2023, EDITION),
    ]);
    let mut session = strict_session(10);

    let view = session
        .load_page(&store, FilterSelection::any().with_year(2022), Some(1))
        .await
        .unwrap();

    assert_eq!(view.total_count, 2);
    assert_eq!(view.articles.len(), 2);
    assert!(view.articles.iter().all(|a| a.year == 2022));
    assert_eq!(store.count_calls().last().unwrap().year, Some(2022));
}

#[tokio::test]
async fn requested_page_past_the_end_is_clamped() {
    let store = store_with(23);
    let mut session = strict_session(10);

    let view = session
        .load_page(&store, FilterSelection::any(), Some(5))
        .await
        .unwrap();

    assert_eq!(view.page, 3);
    assert_eq!(view.total_pages, 3);
    assert_eq!(view.articles.len(), 3);
    assert!(view.has_previous);
    assert!(!view.has_next);

    let fetch = store.fetch_calls().pop().unwrap();
    assert_eq!(fetch.offset, 20);
    assert_eq!(fetch.limit, 10);
}

#[tokio::test]
async fn empty_result_set_is_one_empty_page() {
    let store = MockArticleStore::new();
    let mut session = strict_session(10);

    let view = session
        .load_page(&store, FilterSelection::any(), Some(3))
        .await
        .unwrap();

    assert_eq!(view.page, 1);
    assert_eq!(view.total_pages, 1);
    assert_eq!(view.total_count, 0);
    assert!(view.articles.is_empty());
    assert!(!view.has_previous && !view.has_next);
}

#[tokio::test]
async fn narrowing_filters_clamps_current_page() {
    let mut articles: Vec<_> = (0..30).map(|_| summarized_article(2021, EDITION)).collect();
    articles.extend((0..4).map(|_| summarized_article(2023, EDITION)));
    let store = MockArticleStore::new().with_articles(articles);
    let mut session = strict_session(10);

    let view = session
        .load_page(&store, FilterSelection::any(), Some(4))
        .await
        .unwrap();
    assert_eq!(view.page, 4);

    let view = session
        .load_page(&store, FilterSelection::any().with_year(2023), None)
        .await
        .unwrap();
    assert_eq!(view.page, 1);
    assert_eq!(view.total_count, 4);
    assert_eq!(session.filters().year.as_option(), Some(&2023));
}

#[tokio::test]
async fn walking_pages_visits_every_article_once() {
    let store = store_with(25);
    let mut session = strict_session(10);

    let mut view = session
        .load_page(&store, FilterSelection::any(), Some(1))
        .await
        .unwrap();
    let mut seen: HashSet<ArticleId> = view.articles.iter().map(|a| a.id).collect();
    while view.has_next {
        view = session.next_page(&store).await.unwrap();
        seen.extend(view.articles.iter().map(|a| a.id));
    }
    assert_eq!(seen.len(), 25);
    assert_eq!(view.page, 3);

    let view = session.previous_page(&store).await.unwrap();
    assert_eq!(view.page, 2);
}

#[tokio::test]
async fn malformed_raw_filter_is_ignored_for_that_field_only() {
    let store = MockArticleStore::new().with_articles([
        article(2021, EDITION),
        article(2022, "HFN-2022-06.pdf"),
    ]);
    let mut session = strict_session(10);
    let selection = FilterSelection::from_raw(&RawFilters {
        year: Some("not a year".into()),
        edition: Some(EDITION.into()),
        ..Default::default()
    });

    let view = session.load_page(&store, selection, Some(1)).await.unwrap();
    assert_eq!(view.total_count, 1);
    assert_eq!(view.articles[0].year, 2021);
}

#[tokio::test]
async fn count_drift_returns_what_the_fetch_found() {
    let store = store_with(5).with_count_drift(3);
    let mut session = strict_session(10);

    let view = session
        .load_page(&store, FilterSelection::any(), Some(1))
        .await
        .unwrap();

    assert_eq!(view.total_count, 8);
    assert_eq!(view.articles.len(), 5);
}

#[tokio::test]
async fn facets_ignore_their_own_filter() {
    let store = MockArticleStore::new().with_articles([
        summarized_article(2021, "HFN-2021-01.pdf"),
        summarized_article(2022, "HFN-2022-01.pdf"),
        summarized_article(2022, "HFN-2022-02.pdf"),
        article(2023, "HFN-2023-01.pdf"),
    ]);
    let mut session = strict_session(10);
    session
        .load_page(&store, FilterSelection::any().with_year(2022), Some(1))
        .await
        .unwrap();

    let facets = session.facet_options(&store).await.unwrap();
    assert_eq!(facets.years, vec![2023, 2022, 2021]);
    assert_eq!(facets.editions, vec!["HFN-2022-01.pdf", "HFN-2022-02.pdf"]);
    assert_eq!(facets.authors, vec!["Kamlesh Patel"]);
    assert_eq!((facets.with_summary, facets.without_summary), (3, 1));
}

#[tokio::test]
async fn have_summary_filter_spans_every_review_status() {
    let mut accepted = summarized_article(2022, EDITION);
    accepted.summary_status = SummaryStatus::Accepted;
    let mut rejected = summarized_article(2022, EDITION);
    rejected.summary_status = SummaryStatus::Rejected;
    let store = MockArticleStore::new().with_articles([
        accepted,
        rejected,
        summarized_article(2022, EDITION),
        article(2022, EDITION),
    ]);
    let mut session = strict_session(10);

    let with_summary = FilterSelection::from_raw(&RawFilters {
        has_summary: Some("✅ Yes (3 articles)".into()),
        ..Default::default()
    });
    let view = session.load_page(&store, with_summary, Some(1)).await.unwrap();
    assert_eq!(view.total_count, 3);
    assert!(view.articles.iter().all(|a| a.content_summary.is_some()));

    let view = session
        .load_page(&store, FilterSelection::any().with_has_summary(false), Some(1))
        .await
        .unwrap();
    assert_eq!(view.total_count, 1);
    assert_eq!(view.articles[0].summary_status, SummaryStatus::None);
}

#[tokio::test]
async fn settled_reviews_are_dropped_when_their_article_leaves_the_page() {
    let mut articles: Vec<_> = (0..4).map(|_| summarized_article(2022, EDITION)).collect();
    articles.sort_by_key(|a| a.id);
    let (first, second) = (articles[0].id, articles[1].id);
    let store = MockArticleStore::new().with_articles(articles);
    let mut session = lenient_session(2);
    session
        .load_page(&store, FilterSelection::any(), Some(1))
        .await
        .unwrap();

    session
        .request_review(&store, first, ReviewTarget::Summary, ReviewDecision::Accept)
        .await
        .unwrap();
    session
        .request_review(&store, second, ReviewTarget::Summary, ReviewDecision::Reject)
        .await
        .unwrap();
    session.request_edit(first, EditField::Title, "Revised");
    session.cancel_edit(first, EditField::Title).unwrap();

    // Reloading the same page keeps everything
    session.refresh(&store).await.unwrap();
    assert_eq!(session.review_state(first, ReviewTarget::Summary).name(), "committed");
    assert_eq!(session.edit_state(first, EditField::Title).name(), "cancelled");

    session.next_page(&store).await.unwrap();
    assert_eq!(session.review_state(first, ReviewTarget::Summary).name(), "idle");
    assert_eq!(session.edit_state(first, EditField::Title).name(), "idle");
    // Still waiting for confirmation, so it survives the page change
    assert!(session
        .review_state(second, ReviewTarget::Summary)
        .is_awaiting_confirmation());
}

// ============================================================================
// Reviewing
// ============================================================================

#[tokio::test]
async fn reject_then_cancel_never_writes() {
    let mut session = strict_session(10);
    let (store, id) = loaded_single(&mut session).await;

    let state = session
        .request_review(&store, id, ReviewTarget::Summary, ReviewDecision::Reject)
        .await
        .unwrap();
    assert_eq!(state.pending_decision(), Some(ReviewDecision::Reject));

    let state = session.cancel_review(id, ReviewTarget::Summary).unwrap();
    assert!(matches!(state, ReviewState::Cancelled));
    assert!(store.summary_updates().is_empty());
    assert_eq!(
        store.stored(id).unwrap().summary_status,
        SummaryStatus::PendingReview
    );
}

#[tokio::test]
async fn reject_then_confirm_writes_once() {
    let mut session = strict_session(10);
    let (store, id) = loaded_single(&mut session).await;

    session
        .request_review(&store, id, ReviewTarget::Summary, ReviewDecision::Reject)
        .await
        .unwrap();
    let state = session
        .confirm_review(&store, id, ReviewTarget::Summary)
        .await
        .unwrap();

    assert!(matches!(
        state,
        ReviewState::Committed {
            decision: ReviewDecision::Reject
        }
    ));
    assert_eq!(store.summary_updates(), vec![(id, SummaryStatus::Rejected)]);
    assert_eq!(
        session.visible_articles()[0].summary_status,
        SummaryStatus::Rejected
    );

    // A new request starts a fresh cycle instead of reusing the old confirmation
    let state = session
        .request_review(&store, id, ReviewTarget::Summary, ReviewDecision::Reject)
        .await
        .unwrap();
    assert!(state.is_awaiting_confirmation());
    assert_eq!(store.summary_updates().len(), 1);
}

#[tokio::test]
async fn confirming_twice_does_not_write_twice() {
    let mut session = strict_session(10);
    let (store, id) = loaded_single(&mut session).await;

    session
        .request_review(&store, id, ReviewTarget::Summary, ReviewDecision::Reject)
        .await
        .unwrap();
    session
        .confirm_review(&store, id, ReviewTarget::Summary)
        .await
        .unwrap();
    let second = session
        .confirm_review(&store, id, ReviewTarget::Summary)
        .await;

    assert!(matches!(second, Err(ReviewError::NothingPending { .. })));
    assert_eq!(store.summary_updates().len(), 1);
}

#[tokio::test]
async fn repeated_request_replaces_pending_decision() {
    let mut session = strict_session(10);
    let (store, id) = loaded_single(&mut session).await;

    session
        .request_review(&store, id, ReviewTarget::Summary, ReviewDecision::Reject)
        .await
        .unwrap();
    session
        .request_review(&store, id, ReviewTarget::Summary, ReviewDecision::Accept)
        .await
        .unwrap();
    session
        .confirm_review(&store, id, ReviewTarget::Summary)
        .await
        .unwrap();

    assert_eq!(store.summary_updates(), vec![(id, SummaryStatus::Accepted)]);
}

#[tokio::test]
async fn article_deleted_before_confirm_fails_with_its_id() {
    let mut session = strict_session(10);
    let (store, id) = loaded_single(&mut session).await;

    session
        .request_review(&store, id, ReviewTarget::Summary, ReviewDecision::Reject)
        .await
        .unwrap();
    store.remove(id);

    let err = session
        .confirm_review(&store, id, ReviewTarget::Summary)
        .await
        .unwrap_err();
    assert!(matches!(
        err.store_error(),
        Some(StoreError::NotFound { article_id }) if *article_id == id
    ));
    assert!(err.to_string().contains(&id.to_string()));

    match session.review_state(id, ReviewTarget::Summary) {
        ReviewState::Failed { decision, error } => {
            assert_eq!(decision, ReviewDecision::Reject);
            assert!(!error.is_retryable());
        }
        other => panic!("expected Failed, got {:?}", other),
    }
    assert_eq!(
        session.visible_articles()[0].summary_status,
        SummaryStatus::PendingReview
    );
}

#[tokio::test]
async fn connection_failure_is_retryable() {
    let mut session = strict_session(10);
    let (store, id) = loaded_single(&mut session).await;

    session
        .request_review(&store, id, ReviewTarget::Summary, ReviewDecision::Reject)
        .await
        .unwrap();
    store.fail_next_update(MockFailure::Connection);

    let err = session
        .confirm_review(&store, id, ReviewTarget::Summary)
        .await
        .unwrap_err();
    assert!(err.store_error().unwrap().is_retryable());
    assert_eq!(session.review_state(id, ReviewTarget::Summary).name(), "failed");

    // Retrying is a fresh request and confirmation
    session
        .request_review(&store, id, ReviewTarget::Summary, ReviewDecision::Reject)
        .await
        .unwrap();
    session
        .confirm_review(&store, id, ReviewTarget::Summary)
        .await
        .unwrap();
    assert_eq!(
        store.stored(id).unwrap().summary_status,
        SummaryStatus::Rejected
    );
}

#[tokio::test]
async fn accept_is_idempotent() {
    let mut session = lenient_session(10);
    let (store, id) = loaded_single(&mut session).await;

    for _ in 0..2 {
        let state = session
            .request_review(&store, id, ReviewTarget::Summary, ReviewDecision::Accept)
            .await
            .unwrap();
        assert!(matches!(
            state,
            ReviewState::Committed {
                decision: ReviewDecision::Accept
            }
        ));
    }

    assert_eq!(
        store.stored(id).unwrap().summary_status,
        SummaryStatus::Accepted
    );
    assert_eq!(
        store.summary_updates(),
        vec![(id, SummaryStatus::Accepted), (id, SummaryStatus::Accepted)]
    );
}

#[tokio::test]
async fn accept_waits_for_confirmation_by_default() {
    let mut session = strict_session(10);
    let (store, id) = loaded_single(&mut session).await;

    let state = session
        .request_review(&store, id, ReviewTarget::Summary, ReviewDecision::Accept)
        .await
        .unwrap();

    assert!(state.is_awaiting_confirmation());
    assert!(store.summary_updates().is_empty());
}

#[tokio::test]
async fn reject_waits_for_confirmation_even_when_accept_does_not() {
    let mut session = lenient_session(10);
    let (store, id) = loaded_single(&mut session).await;

    let state = session
        .request_review(&store, id, ReviewTarget::Summary, ReviewDecision::Reject)
        .await
        .unwrap();

    assert!(state.is_awaiting_confirmation());
    assert!(store.summary_updates().is_empty());
}

#[tokio::test]
async fn articles_have_independent_review_state() {
    let first = summarized_article(2022, EDITION);
    let second = summarized_article(2022, EDITION);
    let (first_id, second_id) = (first.id, second.id);
    let store = MockArticleStore::new().with_articles([first, second]);
    let mut session = strict_session(10);
    session
        .load_page(&store, FilterSelection::any(), Some(1))
        .await
        .unwrap();

    session
        .request_review(&store, first_id, ReviewTarget::Summary, ReviewDecision::Reject)
        .await
        .unwrap();
    session
        .request_review(&store, second_id, ReviewTarget::Summary, ReviewDecision::Accept)
        .await
        .unwrap();
    session
        .cancel_review(first_id, ReviewTarget::Summary)
        .unwrap();
    session
        .confirm_review(&store, second_id, ReviewTarget::Summary)
        .await
        .unwrap();

    assert_eq!(
        session.review_state(first_id, ReviewTarget::Summary).name(),
        "cancelled"
    );
    assert_eq!(
        session.review_state(second_id, ReviewTarget::Summary).name(),
        "committed"
    );
    assert_eq!(
        store.summary_updates(),
        vec![(second_id, SummaryStatus::Accepted)]
    );
}

#[tokio::test]
async fn summary_and_article_targets_are_independent() {
    let mut session = strict_session(10);
    let (store, id) = loaded_single(&mut session).await;

    session
        .request_review(&store, id, ReviewTarget::Summary, ReviewDecision::Reject)
        .await
        .unwrap();
    session
        .request_review(&store, id, ReviewTarget::Article, ReviewDecision::Accept)
        .await
        .unwrap();
    session
        .confirm_review(&store, id, ReviewTarget::Article)
        .await
        .unwrap();

    assert!(session
        .review_state(id, ReviewTarget::Summary)
        .is_awaiting_confirmation());
    assert_eq!(
        store.article_updates(),
        vec![(id, ArticleReviewStatus::Accepted)]
    );
    assert!(store.summary_updates().is_empty());
    assert_eq!(
        session.visible_articles()[0].article_review_status,
        ArticleReviewStatus::Accepted
    );
}

#[tokio::test]
async fn confirm_or_cancel_without_request_is_an_error() {
    let mut session = strict_session(10);
    let (store, id) = loaded_single(&mut session).await;

    let confirm = session
        .confirm_review(&store, id, ReviewTarget::Summary)
        .await;
    assert!(matches!(confirm, Err(ReviewError::NothingPending { .. })));
    assert!(session.cancel_review(id, ReviewTarget::Summary).is_err());
    assert_eq!(session.review_state(id, ReviewTarget::Summary).name(), "idle");
}

#[tokio::test]
async fn summary_review_of_unsummarized_article_fails() {
    let item = article(2022, EDITION);
    let id = item.id;
    let store = MockArticleStore::new().with_article(item);
    let mut session = lenient_session(10);

    let err = session
        .request_review(&store, id, ReviewTarget::Summary, ReviewDecision::Accept)
        .await
        .unwrap_err();

    assert!(matches!(
        err.store_error(),
        Some(StoreError::NoSummary { .. })
    ));
    assert_eq!(store.stored(id).unwrap().summary_status, SummaryStatus::None);
}

#[tokio::test]
async fn committed_decision_shows_after_refresh() {
    let mut session = lenient_session(10);
    let (store, id) = loaded_single(&mut session).await;

    session
        .request_review(&store, id, ReviewTarget::Summary, ReviewDecision::Accept)
        .await
        .unwrap();
    let view = session.refresh(&store).await.unwrap();

    assert_eq!(view.articles[0].summary_status, SummaryStatus::Accepted);

    let view = session
        .load_page(
            &store,
            FilterSelection::any().with_summary_status(SummaryStatus::PendingReview),
            None,
        )
        .await
        .unwrap();
    assert_eq!(view.total_count, 0);
}

// ============================================================================
// Editing
// ============================================================================

#[tokio::test]
async fn edit_is_written_only_after_final_confirmation() {
    let mut session = strict_session(10);
    let (store, id) = loaded_single(&mut session).await;

    let state = session.request_edit(id, EditField::Title, "  Letting Go  ");
    assert_eq!(state.pending_value(), Some(Some("Letting Go")));
    session.confirm_edit(id, EditField::Title).unwrap();
    assert!(store.content_edits().is_empty());

    let state = session
        .confirm_edit_final(&store, id, EditField::Title)
        .await
        .unwrap();
    assert!(matches!(state, EditState::Saved));
    assert_eq!(
        store.content_edits(),
        vec![ContentEdit::Title(id, Some("Letting Go".into()))]
    );
    assert_eq!(session.visible_articles()[0].display_title(), "Letting Go");
}

#[tokio::test]
async fn final_confirmation_needs_the_first_one() {
    let mut session = strict_session(10);
    let (store, id) = loaded_single(&mut session).await;

    session.request_edit(id, EditField::Content, "New body");
    let err = session
        .confirm_edit_final(&store, id, EditField::Content)
        .await
        .unwrap_err();
    assert!(matches!(err, ReviewError::NoEditPending { .. }));
    assert!(store.content_edits().is_empty());
}

#[tokio::test]
async fn edit_cancelled_at_second_step_never_writes() {
    let mut session = strict_session(10);
    let (store, id) = loaded_single(&mut session).await;

    session.request_edit(id, EditField::Content, "New body");
    session.confirm_edit(id, EditField::Content).unwrap();
    let state = session.cancel_edit(id, EditField::Content).unwrap();

    assert!(matches!(state, EditState::Cancelled));
    assert!(store.content_edits().is_empty());
    assert_eq!(store.stored(id).unwrap().content, "Extracted article text");
}

#[tokio::test]
async fn clearing_a_summary_resets_its_status() {
    let mut session = strict_session(10);
    let (store, id) = loaded_single(&mut session).await;

    session.request_edit(id, EditField::Summary, "   ");
    session.confirm_edit(id, EditField::Summary).unwrap();
    session
        .confirm_edit_final(&store, id, EditField::Summary)
        .await
        .unwrap();

    let stored = store.stored(id).unwrap();
    assert!(stored.content_summary.is_none());
    assert_eq!(stored.summary_status, SummaryStatus::None);
    assert_eq!(
        session.visible_articles()[0].summary_status,
        SummaryStatus::None
    );
}

#[tokio::test]
async fn first_summary_starts_pending_review_and_edits_keep_status() {
    let item = article(2022, EDITION);
    let id = item.id;
    let store = MockArticleStore::new().with_article(item);
    let mut session = lenient_session(10);

    for text in ["Draft summary", "Polished summary"] {
        session.request_edit(id, EditField::Summary, text);
        session.confirm_edit(id, EditField::Summary).unwrap();
        session
            .confirm_edit_final(&store, id, EditField::Summary)
            .await
            .unwrap();
        if text == "Draft summary" {
            assert_eq!(
                store.stored(id).unwrap().summary_status,
                SummaryStatus::PendingReview
            );
            session
                .request_review(&store, id, ReviewTarget::Summary, ReviewDecision::Accept)
                .await
                .unwrap();
        }
    }

    let stored = store.stored(id).unwrap();
    assert_eq!(stored.content_summary.as_deref(), Some("Polished summary"));
    assert_eq!(stored.summary_status, SummaryStatus::Accepted);
}

#[tokio::test]
async fn edit_of_deleted_article_fails_and_keeps_visible_text() {
    let mut session = strict_session(10);
    let (store, id) = loaded_single(&mut session).await;

    session.request_edit(id, EditField::Title, "Revised");
    session.confirm_edit(id, EditField::Title).unwrap();
    store.remove(id);

    let err = session
        .confirm_edit_final(&store, id, EditField::Title)
        .await
        .unwrap_err();
    assert!(matches!(
        err.store_error(),
        Some(StoreError::NotFound { article_id }) if *article_id == id
    ));
    assert_eq!(session.edit_state(id, EditField::Title).name(), "failed");
    assert!(session.visible_articles()[0].current_title.is_none());
}
