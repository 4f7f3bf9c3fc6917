//! Reviewer session state.
//!
//! Everything a presentation layer needs to keep between interactions lives
//! here: the filter selection, paging state, the visible page, one review
//! machine per (article, target) and one edit machine per (article, field).
//! Each call runs to completion before the next (`&mut self`), so there are
//! no overlapping requests within a session.
//!
//! Machines that have settled (committed, saved or cancelled) are dropped
//! once their article leaves the visible page. Pending and failed ones stay.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::common::{ArticleId, PageState, StoreError};
use crate::domains::articles::activities::{self, FacetOptions};
use crate::domains::articles::filters::{resolve, FilterSelection};
use crate::domains::articles::machines::{
    ConfirmationPolicy, EditCommand, EditField, EditMachine, EditState, ReviewCommand,
    ReviewDecision, ReviewError, ReviewMachine, ReviewState, ReviewTarget,
};
use crate::domains::articles::models::{Article, SortKey};
use crate::kernel::BaseArticleStore;

/// What the presentation layer renders after a page load.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub articles: Vec<Article>,
    pub page: i64,
    pub total_pages: i64,
    pub total_count: i64,
    pub has_previous: bool,
    pub has_next: bool,
}

pub struct ReviewSession {
    filters: FilterSelection,
    page: PageState,
    sort: SortKey,
    policy: ConfirmationPolicy,
    visible: Vec<Article>,
    reviews: HashMap<(ArticleId, ReviewTarget), ReviewMachine>,
    edits: HashMap<(ArticleId, EditField), EditMachine>,
}

impl ReviewSession {
    pub fn new(page_size: i64, policy: ConfirmationPolicy) -> Self {
        Self {
            filters: FilterSelection::any(),
            page: PageState::new(page_size),
            sort: SortKey::default(),
            policy,
            visible: Vec::new(),
            reviews: HashMap::new(),
            edits: HashMap::new(),
        }
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    pub fn filters(&self) -> &FilterSelection {
        &self.filters
    }

    pub fn page_state(&self) -> &PageState {
        &self.page
    }

    pub fn policy(&self) -> &ConfirmationPolicy {
        &self.policy
    }

    /// Articles from the last successful page load, with committed
    /// decisions applied.
    pub fn visible_articles(&self) -> &[Article] {
        &self.visible
    }

    // =========================================================================
    // Browsing
    // =========================================================================

    /// Apply `selection` and load `requested_page` (or the current page).
    ///
    /// The page is clamped against the total for the new selection, so a
    /// filter change that shrinks the result set lands on its last page.
    /// On error the session keeps its previous filters and page.
    pub async fn load_page(
        &mut self,
        store: &dyn BaseArticleStore,
        selection: FilterSelection,
        requested_page: Option<i64>,
    ) -> Result<PageView, StoreError> {
        let query = resolve(&selection);
        if selection != self.filters {
            info!(
                clauses = query.clause_count(),
                query = ?query,
                "Filters applied"
            );
        }

        let requested = requested_page.unwrap_or(self.page.page);
        let fetched =
            activities::fetch_page(store, &query, self.sort, self.page.page_size, requested)
                .await?;

        self.filters = selection;
        self.page.apply(fetched.total_count, &fetched.window);
        self.visible = fetched.articles;
        self.evict_settled();

        Ok(self.view())
    }

    /// Reload the current page with the current filters.
    pub async fn refresh(&mut self, store: &dyn BaseArticleStore) -> Result<PageView, StoreError> {
        let selection = self.filters.clone();
        self.load_page(store, selection, None).await
    }

    pub async fn next_page(
        &mut self,
        store: &dyn BaseArticleStore,
    ) -> Result<PageView, StoreError> {
        let selection = self.filters.clone();
        let next = self.page.window().next_page();
        self.load_page(store, selection, Some(next)).await
    }

    pub async fn previous_page(
        &mut self,
        store: &dyn BaseArticleStore,
    ) -> Result<PageView, StoreError> {
        let selection = self.filters.clone();
        let previous = self.page.window().previous_page();
        self.load_page(store, selection, Some(previous)).await
    }

    /// Dropdown values for the current selection.
    pub async fn facet_options(
        &self,
        store: &dyn BaseArticleStore,
    ) -> Result<FacetOptions, StoreError> {
        activities::facet_options(store, &self.filters).await
    }

    fn evict_settled(&mut self) {
        let visible: HashSet<ArticleId> = self.visible.iter().map(|a| a.id).collect();
        self.reviews.retain(|(article_id, _), machine| {
            visible.contains(article_id)
                || !matches!(
                    machine.state(),
                    ReviewState::Idle | ReviewState::Committed { .. } | ReviewState::Cancelled
                )
        });
        self.edits.retain(|(article_id, _), machine| {
            visible.contains(article_id)
                || !matches!(
                    machine.state(),
                    EditState::Idle | EditState::Saved | EditState::Cancelled
                )
        });
    }

    fn view(&self) -> PageView {
        let window = self.page.window();
        PageView {
            articles: self.visible.clone(),
            page: window.page,
            total_pages: window.total_pages,
            total_count: self.page.total_count,
            has_previous: window.has_previous(),
            has_next: window.has_next(),
        }
    }

    // =========================================================================
    // Reviewing
    // =========================================================================

    pub fn review_state(&self, article_id: ArticleId, target: ReviewTarget) -> ReviewState {
        self.reviews
            .get(&(article_id, target))
            .map(|machine| machine.state().clone())
            .unwrap_or(ReviewState::Idle)
    }

    /// Request a decision.
    ///
    /// Decisions that need confirmation only move the machine to
    /// `AwaitingConfirmation`; the store is untouched. Otherwise the
    /// decision is persisted right away.
    pub async fn request_review(
        &mut self,
        store: &dyn BaseArticleStore,
        article_id: ArticleId,
        target: ReviewTarget,
        decision: ReviewDecision,
    ) -> Result<ReviewState, ReviewError> {
        let policy = self.policy;
        let machine = self
            .reviews
            .entry((article_id, target))
            .or_insert_with(|| ReviewMachine::new(article_id, target));

        let command = machine.request(decision, &policy);
        info!(
            article_id = %article_id,
            target = %target,
            decision = %decision,
            requires_confirmation = command.is_none(),
            "Review decision requested"
        );

        match command {
            Some(command) => self.execute(store, command).await,
            None => Ok(machine.state().clone()),
        }
    }

    /// Persist the decision awaiting confirmation.
    ///
    /// On failure the machine moves to `Failed` and the store error is
    /// returned; the visible article keeps its previous status.
    pub async fn confirm_review(
        &mut self,
        store: &dyn BaseArticleStore,
        article_id: ArticleId,
        target: ReviewTarget,
    ) -> Result<ReviewState, ReviewError> {
        let command = match self.reviews.get(&(article_id, target)) {
            Some(machine) => machine.confirm()?,
            None => return Err(ReviewError::NothingPending { article_id, target }),
        };
        self.execute(store, command).await
    }

    /// Drop the decision awaiting confirmation without touching the store.
    pub fn cancel_review(
        &mut self,
        article_id: ArticleId,
        target: ReviewTarget,
    ) -> Result<ReviewState, ReviewError> {
        let machine = self
            .reviews
            .get_mut(&(article_id, target))
            .ok_or(ReviewError::NothingPending { article_id, target })?;
        machine.cancel()?;

        info!(article_id = %article_id, target = %target, "Review decision cancelled");
        Ok(machine.state().clone())
    }

    async fn execute(
        &mut self,
        store: &dyn BaseArticleStore,
        command: ReviewCommand,
    ) -> Result<ReviewState, ReviewError> {
        let ReviewCommand::Persist {
            article_id,
            target,
            decision,
        } = command;

        let outcome = activities::persist_decision(store, article_id, target, decision)
            .await
            .map_err(Arc::new);

        if outcome.is_ok() {
            self.apply_committed(article_id, target, decision);
        }

        let machine = self
            .reviews
            .entry((article_id, target))
            .or_insert_with(|| ReviewMachine::new(article_id, target));
        machine.record_outcome(decision, outcome.clone());

        match outcome {
            Ok(()) => Ok(machine.state().clone()),
            Err(error) => Err(ReviewError::Store(error)),
        }
    }

    fn apply_committed(
        &mut self,
        article_id: ArticleId,
        target: ReviewTarget,
        decision: ReviewDecision,
    ) {
        if let Some(article) = self.visible.iter_mut().find(|a| a.id == article_id) {
            match target {
                ReviewTarget::Summary => article.summary_status = decision.summary_status(),
                ReviewTarget::Article => {
                    article.article_review_status = decision.article_review_status()
                }
            }
        }
    }
}

impl ReviewSession {
    // =========================================================================
    // Editing
    // =========================================================================

    pub fn edit_state(&self, article_id: ArticleId, field: EditField) -> EditState {
        self.edits
            .get(&(article_id, field))
            .map(|machine| machine.state().clone())
            .unwrap_or(EditState::Idle)
    }

    /// Propose new text for a field. Nothing is written until both
    /// confirmations are given.
    pub fn request_edit(
        &mut self,
        article_id: ArticleId,
        field: EditField,
        value: &str,
    ) -> EditState {
        let machine = self
            .edits
            .entry((article_id, field))
            .or_insert_with(|| EditMachine::new(article_id, field));
        machine.request(value);

        info!(article_id = %article_id, field = %field, "Edit requested");
        machine.state().clone()
    }

    /// First confirmation ("are you sure?").
    pub fn confirm_edit(
        &mut self,
        article_id: ArticleId,
        field: EditField,
    ) -> Result<EditState, ReviewError> {
        let machine = self
            .edits
            .get_mut(&(article_id, field))
            .ok_or(ReviewError::NoEditPending { article_id, field })?;
        machine.confirm()?;
        Ok(machine.state().clone())
    }

    /// Final confirmation: writes the edit.
    ///
    /// On failure the machine moves to `Failed` and the visible article keeps
    /// its previous text.
    pub async fn confirm_edit_final(
        &mut self,
        store: &dyn BaseArticleStore,
        article_id: ArticleId,
        field: EditField,
    ) -> Result<EditState, ReviewError> {
        let command = match self.edits.get(&(article_id, field)) {
            Some(machine) => machine.confirm_final()?,
            None => return Err(ReviewError::NoEditPending { article_id, field }),
        };
        let EditCommand::Persist {
            article_id,
            field,
            value,
        } = command;

        let outcome = activities::persist_edit(store, article_id, field, value.as_deref())
            .await
            .map_err(Arc::new);

        if outcome.is_ok() {
            self.apply_edit(article_id, field, value);
        }

        let machine = self
            .edits
            .entry((article_id, field))
            .or_insert_with(|| EditMachine::new(article_id, field));
        machine.record_outcome(outcome.clone());

        match outcome {
            Ok(()) => Ok(machine.state().clone()),
            Err(error) => Err(ReviewError::Store(error)),
        }
    }

    pub fn cancel_edit(
        &mut self,
        article_id: ArticleId,
        field: EditField,
    ) -> Result<EditState, ReviewError> {
        let machine = self
            .edits
            .get_mut(&(article_id, field))
            .ok_or(ReviewError::NoEditPending { article_id, field })?;
        machine.cancel()?;

        info!(article_id = %article_id, field = %field, "Edit cancelled");
        Ok(machine.state().clone())
    }

    fn apply_edit(&mut self, article_id: ArticleId, field: EditField, value: Option<String>) {
        if let Some(article) = self.visible.iter_mut().find(|a| a.id == article_id) {
            match field {
                EditField::Title => article.current_title = value,
                EditField::Summary => article.replace_summary(value),
                EditField::Content => article.content = value.unwrap_or_default(),
            }
        }
    }
}

impl std::fmt::Debug for ReviewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReviewSession")
            .field("filters", &self.filters)
            .field("page", &self.page)
            .field("sort", &self.sort)
            .field("visible", &self.visible.len())
            .field("reviews", &self.reviews.len())
            .field("edits", &self.edits.len())
            .finish()
    }
}
