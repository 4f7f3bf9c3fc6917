//! Review decision and content edit state machines
//!
//! Pure decision logic - NO IO, only state transitions. The machine tells
//! the caller when to persist (`ReviewCommand::Persist`) and is told the
//! outcome afterwards (`record_outcome`); it never calls the store itself.
//!
//! ```text
//! Idle ──request──▶ AwaitingConfirmation ──confirm──▶ (persist) ──▶ Committed | Failed
//!   │                     │
//!   │                     └──cancel──▶ Cancelled
//!   └──request(accept, no confirmation)──▶ (persist) ──▶ Committed | Failed
//! ```
//!
//! `Committed`, `Cancelled` and `Failed` behave like `Idle` for the next
//! `request`.

mod edit;

pub use edit::{EditCommand, EditField, EditMachine, EditState};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::{ArticleId, StoreError};
use crate::domains::articles::models::{ArticleReviewStatus, SummaryStatus};

/// What a decision applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewTarget {
    /// The AI-generated content summary
    Summary,
    /// The extracted original article
    Article,
}

impl std::fmt::Display for ReviewTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewTarget::Summary => write!(f, "summary"),
            ReviewTarget::Article => write!(f, "article"),
        }
    }
}

impl std::str::FromStr for ReviewTarget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summary" => Ok(ReviewTarget::Summary),
            "article" => Ok(ReviewTarget::Article),
            _ => Err(anyhow::anyhow!("Invalid review target: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Accept,
    Reject,
}

impl ReviewDecision {
    pub fn summary_status(&self) -> SummaryStatus {
        match self {
            ReviewDecision::Accept => SummaryStatus::Accepted,
            ReviewDecision::Reject => SummaryStatus::Rejected,
        }
    }

    pub fn article_review_status(&self) -> ArticleReviewStatus {
        match self {
            ReviewDecision::Accept => ArticleReviewStatus::Accepted,
            ReviewDecision::Reject => ArticleReviewStatus::Rejected,
        }
    }
}

impl std::fmt::Display for ReviewDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewDecision::Accept => write!(f, "accept"),
            ReviewDecision::Reject => write!(f, "reject"),
        }
    }
}

impl std::str::FromStr for ReviewDecision {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" | "accepted" => Ok(ReviewDecision::Accept),
            "reject" | "rejected" => Ok(ReviewDecision::Reject),
            _ => Err(anyhow::anyhow!("Invalid review decision: {}", s)),
        }
    }
}

/// Which decisions must be confirmed before they are persisted.
///
/// Reject always needs confirmation. Applies to every article and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationPolicy {
    pub confirm_accept: bool,
}

impl ConfirmationPolicy {
    pub fn requires_confirmation(&self, decision: ReviewDecision) -> bool {
        match decision {
            ReviewDecision::Reject => true,
            ReviewDecision::Accept => self.confirm_accept,
        }
    }
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            confirm_accept: true,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ReviewState {
    Idle,
    AwaitingConfirmation { decision: ReviewDecision },
    Committed { decision: ReviewDecision },
    Cancelled,
    Failed {
        decision: ReviewDecision,
        error: Arc<StoreError>,
    },
}

impl ReviewState {
    pub fn is_awaiting_confirmation(&self) -> bool {
        matches!(self, ReviewState::AwaitingConfirmation { .. })
    }

    pub fn pending_decision(&self) -> Option<ReviewDecision> {
        match self {
            ReviewState::AwaitingConfirmation { decision } => Some(*decision),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReviewState::Idle => "idle",
            ReviewState::AwaitingConfirmation { .. } => "awaiting_confirmation",
            ReviewState::Committed { .. } => "committed",
            ReviewState::Cancelled => "cancelled",
            ReviewState::Failed { .. } => "failed",
        }
    }
}

/// Side effect the caller must perform after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewCommand {
    Persist {
        article_id: ArticleId,
        target: ReviewTarget,
        decision: ReviewDecision,
    },
}

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error(transparent)]
    Store(Arc<StoreError>),

    #[error("No {target} decision awaiting confirmation for article {article_id}")]
    NothingPending {
        article_id: ArticleId,
        target: ReviewTarget,
    },

    #[error("No {field} edit awaiting confirmation for article {article_id}")]
    NoEditPending {
        article_id: ArticleId,
        field: EditField,
    },
}

impl ReviewError {
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            ReviewError::Store(error) => Some(error),
            ReviewError::NothingPending { .. } | ReviewError::NoEditPending { .. } => None,
        }
    }
}

/// Decision lifecycle for one (article, target) pair.
#[derive(Debug, Clone)]
pub struct ReviewMachine {
    article_id: ArticleId,
    target: ReviewTarget,
    state: ReviewState,
}

impl ReviewMachine {
    pub fn new(article_id: ArticleId, target: ReviewTarget) -> Self {
        Self {
            article_id,
            target,
            state: ReviewState::Idle,
        }
    }

    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    pub fn article_id(&self) -> ArticleId {
        self.article_id
    }

    pub fn target(&self) -> ReviewTarget {
        self.target
    }

    /// Ask for a decision. A repeated request while awaiting confirmation
    /// replaces the pending decision.
    pub fn request(
        &mut self,
        decision: ReviewDecision,
        policy: &ConfirmationPolicy,
    ) -> Option<ReviewCommand> {
        if policy.requires_confirmation(decision) {
            self.state = ReviewState::AwaitingConfirmation { decision };
            None
        } else {
            self.state = ReviewState::Idle;
            Some(self.persist(decision))
        }
    }

    /// Confirm the pending decision. State stays `AwaitingConfirmation`
    /// until the outcome is recorded.
    pub fn confirm(&self) -> Result<ReviewCommand, ReviewError> {
        match self.state {
            ReviewState::AwaitingConfirmation { decision } => Ok(self.persist(decision)),
            _ => Err(self.nothing_pending()),
        }
    }

    pub fn cancel(&mut self) -> Result<(), ReviewError> {
        if !self.state.is_awaiting_confirmation() {
            return Err(self.nothing_pending());
        }
        self.state = ReviewState::Cancelled;
        Ok(())
    }

    /// Record the result of persisting `decision`.
    pub fn record_outcome(
        &mut self,
        decision: ReviewDecision,
        outcome: Result<(), Arc<StoreError>>,
    ) {
        self.state = match outcome {
            Ok(()) => ReviewState::Committed { decision },
            Err(error) => ReviewState::Failed { decision, error },
        };
    }

    fn persist(&self, decision: ReviewDecision) -> ReviewCommand {
        ReviewCommand::Persist {
            article_id: self.article_id,
            target: self.target,
            decision,
        }
    }

    fn nothing_pending(&self) -> ReviewError {
        ReviewError::NothingPending {
            article_id: self.article_id,
            target: self.target,
        }
    }
}
