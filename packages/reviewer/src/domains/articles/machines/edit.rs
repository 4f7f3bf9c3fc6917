//! Content edit state machine
//!
//! Saving an edit overwrites text, so it takes two confirmations. Like the
//! review machine this never touches the store: `confirm_final` hands back
//! the write and `record_outcome` is told how it went.
//!
//! ```text
//! Idle ──request──▶ AwaitingConfirmation ──confirm──▶ AwaitingFinalConfirmation
//!                          │                                  │
//!                          └──cancel──▶ Cancelled ◀──cancel───┤
//!                                                             └──confirm_final──▶ (persist) ──▶ Saved | Failed
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::ReviewError;
use crate::common::{ArticleId, StoreError};

/// Editable article text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditField {
    /// Reviewer's revised title, shown instead of the extracted one
    Title,
    /// The AI-generated content summary
    Summary,
    /// The extracted article body
    Content,
}

impl EditField {
    /// Value to store for raw editor input.
    ///
    /// A blank title or summary clears the field. Content is stored as given.
    pub fn normalize(&self, value: &str) -> Option<String> {
        match self {
            EditField::Content => Some(value.to_string()),
            EditField::Title | EditField::Summary => {
                let trimmed = value.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
        }
    }
}

impl std::fmt::Display for EditField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditField::Title => write!(f, "title"),
            EditField::Summary => write!(f, "summary"),
            EditField::Content => write!(f, "content"),
        }
    }
}

impl std::str::FromStr for EditField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" | "current_title" => Ok(EditField::Title),
            "summary" | "content_summary" => Ok(EditField::Summary),
            "content" | "article" => Ok(EditField::Content),
            _ => Err(anyhow::anyhow!("Invalid edit field: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub enum EditState {
    Idle,
    AwaitingConfirmation { value: Option<String> },
    AwaitingFinalConfirmation { value: Option<String> },
    Saved,
    Cancelled,
    Failed { error: Arc<StoreError> },
}

impl EditState {
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            EditState::AwaitingConfirmation { .. } | EditState::AwaitingFinalConfirmation { .. }
        )
    }

    /// Normalized value waiting to be saved
    pub fn pending_value(&self) -> Option<Option<&str>> {
        match self {
            EditState::AwaitingConfirmation { value }
            | EditState::AwaitingFinalConfirmation { value } => Some(value.as_deref()),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditState::Idle => "idle",
            EditState::AwaitingConfirmation { .. } => "awaiting_confirmation",
            EditState::AwaitingFinalConfirmation { .. } => "awaiting_final_confirmation",
            EditState::Saved => "saved",
            EditState::Cancelled => "cancelled",
            EditState::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    Persist {
        article_id: ArticleId,
        field: EditField,
        value: Option<String>,
    },
}

/// Edit lifecycle for one (article, field) pair.
#[derive(Debug, Clone)]
pub struct EditMachine {
    article_id: ArticleId,
    field: EditField,
    state: EditState,
}

impl EditMachine {
    pub fn new(article_id: ArticleId, field: EditField) -> Self {
        Self {
            article_id,
            field,
            state: EditState::Idle,
        }
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn field(&self) -> EditField {
        self.field
    }

    /// Ask to save `value`. Replaces any edit still waiting for confirmation.
    pub fn request(&mut self, value: &str) {
        self.state = EditState::AwaitingConfirmation {
            value: self.field.normalize(value),
        };
    }

    /// First confirmation.
    pub fn confirm(&mut self) -> Result<(), ReviewError> {
        match std::mem::replace(&mut self.state, EditState::Idle) {
            EditState::AwaitingConfirmation { value } => {
                self.state = EditState::AwaitingFinalConfirmation { value };
                Ok(())
            }
            other => {
                self.state = other;
                Err(self.nothing_pending())
            }
        }
    }

    /// Final confirmation. State stays put until the outcome is recorded.
    pub fn confirm_final(&self) -> Result<EditCommand, ReviewError> {
        match &self.state {
            EditState::AwaitingFinalConfirmation { value } => Ok(EditCommand::Persist {
                article_id: self.article_id,
                field: self.field,
                value: value.clone(),
            }),
            _ => Err(self.nothing_pending()),
        }
    }

    /// Abandon the edit at either confirmation step.
    pub fn cancel(&mut self) -> Result<(), ReviewError> {
        if !self.state.is_pending() {
            return Err(self.nothing_pending());
        }
        self.state = EditState::Cancelled;
        Ok(())
    }

    pub fn record_outcome(&mut self, outcome: Result<(), Arc<StoreError>>) {
        self.state = match outcome {
            Ok(()) => EditState::Saved,
            Err(error) => EditState::Failed { error },
        };
    }

    fn nothing_pending(&self) -> ReviewError {
        ReviewError::NoEditPending {
            article_id: self.article_id,
            field: self.field,
        }
    }
}
