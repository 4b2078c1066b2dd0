use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::{AnalysisError, AnalysisFailure, AnalysisResult};
use crate::item::{Attempt, ItemId, ItemState, ItemStatus, UploadItem};

/// Rejected user-triggered transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("item {0} not found")]
    NotFound(ItemId),
    #[error("item {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: ItemId,
        from: ItemStatus,
        to: ItemStatus,
    },
}

/// How a settlement was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Completed(ItemId),
    Failed(ItemId),
    /// Item removed, no longer analyzing, or the settlement belongs to an older attempt.
    Discarded(ItemId),
}

impl Settled {
    pub fn id(&self) -> ItemId {
        match self {
            Self::Completed(id) | Self::Failed(id) | Self::Discarded(id) => *id,
        }
    }
}

/// Ordered collection of items; the single source of truth for what is shown.
#[derive(Debug)]
pub struct ItemStore {
    items: Vec<UploadItem>,
    allow_resubmit: bool,
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ItemStore {
    /// `allow_resubmit` lets terminal items go back to `analyzing`.
    pub fn new(allow_resubmit: bool) -> Self {
        Self {
            items: Vec::new(),
            allow_resubmit,
        }
    }

    fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == *id)
    }

    pub fn add(&mut self, item: UploadItem) -> ItemId {
        let id = item.id();
        debug!(%id, name = %item.name(), "Item added");
        self.items.push(item);
        id
    }

    pub fn get(&self, id: &ItemId) -> Option<&UploadItem> {
        self.items.iter().find(|item| item.id() == *id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.position(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &UploadItem> {
        self.items.iter()
    }

    pub fn items(&self) -> &[UploadItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count_with_status(&self, status: ItemStatus) -> usize {
        self.items.iter().filter(|i| i.status() == status).count()
    }

    /// Remove an item in any state. Removing an unknown id is a no-op.
    pub fn remove(&mut self, id: &ItemId) -> Option<UploadItem> {
        let pos = self.position(id)?;
        let item = self.items.remove(pos);
        debug!(%id, status = %item.status(), "Item removed");
        Some(item)
    }

    /// Move an item to `analyzing` and return the attempt number its settlement must carry.
    pub fn begin_analysis(&mut self, id: &ItemId) -> Result<Attempt, StoreError> {
        let allow_resubmit = self.allow_resubmit;
        let pos = self.position(id).ok_or(StoreError::NotFound(*id))?;
        let item = &mut self.items[pos];

        let from = item.status();
        let permitted = match from {
            ItemStatus::Idle => true,
            ItemStatus::Complete | ItemStatus::Error => allow_resubmit,
            ItemStatus::Analyzing => false,
        };
        if !permitted {
            return Err(StoreError::InvalidTransition {
                id: *id,
                from,
                to: ItemStatus::Analyzing,
            });
        }

        item.attempts += 1;
        let attempt = item.attempts;
        item.state = ItemState::Analyzing { attempt };
        info!(%id, attempt, %from, "Analysis started");
        Ok(attempt)
    }

    /// Apply the outcome of an analysis call.
    ///
    /// Never fails: settlements for removed items, items not analyzing, or
    /// older attempts are dropped and reported as `Discarded`.
    pub fn settle(
        &mut self,
        id: &ItemId,
        attempt: Attempt,
        outcome: Result<AnalysisResult, AnalysisError>,
    ) -> Settled {
        let Some(pos) = self.position(id) else {
            debug!(%id, attempt, "Discarding settlement for removed item");
            return Settled::Discarded(*id);
        };
        let item = &mut self.items[pos];

        match item.state {
            ItemState::Analyzing { attempt: current } if current == attempt => {}
            ref other => {
                debug!(%id, attempt, status = %other.status(), "Discarding stale settlement");
                return Settled::Discarded(*id);
            }
        }

        let outcome = outcome.and_then(|result| {
            result
                .check()
                .map(|_| result)
                .map_err(|reason| AnalysisError::Server(format!("malformed result: {reason}")))
        });

        match outcome {
            Ok(result) => {
                info!(
                    %id,
                    attempt,
                    label = %result.label,
                    confidence = result.confidence,
                    "Analysis complete"
                );
                item.state = ItemState::Complete(result);
                Settled::Completed(*id)
            }
            Err(err) => {
                warn!(%id, attempt, kind = %err.kind(), error = %err, "Analysis failed");
                item.state = ItemState::Error(AnalysisFailure::from(&err));
                Settled::Failed(*id)
            }
        }
    }
}
