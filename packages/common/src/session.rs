use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, instrument};

use crate::analysis::{AnalysisClient, AnalysisError, AnalysisResult};
use crate::config::SessionConfig;
use crate::intake::{CandidateFile, IntakeReport, intake};
use crate::item::{Attempt, ItemId, ItemStatus};
use crate::store::{ItemStore, Settled, StoreError};

/// Outcome of one classifier call, tagged with the submission it belongs to.
#[derive(Debug)]
struct Settlement {
    id: ItemId,
    attempt: Attempt,
    outcome: Result<AnalysisResult, AnalysisError>,
}

/// Owns an item store and drives analyses against a classifier.
///
/// Classifier calls run as tokio tasks and report back over a channel; the
/// session applies their outcomes in arrival order, so the store is only ever
/// touched by its owner. There is no timeout: a call that never returns
/// leaves its item `analyzing`.
pub struct Session {
    store: ItemStore,
    config: SessionConfig,
    client: Arc<dyn AnalysisClient>,
    settle_tx: mpsc::UnboundedSender<Settlement>,
    settle_rx: mpsc::UnboundedReceiver<Settlement>,
    in_flight: usize,
}

impl Session {
    pub fn new(client: Arc<dyn AnalysisClient>, config: SessionConfig) -> Self {
        let (settle_tx, settle_rx) = mpsc::unbounded_channel();
        Self {
            store: ItemStore::new(config.allow_resubmit),
            config,
            client,
            settle_tx,
            settle_rx,
            in_flight: 0,
        }
    }

    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    /// Number of classifier calls whose settlement has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Validate files and add the accepted ones to the store as `idle` items.
    ///
    /// The returned report's `accepted` items are copies; the store holds the
    /// authoritative versions.
    pub fn submit(&mut self, files: impl IntoIterator<Item = CandidateFile>) -> IntakeReport {
        let report = intake(&self.config.upload, files);
        for item in &report.accepted {
            self.store.add(item.clone());
        }
        report
    }

    /// Start analysis of one item.
    #[instrument(skip(self))]
    pub fn analyze(&mut self, id: &ItemId) -> Result<(), StoreError> {
        let attempt = self.store.begin_analysis(id)?;
        let payload = self
            .store
            .get(id)
            .map(|item| item.payload())
            .ok_or(StoreError::NotFound(*id))?;

        let client = Arc::clone(&self.client);
        let tx = self.settle_tx.clone();
        let id = *id;
        self.in_flight += 1;

        tokio::spawn(async move {
            let call = tokio::spawn(async move { client.analyze(payload).await });
            let outcome = match call.await {
                Ok(outcome) => outcome,
                Err(join_err) => {
                    error!(%id, attempt, error = %join_err, "Classifier task failed");
                    Err(AnalysisError::Server(format!("classifier task failed: {join_err}")))
                }
            };
            // The receiver lives as long as the session; a send error only
            // means the session was dropped.
            let _ = tx.send(Settlement {
                id,
                attempt,
                outcome,
            });
        });

        Ok(())
    }

    /// Start analysis of every `idle` item, in store order. Returns how many were started.
    pub fn analyze_all_idle(&mut self) -> usize {
        let idle: Vec<ItemId> = self
            .store
            .iter()
            .filter(|item| item.status() == ItemStatus::Idle)
            .map(|item| item.id())
            .collect();

        idle.iter().filter(|id| self.analyze(id).is_ok()).count()
    }

    /// Remove an item. In-flight calls for it are ignored when they settle.
    pub fn remove(&mut self, id: &ItemId) -> bool {
        self.store.remove(id).is_some()
    }

    /// Wait for the next settlement and apply it.
    ///
    /// Returns `None` when no call is in flight.
    pub async fn next_settlement(&mut self) -> Option<Settled> {
        if self.in_flight == 0 {
            return None;
        }
        let settlement = self.settle_rx.recv().await?;
        self.in_flight -= 1;

        let settled = self
            .store
            .settle(&settlement.id, settlement.attempt, settlement.outcome);
        debug!(id = %settlement.id, ?settled, remaining = self.in_flight, "Settlement applied");
        Some(settled)
    }

    /// Apply settlements until nothing is in flight.
    pub async fn settle_all(&mut self) -> Vec<Settled> {
        let mut applied = Vec::with_capacity(self.in_flight);
        while let Some(settled) = self.next_settlement().await {
            applied.push(settled);
        }
        applied
    }
}
