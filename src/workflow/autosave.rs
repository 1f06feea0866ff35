/// Background autosave service
///
/// Periodically writes the latest published workflow snapshot to storage.
/// The handle is the cancellation point: `shutdown()` (or dropping the handle)
/// performs one final save with the newest state and stops the task.

use crate::workflow::{snapshot::WorkflowSnapshot, storage::WorkflowStorage};
use anyhow::Result;
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};

/// Why a save was attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveReason {
    Periodic,
    Manual,
    Final,
}

/// Result of one save attempt that found something to write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub workflow_id: String,
    pub reason: SaveReason,
}

/// Period used when the configured one is zero
pub const FALLBACK_PERIOD: Duration = Duration::from_secs(3);

type FlushAck = oneshot::Sender<Result<Option<SaveReport>>>;

/// Handle to a running autosave task
#[derive(Debug)]
pub struct AutosaveHandle {
    flush_tx: mpsc::UnboundedSender<Option<FlushAck>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<()>>,
}

/// Start the autosave loop. The first periodic save happens one `period` after start.
pub fn spawn(
    storage: WorkflowStorage,
    snapshot: Arc<WorkflowSnapshot>,
    period: Duration,
) -> AutosaveHandle {
    let period = if period.is_zero() {
        tracing::warn!("Autosave period must be non-zero, using {:?}", FALLBACK_PERIOD);
        FALLBACK_PERIOD
    } else {
        period
    };
    let (flush_tx, flush_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    tracing::info!("⏰ Starting autosave every {:?}", period);
    let join = tokio::spawn(run(storage, snapshot, period, flush_rx, shutdown_rx));

    AutosaveHandle {
        flush_tx,
        shutdown_tx: Some(shutdown_tx),
        join: Some(join),
    }
}

async fn run(
    storage: WorkflowStorage,
    snapshot: Arc<WorkflowSnapshot>,
    period: Duration,
    mut flush_rx: mpsc::UnboundedReceiver<Option<FlushAck>>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = save_latest(&storage, &snapshot, SaveReason::Periodic).await {
                    // Next tick tries again
                    tracing::warn!("⚠️ Autosave failed: {:#}", e);
                }
            }
            Some(ack) = flush_rx.recv() => {
                let result = save_latest(&storage, &snapshot, SaveReason::Manual).await;
                if let Err(e) = &result {
                    tracing::warn!("⚠️ Manual save failed: {:#}", e);
                }
                if let Some(ack) = ack {
                    let _ = ack.send(result);
                }
            }
            // Explicit shutdown or a dropped handle both end the task
            _ = &mut shutdown_rx => break,
        }
    }

    if let Err(e) = save_latest(&storage, &snapshot, SaveReason::Final).await {
        tracing::warn!("⚠️ Final save failed: {:#}", e);
    }
    tracing::info!("⏹️ Autosave stopped");
}

async fn save_latest(
    storage: &WorkflowStorage,
    snapshot: &WorkflowSnapshot,
    reason: SaveReason,
) -> Result<Option<SaveReport>> {
    let Some(workflow) = snapshot.latest() else {
        return Ok(None);
    };

    storage.save_workflow(&workflow).await?;
    tracing::debug!("💾 {:?} save of '{}'", reason, workflow.id);

    Ok(Some(SaveReport {
        workflow_id: workflow.id.clone(),
        reason,
    }))
}

impl AutosaveHandle {
    /// Save now and wait for the result
    pub async fn flush(&self) -> Result<Option<SaveReport>> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.flush_tx
            .send(Some(ack_tx))
            .map_err(|_| anyhow::anyhow!("Autosave task is not running"))?;
        ack_rx
            .await
            .map_err(|_| anyhow::anyhow!("Autosave task stopped before saving"))?
    }

    /// Request a save without waiting for it
    pub fn request_flush(&self) -> bool {
        self.flush_tx.send(None).is_ok()
    }

    /// Stop the task after one final save
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            join.await
                .map_err(|e| anyhow::anyhow!("Autosave task panicked: {}", e))?;
        }
        Ok(())
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        // Dropping the sender wakes the task, which writes once more and exits
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::types::Workflow;

    async fn setup() -> (WorkflowStorage, Arc<WorkflowSnapshot>) {
        (WorkflowStorage::in_memory().await.unwrap(), WorkflowSnapshot::new())
    }

    #[tokio::test]
    async fn test_periodic_save_writes_latest_snapshot() {
        let (storage, snapshot) = setup().await;
        let mut wf = Workflow::new();
        snapshot.publish(&wf);
        wf.title = "Latest".into();
        snapshot.publish(&wf);

        let handle = spawn(storage.clone(), snapshot, Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(150)).await;

        let saved = storage.get_workflow(&wf.id).await.unwrap().unwrap();
        assert_eq!(saved.title, "Latest");
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_flush_saves_immediately() {
        let (storage, snapshot) = setup().await;
        let wf = Workflow::new();
        snapshot.publish(&wf);

        let handle = spawn(storage.clone(), snapshot, Duration::from_secs(3600));
        let report = handle.flush().await.unwrap().unwrap();
        assert_eq!(report.workflow_id, wf.id);
        assert_eq!(report.reason, SaveReason::Manual);
        assert!(storage.get_workflow(&wf.id).await.unwrap().is_some());
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_zero_period_keeps_saving() {
        let (storage, snapshot) = setup().await;
        let wf = Workflow::new();
        snapshot.publish(&wf);

        let handle = spawn(storage.clone(), snapshot, Duration::ZERO);
        let report = handle.flush().await.unwrap().unwrap();
        assert_eq!(report.workflow_id, wf.id);
        handle.shutdown().await.unwrap();
        assert!(storage.get_workflow(&wf.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_flush_without_snapshot_is_noop() {
        let (storage, snapshot) = setup().await;
        let handle = spawn(storage.clone(), snapshot, Duration::from_secs(3600));
        assert!(handle.flush().await.unwrap().is_none());
        handle.shutdown().await.unwrap();
        assert!(storage.list_workflows().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_performs_final_save() {
        let (storage, snapshot) = setup().await;
        let handle = spawn(storage.clone(), snapshot.clone(), Duration::from_secs(3600));

        let mut wf = Workflow::new();
        wf.title = "Edited just before leaving".into();
        snapshot.publish(&wf);
        handle.shutdown().await.unwrap();

        let saved = storage.get_workflow(&wf.id).await.unwrap().unwrap();
        assert_eq!(saved.title, "Edited just before leaving");
    }

    #[tokio::test]
    async fn test_drop_triggers_final_save() {
        let (storage, snapshot) = setup().await;
        let handle = spawn(storage.clone(), snapshot.clone(), Duration::from_secs(3600));
        let wf = Workflow::new();
        snapshot.publish(&wf);
        drop(handle);

        let mut saved = None;
        for _ in 0..50 {
            saved = storage.get_workflow(&wf.id).await.unwrap();
            if saved.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(saved.is_some());
    }
}
