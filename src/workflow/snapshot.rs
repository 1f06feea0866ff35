/// Latest-state cell shared between the editor and the autosave task
///
/// The editor publishes a full copy of the workflow after every mutation with an
/// atomic pointer swap; the autosave task reads whatever is current when its
/// timer fires. Readers never block the editor and always see a whole snapshot.

use crate::workflow::types::Workflow;
use arc_swap::ArcSwapOption;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct WorkflowSnapshot {
    current: ArcSwapOption<Workflow>,
}

impl WorkflowSnapshot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Replace the published workflow
    pub fn publish(&self, workflow: &Workflow) {
        self.current.store(Some(Arc::new(workflow.clone())));
    }

    /// Forget the published workflow; autosave becomes a no-op
    pub fn clear(&self) {
        self.current.store(None);
    }

    /// The most recently published workflow, if any
    pub fn latest(&self) -> Option<Arc<Workflow>> {
        self.current.load_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_publish_wins() {
        let cell = WorkflowSnapshot::new();
        assert!(cell.latest().is_none());

        let mut wf = Workflow::new();
        cell.publish(&wf);
        wf.title = "Renamed".into();
        cell.publish(&wf);
        assert_eq!(cell.latest().unwrap().title, "Renamed");

        cell.clear();
        assert!(cell.latest().is_none());
    }
}
