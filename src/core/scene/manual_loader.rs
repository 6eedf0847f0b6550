//=========================================================================
// Manual Loader
//=========================================================================
//
// Loader whose operations finish only when told to.
//
// Every started operation parks its CompletionHandle in a shared queue.
// Clones share the queue, so one clone can be handed to the lifecycle
// manager while another steps completions in any order. Used for
// deterministic tests and for tools that single-step scene flow.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;

//=== Internal Dependencies ===============================================

use super::loader::{CompletionHandle, LoaderError, SceneLoader, SceneOp};
use super::{LoadMode, SceneId};

//=== ManualLoader ========================================================

#[derive(Default)]
struct ManualState {
    pending: VecDeque<CompletionHandle>,
    started: Vec<(SceneId, SceneOp)>,
    rejected: HashSet<SceneId>,
}

/// Hand-driven [`SceneLoader`] with a shared operation queue.
#[derive(Clone, Default)]
pub struct ManualLoader {
    shared: Arc<Mutex<ManualState>>,
}

impl ManualLoader {
    /// Creates a loader with an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    //--- Configuration ----------------------------------------------------

    /// Makes every future `begin_*` call for `id` fail to start.
    pub fn reject(&self, id: impl Into<SceneId>) {
        self.lock().rejected.insert(id.into());
    }

    /// Undoes a previous [`reject`](Self::reject).
    pub fn accept(&self, id: &str) {
        self.lock().rejected.remove(id);
    }

    //--- Inspection -------------------------------------------------------

    /// Operations started and not yet finished, oldest first.
    pub fn pending(&self) -> Vec<(SceneId, SceneOp)> {
        self.lock()
            .pending
            .iter()
            .map(|h| (h.id().clone(), h.op()))
            .collect()
    }

    /// Number of operations started and not yet finished.
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Every operation ever started, in dispatch order.
    pub fn started(&self) -> Vec<(SceneId, SceneOp)> {
        self.lock().started.clone()
    }

    //--- Completion -------------------------------------------------------

    /// Finishes the oldest pending operation for `id` successfully.
    ///
    /// Returns `false` if nothing is pending for `id`.
    pub fn complete(&self, id: &str) -> bool {
        match self.take(id) {
            Some(handle) => {
                handle.succeed();
                true
            }
            None => false,
        }
    }

    /// Finishes the oldest pending operation for `id` with `error`.
    pub fn fail(&self, id: &str, error: LoaderError) -> bool {
        match self.take(id) {
            Some(handle) => {
                handle.fail(error);
                true
            }
            None => false,
        }
    }

    /// Drops the oldest pending operation for `id` without reporting,
    /// as a crashed worker would.
    pub fn abandon(&self, id: &str) -> bool {
        self.take(id).is_some()
    }

    /// Finishes the oldest pending operation, whatever scene it is for.
    pub fn complete_next(&self) -> Option<SceneId> {
        let handle = self.lock().pending.pop_front()?;
        let id = handle.id().clone();
        handle.succeed();
        Some(id)
    }

    /// Finishes every pending operation in dispatch order.
    pub fn complete_all(&self) -> usize {
        let handles: Vec<_> = self.lock().pending.drain(..).collect();
        let count = handles.len();
        for handle in handles {
            handle.succeed();
        }
        count
    }

    //--- Internal Helpers -------------------------------------------------

    fn take(&self, id: &str) -> Option<CompletionHandle> {
        let mut state = self.lock();
        let pos = state.pending.iter().position(|h| h.id().as_str() == id)?;
        state.pending.remove(pos)
    }

    fn start(&mut self, id: &SceneId, completion: CompletionHandle) -> Result<(), LoaderError> {
        let mut state = self.lock();
        if state.rejected.contains(id) {
            return Err(LoaderError::Rejected(format!("scene '{}' is rejected", id)));
        }

        debug!("Manual loader queued {:?} for '{}'", completion.op(), id);
        state.started.push((id.clone(), completion.op()));
        state.pending.push_back(completion);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SceneLoader for ManualLoader {
    fn begin_load(
        &mut self,
        id: &SceneId,
        _mode: LoadMode,
        completion: CompletionHandle,
    ) -> Result<(), LoaderError> {
        self.start(id, completion)
    }

    fn begin_unload(
        &mut self,
        id: &SceneId,
        completion: CompletionHandle,
    ) -> Result<(), LoaderError> {
        self.start(id, completion)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::OperationId;
    use crossbeam_channel::unbounded;

    #[test]
    fn queues_and_completes_in_any_order() {
        let (tx, rx) = unbounded();
        let mut loader = ManualLoader::new();
        let control = loader.clone();

        for id in ["A", "B"] {
            let op = SceneOp::Load(LoadMode::Additive);
            let handle =
                CompletionHandle::new(tx.clone(), SceneId::from(id), OperationId::first(), op);
            loader.begin_load(&SceneId::from(id), LoadMode::Additive, handle).unwrap();
        }

        assert_eq!(control.pending_count(), 2);
        assert!(control.complete("B"));
        assert_eq!(rx.try_recv().unwrap().id.as_str(), "B");
        assert_eq!(control.complete_next(), Some(SceneId::from("A")));
        assert!(!control.complete("A"));
        assert_eq!(control.started().len(), 2);
    }

    #[test]
    fn rejected_scene_does_not_start() {
        let (tx, _rx) = unbounded();
        let mut loader = ManualLoader::new();
        loader.reject("Broken");

        let handle = CompletionHandle::new(
            tx,
            SceneId::from("Broken"),
            OperationId::first(),
            SceneOp::Unload,
        );
        let result = loader.begin_unload(&SceneId::from("Broken"), handle);

        assert!(matches!(result, Err(LoaderError::Rejected(_))));
        assert!(loader.started().is_empty());
        assert_eq!(loader.pending_count(), 0);
    }
}
