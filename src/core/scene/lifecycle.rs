//=========================================================================
// Scene Lifecycle Manager
//=========================================================================
//
// Single source of truth for which scenes are loaded.
//
// Each scene identifier moves through
//   Unloaded → Loading → Loaded → Unloading → Unloaded
// and at most one loader operation is outstanding per identifier.
// Membership of the loaded set changes only when a completion arrives,
// never when a request is made.
//
// Completions travel over a crossbeam channel and are applied on the
// owner's thread by poll_completions() / wait_for_idle().
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use super::loader::{CompletionHandle, OperationId, SceneCompletion, SceneLoader, SceneOp};
use super::{LoadMode, SceneId, SceneState};
use crate::core::error::SceneError;

//=== Request Outcome =====================================================

/// What a successful request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A new loader operation was started.
    Dispatched(OperationId),

    /// The same kind of operation is already outstanding; nothing started.
    InFlight,

    /// An unload was parked behind the outstanding load and starts once the
    /// load completes.
    Queued,
}

//=== Scene Event =========================================================

/// Result of applying one completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneEvent {
    Loaded(SceneId),
    Unloaded(SceneId),
    Failed(SceneError),
}

//=== Scene Record ========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Loading,
    Loaded,
    Unloading,
}

impl Phase {
    fn state(self) -> SceneState {
        match self {
            Phase::Loading => SceneState::Loading,
            Phase::Loaded => SceneState::Loaded,
            Phase::Unloading => SceneState::Unloading,
        }
    }
}

#[derive(Debug)]
struct SceneRecord {
    phase: Phase,
    mode: LoadMode,
    ticket: Option<OperationId>,
    pending_unload: bool,
}

//=== Scene Lifecycle Manager =============================================

/// Tracks loaded scenes and serializes loader operations per scene.
///
/// Constructed once with the loader it drives and owned by whoever runs the
/// logic thread (normally [`GameStateMachine`](crate::core::state::GameStateMachine)).
pub struct SceneLifecycleManager {
    loader: Box<dyn SceneLoader>,
    records: HashMap<SceneId, SceneRecord>,
    current: Option<SceneId>,
    latest_single: Option<OperationId>,
    next_ticket: OperationId,
    completion_tx: Sender<SceneCompletion>,
    completion_rx: Receiver<SceneCompletion>,
}

impl SceneLifecycleManager {
    //--- Construction -----------------------------------------------------

    /// Creates a manager with nothing loaded.
    ///
    /// The loader is boxed for storage.
    pub fn new<L>(loader: L) -> Self
    where
        L: SceneLoader + 'static,
    {
        let (completion_tx, completion_rx) = unbounded();

        Self {
            loader: Box::new(loader),
            records: HashMap::new(),
            current: None,
            latest_single: None,
            next_ticket: OperationId::first(),
            completion_tx,
            completion_rx,
        }
    }

    //--- Requests ---------------------------------------------------------

    /// Requests that `id` be loaded.
    ///
    /// A second request while the first is still loading is absorbed
    /// ([`RequestOutcome::InFlight`]); if an unload had been queued behind
    /// that load, the newer request cancels it.
    ///
    /// Only the most recent single-mode request replaces the resident
    /// scenes. An older single-mode load that lands afterwards is unloaded
    /// again straight away.
    ///
    /// # Errors
    ///
    /// - [`SceneError::AlreadyLoaded`] if the scene is in the loaded set
    /// - [`SceneError::Busy`] while the scene is being unloaded
    /// - [`SceneError::LoadFailure`] if the loader could not start
    pub fn request_load(
        &mut self,
        id: &SceneId,
        mode: LoadMode,
    ) -> Result<RequestOutcome, SceneError> {
        if id.is_empty() {
            warn!("Ignoring load request with an empty scene identifier");
            return Err(SceneError::EmptyIdentifier);
        }

        let Some(record) = self.records.get_mut(id) else {
            return self.dispatch_load(id, mode);
        };

        match record.phase {
            Phase::Loading => {
                if mode == LoadMode::Single {
                    // The load in flight now carries the exclusive intent
                    if record.mode == LoadMode::Additive {
                        debug!("Load of '{}' upgraded from additive to single", id);
                        record.mode = LoadMode::Single;
                    }
                    self.latest_single = record.ticket;
                }
                if record.pending_unload {
                    debug!("Load of '{}' requested again, dropping queued unload", id);
                    record.pending_unload = false;
                } else {
                    debug!("Scene '{}' is already loading, skipping duplicate request", id);
                }
                Ok(RequestOutcome::InFlight)
            }
            Phase::Loaded => {
                warn!("{} is already loaded", id);
                Err(SceneError::AlreadyLoaded(id.clone()))
            }
            Phase::Unloading => {
                warn!("Scene '{}' is unloading, retry the load once it completes", id);
                Err(SceneError::Busy {
                    id: id.clone(),
                    state: SceneState::Unloading,
                })
            }
        }
    }

    /// Requests that `id` be unloaded.
    ///
    /// If the scene is still loading, one unload is queued and started as
    /// soon as the load completes.
    ///
    /// # Errors
    ///
    /// - [`SceneError::NotLoaded`] if the scene is not tracked at all
    /// - [`SceneError::UnloadFailure`] if the loader could not start
    pub fn request_unload(&mut self, id: &SceneId) -> Result<RequestOutcome, SceneError> {
        let Some(record) = self.records.get_mut(id) else {
            warn!("Scene '{}' is not currently loaded.", id);
            return Err(SceneError::NotLoaded(id.clone()));
        };

        match record.phase {
            Phase::Loaded => self.dispatch_unload(id),
            Phase::Loading => {
                if !record.pending_unload {
                    debug!("Scene '{}' is still loading, queueing unload", id);
                    record.pending_unload = true;
                }
                Ok(RequestOutcome::Queued)
            }
            Phase::Unloading => {
                debug!("Scene '{}' is already unloading", id);
                Ok(RequestOutcome::InFlight)
            }
        }
    }

    /// Forgets every scene at once.
    ///
    /// Does not wait for or cancel outstanding operations. Their completions
    /// are ignored when they arrive.
    pub fn reset_all(&mut self) {
        let outstanding = self.in_flight();

        self.records.clear();
        self.current = None;
        self.latest_single = None;

        if outstanding > 0 {
            info!("All scenes unloaded ({} operations detached)", outstanding);
        } else {
            info!("All scenes unloaded.");
        }
    }

    //--- Completion Processing --------------------------------------------

    /// Applies every completion that has arrived, without blocking.
    pub fn poll_completions(&mut self) -> Vec<SceneEvent> {
        let mut events = Vec::new();

        while let Ok(completion) = self.completion_rx.try_recv() {
            self.apply_completion(completion, &mut events);
        }

        events
    }

    /// Blocks until no operation is outstanding or `timeout` elapses.
    pub fn wait_for_idle(&mut self, timeout: Duration) -> Vec<SceneEvent> {
        let deadline = Instant::now() + timeout;
        let mut events = self.poll_completions();

        while self.in_flight() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());

            match self.completion_rx.recv_timeout(remaining) {
                Ok(completion) => self.apply_completion(completion, &mut events),
                Err(RecvTimeoutError::Timeout) => {
                    warn!(
                        "Timed out with {} scene operations still in flight",
                        self.in_flight()
                    );
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        events
    }

    //--- Queries ----------------------------------------------------------

    /// Whether `id` is in the loaded set.
    pub fn is_loaded(&self, id: &str) -> bool {
        self.state_of(id).is_resident()
    }

    /// Lifecycle position of `id`; untracked scenes are `Unloaded`.
    pub fn state_of(&self, id: &str) -> SceneState {
        self.records
            .get(id)
            .map(|r| r.phase.state())
            .unwrap_or(SceneState::Unloaded)
    }

    /// The scene most recently loaded in [`LoadMode::Single`].
    pub fn current_scene(&self) -> Option<&SceneId> {
        self.current.as_ref()
    }

    /// Members of the loaded set, sorted by identifier.
    pub fn loaded_scenes(&self) -> Vec<&SceneId> {
        let mut loaded: Vec<_> = self
            .records
            .iter()
            .filter(|(_, r)| r.phase.state().is_resident())
            .map(|(id, _)| id)
            .collect();
        loaded.sort();
        loaded
    }

    /// Mode of the last load started for `id`, while it is tracked.
    pub fn load_mode_of(&self, id: &str) -> Option<LoadMode> {
        self.records.get(id).map(|r| r.mode)
    }

    /// Number of outstanding loader operations.
    pub fn in_flight(&self) -> usize {
        self.records.values().filter(|r| r.ticket.is_some()).count()
    }

    /// Whether an unload is queued behind the load of `id`.
    pub fn has_pending_unload(&self, id: &str) -> bool {
        self.records.get(id).is_some_and(|r| r.pending_unload)
    }

    //--- Internal Helpers -------------------------------------------------

    fn issue_ticket(&mut self) -> OperationId {
        let ticket = self.next_ticket;
        self.next_ticket = ticket.next();
        ticket
    }

    fn dispatch_load(
        &mut self,
        id: &SceneId,
        mode: LoadMode,
    ) -> Result<RequestOutcome, SceneError> {
        let ticket = self.issue_ticket();
        let handle = CompletionHandle::new(
            self.completion_tx.clone(),
            id.clone(),
            ticket,
            SceneOp::Load(mode),
        );

        self.records.insert(
            id.clone(),
            SceneRecord {
                phase: Phase::Loading,
                mode,
                ticket: Some(ticket),
                pending_unload: false,
            },
        );

        match self.loader.begin_load(id, mode, handle) {
            Ok(()) => {
                if mode == LoadMode::Single {
                    self.latest_single = Some(ticket);
                }
                debug!("Loading scene '{}' ({:?}, op {})", id, mode, ticket);
                Ok(RequestOutcome::Dispatched(ticket))
            }
            Err(source) => {
                self.records.remove(id);
                error!(
                    "Failed to load scene '{}': {}. Make sure the loader knows this scene.",
                    id, source
                );
                Err(SceneError::LoadFailure {
                    id: id.clone(),
                    source,
                })
            }
        }
    }

    fn dispatch_unload(&mut self, id: &SceneId) -> Result<RequestOutcome, SceneError> {
        let ticket = self.issue_ticket();
        let handle =
            CompletionHandle::new(self.completion_tx.clone(), id.clone(), ticket, SceneOp::Unload);

        if let Some(record) = self.records.get_mut(id) {
            record.phase = Phase::Unloading;
            record.ticket = Some(ticket);
        }

        match self.loader.begin_unload(id, handle) {
            Ok(()) => {
                debug!("Unloading scene '{}' (op {})", id, ticket);
                Ok(RequestOutcome::Dispatched(ticket))
            }
            Err(source) => {
                if let Some(record) = self.records.get_mut(id) {
                    record.phase = Phase::Loaded;
                    record.ticket = None;
                }
                error!("Failed to unload scene '{}': {}", id, source);
                Err(SceneError::UnloadFailure {
                    id: id.clone(),
                    source,
                })
            }
        }
    }

    fn apply_completion(&mut self, completion: SceneCompletion, events: &mut Vec<SceneEvent>) {
        let SceneCompletion {
            id,
            ticket,
            op,
            result,
        } = completion;

        let Some(record) = self.records.get_mut(&id) else {
            debug!("Ignoring late completion {} for untracked scene '{}'", ticket, id);
            return;
        };

        if record.ticket != Some(ticket) {
            debug!("Ignoring stale completion {} for scene '{}'", ticket, id);
            return;
        }
        record.ticket = None;

        match (op, result) {
            (SceneOp::Load(_), Ok(())) => {
                record.phase = Phase::Loaded;
                let mode = record.mode;
                let superseded = mode == LoadMode::Single && self.latest_single != Some(ticket);
                let unload_next = std::mem::take(&mut record.pending_unload) || superseded;

                info!("Scene '{}' successfully loaded.", id);
                if superseded {
                    debug!("Single load of '{}' was superseded by a newer one", id);
                } else if mode == LoadMode::Single {
                    self.replace_exclusive(&id, events);
                }
                events.push(SceneEvent::Loaded(id.clone()));

                if unload_next {
                    debug!("Starting queued unload for '{}'", id);
                    if let Err(e) = self.dispatch_unload(&id) {
                        events.push(SceneEvent::Failed(e));
                    }
                }
            }
            (SceneOp::Load(_), Err(source)) => {
                if record.pending_unload {
                    debug!("Discarding queued unload for '{}'", id);
                }
                self.records.remove(&id);

                error!("Failed to load scene '{}': {}", id, source);
                events.push(SceneEvent::Failed(SceneError::LoadFailure { id, source }));
            }
            (SceneOp::Unload, Ok(())) => {
                self.records.remove(&id);
                if self.current.as_ref() == Some(&id) {
                    self.current = None;
                }

                info!("Scene '{}' successfully unloaded.", id);
                events.push(SceneEvent::Unloaded(id));
            }
            (SceneOp::Unload, Err(source)) => {
                record.phase = Phase::Loaded;

                error!("Failed to unload scene '{}': {}", id, source);
                events.push(SceneEvent::Failed(SceneError::UnloadFailure { id, source }));
            }
        }
    }

    /// A completed single-mode load replaced everything that was resident
    /// and idle; drop those records and make `id` current.
    fn replace_exclusive(&mut self, id: &SceneId, events: &mut Vec<SceneEvent>) {
        let mut replaced: Vec<SceneId> = self
            .records
            .iter()
            .filter(|(other, r)| *other != id && r.phase == Phase::Loaded)
            .map(|(other, _)| other.clone())
            .collect();
        replaced.sort();

        for other in replaced {
            debug!("Scene '{}' replaced by single load of '{}'", other, id);
            self.records.remove(&other);
            events.push(SceneEvent::Unloaded(other));
        }

        self.current = Some(id.clone());
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scene::{LoaderError, ManualLoader};

    fn manager() -> (SceneLifecycleManager, ManualLoader) {
        let loader = ManualLoader::new();
        (SceneLifecycleManager::new(loader.clone()), loader)
    }

    fn id(name: &str) -> SceneId {
        SceneId::from(name)
    }

    //--- Load Tests -------------------------------------------------------

    #[test]
    fn load_is_not_visible_until_completion() {
        let (mut scenes, loader) = manager();

        let outcome = scenes.request_load(&id("Level1"), LoadMode::Single).unwrap();
        assert!(matches!(outcome, RequestOutcome::Dispatched(_)));
        assert_eq!(scenes.state_of("Level1"), SceneState::Loading);
        assert!(!scenes.is_loaded("Level1"));

        assert!(loader.complete("Level1"));
        let events = scenes.poll_completions();

        assert_eq!(events, vec![SceneEvent::Loaded(id("Level1"))]);
        assert!(scenes.is_loaded("Level1"));
        assert_eq!(scenes.current_scene(), Some(&id("Level1")));
        assert_eq!(scenes.in_flight(), 0);
    }

    #[test]
    fn duplicate_load_while_loading_dispatches_once() {
        let (mut scenes, loader) = manager();

        scenes.request_load(&id("A"), LoadMode::Additive).unwrap();
        let second = scenes.request_load(&id("A"), LoadMode::Additive).unwrap();

        assert_eq!(second, RequestOutcome::InFlight);
        assert_eq!(loader.started().len(), 1);

        loader.complete_all();
        let events = scenes.poll_completions();
        assert_eq!(events, vec![SceneEvent::Loaded(id("A"))]);
        assert_eq!(scenes.loaded_scenes(), vec![&id("A")]);
    }

    #[test]
    fn load_of_loaded_scene_reports_already_loaded() {
        let (mut scenes, loader) = manager();
        scenes.request_load(&id("A"), LoadMode::Additive).unwrap();
        loader.complete_all();
        scenes.poll_completions();

        let result = scenes.request_load(&id("A"), LoadMode::Additive);

        assert_eq!(result, Err(SceneError::AlreadyLoaded(id("A"))));
        assert_eq!(loader.started().len(), 1);
    }

    #[test]
    fn empty_identifier_is_rejected() {
        let (mut scenes, loader) = manager();

        let result = scenes.request_load(&id(""), LoadMode::Single);

        assert_eq!(result, Err(SceneError::EmptyIdentifier));
        assert!(loader.started().is_empty());
    }

    #[test]
    fn loader_refusing_to_start_leaves_scene_unloaded() {
        let (mut scenes, loader) = manager();
        loader.reject("Missing");

        let result = scenes.request_load(&id("Missing"), LoadMode::Single);

        assert!(matches!(result, Err(SceneError::LoadFailure { .. })));
        assert_eq!(scenes.state_of("Missing"), SceneState::Unloaded);

        // The discarded handle reports Disconnected; it must be ignored
        assert!(scenes.poll_completions().is_empty());
        assert!(scenes.loaded_scenes().is_empty());
    }

    #[test]
    fn asynchronous_load_failure_is_reported() {
        let (mut scenes, loader) = manager();
        scenes.request_load(&id("A"), LoadMode::Single).unwrap();

        loader.fail("A", LoaderError::Rejected("corrupt".into()));
        let events = scenes.poll_completions();

        assert_eq!(
            events,
            vec![SceneEvent::Failed(SceneError::LoadFailure {
                id: id("A"),
                source: LoaderError::Rejected("corrupt".into()),
            })]
        );
        assert!(!scenes.is_loaded("A"));
        assert_eq!(scenes.current_scene(), None);
    }

    #[test]
    fn abandoned_operation_is_reported_as_failure() {
        let (mut scenes, loader) = manager();
        scenes.request_load(&id("A"), LoadMode::Additive).unwrap();

        assert!(loader.abandon("A"));
        let events = scenes.poll_completions();

        assert_eq!(
            events,
            vec![SceneEvent::Failed(SceneError::LoadFailure {
                id: id("A"),
                source: LoaderError::Disconnected,
            })]
        );
        assert_eq!(scenes.state_of("A"), SceneState::Unloaded);
        assert_eq!(scenes.in_flight(), 0);
    }

    #[test]
    fn single_load_replaces_idle_resident_scenes() {
        let (mut scenes, loader) = manager();
        scenes.request_load(&id("MainMenu"), LoadMode::Single).unwrap();
        scenes.request_load(&id("Overlay"), LoadMode::Additive).unwrap();
        loader.complete_all();
        scenes.poll_completions();

        scenes.request_load(&id("Level1"), LoadMode::Single).unwrap();
        loader.complete_all();
        let events = scenes.poll_completions();

        assert_eq!(
            events,
            vec![
                SceneEvent::Unloaded(id("MainMenu")),
                SceneEvent::Unloaded(id("Overlay")),
                SceneEvent::Loaded(id("Level1")),
            ]
        );
        assert_eq!(scenes.loaded_scenes(), vec![&id("Level1")]);
        assert_eq!(scenes.current_scene(), Some(&id("Level1")));
    }

    #[test]
    fn single_load_keeps_scenes_with_outstanding_work() {
        let (mut scenes, loader) = manager();
        scenes.request_load(&id("Level1"), LoadMode::Single).unwrap();
        scenes.request_load(&id("Pause"), LoadMode::Additive).unwrap();

        // Level1 finishes while Pause is still loading
        loader.complete("Level1");
        scenes.poll_completions();

        assert_eq!(scenes.state_of("Pause"), SceneState::Loading);
        loader.complete("Pause");
        scenes.poll_completions();
        assert_eq!(scenes.loaded_scenes(), vec![&id("Level1"), &id("Pause")]);
    }

    #[test]
    fn superseded_single_load_is_unloaded_on_arrival() {
        let (mut scenes, loader) = manager();
        scenes.request_load(&id("A"), LoadMode::Single).unwrap();
        scenes.request_load(&id("B"), LoadMode::Single).unwrap();

        // The newer load lands first
        loader.complete("B");
        scenes.poll_completions();
        assert_eq!(scenes.current_scene(), Some(&id("B")));

        loader.complete("A");
        let events = scenes.poll_completions();
        assert_eq!(events, vec![SceneEvent::Loaded(id("A"))]);
        assert_eq!(scenes.state_of("A"), SceneState::Unloading);
        assert_eq!(scenes.current_scene(), Some(&id("B")));

        loader.complete_all();
        scenes.poll_completions();
        assert_eq!(scenes.loaded_scenes(), vec![&id("B")]);
    }

    #[test]
    fn repeated_single_request_makes_load_latest_again() {
        let (mut scenes, loader) = manager();
        scenes.request_load(&id("A"), LoadMode::Single).unwrap();
        scenes.request_load(&id("B"), LoadMode::Single).unwrap();
        assert_eq!(
            scenes.request_load(&id("A"), LoadMode::Single),
            Ok(RequestOutcome::InFlight)
        );

        while loader.complete_next().is_some() {
            scenes.poll_completions();
        }
        scenes.poll_completions();

        assert_eq!(scenes.loaded_scenes(), vec![&id("A")]);
        assert_eq!(scenes.current_scene(), Some(&id("A")));
    }

    #[test]
    fn single_request_upgrades_additive_load_in_flight() {
        let (mut scenes, loader) = manager();
        scenes.request_load(&id("L1"), LoadMode::Single).unwrap();
        scenes.request_load(&id("P"), LoadMode::Additive).unwrap();
        assert_eq!(
            scenes.request_load(&id("P"), LoadMode::Single),
            Ok(RequestOutcome::InFlight)
        );
        assert_eq!(scenes.load_mode_of("P"), Some(LoadMode::Single));

        while loader.complete_next().is_some() {
            scenes.poll_completions();
        }
        scenes.poll_completions();

        assert_eq!(scenes.loaded_scenes(), vec![&id("P")]);
        assert_eq!(scenes.current_scene(), Some(&id("P")));
    }

    #[test]
    fn single_request_upgrade_lands_before_older_single_load() {
        let (mut scenes, loader) = manager();
        scenes.request_load(&id("L1"), LoadMode::Single).unwrap();
        scenes.request_load(&id("P"), LoadMode::Additive).unwrap();
        scenes.request_load(&id("P"), LoadMode::Single).unwrap();

        loader.complete("P");
        scenes.poll_completions();
        assert_eq!(scenes.current_scene(), Some(&id("P")));

        loader.complete("L1");
        scenes.poll_completions();
        loader.complete_all();
        scenes.poll_completions();

        assert_eq!(scenes.loaded_scenes(), vec![&id("P")]);
        assert_eq!(scenes.current_scene(), Some(&id("P")));
    }

    #[test]
    fn additive_request_does_not_move_exclusive_intent() {
        let (mut scenes, loader) = manager();
        scenes.request_load(&id("L1"), LoadMode::Single).unwrap();
        scenes.request_load(&id("P"), LoadMode::Additive).unwrap();
        scenes.request_load(&id("P"), LoadMode::Additive).unwrap();

        loader.complete_all();
        scenes.poll_completions();

        assert_eq!(scenes.loaded_scenes(), vec![&id("L1"), &id("P")]);
        assert_eq!(scenes.current_scene(), Some(&id("L1")));
        assert_eq!(scenes.load_mode_of("P"), Some(LoadMode::Additive));
    }

    //--- Unload Tests -----------------------------------------------------

    #[test]
    fn load_then_unload_round_trips() {
        let (mut scenes, loader) = manager();
        let before: Vec<SceneId> = scenes.loaded_scenes().into_iter().cloned().collect();

        scenes.request_load(&id("A"), LoadMode::Additive).unwrap();
        loader.complete_all();
        scenes.poll_completions();

        scenes.request_unload(&id("A")).unwrap();
        assert_eq!(scenes.state_of("A"), SceneState::Unloading);
        assert!(scenes.is_loaded("A"));

        loader.complete_all();
        let events = scenes.poll_completions();

        assert_eq!(events, vec![SceneEvent::Unloaded(id("A"))]);
        let after: Vec<SceneId> = scenes.loaded_scenes().into_iter().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn unload_of_unknown_scene_reports_not_loaded() {
        let (mut scenes, loader) = manager();

        let result = scenes.request_unload(&id("Nope"));

        assert_eq!(result, Err(SceneError::NotLoaded(id("Nope"))));
        assert!(loader.started().is_empty());
    }

    #[test]
    fn failed_unload_keeps_scene_loaded() {
        let (mut scenes, loader) = manager();
        scenes.request_load(&id("A"), LoadMode::Additive).unwrap();
        loader.complete_all();
        scenes.poll_completions();

        scenes.request_unload(&id("A")).unwrap();
        loader.fail("A", LoaderError::Rejected("locked".into()));
        let events = scenes.poll_completions();

        assert!(matches!(
            events.as_slice(),
            [SceneEvent::Failed(SceneError::UnloadFailure { .. })]
        ));
        assert_eq!(scenes.state_of("A"), SceneState::Loaded);

        // A later retry goes through
        scenes.request_unload(&id("A")).unwrap();
        loader.complete_all();
        scenes.poll_completions();
        assert!(!scenes.is_loaded("A"));
    }

    #[test]
    fn unload_refused_at_start_reverts_to_loaded() {
        let (mut scenes, loader) = manager();
        scenes.request_load(&id("A"), LoadMode::Additive).unwrap();
        loader.complete_all();
        scenes.poll_completions();

        loader.reject("A");
        let result = scenes.request_unload(&id("A"));

        assert!(matches!(result, Err(SceneError::UnloadFailure { .. })));
        assert_eq!(scenes.state_of("A"), SceneState::Loaded);
        assert!(scenes.poll_completions().is_empty());
    }

    #[test]
    fn unload_during_load_is_queued_then_dispatched() {
        let (mut scenes, loader) = manager();
        scenes.request_load(&id("Pause"), LoadMode::Additive).unwrap();

        assert_eq!(scenes.request_unload(&id("Pause")), Ok(RequestOutcome::Queued));
        assert_eq!(scenes.request_unload(&id("Pause")), Ok(RequestOutcome::Queued));
        assert!(scenes.has_pending_unload("Pause"));

        loader.complete("Pause");
        let events = scenes.poll_completions();
        assert_eq!(events, vec![SceneEvent::Loaded(id("Pause"))]);
        assert_eq!(scenes.state_of("Pause"), SceneState::Unloading);
        assert_eq!(
            loader.pending(),
            vec![(id("Pause"), SceneOp::Unload)]
        );

        loader.complete("Pause");
        scenes.poll_completions();
        assert_eq!(scenes.state_of("Pause"), SceneState::Unloaded);
    }

    #[test]
    fn reload_request_cancels_queued_unload() {
        let (mut scenes, loader) = manager();
        scenes.request_load(&id("A"), LoadMode::Additive).unwrap();
        scenes.request_unload(&id("A")).unwrap();

        let outcome = scenes.request_load(&id("A"), LoadMode::Additive).unwrap();

        assert_eq!(outcome, RequestOutcome::InFlight);
        assert!(!scenes.has_pending_unload("A"));
        loader.complete_all();
        scenes.poll_completions();
        assert_eq!(scenes.state_of("A"), SceneState::Loaded);
    }

    #[test]
    fn queued_unload_is_dropped_when_load_fails() {
        let (mut scenes, loader) = manager();
        scenes.request_load(&id("A"), LoadMode::Additive).unwrap();
        scenes.request_unload(&id("A")).unwrap();

        loader.fail("A", LoaderError::Rejected("io".into()));
        scenes.poll_completions();

        assert_eq!(scenes.state_of("A"), SceneState::Unloaded);
        assert_eq!(loader.pending_count(), 0);
    }

    #[test]
    fn load_while_unloading_is_busy() {
        let (mut scenes, loader) = manager();
        scenes.request_load(&id("A"), LoadMode::Additive).unwrap();
        loader.complete_all();
        scenes.poll_completions();
        scenes.request_unload(&id("A")).unwrap();

        let result = scenes.request_load(&id("A"), LoadMode::Additive);
        assert_eq!(
            result,
            Err(SceneError::Busy {
                id: id("A"),
                state: SceneState::Unloading,
            })
        );
        assert_eq!(scenes.request_unload(&id("A")), Ok(RequestOutcome::InFlight));
    }

    //--- Reset Tests ------------------------------------------------------

    #[test]
    fn reset_ignores_late_completion() {
        let (mut scenes, loader) = manager();
        scenes.request_load(&id("L1"), LoadMode::Single).unwrap();
        loader.complete("L1");
        scenes.poll_completions();
        scenes.request_load(&id("L2"), LoadMode::Single).unwrap();

        scenes.reset_all();
        assert!(scenes.loaded_scenes().is_empty());
        assert_eq!(scenes.current_scene(), None);

        loader.complete("L2");
        assert!(scenes.poll_completions().is_empty());
        assert!(!scenes.is_loaded("L2"));
    }

    #[test]
    fn stale_completion_after_reset_and_reload_is_ignored() {
        let (mut scenes, loader) = manager();
        scenes.request_load(&id("L1"), LoadMode::Single).unwrap();
        scenes.reset_all();
        scenes.request_load(&id("L1"), LoadMode::Single).unwrap();

        // The first (stale) operation lands first
        loader.complete("L1");
        assert!(scenes.poll_completions().is_empty());
        assert_eq!(scenes.state_of("L1"), SceneState::Loading);

        loader.complete("L1");
        assert_eq!(scenes.poll_completions(), vec![SceneEvent::Loaded(id("L1"))]);
    }

    //--- Blocking Wait Tests ----------------------------------------------

    #[test]
    fn wait_for_idle_times_out_when_nothing_completes() {
        let (mut scenes, _loader) = manager();
        scenes.request_load(&id("A"), LoadMode::Single).unwrap();

        let events = scenes.wait_for_idle(Duration::from_millis(20));

        assert!(events.is_empty());
        assert_eq!(scenes.in_flight(), 1);
    }
}
