//=========================================================================
// Scene Loader
//=========================================================================
//
// Contract between the lifecycle manager and whatever actually loads
// content (engine, asset streamer, test harness).
//
// Architecture:
//   SceneLifecycleManager ──begin_load(id, mode, handle)──> SceneLoader
//                                                              │
//                                          [worker thread / engine tick]
//                                                              │
//   Receiver<SceneCompletion> <──── CompletionHandle::succeed()/fail()
//
// A loader reports "could not start" synchronously through the returned
// Result and everything else through the completion handle.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;
use std::fmt;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;
use log::debug;

//=== Internal Dependencies ===============================================

use super::{LoadMode, SceneId};

//=== LoaderError =========================================================

/// Failures reported by a [`SceneLoader`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoaderError {
    /// The loader has no content registered under this identifier.
    #[error("Scene '{0}' is not known to the loader")]
    UnknownScene(SceneId),

    /// The loader refused or aborted the operation.
    #[error("Loader rejected the operation: {0}")]
    Rejected(String),

    /// The operation was abandoned without reporting a result.
    #[error("Loader dropped the operation without completing it")]
    Disconnected,
}

//=== Operation Types =====================================================

/// Ticket identifying one dispatched load or unload.
///
/// Tickets increase monotonically per manager. A completion is applied only
/// if its ticket matches the one recorded for the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(u64);

impl OperationId {
    /// Ticket issued to the first operation of a manager.
    pub(crate) fn first() -> Self {
        Self(1)
    }

    /// The ticket following this one.
    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of operation a completion belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneOp {
    Load(LoadMode),
    Unload,
}

/// Result of one loader operation, delivered over the completion channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneCompletion {
    pub id: SceneId,
    pub ticket: OperationId,
    pub op: SceneOp,
    pub result: Result<(), LoaderError>,
}

//=== CompletionHandle ====================================================

/// One-shot reporter for a dispatched operation.
///
/// Handed to the loader with every `begin_*` call. The loader moves it to
/// wherever the work happens and calls [`succeed`](Self::succeed) or
/// [`fail`](Self::fail) exactly once. A handle dropped without reporting
/// sends [`LoaderError::Disconnected`], so the scene never stays in flight
/// forever.
pub struct CompletionHandle {
    sender: Option<Sender<SceneCompletion>>,
    id: SceneId,
    ticket: OperationId,
    op: SceneOp,
}

impl CompletionHandle {
    /// Arms a handle that reports to `sender`.
    pub(crate) fn new(
        sender: Sender<SceneCompletion>,
        id: SceneId,
        ticket: OperationId,
        op: SceneOp,
    ) -> Self {
        Self {
            sender: Some(sender),
            id,
            ticket,
            op,
        }
    }

    /// Scene the operation belongs to.
    pub fn id(&self) -> &SceneId {
        &self.id
    }

    /// Kind of operation this handle reports for.
    pub fn op(&self) -> SceneOp {
        self.op
    }

    /// Ticket the manager recorded for this operation.
    pub fn ticket(&self) -> OperationId {
        self.ticket
    }

    /// Reports that the operation finished.
    pub fn succeed(mut self) {
        self.finish(Ok(()));
    }

    /// Reports that the operation could not be completed.
    pub fn fail(mut self, error: LoaderError) {
        self.finish(Err(error));
    }

    fn finish(&mut self, result: Result<(), LoaderError>) {
        let Some(sender) = self.sender.take() else {
            return;
        };

        let completion = SceneCompletion {
            id: self.id.clone(),
            ticket: self.ticket,
            op: self.op,
            result,
        };

        // The manager may already be gone during shutdown
        if sender.send(completion).is_err() {
            debug!("Completion {} for scene '{}' has no receiver", self.ticket, self.id);
        }
    }
}

impl Drop for CompletionHandle {
    fn drop(&mut self) {
        if self.sender.is_some() {
            // Refused starts land here too; the manager reports the failure
            debug!(
                "Operation {} for scene '{}' dropped without a result",
                self.ticket, self.id
            );
            self.finish(Err(LoaderError::Disconnected));
        }
    }
}

impl fmt::Debug for CompletionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionHandle")
            .field("id", &self.id)
            .field("ticket", &self.ticket)
            .field("op", &self.op)
            .field("pending", &self.sender.is_some())
            .finish()
    }
}

//=== SceneLoader Trait ===================================================

/// External content loader driven by the lifecycle manager.
///
/// Implementations must not block: start the work and return. Returning
/// `Err` means the operation never started; the handle is then discarded
/// and whatever it reports is ignored.
pub trait SceneLoader: Send {
    /// Starts loading `id` in the given mode.
    fn begin_load(
        &mut self,
        id: &SceneId,
        mode: LoadMode,
        completion: CompletionHandle,
    ) -> Result<(), LoaderError>;

    /// Starts unloading `id`.
    fn begin_unload(
        &mut self,
        id: &SceneId,
        completion: CompletionHandle,
    ) -> Result<(), LoaderError>;
}

//=== ThreadedLoader ======================================================

/// Loader that performs each operation on its own worker thread.
///
/// Knows a fixed set of scene identifiers; anything else fails to start with
/// [`LoaderError::UnknownScene`]. Each operation takes `latency` to finish.
#[derive(Debug, Clone)]
pub struct ThreadedLoader {
    known: HashSet<SceneId>,
    latency: Duration,
}

impl ThreadedLoader {
    /// Creates a loader that knows `scenes` and finishes instantly.
    pub fn new<I, S>(scenes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SceneId>,
    {
        Self {
            known: scenes.into_iter().map(Into::into).collect(),
            latency: Duration::ZERO,
        }
    }

    /// Sets the simulated time every operation takes.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Whether `id` can be loaded by this loader.
    pub fn knows(&self, id: &str) -> bool {
        self.known.contains(id)
    }

    fn check_known(&self, id: &SceneId) -> Result<(), LoaderError> {
        if self.known.contains(id) {
            Ok(())
        } else {
            Err(LoaderError::UnknownScene(id.clone()))
        }
    }

    fn spawn_worker(&self, completion: CompletionHandle) -> Result<(), LoaderError> {
        let latency = self.latency;

        thread::Builder::new()
            .name(format!("scene-op-{}", completion.id()))
            .spawn(move || {
                if !latency.is_zero() {
                    thread::sleep(latency);
                }
                completion.succeed();
            })
            .map(|_| ())
            .map_err(|e| LoaderError::Rejected(format!("could not spawn worker: {}", e)))
    }
}

impl SceneLoader for ThreadedLoader {
    fn begin_load(
        &mut self,
        id: &SceneId,
        mode: LoadMode,
        completion: CompletionHandle,
    ) -> Result<(), LoaderError> {
        self.check_known(id)?;
        debug!("Loading '{}' ({:?}) on worker thread", id, mode);
        self.spawn_worker(completion)
    }

    fn begin_unload(
        &mut self,
        id: &SceneId,
        completion: CompletionHandle,
    ) -> Result<(), LoaderError> {
        self.check_known(id)?;
        debug!("Unloading '{}' on worker thread", id);
        self.spawn_worker(completion)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
