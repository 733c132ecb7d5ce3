use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, MutexGuard, PoisonError, Weak,
};

use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    model::champion::ChampionRotation,
    service::api::rotation_repository::{CurrentRotationError, RotationSource},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Initial,
    Loading,
    Data(ChampionRotation),
    Error(CurrentRotationError),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn data(&self) -> Option<&ChampionRotation> {
        match self {
            LoadState::Data(rotation) => Some(rotation),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<CurrentRotationError> {
        match self {
            LoadState::Error(error) => Some(*error),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoadState::Initial => "initial",
            LoadState::Loading => "loading",
            LoadState::Data(_) => "data",
            LoadState::Error(_) => "error",
        }
    }
}

type Listener = Arc<dyn Fn(&LoadState) + Send + Sync>;

struct Shared {
    state: Mutex<LoadState>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, LoadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<(u64, Listener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Called with the state lock held, so listeners observe transitions in
    /// the order they happened.
    fn publish(&self, state: &LoadState) {
        let listeners = self
            .lock_listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect::<Vec<_>>();

        for listener in listeners {
            listener(state);
        }
    }

    fn finish(&self, next: LoadState) {
        let mut state = self.lock_state();
        debug!(from = state.label(), to = next.label(), "load state transition");
        *state = next;
        self.publish(&state);
    }

    fn detach(&self, id: u64) {
        self.lock_listeners().retain(|(listener_id, _)| *listener_id != id);
    }
}

/// Owns the load state of the current rotation and coordinates fetching it.
///
/// At most one request is in flight at any time: `load` while a request is
/// pending does nothing. There is no cancellation, a started request always
/// applies its result.
pub struct RotationStore<S> {
    source: Arc<S>,
    shared: Arc<Shared>,
    runtime: Handle,
}

impl<S: RotationSource + 'static> RotationStore<S> {
    pub fn new(source: S, runtime: Handle) -> Self {
        Self {
            source: Arc::new(source),
            shared: Arc::new(Shared {
                state: Mutex::new(LoadState::Initial),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
            }),
            runtime,
        }
    }

    pub fn state(&self) -> LoadState {
        self.shared.lock_state().clone()
    }

    /// Starts fetching the current rotation.
    ///
    /// The switch to [`LoadState::Loading`] is visible as soon as this returns.
    /// Returns the handle of the spawned fetch, or `None` if a fetch was
    /// already running and this call was ignored.
    pub fn load(&self) -> Option<JoinHandle<()>> {
        {
            let mut state = self.shared.lock_state();
            if state.is_loading() {
                debug!("rotation already loading, ignoring load request");
                return None;
            }
            debug!(from = state.label(), to = "loading", "load state transition");
            *state = LoadState::Loading;
            self.shared.publish(&state);
        }

        let source = Arc::clone(&self.source);
        let shared = Arc::clone(&self.shared);

        Some(self.runtime.spawn(async move {
            let next = match source.current_rotation().await {
                Ok(rotation) => {
                    info!(
                        regular = rotation.regular_champions.len(),
                        beginner = rotation.beginner_champions.len(),
                        "champion rotation loaded"
                    );
                    LoadState::Data(rotation)
                }
                Err(error) => {
                    warn!(%error, "champion rotation could not be loaded");
                    LoadState::Error(error)
                }
            };
            shared.finish(next);
        }))
    }

    /// Registers a listener that receives every new state.
    ///
    /// Listeners run synchronously while the store's state is locked, so they
    /// must not call back into the store. Hand the state off (for example
    /// through a channel) instead.
    #[must_use = "dropping the subscription detaches the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&LoadState) + Send + Sync + 'static,
    {
        let id = self.shared.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.shared.lock_listeners().push((id, Arc::new(listener)));

        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }
}

/// Keeps a listener attached to a [`RotationStore`] until dropped.
pub struct Subscription {
    id: u64,
    shared: Weak<Shared>,
}

impl Subscription {
    pub fn detach(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.detach(self.id);
        }
    }
}
