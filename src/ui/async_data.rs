use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::service::{
    api::rotation_repository::RotationSource,
    rotation_store::{LoadState, RotationStore, Subscription},
};

/// UI-thread copy of the store's state. Transitions arrive through a channel
/// and are applied on `try_update`, so rendering never touches the store lock.
pub struct AsyncRotation {
    state: LoadState,
    receiver: Receiver<LoadState>,
    _subscription: Subscription,
}

impl AsyncRotation {
    pub fn attach<S: RotationSource + 'static>(store: &RotationStore<S>) -> Self {
        let (tx, rx) = mpsc::channel();
        let subscription = store.subscribe(move |state| {
            // Receiver gone means the UI is shutting down
            let _ = tx.send(state.clone());
        });

        Self {
            state: store.state(),
            receiver: rx,
            _subscription: subscription,
        }
    }

    /// Applies every pending transition. Returns true if the state changed.
    pub fn try_update(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.receiver.try_recv() {
                Ok(state) => {
                    changed |= state != self.state;
                    self.state = state;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changed
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tokio::runtime::Handle;

    use super::*;
    use crate::{
        model::champion::ChampionRotation,
        service::api::rotation_repository::CurrentRotationError,
    };

    struct Offline;

    #[async_trait]
    impl RotationSource for Offline {
        async fn current_rotation(&self) -> Result<ChampionRotation, CurrentRotationError> {
            Err(CurrentRotationError::Unavailable)
        }
    }

    #[tokio::test]
    async fn mirrors_store_transitions() {
        let store = RotationStore::new(Offline, Handle::current());
        let mut mirror = AsyncRotation::attach(&store);
        assert_eq!(*mirror.state(), LoadState::Initial);
        assert!(!mirror.try_update());

        let handle = store.load().unwrap();
        assert!(mirror.try_update());
        assert!(mirror.state().is_loading());

        handle.await.unwrap();
        assert!(mirror.try_update());
        assert_eq!(*mirror.state(), LoadState::Error(CurrentRotationError::Unavailable));
    }
}
