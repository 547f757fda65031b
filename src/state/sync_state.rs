// ============================================================================
// SYNC STATE - Estado compartido de sincronización
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use crate::models::sync::SyncState;

/// Estado de sincronización compartido entre el ejecutor de mutaciones, el
/// procesador de cola y la vista. Un solo hilo: Rc<RefCell> sin locks.
#[derive(Clone)]
pub struct SyncStateHandle {
    sync_state: Rc<RefCell<SyncState>>,
    is_processing: Rc<RefCell<bool>>,
    auth_required: Rc<RefCell<bool>>,
    last_drain: Rc<RefCell<Option<i64>>>,
}

impl SyncStateHandle {
    pub fn new() -> Self {
        Self {
            sync_state: Rc::new(RefCell::new(SyncState::Synced)),
            is_processing: Rc::new(RefCell::new(false)),
            auth_required: Rc::new(RefCell::new(false)),
            last_drain: Rc::new(RefCell::new(None)),
        }
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync_state.borrow().clone()
    }

    pub fn set_sync_state(&self, state: SyncState) {
        *self.sync_state.borrow_mut() = state;
    }

    pub fn is_processing(&self) -> bool {
        *self.is_processing.borrow()
    }

    /// Toma el flag de drenado. Devuelve false si otra pasada ya está en
    /// curso: los disparos simultáneos colapsan en una sola.
    pub fn begin_processing(&self) -> bool {
        let mut processing = self.is_processing.borrow_mut();
        if *processing {
            return false;
        }
        *processing = true;
        true
    }

    pub fn end_processing(&self) {
        *self.is_processing.borrow_mut() = false;
    }

    pub fn auth_required(&self) -> bool {
        *self.auth_required.borrow()
    }

    pub fn set_auth_required(&self, required: bool) {
        *self.auth_required.borrow_mut() = required;
    }

    pub fn last_drain(&self) -> Option<i64> {
        *self.last_drain.borrow()
    }

    pub fn set_last_drain(&self, timestamp: Option<i64>) {
        *self.last_drain.borrow_mut() = timestamp;
    }
}

impl Default for SyncStateHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_flag_collapses_concurrent_triggers() {
        let handle = SyncStateHandle::new();
        assert!(handle.begin_processing());
        assert!(!handle.begin_processing());
        handle.end_processing();
        assert!(handle.begin_processing());
    }

    #[test]
    fn clones_share_flags() {
        let handle = SyncStateHandle::new();
        let alias = handle.clone();
        handle.set_auth_required(true);
        assert!(alias.auth_required());
    }
}
