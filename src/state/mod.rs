pub mod reactivity;
pub mod sync_state;

pub use reactivity::ReactiveState;
pub use sync_state::SyncStateHandle;
