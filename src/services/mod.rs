pub mod api_client;
pub mod cache_store;
pub mod network_monitor;
pub mod queue_store;

pub use api_client::{ApiError, CommerceApi};
pub use cache_store::CacheStore;
pub use network_monitor::{ConnectivityMonitor, NetworkStatus};
pub use queue_store::ActionQueueStore;

#[cfg(target_arch = "wasm32")]
pub use api_client::HttpApiClient;
