// ============================================================================
// AUTOPARTS PWA - NÚCLEO OFFLINE-FIRST DE SINCRONIZACIÓN
// ============================================================================
// Arquitectura MVVM estricta:
// - Models: recursos del backend + registros de cola y caché
// - Services: API, conectividad, cola persistente, caché de recursos
// - ViewModels: ejecutor de mutaciones optimistas + procesador de cola
// - State: estado compartido con Rc<RefCell> (un solo hilo, sin locks)
// La capa de vista consume este crate; aquí no se renderiza nada.
// ============================================================================

pub mod config;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;
pub mod viewmodels;

use std::cell::RefCell;
use std::rc::Rc;

use services::api_client::CommerceApi;
use services::cache_store::CacheStore;
use services::network_monitor::ConnectivityMonitor;
use services::queue_store::ActionQueueStore;
use state::sync_state::SyncStateHandle;
use utils::storage::StorageBackend;
use viewmodels::{MutationViewModel, SyncViewModel};

/// Núcleo de la app: cablea monitor, stores y viewmodels sobre la API y el
/// storage inyectados. Sin singletons sueltos: los tests inyectan dobles y
/// quedan deterministas.
pub struct CommerceCore {
    pub monitor: ConnectivityMonitor,
    pub cache: Rc<RefCell<CacheStore>>,
    pub queue: Rc<RefCell<ActionQueueStore>>,
    pub sync_state: SyncStateHandle,
    pub mutations: MutationViewModel,
    pub sync: SyncViewModel,
}

impl CommerceCore {
    pub fn new(api: Rc<dyn CommerceApi>, storage: Rc<dyn StorageBackend>) -> Self {
        let monitor = ConnectivityMonitor::new();
        let cache = Rc::new(RefCell::new(CacheStore::load(storage.clone())));
        let queue = Rc::new(RefCell::new(ActionQueueStore::load(storage)));
        let sync_state = SyncStateHandle::new();

        let mutations = MutationViewModel::new(
            api.clone(),
            cache.clone(),
            queue.clone(),
            monitor.clone(),
            sync_state.clone(),
        );
        let sync = SyncViewModel::new(
            api,
            cache.clone(),
            queue.clone(),
            monitor.clone(),
            sync_state.clone(),
        );

        Self {
            monitor,
            cache,
            queue,
            sync_state,
            mutations,
            sync,
        }
    }

    /// Arranque completo en el navegador: conecta la señal de red y el
    /// auto-sync de la cola
    #[cfg(target_arch = "wasm32")]
    pub fn start(&self) {
        self.sync.start_auto_sync();
        self.monitor.attach_to_window();
    }
}

/// Inicializa logging y panic hook en el navegador
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("🚀 Autoparts PWA - núcleo de sincronización inicializado");
}
