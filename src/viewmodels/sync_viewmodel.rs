// ============================================================================
// SYNC VIEWMODEL - Procesador de la cola pendiente
// ============================================================================
// Drena la cola cuando vuelve la conexión (o a demanda), una acción a la
// vez en orden FIFO. Cada acción confirmada reconcilia la caché con la
// respuesta autoritativa; los fallos transitorios consumen presupuesto de
// reintentos bajo una puerta de backoff; validación y auth fallan rápido.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use crate::models::action::{ActionStatus, QueuedAction};
use crate::models::cache::{CacheKey, CacheOrigin};
use crate::models::sync::{DrainSummary, SyncState};
use crate::services::api_client::{ApiError, CommerceApi};
use crate::services::cache_store::CacheStore;
use crate::services::network_monitor::ConnectivityMonitor;
use crate::services::queue_store::ActionQueueStore;
use crate::state::sync_state::SyncStateHandle;
use crate::viewmodels::mutation_viewmodel::dispatch_action;

/// ViewModel de sincronización: procesa la cola y expone la superficie de
/// "cambios pendientes" (lista de fallidas, descartar, reintentar todo)
#[derive(Clone)]
pub struct SyncViewModel {
    api: Rc<dyn CommerceApi>,
    cache: Rc<RefCell<CacheStore>>,
    queue: Rc<RefCell<ActionQueueStore>>,
    monitor: ConnectivityMonitor,
    state: SyncStateHandle,
}

impl SyncViewModel {
    pub fn new(
        api: Rc<dyn CommerceApi>,
        cache: Rc<RefCell<CacheStore>>,
        queue: Rc<RefCell<ActionQueueStore>>,
        monitor: ConnectivityMonitor,
        state: SyncStateHandle,
    ) -> Self {
        Self {
            api,
            cache,
            queue,
            monitor,
            state,
        }
    }

    /// Drena la cola pendiente. Idempotente frente a disparos simultáneos:
    /// el flag is_processing colapsa reconexiones repetidas en una pasada.
    /// Si la conexión cae a mitad, el bucle para tras asentar la acción en
    /// curso y retoma desde la siguiente pending en la próxima reconexión.
    pub async fn process_queue(&self) -> DrainSummary {
        let mut summary = DrainSummary::default();

        if !self.state.begin_processing() {
            log::info!("🔄 Drenado ya en curso, ignorando disparo duplicado");
            summary.remaining = self.queue.borrow().pending_count();
            return summary;
        }

        if self.state.auth_required() {
            // reproducir acciones autenticadas con la sesión inválida sólo
            // encadenaría fallos: la cola entera espera a la re-autenticación
            log::warn!("🔒 Cola pausada: se requiere re-autenticación");
            self.state.end_processing();
            summary.remaining = self.queue.borrow().pending_count();
            self.publish_state();
            return summary;
        }

        self.state.set_sync_state(SyncState::Syncing);

        loop {
            if !self.monitor.is_online() {
                log::warn!("📴 Conexión perdida durante el drenado, se retomará al reconectar");
                break;
            }

            let now = chrono::Utc::now().timestamp();
            let action = match self.queue.borrow_mut().dequeue_next(now) {
                Some(action) => action,
                None => break,
            };

            log::info!(
                "🔄 Reproduciendo {} (intento {}/{})",
                action.payload.describe(),
                action.retry_count + 1,
                action.max_retries
            );

            match dispatch_action(&*self.api, &self.cache, &action.payload).await {
                Ok(()) => {
                    self.queue.borrow_mut().mark_done(&action.id);
                    summary.processed += 1;
                }
                Err(error) => {
                    let terminal = !error.is_retryable();
                    let status = self.queue.borrow_mut().mark_failed(
                        &action.id,
                        &error.to_string(),
                        terminal,
                    );
                    if status == Some(ActionStatus::Failed) {
                        summary.failed += 1;
                    }
                    if matches!(error, ApiError::Auth) {
                        self.state.set_auth_required(true);
                        break;
                    }
                    // fallo transitorio: la acción volvió a pending y la
                    // puerta de backoff cortará la pasada en la próxima vuelta
                }
            }
        }

        summary.remaining = self.queue.borrow().pending_count();
        self.state.set_last_drain(Some(chrono::Utc::now().timestamp()));
        self.state.end_processing();
        self.publish_state();

        log::info!(
            "✅ Drenado terminado: {} procesadas, {} fallidas, {} pendientes",
            summary.processed,
            summary.failed,
            summary.remaining
        );
        summary
    }

    /// Disparo manual ("sincronizar ahora")
    pub async fn sync_now(&self) -> DrainSummary {
        self.process_queue().await
    }

    /// Reintenta todas las acciones fallidas con presupuesto restablecido
    /// y drena inmediatamente
    pub async fn retry_all(&self) -> DrainSummary {
        let requeued = self.queue.borrow_mut().retry_failed();
        if requeued > 0 {
            log::info!("🔁 {} acciones fallidas reencoladas", requeued);
        }
        self.process_queue().await
    }

    /// La sesión volvió a ser válida: despausa la cola y drena
    pub async fn resolve_auth(&self) -> DrainSummary {
        self.state.set_auth_required(false);
        self.process_queue().await
    }

    /// Pull de carrito, favoritos y pedidos como estado confirmado. Una
    /// clave con acciones locales sin asentar no se sobrescribe: la vista
    /// de trabajo del usuario manda hasta que la cola se drene.
    pub async fn refresh_all(&self) -> Result<(), ApiError> {
        let cart = self.api.fetch_cart().await?;
        self.write_unless_pending(CacheKey::Cart, &cart);

        let favorites = self.api.fetch_favorites().await?;
        self.write_unless_pending(CacheKey::Favorites, &favorites);

        let orders = self.api.fetch_orders().await?;
        self.write_unless_pending(CacheKey::Orders, &orders);

        self.publish_state();
        Ok(())
    }

    fn write_unless_pending<T: serde::Serialize>(&self, key: CacheKey, value: &T) {
        if self.has_unsettled_for(key) {
            log::info!(
                "⏭️ Caché '{}' tiene cambios locales pendientes, no se sobrescribe",
                key
            );
            return;
        }
        if let Err(e) = self.cache.borrow_mut().write(key, value, CacheOrigin::Server) {
            log::error!("❌ Error guardando pull de '{}': {}", key, e);
        }
    }

    fn has_unsettled_for(&self, key: CacheKey) -> bool {
        self.queue
            .borrow()
            .list()
            .iter()
            .any(|a| a.status != ActionStatus::Failed && a.payload.cache_key() == key)
    }

    /// Superficie de "cambios pendientes" para la UI
    pub fn list_failed_actions(&self) -> Vec<QueuedAction> {
        self.queue.borrow().list_failed()
    }

    /// Descarta una acción fallida (decisión explícita del usuario)
    pub fn discard_action(&self, id: &str) -> Result<(), String> {
        let result = self.queue.borrow_mut().remove(id);
        self.publish_state();
        result
    }

    pub fn pending_count(&self) -> usize {
        self.queue.borrow().pending_count()
    }

    pub fn failed_count(&self) -> usize {
        self.queue.borrow().failed_count()
    }

    pub fn has_pending(&self) -> bool {
        self.pending_count() > 0
    }

    /// Recalcula el estado agregado que consume el indicador de sync
    fn publish_state(&self) {
        let pending = self.queue.borrow().pending_count();
        let failed = self.queue.borrow().failed_count();

        let state = if self.state.auth_required() {
            SyncState::AuthRequired {
                pending_count: pending,
            }
        } else if !self.monitor.is_online() && pending > 0 {
            SyncState::Offline {
                pending_count: pending,
            }
        } else if failed > 0 {
            SyncState::Error {
                message: format!("{} acciones fallidas", failed),
            }
        } else if pending > 0 {
            SyncState::Pending { count: pending }
        } else {
            SyncState::Synced
        };
        self.state.set_sync_state(state);
    }
}

#[cfg(target_arch = "wasm32")]
impl SyncViewModel {
    /// Drena al recuperar la conexión y re-drena periódicamente para las
    /// ventanas de backoff vencidas. Las transiciones repetidas colapsan en
    /// una sola pasada gracias al flag is_processing.
    pub fn start_auto_sync(&self) {
        use gloo_timers::callback::Interval;

        let vm = self.clone();
        self.monitor.on_change(move |status| {
            if status.is_online() {
                let vm = vm.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    log::info!("🌐 Conexión restaurada - drenando cola");
                    vm.process_queue().await;
                });
            } else {
                vm.publish_state();
            }
        });

        let vm = self.clone();
        let interval = Interval::new(crate::utils::constants::AUTO_SYNC_INTERVAL_MS, move || {
            let vm = vm.clone();
            wasm_bindgen_futures::spawn_local(async move {
                vm.process_queue().await;
            });
        });
        interval.forget();

        log::info!("🚀 Auto-sync iniciado - procesará la cola al volver la conexión");
    }
}
