// ============================================================================
// MUTATION VIEWMODEL - Ejecutor de mutaciones optimistas
// ============================================================================
// Protocolo por mutación: snapshot → escritura especulativa → despacho
// directo (online) o encolado (offline) → reconciliación con la respuesta
// autoritativa o rollback al snapshot. Los pasos previos al despacho son
// síncronos: la UI ve el valor especulativo en el mismo frame del gesto.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use crate::models::action::ActionPayload;
use crate::models::cache::{CacheKey, CacheOrigin};
use crate::models::cart::Cart;
use crate::models::favorites::Favorites;
use crate::models::order::{Order, OrderDraft, Orders};
use crate::models::product::Product;
use crate::models::sync::{MutationOutcome, MutationPhase, SyncState};
use crate::services::api_client::{ApiError, CommerceApi};
use crate::services::cache_store::CacheStore;
use crate::services::network_monitor::ConnectivityMonitor;
use crate::services::queue_store::ActionQueueStore;
use crate::state::reactivity::ReactiveState;
use crate::state::sync_state::SyncStateHandle;

/// Ejecuta la llamada remota de una acción y sobrescribe la caché con la
/// respuesta autoritativa del servidor (origen Server). Compartido entre el
/// despacho online y el drenado de la cola: el paso de settle reconcilia
/// exactamente igual que el camino directo.
pub(crate) async fn dispatch_action(
    api: &dyn CommerceApi,
    cache: &Rc<RefCell<CacheStore>>,
    payload: &ActionPayload,
) -> Result<(), ApiError> {
    match payload {
        ActionPayload::CartAdd {
            product_id,
            quantity,
        } => {
            let cart = api.add_cart_item(product_id, *quantity).await?;
            write_server(cache, CacheKey::Cart, &cart);
        }
        ActionPayload::CartUpdateQuantity {
            product_id,
            quantity,
        } => {
            let cart = api.update_cart_item_quantity(product_id, *quantity).await?;
            write_server(cache, CacheKey::Cart, &cart);
        }
        ActionPayload::CartClear => {
            let cart = api.clear_cart().await?;
            write_server(cache, CacheKey::Cart, &cart);
        }
        ActionPayload::FavoriteToggle {
            product_id,
            favorited,
        } => {
            let favorites = api.toggle_favorite(product_id, *favorited).await?;
            write_server(cache, CacheKey::Favorites, &favorites);
        }
        ActionPayload::OrderCreate {
            draft,
            idempotency_key,
        } => {
            let order = api.create_order(draft, idempotency_key).await?;
            let mut orders: Orders = cache
                .borrow()
                .read_as(CacheKey::Orders)
                .unwrap_or_default();
            orders.replace_by_client_ref(order, idempotency_key);
            write_server(cache, CacheKey::Orders, &orders);
        }
    }
    Ok(())
}

fn write_server<T: Serialize>(cache: &Rc<RefCell<CacheStore>>, key: CacheKey, value: &T) {
    if let Err(e) = cache.borrow_mut().write(key, value, CacheOrigin::Server) {
        log::error!("❌ Error reconciliando caché '{}': {}", key, e);
    }
}

/// ViewModel de mutaciones optimistas sobre carrito, favoritos y pedidos
#[derive(Clone)]
pub struct MutationViewModel {
    api: Rc<dyn CommerceApi>,
    cache: Rc<RefCell<CacheStore>>,
    queue: Rc<RefCell<ActionQueueStore>>,
    monitor: ConnectivityMonitor,
    sync_state: SyncStateHandle,
    phase: ReactiveState<MutationPhase>,
}

impl MutationViewModel {
    pub fn new(
        api: Rc<dyn CommerceApi>,
        cache: Rc<RefCell<CacheStore>>,
        queue: Rc<RefCell<ActionQueueStore>>,
        monitor: ConnectivityMonitor,
        sync_state: SyncStateHandle,
    ) -> Self {
        Self {
            api,
            cache,
            queue,
            monitor,
            sync_state,
            phase: ReactiveState::new(MutationPhase::Idle),
        }
    }

    /// Fase observable de la última mutación (para la vista)
    pub fn phase(&self) -> ReactiveState<MutationPhase> {
        self.phase.clone()
    }

    /// Agregar producto al carrito
    pub async fn add_to_cart(&self, product: &Product, quantity: u32) -> MutationOutcome {
        let mut cart: Cart = self.read_or_default(CacheKey::Cart);
        cart.apply_add(product, quantity);
        let payload = ActionPayload::CartAdd {
            product_id: product.id.clone(),
            quantity,
        };
        self.run(payload, CacheKey::Cart, &cart).await
    }

    /// Fijar la cantidad de una línea del carrito (0 la elimina)
    pub async fn update_cart_quantity(&self, product_id: &str, quantity: u32) -> MutationOutcome {
        let mut cart: Cart = self.read_or_default(CacheKey::Cart);
        cart.apply_set_quantity(product_id, quantity);
        let payload = ActionPayload::CartUpdateQuantity {
            product_id: product_id.to_string(),
            quantity,
        };
        self.run(payload, CacheKey::Cart, &cart).await
    }

    /// Vaciar el carrito
    pub async fn clear_cart(&self) -> MutationOutcome {
        let mut cart: Cart = self.read_or_default(CacheKey::Cart);
        cart.apply_clear();
        self.run(ActionPayload::CartClear, CacheKey::Cart, &cart)
            .await
    }

    /// Conmutar favorito. El estado objetivo se fija aquí, de forma
    /// absoluta, a partir de la caché actual: la reproducción diferida
    /// nunca puede des-hacer la intención del usuario por duplicarse.
    pub async fn toggle_favorite(&self, product_id: &str) -> MutationOutcome {
        let mut favorites: Favorites = self.read_or_default(CacheKey::Favorites);
        let target = !favorites.is_favorite(product_id);
        favorites.apply_toggle(product_id, target);
        let payload = ActionPayload::FavoriteToggle {
            product_id: product_id.to_string(),
            favorited: target,
        };
        self.run(payload, CacheKey::Favorites, &favorites).await
    }

    /// Crear pedido con los datos de checkout. Lleva una clave de
    /// idempotencia generada en el cliente para que el servidor pueda
    /// deduplicar una reproducción tras un acuse perdido.
    pub async fn create_order(&self, draft: OrderDraft) -> MutationOutcome {
        let idempotency_key = uuid::Uuid::new_v4().to_string();
        let cart: Cart = self.read_or_default(CacheKey::Cart);

        let mut orders: Orders = self.read_or_default(CacheKey::Orders);
        orders.apply_create(Order {
            id: idempotency_key.clone(),
            status: "pending".to_string(),
            items: cart.items.clone(),
            total: cart.total,
            created_at: None,
            client_ref: Some(idempotency_key.clone()),
        });

        let payload = ActionPayload::OrderCreate {
            draft,
            idempotency_key,
        };
        self.run(payload, CacheKey::Orders, &orders).await
    }

    fn read_or_default<T: serde::de::DeserializeOwned + Default>(&self, key: CacheKey) -> T {
        self.cache.borrow().read_as(key).unwrap_or_default()
    }

    /// Protocolo genérico de mutación optimista. snapshot y escritura
    /// especulativa son síncronos, así que una segunda mutación sobre la
    /// misma clave antes de que resuelva la primera parte del valor
    /// especulativo de esta, no de datos viejos del servidor: las ediciones
    /// apiladas componen.
    async fn run<T: Serialize>(
        &self,
        payload: ActionPayload,
        key: CacheKey,
        speculative: &T,
    ) -> MutationOutcome {
        self.phase.set(MutationPhase::Applying);

        let snapshot = self.cache.borrow().snapshot(key);
        if let Err(e) = self
            .cache
            .borrow_mut()
            .write(key, speculative, CacheOrigin::Optimistic)
        {
            log::error!("❌ Error en escritura especulativa '{}': {}", key, e);
        }

        if !self.monitor.is_online() {
            // offline es un estado esperado, no un error: se encola y para
            // el usuario es un éxito pendiente de sincronizar
            let action_id = self.queue.borrow_mut().enqueue(payload);
            self.sync_state.set_sync_state(SyncState::Offline {
                pending_count: self.queue.borrow().pending_count(),
            });
            self.phase.set(MutationPhase::Queued);
            return MutationOutcome::Queued { action_id };
        }

        self.phase.set(MutationPhase::Dispatching);
        match dispatch_action(&*self.api, &self.cache, &payload).await {
            Ok(()) => {
                self.phase.set(MutationPhase::Reconciled);
                MutationOutcome::Confirmed
            }
            Err(error) => {
                log::warn!(
                    "⚠️ Mutación rechazada ({}), rollback: {}",
                    payload.describe(),
                    error
                );
                self.cache.borrow_mut().restore(key, snapshot);
                if matches!(error, ApiError::Auth) {
                    self.sync_state.set_auth_required(true);
                }
                self.phase.set(MutationPhase::RolledBack);
                MutationOutcome::RolledBack { error }
            }
        }
    }
}
